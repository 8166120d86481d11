//! Reading and decoding declaration files.

use crate::error::ConvertError;
use deckhand_encoding::DecoderRegistry;
use deckhand_model::{Declaration, ValidationErrors};
use std::fs;
use std::path::{Path, PathBuf};

/// The declaration a run converts, together with what `validate()` found.
#[derive(Debug)]
pub struct LoadedDeclaration {
    pub declaration: Declaration,
    pub source: PathBuf,
    /// Validation outcome; faults do not stop the load.
    pub validation: Result<(), ValidationErrors>,
    /// Files that decoded but were not converted.
    pub discarded: Vec<PathBuf>,
}

/// Read and decode every path in order, keeping only the first declaration.
pub fn load<P: AsRef<Path>>(
    paths: &[P],
    registry: &DecoderRegistry,
) -> Result<LoadedDeclaration, ConvertError> {
    if paths.is_empty() {
        return Err(ConvertError::Configuration(
            "there has to be at least one file".to_string(),
        ));
    }

    let mut kept: Option<(Declaration, PathBuf)> = None;
    let mut discarded = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let declaration = decode_file(path, registry)?;
        if kept.is_none() {
            kept = Some((declaration, path.to_path_buf()));
        } else {
            discarded.push(path.to_path_buf());
        }
    }

    let Some((mut declaration, source)) = kept else {
        return Err(ConvertError::Configuration(
            "there has to be at least one file".to_string(),
        ));
    };
    if !discarded.is_empty() {
        tracing::warn!(
            kept = %source.display(),
            discarded = discarded.len(),
            "multiple declarations given; only the first is converted"
        );
    }

    let validation = declaration.validate();
    Ok(LoadedDeclaration {
        declaration,
        source,
        validation,
        discarded,
    })
}

fn decode_file(path: &Path, registry: &DecoderRegistry) -> Result<Declaration, ConvertError> {
    let data = fs::read(path).map_err(|source| ConvertError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let decoder = registry
        .decoder_for(&data)
        .map_err(|source| ConvertError::UnsupportedFormat {
            path: path.to_path_buf(),
            source,
        })?;
    let declaration = decoder.decode(&data).map_err(|source| ConvertError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        path = %path.display(),
        version = decoder.version(),
        services = declaration.services.len(),
        "decoded declaration"
    );
    Ok(declaration)
}
