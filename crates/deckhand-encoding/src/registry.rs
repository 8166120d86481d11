//! Decoder selection by content.

use crate::error::EncodingError;
use crate::v0_1_dev::V01DevDecoder;
use deckhand_model::Declaration;
use serde_yaml::Value;
use std::collections::BTreeMap;

/// Decodes one version of the declaration format.
pub trait Decoder: Send + Sync {
    /// The `version` value this decoder accepts.
    fn version(&self) -> &str;

    fn decode(&self, data: &[u8]) -> Result<Declaration, EncodingError>;
}

/// Version-keyed set of decoders.
#[derive(Default)]
pub struct DecoderRegistry {
    decoders: BTreeMap<String, Box<dyn Decoder>>,
}

impl DecoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every decoder shipped in this crate.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(V01DevDecoder));
        registry
    }

    /// Add a decoder. A later registration for the same version replaces the
    /// earlier one.
    pub fn register(&mut self, decoder: Box<dyn Decoder>) {
        self.decoders.insert(decoder.version().to_string(), decoder);
    }

    pub fn supported_versions(&self) -> Vec<&str> {
        self.decoders.keys().map(String::as_str).collect()
    }

    /// Pick the decoder for `data` by reading its `version` field.
    pub fn decoder_for(&self, data: &[u8]) -> Result<&dyn Decoder, EncodingError> {
        let version = sniff_version(data)?;
        let decoder = self.decoders.get(&version).ok_or_else(|| {
            EncodingError::UnsupportedVersion {
                version: version.clone(),
                supported: self.supported_versions().join(", "),
            }
        })?;
        tracing::debug!(version = %version, "selected decoder");
        Ok(decoder.as_ref())
    }
}

/// Read the top-level `version` of a YAML or JSON document.
pub fn sniff_version(data: &[u8]) -> Result<String, EncodingError> {
    let document: Value = serde_yaml::from_slice(data).map_err(EncodingError::NotADocument)?;
    let Value::Mapping(root) = document else {
        return Err(EncodingError::RootNotMapping);
    };
    match root.get("version") {
        None | Some(Value::Null) => Err(EncodingError::MissingVersion),
        Some(Value::String(version)) => Ok(version.trim().to_string()),
        Some(_) => Err(EncodingError::InvalidVersion),
    }
}
