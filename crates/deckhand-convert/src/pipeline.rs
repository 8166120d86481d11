//! The convert run: configuration checks, load, transform, then resolve,
//! serialize and route each resource in order.

use crate::error::ConvertError;
use crate::load::load;
use crate::output::{CollisionPolicy, OutputRouter, OutputTarget, Routed};
use crate::resolve::VersionResolver;
use crate::serialize::serialize;
use deckhand_api::Scheme;
use deckhand_encoding::DecoderRegistry;
use deckhand_model::ValidationFault;
use deckhand_transform::{Distro, Transform};
use std::io::Write;
use std::path::PathBuf;

/// Whether validation faults stop the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationPolicy {
    /// Log each fault and convert anyway.
    #[default]
    Report,
    Strict,
}

/// Inputs of one run, as strings where they come from configuration.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub files: Vec<PathBuf>,
    pub distro: String,
    pub output_dir: String,
    pub validation: ValidationPolicy,
    pub collisions: CollisionPolicy,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            distro: Distro::default().to_string(),
            output_dir: crate::output::STREAM_SENTINEL.to_string(),
            validation: ValidationPolicy::default(),
            collisions: CollisionPolicy::default(),
        }
    }
}

/// One resource that reached its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emitted {
    pub kind: &'static str,
    pub name: Option<String>,
    pub api_version: String,
    pub routed: Routed,
}

#[derive(Debug, Clone)]
pub struct ConvertSummary {
    pub distro: Distro,
    pub emitted: Vec<Emitted>,
    /// Faults tolerated under [`ValidationPolicy::Report`].
    pub faults: Vec<ValidationFault>,
}

/// Run one conversion. `sink` receives the documents when the output target
/// is the stream; a failure part way leaves earlier output in place.
pub fn run_convert<W: Write>(
    options: &ConvertOptions,
    registry: &DecoderRegistry,
    scheme: &Scheme,
    sink: W,
) -> Result<ConvertSummary, ConvertError> {
    let distro: Distro = options
        .distro
        .parse()
        .map_err(ConvertError::Configuration)?;
    let target = OutputTarget::parse(&options.output_dir).map_err(ConvertError::Configuration)?;
    if options.files.is_empty() {
        return Err(ConvertError::Configuration(
            "there has to be at least one file".to_string(),
        ));
    }

    let loaded = load(&options.files, registry)?;
    let faults = match loaded.validation {
        Ok(()) => Vec::new(),
        Err(errors) => match options.validation {
            ValidationPolicy::Strict => return Err(ConvertError::Validation(errors)),
            ValidationPolicy::Report => {
                for fault in &errors.faults {
                    tracing::warn!(
                        failure_class = %fault.failure_class,
                        path = %fault.path,
                        "{}",
                        fault.message
                    );
                }
                errors.faults
            }
        },
    };

    let resources = distro.transformer().transform(&loaded.declaration)?;
    tracing::info!(
        source = %loaded.source.display(),
        %distro,
        output = %target,
        objects = resources.len(),
        "converting"
    );

    let resolver = VersionResolver::new(scheme);
    let mut router = OutputRouter::new(target, sink, options.collisions);
    let mut emitted = Vec::with_capacity(resources.len());
    for mut resource in resources {
        let kind = resource.kind();
        let name = resource.name().map(str::to_string);
        let label = name.clone().unwrap_or_default();

        let gvk = resolver
            .resolve(&mut resource)
            .map_err(|source| ConvertError::Version {
                kind: kind.to_string(),
                name: label.clone(),
                source,
            })?;
        let data = serialize(&resource).map_err(|source| ConvertError::Serialize {
            kind: kind.to_string(),
            name: label.clone(),
            source,
        })?;
        let routed = router
            .route(&resource, &data)
            .map_err(|source| ConvertError::Write {
                kind: kind.to_string(),
                name: label,
                source,
            })?;
        tracing::debug!(%gvk, name = ?name, to = %routed, "emitted");
        emitted.push(Emitted {
            kind,
            name,
            api_version: gvk.api_version(),
            routed,
        });
    }

    Ok(ConvertSummary {
        distro,
        emitted,
        faults,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    #[test]
    fn unknown_distro_fails_before_reading_files() {
        let options = ConvertOptions {
            files: vec![PathBuf::from("/definitely/not/here.yaml")],
            distro: "mesos".into(),
            ..ConvertOptions::default()
        };
        let mut sink = Vec::new();
        let err = run_convert(
            &options,
            &DecoderRegistry::with_defaults(),
            &Scheme::standard(),
            &mut sink,
        )
        .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.to_string().contains("unknown distro 'mesos'"), "{err}");
        assert!(sink.is_empty());
    }

    #[test]
    fn empty_output_dir_is_a_configuration_error() {
        let options = ConvertOptions {
            files: vec![PathBuf::from("/definitely/not/here.yaml")],
            output_dir: String::new(),
            ..ConvertOptions::default()
        };
        let err = run_convert(
            &options,
            &DecoderRegistry::with_defaults(),
            &Scheme::standard(),
            std::io::sink(),
        )
        .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn default_options_target_kubernetes_on_stdout() {
        let options = ConvertOptions::default();
        assert_eq!(options.distro, "kubernetes");
        assert_eq!(options.output_dir, "-");
        assert_eq!(options.validation, ValidationPolicy::Report);
        assert_eq!(options.collisions, CollisionPolicy::Overwrite);
    }
}
