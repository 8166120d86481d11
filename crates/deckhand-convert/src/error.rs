//! Error types for the conversion pipeline.

use crate::output::RouteError;
use crate::resolve::VersionError;
use crate::serialize::SerializeError;
use deckhand_encoding::EncodingError;
use deckhand_model::ValidationErrors;
use deckhand_transform::TransformError;
use std::fmt;
use std::path::PathBuf;

/// Coarse classification of a [`ConvertError`], stable across message
/// wording changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCategory {
    Configuration,
    Io,
    UnsupportedFormat,
    Decode,
    Validation,
    Transform,
    Version,
    Serialize,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "ConfigurationError",
            Self::Io => "IOError",
            Self::UnsupportedFormat => "UnsupportedFormatError",
            Self::Decode => "DecodeError",
            Self::Validation => "ValidationError",
            Self::Transform => "TransformError",
            Self::Version => "VersionError",
            Self::Serialize => "SerializeError",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything that can end a conversion run.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("{0}")]
    Configuration(String),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: no decoder for this content: {source}", path.display())]
    UnsupportedFormat {
        path: PathBuf,
        #[source]
        source: EncodingError,
    },

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: EncodingError,
    },

    #[error("declaration is invalid: {0}")]
    Validation(#[source] ValidationErrors),

    #[error("transformation failed: {0}")]
    Transform(#[source] TransformError),

    #[error("{kind} `{name}`: {source}")]
    Version {
        kind: String,
        name: String,
        #[source]
        source: VersionError,
    },

    #[error("failed to serialize {kind} `{name}`: {source}")]
    Serialize {
        kind: String,
        name: String,
        #[source]
        source: SerializeError,
    },

    #[error("failed to write {kind} `{name}`: {source}")]
    Write {
        kind: String,
        name: String,
        #[source]
        source: RouteError,
    },
}

impl ConvertError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Read { .. } => ErrorCategory::Io,
            Self::UnsupportedFormat { .. } => ErrorCategory::UnsupportedFormat,
            Self::Decode { .. } => ErrorCategory::Decode,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Transform(_) => ErrorCategory::Transform,
            Self::Version { .. } => ErrorCategory::Version,
            Self::Serialize { .. } => ErrorCategory::Serialize,
            Self::Write { .. } => ErrorCategory::Io,
        }
    }
}

impl From<TransformError> for ConvertError {
    fn from(error: TransformError) -> Self {
        Self::Transform(error)
    }
}
