//! Error types for decoder selection and decoding.

/// Errors raised while sniffing or decoding a declaration.
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    /// The bytes are not a single YAML or JSON document.
    #[error("content is not a YAML or JSON document: {0}")]
    NotADocument(#[source] serde_yaml::Error),

    #[error("document root must be a mapping")]
    RootNotMapping,

    #[error("document has no `version` field")]
    MissingVersion,

    #[error("`version` must be a string")]
    InvalidVersion,

    /// No registered decoder understands this version.
    #[error("unsupported version `{version}` (supported: {supported})")]
    UnsupportedVersion { version: String, supported: String },

    /// The document does not match the decoder's schema.
    #[error("{0}")]
    Schema(#[source] serde_yaml::Error),

    /// A field parsed but its value is malformed.
    #[error("{path}: {message}")]
    Field { path: String, message: String },
}
