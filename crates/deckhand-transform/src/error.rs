//! Error types for transformation.

use crate::distro::Distro;

/// A declared entity that could not be mapped onto the target distribution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    /// A mount names a volume that exists neither at the root nor in the
    /// service's emptyDir volumes.
    #[error("service `{service}`: mount references unknown volume `{volume}`")]
    UnknownVolume { service: String, volume: String },

    /// Two declared entities map onto the same platform object.
    #[error("{entity}: {reason}")]
    Conflict { entity: String, reason: String },

    /// The declaration uses something the distribution cannot express.
    #[error("{entity}: {reason} is not supported by {distro}")]
    Unsupported {
        distro: Distro,
        entity: String,
        reason: String,
    },
}
