//! # deckhand-model
//!
//! The in-memory declaration: what an application is made of, independent of
//! the file format it was written in and of the platform it will run on.
//!
//! Decoders (`deckhand-encoding`) produce a [`Declaration`]; transformers
//! (`deckhand-transform`) consume it. Neither side needs to know about the
//! other.
//!
//! ```text
//! Declaration
//!   ├── services[]        ← one deployable unit each
//!   │     ├── containers[] (image, env, ports, mounts)
//!   │     └── emptyDirVolumes[]
//!   └── volumes[]         ← persistent storage claims
//! ```

pub mod declaration;
pub mod validation;

pub use declaration::{
    AccessMode, Container, Declaration, EmptyDirVolume, EnvVariable, Mount, Port, PortMapping,
    PortType, Service, Volume, VolumeSource,
};
pub use validation::{
    ValidationErrors, ValidationFault, failure_class, is_dns_host, is_dns_label, is_quantity,
};
