//! # deckhand-transform
//!
//! Maps a [`deckhand_model::Declaration`] onto the resource objects of one
//! target distribution.
//!
//! The set of distributions is closed: [`Distro`] is parsed from the
//! configuration string and [`Distro::transformer`] is the only place that
//! picks a [`Transformer`] variant. Adding a distribution means adding an enum
//! variant, and every exhaustive `match` points at what else must change.
//!
//! Transformers are pure: no I/O, no global state, and the order of the
//! returned objects is the order they are written in.

pub mod distro;
pub mod error;
pub mod kubernetes;
pub mod openshift;
pub mod transformer;

pub use distro::Distro;
pub use error::TransformError;
pub use kubernetes::KubernetesTransformer;
pub use openshift::OpenshiftTransformer;
pub use transformer::{Transform, Transformer};
