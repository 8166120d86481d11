//! # deckhand-convert
//!
//! The conversion pipeline and its stages:
//!
//! ```text
//! load ──> validate ──> transform ──> resolve ──> serialize ──> route
//! (load)               (deckhand-    (resolve)   (serialize)   (output)
//!                       transform)
//! ```
//!
//! [`run_convert`] drives one run. It is synchronous and handles one resource
//! at a time in transformer order; the first failure ends the run and nothing
//! already written is rolled back.

pub mod error;
pub mod load;
pub mod output;
pub mod pipeline;
pub mod resolve;
pub mod serialize;

pub use error::{ConvertError, ErrorCategory};
pub use load::{LoadedDeclaration, load};
pub use output::{CollisionPolicy, OutputRouter, OutputTarget, RouteError, Routed};
pub use pipeline::{ConvertOptions, ConvertSummary, Emitted, ValidationPolicy, run_convert};
pub use resolve::{VersionError, VersionResolver};
pub use serialize::{SerializeError, serialize};
