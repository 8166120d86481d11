//! # deckhand-encoding
//!
//! Turns raw bytes into a [`deckhand_model::Declaration`].
//!
//! The decoder is picked by looking at the content, never at the file name:
//! every supported document is a YAML (or JSON) mapping with a top-level
//! `version` field, and each version has exactly one decoder.
//!
//! ```text
//! bytes ──sniff `version`──▶ DecoderRegistry ──▶ Decoder ──▶ Declaration
//! ```

pub mod error;
pub mod registry;
pub mod v0_1_dev;

pub use error::EncodingError;
pub use registry::{Decoder, DecoderRegistry, sniff_version};
pub use v0_1_dev::V01DevDecoder;
