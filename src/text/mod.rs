//! Text codecs around the document tree.
//!
//! - [`yaml`] - YAML parsing and emitting, blobs as `!binary` scalars
//! - [`json`] - JSON input for externally supplied data objects

mod events;
pub mod json;
pub mod yaml;
