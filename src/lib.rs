//! # crazyfile
//!
//! Shrinks YAML documents whose bulk is long numeric arrays by replacing
//! those arrays with gzip-framed, dtype-narrowed binary blobs, and restores
//! them again.
//!
//! Narrowing is lossy: a blob stored as `float16` comes back with `float16`
//! precision, promoted to `f64`.
//!
//! ## Modules
//!
//! - [`util`] - Basic types (Dtype, Shape, errors)
//! - [`core`] - Document tree, array codec, frame codec
//! - [`tree`] - Compress / decompress / flow-style transforms
//! - [`text`] - YAML and JSON codecs
//! - [`config`] - Transform settings
//! - [`file`] - File-level operations
//! - [`report`] - Size and precision report
//!
//! ## Example
//!
//! ```
//! use crazyfile::prelude::*;
//!
//! let doc = Node::Mapping(
//!     [("a", Node::floats(&(1..=30).map(|i| i as f64 / 100.0).collect::<Vec<_>>()))]
//!         .into_iter()
//!         .collect(),
//! );
//! let packed = compress(doc.clone(), 10, Dtype::Float16)?;
//! assert!(packed.get("a").unwrap().is_blob());
//!
//! let restored = decompress(packed)?;
//! assert_eq!(restored.get("a").unwrap().as_sequence().unwrap().len(), 30);
//! # Ok::<(), crazyfile::Error>(())
//! ```

pub mod util;
pub mod core;
pub mod tree;
pub mod text;
pub mod config;
pub mod file;
pub mod report;

// Re-export commonly used types
pub use util::{Dtype, Error, Result, Shape};
pub use config::Settings;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Dtype, Error, Result, Shape};
    pub use crate::core::{Mapping, Node, Number, Sequence, Style};
    pub use crate::config::Settings;
    pub use crate::tree::{annotate, compress, compress_with, decompress};
    pub use crate::file::{crazy_to_yaml, load_crazy, store_data_to_crazy, yaml_to_crazy};
}
