//! Tree transforms over [`Node`](crate::core::Node) documents.
//!
//! - [`compress`] - collapse long numeric sequences into framed blobs
//! - [`decompress`] - inflate blobs back into nested sequences
//! - [`annotate`] - mark short flat sequences for flow-style output

mod compress;
mod decompress;
mod flow;

pub use compress::{compress, compress_with, PARALLEL_MIN_ITEMS};
pub use decompress::{decompress, inflate_blob};
pub use flow::annotate;
