//! Utility types shared by the codecs and tree transforms.
//!
//! - [`Dtype`] - numeric element widths
//! - [`Shape`] - array dimensions
//! - [`Error`] / [`Result`] - error handling

mod dtype;
mod error;
mod shape;

pub use dtype::*;
pub use error::*;
pub use shape::*;
