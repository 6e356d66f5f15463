//! Core layer - document model and binary codecs.
//!
//! This module provides:
//! - [`Node`] - the document tree
//! - [`array`] - nested numeric sequences to self-describing payloads
//! - [`frame`] - gzip framing of payloads
//! - [`format`] - payload header constants

mod node;
pub mod array;
pub mod format;
pub mod frame;

pub use node::{Mapping, Node, Number, Sequence, Style};
pub use array::ArrayData;
