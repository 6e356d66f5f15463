//! Bottom-up tree compressor.

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::config::Settings;
use crate::core::{array, frame, Mapping, Node, Sequence};
use crate::util::{Dtype, Result};

/// Sequences with at least this many children compress them on the rayon pool.
pub const PARALLEL_MIN_ITEMS: usize = 256;

/// Compress every sequence longer than `threshold` into a blob of `dtype`
/// elements, using default settings otherwise.
pub fn compress(node: Node, threshold: usize, dtype: Dtype) -> Result<Node> {
    let settings = Settings {
        threshold,
        dtype,
        ..Settings::default()
    };
    compress_with(node, &settings)
}

/// Compress a document with explicit settings.
///
/// Children are processed first. A sequence is then collapsed into one
/// [`Node::Blob`] when it has more than `threshold` items and none of its
/// processed items is already a blob. Any encoding error aborts the whole
/// document.
#[tracing::instrument(skip_all, fields(threshold = settings.threshold, dtype = %settings.dtype))]
pub fn compress_with(node: Node, settings: &Settings) -> Result<Node> {
    let out = compress_node(node, settings)?;
    debug!(blobs = out.count_blobs(), "compressed document");
    Ok(out)
}

fn compress_node(node: Node, settings: &Settings) -> Result<Node> {
    match node {
        Node::Sequence(seq) => compress_sequence(seq, settings),
        Node::Mapping(map) => map
            .into_iter()
            .map(|(k, v)| Ok((k, compress_node(v, settings)?)))
            .collect::<Result<Mapping>>()
            .map(Node::Mapping),
        Node::Null | Node::Bool(_) | Node::Number(_) | Node::Text(_) | Node::Blob(_) => Ok(node),
    }
}

fn compress_sequence(seq: Sequence, settings: &Settings) -> Result<Node> {
    let Sequence { items, style } = seq;

    let items: Vec<Node> = if items.len() >= PARALLEL_MIN_ITEMS {
        items
            .into_par_iter()
            .map(|item| compress_node(item, settings))
            .collect::<Result<_>>()?
    } else {
        items
            .into_iter()
            .map(|item| compress_node(item, settings))
            .collect::<Result<_>>()?
    };

    // blobs are opaque, they can't be merged into a parent array
    if items.iter().any(Node::is_blob) {
        trace!(len = items.len(), "sequence holds blobs, left as is");
        return Ok(Node::Sequence(Sequence::with_style(items, style)));
    }

    if items.len() > settings.threshold {
        let payload = array::encode(&items, settings.dtype)?;
        let framed = frame::frame(&payload, settings.level)?;
        trace!(
            len = items.len(),
            payload = payload.len(),
            framed = framed.len(),
            "collapsed sequence"
        );
        return Ok(Node::Blob(framed));
    }

    Ok(Node::Sequence(Sequence::with_style(items, style)))
}
