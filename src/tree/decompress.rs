//! Tree decompressor.

use rayon::prelude::*;
use tracing::{debug, trace};

use super::compress::PARALLEL_MIN_ITEMS;
use crate::core::{array, frame, Mapping, Node, Sequence};
use crate::util::Result;

/// Replace every [`Node::Blob`] in the tree with the nested numeric sequence
/// it encodes.
///
/// Documents without blobs come back unchanged. A corrupt blob fails the
/// whole call; nothing is partially reconstructed.
#[tracing::instrument(skip_all)]
pub fn decompress(node: Node) -> Result<Node> {
    let blobs = node.count_blobs();
    let out = decompress_node(node)?;
    debug!(blobs, "decompressed document");
    Ok(out)
}

/// Unframe and decode a single blob payload.
pub fn inflate_blob(bytes: &[u8]) -> Result<Node> {
    let raw = frame::unframe(bytes)?;
    let node = array::decode(&raw)?;
    trace!(framed = bytes.len(), raw = raw.len(), "inflated blob");
    Ok(node)
}

fn decompress_node(node: Node) -> Result<Node> {
    match node {
        Node::Blob(bytes) => inflate_blob(&bytes),
        Node::Sequence(Sequence { items, style }) => {
            let items: Vec<Node> = if items.len() >= PARALLEL_MIN_ITEMS {
                items.into_par_iter().map(decompress_node).collect::<Result<_>>()?
            } else {
                items.into_iter().map(decompress_node).collect::<Result<_>>()?
            };
            Ok(Node::Sequence(Sequence::with_style(items, style)))
        }
        Node::Mapping(map) => map
            .into_iter()
            .map(|(k, v)| Ok((k, decompress_node(v)?)))
            .collect::<Result<Mapping>>()
            .map(Node::Mapping),
        Node::Null | Node::Bool(_) | Node::Number(_) | Node::Text(_) => Ok(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::compress;
    use crate::util::{Dtype, Error};

    fn sample_doc() -> Node {
        let states: Vec<Node> = (0..30)
            .map(|i| {
                let x = i as f64 / 30.0;
                Node::floats(&[x, 1.0 - x, x * x, 0.5])
            })
            .collect();
        Node::Mapping(
            [
                ("delta", Node::float(42.0)),
                ("human_readable", Node::from("Example human readable text")),
                ("states", Node::seq(states)),
                ("tags", Node::seq(vec![Node::from("a"), Node::from("b")])),
            ]
            .into_iter()
            .collect(),
        )
    }

    #[test]
    fn test_roundtrip_float64_exact() {
        let doc = sample_doc();
        let packed = compress(doc.clone(), 10, Dtype::Float64).unwrap();
        assert_eq!(packed.count_blobs(), 1);
        assert_eq!(decompress(packed).unwrap(), doc);
    }

    #[test]
    fn test_idempotent_without_blobs() {
        let doc = sample_doc();
        let once = decompress(doc.clone()).unwrap();
        assert_eq!(once, doc);
        assert_eq!(decompress(once).unwrap(), doc);
    }

    #[test]
    fn test_corrupt_magic() {
        let raw = array::encode(&[Node::float(1.0), Node::float(2.0)], Dtype::Float16).unwrap();
        let mut bad = raw.clone();
        bad[0] = b'Z';
        let doc = Node::seq(vec![
            Node::floats(&[1.0]),
            Node::Blob(frame::frame(&raw, 9).unwrap()),
            Node::Blob(frame::frame(&bad, 9).unwrap()),
        ]);
        let err = decompress(doc).unwrap_err();
        assert!(matches!(err, Error::MalformedPayload(_)), "{err}");
    }

    #[test]
    fn test_huge_empty_shape() {
        let mut raw = array::encode(&[Node::seq(vec![]), Node::seq(vec![])], Dtype::Float16).unwrap();
        raw[7..15].copy_from_slice(&(1u64 << 40).to_le_bytes());
        let doc = Node::Mapping([("a", Node::Blob(frame::frame(&raw, 9).unwrap()))].into_iter().collect());
        let err = decompress(doc).unwrap_err();
        assert!(matches!(err, Error::MalformedPayload(_)), "{err}");
    }

    #[test]
    fn test_corrupt_frame() {
        let doc = Node::Mapping([("a", Node::Blob(b"not gzip".to_vec()))].into_iter().collect());
        assert!(matches!(decompress(doc), Err(Error::CorruptFrame(_))));
    }

    #[test]
    fn test_nested_blob_in_sequence() {
        let raw = array::encode(&[Node::int(1), Node::int(2)], Dtype::Int16).unwrap();
        let doc = Node::seq(vec![Node::Blob(frame::frame(&raw, 9).unwrap()), Node::int(3)]);
        let out = decompress(doc).unwrap();
        assert_eq!(
            out,
            Node::seq(vec![Node::seq(vec![Node::int(1), Node::int(2)]), Node::int(3)])
        );
    }
}
