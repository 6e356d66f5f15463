//! Flow-style hints for short flat sequences.

use crate::core::{Mapping, Node, Sequence, Style};

/// Mark every sequence that holds only scalars and has fewer than
/// `flow_threshold` items as [`Style::Flow`]; all other sequences get
/// [`Style::Block`]. Values are never touched.
pub fn annotate(node: Node, flow_threshold: usize) -> Node {
    match node {
        Node::Sequence(seq) => {
            let items: Vec<Node> = seq
                .items
                .into_iter()
                .map(|item| annotate(item, flow_threshold))
                .collect();
            let flat = items.iter().all(Node::is_scalar);
            let style = if flat && items.len() < flow_threshold {
                Style::Flow
            } else {
                Style::Block
            };
            Node::Sequence(Sequence::with_style(items, style))
        }
        Node::Mapping(map) => Node::Mapping(
            map.into_iter()
                .map(|(k, v)| (k, annotate(v, flow_threshold)))
                .collect::<Mapping>(),
        ),
        Node::Null | Node::Bool(_) | Node::Number(_) | Node::Text(_) | Node::Blob(_) => node,
    }
}
