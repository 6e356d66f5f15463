//! JSON input/output for document trees.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;
use std::path::Path;

use crate::core::{Mapping, Node, Number};
use crate::util::Result;

/// Parse JSON text into a document tree. Object key order is kept.
pub fn parse(text: &str) -> Result<Node> {
    let value: Value = serde_json::from_str(text)?;
    Ok(from_value(value))
}

/// Load a JSON data file.
pub fn load(path: impl AsRef<Path>) -> Result<Node> {
    let text = std::fs::read_to_string(path.as_ref())?;
    parse(&text)
}

pub fn from_value(value: Value) -> Node {
    match value {
        Value::Null => Node::Null,
        Value::Bool(b) => Node::Bool(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Node::int(i),
            None => Node::float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => Node::Text(s),
        Value::Array(items) => Node::seq(items.into_iter().map(from_value).collect()),
        Value::Object(map) => Node::Mapping(
            map.into_iter()
                .map(|(k, v)| (k, from_value(v)))
                .collect::<Mapping>(),
        ),
    }
}

/// Convert a tree to JSON. Non-finite floats become `null`, blobs become
/// base64 strings.
pub fn to_value(node: &Node) -> Value {
    match node {
        Node::Null => Value::Null,
        Node::Bool(b) => Value::Bool(*b),
        Node::Number(Number::Int(i)) => Value::from(*i),
        Node::Number(Number::Float(f)) => Value::from(*f),
        Node::Text(s) => Value::String(s.clone()),
        Node::Sequence(s) => Value::Array(s.iter().map(to_value).collect()),
        Node::Mapping(m) => Value::Object(
            m.iter()
                .map(|(k, v)| (k.to_string(), to_value(v)))
                .collect(),
        ),
        Node::Blob(bytes) => Value::String(BASE64.encode(bytes)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_order() {
        let doc = parse(r#"{"z": 1, "a": [0.5, 2], "m": {"k": null, "t": "x"}}"#).unwrap();
        let keys: Vec<&str> = doc.as_mapping().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(doc.get("a"), Some(&Node::seq(vec![Node::float(0.5), Node::int(2)])));
        assert_eq!(doc.get("m").and_then(|m| m.get("t")), Some(&Node::from("x")));
    }

    #[test]
    fn test_big_unsigned_becomes_float() {
        let doc = parse("18446744073709551615").unwrap();
        assert_eq!(doc, Node::float(u64::MAX as f64));
    }

    #[test]
    fn test_to_value() {
        let doc = parse(r#"{"a": [1, 2.5, "s", true, null]}"#).unwrap();
        assert_eq!(
            to_value(&doc),
            serde_json::json!({"a": [1, 2.5, "s", true, null]})
        );
        assert_eq!(to_value(&Node::float(f64::NAN)), Value::Null);
    }
}
