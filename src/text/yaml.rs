//! YAML codec.
//!
//! Parsing walks libyaml events so core tags such as `!!binary` survive;
//! plain scalars are typed the way `serde_yaml` types them. Emitting is done
//! here so sequence [`Style`] hints and blob scalars come out the way the
//! tree says.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use super::events::{Event, EventReader, Props, Scalar};
use crate::core::{Mapping, Node, Number, Sequence, Style};
use crate::util::{Error, Result};

/// First line of every compressed document.
pub const CRAZY_HEADER: &str =
    "# .crazy.yaml file. Use crazyfile decompress to restore to normal YAML";

/// Tag written in front of blob scalars.
pub const BINARY_TAG: &str = "!binary";

const BASE64_LINE: usize = 76;
const INDENT: usize = 2;

/// Deepest container nesting accepted by the parser.
pub const MAX_DEPTH: usize = 128;

/// Total nodes that alias expansion may copy into one document.
const MAX_ALIAS_NODES: usize = 1 << 20;

/// libyaml drops implicit keys longer than this many bytes.
const MAX_IMPLICIT_KEY: usize = 1024;

const CORE: &str = "tag:yaml.org,2002:";

// ============================================================================
// Parsing
// ============================================================================

/// Parse YAML text into a document tree.
///
/// An empty stream is `Null`. More than one document is `InvalidDocument`.
pub fn parse(text: &str) -> Result<Node> {
    let mut loader = Loader::new(text);
    match loader.document() {
        // libyaml only says where it stopped, serde_yaml words the message
        Err(e) if loader.events.failed() => {
            match serde_yaml::from_str::<serde_yaml::Value>(text) {
                Err(yaml) => Err(Error::Yaml(yaml)),
                Ok(_) => Err(e),
            }
        }
        other => other,
    }
}

struct Loader<'a> {
    events: EventReader<'a>,
    anchors: HashMap<String, Node>,
    alias_budget: usize,
}

impl<'a> Loader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            events: EventReader::new(text),
            anchors: HashMap::new(),
            alias_budget: MAX_ALIAS_NODES,
        }
    }

    fn next(&mut self) -> Result<Event> {
        self.events
            .next_event()
            .ok_or_else(|| Error::invalid("YAML syntax error"))
    }

    fn document(&mut self) -> Result<Node> {
        if !matches!(self.next()?, Event::StreamStart) {
            return Err(Error::invalid("missing YAML stream start"));
        }
        match self.next()? {
            Event::StreamEnd => return Ok(Node::Null),
            Event::DocumentStart => {}
            other => return Err(unexpected(&other)),
        }
        let first = self.next()?;
        let root = self.node(first, 0)?;
        if !matches!(self.next()?, Event::DocumentEnd) {
            return Err(Error::invalid("missing YAML document end"));
        }
        match self.next()? {
            Event::StreamEnd => Ok(root),
            Event::DocumentStart => Err(Error::invalid("more than one YAML document")),
            other => Err(unexpected(&other)),
        }
    }

    fn node(&mut self, event: Event, depth: usize) -> Result<Node> {
        match event {
            Event::Alias(name) => self.alias(&name, depth),
            Event::Scalar(scalar) => {
                let anchor = scalar.props.anchor.clone();
                let node = scalar_node(scalar)?;
                Ok(self.remember(anchor, node))
            }
            Event::SequenceStart(props) => {
                check_collection(&props, "seq", depth)?;
                let mut items = Vec::new();
                loop {
                    match self.next()? {
                        Event::SequenceEnd => break,
                        event => items.push(self.node(event, depth + 1)?),
                    }
                }
                Ok(self.remember(props.anchor, Node::seq(items)))
            }
            Event::MappingStart(props) => {
                check_collection(&props, "map", depth)?;
                let mut map = Mapping::new();
                loop {
                    let key = match self.next()? {
                        Event::MappingEnd => break,
                        event => key_string(self.node(event, depth + 1)?)?,
                    };
                    let event = self.next()?;
                    let value = self.node(event, depth + 1)?;
                    if map.contains_key(&key) {
                        return Err(Error::invalid(format!("duplicate key '{}'", key)));
                    }
                    map.insert(key, value);
                }
                Ok(self.remember(props.anchor, Node::Mapping(map)))
            }
            other => Err(unexpected(&other)),
        }
    }

    fn remember(&mut self, anchor: Option<String>, node: Node) -> Node {
        if let Some(name) = anchor {
            self.anchors.insert(name, node.clone());
        }
        node
    }

    fn alias(&mut self, name: &str, depth: usize) -> Result<Node> {
        let node = self
            .anchors
            .get(name)
            .ok_or_else(|| Error::invalid(format!("unknown anchor '{}'", name)))?;
        let (count, height) = measure(node);
        if depth + height > MAX_DEPTH + 1 {
            return Err(Error::invalid(format!(
                "alias '{}' nests deeper than {} levels",
                name, MAX_DEPTH
            )));
        }
        if count > self.alias_budget {
            return Err(Error::invalid(format!(
                "aliases expand to more than {} nodes",
                MAX_ALIAS_NODES
            )));
        }
        self.alias_budget -= count;
        Ok(node.clone())
    }
}

/// Node count and nesting height, scalars are height 1.
fn measure(node: &Node) -> (usize, usize) {
    let add = |(count, height): (usize, usize), child: &Node| {
        let (c, h) = measure(child);
        (count + c, height.max(h + 1))
    };
    match node {
        Node::Sequence(s) => s.iter().fold((1, 1), add),
        Node::Mapping(m) => m.iter().map(|(_, v)| v).fold((1, 1), add),
        _ => (1, 1),
    }
}

fn unexpected(event: &Event) -> Error {
    Error::invalid(format!("unexpected YAML event {:?}", event))
}

fn check_collection(props: &Props, kind: &str, depth: usize) -> Result<()> {
    if depth >= MAX_DEPTH {
        return Err(Error::invalid(format!("nesting deeper than {} levels", MAX_DEPTH)));
    }
    match props.tag.as_deref() {
        None | Some("!") => Ok(()),
        Some(tag) if tag.strip_prefix(CORE) == Some(kind) => Ok(()),
        Some(tag) => Err(Error::invalid(format!("unsupported tag {} on a {}", tag, kind))),
    }
}

fn scalar_node(scalar: Scalar) -> Result<Node> {
    let Scalar { props, value, plain } = scalar;
    let Some(tag) = props.tag else {
        return Ok(if plain { resolve_plain(value) } else { Node::Text(value) });
    };
    let core = match tag.strip_prefix(CORE) {
        Some(name) => name,
        None if tag == BINARY_TAG => return blob(&value),
        None if tag == "!" => return Ok(Node::Text(value)),
        None => return Err(Error::invalid(format!("unsupported tag {}", tag))),
    };
    let typed = match core {
        "str" => return Ok(Node::Text(value)),
        "binary" => return blob(&value),
        "null" => (value.is_empty() || is_null(&value)).then_some(Node::Null),
        "bool" => parse_bool(&value).map(Node::Bool),
        "int" => parse_int(&value).map(int_node),
        "float" => parse_float(&value)
            .or_else(|| parse_int(&value).map(|i| i as f64))
            .map(Node::float),
        _ => return Err(Error::invalid(format!("unsupported tag {}", tag))),
    };
    typed.ok_or_else(|| Error::invalid(format!("'{}' is not a valid {}", value, tag)))
}

fn blob(text: &str) -> Result<Node> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = BASE64
        .decode(compact.as_bytes())
        .map_err(|e| Error::invalid(format!("bad base64 in binary scalar: {}", e)))?;
    Ok(Node::Blob(bytes))
}

/// Type an untagged plain scalar: null, bool, int, float, else text.
fn resolve_plain(value: String) -> Node {
    if value.is_empty() || is_null(&value) {
        return Node::Null;
    }
    if let Some(b) = parse_bool(&value) {
        return Node::Bool(b);
    }
    if let Some(i) = parse_int(&value) {
        return int_node(i);
    }
    if !leading_zero_digits(&value) {
        if let Some(f) = parse_float(&value) {
            return Node::float(f);
        }
    }
    Node::Text(value)
}

fn is_null(s: &str) -> bool {
    matches!(s, "null" | "Null" | "NULL" | "~")
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Decimal, `0x`, `0o` and `0b` integers with an optional sign.
fn parse_int(s: &str) -> Option<i128> {
    let (negative, body) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (radix, digits) = if let Some(rest) = body.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = body.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = body.strip_prefix("0b") {
        (2, rest)
    } else {
        (10, body)
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    if radix == 10 && leading_zero_digits(s) {
        return None;
    }
    let magnitude = i128::from_str_radix(digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// `007` and friends are strings in YAML 1.2.
fn leading_zero_digits(s: &str) -> bool {
    let s = s.strip_prefix(['-', '+']).unwrap_or(s);
    s.len() > 1 && s.starts_with('0') && s[1..].bytes().all(|b| b.is_ascii_digit())
}

fn parse_float(s: &str) -> Option<f64> {
    let unsigned = match s.strip_prefix('+') {
        Some(rest) if rest.starts_with(['+', '-']) => return None,
        Some(rest) => rest,
        None => s,
    };
    match unsigned {
        ".inf" | ".Inf" | ".INF" => return Some(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => return Some(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => return Some(f64::NAN),
        _ => {}
    }
    unsigned.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Integers past `i64` become floats.
fn int_node(i: i128) -> Node {
    match i64::try_from(i) {
        Ok(i) => Node::int(i),
        Err(_) => Node::float(i as f64),
    }
}

/// Scalar keys are stringified, collection and blob keys are rejected.
fn key_string(key: Node) -> Result<String> {
    match key {
        Node::Text(s) => Ok(s),
        Node::Number(n) => Ok(number_text(n)),
        Node::Bool(b) => Ok(b.to_string()),
        Node::Null => Ok("null".to_string()),
        Node::Sequence(_) | Node::Mapping(_) | Node::Blob(_) => {
            Err(Error::invalid("mapping keys must be scalars"))
        }
    }
}

// ============================================================================
// Emitting
// ============================================================================

/// Render a document as YAML.
pub fn to_string(node: &Node) -> String {
    let mut emitter = Emitter::default();
    emitter.document(node);
    emitter.out
}

/// Render a compressed document: header comment line, then YAML.
pub fn to_crazy_string(node: &Node) -> String {
    format!("{}\n{}", CRAZY_HEADER, to_string(node))
}

#[derive(Default)]
struct Emitter {
    out: String,
}

impl Emitter {
    fn pad(&mut self, indent: usize) {
        self.out.extend(std::iter::repeat(' ').take(indent));
    }

    fn document(&mut self, node: &Node) {
        match node {
            Node::Mapping(m) if !m.is_empty() => self.mapping(m, 0, false),
            Node::Sequence(s) if is_block(s) => self.block_seq(s, 0, false),
            Node::Blob(bytes) => {
                self.out.push_str(BINARY_TAG);
                self.blob_literal(bytes, 0);
            }
            other => {
                self.out.push_str(&inline(other, Context::Block));
                self.out.push('\n');
            }
        }
    }

    /// `first_inline`: the first entry continues a `- ` already written.
    fn mapping(&mut self, map: &Mapping, indent: usize, first_inline: bool) {
        for (i, (key, value)) in map.iter().enumerate() {
            if !(first_inline && i == 0) {
                self.pad(indent);
            }
            let key = scalar_text(key, Context::Key);
            if key.len() < MAX_IMPLICIT_KEY {
                self.out.push_str(&key);
            } else {
                self.out.push_str("? ");
                self.out.push_str(&key);
                self.out.push('\n');
                self.pad(indent);
            }
            self.out.push(':');
            self.value(value, indent);
        }
    }

    fn block_seq(&mut self, seq: &Sequence, indent: usize, first_inline: bool) {
        for (i, item) in seq.iter().enumerate() {
            if !(first_inline && i == 0) {
                self.pad(indent);
            }
            self.out.push('-');
            match item {
                Node::Mapping(m) if !m.is_empty() => {
                    self.out.push(' ');
                    self.mapping(m, indent + INDENT, true);
                }
                Node::Sequence(s) if is_block(s) => {
                    self.out.push(' ');
                    self.block_seq(s, indent + INDENT, true);
                }
                other => self.value(other, indent),
            }
        }
    }

    /// Emit a value after a `key:` or `-` marker at `indent`.
    fn value(&mut self, node: &Node, indent: usize) {
        match node {
            Node::Mapping(m) if !m.is_empty() => {
                self.out.push('\n');
                self.mapping(m, indent + INDENT, false);
            }
            Node::Sequence(s) if is_block(s) => {
                self.out.push('\n');
                self.block_seq(s, indent + INDENT, false);
            }
            Node::Blob(bytes) => {
                self.out.push(' ');
                self.out.push_str(BINARY_TAG);
                self.blob_literal(bytes, indent + INDENT);
            }
            other => {
                self.out.push(' ');
                self.out.push_str(&inline(other, Context::Block));
                self.out.push('\n');
            }
        }
    }

    fn blob_literal(&mut self, bytes: &[u8], indent: usize) {
        self.out.push_str(" |\n");
        let encoded = BASE64.encode(bytes);
        for line in encoded.as_bytes().chunks(BASE64_LINE) {
            self.pad(indent.max(INDENT));
            // base64 output is ASCII
            self.out.push_str(std::str::from_utf8(line).unwrap_or_default());
            self.out.push('\n');
        }
    }
}

fn is_block(seq: &Sequence) -> bool {
    seq.style == Style::Block && !seq.is_empty()
}

/// Single-line rendering of scalars, flow sequences and empty containers.
fn inline(node: &Node, ctx: Context) -> String {
    match node {
        Node::Null => "null".to_string(),
        Node::Bool(b) => b.to_string(),
        Node::Number(n) => number_text(*n),
        Node::Text(s) => scalar_text(s, ctx),
        Node::Sequence(s) => {
            let items: Vec<String> = s.iter().map(|n| inline(n, Context::Flow)).collect();
            format!("[{}]", items.join(", "))
        }
        Node::Mapping(m) => {
            let entries: Vec<String> = m
                .iter()
                .map(|(k, v)| {
                    let key = scalar_text(k, Context::FlowKey);
                    let marker = if key.len() < MAX_IMPLICIT_KEY { "" } else { "? " };
                    format!("{}{}: {}", marker, key, inline(v, Context::Flow))
                })
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        Node::Blob(bytes) => format!("{} {}", BINARY_TAG, BASE64.encode(bytes)),
    }
}

fn number_text(n: Number) -> String {
    match n {
        Number::Int(i) => i.to_string(),
        Number::Float(f) if f.is_nan() => ".nan".to_string(),
        Number::Float(f) if f == f64::INFINITY => ".inf".to_string(),
        Number::Float(f) if f == f64::NEG_INFINITY => "-.inf".to_string(),
        // Debug keeps a decimal point or exponent: 42.0, 1e20
        Number::Float(f) => format!("{:?}", f),
    }
}

/// Where a scalar lands in the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Context {
    /// Block mapping value, sequence item or whole document
    Block,
    /// Flow sequence or flow mapping value
    Flow,
    /// Block mapping key
    Key,
    /// Flow mapping key
    FlowKey,
}

/// Plain text when YAML reads it back unchanged, double-quoted otherwise.
fn scalar_text(s: &str, ctx: Context) -> String {
    if is_plain_safe(s, ctx) {
        s.to_string()
    } else {
        quote(s)
    }
}

fn is_plain_safe(s: &str, ctx: Context) -> bool {
    if s.is_empty() || s.trim() != s || s.chars().any(needs_escape) {
        return false;
    }
    if matches!(ctx, Context::Flow | Context::FlowKey) && s.contains([',', '[', ']', '{', '}']) {
        return false;
    }
    match ctx {
        Context::Block => matches!(load(s), Ok(Node::Text(ref back)) if back == s),
        Context::Flow => {
            let expected = Node::seq(vec![Node::Text(s.to_string())]);
            matches!(load(&format!("[{}]", s)), Ok(ref back) if *back == expected)
        }
        Context::Key | Context::FlowKey => {
            let implicit = s.len() < MAX_IMPLICIT_KEY;
            let sample = match (ctx, implicit) {
                (Context::Key, true) => format!("{}: 0", s),
                (Context::Key, false) => format!("? {}\n: 0", s),
                (_, true) => format!("{{{}: 0}}", s),
                (_, false) => format!("{{? {}: 0}}", s),
            };
            let expected: Mapping = [(s, Node::int(0))].into_iter().collect();
            matches!(load(&sample), Ok(Node::Mapping(ref back)) if *back == expected)
        }
    }
}

/// Parse without the serde_yaml error fallback.
fn load(text: &str) -> Result<Node> {
    Loader::new(text).document()
}

/// Characters that libyaml would fold, normalize or refuse when left raw.
fn needs_escape(c: char) -> bool {
    c.is_control() || matches!(c, '\u{2028}' | '\u{2029}' | '\u{feff}' | '\u{fffe}' | '\u{ffff}')
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{85}' => out.push_str("\\N"),
            '\u{2028}' => out.push_str("\\L"),
            '\u{2029}' => out.push_str("\\P"),
            c if needs_escape(c) => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: Vec<(&str, Node)>) -> Node {
        Node::Mapping(entries.into_iter().collect())
    }

    #[test]
    fn test_parse_basic() {
        let doc = parse("delta: 42.0\nname: hello\nn: 3\nflag: true\nnone: null\nxs: [1, 2.5]\n").unwrap();
        assert_eq!(doc.get("delta"), Some(&Node::float(42.0)));
        assert_eq!(doc.get("name"), Some(&Node::from("hello")));
        assert_eq!(doc.get("n"), Some(&Node::int(3)));
        assert_eq!(doc.get("flag"), Some(&Node::Bool(true)));
        assert_eq!(doc.get("none"), Some(&Node::Null));
        assert_eq!(doc.get("xs"), Some(&Node::seq(vec![Node::int(1), Node::float(2.5)])));
        assert_eq!(
            doc.as_mapping().unwrap().keys().collect::<Vec<_>>(),
            vec!["delta", "name", "n", "flag", "none", "xs"]
        );
    }

    #[test]
    fn test_scalar_keys_stringified() {
        let doc = parse("1: a\ntrue: b\n").unwrap();
        assert_eq!(doc.get("1"), Some(&Node::from("a")));
        assert_eq!(doc.get("true"), Some(&Node::from("b")));
    }

    #[test]
    fn test_complex_key_rejected() {
        assert!(matches!(parse("? [1, 2]\n: x\n"), Err(Error::InvalidDocument(_))));
    }

    #[test]
    fn test_unknown_tag_rejected() {
        assert!(matches!(parse("a: !custom 1\n"), Err(Error::InvalidDocument(_))));
    }

    #[test]
    fn test_blob_roundtrip() {
        let bytes: Vec<u8> = (0..=255u8).cycle().take(700).collect();
        let doc = map(vec![("a", Node::Blob(bytes.clone())), ("b", Node::int(1))]);
        let text = to_string(&doc);
        assert!(text.contains("a: !binary |\n"));
        assert_eq!(parse(&text).unwrap(), doc);
    }

    #[test]
    fn test_blob_in_sequence() {
        let doc = Node::seq(vec![Node::Blob(vec![1, 2, 3]), Node::float(0.5)]);
        let text = to_string(&doc);
        assert_eq!(parse(&text).unwrap(), doc);
    }

    #[test]
    fn test_flow_and_block() {
        let doc = map(vec![
            ("flow", Node::Sequence(Sequence::with_style(
                vec![Node::int(1), Node::int(2)],
                Style::Flow,
            ))),
            ("block", Node::seq(vec![Node::int(3), Node::int(4)])),
        ]);
        let text = to_string(&doc);
        assert!(text.contains("flow: [1, 2]\n"));
        assert!(text.contains("block:\n  - 3\n  - 4\n"));
        assert_eq!(parse(&text).unwrap(), doc);
    }

    #[test]
    fn test_nested_structures_roundtrip() {
        let doc = map(vec![
            ("result", Node::seq(vec![map(vec![
                ("states", Node::seq(vec![Node::floats(&[0.1, 0.2]), Node::floats(&[0.3, 0.4])])),
                ("actions", Node::seq(vec![])),
            ])])),
            ("empty", Node::Mapping(Mapping::new())),
            ("matrix", Node::seq(vec![Node::seq(vec![Node::seq(vec![Node::int(1)])])])),
        ]);
        let text = to_string(&doc);
        assert_eq!(parse(&text).unwrap(), doc);
    }

    #[test]
    fn test_string_quoting() {
        let tricky = [
            "plain", "", " lead", "a: b", "a #c", "true", "null", "123", "1.5", "- x",
            "line\nbreak", "quote\"d", "back\\slash", "!tag", "*alias", "[x", "a,b", "tab\there",
            "{}", "~", "0x1F", "ünïcödé", "a\u{2028}b", "p\u{2029}", "n\u{85}l", " a\u{2028}b",
            "bom\u{feff}", "? k", "---", "007",
        ];
        let items: Vec<Node> = tricky.iter().map(|s| Node::from(*s)).collect();
        let block = Node::seq(items.clone());
        assert_eq!(parse(&to_string(&block)).unwrap(), block);

        let flow = Node::Sequence(Sequence::with_style(items, Style::Flow));
        assert_eq!(parse(&to_string(&flow)).unwrap(), flow);

        let keyed = Node::Mapping(tricky.iter().map(|s| (*s, Node::int(1))).collect());
        assert_eq!(parse(&to_string(&keyed)).unwrap(), keyed);
    }

    #[test]
    fn test_line_separators_escaped() {
        let text = to_string(&Node::seq(vec![Node::from("a\u{2028}b\u{2029}c\u{85}")]));
        assert_eq!(text, "- \"a\\Lb\\Pc\\N\"\n");
    }

    #[test]
    fn test_long_keys_explicit() {
        let long = "k".repeat(1100);
        let doc = map(vec![
            (long.as_str(), Node::int(1)),
            ("short", Node::seq(vec![map(vec![(long.as_str(), Node::from("v"))])])),
        ]);
        let text = to_string(&doc);
        assert!(text.contains(&format!("? {}\n:", long)));
        assert!(text.contains(&format!("- ? {}\n", long)));
        assert_eq!(parse(&text).unwrap(), doc);

        let flow = Node::Sequence(Sequence::with_style(
            vec![map(vec![(long.as_str(), Node::int(2))])],
            Style::Flow,
        ));
        assert_eq!(parse(&to_string(&flow)).unwrap(), flow);
    }

    #[test]
    fn test_core_binary_tag() {
        let doc = parse("a: !!binary aGVsbG8=\n").unwrap();
        assert_eq!(doc.get("a"), Some(&Node::Blob(b"hello".to_vec())));

        let doc = parse("a: !<tag:yaml.org,2002:binary> aGVsbG8=\n").unwrap();
        assert_eq!(doc.get("a"), Some(&Node::Blob(b"hello".to_vec())));

        let doc = parse("a: !!binary |\n  aGVs\n  bG8=\n").unwrap();
        assert_eq!(doc.get("a"), Some(&Node::Blob(b"hello".to_vec())));

        assert!(matches!(parse("a: !!binary '%%%'\n"), Err(Error::InvalidDocument(_))));
        assert!(matches!(parse("a: !!binary [1]\n"), Err(Error::InvalidDocument(_))));
    }

    #[test]
    fn test_core_scalar_tags() {
        let doc = parse("s: !!str 12\nb: !!bool true\ni: !!int 0x10\nf: !!float 2\nn: !!null\nq: ! 5\n")
            .unwrap();
        assert_eq!(doc.get("s"), Some(&Node::from("12")));
        assert_eq!(doc.get("b"), Some(&Node::Bool(true)));
        assert_eq!(doc.get("i"), Some(&Node::int(16)));
        assert_eq!(doc.get("f"), Some(&Node::float(2.0)));
        assert_eq!(doc.get("n"), Some(&Node::Null));
        assert_eq!(doc.get("q"), Some(&Node::from("5")));
        assert!(matches!(parse("a: !!int x\n"), Err(Error::InvalidDocument(_))));
        assert!(matches!(parse("a: !!map [1]\n"), Err(Error::InvalidDocument(_))));
    }

    #[test]
    fn test_implicit_typing() {
        let doc = parse(
            "a: ~\nb: \nc: False\nd: 0o17\ne: -0x10\nf: 007\ng: 1e3\nh: -.inf\ni: .NaN\nj: '5'\nk: \"true\"\nl: 18446744073709551615\n",
        )
        .unwrap();
        assert_eq!(doc.get("a"), Some(&Node::Null));
        assert_eq!(doc.get("b"), Some(&Node::Null));
        assert_eq!(doc.get("c"), Some(&Node::Bool(false)));
        assert_eq!(doc.get("d"), Some(&Node::int(15)));
        assert_eq!(doc.get("e"), Some(&Node::int(-16)));
        assert_eq!(doc.get("f"), Some(&Node::from("007")));
        assert_eq!(doc.get("g"), Some(&Node::float(1000.0)));
        assert_eq!(doc.get("h"), Some(&Node::float(f64::NEG_INFINITY)));
        assert!(doc.get("i").and_then(Node::as_f64).unwrap().is_nan());
        assert_eq!(doc.get("j"), Some(&Node::from("5")));
        assert_eq!(doc.get("k"), Some(&Node::from("true")));
        assert_eq!(doc.get("l"), Some(&Node::float(u64::MAX as f64)));
    }

    #[test]
    fn test_anchors_and_aliases() {
        let doc = parse("base: &b [1, 2]\ncopy: *b\nk: &n 3\n*n : x\n").unwrap();
        assert_eq!(doc.get("copy"), doc.get("base"));
        assert_eq!(doc.get("3"), Some(&Node::from("x")));
        assert!(matches!(parse("a: *missing\n"), Err(Error::InvalidDocument(_))));
    }

    #[test]
    fn test_alias_expansion_limited() {
        let mut text = String::from("l0: &l0 [0, 0, 0, 0, 0, 0, 0, 0]\n");
        for i in 1..10 {
            let prev = format!("*l{}", i - 1);
            text.push_str(&format!("l{}: &l{} [{}]\n", i, i, vec![prev; 8].join(", ")));
        }
        assert!(matches!(parse(&text), Err(Error::InvalidDocument(_))));
    }

    #[test]
    fn test_nesting_limited() {
        let deep = format!("{}{}", "[".repeat(MAX_DEPTH + 1), "]".repeat(MAX_DEPTH + 1));
        assert!(matches!(parse(&deep), Err(Error::InvalidDocument(_))));
        let ok = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(parse(&ok).is_ok());
    }

    #[test]
    fn test_documents_and_errors() {
        assert_eq!(parse("").unwrap(), Node::Null);
        assert_eq!(parse("# only a comment\n").unwrap(), Node::Null);
        assert_eq!(parse("--- 4\n...\n").unwrap(), Node::int(4));
        assert!(matches!(parse("a: 1\n---\nb: 2\n"), Err(Error::InvalidDocument(_))));
        assert!(matches!(parse("a: 1\na: 2\n"), Err(Error::InvalidDocument(_))));
        assert!(matches!(parse("1: x\n1.0: y\n'1': z\n"), Err(Error::InvalidDocument(_))));
        assert!(matches!(parse("a: [1, 2\n"), Err(Error::Yaml(_))));
    }

    #[test]
    fn test_float_text() {
        assert_eq!(number_text(Number::Float(42.0)), "42.0");
        assert_eq!(number_text(Number::Float(0.1)), "0.1");
        assert_eq!(number_text(Number::Float(f64::INFINITY)), ".inf");
        assert_eq!(number_text(Number::Float(f64::NEG_INFINITY)), "-.inf");
        assert_eq!(number_text(Number::Float(f64::NAN)), ".nan");

        let doc = Node::floats(&[42.0, 1e20, 1e-7, -0.5, f64::INFINITY]);
        assert_eq!(parse(&to_string(&doc)).unwrap(), doc);
    }

    #[test]
    fn test_crazy_header() {
        let text = to_crazy_string(&map(vec![("a", Node::int(1))]));
        assert!(text.starts_with("# .crazy.yaml file."));
        assert_eq!(parse(&text).unwrap(), map(vec![("a", Node::int(1))]));
    }

    #[test]
    fn test_top_level_scalar() {
        assert_eq!(to_string(&Node::int(5)), "5\n");
        assert_eq!(parse("5\n").unwrap(), Node::int(5));
    }
}
