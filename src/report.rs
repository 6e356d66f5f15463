//! Compression report: stored size and reconstruction error per dtype.

use crate::config::Settings;
use crate::core::Node;
use crate::text::yaml;
use crate::tree;
use crate::util::{Dtype, Result};

/// Floor for the relative error denominator.
pub const REL_ERR_FLOOR: f64 = 1e-8;

/// One line of the report.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportRow {
    pub dtype: Dtype,
    /// Size of the plain YAML rendering
    pub orig_bytes: usize,
    /// Size of the compressed YAML rendering
    pub comp_bytes: usize,
    pub ratio: f64,
    pub max_abs_err: f64,
    pub max_rel_err: f64,
}

/// Largest absolute and relative error between numeric leaves.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ErrorStats {
    pub max_abs: f64,
    pub max_rel: f64,
    /// Number of numeric leaves compared
    pub count: usize,
}

impl ErrorStats {
    fn add(&mut self, orig: f64, restored: f64) {
        let err = (orig - restored).abs();
        let rel = err / orig.abs().max(REL_ERR_FLOOR);
        self.max_abs = self.max_abs.max(err);
        self.max_rel = self.max_rel.max(rel);
        self.count += 1;
    }
}

fn collect_numbers(node: &Node, out: &mut Vec<f64>) {
    match node {
        Node::Number(n) => out.push(n.as_f64()),
        Node::Sequence(s) => s.iter().for_each(|n| collect_numbers(n, out)),
        Node::Mapping(m) => m.iter().for_each(|(_, v)| collect_numbers(v, out)),
        Node::Null | Node::Bool(_) | Node::Text(_) | Node::Blob(_) => {}
    }
}

/// Compare numeric leaves of two trees in document order.
pub fn compare_numeric(orig: &Node, restored: &Node) -> ErrorStats {
    let mut a = Vec::new();
    let mut b = Vec::new();
    collect_numbers(orig, &mut a);
    collect_numbers(restored, &mut b);

    let mut stats = ErrorStats::default();
    for (x, y) in a.into_iter().zip(b) {
        stats.add(x, y);
    }
    stats
}

/// Compress and restore `doc` once per dtype and measure the result.
pub fn report(doc: &Node, threshold: usize, dtypes: &[Dtype]) -> Result<Vec<ReportRow>> {
    let orig_bytes = yaml::to_string(doc).len();
    let mut rows = Vec::with_capacity(dtypes.len());

    for &dtype in dtypes {
        let settings = Settings::default().with_threshold(threshold).with_dtype(dtype);
        let packed = tree::compress_with(doc.clone(), &settings)?;
        let comp_bytes = yaml::to_crazy_string(&packed).len();
        let restored = tree::decompress(packed)?;
        let stats = compare_numeric(doc, &restored);

        rows.push(ReportRow {
            dtype,
            orig_bytes,
            comp_bytes,
            ratio: comp_bytes as f64 / orig_bytes.max(1) as f64,
            max_abs_err: stats.max_abs,
            max_rel_err: stats.max_rel,
        });
    }
    Ok(rows)
}

/// Render report rows as a markdown table.
pub fn render_markdown(rows: &[ReportRow]) -> String {
    let mut out = String::new();
    out.push_str("| dtype | orig | comp | ratio | max_abs_err | max_rel_err |\n");
    out.push_str("| :--- | ---: | ---: | ---: | ---: | ---: |\n");
    for r in rows {
        out.push_str(&format!(
            "| {} | {} | {} | {:.3} | {:.3e} | {:.3e} |\n",
            r.dtype, r.orig_bytes, r.comp_bytes, r.ratio, r.max_abs_err, r.max_rel_err
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trajectory(n: usize) -> Node {
        let states: Vec<Node> = (0..n)
            .map(|i| {
                let t = i as f64 * 0.37;
                Node::floats(&[t.sin(), t.cos(), (t * 0.5).sin() * 0.25, 0.75])
            })
            .collect();
        Node::Mapping([("states", Node::seq(states))].into_iter().collect())
    }

    #[test]
    fn test_error_monotone_in_width() {
        let rows = report(&trajectory(200), 10, &Dtype::FLOATS).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].max_abs_err >= rows[1].max_abs_err);
        assert!(rows[1].max_abs_err >= rows[2].max_abs_err);
        assert_eq!(rows[2].max_abs_err, 0.0);
        assert!(rows[0].max_abs_err < 1e-3);
        assert!(rows[0].comp_bytes < rows[0].orig_bytes);
    }

    #[test]
    fn test_compare_numeric() {
        let a = Node::floats(&[1.0, 2.0, 0.0]);
        let b = Node::floats(&[1.5, 2.0, 1e-9]);
        let stats = compare_numeric(&a, &b);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.max_abs, 0.5);
        assert!((stats.max_rel - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_markdown() {
        let rows = report(&trajectory(30), 10, &[Dtype::Float32]).unwrap();
        let md = render_markdown(&rows);
        assert!(md.starts_with("| dtype |"));
        assert!(md.contains("| float32 |"));
        assert_eq!(md.lines().count(), 3);
    }
}
