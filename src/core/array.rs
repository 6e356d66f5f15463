//! Array codec: nested numeric sequences to self-describing binary payloads.
//!
//! See [`super::format`] for the byte layout. Encoding narrows every element
//! to the requested [`Dtype`]; decoding promotes back to `f64` (float dtypes)
//! or `i64` (integer dtypes), so bits dropped by narrowing stay lost.

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use half::f16;
use std::io::Cursor;

use super::format::{
    header_size, has_magic, ARRAY_MAGIC, CURRENT_VERSION, DTYPE_OFFSET, FIXED_HEADER_SIZE,
    MAX_RANK, RANK_OFFSET, VERSION_OFFSET,
};
use super::node::{Node, Number};
use crate::util::{Dtype, Error, Result, Shape};

/// Rows a shape may declare beyond what its elements account for.
///
/// Zero-sized inner dimensions let a few header bytes describe any number
/// of empty rows, so decoding caps them.
pub const MAX_EMPTY_ROWS: usize = 1 << 20;

/// A decoded array: dtype, shape and flat row-major values.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayData {
    pub dtype: Dtype,
    pub shape: Shape,
    pub values: Vec<Number>,
}

impl ArrayData {
    /// Values promoted to `f64`.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.values.iter().map(|v| v.as_f64()).collect()
    }

    /// Rebuild the nested sequence tree.
    pub fn into_node(self) -> Node {
        let mut values = self.values.into_iter();
        build_nested(&mut values, self.shape.sizes())
    }
}

fn build_nested(values: &mut std::vec::IntoIter<Number>, dims: &[usize]) -> Node {
    match dims.split_first() {
        Some((&n, [])) => Node::seq(values.by_ref().take(n).map(Node::Number).collect()),
        Some((&n, rest)) => Node::seq((0..n).map(|_| build_nested(values, rest)).collect()),
        None => Node::seq(Vec::new()),
    }
}

/// Infer the rectangular shape of `values`.
///
/// Numbers give a 1D shape; sequences of equally shaped rows add an outer
/// dimension. Anything else is rejected.
pub fn infer_shape(values: &[Node], dtype: Dtype) -> Result<Shape> {
    if values.is_empty() {
        return Err(Error::IrregularShape("cannot encode an empty sequence".into()));
    }
    let shape = infer_shape_inner(values, dtype, 1)?;
    Ok(shape)
}

fn infer_shape_inner(values: &[Node], dtype: Dtype, depth: usize) -> Result<Shape> {
    if depth > MAX_RANK {
        return Err(Error::IrregularShape(format!(
            "nesting deeper than {} levels",
            MAX_RANK
        )));
    }

    let Some(first) = values.first() else {
        return Ok(Shape::d1(0));
    };

    match first {
        Node::Number(_) => {
            for (i, v) in values.iter().enumerate() {
                match v {
                    Node::Number(_) => {}
                    Node::Sequence(_) => {
                        return Err(Error::IrregularShape(format!(
                            "element {} is a sequence, expected a number",
                            i
                        )))
                    }
                    other => return Err(not_numeric(dtype, i, other)),
                }
            }
            Ok(Shape::d1(values.len()))
        }
        Node::Sequence(row) => {
            let row_shape = infer_shape_inner(&row.items, dtype, depth + 1)?;
            for (i, v) in values.iter().enumerate().skip(1) {
                match v {
                    Node::Sequence(other_row) => {
                        let other_shape = infer_shape_inner(&other_row.items, dtype, depth + 1)?;
                        if other_shape != row_shape {
                            return Err(Error::IrregularShape(format!(
                                "row {} has shape {}, expected {}",
                                i, other_shape, row_shape
                            )));
                        }
                    }
                    Node::Number(_) => {
                        return Err(Error::IrregularShape(format!(
                            "element {} is a number, expected a row of shape {}",
                            i, row_shape
                        )))
                    }
                    other => return Err(not_numeric(dtype, i, other)),
                }
            }
            let mut shape = row_shape;
            shape.prepend(values.len());
            Ok(shape)
        }
        other => Err(not_numeric(dtype, 0, other)),
    }
}

fn not_numeric(dtype: Dtype, index: usize, node: &Node) -> Error {
    Error::non_numeric(dtype.name(), format!("element {} is {}", index, node.kind()))
}

/// True when `shape` nests more rows than its elements can back.
fn too_many_rows(shape: &Shape, points: usize) -> bool {
    let limit = points.saturating_mul(MAX_RANK).saturating_add(MAX_EMPTY_ROWS);
    shape.checked_num_rows().map_or(true, |rows| rows > limit)
}

fn flatten_into(values: &[Node], dtype: Dtype, out: &mut Vec<Number>) -> Result<()> {
    for (i, v) in values.iter().enumerate() {
        match v {
            Node::Number(n) => out.push(*n),
            Node::Sequence(s) => flatten_into(&s.items, dtype, out)?,
            other => return Err(not_numeric(dtype, i, other)),
        }
    }
    Ok(())
}

/// Coerce a number into the integer range of `dtype`.
fn to_int(n: Number, dtype: Dtype) -> Result<i128> {
    let (min, max) = dtype
        .int_range()
        .ok_or_else(|| Error::non_numeric(dtype.name(), "not an integer dtype"))?;
    let v = match n {
        Number::Int(i) => i as i128,
        Number::Float(f) => {
            if !f.is_finite() {
                return Err(Error::non_numeric(dtype.name(), format!("{} is not finite", f)));
            }
            let t = f.trunc();
            if t < min as f64 || t > max as f64 {
                return Err(Error::non_numeric(dtype.name(), format!("{} is out of range", f)));
            }
            t as i128
        }
    };
    if v < min || v > max {
        return Err(Error::non_numeric(dtype.name(), format!("{} is out of range", v)));
    }
    Ok(v)
}

fn write_element(out: &mut Vec<u8>, n: Number, dtype: Dtype) -> Result<()> {
    match dtype {
        Dtype::Float16 => out.write_u16::<LittleEndian>(f16::from_f64(n.as_f64()).to_bits())?,
        Dtype::Float32 => out.write_f32::<LittleEndian>(n.as_f64() as f32)?,
        Dtype::Float64 => out.write_f64::<LittleEndian>(n.as_f64())?,
        Dtype::Int8 => out.write_i8(to_int(n, dtype)? as i8)?,
        Dtype::Uint8 => out.write_u8(to_int(n, dtype)? as u8)?,
        Dtype::Int16 => out.write_i16::<LittleEndian>(to_int(n, dtype)? as i16)?,
        Dtype::Uint16 => out.write_u16::<LittleEndian>(to_int(n, dtype)? as u16)?,
        Dtype::Int32 => out.write_i32::<LittleEndian>(to_int(n, dtype)? as i32)?,
        Dtype::Uint32 => out.write_u32::<LittleEndian>(to_int(n, dtype)? as u32)?,
        Dtype::Int64 => out.write_i64::<LittleEndian>(to_int(n, dtype)? as i64)?,
        Dtype::Uint64 => out.write_u64::<LittleEndian>(to_int(n, dtype)? as u64)?,
    }
    Ok(())
}

fn read_element(chunk: &[u8], dtype: Dtype) -> Number {
    match dtype {
        Dtype::Float16 => Number::Float(f16::from_bits(LittleEndian::read_u16(chunk)).to_f64()),
        Dtype::Float32 => Number::Float(LittleEndian::read_f32(chunk) as f64),
        Dtype::Float64 => Number::Float(LittleEndian::read_f64(chunk)),
        Dtype::Int8 => Number::Int(chunk[0] as i8 as i64),
        Dtype::Uint8 => Number::Int(chunk[0] as i64),
        Dtype::Int16 => Number::Int(LittleEndian::read_i16(chunk) as i64),
        Dtype::Uint16 => Number::Int(LittleEndian::read_u16(chunk) as i64),
        Dtype::Int32 => Number::Int(LittleEndian::read_i32(chunk) as i64),
        Dtype::Uint32 => Number::Int(LittleEndian::read_u32(chunk) as i64),
        Dtype::Int64 => Number::Int(LittleEndian::read_i64(chunk)),
        Dtype::Uint64 => {
            let v = LittleEndian::read_u64(chunk);
            match i64::try_from(v) {
                Ok(i) => Number::Int(i),
                Err(_) => Number::Float(v as f64),
            }
        }
    }
}

/// Encode a rectangular nested numeric sequence at `dtype`.
///
/// Identical input and dtype always produce identical bytes.
pub fn encode(values: &[Node], dtype: Dtype) -> Result<Vec<u8>> {
    let shape = infer_shape(values, dtype)?;
    let count = shape.num_points();
    if too_many_rows(&shape, count) {
        return Err(Error::IrregularShape(format!(
            "shape {} has more than {} empty rows",
            shape, MAX_EMPTY_ROWS
        )));
    }

    let mut flat = Vec::with_capacity(count);
    flatten_into(values, dtype, &mut flat)?;
    debug_assert_eq!(flat.len(), count);

    let mut out = Vec::with_capacity(header_size(shape.rank()) + count * dtype.num_bytes());
    out.extend_from_slice(ARRAY_MAGIC);
    out.write_u8(CURRENT_VERSION)?;
    out.write_u8(dtype.tag())?;
    out.write_u8(shape.rank() as u8)?;
    for &size in shape.sizes() {
        out.write_u64::<LittleEndian>(size as u64)?;
    }
    for n in flat {
        write_element(&mut out, n, dtype)?;
    }

    tracing::trace!(%dtype, %shape, bytes = out.len(), "encoded array");
    Ok(out)
}

/// Parse a payload into its dtype, shape and flat values.
pub fn decode_array(data: &[u8]) -> Result<ArrayData> {
    if !has_magic(data) {
        return Err(Error::malformed("missing or unrecognized magic marker"));
    }
    if data.len() < FIXED_HEADER_SIZE {
        return Err(Error::malformed("header truncated"));
    }

    let version = data[VERSION_OFFSET];
    if version != CURRENT_VERSION {
        return Err(Error::UnsupportedVersion(version));
    }

    let tag = data[DTYPE_OFFSET];
    let dtype = Dtype::from_u8(tag)
        .ok_or_else(|| Error::malformed(format!("unknown dtype tag {}", tag)))?;

    let rank = data[RANK_OFFSET] as usize;
    if rank == 0 || rank > MAX_RANK {
        return Err(Error::malformed(format!("invalid rank {}", rank)));
    }

    let header_len = header_size(rank);
    if data.len() < header_len {
        return Err(Error::malformed("header truncated in dimension sizes"));
    }

    let mut sizes = Vec::with_capacity(rank);
    let mut cursor = Cursor::new(&data[FIXED_HEADER_SIZE..header_len]);
    for _ in 0..rank {
        let size = cursor
            .read_u64::<LittleEndian>()
            .map_err(|_| Error::malformed("header truncated in dimension sizes"))?;
        let size = usize::try_from(size)
            .map_err(|_| Error::malformed(format!("dimension size {} too large", size)))?;
        sizes.push(size);
    }
    let shape = Shape::from(sizes);

    let overflow = || Error::malformed(format!("shape {} overflows", shape));
    let points = shape.checked_num_points().ok_or_else(overflow)?;
    let expected = points.checked_mul(dtype.num_bytes()).ok_or_else(overflow)?;
    if too_many_rows(&shape, points) {
        return Err(Error::malformed(format!(
            "shape {} has more than {} empty rows",
            shape, MAX_EMPTY_ROWS
        )));
    }

    let body = &data[header_len..];
    if body.len() < expected {
        return Err(Error::TruncatedPayload {
            expected,
            actual: body.len(),
        });
    }
    if body.len() > expected {
        return Err(Error::malformed(format!(
            "{} trailing bytes after array data",
            body.len() - expected
        )));
    }

    let values = body
        .chunks_exact(dtype.num_bytes())
        .map(|chunk| read_element(chunk, dtype))
        .collect();

    Ok(ArrayData { dtype, shape, values })
}

/// Decode a payload back into nested sequences of numbers.
pub fn decode(data: &[u8]) -> Result<Node> {
    Ok(decode_array(data)?.into_node())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[f64]]) -> Vec<Node> {
        data.iter().map(|r| Node::floats(r)).collect()
    }

    fn items(node: Node) -> Vec<Node> {
        match node {
            Node::Sequence(s) => s.items,
            other => panic!("expected sequence, got {:?}", other),
        }
    }

    #[test]
    fn test_header_layout() {
        let bytes = encode(&[Node::float(1.0), Node::float(2.0)], Dtype::Float32).unwrap();
        assert_eq!(&bytes[..4], b"CZAR");
        assert_eq!(bytes[4], 1);
        assert_eq!(bytes[5], Dtype::Float32.tag());
        assert_eq!(bytes[6], 1);
        assert_eq!(&bytes[7..15], &2u64.to_le_bytes());
        assert_eq!(&bytes[15..19], &1.0f32.to_le_bytes());
        assert_eq!(bytes.len(), 15 + 8);
    }

    #[test]
    fn test_float64_exact() {
        let values = [0.1, -2.5e-300, 1e300, 3.141592653589793];
        let bytes = encode(&items(Node::floats(&values)), Dtype::Float64).unwrap();
        let decoded = decode_array(&bytes).unwrap();
        assert_eq!(decoded.shape, Shape::d1(4));
        assert_eq!(decoded.to_f64_vec(), values.to_vec());
    }

    #[test]
    fn test_float16_narrowing() {
        let bytes = encode(&[Node::float(0.1), Node::int(3)], Dtype::Float16).unwrap();
        let decoded = decode_array(&bytes).unwrap().to_f64_vec();
        assert_eq!(decoded[0], f16::from_f64(0.1).to_f64());
        assert_ne!(decoded[0], 0.1);
        assert!((decoded[0] - 0.1).abs() < 1e-3);
        assert_eq!(decoded[1], 3.0);
    }

    #[test]
    fn test_two_dimensional() {
        let input = rows(&[&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]]);
        let bytes = encode(&input, Dtype::Float64).unwrap();
        let decoded = decode_array(&bytes).unwrap();
        assert_eq!(decoded.shape, Shape::d2(3, 2));
        assert_eq!(decode(&bytes).unwrap(), Node::seq(input));
    }

    #[test]
    fn test_empty_rows() {
        let input = vec![Node::seq(vec![]), Node::seq(vec![])];
        let bytes = encode(&input, Dtype::Float16).unwrap();
        let decoded = decode_array(&bytes).unwrap();
        assert_eq!(decoded.shape, Shape::d2(2, 0));
        assert_eq!(decode(&bytes).unwrap(), Node::seq(input));
    }

    #[test]
    fn test_deterministic() {
        let input = rows(&[&[0.25, 0.5], &[0.75, 1.0]]);
        assert_eq!(
            encode(&input, Dtype::Float16).unwrap(),
            encode(&input, Dtype::Float16).unwrap()
        );
    }

    #[test]
    fn test_irregular_rows() {
        let input = rows(&[&[1.0, 2.0], &[3.0]]);
        let err = encode(&input, Dtype::Float32).unwrap_err();
        assert!(matches!(err, Error::IrregularShape(_)), "{err}");

        let mixed = vec![Node::float(1.0), Node::floats(&[2.0])];
        assert!(matches!(encode(&mixed, Dtype::Float32), Err(Error::IrregularShape(_))));

        let mixed = vec![Node::floats(&[2.0]), Node::float(1.0)];
        assert!(matches!(encode(&mixed, Dtype::Float32), Err(Error::IrregularShape(_))));
    }

    #[test]
    fn test_non_numeric() {
        let input = vec![Node::float(1.0), Node::from("two")];
        let err = encode(&input, Dtype::Float16).unwrap_err();
        assert!(matches!(err, Error::NonNumericSequence { .. }), "{err}");
        assert!(err.to_string().contains("element 1 is text"));

        let input = vec![Node::Null, Node::float(1.0)];
        assert!(matches!(encode(&input, Dtype::Float16), Err(Error::NonNumericSequence { .. })));

        let input = vec![Node::floats(&[1.0]), Node::Blob(vec![1, 2])];
        assert!(matches!(encode(&input, Dtype::Float16), Err(Error::NonNumericSequence { .. })));
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(encode(&[], Dtype::Float16), Err(Error::IrregularShape(_))));
    }

    #[test]
    fn test_integer_dtypes() {
        let input = vec![Node::int(-3), Node::float(7.9), Node::int(100)];
        let bytes = encode(&input, Dtype::Int8).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, Node::seq(vec![Node::int(-3), Node::int(7), Node::int(100)]));

        let err = encode(&[Node::int(300)], Dtype::Uint8).unwrap_err();
        assert!(matches!(err, Error::NonNumericSequence { .. }));
        let err = encode(&[Node::int(-1)], Dtype::Uint32).unwrap_err();
        assert!(matches!(err, Error::NonNumericSequence { .. }));
        let err = encode(&[Node::float(f64::NAN)], Dtype::Int32).unwrap_err();
        assert!(matches!(err, Error::NonNumericSequence { .. }));
    }

    #[test]
    fn test_uint64_above_i64() {
        let mut bytes = encode(&[Node::int(0)], Dtype::Uint64).unwrap();
        let n = bytes.len();
        bytes[n - 8..].copy_from_slice(&u64::MAX.to_le_bytes());
        let decoded = decode_array(&bytes).unwrap();
        assert_eq!(decoded.values, vec![Number::Float(u64::MAX as f64)]);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = encode(&[Node::float(1.0)], Dtype::Float32).unwrap();
        bytes[0] = b'X';
        assert!(matches!(decode(&bytes), Err(Error::MalformedPayload(_))));
        assert!(matches!(decode(b""), Err(Error::MalformedPayload(_))));
    }

    #[test]
    fn test_bad_header_fields() {
        let good = encode(&[Node::float(1.0)], Dtype::Float32).unwrap();

        let mut bytes = good.clone();
        bytes[VERSION_OFFSET] = 9;
        assert!(matches!(decode(&bytes), Err(Error::UnsupportedVersion(9))));

        let mut bytes = good.clone();
        bytes[DTYPE_OFFSET] = 200;
        assert!(matches!(decode(&bytes), Err(Error::MalformedPayload(_))));

        let mut bytes = good.clone();
        bytes[RANK_OFFSET] = 0;
        assert!(matches!(decode(&bytes), Err(Error::MalformedPayload(_))));

        assert!(matches!(decode(&good[..10]), Err(Error::MalformedPayload(_))));
        assert!(matches!(decode(&good[..5]), Err(Error::MalformedPayload(_))));
    }

    #[test]
    fn test_truncated_and_trailing() {
        let good = encode(&[Node::float(1.0), Node::float(2.0)], Dtype::Float64).unwrap();

        let err = decode(&good[..good.len() - 3]).unwrap_err();
        assert!(matches!(err, Error::TruncatedPayload { expected: 16, actual: 13 }), "{err}");

        let mut long = good.clone();
        long.push(0);
        assert!(matches!(decode(&long), Err(Error::MalformedPayload(_))));
    }

    #[test]
    fn test_size_overflow() {
        let mut bytes = encode(&[Node::float(1.0)], Dtype::Float64).unwrap();
        bytes[7..15].copy_from_slice(&u64::MAX.to_le_bytes());
        let err = decode(&bytes).unwrap_err();
        assert!(
            matches!(err, Error::MalformedPayload(_) | Error::TruncatedPayload { .. }),
            "{err}"
        );
    }

    #[test]
    fn test_empty_row_count_capped() {
        let mut bytes = encode(&[Node::seq(vec![]), Node::seq(vec![])], Dtype::Float16).unwrap();
        bytes[7..15].copy_from_slice(&(1u64 << 40).to_le_bytes());
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, Error::MalformedPayload(_)), "{err}");

        bytes[7..15].copy_from_slice(&(MAX_EMPTY_ROWS as u64).to_le_bytes());
        let decoded = decode_array(&bytes).unwrap();
        assert_eq!(decoded.shape, Shape::d2(MAX_EMPTY_ROWS, 0));
        assert!(decoded.values.is_empty());
    }

    #[test]
    fn test_too_many_empty_rows_rejected_on_encode() {
        let empty_rows: Vec<Node> = (0..MAX_EMPTY_ROWS + 1).map(|_| Node::seq(vec![])).collect();
        let err = encode(&empty_rows, Dtype::Float16).unwrap_err();
        assert!(matches!(err, Error::IrregularShape(_)), "{err}");
    }
}
