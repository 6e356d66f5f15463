//! Multi-dimensional array shapes.

use smallvec::SmallVec;

/// Shape of a rectangular numeric array, outer dimension first.
///
/// A flat list of `n` numbers has shape `[n]`; a list of `n` rows of `m`
/// numbers has shape `[n, m]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: SmallVec<[usize; 4]>,
}

impl Shape {
    /// Create a 1D shape.
    pub fn d1(size: usize) -> Self {
        Self { dims: smallvec::smallvec![size] }
    }

    /// Create a 2D shape.
    pub fn d2(rows: usize, cols: usize) -> Self {
        Self { dims: smallvec::smallvec![rows, cols] }
    }

    /// Number of dimensions.
    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// All dimension sizes, outer first.
    pub fn sizes(&self) -> &[usize] {
        &self.dims
    }

    /// Total number of elements (product of all dimensions).
    pub fn num_points(&self) -> usize {
        self.dims.iter().product()
    }

    /// Total number of elements, `None` on overflow.
    pub fn checked_num_points(&self) -> Option<usize> {
        self.dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    /// Number of nested rows below the outer sequence, `None` on overflow.
    ///
    /// `[2, 3, 4]` has 2 rows of 3 rows each: 8. Rows exist even when the
    /// innermost dimension is zero, so this can exceed the point count.
    pub fn checked_num_rows(&self) -> Option<usize> {
        let outer = &self.dims[..self.dims.len().saturating_sub(1)];
        let mut rows = 0usize;
        let mut level = 1usize;
        for &d in outer {
            level = level.checked_mul(d)?;
            rows = rows.checked_add(level)?;
        }
        Some(rows)
    }

    /// Add a new outermost dimension.
    pub fn prepend(&mut self, size: usize) {
        self.dims.insert(0, size);
    }
}

impl From<Vec<usize>> for Shape {
    fn from(v: Vec<usize>) -> Self {
        Self { dims: SmallVec::from_vec(v) }
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, s) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, " x ")?;
            }
            write!(f, "{}", s)?;
        }
        write!(f, "]")
    }
}
