//! Immutable N-dimensional lookup tables.
//!
//! A [`LookupTable`] is a flat `f32` buffer addressed through three axes with
//! row-major strides (the last axis is contiguous). Tables are built once,
//! before audio starts, and then shared read-only between engines through an
//! `Arc`. Nothing in this module mutates a table after construction, so the
//! audio thread can read it without synchronization.
//!
//! Lower-dimensional data is promoted by appending unit axes: a 1-D table of
//! `N` samples has shape `[N, 1, 1]`.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Errors raised while building a [`LookupTable`].
///
/// These are configuration errors: they surface before an engine can become
/// ready and are never produced on the audio thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// One of the axes has length zero.
    EmptyAxis {
        /// Index of the empty axis.
        axis: usize,
    },
    /// `shape` describes a different number of samples than `data` holds.
    ShapeMismatch {
        /// Product of the shape.
        expected: usize,
        /// Length of the data buffer.
        actual: usize,
    },
    /// More than three axes were requested.
    TooManyAxes(usize),
}

impl core::fmt::Display for TableError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EmptyAxis { axis } => write!(f, "table axis {axis} has length zero"),
            Self::ShapeMismatch { expected, actual } => write!(
                f,
                "table shape describes {expected} samples but data holds {actual}"
            ),
            Self::TooManyAxes(n) => write!(f, "tables have at most 3 axes, got {n}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TableError {}

/// Immutable 3-D sample table with strided indexing.
///
/// # Example
///
/// ```rust
/// use wavegrid_core::LookupTable;
///
/// let table = LookupTable::new(vec![0.0; 4 * 3 * 2], [4, 3, 2]).unwrap();
/// assert_eq!(table.stride(), [6, 2, 1]);
/// assert_eq!(table.axis_max(0), 3.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTable {
    shape: [usize; 3],
    stride: [usize; 3],
    data: Vec<f32>,
}

impl LookupTable {
    /// Build a table from a flat row-major buffer and its shape.
    pub fn new(data: Vec<f32>, shape: [usize; 3]) -> Result<Self, TableError> {
        if let Some(axis) = shape.iter().position(|&len| len == 0) {
            return Err(TableError::EmptyAxis { axis });
        }
        let expected = shape[0] * shape[1] * shape[2];
        if expected != data.len() {
            return Err(TableError::ShapeMismatch {
                expected,
                actual: data.len(),
            });
        }

        let stride = [shape[1] * shape[2], shape[2], 1];

        #[cfg(feature = "tracing")]
        tracing::debug!("lookup_table: shape={shape:?} stride={stride:?}");

        Ok(Self {
            shape,
            stride,
            data,
        })
    }

    /// Build a table from a shape with one to three axes.
    ///
    /// Missing trailing axes are filled with length 1.
    pub fn from_dims(data: Vec<f32>, dims: &[usize]) -> Result<Self, TableError> {
        let shape = match *dims {
            [a] => [a, 1, 1],
            [a, b] => [a, b, 1],
            [a, b, c] => [a, b, c],
            [] => return Err(TableError::EmptyAxis { axis: 0 }),
            _ => return Err(TableError::TooManyAxes(dims.len())),
        };
        Self::new(data, shape)
    }

    /// Build a table by evaluating `f(i0, i1, i2)` at every grid point.
    pub fn from_fn(
        shape: [usize; 3],
        mut f: impl FnMut(usize, usize, usize) -> f32,
    ) -> Result<Self, TableError> {
        let mut data = Vec::with_capacity(shape[0] * shape[1] * shape[2]);
        for i0 in 0..shape[0] {
            for i1 in 0..shape[1] {
                for i2 in 0..shape[2] {
                    data.push(f(i0, i1, i2));
                }
            }
        }
        Self::new(data, shape)
    }

    /// Axis lengths.
    #[inline]
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Row-major strides derived from the shape.
    #[inline]
    pub fn stride(&self) -> [usize; 3] {
        self.stride
    }

    /// The flat sample buffer.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Total number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Tables are never empty once built; provided for API symmetry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Largest valid continuous coordinate on `axis` (`shape[axis] - 1`).
    #[inline]
    pub fn axis_max(&self, axis: usize) -> f64 {
        (self.shape[axis] - 1) as f64
    }

    /// Clamp a continuous coordinate into `[0, shape[axis] - 1]`.
    ///
    /// NaN coordinates clamp to 0.
    #[inline]
    pub fn clamp_coord(&self, axis: usize, coord: f64) -> f64 {
        let max = self.axis_max(axis);
        if coord.is_nan() { 0.0 } else { coord.clamp(0.0, max) }
    }

    /// Flat index of an integer grid point.
    #[inline]
    pub fn index(&self, i0: usize, i1: usize, i2: usize) -> usize {
        i0 * self.stride[0] + i1 * self.stride[1] + i2 * self.stride[2]
    }

    /// Sample at an integer grid point; indices are clamped to the shape.
    #[inline]
    pub fn get(&self, i0: usize, i1: usize, i2: usize) -> f32 {
        let i0 = i0.min(self.shape[0] - 1);
        let i1 = i1.min(self.shape[1] - 1);
        let i2 = i2.min(self.shape[2] - 1);
        self.data[self.index(i0, i1, i2)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(not(feature = "std"))]
    use alloc::vec;

    #[test]
    fn row_major_stride() {
        let table = LookupTable::new(vec![0.0; 5 * 4 * 3], [5, 4, 3]).unwrap();
        assert_eq!(table.stride(), [12, 3, 1]);
        assert_eq!(table.index(1, 2, 1), 12 + 6 + 1);
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let err = LookupTable::new(vec![0.0; 7], [2, 2, 2]).unwrap_err();
        assert_eq!(
            err,
            TableError::ShapeMismatch {
                expected: 8,
                actual: 7
            }
        );
    }

    #[test]
    fn empty_axis_is_rejected() {
        let err = LookupTable::new(vec![], [4, 0, 2]).unwrap_err();
        assert_eq!(err, TableError::EmptyAxis { axis: 1 });
    }

    #[test]
    fn from_dims_promotes_to_three_axes() {
        let table = LookupTable::from_dims(vec![1.0, 2.0, 3.0], &[3]).unwrap();
        assert_eq!(table.shape(), [3, 1, 1]);
        assert_eq!(table.get(2, 0, 0), 3.0);

        let err = LookupTable::from_dims(vec![0.0; 16], &[2, 2, 2, 2]).unwrap_err();
        assert_eq!(err, TableError::TooManyAxes(4));
    }

    #[test]
    fn from_fn_matches_indexing() {
        let table =
            LookupTable::from_fn([3, 4, 5], |a, b, c| (a * 100 + b * 10 + c) as f32).unwrap();
        assert_eq!(table.get(2, 3, 4), 234.0);
        assert_eq!(table.get(0, 1, 2), 12.0);
    }

    #[test]
    fn get_clamps_indices() {
        let table = LookupTable::from_fn([2, 2, 2], |a, b, c| (a * 4 + b * 2 + c) as f32).unwrap();
        assert_eq!(table.get(9, 9, 9), 7.0);
    }

    #[test]
    fn clamp_coord_handles_nan_and_bounds() {
        let table = LookupTable::new(vec![0.0; 8], [2, 2, 2]).unwrap();
        assert_eq!(table.clamp_coord(0, f64::NAN), 0.0);
        assert_eq!(table.clamp_coord(0, -3.0), 0.0);
        assert_eq!(table.clamp_coord(0, 3.0), 1.0);
        assert_eq!(table.clamp_coord(0, 0.25), 0.25);
    }
}
