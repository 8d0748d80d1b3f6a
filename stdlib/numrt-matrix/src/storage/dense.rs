//! Column-major dense storage.

use super::{Resized, Transform};
use crate::scalar::{Field, Scalar};
use std::cmp::Ordering;

/// Dense column-major coefficients.
///
/// `rows` and `cols` are the untransposed storage shape; pending transposes
/// live on the façade.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DenseData<S> {
    rows: usize,
    cols: usize,
    data: Vec<S>,
}

impl<S: Scalar> DenseData<S> {
    /// Zero-filled block.
    pub(crate) fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![S::zero(); rows * cols],
        }
    }

    /// Wrap column-major coefficients. `data.len()` must be `rows * cols`.
    pub(crate) fn from_column_major(rows: usize, cols: usize, data: Vec<S>) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self { rows, cols, data }
    }

    /// Build from a function of `(row, col)`, evaluated in column-major order.
    pub(crate) fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> S) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for c in 0..cols {
            for r in 0..rows {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }

    #[inline]
    pub(crate) fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub(crate) fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        col * self.rows + row
    }

    /// Coefficient at `(row, col)`, 0-based. The position must be in bounds.
    #[inline]
    pub(crate) fn at(&self, row: usize, col: usize) -> S {
        self.data[self.offset(row, col)]
    }

    /// Mutable coefficient, or `None` out of bounds.
    pub(crate) fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut S> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        let offset = self.offset(row, col);
        self.data.get_mut(offset)
    }

    /// Column-major coefficients.
    pub(crate) fn as_slice(&self) -> &[S] {
        &self.data
    }

    /// Coefficient at logical `(row, col)` as seen through `transform`.
    #[inline]
    pub(crate) fn read(&self, transform: Transform, row: usize, col: usize) -> S {
        let value = if transform.transpose {
            self.at(col, row)
        } else {
            self.at(row, col)
        };
        if transform.conjugate {
            value.conj()
        } else {
            value
        }
    }

    /// Convert every coefficient.
    pub(crate) fn map<T: Scalar>(&self, f: impl Fn(S) -> T) -> DenseData<T> {
        DenseData {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    // ------------------------------------------------------------------
    // Reshaping
    // ------------------------------------------------------------------

    /// Resize without moving surviving coefficients.
    ///
    /// Possible when the row count is unchanged (columns are contiguous), when
    /// the block holds no coefficients, or when a single column stays one.
    pub(crate) fn resize_in_place_to(&mut self, rows: usize, cols: usize) -> bool {
        let in_place =
            rows == self.rows || self.data.is_empty() || (self.cols == 1 && cols <= 1);
        if !in_place {
            return false;
        }
        self.data.resize(rows * cols, S::zero());
        self.rows = rows;
        self.cols = cols;
        true
    }

    /// Resize keeping the intersection with the prior shape, zero-filling
    /// new cells.
    pub(crate) fn resize_to(&mut self, rows: usize, cols: usize, always_reallocate: bool) -> Resized<Self> {
        if !always_reallocate && self.resize_in_place_to(rows, cols) {
            return Resized::InPlace;
        }
        let fresh = Self::from_fn(rows, cols, |r, c| {
            if r < self.rows && c < self.cols {
                self.at(r, c)
            } else {
                S::zero()
            }
        });
        Resized::Fresh(fresh)
    }

    pub(crate) fn column_reverse(&self) -> Self {
        Self::from_fn(self.rows, self.cols, |r, c| self.at(r, self.cols - 1 - c))
    }

    pub(crate) fn row_reverse(&self) -> Self {
        Self::from_fn(self.rows, self.cols, |r, c| self.at(self.rows - 1 - r, c))
    }

    /// `[self other]`, zero-padding the shorter operand's rows.
    pub(crate) fn combine_left_to_right(&self, other: &Self) -> Self {
        let rows = self.rows.max(other.rows);
        Self::from_fn(rows, self.cols + other.cols, |r, c| {
            let (block, c) = if c < self.cols {
                (self, c)
            } else {
                (other, c - self.cols)
            };
            if r < block.rows {
                block.at(r, c)
            } else {
                S::zero()
            }
        })
    }

    /// `[self; other]`, zero-padding the narrower operand's columns.
    pub(crate) fn combine_top_to_bottom(&self, other: &Self) -> Self {
        let cols = self.cols.max(other.cols);
        Self::from_fn(self.rows + other.rows, cols, |r, c| {
            let (block, r) = if r < self.rows {
                (self, r)
            } else {
                (other, r - self.rows)
            };
            if c < block.cols {
                block.at(r, c)
            } else {
                S::zero()
            }
        })
    }

    // ------------------------------------------------------------------
    // Fused arithmetic. Shapes are validated by the caller.
    // ------------------------------------------------------------------

    /// `a_scale · a_t(self) + b_scale · b_t(other)`.
    pub(crate) fn add(
        &self,
        a_t: Transform,
        a_scale: S,
        other: &Self,
        b_t: Transform,
        b_scale: S,
    ) -> Self {
        let (rows, cols) = a_t.shape(self.rows, self.cols);
        Self::from_fn(rows, cols, |r, c| {
            a_scale
                .times(self.read(a_t, r, c))
                .plus(b_scale.times(other.read(b_t, r, c)))
        })
    }

    /// `scale · a_t(self) · b_t(other)`.
    pub(crate) fn multiply(&self, a_t: Transform, other: &Self, b_t: Transform, scale: S) -> Self {
        let (m, k) = a_t.shape(self.rows, self.cols);
        let (_, n) = b_t.shape(other.rows, other.cols);
        let mut data = vec![S::zero(); m * n];
        for j in 0..n {
            let column = &mut data[j * m..(j + 1) * m];
            for p in 0..k {
                let b = other.read(b_t, p, j);
                for (i, slot) in column.iter_mut().enumerate() {
                    *slot = slot.plus(self.read(a_t, i, p).times(b));
                }
            }
        }
        if scale != S::one() {
            for slot in &mut data {
                *slot = scale.times(*slot);
            }
        }
        Self::from_column_major(m, n, data)
    }

    /// Elementwise product of the scaled, transformed operands.
    pub(crate) fn hadamard(
        &self,
        a_t: Transform,
        a_scale: S,
        other: &Self,
        b_t: Transform,
        b_scale: S,
    ) -> Self {
        let scale = a_scale.times(b_scale);
        let (rows, cols) = a_t.shape(self.rows, self.cols);
        Self::from_fn(rows, cols, |r, c| {
            scale.times(self.read(a_t, r, c).times(other.read(b_t, r, c)))
        })
    }

    /// Block product `A ⊗ B` of the scaled, transformed operands.
    pub(crate) fn kronecker(
        &self,
        a_t: Transform,
        a_scale: S,
        other: &Self,
        b_t: Transform,
        b_scale: S,
    ) -> Self {
        let scale = a_scale.times(b_scale);
        let (ar, ac) = a_t.shape(self.rows, self.cols);
        let (br, bc) = b_t.shape(other.rows, other.cols);
        Self::from_fn(ar * br, ac * bc, |r, c| {
            let a = self.read(a_t, r / br, c / bc);
            let b = other.read(b_t, r % br, c % bc);
            scale.times(a.times(b))
        })
    }

    /// Materialize `scale · transform(self)`.
    pub(crate) fn apply_transform_and_scaling(&self, transform: Transform, scale: S) -> Self {
        let (rows, cols) = transform.shape(self.rows, self.cols);
        Self::from_fn(rows, cols, |r, c| scale.times(self.read(transform, r, c)))
    }

    pub(crate) fn is_equal_to(&self, other: &Self) -> bool {
        self == other
    }

    /// Order by shape, then column-major coefficients.
    pub(crate) fn relative_order(&self, other: &Self) -> Ordering {
        self.rows
            .cmp(&other.rows)
            .then(self.cols.cmp(&other.cols))
            .then_with(|| {
                self.data
                    .iter()
                    .zip(&other.data)
                    .map(|(a, b)| a.total_cmp(b))
                    .find(|o| o.is_ne())
                    .unwrap_or(Ordering::Equal)
            })
    }
}

impl<S: Field> DenseData<S> {
    /// Materialize `numerator · transform(self) / denominator`.
    pub(crate) fn divide(&self, transform: Transform, numerator: S, denominator: S) -> Self {
        let (rows, cols) = transform.shape(self.rows, self.cols);
        Self::from_fn(rows, cols, |r, c| {
            numerator.times(self.read(transform, r, c)).divide(denominator)
        })
    }
}
