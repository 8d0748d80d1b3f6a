//! Storage engines behind the matrix façade.
//!
//! [`Storage`] dispatches between the dense and sparse engines. Sparse
//! engines decline fused operations against dense operands; this layer then
//! densifies and retries on the dense engine.

mod dense;
mod sparse;

pub(crate) use dense::DenseData;
pub(crate) use sparse::SparseData;

use crate::error::{MatrixError, MatrixResult};
use crate::scalar::{Field, Scalar};
use std::borrow::Cow;
use std::cmp::Ordering;
use tracing::trace;

// ============================================================
// Shared types
// ============================================================

/// Backing layout of a matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatrixType {
    /// Column-major contiguous coefficients.
    Dense,
    /// Coordinate map of non-zero coefficients.
    Sparse,
}

/// Pending transform: optional transpose and optional conjugation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub(crate) struct Transform {
    pub(crate) transpose: bool,
    pub(crate) conjugate: bool,
}

impl Transform {
    pub(crate) const IDENTITY: Self = Self {
        transpose: false,
        conjugate: false,
    };

    pub(crate) fn is_identity(self) -> bool {
        self == Self::IDENTITY
    }

    #[must_use]
    pub(crate) fn transposed(self) -> Self {
        Self {
            transpose: !self.transpose,
            ..self
        }
    }

    #[must_use]
    pub(crate) fn conjugated(self) -> Self {
        Self {
            conjugate: !self.conjugate,
            ..self
        }
    }

    /// Logical shape of a `rows × cols` block seen through this transform.
    #[inline]
    pub(crate) fn shape(self, rows: usize, cols: usize) -> (usize, usize) {
        if self.transpose {
            (cols, rows)
        } else {
            (rows, cols)
        }
    }
}

/// Outcome of a resize request.
#[derive(Debug)]
pub(crate) enum Resized<T> {
    /// The block was resized where it lives.
    InPlace,
    /// A new block was allocated.
    Fresh(T),
}

/// One operand of a fused operation: storage plus its pending state.
#[derive(Clone, Copy)]
pub(crate) struct Operand<'a, S> {
    pub(crate) storage: &'a Storage<S>,
    pub(crate) transform: Transform,
    pub(crate) scale: S,
}

impl<S: Scalar> Operand<'_, S> {
    pub(crate) fn shape(&self) -> (usize, usize) {
        self.transform
            .shape(self.storage.rows(), self.storage.cols())
    }
}

// ============================================================
// Storage
// ============================================================

/// A backing block of one scalar kind.
#[derive(Clone, Debug)]
pub(crate) enum Storage<S> {
    Dense(DenseData<S>),
    Sparse(SparseData<S>),
}

impl<S: Scalar> Default for Storage<S> {
    fn default() -> Self {
        Self::Dense(DenseData::zeros(0, 0))
    }
}

impl<S: Scalar> Storage<S> {
    pub(crate) fn zeros(rows: usize, cols: usize) -> Self {
        Self::Dense(DenseData::zeros(rows, cols))
    }

    pub(crate) fn rows(&self) -> usize {
        match self {
            Self::Dense(d) => d.rows(),
            Self::Sparse(s) => s.rows(),
        }
    }

    pub(crate) fn cols(&self) -> usize {
        match self {
            Self::Dense(d) => d.cols(),
            Self::Sparse(s) => s.cols(),
        }
    }

    pub(crate) fn layout(&self) -> MatrixType {
        match self {
            Self::Dense(_) => MatrixType::Dense,
            Self::Sparse(_) => MatrixType::Sparse,
        }
    }

    /// Coefficient at `(row, col)`, 0-based, in bounds.
    pub(crate) fn at(&self, row: usize, col: usize) -> S {
        match self {
            Self::Dense(d) => d.at(row, col),
            Self::Sparse(s) => s.at(row, col),
        }
    }

    /// Store a coefficient; `false` out of bounds.
    pub(crate) fn set(&mut self, row: usize, col: usize, value: S) -> bool {
        match self {
            Self::Dense(d) => match d.get_mut(row, col) {
                Some(slot) => {
                    *slot = value;
                    true
                }
                None => false,
            },
            Self::Sparse(s) => s.set(row, col, value),
        }
    }

    /// Coefficients in column-major order, implicit zeros included.
    pub(crate) fn column_major(&self) -> Cow<'_, [S]> {
        match self {
            Self::Dense(d) => Cow::Borrowed(d.as_slice()),
            Self::Sparse(s) => Cow::Owned(s.to_dense().as_slice().to_vec()),
        }
    }

    fn dense_view(&self) -> Cow<'_, DenseData<S>> {
        match self {
            Self::Dense(d) => Cow::Borrowed(d),
            Self::Sparse(s) => {
                trace!(rows = s.rows(), cols = s.cols(), nnz = s.nnz(), "densifying sparse operand");
                Cow::Owned(s.to_dense())
            }
        }
    }

    pub(crate) fn to_dense(&self) -> Self {
        Self::Dense(self.dense_view().into_owned())
    }

    pub(crate) fn to_sparse(&self) -> Self {
        match self {
            Self::Dense(d) => Self::Sparse(SparseData::from_dense(d)),
            Self::Sparse(s) => Self::Sparse(s.clone()),
        }
    }

    /// Convert every coefficient, keeping the layout.
    pub(crate) fn map<T: Scalar>(&self, f: impl Fn(S) -> T) -> Storage<T> {
        match self {
            Self::Dense(d) => Storage::Dense(d.map(f)),
            Self::Sparse(s) => Storage::Sparse(s.map(f)),
        }
    }

    // ------------------------------------------------------------------
    // Reshaping
    // ------------------------------------------------------------------

    pub(crate) fn resize_to(&mut self, rows: usize, cols: usize, always_reallocate: bool) -> Resized<Self> {
        match self {
            Self::Dense(d) => match d.resize_to(rows, cols, always_reallocate) {
                Resized::InPlace => Resized::InPlace,
                Resized::Fresh(fresh) => Resized::Fresh(Self::Dense(fresh)),
            },
            Self::Sparse(s) => match s.resize_to(rows, cols, always_reallocate) {
                Resized::InPlace => Resized::InPlace,
                Resized::Fresh(fresh) => Resized::Fresh(Self::Sparse(fresh)),
            },
        }
    }

    pub(crate) fn column_reverse(&self) -> Self {
        match self {
            Self::Dense(d) => Self::Dense(d.column_reverse()),
            Self::Sparse(s) => Self::Sparse(s.column_reverse()),
        }
    }

    pub(crate) fn row_reverse(&self) -> Self {
        match self {
            Self::Dense(d) => Self::Dense(d.row_reverse()),
            Self::Sparse(s) => Self::Sparse(s.row_reverse()),
        }
    }

    pub(crate) fn combine_left_to_right(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Sparse(a), Self::Sparse(b)) => Self::Sparse(a.combine_left_to_right(b)),
            _ => Self::Dense(
                self.dense_view()
                    .combine_left_to_right(&other.dense_view()),
            ),
        }
    }

    pub(crate) fn combine_top_to_bottom(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Sparse(a), Self::Sparse(b)) => Self::Sparse(a.combine_top_to_bottom(b)),
            _ => Self::Dense(
                self.dense_view()
                    .combine_top_to_bottom(&other.dense_view()),
            ),
        }
    }

    // ------------------------------------------------------------------
    // Fused arithmetic
    // ------------------------------------------------------------------

    /// `a.scale · a + b.scale · b` with both pending transforms honoured.
    pub(crate) fn add(a: Operand<'_, S>, b: Operand<'_, S>) -> MatrixResult<Self> {
        let (sa, sb) = (a.shape(), b.shape());
        if sa != sb {
            return Err(MatrixError::dimensions("add", sa, sb));
        }
        if let Self::Sparse(x) = a.storage {
            if let Some(sum) = x.add(a.transform, a.scale, b.storage, b.transform, b.scale) {
                return Ok(Self::Sparse(sum));
            }
        }
        let (x, y) = (a.storage.dense_view(), b.storage.dense_view());
        Ok(Self::Dense(x.add(a.transform, a.scale, &y, b.transform, b.scale)))
    }

    /// `scale · a · b` with both pending transforms honoured.
    pub(crate) fn multiply(a: Operand<'_, S>, b: Operand<'_, S>) -> MatrixResult<Self> {
        let (sa, sb) = (a.shape(), b.shape());
        if sa.1 != sb.0 {
            return Err(MatrixError::dimensions("multiply", sa, sb));
        }
        let scale = a.scale.times(b.scale);
        if let Self::Sparse(x) = a.storage {
            if let Some(product) = x.multiply(a.transform, b.storage, b.transform, scale) {
                return Ok(Self::Sparse(product));
            }
        }
        let (x, y) = (a.storage.dense_view(), b.storage.dense_view());
        Ok(Self::Dense(x.multiply(a.transform, &y, b.transform, scale)))
    }

    pub(crate) fn hadamard(a: Operand<'_, S>, b: Operand<'_, S>) -> MatrixResult<Self> {
        let (sa, sb) = (a.shape(), b.shape());
        if sa != sb {
            return Err(MatrixError::dimensions("hadamard", sa, sb));
        }
        if let Self::Sparse(x) = a.storage {
            if let Some(product) = x.hadamard(a.transform, a.scale, b.storage, b.transform, b.scale) {
                return Ok(Self::Sparse(product));
            }
        }
        let (x, y) = (a.storage.dense_view(), b.storage.dense_view());
        Ok(Self::Dense(x.hadamard(a.transform, a.scale, &y, b.transform, b.scale)))
    }

    pub(crate) fn kronecker(a: Operand<'_, S>, b: Operand<'_, S>) -> Self {
        if let Self::Sparse(x) = a.storage {
            if let Some(product) = x.kronecker(a.transform, a.scale, b.storage, b.transform, b.scale) {
                return Self::Sparse(product);
            }
        }
        let (x, y) = (a.storage.dense_view(), b.storage.dense_view());
        Self::Dense(x.kronecker(a.transform, a.scale, &y, b.transform, b.scale))
    }

    /// Materialize `scale · transform(self)` into a fresh block.
    pub(crate) fn apply_transform_and_scaling(&self, transform: Transform, scale: S) -> Self {
        match self {
            Self::Dense(d) => Self::Dense(d.apply_transform_and_scaling(transform, scale)),
            Self::Sparse(s) => Self::Sparse(s.apply_transform_and_scaling(transform, scale)),
        }
    }

    // ------------------------------------------------------------------
    // Comparison
    // ------------------------------------------------------------------

    pub(crate) fn is_equal_to(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Dense(a), Self::Dense(b)) => a.is_equal_to(b),
            (Self::Sparse(a), Self::Sparse(b)) => a.is_equal_to(b),
            _ => {
                self.rows() == other.rows()
                    && self.cols() == other.cols()
                    && self.column_major() == other.column_major()
            }
        }
    }

    pub(crate) fn relative_order(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Dense(a), Self::Dense(b)) => a.relative_order(b),
            (Self::Sparse(a), Self::Sparse(b)) => a.relative_order(b),
            _ => self.dense_view().relative_order(&other.dense_view()),
        }
    }
}

impl<S: Field> Storage<S> {
    /// Materialize `numerator · transform(self) / denominator`.
    pub(crate) fn divide(&self, transform: Transform, numerator: S, denominator: S) -> Self {
        match self {
            Self::Dense(d) => Self::Dense(d.divide(transform, numerator, denominator)),
            Self::Sparse(s) => Self::Sparse(s.divide(transform, numerator, denominator)),
        }
    }
}
