//! The matrix façade.
//!
//! A [`Matrix`] holds a shared, reference-counted backing block plus two
//! deferred operations: a pending transform (transpose and, for complex
//! matrices, conjugation) and a pending scalar multiplier. Transposing or
//! scaling only touches the deferred state, so `2.0 * &a` shares `a`'s
//! block until one of them is observed.
//!
//! # Materialization
//!
//! Observations that read storage directly (coefficient reads, equality,
//! slicing, resizing, saving) first materialize the deferred state into a
//! fresh block and swap it into the façade under the façade's lock. Binary
//! arithmetic instead passes both operands' deferred state to the storage
//! engine, which applies it in the same pass.
//!
//! # Copy-on-write
//!
//! Mutating methods take `&mut self`. When the block is shared with another
//! façade it is cloned first, so co-owners never observe the change.
//!
//! # Indexing
//!
//! All public indices are 1-based. A single index `k` addresses the
//! coefficients in row-major logical order.

mod ops;

use crate::error::{MatrixError, MatrixResult};
use crate::index::{resolve_column, resolve_index, resolve_row};
use crate::scalar::{Scalar, WidenFrom};
use crate::storage::{DenseData, MatrixType, Operand, Resized, SparseData, Storage, Transform};
use crate::variant::Variant;
use num_complex::Complex64;
use numrt_rts_block::Shared;
use parking_lot::Mutex;
use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use tracing::trace;

/// Matrix of booleans.
pub type BooleanMatrix = Matrix<bool>;
/// Matrix of 64-bit integers.
pub type IntegerMatrix = Matrix<i64>;
/// Matrix of reals.
pub type RealMatrix = Matrix<f64>;
/// Matrix of complex values.
pub type ComplexMatrix = Matrix<Complex64>;

// ============================================================
// Deferred state
// ============================================================

/// Block pointer plus deferred operations. Logical coefficient `(r, c)` is
/// `scale · transform(block)(r, c)`.
#[derive(Clone)]
pub(crate) struct Lazy<S: Scalar> {
    pub(crate) block: Shared<Storage<S>>,
    pub(crate) transform: Transform,
    pub(crate) scale: S,
}

impl<S: Scalar> Lazy<S> {
    fn new(storage: Storage<S>) -> Self {
        Self {
            block: Shared::new(storage),
            transform: Transform::IDENTITY,
            scale: S::one(),
        }
    }

    fn is_pending(&self) -> bool {
        !self.transform.is_identity() || self.scale != S::one()
    }

    pub(crate) fn shape(&self) -> (usize, usize) {
        self.transform.shape(self.block.rows(), self.block.cols())
    }

    pub(crate) fn operand(&self) -> Operand<'_, S> {
        Operand {
            storage: &self.block,
            transform: self.transform,
            scale: self.scale,
        }
    }

    /// Resolve deferred state into a fresh block.
    fn materialize(&mut self) {
        if !self.is_pending() {
            return;
        }
        trace!(
            kind = ?S::KIND,
            rows = self.block.rows(),
            cols = self.block.cols(),
            transpose = self.transform.transpose,
            conjugate = self.transform.conjugate,
            "materializing deferred transform and scaling"
        );
        let fresh = self
            .block
            .apply_transform_and_scaling(self.transform, self.scale);
        self.block = Shared::new(fresh);
        self.transform = Transform::IDENTITY;
        self.scale = S::one();
    }

    /// The same logical matrix in kind `T`. Shares the block when `T` is `S`.
    pub(crate) fn widen<T: WidenFrom<S>>(&self) -> Lazy<T> {
        if let Some(same) = (self as &dyn Any).downcast_ref::<Lazy<T>>() {
            return same.clone();
        }
        Lazy {
            block: Shared::new(self.block.map(T::widen_from)),
            transform: self.transform,
            scale: T::widen_from(self.scale),
        }
    }
}

// ============================================================
// Matrix
// ============================================================

/// A copy-on-write, lazily transformed matrix over scalar kind `S`.
pub struct Matrix<S: Scalar> {
    state: Mutex<Lazy<S>>,
}

impl<S: Scalar> Matrix<S> {
    pub(crate) fn from_lazy(lazy: Lazy<S>) -> Self {
        Self {
            state: Mutex::new(lazy),
        }
    }

    pub(crate) fn from_storage(storage: Storage<S>) -> Self {
        Self::from_lazy(Lazy::new(storage))
    }

    pub(crate) fn from_dense(dense: DenseData<S>) -> Self {
        Self::from_storage(Storage::Dense(dense))
    }

    /// Copy of the deferred state; shares the block.
    pub(crate) fn snapshot(&self) -> Lazy<S> {
        self.state.lock().clone()
    }

    /// Materialize deferred state in the façade and return the block.
    pub(crate) fn apply_lazy_transforms_and_scaling(&self) -> Shared<Storage<S>> {
        let mut state = self.state.lock();
        state.materialize();
        state.block.clone()
    }

    /// Materialized storage owned by this façade alone.
    fn storage_mut(&mut self) -> &mut Storage<S> {
        let state = self.state.get_mut();
        state.materialize();
        if state.block.is_shared() {
            trace!(
                references = state.block.reference_count(),
                "copy-on-write clone of shared block"
            );
        }
        state.block.make_unique()
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Empty `0 × 0` dense matrix.
    #[must_use]
    pub fn new() -> Self {
        Self::zero(0, 0)
    }

    /// Zero-filled dense matrix; negative extents are rejected.
    pub fn with_dimensions(rows: i64, columns: i64) -> MatrixResult<Self> {
        match (usize::try_from(rows), usize::try_from(columns)) {
            (Ok(r), Ok(c)) => Ok(Self::zero(r, c)),
            _ => Err(MatrixError::BadDimension { rows, columns }),
        }
    }

    /// Zero-filled dense matrix.
    #[must_use]
    pub fn zero(rows: usize, columns: usize) -> Self {
        Self::from_storage(Storage::zeros(rows, columns))
    }

    /// Matrix with every coefficient equal to one.
    #[must_use]
    pub fn ones(rows: usize, columns: usize) -> Self {
        Self::from_dense(DenseData::from_fn(rows, columns, |_, _| S::one()))
    }

    /// `n × n` identity.
    #[must_use]
    pub fn identity(n: usize) -> Self {
        Self::identity_with_shape(n, n)
    }

    /// `rows × columns` matrix with ones where `i == j`.
    #[must_use]
    pub fn identity_with_shape(rows: usize, columns: usize) -> Self {
        Self::from_dense(DenseData::from_fn(rows, columns, |r, c| {
            if r == c {
                S::one()
            } else {
                S::zero()
            }
        }))
    }

    /// Copy `data`, laid out column by column.
    pub fn from_column_major(rows: usize, columns: usize, data: Vec<S>) -> MatrixResult<Self> {
        if data.len() != rows * columns {
            return Err(MatrixError::dimensions(
                "from_column_major",
                (rows, columns),
                (data.len(), 1),
            ));
        }
        Ok(Self::from_dense(DenseData::from_column_major(rows, columns, data)))
    }

    /// Build from rows of equal length.
    pub fn from_rows<R: AsRef<[S]>>(rows: &[R]) -> MatrixResult<Self> {
        let columns = rows.first().map_or(0, |r| r.as_ref().len());
        if let Some(bad) = rows.iter().find(|r| r.as_ref().len() != columns) {
            return Err(MatrixError::dimensions(
                "from_rows",
                (1, columns),
                (1, bad.as_ref().len()),
            ));
        }
        Ok(Self::from_dense(DenseData::from_fn(rows.len(), columns, |r, c| {
            rows[r].as_ref()[c]
        })))
    }

    /// Sparse matrix from 1-based `(row, column, value)` triples.
    pub fn sparse(
        rows: usize,
        columns: usize,
        triples: impl IntoIterator<Item = (i64, i64, S)>,
    ) -> MatrixResult<Self> {
        let mut data = SparseData::zeros(rows, columns);
        for (r, c, v) in triples {
            let r = resolve_row(r, rows)?;
            let c = resolve_column(c, columns)?;
            data.set(r, c, v);
        }
        Ok(Self::from_storage(Storage::Sparse(data)))
    }

    /// Square matrix with the row or column vector `entries` on its diagonal.
    pub fn diagonal(entries: &Self) -> MatrixResult<Self> {
        let block = entries.apply_lazy_transforms_and_scaling();
        let (rows, cols) = (block.rows(), block.cols());
        if rows.min(cols) != 1 {
            return Err(MatrixError::dimensions("diagonal", (rows, cols), (1, 0)));
        }
        let n = rows.max(cols);
        let values: Vec<S> = block.column_major().into_owned();
        Ok(Self::from_dense(DenseData::from_fn(n, n, |r, c| {
            if r == c {
                values[r]
            } else {
                S::zero()
            }
        })))
    }

    /// Main diagonal as a `min(rows, columns) × 1` column.
    #[must_use]
    pub fn diagonal_entries(&self) -> Self {
        let block = self.apply_lazy_transforms_and_scaling();
        let n = block.rows().min(block.cols());
        Self::from_dense(DenseData::from_fn(n, 1, |r, _| block.at(r, r)))
    }

    // ------------------------------------------------------------------
    // Shape observers
    // ------------------------------------------------------------------

    /// Logical `(rows, columns)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        self.state.lock().shape()
    }

    /// Logical row count.
    #[must_use]
    pub fn number_rows(&self) -> usize {
        self.shape().0
    }

    /// Logical column count.
    #[must_use]
    pub fn number_columns(&self) -> usize {
        self.shape().1
    }

    /// `rows × columns`.
    #[must_use]
    pub fn number_coefficients(&self) -> usize {
        let (r, c) = self.shape();
        r * c
    }

    /// Whether rows equal columns.
    #[must_use]
    pub fn is_square(&self) -> bool {
        let (r, c) = self.shape();
        r == c
    }

    /// Whether the matrix has no coefficients.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.number_coefficients() == 0
    }

    /// Layout of the current backing block.
    #[must_use]
    pub fn matrix_type(&self) -> MatrixType {
        self.state.lock().block.layout()
    }

    /// Whether a transform or multiplier is still deferred.
    #[must_use]
    pub fn has_pending_operations(&self) -> bool {
        self.state.lock().is_pending()
    }

    /// Whether both façades point at the same backing block.
    #[must_use]
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        let (a, b) = (self.snapshot(), other.snapshot());
        Shared::ptr_eq(&a.block, &b.block)
    }

    // ------------------------------------------------------------------
    // Coefficient access
    // ------------------------------------------------------------------

    /// Coefficient at 1-based `(row, column)`.
    pub fn value(&self, row: i64, column: i64) -> MatrixResult<S> {
        let block = self.apply_lazy_transforms_and_scaling();
        let r = resolve_row(row, block.rows())?;
        let c = resolve_column(column, block.cols())?;
        Ok(block.at(r, c))
    }

    /// Coefficient at 1-based single index `index`, row-major.
    pub fn value_at(&self, index: i64) -> MatrixResult<S> {
        let block = self.apply_lazy_transforms_and_scaling();
        let (r, c) = resolve_index(index, block.rows(), block.cols())?;
        Ok(block.at(r, c))
    }

    /// Coefficients in logical column-major order.
    #[must_use]
    pub fn to_column_major(&self) -> Vec<S> {
        self.apply_lazy_transforms_and_scaling()
            .column_major()
            .into_owned()
    }

    /// Coefficients as a vector of logical rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<S>> {
        let block = self.apply_lazy_transforms_and_scaling();
        (0..block.rows())
            .map(|r| (0..block.cols()).map(|c| block.at(r, c)).collect())
            .collect()
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Store `value` at 1-based `(row, column)`, growing the matrix with
    /// zeros when the position lies past the current extent.
    pub fn update(&mut self, row: i64, column: i64, value: S) -> MatrixResult<()> {
        let (rows, cols) = self.shape();
        let r = positive(row).ok_or(MatrixError::InvalidRow {
            index: row,
            extent: rows,
        })?;
        let c = positive(column).ok_or(MatrixError::InvalidColumn {
            index: column,
            extent: cols,
        })?;
        if r > rows || c > cols {
            self.resize_to(rows.max(r), cols.max(c));
        }
        self.storage_mut().set(r - 1, c - 1, value);
        Ok(())
    }

    /// Store `value` at 1-based single index `index`.
    ///
    /// Past the end, an empty or single-row matrix grows along its columns
    /// and a single-column matrix grows along its rows; any other shape
    /// rejects the index.
    pub fn update_at(&mut self, index: i64, value: S) -> MatrixResult<()> {
        let (rows, cols) = self.shape();
        let count = rows * cols;
        let invalid = MatrixError::InvalidIndex {
            index,
            extent: count,
        };
        let Some(k) = positive(index) else {
            return Err(invalid);
        };
        if k > count {
            if rows <= 1 {
                self.resize_to(1, cols.max(k));
            } else if cols == 0 {
                self.resize_to(1, k);
            } else if cols == 1 {
                self.resize_to(k, 1);
            } else {
                return Err(invalid);
            }
        }
        let cols = self.number_columns();
        self.storage_mut().set((k - 1) / cols, (k - 1) % cols, value);
        Ok(())
    }

    /// Coerce `value` to `S` and store it at `(row, column)`.
    ///
    /// Returns `false`, leaving the matrix untouched, when the value cannot
    /// be converted or an index is below 1.
    pub fn set_value(&mut self, row: i64, column: i64, value: &Variant) -> bool {
        match value.to_scalar::<S>() {
            Ok(v) => self.update(row, column, v).is_ok(),
            Err(err) => {
                trace!(error = %err, "set_value rejected");
                false
            }
        }
    }

    /// Coerce `value` to `S` and store it at single index `index`.
    pub fn set_value_at(&mut self, index: i64, value: &Variant) -> bool {
        match value.to_scalar::<S>() {
            Ok(v) => self.update_at(index, v).is_ok(),
            Err(err) => {
                trace!(error = %err, "set_value_at rejected");
                false
            }
        }
    }

    /// Change the shape, keeping the intersection with the prior shape and
    /// zero-filling new cells.
    pub fn resize(&mut self, rows: i64, columns: i64) -> MatrixResult<()> {
        match (usize::try_from(rows), usize::try_from(columns)) {
            (Ok(r), Ok(c)) => {
                self.resize_to(r, c);
                Ok(())
            }
            _ => Err(MatrixError::BadDimension { rows, columns }),
        }
    }

    fn resize_to(&mut self, rows: usize, cols: usize) {
        let storage = self.storage_mut();
        if let Resized::Fresh(fresh) = storage.resize_to(rows, cols, false) {
            *storage = fresh;
        }
    }

    // ------------------------------------------------------------------
    // Deferred operations
    // ------------------------------------------------------------------

    /// Transpose. Shares the block.
    #[must_use]
    pub fn transpose(&self) -> Self {
        let mut lazy = self.snapshot();
        lazy.transform = lazy.transform.transposed();
        Self::from_lazy(lazy)
    }

    /// Complex conjugate. Shares the block; the identity on other kinds.
    #[must_use]
    pub fn conjugate(&self) -> Self {
        let mut lazy = self.snapshot();
        conjugate_in_place(&mut lazy);
        Self::from_lazy(lazy)
    }

    /// Conjugate transpose. Shares the block.
    #[must_use]
    pub fn adjoint(&self) -> Self {
        let mut lazy = self.snapshot();
        conjugate_in_place(&mut lazy);
        lazy.transform = lazy.transform.transposed();
        Self::from_lazy(lazy)
    }

    /// `factor · self`. Shares the block.
    #[must_use]
    pub fn scaled(&self, factor: S) -> Self {
        let mut lazy = self.snapshot();
        lazy.scale = lazy.scale.times(factor);
        Self::from_lazy(lazy)
    }

    // ------------------------------------------------------------------
    // Layout and reshaping
    // ------------------------------------------------------------------

    /// Sparse copy of the logical matrix.
    #[must_use]
    pub fn to_sparse(&self) -> Self {
        Self::from_storage(self.apply_lazy_transforms_and_scaling().to_sparse())
    }

    /// Dense copy of the logical matrix.
    #[must_use]
    pub fn to_dense(&self) -> Self {
        Self::from_storage(self.apply_lazy_transforms_and_scaling().to_dense())
    }

    /// Columns in reverse order.
    #[must_use]
    pub fn column_reverse(&self) -> Self {
        Self::from_storage(self.apply_lazy_transforms_and_scaling().column_reverse())
    }

    /// Rows in reverse order.
    #[must_use]
    pub fn row_reverse(&self) -> Self {
        Self::from_storage(self.apply_lazy_transforms_and_scaling().row_reverse())
    }

    /// `[self other]`; the shorter operand is zero-padded.
    #[must_use]
    pub fn combine_left_to_right(&self, other: &Self) -> Self {
        let (a, b) = (
            self.apply_lazy_transforms_and_scaling(),
            other.apply_lazy_transforms_and_scaling(),
        );
        Self::from_storage(a.combine_left_to_right(&b))
    }

    /// `[self; other]`; the narrower operand is zero-padded.
    #[must_use]
    pub fn combine_top_to_bottom(&self, other: &Self) -> Self {
        let (a, b) = (
            self.apply_lazy_transforms_and_scaling(),
            other.apply_lazy_transforms_and_scaling(),
        );
        Self::from_storage(a.combine_top_to_bottom(&b))
    }

    // ------------------------------------------------------------------
    // Ordering
    // ------------------------------------------------------------------

    /// Total order over matrices of one kind: shape first, then
    /// column-major coefficients. Façades aliasing the same block with the
    /// same deferred state compare equal without materializing.
    #[must_use]
    pub fn relative_order(&self, other: &Self) -> Ordering {
        let (a, b) = (self.snapshot(), other.snapshot());
        if Shared::ptr_eq(&a.block, &b.block) && a.transform == b.transform && a.scale == b.scale {
            return Ordering::Equal;
        }
        let a = self.apply_lazy_transforms_and_scaling();
        let b = other.apply_lazy_transforms_and_scaling();
        a.relative_order(&b)
    }

    // ------------------------------------------------------------------
    // Conversion
    // ------------------------------------------------------------------

    /// Lossless conversion to a wider kind. Shares the block when `T` is `S`.
    #[must_use]
    pub fn widen<T: WidenFrom<S>>(&self) -> Matrix<T> {
        if let Some(same) = (self as &dyn Any).downcast_ref::<Matrix<T>>() {
            return same.clone();
        }
        let block = self.apply_lazy_transforms_and_scaling();
        Matrix::from_storage(block.map(T::widen_from))
    }

    /// Value-preserving conversion to any kind.
    ///
    /// Fails with `InvalidRuntimeConversion` when some coefficient has no
    /// exact counterpart in `T`.
    pub fn try_convert<T: Scalar>(&self) -> MatrixResult<Matrix<T>> {
        if let Some(same) = (self as &dyn Any).downcast_ref::<Matrix<T>>() {
            return Ok(same.clone());
        }
        let block = self.apply_lazy_transforms_and_scaling();
        let convertible = block
            .column_major()
            .iter()
            .all(|v| T::from_value(v.to_value()).is_some());
        if !convertible {
            return Err(MatrixError::InvalidRuntimeConversion {
                from: S::KIND.matrix_value_type(),
                to: T::KIND.matrix_value_type(),
            });
        }
        Ok(Matrix::from_storage(
            block.map(|v| T::from_value(v.to_value()).unwrap_or_else(T::zero)),
        ))
    }

    /// Matrix of kind `S` from a variant.
    ///
    /// A matrix variant of kind `S` shares its block. Other matrices,
    /// scalars (as `1 × 1`), ranges, sets and tuples (as rows) are converted
    /// when every value is representable in `S`.
    pub fn from_variant(variant: &Variant) -> MatrixResult<Self> {
        let mismatch = || MatrixError::InvalidRuntimeConversion {
            from: variant.value_type(),
            to: S::KIND.matrix_value_type(),
        };
        match variant {
            Variant::MatrixBoolean(m) => m.try_convert().map_err(|_| mismatch()),
            Variant::MatrixInteger(m) => m.try_convert().map_err(|_| mismatch()),
            Variant::MatrixReal(m) => m.try_convert().map_err(|_| mismatch()),
            Variant::MatrixComplex(m) => m.try_convert().map_err(|_| mismatch()),
            Variant::Boolean(_) | Variant::Integer(_) | Variant::Real(_) | Variant::Complex(_) => {
                let value = variant.to_scalar::<S>().map_err(|_| mismatch())?;
                Ok(Self::from_dense(DenseData::from_column_major(1, 1, vec![value])))
            }
            Variant::Range(range) => {
                let values: Option<Vec<S>> =
                    range.iter().map(|i| S::from_value(i.into())).collect();
                row_vector(values.ok_or_else(mismatch)?)
            }
            Variant::Set(set) => {
                let values: Option<Vec<S>> = set.iter().map(|&v| S::from_value(v)).collect();
                row_vector(values.ok_or_else(mismatch)?)
            }
            Variant::Tuple(tuple) => {
                let values: Option<Vec<S>> = tuple
                    .iter()
                    .map(|item| item.scalar().and_then(S::from_value))
                    .collect();
                row_vector(values.ok_or_else(mismatch)?)
            }
            Variant::None => Err(mismatch()),
        }
    }
}

fn row_vector<S: Scalar>(values: Vec<S>) -> MatrixResult<Matrix<S>> {
    Matrix::from_column_major(1, values.len(), values)
}

fn conjugate_in_place<S: Scalar>(lazy: &mut Lazy<S>) {
    if S::KIND == crate::scalar::ScalarKind::Complex {
        lazy.transform = lazy.transform.conjugated();
        lazy.scale = lazy.scale.conj();
    }
}

/// A 1-based index as a count, or `None` below 1.
fn positive(index: i64) -> Option<usize> {
    if index < 1 {
        None
    } else {
        usize::try_from(index).ok()
    }
}

impl Matrix<Complex64> {
    /// Real parts of the coefficients.
    #[must_use]
    pub fn real_part(&self) -> RealMatrix {
        let block = self.apply_lazy_transforms_and_scaling();
        Matrix::from_storage(block.map(|z| z.re))
    }

    /// Imaginary parts of the coefficients.
    #[must_use]
    pub fn imaginary_part(&self) -> RealMatrix {
        let block = self.apply_lazy_transforms_and_scaling();
        Matrix::from_storage(block.map(|z| z.im))
    }
}

// ============================================================
// Trait implementations
// ============================================================

impl<S: Scalar> Clone for Matrix<S> {
    fn clone(&self) -> Self {
        Self::from_lazy(self.snapshot())
    }
}

impl<S: Scalar> Default for Matrix<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Scalar> TryFrom<&Variant> for Matrix<S> {
    type Error = MatrixError;

    fn try_from(variant: &Variant) -> MatrixResult<Self> {
        Self::from_variant(variant)
    }
}

/// Shape first, then coefficients by numeric value, across kinds.
impl<S: Scalar, T: Scalar> PartialEq<Matrix<T>> for Matrix<S> {
    fn eq(&self, other: &Matrix<T>) -> bool {
        let a = self.apply_lazy_transforms_and_scaling();
        let b = other.apply_lazy_transforms_and_scaling();
        if (a.rows(), a.cols()) != (b.rows(), b.cols()) {
            return false;
        }
        if let Some(b) = (&b as &dyn Any).downcast_ref::<Shared<Storage<S>>>() {
            return a.is_equal_to(b);
        }
        a.column_major()
            .iter()
            .zip(b.column_major().iter())
            .all(|(x, y)| x.to_value() == y.to_value())
    }
}

impl<S: Scalar> fmt::Debug for Matrix<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lazy = self.snapshot();
        let (rows, cols) = lazy.shape();
        f.debug_struct("Matrix")
            .field("kind", &S::KIND)
            .field("rows", &rows)
            .field("columns", &cols)
            .field("layout", &lazy.block.layout())
            .field("pending", &lazy.is_pending())
            .finish()
    }
}

impl<S: Scalar> fmt::Display for Matrix<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[")?;
        for row in self.to_rows() {
            write!(f, "  [")?;
            for (c, value) in row.iter().enumerate() {
                if c > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{value}")?;
            }
            writeln!(f, "]")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn real(rows: &[[f64; 2]]) -> RealMatrix {
        Matrix::from_rows(rows).unwrap()
    }

    #[test]
    fn test_snapshot_shares_block() {
        let a = real(&[[1.0, 2.0], [3.0, 4.0]]);
        let b = a.clone();
        assert!(a.shares_storage_with(&b));
        assert_eq!(a.snapshot().block.reference_count(), 3);
    }

    #[test]
    fn test_materialize_resets_deferred_state() {
        let a = real(&[[1.0, 2.0], [3.0, 4.0]]);
        let b = a.transpose().scaled(3.0);
        assert!(b.has_pending_operations());
        assert_eq!(b.value(1, 2).unwrap(), 9.0);
        assert!(!b.has_pending_operations());
        assert!(!b.shares_storage_with(&a));
    }

    #[test]
    fn test_widen_same_kind_shares() {
        let a = real(&[[1.0, 2.0], [3.0, 4.0]]);
        let same: RealMatrix = a.widen();
        assert!(same.shares_storage_with(&a));
        let wider: ComplexMatrix = a.widen();
        assert_eq!(wider.value(2, 1).unwrap(), Complex64::new(3.0, 0.0));
    }

    #[test]
    fn test_update_on_shared_clones() {
        let a = real(&[[1.0, 2.0], [3.0, 4.0]]);
        let mut b = a.clone();
        b.update(1, 1, 10.0).unwrap();
        assert!(!a.shares_storage_with(&b));
        assert_eq!(a.value(1, 1).unwrap(), 1.0);
        assert_eq!(b.value(1, 1).unwrap(), 10.0);
    }

    #[test]
    fn test_conjugate_is_noop_for_reals() {
        let a = real(&[[1.0, 2.0], [3.0, 4.0]]);
        assert!(!a.conjugate().has_pending_operations());
        assert!(a.adjoint().has_pending_operations());
    }
}
