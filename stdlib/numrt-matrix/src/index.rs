//! Index arguments.
//!
//! Every argument accepted by [`Matrix::at`] and [`Matrix::at_index`]
//! resolves to a [`Selector`]: a single 1-based index, an ordered sequence
//! of them, or a range kept unexpanded. Gathering checks each entry against
//! the current extent and reports the first failing index; range terms are
//! produced one at a time, so an oversized range stops at its first term
//! past the extent.

use crate::error::{MatrixError, MatrixResult};
use crate::matrix::Matrix;
use crate::scalar::{Scalar, Value};
use crate::storage::{DenseData, Storage};
use crate::variant::{Range, Set, Tuple, Variant};
use num_complex::Complex64;

// ============================================================
// Selectors
// ============================================================

/// A resolved index argument, still 1-based and unchecked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    /// One index; selects a coefficient.
    Scalar(i64),
    /// Indices in gather order; selects a submatrix.
    Sequence(Vec<i64>),
    /// Range terms in order; selects a submatrix.
    Range(Range),
}

impl Selector {
    /// Resolve every entry with `resolve`, stopping at the first failure.
    fn resolve_each<T>(
        self,
        resolve: impl Fn(i64) -> MatrixResult<T>,
    ) -> MatrixResult<Vec<T>> {
        match self {
            Self::Scalar(i) => Ok(vec![resolve(i)?]),
            Self::Sequence(v) => v.into_iter().map(resolve).collect(),
            Self::Range(r) => r.iter().map(resolve).collect(),
        }
    }
}

/// A value usable as a row, column or single index.
pub trait IndexArg {
    /// Resolve to a selector.
    ///
    /// Fails with `InvalidParameterValue` when the argument, or one of its
    /// entries, does not denote an integer.
    fn selector(&self) -> MatrixResult<Selector>;
}

fn integral(value: Value) -> MatrixResult<i64> {
    value
        .to_integer()
        .ok_or_else(|| MatrixError::parameter(format!("{value} is not an integer index")))
}

impl IndexArg for i64 {
    fn selector(&self) -> MatrixResult<Selector> {
        Ok(Selector::Scalar(*self))
    }
}

impl IndexArg for i32 {
    fn selector(&self) -> MatrixResult<Selector> {
        Ok(Selector::Scalar(i64::from(*self)))
    }
}

impl IndexArg for f64 {
    fn selector(&self) -> MatrixResult<Selector> {
        integral(Value::Real(*self)).map(Selector::Scalar)
    }
}

impl IndexArg for Complex64 {
    fn selector(&self) -> MatrixResult<Selector> {
        integral(Value::Complex(*self)).map(Selector::Scalar)
    }
}

impl IndexArg for [i64] {
    fn selector(&self) -> MatrixResult<Selector> {
        Ok(Selector::Sequence(self.to_vec()))
    }
}

impl IndexArg for Vec<i64> {
    fn selector(&self) -> MatrixResult<Selector> {
        self.as_slice().selector()
    }
}

impl IndexArg for Range {
    fn selector(&self) -> MatrixResult<Selector> {
        Ok(Selector::Range(*self))
    }
}

impl IndexArg for Set {
    fn selector(&self) -> MatrixResult<Selector> {
        self.iter()
            .map(|&v| integral(v))
            .collect::<MatrixResult<_>>()
            .map(Selector::Sequence)
    }
}

impl IndexArg for Tuple {
    fn selector(&self) -> MatrixResult<Selector> {
        self.iter()
            .map(|item| match item.scalar() {
                Some(v) => integral(v),
                None => Err(MatrixError::parameter(format!(
                    "tuple entry of type {} is not an index",
                    item.value_type()
                ))),
            })
            .collect::<MatrixResult<_>>()
            .map(Selector::Sequence)
    }
}

/// Entries in logical column-major order.
impl<S: Scalar> IndexArg for Matrix<S> {
    fn selector(&self) -> MatrixResult<Selector> {
        self.to_column_major()
            .into_iter()
            .map(|v| integral(v.to_value()))
            .collect::<MatrixResult<_>>()
            .map(Selector::Sequence)
    }
}

impl IndexArg for Variant {
    fn selector(&self) -> MatrixResult<Selector> {
        match self {
            Self::Integer(i) => i.selector(),
            Self::Real(x) => x.selector(),
            Self::Complex(z) => z.selector(),
            Self::Range(r) => r.selector(),
            Self::Set(s) => s.selector(),
            Self::Tuple(t) => t.selector(),
            Self::MatrixBoolean(m) => m.selector(),
            Self::MatrixInteger(m) => m.selector(),
            Self::MatrixReal(m) => m.selector(),
            Self::MatrixComplex(m) => m.selector(),
            Self::None | Self::Boolean(_) => Err(MatrixError::parameter(format!(
                "{} cannot be used as an index",
                self.value_type()
            ))),
        }
    }
}

impl<T: IndexArg + ?Sized> IndexArg for &T {
    fn selector(&self) -> MatrixResult<Selector> {
        (**self).selector()
    }
}

// ============================================================
// Bounds
// ============================================================

fn zero_based(index: i64, extent: usize) -> Option<usize> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i >= 1 && i <= extent)
        .map(|i| i - 1)
}

pub(crate) fn resolve_row(index: i64, extent: usize) -> MatrixResult<usize> {
    zero_based(index, extent).ok_or(MatrixError::InvalidRow { index, extent })
}

pub(crate) fn resolve_column(index: i64, extent: usize) -> MatrixResult<usize> {
    zero_based(index, extent).ok_or(MatrixError::InvalidColumn { index, extent })
}

/// Row-major single index to a 0-based `(row, column)` pair.
pub(crate) fn resolve_index(index: i64, rows: usize, cols: usize) -> MatrixResult<(usize, usize)> {
    let extent = rows * cols;
    let k = zero_based(index, extent).ok_or(MatrixError::InvalidIndex { index, extent })?;
    Ok((k / cols, k % cols))
}

// ============================================================
// Selection
// ============================================================

/// Result of an indexed read.
#[derive(Clone, Debug)]
pub enum Selection<S: Scalar> {
    /// Both arguments were scalar.
    Scalar(S),
    /// At least one argument was a sequence.
    Matrix(Matrix<S>),
}

impl<S: Scalar> Selection<S> {
    /// The coefficient, if a scalar was selected.
    #[must_use]
    pub fn scalar(&self) -> Option<S> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::Matrix(_) => None,
        }
    }

    /// The submatrix, if a sequence was selected.
    #[must_use]
    pub fn into_matrix(self) -> Option<Matrix<S>> {
        match self {
            Self::Matrix(m) => Some(m),
            Self::Scalar(_) => None,
        }
    }
}

impl<S: Scalar> From<Selection<S>> for Variant
where
    Variant: From<S> + From<Matrix<S>>,
{
    fn from(selection: Selection<S>) -> Self {
        match selection {
            Selection::Scalar(v) => v.into(),
            Selection::Matrix(m) => m.into(),
        }
    }
}

impl<S: Scalar> Matrix<S> {
    /// Read by row and column arguments.
    ///
    /// Two scalar arguments select a coefficient. Otherwise the result is a
    /// fresh dense matrix of shape `(row count, column count)`, gathered in
    /// the arguments' orders.
    pub fn at<R: IndexArg, C: IndexArg>(&self, row: R, column: C) -> MatrixResult<Selection<S>> {
        let rows = row.selector()?;
        let columns = column.selector()?;
        let block = self.apply_lazy_transforms_and_scaling();
        let (nr, nc) = (block.rows(), block.cols());
        if let (Selector::Scalar(r), Selector::Scalar(c)) = (&rows, &columns) {
            let r = resolve_row(*r, nr)?;
            let c = resolve_column(*c, nc)?;
            return Ok(Selection::Scalar(block.at(r, c)));
        }
        let rows = rows.resolve_each(|r| resolve_row(r, nr))?;
        let columns = columns.resolve_each(|c| resolve_column(c, nc))?;
        let gathered = DenseData::from_fn(rows.len(), columns.len(), |i, j| {
            block.at(rows[i], columns[j])
        });
        Ok(Selection::Matrix(Matrix::from_storage(Storage::Dense(gathered))))
    }

    /// Read by single index, in row-major logical order.
    ///
    /// A sequence argument yields a row when the matrix is a single row and
    /// a column otherwise.
    pub fn at_index<I: IndexArg>(&self, index: I) -> MatrixResult<Selection<S>> {
        let selector = index.selector()?;
        let block = self.apply_lazy_transforms_and_scaling();
        let (nr, nc) = (block.rows(), block.cols());
        match selector {
            Selector::Scalar(k) => {
                let (r, c) = resolve_index(k, nr, nc)?;
                Ok(Selection::Scalar(block.at(r, c)))
            }
            sequence => {
                let values = sequence
                    .resolve_each(|k| resolve_index(k, nr, nc).map(|(r, c)| block.at(r, c)))?;
                let n = values.len();
                let (rows, cols) = if nr == 1 { (1, n) } else { (n, 1) };
                Ok(Selection::Matrix(Matrix::from_storage(Storage::Dense(
                    DenseData::from_column_major(rows, cols, values),
                ))))
            }
        }
    }
}
