//! Matrix error types.

use crate::variant::ValueType;
use numrt_rts_random::EngineError;
use thiserror::Error;

/// Result type for matrix operations.
pub type MatrixResult<T> = Result<T, MatrixError>;

/// Errors raised at the matrix boundary.
///
/// Indices carried by the errors are the caller's 1-based values.
#[derive(Debug, Error)]
pub enum MatrixError {
    /// A row index is outside `[1, extent]`.
    #[error("invalid row {index}: matrix has {extent} rows")]
    InvalidRow {
        /// The rejected 1-based index.
        index: i64,
        /// Number of rows at the time of the call.
        extent: usize,
    },

    /// A column index is outside `[1, extent]`.
    #[error("invalid column {index}: matrix has {extent} columns")]
    InvalidColumn {
        /// The rejected 1-based index.
        index: i64,
        /// Number of columns at the time of the call.
        extent: usize,
    },

    /// A single (flat) index is outside `[1, extent]`.
    #[error("invalid index {index}: matrix has {extent} coefficients")]
    InvalidIndex {
        /// The rejected 1-based index.
        index: i64,
        /// Number of coefficients at the time of the call.
        extent: usize,
    },

    /// A shape precondition does not hold.
    #[error("invalid matrix dimensions for {operation}: {}x{} and {}x{}", left.0, left.1, right.0, right.1)]
    InvalidDimensions {
        /// The operation that was attempted.
        operation: &'static str,
        /// Logical shape of the left operand.
        left: (usize, usize),
        /// Logical shape of the right operand.
        right: (usize, usize),
    },

    /// A requested extent is negative.
    #[error("bad dimension {rows}x{columns}")]
    BadDimension {
        /// Requested rows.
        rows: i64,
        /// Requested columns.
        columns: i64,
    },

    /// A value cannot be converted to the requested kind.
    #[error("invalid runtime conversion from {from} to {to}")]
    InvalidRuntimeConversion {
        /// Kind of the supplied value.
        from: ValueType,
        /// Kind that was requested.
        to: ValueType,
    },

    /// A numeric argument is outside its domain.
    #[error(transparent)]
    InvalidNumericValue(#[from] EngineError),

    /// An argument is of a kind that cannot be used here.
    #[error("invalid parameter value: {0}")]
    InvalidParameterValue(String),

    /// Underlying I/O failure while saving or loading.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A matrix file is malformed.
    #[error("malformed matrix file: {0}")]
    Format(String),
}

impl MatrixError {
    pub(crate) fn dimensions(
        operation: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    ) -> Self {
        Self::InvalidDimensions {
            operation,
            left,
            right,
        }
    }

    pub(crate) fn parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameterValue(message.into())
    }
}
