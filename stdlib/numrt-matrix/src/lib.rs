//! numrt matrix core.
//!
//! Copy-on-write matrices over four scalar kinds with deferred transposes,
//! conjugation and scalar multipliers, dense or sparse backing, 1-based
//! multi-modal indexing, and arithmetic across kinds.
//!
//! # Kinds
//!
//! | Alias | Scalar | Join with `f64` |
//! |-------|--------|-----------------|
//! | [`BooleanMatrix`] | `bool` | `f64` |
//! | [`IntegerMatrix`] | `i64` | `f64` |
//! | [`RealMatrix`] | `f64` | `f64` |
//! | [`ComplexMatrix`] | [`Complex64`] | [`Complex64`] |
//!
//! Binary operators widen both operands to the [`Join`] of their kinds.
//! Boolean with boolean joins to integer, so products count paths.
//!
//! # Laziness
//!
//! [`Matrix::transpose`], [`Matrix::conjugate`], [`Matrix::adjoint`] and
//! scalar multiplication share the operand's block and record the
//! operation. Reads materialize the deferred state; sums and products apply
//! it while computing.
//!
//! # Example
//!
//! ```
//! use numrt_matrix::{RealMatrix, MatrixResult};
//!
//! fn main() -> MatrixResult<()> {
//!     let a = RealMatrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]])?;
//!     let b = 2.0_f64 * &a.transpose();
//!     assert!(b.shares_storage_with(&a));
//!     assert_eq!(b.value(1, 2)?, 6.0);
//!
//!     let product = (&a * &b)?;
//!     assert_eq!(product.value(1, 1)?, 10.0);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

mod error;
mod index;
pub mod io;
mod matrix;
pub mod random;
mod scalar;
mod storage;
mod variant;

pub use error::{MatrixError, MatrixResult};
pub use index::{IndexArg, Selection, Selector};
pub use matrix::{BooleanMatrix, ComplexMatrix, IntegerMatrix, Matrix, RealMatrix};
pub use num_complex::Complex64;
pub use scalar::{
    integer_pow, to_integer, Boolean, Complex, Field, Integer, Join, Real, Scalar, ScalarKind,
    Signed, Value, WidenFrom,
};
pub use storage::MatrixType;
pub use variant::{Range, Set, Tuple, ValueType, Variant};
