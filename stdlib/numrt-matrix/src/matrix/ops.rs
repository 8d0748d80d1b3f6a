//! Arithmetic operators.
//!
//! Operands of different kinds are widened to their join before the
//! storage engine runs. Binary operators snapshot both operands first, so
//! `&a + &a` is fine. Matrix-matrix operators return a [`MatrixResult`]
//! because shapes are only known at runtime; scalar operators cannot fail.

use super::{Lazy, Matrix};
use crate::error::MatrixResult;
use crate::scalar::{Field, Join, Scalar, Signed, WidenFrom};
use crate::storage::Storage;
use num_complex::Complex64;
use std::ops::{Add, Div, Mul, Neg, Sub};

type Joined<S, T> = Matrix<<S as Join<T>>::Output>;

/// Both operands in their common kind.
fn joined<S, T>(a: &Matrix<S>, b: &Matrix<T>) -> (Lazy<S::Output>, Lazy<S::Output>)
where
    S: Join<T>,
    T: Scalar,
{
    (a.snapshot().widen(), b.snapshot().widen())
}

// ============================================================
// Matrix-matrix
// ============================================================

impl<S, T> Add<&Matrix<T>> for &Matrix<S>
where
    S: Join<T>,
    T: Scalar,
{
    type Output = MatrixResult<Joined<S, T>>;

    fn add(self, rhs: &Matrix<T>) -> Self::Output {
        let (a, b) = joined(self, rhs);
        Storage::add(a.operand(), b.operand()).map(Matrix::from_storage)
    }
}

impl<S, T> Sub<&Matrix<T>> for &Matrix<S>
where
    S: Join<T>,
    T: Scalar,
    <S as Join<T>>::Output: Signed,
{
    type Output = MatrixResult<Joined<S, T>>;

    fn sub(self, rhs: &Matrix<T>) -> Self::Output {
        let (a, mut b) = joined(self, rhs);
        b.scale = b.scale.negate();
        Storage::add(a.operand(), b.operand()).map(Matrix::from_storage)
    }
}

impl<S, T> Mul<&Matrix<T>> for &Matrix<S>
where
    S: Join<T>,
    T: Scalar,
{
    type Output = MatrixResult<Joined<S, T>>;

    fn mul(self, rhs: &Matrix<T>) -> Self::Output {
        let (a, b) = joined(self, rhs);
        Storage::multiply(a.operand(), b.operand()).map(Matrix::from_storage)
    }
}

macro_rules! owned_binary {
    ($($trait:ident :: $method:ident $(where $bound:path)?;)*) => {
        $(
            impl<S, T> $trait<Matrix<T>> for Matrix<S>
            where
                S: Join<T>,
                T: Scalar,
                $(<S as Join<T>>::Output: $bound,)?
            {
                type Output = MatrixResult<Joined<S, T>>;

                fn $method(self, rhs: Matrix<T>) -> Self::Output {
                    (&self).$method(&rhs)
                }
            }
        )*
    };
}

owned_binary! {
    Add::add;
    Sub::sub where Signed;
    Mul::mul;
}

impl<S: Scalar> Matrix<S> {
    /// Coefficient-wise product.
    pub fn hadamard<T>(&self, other: &Matrix<T>) -> MatrixResult<Joined<S, T>>
    where
        S: Join<T>,
        T: Scalar,
    {
        let (a, b) = joined(self, other);
        Storage::hadamard(a.operand(), b.operand()).map(Matrix::from_storage)
    }

    /// Kronecker product: block `(i, j)` is `self(i, j) · other`.
    #[must_use]
    pub fn kronecker<T>(&self, other: &Matrix<T>) -> Joined<S, T>
    where
        S: Join<T>,
        T: Scalar,
    {
        let (a, b) = joined(self, other);
        Matrix::from_storage(Storage::kronecker(a.operand(), b.operand()))
    }
}

// ============================================================
// Scalar multiplication
// ============================================================

/// `false` replaces the deferred multiplier with zero; `true` is a clone.
impl<S: Scalar> Mul<bool> for &Matrix<S> {
    type Output = Matrix<S>;

    fn mul(self, rhs: bool) -> Matrix<S> {
        let mut lazy = self.snapshot();
        if !rhs {
            lazy.scale = S::zero();
        }
        Matrix::from_lazy(lazy)
    }
}

impl<S: Scalar> Mul<bool> for Matrix<S> {
    type Output = Matrix<S>;

    fn mul(self, rhs: bool) -> Matrix<S> {
        &self * rhs
    }
}

impl<S: Scalar> Mul<&Matrix<S>> for bool {
    type Output = Matrix<S>;

    fn mul(self, rhs: &Matrix<S>) -> Matrix<S> {
        rhs * self
    }
}

macro_rules! scalar_mul {
    ($($rhs:ty),*) => {
        $(
            impl<S: Join<$rhs>> Mul<$rhs> for &Matrix<S> {
                type Output = Joined<S, $rhs>;

                fn mul(self, rhs: $rhs) -> Self::Output {
                    let mut lazy: Lazy<<S as Join<$rhs>>::Output> = self.snapshot().widen();
                    lazy.scale = lazy.scale.times(WidenFrom::widen_from(rhs));
                    Matrix::from_lazy(lazy)
                }
            }

            impl<S: Join<$rhs>> Mul<$rhs> for Matrix<S> {
                type Output = Joined<S, $rhs>;

                fn mul(self, rhs: $rhs) -> Self::Output {
                    &self * rhs
                }
            }

            impl<S: Join<$rhs>> Mul<&Matrix<S>> for $rhs {
                type Output = Joined<S, $rhs>;

                fn mul(self, rhs: &Matrix<S>) -> Self::Output {
                    rhs * self
                }
            }

            impl<S: Join<$rhs>> Mul<Matrix<S>> for $rhs {
                type Output = Joined<S, $rhs>;

                fn mul(self, rhs: Matrix<S>) -> Self::Output {
                    &rhs * self
                }
            }
        )*
    };
}

scalar_mul!(i64, f64, Complex64);

impl<S: Signed> Neg for &Matrix<S> {
    type Output = Matrix<S>;

    fn neg(self) -> Matrix<S> {
        let mut lazy = self.snapshot();
        lazy.scale = lazy.scale.negate();
        Matrix::from_lazy(lazy)
    }
}

impl<S: Signed> Neg for Matrix<S> {
    type Output = Matrix<S>;

    fn neg(self) -> Matrix<S> {
        -&self
    }
}

// ============================================================
// Scalar division
// ============================================================

fn divide<S: Scalar, O: Field + WidenFrom<S>>(m: &Matrix<S>, denominator: O) -> Matrix<O> {
    let lazy: Lazy<O> = m.snapshot().widen();
    Matrix::from_storage(lazy.block.divide(lazy.transform, lazy.scale, denominator))
}

// Integer and real divisors divide in at least real arithmetic.
macro_rules! scalar_div {
    ($($rhs:ty => $via:ty, |$d:ident| $convert:expr;)*) => {
        $(
            impl<S: Join<$via>> Div<$rhs> for &Matrix<S>
            where
                <S as Join<$via>>::Output: Field,
            {
                type Output = Joined<S, $via>;

                fn div(self, $d: $rhs) -> Self::Output {
                    divide(self, WidenFrom::widen_from($convert))
                }
            }

            impl<S: Join<$via>> Div<$rhs> for Matrix<S>
            where
                <S as Join<$via>>::Output: Field,
            {
                type Output = Joined<S, $via>;

                fn div(self, rhs: $rhs) -> Self::Output {
                    &self / rhs
                }
            }
        )*
    };
}

scalar_div! {
    i64 => f64, |d| d as f64;
    f64 => f64, |d| d;
    Complex64 => Complex64, |d| d;
}
