//! Random matrix generators.
//!
//! Each generator fills a fresh `rows × columns` dense matrix in
//! column-major order, one engine draw per coefficient (two for complex
//! coefficients). Distribution parameters are checked before the first
//! draw, so a rejected call leaves the engine untouched.
//!
//! The functions in [`thread`] draw from the calling thread's engine.

use crate::error::MatrixResult;
use crate::matrix::{BooleanMatrix, ComplexMatrix, IntegerMatrix, Matrix, RealMatrix};
use crate::scalar::Scalar;
use crate::storage::DenseData;
use num_complex::Complex64;
use numrt_rts_random::{Engine, EngineResult};

fn fill<S: Scalar>(rows: usize, columns: usize, mut draw: impl FnMut() -> S) -> Matrix<S> {
    let data = (0..rows * columns).map(|_| draw()).collect();
    Matrix::from_dense(DenseData::from_column_major(rows, columns, data))
}

fn try_fill<S: Scalar>(
    rows: usize,
    columns: usize,
    mut draw: impl FnMut() -> EngineResult<S>,
) -> MatrixResult<Matrix<S>> {
    let data = (0..rows * columns)
        .map(|_| draw())
        .collect::<EngineResult<Vec<S>>>()?;
    Ok(Matrix::from_dense(DenseData::from_column_major(
        rows, columns, data,
    )))
}

// ============================================================
// Raw draws
// ============================================================

/// 32-bit draws, zero-extended.
pub fn random_integer32(engine: &mut Engine, rows: usize, columns: usize) -> IntegerMatrix {
    fill(rows, columns, || i64::from(engine.next_u32()))
}

/// 64-bit draws, reinterpreted as signed.
pub fn random_integer64(engine: &mut Engine, rows: usize, columns: usize) -> IntegerMatrix {
    fill(rows, columns, || engine.next_u64() as i64)
}

/// Fair coin flips.
pub fn random_boolean(engine: &mut Engine, rows: usize, columns: usize) -> BooleanMatrix {
    fill(rows, columns, || engine.next_bool())
}

/// Uniform on `[0, 1]`.
pub fn uniform_inclusive(engine: &mut Engine, rows: usize, columns: usize) -> RealMatrix {
    fill(rows, columns, || engine.uniform_inclusive())
}

/// Uniform on `(0, 1)`.
pub fn uniform_exclusive(engine: &mut Engine, rows: usize, columns: usize) -> RealMatrix {
    fill(rows, columns, || engine.uniform_exclusive())
}

/// Real and imaginary parts independently uniform on `(0, 1)`.
pub fn uniform_complex(engine: &mut Engine, rows: usize, columns: usize) -> ComplexMatrix {
    fill(rows, columns, || {
        let re = engine.uniform_exclusive();
        Complex64::new(re, engine.uniform_exclusive())
    })
}

// ============================================================
// Real distributions
// ============================================================

/// Normal with the given mean and standard deviation.
pub fn normal(
    engine: &mut Engine,
    rows: usize,
    columns: usize,
    mean: f64,
    sigma: f64,
) -> MatrixResult<RealMatrix> {
    try_fill(rows, columns, || engine.normal(mean, sigma))
}

/// Log-normal: `exp` of a normal with parameters `mu` and `sigma`.
pub fn log_normal(
    engine: &mut Engine,
    rows: usize,
    columns: usize,
    mu: f64,
    sigma: f64,
) -> MatrixResult<RealMatrix> {
    try_fill(rows, columns, || engine.log_normal(mu, sigma))
}

/// Weibull with the given scale and shape.
pub fn weibull(
    engine: &mut Engine,
    rows: usize,
    columns: usize,
    scale: f64,
    shape: f64,
) -> MatrixResult<RealMatrix> {
    try_fill(rows, columns, || engine.weibull(scale, shape))
}

/// Exponential with the given rate.
pub fn exponential(
    engine: &mut Engine,
    rows: usize,
    columns: usize,
    rate: f64,
) -> MatrixResult<RealMatrix> {
    try_fill(rows, columns, || engine.exponential(rate))
}

/// Gamma with the given shape and scale.
pub fn gamma(
    engine: &mut Engine,
    rows: usize,
    columns: usize,
    shape: f64,
    scale: f64,
) -> MatrixResult<RealMatrix> {
    try_fill(rows, columns, || engine.gamma(shape, scale))
}

/// Rayleigh with the given scale.
pub fn rayleigh(
    engine: &mut Engine,
    rows: usize,
    columns: usize,
    sigma: f64,
) -> MatrixResult<RealMatrix> {
    try_fill(rows, columns, || engine.rayleigh(sigma))
}

/// Chi-squared with `degrees_of_freedom`.
pub fn chi_squared(
    engine: &mut Engine,
    rows: usize,
    columns: usize,
    degrees_of_freedom: f64,
) -> MatrixResult<RealMatrix> {
    try_fill(rows, columns, || engine.chi_squared(degrees_of_freedom))
}

/// Cauchy-Lorentz with the given location and scale.
pub fn cauchy_lorentz(
    engine: &mut Engine,
    rows: usize,
    columns: usize,
    location: f64,
    scale: f64,
) -> MatrixResult<RealMatrix> {
    try_fill(rows, columns, || engine.cauchy_lorentz(location, scale))
}

// ============================================================
// Integer distributions
// ============================================================

/// Poisson with mean `rate`.
pub fn poisson(
    engine: &mut Engine,
    rows: usize,
    columns: usize,
    rate: f64,
) -> MatrixResult<IntegerMatrix> {
    try_fill(rows, columns, || engine.poisson(rate))
}

/// Successes in `trials` Bernoulli trials of probability `p`.
pub fn binomial(
    engine: &mut Engine,
    rows: usize,
    columns: usize,
    trials: i64,
    p: f64,
) -> MatrixResult<IntegerMatrix> {
    try_fill(rows, columns, || engine.binomial(trials, p))
}

/// Failures before the first success with probability `p`.
pub fn geometric(
    engine: &mut Engine,
    rows: usize,
    columns: usize,
    p: f64,
) -> MatrixResult<IntegerMatrix> {
    try_fill(rows, columns, || engine.geometric(p))
}

// ============================================================
// Thread-engine forms
// ============================================================

macro_rules! thread_forms {
    ($($name:ident($($arg:ident: $ty:ty),*) -> $ret:ty;)*) => {
        /// Generators drawing from the calling thread's engine.
        pub mod thread {
            use super::*;
            use numrt_rts_random::with_thread_engine;

            $(
                #[doc = concat!("[`super::", stringify!($name), "`] on the thread engine.")]
                pub fn $name(rows: usize, columns: usize $(, $arg: $ty)*) -> $ret {
                    with_thread_engine(|engine| super::$name(engine, rows, columns $(, $arg)*))
                }
            )*
        }
    };
}

thread_forms! {
    random_integer32() -> IntegerMatrix;
    random_integer64() -> IntegerMatrix;
    random_boolean() -> BooleanMatrix;
    uniform_inclusive() -> RealMatrix;
    uniform_exclusive() -> RealMatrix;
    uniform_complex() -> ComplexMatrix;
    normal(mean: f64, sigma: f64) -> MatrixResult<RealMatrix>;
    log_normal(mu: f64, sigma: f64) -> MatrixResult<RealMatrix>;
    weibull(scale: f64, shape: f64) -> MatrixResult<RealMatrix>;
    exponential(rate: f64) -> MatrixResult<RealMatrix>;
    gamma(shape: f64, scale: f64) -> MatrixResult<RealMatrix>;
    rayleigh(sigma: f64) -> MatrixResult<RealMatrix>;
    chi_squared(degrees_of_freedom: f64) -> MatrixResult<RealMatrix>;
    cauchy_lorentz(location: f64, scale: f64) -> MatrixResult<RealMatrix>;
    poisson(rate: f64) -> MatrixResult<IntegerMatrix>;
    binomial(trials: i64, p: f64) -> MatrixResult<IntegerMatrix>;
    geometric(p: f64) -> MatrixResult<IntegerMatrix>;
}
