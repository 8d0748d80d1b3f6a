//! Per-thread pseudorandom engines for the numrt runtime.
//!
//! An [`Engine`] couples a selectable generator algorithm with a reproducible
//! four-word [`Seed`] and a family of distribution samplers. Engines are
//! single-producer resources: keep one per thread, either explicitly or via
//! [`with_thread_engine`].
//!
//! # Algorithms
//!
//! | Tag | Generator | Reproducible |
//! |-----|-----------|--------------|
//! | `MT19937` | 32-bit Mersenne Twister | yes |
//! | `MT216091` | SIMD-oriented Mersenne Twister, period 2^216091 - 1 | yes |
//! | `XORSHIRO256_PLUS` | xoshiro256+ | yes |
//! | `XORSHIRO256_STARS` | xoshiro256** | yes |
//! | `TRNG` | operating system entropy | no |
//!
//! # Example
//!
//! ```
//! use numrt_rts_random::{Algorithm, Engine, Seed};
//!
//! let mut a = Engine::new(Algorithm::Xoshiro256StarStar, Seed::new([1, 2, 3, 4]));
//! let mut b = Engine::new(Algorithm::Xoshiro256StarStar, Seed::new([1, 2, 3, 4]));
//! assert_eq!(a.next_u64(), b.next_u64());
//!
//! let x = a.uniform_exclusive();
//! assert!(x > 0.0 && x < 1.0);
//! ```

#![warn(missing_docs)]

mod algorithm;
mod config;
mod distributions;
mod engine;
mod mt19937;
mod sfmt;
mod thread_engine;
mod xoshiro;

pub use algorithm::{Algorithm, Seed};
pub use config::{EngineOptions, ALGORITHM_ENV, SEED_ENV};
pub use engine::{Engine, OperationHandle, ThreadIdentifier};
pub use mt19937::Mt19937;
pub use sfmt::Sfmt216091;
pub use thread_engine::{
    install_thread_engine, seed_thread_engine, take_thread_engine, with_thread_engine,
};
pub use xoshiro::{Xoshiro256Plus, Xoshiro256StarStar};

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised by the random engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A distribution parameter is outside its domain.
    #[error("invalid numeric value for {parameter}: {value}")]
    InvalidNumericValue {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// An algorithm tag could not be parsed.
    #[error("unknown random engine algorithm: {0}")]
    UnknownAlgorithm(String),

    /// A seed string could not be parsed.
    #[error("invalid seed: {0}")]
    InvalidSeed(String),
}

impl EngineError {
    pub(crate) fn invalid(parameter: &'static str, value: f64) -> Self {
        Self::InvalidNumericValue { parameter, value }
    }
}
