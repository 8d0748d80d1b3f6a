//! The per-thread engine.

use crate::algorithm::{Algorithm, Seed};
use crate::config::EngineOptions;
use crate::mt19937::Mt19937;
use crate::sfmt::Sfmt216091;
use crate::xoshiro::{Xoshiro256Plus, Xoshiro256StarStar};
use rand::rngs::OsRng;
use rand_core::{impls, RngCore};
use std::fmt;
use tracing::debug;

/// 2^-53, the spacing of doubles in `[0.5, 1)` scaled to `[0, 1)`.
const INV_2_POW_53: f64 = 1.0 / 9_007_199_254_740_992.0;

/// Opaque identifier of the logical thread owning an engine.
pub type ThreadIdentifier = u64;

/// Opaque caller token attached to an engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OperationHandle(pub u64);

enum Generator {
    Mt19937(Mt19937),
    Mt216091(Box<Sfmt216091>),
    Xoshiro256Plus(Xoshiro256Plus),
    Xoshiro256StarStar(Xoshiro256StarStar),
    Trng(OsRng),
}

impl Generator {
    fn seeded(algorithm: Algorithm, seed: &Seed) -> Self {
        match algorithm {
            Algorithm::Mt19937 => Self::Mt19937(Mt19937::from_key(&seed.as_u32_key())),
            Algorithm::Mt216091 => {
                Self::Mt216091(Box::new(Sfmt216091::from_key(&seed.as_u32_key())))
            }
            Algorithm::Xoshiro256Plus => Self::Xoshiro256Plus(Xoshiro256Plus::from_words(seed.0)),
            Algorithm::Xoshiro256StarStar => {
                Self::Xoshiro256StarStar(Xoshiro256StarStar::from_words(seed.0))
            }
            Algorithm::Trng => Self::Trng(OsRng),
        }
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        match self {
            Self::Mt19937(g) => g.next_u64(),
            Self::Mt216091(g) => g.next_u64(),
            Self::Xoshiro256Plus(g) => g.next_u64(),
            Self::Xoshiro256StarStar(g) => g.next_u64(),
            Self::Trng(g) => g.next_u64(),
        }
    }

    #[inline]
    fn next_u32(&mut self) -> u32 {
        match self {
            Self::Mt19937(g) => g.next_u32(),
            Self::Mt216091(g) => g.next_u32(),
            Self::Trng(g) => g.next_u32(),
            // The upper bits of the xoshiro family are the strongest.
            Self::Xoshiro256Plus(g) => (g.next_u64() >> 32) as u32,
            Self::Xoshiro256StarStar(g) => (g.next_u64() >> 32) as u32,
        }
    }
}

/// A seeded pseudorandom engine.
///
/// An engine is a single-producer resource: it is `Send` so it can be
/// moved to the thread that owns it, but it is never shared.
pub struct Engine {
    algorithm: Algorithm,
    seed: Seed,
    generator: Generator,
    /// Second deviate of the last polar-method pair, flushed on reseed.
    pub(crate) spare_normal: Option<f64>,
    thread_identifier: ThreadIdentifier,
    operation_handle: Option<OperationHandle>,
}

impl Engine {
    /// Create an engine running `algorithm` from `seed`.
    #[must_use]
    pub fn new(algorithm: Algorithm, seed: Seed) -> Self {
        debug!(%algorithm, %seed, "creating random engine");
        Self {
            algorithm,
            seed,
            generator: Generator::seeded(algorithm, &seed),
            spare_normal: None,
            thread_identifier: 0,
            operation_handle: None,
        }
    }

    /// Create an engine from options.
    #[must_use]
    pub fn from_options(options: &EngineOptions) -> Self {
        Self::new(options.algorithm, options.seed)
    }

    /// The algorithm currently in use.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The seed the current sequence started from.
    #[must_use]
    pub fn seed(&self) -> Seed {
        self.seed
    }

    /// Restart the current algorithm from `seed`.
    ///
    /// Any cached draws are discarded, so the following sequence matches a
    /// freshly constructed engine with the same algorithm and seed.
    pub fn reseed(&mut self, seed: Seed) {
        self.reseed_with(self.algorithm, seed);
    }

    /// Switch algorithm and restart from `seed`.
    pub fn reseed_with(&mut self, algorithm: Algorithm, seed: Seed) {
        debug!(%algorithm, %seed, thread = self.thread_identifier, "reseeding random engine");
        self.algorithm = algorithm;
        self.seed = seed;
        self.generator = Generator::seeded(algorithm, &seed);
        self.spare_normal = None;
    }

    /// Identifier of the owning thread.
    #[must_use]
    pub fn thread_identifier(&self) -> ThreadIdentifier {
        self.thread_identifier
    }

    /// Attach an owning-thread identifier.
    pub fn set_thread_identifier(&mut self, identifier: ThreadIdentifier) {
        self.thread_identifier = identifier;
    }

    /// The caller's operation handle, if any.
    #[must_use]
    pub fn operation_handle(&self) -> Option<OperationHandle> {
        self.operation_handle
    }

    /// Attach (or clear) an operation handle.
    pub fn set_operation_handle(&mut self, handle: Option<OperationHandle>) {
        self.operation_handle = handle;
    }

    // ------------------------------------------------------------------
    // Raw and uniform draws
    // ------------------------------------------------------------------

    /// Raw 64-bit draw, uniform over the full width.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.generator.next_u64()
    }

    /// Raw 32-bit draw.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.generator.next_u32()
    }

    /// Uniform value on the closed interval `[0, 1]`.
    ///
    /// Exactly 0 and exactly 1 each occur with probability 2^-64.
    pub fn uniform_inclusive(&mut self) -> f64 {
        match self.next_u64() {
            0 => 0.0,
            u64::MAX => 1.0,
            raw => centered_unit(raw),
        }
    }

    /// Uniform value on the open interval `(0, 1)`. Never 0 or 1.
    pub fn uniform_exclusive(&mut self) -> f64 {
        centered_unit(self.next_u64())
    }

    /// Uniform boolean.
    pub fn next_bool(&mut self) -> bool {
        self.next_u64() >> 63 == 1
    }
}

/// Midpoint of the 53-bit bucket holding `raw`, strictly inside (0, 1).
#[inline]
fn centered_unit(raw: u64) -> f64 {
    ((raw >> 11) as f64 + 0.5) * INV_2_POW_53
}

impl RngCore for Engine {
    fn next_u32(&mut self) -> u32 {
        Engine::next_u32(self)
    }

    fn next_u64(&mut self) -> u64 {
        Engine::next_u64(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::from_options(&EngineOptions::default())
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("algorithm", &self.algorithm)
            .field("seed", &self.seed)
            .field("thread_identifier", &self.thread_identifier)
            .field("operation_handle", &self.operation_handle)
            .finish_non_exhaustive()
    }
}
