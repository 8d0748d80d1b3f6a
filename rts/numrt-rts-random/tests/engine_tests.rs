//! Engine integration tests
//!
//! - Reproducibility of seeded sequences
//! - Uniformity of the unit-interval draws
//! - Parameter validation for the discrete samplers

use numrt_rts_random::{Algorithm, Engine, EngineError, Seed};
use proptest::prelude::*;

fn reproducible() -> impl Iterator<Item = Algorithm> {
    Algorithm::ALL.into_iter().filter(|a| a.is_reproducible())
}

// ============================================================
// Reproducibility
// ============================================================

mod reproducibility_tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let seed = Seed::new([1, 2, 3, 4]);
        let mut a = Engine::new(Algorithm::Xoshiro256StarStar, seed);
        let mut b = Engine::new(Algorithm::Xoshiro256StarStar, seed);
        let xs: Vec<u64> = (0..1024).map(|_| a.next_u64()).collect();
        let ys: Vec<u64> = (0..1024).map(|_| b.next_u64()).collect();
        assert_eq!(xs, ys);

        a.reseed(seed);
        let again: Vec<u64> = (0..1024).map(|_| a.next_u64()).collect();
        assert_eq!(xs, again);
    }

    #[test]
    fn test_every_reproducible_algorithm() {
        for algorithm in reproducible() {
            let seed = Seed::new([0xfeed, 0xbeef, 0xcafe, 0xf00d]);
            let mut a = Engine::new(algorithm, seed);
            let mut b = Engine::new(algorithm, seed);
            for _ in 0..2000 {
                assert_eq!(a.next_u32(), b.next_u32(), "{algorithm}");
            }
        }
    }

    #[test]
    fn test_algorithms_differ() {
        let seed = Seed::new([1, 2, 3, 4]);
        let heads: Vec<u64> = reproducible()
            .map(|algorithm| Engine::new(algorithm, seed).next_u64())
            .collect();
        for (i, x) in heads.iter().enumerate() {
            for y in &heads[i + 1..] {
                assert_ne!(x, y);
            }
        }
    }

    #[test]
    fn test_sampler_sequences_reproducible() {
        let seed = Seed::new([5, 6, 7, 8]);
        let mut a = Engine::new(Algorithm::Mt216091, seed);
        let mut b = Engine::new(Algorithm::Mt216091, seed);
        for _ in 0..200 {
            assert_eq!(a.normal(0.0, 1.0).unwrap(), b.normal(0.0, 1.0).unwrap());
            assert_eq!(a.poisson(2.0).unwrap(), b.poisson(2.0).unwrap());
            assert_eq!(a.gamma(2.0, 3.0).unwrap(), b.gamma(2.0, 3.0).unwrap());
        }
    }
}

// ============================================================
// Uniformity
// ============================================================

mod uniformity_tests {
    use super::*;

    const BUCKETS: usize = 10;
    const SAMPLES: usize = 100_000;
    // Chi-squared, 9 degrees of freedom, p ~ 1e-5.
    const CRITICAL: f64 = 40.0;

    fn chi_squared(mut draw: impl FnMut() -> f64) -> f64 {
        let mut counts = [0usize; BUCKETS];
        for _ in 0..SAMPLES {
            let x = draw();
            let bucket = ((x * BUCKETS as f64) as usize).min(BUCKETS - 1);
            counts[bucket] += 1;
        }
        let expected = SAMPLES as f64 / BUCKETS as f64;
        counts
            .iter()
            .map(|&c| (c as f64 - expected).powi(2) / expected)
            .sum()
    }

    #[test]
    fn test_uniform_exclusive_histogram() {
        for algorithm in reproducible() {
            let mut engine = Engine::new(algorithm, Seed::new([42, 43, 44, 45]));
            let stat = chi_squared(|| engine.uniform_exclusive());
            assert!(stat < CRITICAL, "{algorithm}: chi-squared {stat}");
        }
    }

    #[test]
    fn test_uniform_inclusive_histogram() {
        let mut engine = Engine::new(Algorithm::Mt19937, Seed::default());
        let stat = chi_squared(|| engine.uniform_inclusive());
        assert!(stat < CRITICAL, "chi-squared {stat}");
    }

    #[test]
    fn test_bool_balance() {
        let mut engine = Engine::new(Algorithm::Xoshiro256Plus, Seed::default());
        let trues = (0..SAMPLES).filter(|_| engine.next_bool()).count();
        let fraction = trues as f64 / SAMPLES as f64;
        assert!((fraction - 0.5).abs() < 0.01, "fraction {fraction}");
    }
}

// ============================================================
// Parameter validation
// ============================================================

mod validation_tests {
    use super::*;

    fn engine() -> Engine {
        Engine::new(Algorithm::Xoshiro256StarStar, Seed::default())
    }

    #[test]
    fn test_poisson_negative_rate() {
        assert_eq!(
            engine().poisson(-0.5),
            Err(EngineError::InvalidNumericValue {
                parameter: "rate",
                value: -0.5
            })
        );
    }

    #[test]
    fn test_binomial_bounds() {
        let mut e = engine();
        assert!(e.binomial(10, -0.01).is_err());
        assert!(e.binomial(10, 1.01).is_err());
        assert!(e.binomial(0, 0.5).is_err());
        assert!(e.binomial(-1, 0.5).is_err());
        assert!(e.binomial(1, 0.5).is_ok());
    }

    #[test]
    fn test_geometric_bounds() {
        let mut e = engine();
        assert!(e.geometric(-0.01).is_err());
        assert!(e.geometric(1.01).is_err());
        assert!(e.geometric(0.25).is_ok());
    }
}

// ============================================================
// Properties
// ============================================================

proptest! {
    #[test]
    fn uniform_draws_stay_in_range(words in any::<[u64; 4]>()) {
        for algorithm in reproducible() {
            let mut engine = Engine::new(algorithm, Seed::new(words));
            for _ in 0..16 {
                let open = engine.uniform_exclusive();
                prop_assert!(open > 0.0 && open < 1.0);
                let closed = engine.uniform_inclusive();
                prop_assert!((0.0..=1.0).contains(&closed));
            }
        }
    }

    #[test]
    fn reseed_matches_fresh_engine(words in any::<[u64; 4]>(), skip in 0usize..64) {
        let seed = Seed::new(words);
        let mut used = Engine::new(Algorithm::Xoshiro256Plus, Seed::default());
        for _ in 0..skip {
            used.next_u64();
        }
        used.reseed(seed);
        let mut fresh = Engine::new(Algorithm::Xoshiro256Plus, seed);
        prop_assert_eq!(used.next_u64(), fresh.next_u64());
    }

    #[test]
    fn binomial_never_exceeds_trials(trials in 1i64..200, p in 0.0f64..=1.0) {
        let mut engine = Engine::new(Algorithm::Xoshiro256StarStar, Seed::default());
        let k = engine.binomial(trials, p).unwrap();
        prop_assert!((0..=trials).contains(&k));
    }
}
