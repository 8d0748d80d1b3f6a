//! Random matrix generator tests
//!
//! - Determinism of matrix draws under a fixed seed
//! - Thread-engine forms
//! - Parameter rejection

use numrt_matrix::random::{self, thread};
use numrt_matrix::MatrixError;
use numrt_rts_random::{seed_thread_engine, Algorithm, Engine, Seed};

fn engine() -> Engine {
    Engine::new(Algorithm::Xoshiro256StarStar, Seed::new([1, 2, 3, 4]))
}

// ============================================================
// Determinism
// ============================================================

mod determinism_tests {
    use super::*;

    #[test]
    fn test_same_seed_same_matrices() {
        let (mut a, mut b) = (engine(), engine());
        assert_eq!(
            random::normal(&mut a, 4, 3, 0.0, 1.0).unwrap(),
            random::normal(&mut b, 4, 3, 0.0, 1.0).unwrap()
        );
        assert_eq!(
            random::poisson(&mut a, 2, 2, 3.5).unwrap(),
            random::poisson(&mut b, 2, 2, 3.5).unwrap()
        );
        assert_eq!(
            random::uniform_complex(&mut a, 3, 1),
            random::uniform_complex(&mut b, 3, 1)
        );
        assert_eq!(random::random_boolean(&mut a, 5, 5), random::random_boolean(&mut b, 5, 5));
        assert_eq!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn test_every_algorithm_is_deterministic() {
        for algorithm in Algorithm::ALL.into_iter().filter(|a| a.is_reproducible()) {
            let seed = Seed::new([9, 8, 7, 6]);
            let mut a = Engine::new(algorithm, seed);
            let mut b = Engine::new(algorithm, seed);
            assert_eq!(
                random::random_integer64(&mut a, 8, 8),
                random::random_integer64(&mut b, 8, 8),
                "{algorithm}"
            );
        }
    }

    #[test]
    fn test_thread_engine_reseed_repeats() {
        seed_thread_engine(Algorithm::Mt19937, Seed::new([5, 6, 7, 8]));
        let first = thread::uniform_inclusive(3, 3);
        seed_thread_engine(Algorithm::Mt19937, Seed::new([5, 6, 7, 8]));
        let second = thread::uniform_inclusive(3, 3);
        assert_eq!(first, second);

        let mut explicit = Engine::new(Algorithm::Mt19937, Seed::new([5, 6, 7, 8]));
        assert_eq!(random::uniform_inclusive(&mut explicit, 3, 3), first);
    }
}

// ============================================================
// Ranges and validation
// ============================================================

mod range_tests {
    use super::*;

    #[test]
    fn test_value_ranges() {
        let mut e = engine();
        let u = random::uniform_exclusive(&mut e, 10, 10);
        assert!(u.to_column_major().iter().all(|&x| x > 0.0 && x < 1.0));

        let g = random::geometric(&mut e, 10, 10, 0.3).unwrap();
        assert!(g.to_column_major().iter().all(|&k| k >= 0));

        let b = random::binomial(&mut e, 10, 10, 12, 0.4).unwrap();
        assert!(b.to_column_major().iter().all(|&k| (0..=12).contains(&k)));

        let x = random::chi_squared(&mut e, 5, 5, 3.0).unwrap();
        assert!(x.to_column_major().iter().all(|&v| v >= 0.0));

        let r = random::rayleigh(&mut e, 5, 5, 2.0).unwrap();
        assert!(r.to_column_major().iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn test_sample_mean_is_close() {
        let mut e = engine();
        let m = random::exponential(&mut e, 100, 100, 2.0).unwrap();
        let mean = m.to_column_major().iter().sum::<f64>() / 10_000.0;
        assert!((mean - 0.5).abs() < 0.03, "mean {mean}");
    }

    #[test]
    fn test_invalid_parameters() {
        let mut e = engine();
        let fresh = engine().next_u64();
        for result in [
            random::poisson(&mut e, 2, 2, -0.5).map(|_| ()),
            random::binomial(&mut e, 2, 2, 5, -0.1).map(|_| ()),
            random::binomial(&mut e, 2, 2, -3, 0.5).map(|_| ()),
            random::geometric(&mut e, 2, 2, 1.1).map(|_| ()),
            random::normal(&mut e, 2, 2, 0.0, -1.0).map(|_| ()),
            random::gamma(&mut e, 2, 2, 0.0, 1.0).map(|_| ()),
        ] {
            assert!(matches!(result, Err(MatrixError::InvalidNumericValue(_))));
        }
        assert_eq!(e.next_u64(), fresh);
    }

    #[test]
    fn test_thread_forms_validate() {
        assert!(thread::poisson(2, 2, -1.0).is_err());
        assert_eq!(thread::random_integer32(2, 3).shape(), (2, 3));
    }
}
