//! The implicit per-thread engine.
//!
//! Each thread lazily creates its own [`Engine`] the first time it is used.
//! Engines never cross threads through this API, so no locking is involved.

use crate::algorithm::{Algorithm, Seed};
use crate::config::EngineOptions;
use crate::engine::{Engine, ThreadIdentifier};
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

static NEXT_THREAD_IDENTIFIER: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_ENGINE: RefCell<Option<Engine>> = const { RefCell::new(None) };
}

fn next_identifier() -> ThreadIdentifier {
    NEXT_THREAD_IDENTIFIER.fetch_add(1, Ordering::Relaxed)
}

fn default_engine() -> Engine {
    let options = EngineOptions::from_env().unwrap_or_else(|err| {
        warn!(error = %err, "ignoring random engine environment configuration");
        EngineOptions::default()
    });
    let mut engine = Engine::from_options(&options);
    engine.set_thread_identifier(next_identifier());
    engine
}

/// Run `f` with the calling thread's engine, creating it on first use.
///
/// # Panics
///
/// Panics if called re-entrantly from inside `f`.
pub fn with_thread_engine<R>(f: impl FnOnce(&mut Engine) -> R) -> R {
    THREAD_ENGINE.with(|slot| {
        let mut slot = slot.borrow_mut();
        let engine = slot.get_or_insert_with(default_engine);
        f(engine)
    })
}

/// Replace the calling thread's engine, returning the previous one.
///
/// An engine without a thread identifier is given a fresh one.
pub fn install_thread_engine(mut engine: Engine) -> Option<Engine> {
    if engine.thread_identifier() == 0 {
        engine.set_thread_identifier(next_identifier());
    }
    THREAD_ENGINE.with(|slot| slot.borrow_mut().replace(engine))
}

/// Remove the calling thread's engine. The next use creates a fresh one.
pub fn take_thread_engine() -> Option<Engine> {
    THREAD_ENGINE.with(|slot| slot.borrow_mut().take())
}

/// Reseed the calling thread's engine with `algorithm` and `seed`.
pub fn seed_thread_engine(algorithm: Algorithm, seed: Seed) {
    with_thread_engine(|engine| engine.reseed_with(algorithm, seed));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_engine_reseed_is_reproducible() {
        seed_thread_engine(Algorithm::Mt19937, Seed::new([3, 1, 4, 1]));
        let first: Vec<u64> = (0..8).map(|_| with_thread_engine(Engine::next_u64)).collect();
        seed_thread_engine(Algorithm::Mt19937, Seed::new([3, 1, 4, 1]));
        let second: Vec<u64> = (0..8).map(|_| with_thread_engine(Engine::next_u64)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_threads_get_distinct_identifiers() {
        let here = with_thread_engine(|e| e.thread_identifier());
        let there = std::thread::spawn(|| with_thread_engine(|e| e.thread_identifier()))
            .join()
            .unwrap();
        assert_ne!(here, 0);
        assert_ne!(there, 0);
        assert_ne!(here, there);
    }

    #[test]
    fn test_install_and_take() {
        let engine = Engine::new(Algorithm::Xoshiro256Plus, Seed::new([1, 2, 3, 4]));
        install_thread_engine(engine);
        assert_eq!(with_thread_engine(Engine::next_u64), 5);
        let taken = take_thread_engine().unwrap();
        assert_eq!(taken.algorithm(), Algorithm::Xoshiro256Plus);
        assert_ne!(taken.thread_identifier(), 0);
        assert!(take_thread_engine().is_none());
    }
}
