//! Engine configuration.

use crate::algorithm::{Algorithm, Seed};
use crate::EngineResult;
use serde::{Deserialize, Serialize};

/// Environment variable selecting the default algorithm by tag.
pub const ALGORITHM_ENV: &str = "NUMRT_RNG_ALGORITHM";

/// Environment variable holding the default seed as four comma-separated words.
pub const SEED_ENV: &str = "NUMRT_RNG_SEED";

/// Options used to construct an [`Engine`](crate::Engine).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Generator algorithm.
    #[serde(default)]
    pub algorithm: Algorithm,
    /// Initial seed.
    #[serde(default)]
    pub seed: Seed,
}

impl EngineOptions {
    /// Replace the algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Replace the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: Seed) -> Self {
        self.seed = seed;
        self
    }

    /// Defaults overridden by [`ALGORITHM_ENV`] and [`SEED_ENV`] when set.
    pub fn from_env() -> EngineResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> EngineResult<Self> {
        let mut options = Self::default();
        if let Some(tag) = lookup(ALGORITHM_ENV).filter(|v| !v.trim().is_empty()) {
            options.algorithm = tag.parse()?;
        }
        if let Some(seed) = lookup(SEED_ENV).filter(|v| !v.trim().is_empty()) {
            options.seed = seed.parse()?;
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineError;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_unset_environment_gives_defaults() {
        let options = EngineOptions::from_lookup(lookup(&[])).unwrap();
        assert_eq!(options, EngineOptions::default());
        assert_eq!(options.algorithm, Algorithm::Xoshiro256StarStar);
    }

    #[test]
    fn test_environment_overrides() {
        let options = EngineOptions::from_lookup(lookup(&[
            (ALGORITHM_ENV, "mt19937"),
            (SEED_ENV, "1,2,3,4"),
        ]))
        .unwrap();
        assert_eq!(options.algorithm, Algorithm::Mt19937);
        assert_eq!(options.seed, Seed::new([1, 2, 3, 4]));
    }

    #[test]
    fn test_bad_environment_is_reported() {
        let err = EngineOptions::from_lookup(lookup(&[(ALGORITHM_ENV, "lcg")])).unwrap_err();
        assert!(matches!(err, EngineError::UnknownAlgorithm(_)));
        let err = EngineOptions::from_lookup(lookup(&[(SEED_ENV, "1,2")])).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSeed(_)));
    }

    #[test]
    fn test_serde_uses_tags() {
        let options = EngineOptions::default()
            .with_algorithm(Algorithm::Mt216091)
            .with_seed(Seed::new([1, 2, 3, 4]));
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(json, r#"{"algorithm":"MT216091","seed":[1,2,3,4]}"#);
        let back: EngineOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);
        let partial: EngineOptions = serde_json::from_str(r#"{"algorithm":"TRNG"}"#).unwrap();
        assert_eq!(partial.seed, Seed::default());
    }
}
