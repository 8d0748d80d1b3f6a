//! Algorithm tags and seeds.

use crate::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Generator algorithm used by an [`Engine`](crate::Engine).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// 32-bit Mersenne Twister, period 2^19937 - 1.
    #[serde(rename = "MT19937")]
    Mt19937,
    /// SIMD-oriented Mersenne Twister, period 2^216091 - 1.
    #[serde(rename = "MT216091")]
    Mt216091,
    /// xoshiro256+, fastest; low bits are weaker.
    #[serde(rename = "XORSHIRO256_PLUS")]
    Xoshiro256Plus,
    /// xoshiro256**, all bits of good quality.
    #[default]
    #[serde(rename = "XORSHIRO256_STARS")]
    Xoshiro256StarStar,
    /// Operating system entropy. Not reproducible.
    #[serde(rename = "TRNG")]
    Trng,
}

impl Algorithm {
    /// Every algorithm, in tag order.
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Mt19937,
        Algorithm::Mt216091,
        Algorithm::Xoshiro256Plus,
        Algorithm::Xoshiro256StarStar,
        Algorithm::Trng,
    ];

    /// External tag of the algorithm.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Mt19937 => "MT19937",
            Self::Mt216091 => "MT216091",
            Self::Xoshiro256Plus => "XORSHIRO256_PLUS",
            Self::Xoshiro256StarStar => "XORSHIRO256_STARS",
            Self::Trng => "TRNG",
        }
    }

    /// Whether two engines with the same seed produce the same sequence.
    #[must_use]
    pub const fn is_reproducible(self) -> bool {
        !matches!(self, Self::Trng)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Algorithm {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        match normalized.as_str() {
            "MT19937" => Ok(Self::Mt19937),
            "MT216091" => Ok(Self::Mt216091),
            "XORSHIRO256_PLUS" | "XOSHIRO256_PLUS" | "XOSHIRO256+" => Ok(Self::Xoshiro256Plus),
            "XORSHIRO256_STARS" | "XOSHIRO256_STARS" | "XOSHIRO256**" => {
                Ok(Self::Xoshiro256StarStar)
            }
            "TRNG" => Ok(Self::Trng),
            _ => Err(EngineError::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Four 64-bit words seeding an engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seed(pub [u64; 4]);

impl Seed {
    /// Wrap four seed words.
    #[must_use]
    pub const fn new(words: [u64; 4]) -> Self {
        Self(words)
    }

    /// The seed words.
    #[must_use]
    pub const fn words(&self) -> [u64; 4] {
        self.0
    }

    /// The seed split into eight 32-bit keys, low half first.
    #[must_use]
    pub fn as_u32_key(&self) -> [u32; 8] {
        let mut key = [0u32; 8];
        for (i, word) in self.0.iter().enumerate() {
            key[2 * i] = *word as u32;
            key[2 * i + 1] = (*word >> 32) as u32;
        }
        key
    }

    /// Whether every word is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&w| w == 0)
    }
}

impl Default for Seed {
    fn default() -> Self {
        Self([
            0x853c_49e6_748f_ea9b,
            0xda3e_39cb_94b9_5bdb,
            0x9e37_79b9_7f4a_7c15,
            0xbf58_476d_1ce4_e5b9,
        ])
    }
}

impl From<[u64; 4]> for Seed {
    fn from(words: [u64; 4]) -> Self {
        Self(words)
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{a},{b},{c},{d}")
    }
}

impl FromStr for Seed {
    type Err = EngineError;

    /// Parse four comma-separated words; decimal or `0x`-prefixed hex.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(EngineError::InvalidSeed(format!(
                "expected 4 words, found {}",
                parts.len()
            )));
        }
        let mut words = [0u64; 4];
        for (slot, part) in words.iter_mut().zip(parts) {
            let parsed = match part.strip_prefix("0x").or_else(|| part.strip_prefix("0X")) {
                Some(hex) => u64::from_str_radix(hex, 16),
                None => part.parse::<u64>(),
            };
            *slot = parsed.map_err(|e| EngineError::InvalidSeed(format!("{part}: {e}")))?;
        }
        Ok(Self(words))
    }
}
