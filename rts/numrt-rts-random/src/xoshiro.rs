//! xoshiro256 family generators.

/// SplitMix64 step, used to expand degenerate seeds.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// The all-zero state is a fixed point, so it is replaced by a SplitMix64
/// expansion of zero.
fn non_degenerate(words: [u64; 4]) -> [u64; 4] {
    if words.iter().any(|&w| w != 0) {
        return words;
    }
    let mut sm = 0u64;
    [
        splitmix64(&mut sm),
        splitmix64(&mut sm),
        splitmix64(&mut sm),
        splitmix64(&mut sm),
    ]
}

#[inline]
fn advance(s: &mut [u64; 4]) {
    let t = s[1] << 17;
    s[2] ^= s[0];
    s[3] ^= s[1];
    s[1] ^= s[2];
    s[0] ^= s[3];
    s[2] ^= t;
    s[3] = s[3].rotate_left(45);
}

/// xoshiro256+ generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Xoshiro256Plus {
    s: [u64; 4],
}

impl Xoshiro256Plus {
    /// Seed directly from four state words.
    #[must_use]
    pub fn from_words(words: [u64; 4]) -> Self {
        Self {
            s: non_degenerate(words),
        }
    }

    /// Next 64-bit output.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let result = self.s[0].wrapping_add(self.s[3]);
        advance(&mut self.s);
        result
    }
}

/// xoshiro256** generator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Xoshiro256StarStar {
    s: [u64; 4],
}

impl Xoshiro256StarStar {
    /// Seed directly from four state words.
    #[must_use]
    pub fn from_words(words: [u64; 4]) -> Self {
        Self {
            s: non_degenerate(words),
        }
    }

    /// Next 64-bit output.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let result = self.s[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        advance(&mut self.s);
        result
    }
}
