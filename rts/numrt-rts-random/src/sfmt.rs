//! SIMD-oriented Fast Mersenne Twister with Mersenne exponent 216091.
//!
//! The state is 1689 128-bit lanes. The recursion is evaluated lane-wise on
//! four 32-bit words, with the two whole-lane byte shifts done on `u128`.

const MEXP: usize = 216_091;
const N: usize = MEXP / 128 + 1;
const N32: usize = N * 4;
const POS1: usize = 627;
const SL1: u32 = 11;
const SL2: u32 = 3;
const SR1: u32 = 10;
const SR2: u32 = 1;
const MSK: [u32; 4] = [0xbff7_bff7, 0xbfff_ffff, 0xbfff_fa7f, 0xffdd_fbfb];
const PARITY: [u32; 4] = [0xf800_0001, 0x89e8_0709, 0x3bd2_b64b, 0x0c64_b1e4];

type Lane = [u32; 4];

#[inline]
fn to_u128(lane: &Lane) -> u128 {
    u128::from(lane[0])
        | (u128::from(lane[1]) << 32)
        | (u128::from(lane[2]) << 64)
        | (u128::from(lane[3]) << 96)
}

#[inline]
fn from_u128(value: u128) -> Lane {
    [
        value as u32,
        (value >> 32) as u32,
        (value >> 64) as u32,
        (value >> 96) as u32,
    ]
}

#[inline]
fn recursion(a: &Lane, b: &Lane, c: &Lane, d: &Lane) -> Lane {
    let x = from_u128(to_u128(a) << (SL2 * 8));
    let y = from_u128(to_u128(c) >> (SR2 * 8));
    let mut r = [0u32; 4];
    for i in 0..4 {
        r[i] = a[i] ^ x[i] ^ ((b[i] >> SR1) & MSK[i]) ^ y[i] ^ (d[i] << SL1);
    }
    r
}

fn func1(x: u32) -> u32 {
    (x ^ (x >> 27)).wrapping_mul(1_664_525)
}

fn func2(x: u32) -> u32 {
    (x ^ (x >> 27)).wrapping_mul(1_566_083_941)
}

/// SFMT-216091 state.
#[derive(Clone)]
pub struct Sfmt216091 {
    state: Vec<Lane>,
    index: usize,
}

impl Sfmt216091 {
    /// Seed from a key array (`init_by_array`).
    #[must_use]
    pub fn from_key(key: &[u32]) -> Self {
        let size = N32;
        let lag = 11;
        let mid = (size - lag) / 2;
        let mut words = vec![0x8b8b_8b8bu32; size];
        let count = (key.len() + 1).max(size);

        let mut r = func1(words[0] ^ words[mid] ^ words[size - 1]);
        words[mid] = words[mid].wrapping_add(r);
        r = r.wrapping_add(key.len() as u32);
        words[mid + lag] = words[mid + lag].wrapping_add(r);
        words[0] = r;

        let mut i = 1usize;
        let mut j = 0usize;
        while j < count - 1 {
            r = func1(words[i] ^ words[(i + mid) % size] ^ words[(i + size - 1) % size]);
            words[(i + mid) % size] = words[(i + mid) % size].wrapping_add(r);
            let extra = key.get(j).copied().unwrap_or(0);
            r = r.wrapping_add(extra).wrapping_add(i as u32);
            words[(i + mid + lag) % size] = words[(i + mid + lag) % size].wrapping_add(r);
            words[i] = r;
            i = (i + 1) % size;
            j += 1;
        }
        for _ in 0..size {
            r = func2(
                words[i]
                    .wrapping_add(words[(i + mid) % size])
                    .wrapping_add(words[(i + size - 1) % size]),
            );
            words[(i + mid) % size] ^= r;
            r = r.wrapping_sub(i as u32);
            words[(i + mid + lag) % size] ^= r;
            words[i] = r;
            i = (i + 1) % size;
        }

        let state = words
            .chunks_exact(4)
            .map(|c| [c[0], c[1], c[2], c[3]])
            .collect();
        let mut sfmt = Self {
            state,
            index: N32,
        };
        sfmt.certify_period();
        sfmt
    }

    fn word(&self, i: usize) -> u32 {
        self.state[i / 4][i % 4]
    }

    fn word_mut(&mut self, i: usize) -> &mut u32 {
        &mut self.state[i / 4][i % 4]
    }

    fn certify_period(&mut self) {
        let mut inner = 0u32;
        for (i, parity) in PARITY.iter().enumerate() {
            inner ^= self.word(i) & parity;
        }
        let mut shift = 16;
        while shift > 0 {
            inner ^= inner >> shift;
            shift >>= 1;
        }
        if inner & 1 == 1 {
            return;
        }
        for (i, parity) in PARITY.iter().enumerate() {
            let mut work = 1u32;
            for _ in 0..32 {
                if work & parity != 0 {
                    *self.word_mut(i) ^= work;
                    return;
                }
                work <<= 1;
            }
        }
    }

    fn generate_all(&mut self) {
        let mut r1 = self.state[N - 2];
        let mut r2 = self.state[N - 1];
        for i in 0..N - POS1 {
            self.state[i] = recursion(&self.state[i], &self.state[i + POS1], &r1, &r2);
            r1 = r2;
            r2 = self.state[i];
        }
        for i in N - POS1..N {
            self.state[i] = recursion(&self.state[i], &self.state[i + POS1 - N], &r1, &r2);
            r1 = r2;
            r2 = self.state[i];
        }
        self.index = 0;
    }

    /// Next 32-bit output.
    pub fn next_u32(&mut self) -> u32 {
        if self.index >= N32 {
            self.generate_all();
        }
        let value = self.word(self.index);
        self.index += 1;
        value
    }

    /// Next 64-bit output: two consecutive 32-bit outputs, low word first.
    pub fn next_u64(&mut self) -> u64 {
        let lo = u64::from(self.next_u32());
        let hi = u64::from(self.next_u32());
        (hi << 32) | lo
    }
}

impl std::fmt::Debug for Sfmt216091 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sfmt216091").field("index", &self.index).finish()
    }
}
