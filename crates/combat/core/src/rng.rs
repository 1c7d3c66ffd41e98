//! Seeded random source for outcome rolls.
//!
//! A simulator owns exactly one source. Every stochastic decision draws from
//! it in a fixed order, so a fixed seed reproduces a run bit-for-bit.

/// Deterministic stream of random values.
pub trait RandomSource: Send {
    /// Next raw 32-bit value from the stream.
    fn next_u32(&mut self) -> u32;

    /// Roll on a per-mille scale (0-999 inclusive).
    fn roll_permille(&mut self) -> u32 {
        self.next_u32() % 1_000
    }

    /// Uniform value in range [min, max] inclusive.
    fn range(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let range = max - min + 1;
        min + (self.next_u32() % range)
    }

    /// Uniform value in [0, 1).
    fn unit_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / (f64::from(u32::MAX) + 1.0)
    }
}

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
///
/// - **Deterministic**: same seed always produces the same stream
/// - **Small state**: 64 bits, cheap to clone for what-if probes
///
/// Reference: <https://www.pcg-random.org/>
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PcgRng {
    state: u64,
    draws: u64,
}

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        // Warm-up step so nearby seeds diverge immediately.
        let state = Self::pcg_step(seed.wrapping_add(Self::INCREMENT));
        Self { state, draws: 0 }
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RandomSource for PcgRng {
    fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.state = Self::pcg_step(old);
        self.draws += 1;
        Self::pcg_output(old)
    }
}

/// Derive the seed of one encounter iteration from a batch seed.
///
/// Independent runs must not share streams; mixing the iteration index through
/// a SplitMix-style avalanche gives each run an unrelated seed.
pub fn compute_seed(base_seed: u64, iteration: u64) -> u64 {
    let mut hash = base_seed;
    hash ^= iteration.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xc4ceb9fe1a85ec53);
    hash ^= hash >> 33;
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = PcgRng::new(42);
        let mut b = PcgRng::new(42);
        for _ in 0..64 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
        assert_eq!(a.draws(), 64);
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = PcgRng::new(1);
        let mut b = PcgRng::new(2);
        let same = (0..16).filter(|_| a.next_u32() == b.next_u32()).count();
        assert!(same < 16);
    }

    #[test]
    fn permille_and_range_stay_in_bounds() {
        let mut rng = PcgRng::new(7);
        for _ in 0..1_000 {
            assert!(rng.roll_permille() < 1_000);
            let value = rng.range(950, 1_050);
            assert!((950..=1_050).contains(&value));
            let unit = rng.unit_f64();
            assert!((0.0..1.0).contains(&unit));
        }
        assert_eq!(rng.range(5, 5), 5);
    }

    #[test]
    fn iteration_seeds_are_distinct() {
        let seeds: std::collections::BTreeSet<u64> =
            (0..100).map(|i| compute_seed(1234, i)).collect();
        assert_eq!(seeds.len(), 100);
        assert_eq!(compute_seed(1234, 3), compute_seed(1234, 3));
    }
}
