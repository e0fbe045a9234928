//! Uniform randomness for button placement and confetti.

use web_sys::window;

/// Source of uniform samples in `[0, 1)`.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;

    /// Uniform sample in `[lo, hi)`.
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_unit() * (hi - lo)
    }

    /// Uniform index in `0..len`; 0 for an empty range.
    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_unit() * len as f64) as usize).min(len - 1)
    }
}

/// Deterministic LCG (same constants as Numerical Recipes). Used by tests and
/// as the fallback generator when the `rng` feature is disabled.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    state: u64,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        // top 53 bits -> [0,1)
        (self.state >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Browser randomness. Backed by `crypto.getRandomValues` through `getrandom`
/// when the `rng` feature is on.
pub struct BrowserRandom {
    fallback: SeededRandom,
}

impl BrowserRandom {
    pub fn new() -> Self {
        let now = window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0);
        Self { fallback: SeededRandom::new((now * 1000.0) as u64 ^ 0x9e37_79b9_7f4a_7c15) }
    }
}

impl Default for BrowserRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for BrowserRandom {
    #[cfg(feature = "rng")]
    fn next_unit(&mut self) -> f64 {
        let mut buf = [0u8; 8];
        match getrandom::getrandom(&mut buf) {
            Ok(()) => (u64::from_le_bytes(buf) >> 11) as f64 / (1u64 << 53) as f64,
            Err(_) => self.fallback.next_unit(),
        }
    }

    #[cfg(not(feature = "rng"))]
    fn next_unit(&mut self) -> f64 {
        self.fallback.next_unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_samples_are_unit_interval() {
        let mut r = SeededRandom::new(42);
        for _ in 0..10_000 {
            let v = r.next_unit();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn seeded_is_reproducible() {
        let mut a = SeededRandom::new(7);
        let mut b = SeededRandom::new(7);
        for _ in 0..32 {
            assert_eq!(a.next_unit(), b.next_unit());
        }
    }

    #[test]
    fn index_and_range_respect_bounds() {
        let mut r = SeededRandom::new(3);
        assert_eq!(r.index(0), 0);
        for _ in 0..1000 {
            assert!(r.index(5) < 5);
            let v = r.range(-100.0, 100.0);
            assert!((-100.0..100.0).contains(&v));
        }
    }
}
