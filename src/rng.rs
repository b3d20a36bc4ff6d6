//! Seeded sequence generator used for target codes and the rain animation.
//!
//! A plain linear congruential recurrence. Reproducibility from a shareable
//! seed is the only goal; this is not suitable for anything security related.

/// LCG multiplier.
pub const LCG_A: i64 = 9301;
/// LCG increment.
pub const LCG_C: i64 = 49297;
/// LCG modulus.
pub const LCG_M: i64 = 233_280;

/// Deterministic pseudo-random sequence parameterized by an integer seed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceGenerator {
    seed: i64,
}

impl SequenceGenerator {
    /// Any integer is accepted. Reducing it modulo `LCG_M` up front yields the
    /// same sequence as the unreduced recurrence and keeps the state small
    /// enough that `seed * LCG_A` can never overflow.
    pub fn new(seed: i64) -> Self {
        Self { seed: seed.rem_euclid(LCG_M) }
    }

    /// Current internal state (already reduced modulo `LCG_M`).
    pub fn seed(&self) -> i64 {
        self.seed
    }

    /// Next value in `[0, 1)`.
    pub fn draw(&mut self) -> f64 {
        self.seed = (self.seed * LCG_A + LCG_C).rem_euclid(LCG_M);
        self.seed as f64 / LCG_M as f64
    }

    /// Next integer in `[0, max)`. Callers must pass `max >= 1`.
    pub fn draw_int(&mut self, max: usize) -> usize {
        debug_assert!(max >= 1, "draw_int requires max >= 1");
        ((self.draw() * max as f64).floor() as usize).min(max.saturating_sub(1))
    }
}
