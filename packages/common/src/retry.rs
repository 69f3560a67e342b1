use std::time::Duration;

use rand::Rng;

/// Exponential backoff between retries of a failed write.
///
/// The delay before retry `n` (1-based) is `base * 2^(n-1)` plus up to 25%
/// jitter, never exceeding `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub base_ms: u64,
    pub max_ms: u64,
}

impl Backoff {
    pub const fn new(base_ms: u64, max_ms: u64) -> Self {
        Self { base_ms, max_ms }
    }

    /// Upper bound of the delay for `attempt`, before jitter and capping.
    fn nominal_ms(&self, attempt: u8) -> u64 {
        match attempt {
            0 => 0,
            n => self
                .base_ms
                .saturating_mul(2u64.saturating_pow(u32::from(n - 1))),
        }
    }

    pub fn delay(&self, attempt: u8) -> Duration {
        let nominal = self.nominal_ms(attempt);
        if nominal == 0 {
            return Duration::ZERO;
        }
        let jitter = rand::rng().random_range(0..=nominal / 4);
        Duration::from_millis(nominal.saturating_add(jitter).min(self.max_ms))
    }
}
