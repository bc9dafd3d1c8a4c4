//! Exponential backoff with jitter between handshake attempts.
//!
//! ```
//! use core::time::Duration;
//! use sockjs_xhr::backoff::Backoff;
//!
//! let mut backoff = Backoff::new(Duration::from_millis(100), Duration::from_secs(5), 2.0, 0.0);
//! assert_eq!(backoff.next_delay(), Duration::from_millis(100));
//! assert_eq!(backoff.next_delay(), Duration::from_millis(200));
//!
//! backoff.reset();
//! assert_eq!(backoff.next_delay(), Duration::from_millis(100));
//! ```

use core::time::Duration;

use rand::Rng;

/// Retry delays that grow by `factor` up to `max`, randomised by ±`jitter`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    factor: f64,
    jitter: f64,
    attempt: u32,
}

impl Backoff {
    /// Create a new backoff.
    ///
    /// * `base` - first delay
    /// * `max` - cap on the un-jittered delay
    /// * `factor` - growth per attempt (typically 2.0); values below 1.0 act as 1.0
    /// * `jitter` - randomisation in `0.0..=1.0`, applied as ±jitter
    #[must_use]
    pub const fn new(base: Duration, max: Duration, factor: f64, jitter: f64) -> Self {
        Self {
            base,
            max,
            factor,
            jitter,
            attempt: 0,
        }
    }

    /// Delay before the next attempt. Advances the attempt counter.
    #[must_use]
    pub fn next_delay(&mut self) -> Duration {
        let exponent = i32::try_from(self.attempt).unwrap_or(i32::MAX);
        self.attempt = self.attempt.saturating_add(1);

        // Capped in f64 first; `Duration` conversion panics on overflow.
        let factor = self.factor.max(1.0);
        let max = self.max.as_secs_f64();
        let secs = (self.base.as_secs_f64() * factor.powi(exponent)).min(max);

        let jitter = self.jitter.clamp(0.0, 1.0);
        let secs = if jitter > 0.0 {
            secs * rand::thread_rng().gen_range(1.0 - jitter..=1.0 + jitter)
        } else {
            secs
        };

        Duration::try_from_secs_f64(secs).unwrap_or(self.max)
    }

    /// Start over from `base`.
    pub const fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Attempts made since the last reset.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }
}

impl Default for Backoff {
    /// 250ms doubling up to 10s, ±10%.
    fn default() -> Self {
        Self::new(
            Duration::from_millis(250),
            Duration::from_secs(10),
            2.0,
            0.1,
        )
    }
}
