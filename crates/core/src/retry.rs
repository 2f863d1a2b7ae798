//! Retry policy with exponential backoff
//!
//! Describes how often and how patiently a transient failure is retried.
//! The policy is runtime agnostic; callers sleep for
//! [`RetryConfig::delay_for_attempt`] with whatever timer they use.
//!
//! # Example
//!
//! ```
//! use geosearch_core::retry::RetryConfig;
//! use std::time::Duration;
//!
//! let config = RetryConfig {
//!     jitter: false,
//!     ..RetryConfig::default()
//! };
//! assert_eq!(config.delay_for_attempt(0), Duration::ZERO);
//! assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
//! assert_eq!(config.delay_for_attempt(2), Duration::from_millis(400));
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Initial delay between retries
    #[serde(with = "millis")]
    pub initial_delay: Duration,
    /// Maximum delay between retries
    #[serde(with = "millis")]
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Add random jitter to delays
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(2),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a config with no retries
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            jitter: false,
        }
    }

    /// Rejects policies that cannot produce a usable delay sequence.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::invalid_config("index.retry.max_attempts must be at least 1"));
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(Error::invalid_config(format!(
                "index.retry.backoff_multiplier must be a finite number >= 1.0, got {}",
                self.backoff_multiplier
            )));
        }
        if self.initial_delay > self.max_delay {
            return Err(Error::invalid_config(
                "index.retry.initial_delay cannot exceed index.retry.max_delay",
            ));
        }
        Ok(())
    }

    /// Calculate delay before `attempt` (0-based; the first attempt waits nothing)
    ///
    /// The base delay never exceeds `max_delay`, whatever the multiplier.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let base_delay = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let max_secs = self.max_delay.as_secs_f64();
        // NaN survives clamp and is caught by the conversion below
        let delay_secs = base_delay.clamp(0.0, max_secs);

        let final_delay = if self.jitter {
            // Add up to 25% jitter
            delay_secs * (1.0 + rand_simple() * 0.25)
        } else {
            delay_secs
        };

        Duration::try_from_secs_f64(final_delay).unwrap_or(self.max_delay)
    }
}

/// Simple pseudo-random number generator (0.0 to 1.0)
fn rand_simple() -> f64 {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let mut hasher = RandomState::new().build_hasher();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    hasher.write_u32(nanos);
    (hasher.finish() % 1000) as f64 / 1000.0
}

mod millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        u64::try_from(duration.as_millis())
            .unwrap_or(u64::MAX)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
