//! Rate Limiting
//!
//! Fixed one-hour windows per API key, sized by the account's plan.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

const WINDOW_SECONDS: i64 = 3600;

/// Requests allowed per hour, by plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitTier {
    /// 1,000 requests per hour
    #[default]
    Standard,

    /// 5,000 requests per hour
    Professional,

    /// 10,000 requests per hour
    Enterprise,
}

impl RateLimitTier {
    /// Requests allowed per window
    #[must_use]
    pub fn requests_per_hour(self) -> u32 {
        match self {
            RateLimitTier::Standard => 1_000,
            RateLimitTier::Professional => 5_000,
            RateLimitTier::Enterprise => 10_000,
        }
    }
}

impl fmt::Display for RateLimitTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RateLimitTier::Standard => "standard",
            RateLimitTier::Professional => "professional",
            RateLimitTier::Enterprise => "enterprise",
        })
    }
}

impl FromStr for RateLimitTier {
    type Err = RateLimitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(RateLimitTier::Standard),
            "professional" => Ok(RateLimitTier::Professional),
            "enterprise" => Ok(RateLimitTier::Enterprise),
            _ => Err(RateLimitError::UnknownTier(s.to_string())),
        }
    }
}

/// Rate limit state after a request, as reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    /// Requests allowed in the window
    pub limit: u32,

    /// Requests left in the window
    pub remaining: u32,

    /// Unix time (seconds) the window resets at
    pub reset: i64,
}

impl RateLimitStatus {
    /// Response headers carrying this status.
    #[must_use]
    pub fn headers(&self) -> [(&'static str, String); 3] {
        [
            ("X-RateLimit-Limit", self.limit.to_string()),
            ("X-RateLimit-Remaining", self.remaining.to_string()),
            ("X-RateLimit-Reset", self.reset.to_string()),
        ]
    }
}

/// Errors returned by the rate limiter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RateLimitError {
    /// The key has used up its window.
    #[error("rate limit of {} requests per hour exceeded, resets at {}", .0.limit, .0.reset)]
    Exceeded(RateLimitStatus),

    /// Unknown plan name.
    #[error("unknown rate limit tier: {0}")]
    UnknownTier(String),
}

#[derive(Debug, Clone, Copy)]
struct Window {
    start: i64,
    used: u32,
}

/// In-memory fixed-window rate limiter keyed by API key.
///
/// Windows from earlier hours are dropped the first time a request lands in a newer one.
#[derive(Debug, Default)]
pub struct RateLimiter {
    windows: FxHashMap<String, Window>,
    current: i64,
}

impl RateLimiter {
    /// Create an empty limiter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a request for `key` at `now`.
    ///
    /// Rejected requests don't consume the window.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError::Exceeded`] once the key has used its tier's allowance
    /// for the current window.
    pub fn check(
        &mut self,
        key: &str,
        tier: RateLimitTier,
        now: Timestamp,
    ) -> Result<RateLimitStatus, RateLimitError> {
        let limit = tier.requests_per_hour();
        let now_seconds = now.as_second();
        let start = now_seconds - now_seconds.rem_euclid(WINDOW_SECONDS);

        if start > self.current {
            self.windows.retain(|_, window| window.start >= start);
            self.current = start;
        }

        let window = self
            .windows
            .entry(key.to_string())
            .or_insert(Window { start, used: 0 });

        if window.start != start {
            *window = Window { start, used: 0 };
        }

        let reset = start + WINDOW_SECONDS;

        if window.used >= limit {
            let status = RateLimitStatus {
                limit,
                remaining: 0,
                reset,
            };

            warn!(key, %tier, reset, "rate limit exceeded");

            return Err(RateLimitError::Exceeded(status));
        }

        window.used += 1;

        Ok(RateLimitStatus {
            limit,
            remaining: limit - window.used,
            reset,
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn tiers_have_hourly_allowances() -> TestResult {
        assert_eq!(RateLimitTier::Standard.requests_per_hour(), 1_000);
        assert_eq!(RateLimitTier::Professional.requests_per_hour(), 5_000);
        assert_eq!(RateLimitTier::Enterprise.requests_per_hour(), 10_000);
        assert_eq!("Enterprise".parse::<RateLimitTier>()?, RateLimitTier::Enterprise);

        Ok(())
    }

    #[test]
    fn counts_down_within_a_window() -> TestResult {
        let mut limiter = RateLimiter::new();
        let now = Timestamp::from_second(7_200 + 60)?;

        let first = limiter.check("key", RateLimitTier::Standard, now)?;
        let second = limiter.check("key", RateLimitTier::Standard, now)?;

        assert_eq!(first.remaining, 999);
        assert_eq!(second.remaining, 998);
        assert_eq!(second.reset, 10_800);

        Ok(())
    }

    #[test]
    fn rejects_once_allowance_is_used() -> TestResult {
        let mut limiter = RateLimiter::new();
        let now = Timestamp::from_second(0)?;

        for _ in 0..1_000 {
            limiter.check("key", RateLimitTier::Standard, now)?;
        }

        let result = limiter.check("key", RateLimitTier::Standard, now);

        assert_eq!(
            result,
            Err(RateLimitError::Exceeded(RateLimitStatus {
                limit: 1_000,
                remaining: 0,
                reset: 3_600,
            }))
        );

        // Other keys are unaffected.
        assert_eq!(
            limiter.check("other", RateLimitTier::Standard, now)?.remaining,
            999
        );

        Ok(())
    }

    #[test]
    fn new_window_resets_usage() -> TestResult {
        let mut limiter = RateLimiter::new();

        for _ in 0..1_000 {
            limiter.check("key", RateLimitTier::Standard, Timestamp::from_second(10)?)?;
        }

        let status = limiter.check("key", RateLimitTier::Standard, Timestamp::from_second(3_600)?)?;

        assert_eq!(status.remaining, 999);
        assert_eq!(status.reset, 7_200);

        Ok(())
    }

    #[test]
    fn drops_windows_from_earlier_hours() -> TestResult {
        let mut limiter = RateLimiter::new();

        limiter.check("a", RateLimitTier::Standard, Timestamp::from_second(3_600)?)?;
        limiter.check("b", RateLimitTier::Standard, Timestamp::from_second(3_700)?)?;

        assert_eq!(limiter.windows.len(), 2);

        limiter.check("b", RateLimitTier::Standard, Timestamp::from_second(7_200)?)?;

        assert_eq!(limiter.windows.len(), 1);
        assert!(limiter.windows.contains_key("b"));

        // A late request for an older hour still gets counted.
        let late = limiter.check("a", RateLimitTier::Standard, Timestamp::from_second(3_650)?)?;

        assert_eq!(late.remaining, 999);

        Ok(())
    }

        #[test]
    fn headers_report_status() {
        let status = RateLimitStatus {
            limit: 5_000,
            remaining: 42,
            reset: 3_600,
        };

        assert_eq!(
            status.headers(),
            [
                ("X-RateLimit-Limit", "5000".to_string()),
                ("X-RateLimit-Remaining", "42".to_string()),
                ("X-RateLimit-Reset", "3600".to_string()),
            ]
        );
    }
}
