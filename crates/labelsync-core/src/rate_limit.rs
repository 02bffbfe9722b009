use chrono::TimeDelta;
use std::time::Duration;
use tracing::info;

use crate::models::RateLimit;
use crate::traits::Clock;

/// Tokens that must stay available after the next call
pub const DEFAULT_MIN_TOKENS: u32 = 50;

/// Extra wait after the advertised reset time
pub const RESET_GRACE: Duration = Duration::from_secs(5);

/// Blocks the caller while the remote token budget is nearly exhausted
///
/// The governor keeps no state of its own: it only looks at the last
/// snapshot the remote service reported.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitGovernor {
    min_tokens: u32,
    grace: Duration,
}

impl Default for RateLimitGovernor {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_TOKENS)
    }
}

impl RateLimitGovernor {
    pub fn new(min_tokens: u32) -> Self {
        Self {
            min_tokens,
            grace: RESET_GRACE,
        }
    }

    pub fn min_tokens(&self) -> u32 {
        self.min_tokens
    }

    /// How long the caller has to wait before issuing the next call
    ///
    /// `None` means proceed immediately, including when the reset time is unknown.
    pub fn pause_for(&self, rate_limit: &RateLimit, clock: &dyn Clock) -> Option<Duration> {
        if rate_limit.remaining.saturating_sub(rate_limit.cost) >= self.min_tokens
            && rate_limit.remaining >= rate_limit.cost
        {
            return None;
        }
        let reset_at = rate_limit.reset_at?;
        let grace = TimeDelta::from_std(self.grace).unwrap_or_default();
        (reset_at + grace - clock.now()).to_std().ok().filter(|d| !d.is_zero())
    }

    /// Suspend until the budget has been reset, if it is nearly exhausted
    ///
    /// Returns the time spent waiting.
    pub fn wait(&self, rate_limit: &RateLimit, clock: &dyn Clock) -> Duration {
        let Some(pause) = self.pause_for(rate_limit, clock) else {
            return Duration::ZERO;
        };
        info!(
            remaining = rate_limit.remaining,
            cost = rate_limit.cost,
            reset_at = ?rate_limit.reset_at,
            "Less than {} remaining, will resume querying in {}s",
            self.min_tokens,
            pause.as_secs()
        );
        clock.sleep(pause);
        info!("Ready to resume querying");
        pause
    }
}
