use rand::Rng;
use rove_types::LastAction;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_MIN_COOLDOWN: Duration = Duration::from_secs(25 * 60);
pub const DEFAULT_MAX_COOLDOWN: Duration = Duration::from_secs(35 * 60);

/// Enforces a randomized cooldown between rate-limited actions.
///
/// The threshold is re-rolled uniformly from `[min, max]` on every check,
/// so the effective gap between actions is probabilistic rather than a
/// fixed interval. The limiter only evaluates; after actually performing
/// an action the caller records the new timestamp in the proof store.
#[derive(Debug, Clone)]
pub struct ActionRateLimiter {
    min_cooldown: Duration,
    max_cooldown: Duration,
}

impl Default for ActionRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_COOLDOWN, DEFAULT_MAX_COOLDOWN)
    }
}

impl ActionRateLimiter {
    pub fn new(min_cooldown: Duration, max_cooldown: Duration) -> Self {
        Self {
            min_cooldown,
            max_cooldown: max_cooldown.max(min_cooldown),
        }
    }

    /// Whether a rate-limited action may be taken at `now` (unix seconds).
    pub fn allow_action(&self, last: &LastAction, now: i64) -> bool {
        self.allow_action_with_rng(last, now, &mut rand::thread_rng())
    }

    /// Evaluation with an injected randomness source so tests can pin the
    /// cooldown draw (set `min == max` for a deterministic threshold).
    pub fn allow_action_with_rng<R: Rng>(&self, last: &LastAction, now: i64, rng: &mut R) -> bool {
        match last {
            // No prior action: always allow
            LastAction::None => true,
            // Prior action exists but the record is unreadable: fail safe
            // toward not re-acting
            LastAction::Corrupt => false,
            LastAction::At(at) => {
                let threshold =
                    rng.gen_range(self.min_cooldown.as_secs()..=self.max_cooldown.as_secs()) as i64;
                let elapsed = now - at;
                let allowed = elapsed > threshold;
                if !allowed {
                    debug!(
                        elapsed,
                        threshold, "Within cooldown window, skipping action"
                    );
                }
                allowed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_history_always_allows() {
        let limiter = ActionRateLimiter::default();
        assert!(limiter.allow_action(&LastAction::None, 0));
        assert!(limiter.allow_action(&LastAction::None, i64::MAX));
    }

    #[test]
    fn test_corrupt_history_never_allows() {
        let limiter = ActionRateLimiter::default();
        assert!(!limiter.allow_action(&LastAction::Corrupt, i64::MAX));
    }

    #[test]
    fn test_denies_within_min_cooldown() {
        let limiter = ActionRateLimiter::default();
        let at = 1_700_000_000;
        // Any now below at + 25min is denied for every possible draw
        for offset in [0, 1, 60, 24 * 60, 25 * 60 - 1] {
            assert!(!limiter.allow_action(&LastAction::At(at), at + offset));
        }
    }

    #[test]
    fn test_allows_past_max_cooldown() {
        let limiter = ActionRateLimiter::default();
        let at = 1_700_000_000;
        // Beyond at + 35min every possible draw allows
        assert!(limiter.allow_action(&LastAction::At(at), at + 35 * 60 + 1));
    }

    #[test]
    fn test_pinned_threshold_boundary_is_strict() {
        // min == max pins the draw, exposing the exact boundary
        let limiter =
            ActionRateLimiter::new(Duration::from_secs(600), Duration::from_secs(600));
        let at = 1_700_000_000;
        assert!(!limiter.allow_action(&LastAction::At(at), at + 600));
        assert!(limiter.allow_action(&LastAction::At(at), at + 601));
    }

    #[test]
    fn test_max_clamped_to_min() {
        let limiter =
            ActionRateLimiter::new(Duration::from_secs(100), Duration::from_secs(10));
        let at = 0;
        assert!(!limiter.allow_action(&LastAction::At(at), 100));
        assert!(limiter.allow_action(&LastAction::At(at), 101));
    }
}
