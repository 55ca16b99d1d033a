//! Sliding-window admission control keyed by caller identity.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hashbrown::HashMap;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::config::RateGuardConfig;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;
}

/// Reads the system monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    /// Creates a clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

struct GuardState {
    admissions: HashMap<String, VecDeque<Instant>>,
    last_prune: Instant,
}

/// Admits at most `max_requests` calls per key within any `window`.
///
/// One guard is created per process and shared as `Arc<RateGuard>`. All
/// bookkeeping happens under a single lock, so concurrent checks for the
/// same key are serialized and never over-admit.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
/// use facility_geo_service::{ManualClock, RateGuard, RateGuardConfig};
///
/// let clock = Arc::new(ManualClock::new());
/// let config = RateGuardConfig { max_requests: 2, ..RateGuardConfig::default() };
/// let guard = RateGuard::with_clock(config, clock.clone());
///
/// assert!(guard.check("agent"));
/// assert!(guard.check("agent"));
/// assert!(!guard.check("agent"));
///
/// clock.advance(Duration::from_secs(60));
/// assert!(guard.check("agent"));
/// ```
pub struct RateGuard {
    config: RateGuardConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<GuardState>,
}

impl RateGuard {
    /// Creates a guard on the system clock.
    pub fn new(config: RateGuardConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a guard on a custom clock.
    pub fn with_clock(config: RateGuardConfig, clock: Arc<dyn Clock>) -> Self {
        let last_prune = clock.now();
        Self {
            config,
            clock,
            state: Mutex::new(GuardState {
                admissions: HashMap::new(),
                last_prune,
            }),
        }
    }

    /// Returns the guard configuration.
    pub fn config(&self) -> &RateGuardConfig {
        &self.config
    }

    /// Decides whether `key` may proceed, recording the admission if so.
    pub fn check(&self, key: &str) -> bool {
        let now = self.clock.now();
        let mut state = self.state.lock();

        if now.saturating_duration_since(state.last_prune) >= self.config.prune_interval {
            Self::prune_locked(&mut state, now, self.config.window);
        }

        let window = self.config.window;
        let admissions = state.admissions.entry(key.to_string()).or_default();
        while admissions
            .front()
            .is_some_and(|t| now.saturating_duration_since(*t) >= window)
        {
            admissions.pop_front();
        }

        if admissions.len() < self.config.max_requests {
            admissions.push_back(now);
            true
        } else {
            warn!(
                caller = key,
                max_requests = self.config.max_requests,
                window_secs = window.as_secs(),
                "rate limit exceeded"
            );
            false
        }
    }

    /// Drops keys with no admissions inside the current window.
    pub fn prune(&self) {
        let now = self.clock.now();
        let mut state = self.state.lock();
        Self::prune_locked(&mut state, now, self.config.window);
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.state.lock().admissions.len()
    }

    fn prune_locked(state: &mut GuardState, now: Instant, window: Duration) {
        let before = state.admissions.len();
        state.admissions.retain(|_, admissions| {
            admissions.retain(|t| now.saturating_duration_since(*t) < window);
            !admissions.is_empty()
        });
        state.last_prune = now;
        debug!(
            dropped = before - state.admissions.len(),
            remaining = state.admissions.len(),
            "rate guard pruned"
        );
    }
}

impl std::fmt::Debug for RateGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateGuard")
            .field("config", &self.config)
            .field("tracked_keys", &self.tracked_keys())
            .finish()
    }
}
