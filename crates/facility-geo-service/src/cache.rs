//! Gap-report caching.
//!
//! Gap scans are the only expensive analysis, so their reports are kept in
//! an LRU cache with TTL expiration. Keys embed the snapshot generation, so
//! replacing the facility data makes every older entry unreachable.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;

use facility_geo_engine::{GapParams, GapReport};

use crate::config::CacheConfig;
use crate::rate_guard::{Clock, SystemClock};

/// A cached report with expiration tracking.
#[derive(Debug, Clone)]
struct CacheEntry {
    report: Arc<GapReport>,
    created_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) > ttl
    }
}

/// Thread-safe LRU cache with TTL expiration for gap reports.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use facility_geo::BoundingBox;
/// use facility_geo_engine::{GapParams, GapReport, ScanStats};
/// use facility_geo_service::{gap_cache_key, CacheConfig, ReportCache};
///
/// let scope = BoundingBox::new(9.0, -1.0, 10.0, 0.0).unwrap();
/// let params = GapParams {
///     specialty: "Cardiology",
///     scope,
///     grid_resolution_km: 10.0,
///     threshold_km: 30.0,
/// };
/// let key = gap_cache_key(1, &params);
///
/// let cache = ReportCache::new(CacheConfig::default());
/// let report = GapReport {
///     specialty: "Cardiology".to_string(),
///     scope,
///     grid_resolution_km: 10.0,
///     threshold_km: 30.0,
///     sample_points: 0,
///     gap_points: 0,
///     qualifying_facilities: 0,
///     zones: Vec::new(),
///     stats: ScanStats::default(),
/// };
/// cache.set(key.clone(), Arc::new(report));
/// assert!(cache.get(&key).is_some());
/// ```
pub struct ReportCache {
    inner: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ReportCache {
    /// Creates a cache on the system clock.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a cache on a custom clock.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            ttl: config.ttl,
            clock,
        }
    }

    /// Gets a live report by key, promoting it to most-recently-used.
    ///
    /// Expired entries are removed and reported as misses.
    pub fn get(&self, key: &str) -> Option<Arc<GapReport>> {
        let now = self.clock.now();
        let mut cache = self.inner.lock();

        let expired = match cache.get(key) {
            Some(entry) if !entry.is_expired(now, self.ttl) => {
                return Some(Arc::clone(&entry.report));
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            cache.pop(key);
        }
        None
    }

    /// Stores a report, evicting the least recently used entry when full.
    pub fn set(&self, key: String, report: Arc<GapReport>) {
        let entry = CacheEntry {
            report,
            created_at: self.clock.now(),
        };
        self.inner.lock().put(key, entry);
    }

    /// Number of entries, including expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears all entries.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Removes expired entries.
    pub fn cleanup_expired(&self) {
        let now = self.clock.now();
        let mut cache = self.inner.lock();
        let expired: Vec<String> = cache
            .iter()
            .filter(|(_, entry)| entry.is_expired(now, self.ttl))
            .map(|(key, _)| key.clone())
            .collect();
        for key in expired {
            cache.pop(&key);
        }
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let cache = self.inner.lock();
        let total = cache.len();
        let expired = cache
            .iter()
            .filter(|(_, entry)| entry.is_expired(now, self.ttl))
            .count();
        CacheStats {
            total_entries: total,
            expired_entries: expired,
            valid_entries: total.saturating_sub(expired),
        }
    }
}

impl std::fmt::Debug for ReportCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportCache")
            .field("entries", &self.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Statistics about the cache state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Total number of entries.
    pub total_entries: usize,
    /// Entries past their TTL, not yet removed.
    pub expired_entries: usize,
    /// Entries still servable.
    pub valid_entries: usize,
}

/// Builds the cache key for a gap scan against one snapshot generation.
///
/// The specialty is keyed exactly as matched against facilities, so case and
/// internal whitespace both distinguish entries. It goes last: every field
/// before it is numeric, so the key splits back unambiguously. Region and
/// bounding-box scopes that resolve to the same box share a key.
pub fn gap_cache_key(generation: u64, params: &GapParams<'_>) -> String {
    let scope = params.scope;
    format!(
        "{generation}|{},{},{},{}|{}|{}|{}",
        scope.south,
        scope.west,
        scope.north,
        scope.east,
        params.grid_resolution_km,
        params.threshold_km,
        params.specialty,
    )
}
