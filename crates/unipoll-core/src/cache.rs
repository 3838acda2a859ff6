// ── Single-slot TTL cache ──
//
// One value, one timestamp, one TTL. Readers only ever take the entry's
// shared lock; refreshes are serialized by a separate async mutex, so
// `get_cached` never waits behind network I/O. The entry lock is held just
// long enough to read or store, never across an `.await`.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Failures that originate in the cache itself rather than in the
/// caller-supplied refresh.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("refresh of cache '{cache}' panicked")]
    RefreshPanicked { cache: String },

    #[error("refresh of cache '{cache}' was aborted before completing")]
    RefreshAborted { cache: String },
}

struct CacheEntry<T> {
    value: Option<T>,
    /// `None` until the first successful refresh, and again after `invalidate`.
    cached_at: Option<Instant>,
    ttl: Duration,
    /// Completed refresh attempts, successful or not. Lets a waiter tell
    /// whether the refresh it queued behind has finished.
    attempts: u64,
}

impl<T> CacheEntry<T> {
    fn is_fresh(&self) -> bool {
        self.cached_at.is_some_and(|at| at.elapsed() < self.ttl)
    }

    fn fresh_value(&self) -> Option<&T> {
        if self.is_fresh() {
            self.value.as_ref()
        } else {
            None
        }
    }
}

/// Outcome of the most recent refresh, guarded by the refresh lock.
struct RefreshState<E> {
    last_error: Option<E>,
}

/// Generic single-value cache with freshness tracking, double-checked
/// refresh and a TTL that can change at runtime.
///
/// - [`get`](Self::get) returns the cached value while it is fresh and
///   otherwise runs the supplied refresh. At most one refresh is in flight
///   per cache; callers arriving meanwhile wait and observe its outcome,
///   including its error.
/// - A failed refresh never evicts the previous value or its timestamp.
/// - The refresh runs on its own task: dropping the caller that started it
///   does not stop it, and its result is still stored for everyone else.
pub struct TtlCache<T, E> {
    name: Arc<str>,
    entry: Arc<RwLock<CacheEntry<T>>>,
    refresh: Arc<Mutex<RefreshState<E>>>,
}

impl<T, E> TtlCache<T, E> {
    /// Create an empty cache. `name` shows up in every diagnostic event.
    pub fn new(ttl: Duration, name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            entry: Arc::new(RwLock::new(CacheEntry {
                value: None,
                cached_at: None,
                ttl,
                attempts: 0,
            })),
            refresh: Arc::new(Mutex::new(RefreshState { last_error: None })),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ttl(&self) -> Duration {
        self.read().ttl
    }

    /// Time since the last successful refresh. `None` if the cache was
    /// never populated or has been invalidated since.
    pub fn age(&self) -> Option<Duration> {
        self.read().cached_at.map(|at| at.elapsed())
    }

    pub fn is_fresh(&self) -> bool {
        self.read().is_fresh()
    }

    /// Force the next [`get`](Self::get) to refresh, whatever the TTL.
    ///
    /// The stored value is kept, but it no longer counts as fresh.
    pub fn invalidate(&self) {
        self.write().cached_at = None;
        info!(cache = %self.name, "cache invalidated");
    }

    /// Replace the TTL. Freshness is recomputed on the next read against
    /// the existing timestamp, so a longer TTL can revive stale data and a
    /// shorter one can expire fresh data immediately.
    pub fn set_ttl(&self, ttl: Duration) {
        let previous = std::mem::replace(&mut self.write().ttl, ttl);
        info!(
            cache = %self.name,
            previous_secs = previous.as_secs_f64(),
            ttl_secs = ttl.as_secs_f64(),
            "cache TTL changed"
        );
    }

    fn read(&self) -> RwLockReadGuard<'_, CacheEntry<T>> {
        self.entry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CacheEntry<T>> {
        self.entry.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone, E> TtlCache<T, E> {
    /// The stored value if it is fresh. Never refreshes and never waits
    /// for a refresh in progress.
    pub fn get_cached(&self) -> Option<T> {
        self.read().fresh_value().cloned()
    }
}

impl<T, E> TtlCache<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + fmt::Display + From<CacheError> + Send + 'static,
{
    /// Return the fresh value, or refresh it.
    ///
    /// `refresh` is only called when the value is stale after re-checking
    /// under the refresh lock. If a refresh completed while this caller was
    /// waiting for the lock, its result is used instead: the value it
    /// stored is returned even if the TTL has already run out, and a
    /// failure is returned as the same error.
    pub async fn get<F, Fut>(&self, refresh: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let attempts_seen = {
            let entry = self.read();
            if let Some(value) = entry.fresh_value() {
                return Ok(value.clone());
            }
            entry.attempts
        };

        let state = Arc::clone(&self.refresh).lock_owned().await;

        {
            let entry = self.read();
            if let Some(value) = entry.fresh_value() {
                debug!(cache = %self.name, "refreshed by a concurrent caller");
                return Ok(value.clone());
            }
            // A refresh finished while we queued: its outcome is ours, even
            // if the value it stored has already gone stale.
            if entry.attempts != attempts_seen {
                if let Some(err) = &state.last_error {
                    debug!(cache = %self.name, "concurrent refresh failed, sharing its error");
                    return Err(err.clone());
                }
                if let Some(value) = &entry.value {
                    debug!(cache = %self.name, "sharing value from a concurrent refresh");
                    return Ok(value.clone());
                }
            }
        }

        let work = refresh();
        let name = Arc::clone(&self.name);
        let entry = Arc::clone(&self.entry);

        let task = tokio::spawn(async move {
            let mut state = state;
            debug!(cache = %name, "refreshing");
            let started = Instant::now();

            let result = work.await;
            let elapsed = started.elapsed();

            let mut slot = entry.write().unwrap_or_else(PoisonError::into_inner);
            slot.attempts += 1;
            match &result {
                Ok(value) => {
                    slot.value = Some(value.clone());
                    slot.cached_at = Some(Instant::now());
                    drop(slot);
                    state.last_error = None;
                    info!(
                        cache = %name,
                        elapsed_ms = elapsed.as_millis(),
                        "refresh complete"
                    );
                }
                Err(err) => {
                    drop(slot);
                    state.last_error = Some(err.clone());
                    warn!(
                        cache = %name,
                        elapsed_ms = elapsed.as_millis(),
                        error = %err,
                        "refresh failed"
                    );
                }
            }
            result
        });

        match task.await {
            Ok(result) => result,
            Err(join_err) => {
                let cache = self.name.to_string();
                let err = if join_err.is_panic() {
                    CacheError::RefreshPanicked { cache }
                } else {
                    CacheError::RefreshAborted { cache }
                };
                warn!(cache = %self.name, error = %err, "refresh task did not complete");
                Err(err.into())
            }
        }
    }
}

impl<T, E> fmt::Debug for TtlCache<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entry = self.read();
        f.debug_struct("TtlCache")
            .field("name", &self.name)
            .field("ttl", &entry.ttl)
            .field("populated", &entry.value.is_some())
            .field("fresh", &entry.is_fresh())
            .finish_non_exhaustive()
    }
}
