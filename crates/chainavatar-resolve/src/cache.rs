//! TTL-bounded resolver-handle cache with per-key single-flight.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::error::ResolveError;
use crate::locator::ResolverHandle;

// Above this many keys, expired slots are swept on insert.
const SWEEP_THRESHOLD: usize = 1024;

struct CacheEntry {
    handle: Option<ResolverHandle>,
    cached_at: Instant,
}

/// Cache of located resolver handles, keyed by name.
///
/// Both positive and negative results are cached (a name with no resolver
/// stays "no resolver" for one TTL). Lookups of a cold key are serialized
/// per key: concurrent callers perform exactly one upstream walk, the rest
/// wait on the slot and read the fresh entry. Distinct keys never contend.
///
/// Lookup errors are not cached; the slot stays cold and the next caller
/// retries upstream.
pub(crate) struct ResolverCache {
    ttl: Duration,
    slots: Mutex<HashMap<String, Arc<Mutex<Option<CacheEntry>>>>>,
}

impl ResolverCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached handle for `name`, or run `lookup` to fill the slot.
    pub async fn get_or_locate<F, Fut>(
        &self,
        name: &str,
        lookup: F,
    ) -> Result<Option<ResolverHandle>, ResolveError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Option<ResolverHandle>, ResolveError>>,
    {
        let slot = {
            let mut slots = self.slots.lock().await;
            if slots.len() > SWEEP_THRESHOLD {
                let ttl = self.ttl;
                slots.retain(|_, slot| match slot.try_lock() {
                    Ok(entry) => match entry.as_ref() {
                        Some(entry) => entry.cached_at.elapsed() < ttl,
                        None => true,
                    },
                    // Slot in use; keep it.
                    Err(_) => true,
                });
            }
            slots
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(None)))
                .clone()
        };

        let mut guard = slot.lock().await;
        if let Some(entry) = guard.as_ref() {
            if entry.cached_at.elapsed() < self.ttl {
                tracing::debug!(name, "resolver cache hit");
                return Ok(entry.handle.clone());
            }
        }

        let handle = lookup().await?;
        *guard = Some(CacheEntry {
            handle: handle.clone(),
            cached_at: Instant::now(),
        });
        Ok(handle)
    }
}
