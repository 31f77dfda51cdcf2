//! Process-wide resource cache with tag invalidation
//!
//! Each cached resource is filed under a [`CacheTag`]. Invalidating a tag only
//! marks its entry stale; the next read through [`ResourceCache::read`]
//! refetches it. Reads hand out `Arc` snapshots and never mutate the value
//! other readers hold.
//!
//! Every fetch takes a version from a cache-wide clock when it starts. A
//! response is stored only if no newer fetch has been stored and the tag has
//! not been invalidated since the fetch began, so a slow response can never
//! replace a newer one.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::lock;

/// Cached resource families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheTag {
    /// Recurring job list
    Jobs,
    /// Trained model catalog
    Models,
}

struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    stale: bool,
    version: u64,
}

#[derive(Default)]
struct Slot {
    entry: Option<Entry>,
    invalidations: u64,
    invalidated_at: u64,
}

#[derive(Default)]
struct CacheState {
    clock: u64,
    slots: HashMap<CacheTag, Slot>,
}

impl CacheState {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

/// A cached value together with the version of the fetch that produced it
///
/// Versions only grow; a higher version was fetched later.
#[derive(Debug)]
pub struct Versioned<T> {
    pub value: Arc<T>,
    pub version: u64,
}

/// Shared cache of backend resources, keyed by tag
#[derive(Default)]
pub struct ResourceCache {
    state: Mutex<CacheState>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last stored value for `tag`, stale or not
    pub fn peek<T>(&self, tag: CacheTag) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let state = lock(&self.state);
        state
            .slots
            .get(&tag)
            .and_then(|slot| slot.entry.as_ref())
            .and_then(|entry| Arc::clone(&entry.value).downcast::<T>().ok())
    }

    /// True if `tag` holds a value that has not been invalidated since it was stored
    pub fn is_fresh(&self, tag: CacheTag) -> bool {
        lock(&self.state)
            .slots
            .get(&tag)
            .and_then(|slot| slot.entry.as_ref())
            .is_some_and(|entry| !entry.stale)
    }

    /// Stores a value under `tag` as the newest version
    pub fn store<T>(&self, tag: CacheTag, value: T) -> Arc<T>
    where
        T: Any + Send + Sync,
    {
        let value = Arc::new(value);
        let mut state = lock(&self.state);
        let version = state.tick();
        state.slots.entry(tag).or_default().entry = Some(Entry {
            value: value.clone(),
            stale: false,
            version,
        });
        value
    }

    /// Marks `tag` stale so the next read refetches it
    ///
    /// Fetches already in flight for `tag` will not be stored.
    pub fn invalidate(&self, tag: CacheTag) {
        let mut state = lock(&self.state);
        let now = state.tick();
        let slot = state.slots.entry(tag).or_default();
        if let Some(entry) = slot.entry.as_mut() {
            entry.stale = true;
        }
        slot.invalidations += 1;
        slot.invalidated_at = now;
        debug!("Invalidated cache tag {:?}", tag);
    }

    /// How many times `tag` has been invalidated
    pub fn invalidation_count(&self, tag: CacheTag) -> u64 {
        lock(&self.state)
            .slots
            .get(&tag)
            .map_or(0, |slot| slot.invalidations)
    }

    /// Returns the cached value if fresh, otherwise fetches it
    pub async fn read<T, E, F, Fut>(&self, tag: CacheTag, fetch: F) -> Result<Arc<T>, E>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        Ok(self.read_versioned(tag, fetch).await?.value)
    }

    /// Like [`ResourceCache::read`], also reporting the value's version
    ///
    /// If the fetch is superseded while in flight, the newer stored value is
    /// returned when there is one.
    pub async fn read_versioned<T, E, F, Fut>(&self, tag: CacheTag, fetch: F) -> Result<Versioned<T>, E>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(current) = self.current::<T>(tag, |entry, _| !entry.stale) {
            return Ok(current);
        }

        let (fetched, stored) = self.fetch_versioned(tag, fetch).await?;
        if stored {
            return Ok(fetched);
        }
        let newer = self.current::<T>(tag, |entry, slot| {
            entry.version > fetched.version && entry.version > slot.invalidated_at
        });
        Ok(newer.unwrap_or(fetched))
    }

    /// Fetches a new value regardless of freshness
    ///
    /// Returns `None` when the response was superseded by a newer fetch or by
    /// an invalidation while in flight. A failed fetch leaves the previous
    /// entry untouched.
    pub async fn refetch<T, E, F, Fut>(
        &self,
        tag: CacheTag,
        fetch: F,
    ) -> Result<Option<Versioned<T>>, E>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let (fetched, stored) = self.fetch_versioned(tag, fetch).await?;
        Ok(stored.then_some(fetched))
    }

    async fn fetch_versioned<T, E, F, Fut>(
        &self,
        tag: CacheTag,
        fetch: F,
    ) -> Result<(Versioned<T>, bool), E>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let version = lock(&self.state).tick();
        let fetched = Versioned {
            value: Arc::new(fetch().await?),
            version,
        };

        let mut state = lock(&self.state);
        let slot = state.slots.entry(tag).or_default();
        let superseded = slot.invalidated_at > version
            || slot.entry.as_ref().is_some_and(|entry| entry.version > version);
        if superseded {
            debug!("Discarding superseded fetch for cache tag {:?}", tag);
            return Ok((fetched, false));
        }

        slot.entry = Some(Entry {
            value: fetched.value.clone(),
            stale: false,
            version,
        });
        Ok((fetched, true))
    }

    /// Stored entry for `tag` if it has type `T` and satisfies `accept`
    fn current<T>(&self, tag: CacheTag, accept: impl Fn(&Entry, &Slot) -> bool) -> Option<Versioned<T>>
    where
        T: Any + Send + Sync,
    {
        let state = lock(&self.state);
        let slot = state.slots.get(&tag)?;
        let entry = slot.entry.as_ref().filter(|entry| accept(entry, slot))?;
        let value = Arc::clone(&entry.value).downcast::<T>().ok()?;
        Some(Versioned {
            value,
            version: entry.version,
        })
    }
}
