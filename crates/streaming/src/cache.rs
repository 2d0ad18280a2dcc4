use std::collections::BTreeMap;
use std::sync::Arc;

use foundation::Year;
use parking_lot::Mutex;
use tokio::sync::OnceCell;

/// Year → tile template URL, shared by everything that resolves imagery.
///
/// Each year owns a slot that is written at most once. A failed fill leaves
/// the slot empty, so the next caller retries instead of seeing a cached
/// failure. There is no eviction: the key space is a handful of years.
#[derive(Debug, Default, Clone)]
pub struct TileUrlCache {
    slots: Arc<Mutex<BTreeMap<Year, Arc<OnceCell<String>>>>>,
}

impl TileUrlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The slot for `year`, created empty on first use.
    ///
    /// Callers fill it with `get_or_try_init`; concurrent fills for the same
    /// year wait on the first one instead of issuing their own request.
    pub fn slot(&self, year: Year) -> Arc<OnceCell<String>> {
        self.slots.lock().entry(year).or_default().clone()
    }

    pub fn get(&self, year: Year) -> Option<String> {
        self.slots.lock().get(&year)?.get().cloned()
    }

    pub fn contains(&self, year: Year) -> bool {
        self.get(year).is_some()
    }

    /// Stores `url` unless the year already has one; returns the stored value.
    pub fn insert(&self, year: Year, url: String) -> String {
        let slot = self.slot(year);
        match slot.set(url.clone()) {
            Ok(()) => url,
            Err(_) => slot.get().cloned().unwrap_or(url),
        }
    }

    /// Number of years with a resolved URL.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn years(&self) -> Vec<Year> {
        self.snapshot().into_keys().collect()
    }

    pub fn snapshot(&self) -> BTreeMap<Year, String> {
        self.slots
            .lock()
            .iter()
            .filter_map(|(year, slot)| slot.get().map(|url| (*year, url.clone())))
            .collect()
    }
}
