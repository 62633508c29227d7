//! Process-wide instrument reference cache with explicit refresh-on-miss.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use super::source::{DataError, TimeSeriesSource};
use crate::domain::{InstrumentMeta, UniverseFilter};

type Snapshot = Arc<HashMap<String, InstrumentMeta>>;

/// Immutable `code -> InstrumentMeta` snapshot behind an atomically swapped `Arc`.
///
/// Readers clone the `Arc` and never block each other. The only write is a
/// full snapshot swap, either from [`ReferenceCache::load`] or from a miss in
/// [`ReferenceCache::lookup_or_refresh`] (rate limited by `min_refresh_interval`).
/// Nothing is ever invalidated implicitly.
#[derive(Debug)]
pub struct ReferenceCache {
    snapshot: RwLock<Snapshot>,
    last_refresh: Mutex<Option<Instant>>,
    min_refresh_interval: Duration,
}

impl ReferenceCache {
    pub fn new(min_refresh_interval: Duration) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(HashMap::new())),
            last_refresh: Mutex::new(None),
            min_refresh_interval,
        }
    }

    /// Fetch the full listed universe and install it. Returns the entry count.
    ///
    /// On error the previous snapshot stays in place.
    pub fn load(&self, source: &dyn TimeSeriesSource) -> Result<usize, DataError> {
        self.mark_refresh();
        let universe = source.fetch_instrument_universe(&UniverseFilter::listed())?;
        let map: HashMap<String, InstrumentMeta> = universe
            .into_iter()
            .map(|m| (m.code.clone(), m))
            .collect();
        let count = map.len();
        self.install(Arc::new(map));
        log::info!("reference cache loaded {count} instruments from {}", source.name());
        Ok(count)
    }

    /// Seed the cache directly, bypassing the source.
    pub fn install_entries(&self, entries: impl IntoIterator<Item = InstrumentMeta>) {
        let map = entries.into_iter().map(|m| (m.code.clone(), m)).collect();
        self.install(Arc::new(map));
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        match self.snapshot.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Read-only lookup against the current snapshot.
    pub fn lookup(&self, code: &str) -> Option<InstrumentMeta> {
        self.snapshot().get(code).cloned()
    }

    /// Lookup; on a miss, reload from `source` unless a reload happened within
    /// `min_refresh_interval`. Reload failures are logged and the old snapshot kept.
    pub fn lookup_or_refresh(
        &self,
        code: &str,
        source: &dyn TimeSeriesSource,
    ) -> Option<InstrumentMeta> {
        if let Some(hit) = self.lookup(code) {
            return Some(hit);
        }
        if !self.refresh_due() {
            return None;
        }
        if let Err(e) = self.load(source) {
            log::warn!("reference cache refresh failed, keeping previous snapshot: {e}");
            return None;
        }
        self.lookup(code)
    }

    fn refresh_due(&self) -> bool {
        let last = match self.last_refresh.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        };
        last.map_or(true, |t| t.elapsed() >= self.min_refresh_interval)
    }

    fn mark_refresh(&self) {
        match self.last_refresh.lock() {
            Ok(mut guard) => *guard = Some(Instant::now()),
            Err(poisoned) => *poisoned.into_inner() = Some(Instant::now()),
        }
    }

    fn install(&self, snapshot: Snapshot) {
        match self.snapshot.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
    }
}

impl Default for ReferenceCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::InMemorySource;
    use crate::domain::ListStatus;

    fn meta(code: &str) -> InstrumentMeta {
        InstrumentMeta {
            code: code.into(),
            name: format!("{code} Corp"),
            industry: Some("Banking".into()),
            list_status: ListStatus::Listed,
        }
    }

    #[test]
    fn load_then_lookup() {
        let src = InMemorySource::new()
            .with_instrument(meta("A"))
            .with_instrument(meta("B"));
        let cache = ReferenceCache::default();
        assert_eq!(cache.load(&src).unwrap(), 2);
        assert_eq!(cache.lookup("A").unwrap().name, "A Corp");
        assert!(cache.lookup("C").is_none());
    }

    #[test]
    fn miss_refreshes_once_within_interval() {
        let src = InMemorySource::new().with_instrument(meta("A"));
        let cache = ReferenceCache::new(Duration::from_secs(3600));
        assert!(cache.lookup_or_refresh("A", &src).is_some());
        assert_eq!(src.universe_fetches(), 1);
        // Second miss inside the interval does not hit the source again.
        assert!(cache.lookup_or_refresh("Z", &src).is_none());
        assert_eq!(src.universe_fetches(), 1);
    }

    #[test]
    fn zero_interval_refreshes_every_miss() {
        let src = InMemorySource::new().with_instrument(meta("A"));
        let cache = ReferenceCache::new(Duration::ZERO);
        cache.lookup_or_refresh("Z", &src);
        cache.lookup_or_refresh("Z", &src);
        assert_eq!(src.universe_fetches(), 2);
    }

    #[test]
    fn failed_refresh_keeps_snapshot() {
        let cache = ReferenceCache::new(Duration::ZERO);
        cache.install_entries(vec![meta("A")]);
        let broken = InMemorySource::new().fail_universe();
        assert!(cache.lookup_or_refresh("B", &broken).is_none());
        assert!(cache.lookup("A").is_some());
        assert!(cache.load(&broken).is_err());
        assert_eq!(cache.len(), 1);
    }
}
