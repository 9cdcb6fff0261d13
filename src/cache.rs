//! Holiday table cache with a bounded refresh interval.

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::data::{parse_table, DecodeFn, HolidayTable};
use crate::feed::HolidayFeed;
use crate::Error;

/// Tables older than this are refetched by the next query.
pub const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// One successful population: a complete table and when it was fetched.
struct Snapshot {
    table: Arc<HolidayTable>,
    /// Monotonic instant driving the staleness check.
    fetched_at: Instant,
    /// Wall-clock counterpart, reported by `last_fetched_at`.
    fetched_time: DateTime<Utc>,
}

/// Owns the shared holiday table and decides when to refetch it.
///
/// Starts uninitialized; the first query populates it. The table is
/// replaced wholesale on every population, so readers always observe one
/// complete snapshot. A failed population leaves the prior state untouched
/// and surfaces the error to the caller that required freshness: an
/// uninitialized cache retries on the next call, a populated one keeps its
/// last table readable through [`HolidayCache::table`].
pub struct HolidayCache {
    feed: Box<dyn HolidayFeed>,
    ttl: Duration,
    decode: DecodeFn,
    state: RwLock<Option<Snapshot>>,
    // Serializes populations so concurrent cold callers trigger one fetch.
    populate: Mutex<()>,
}

impl HolidayCache {
    pub fn new(feed: Box<dyn HolidayFeed>, ttl: Duration, decode: DecodeFn) -> Self {
        HolidayCache {
            feed,
            ttl,
            decode,
            state: RwLock::new(None),
            populate: Mutex::new(()),
        }
    }

    pub(crate) fn set_ttl(&mut self, ttl: Duration) {
        self.ttl = ttl;
    }

    pub(crate) fn set_decode(&mut self, decode: DecodeFn) {
        self.decode = decode;
    }

    /// Returns the current table, populating it first when it is missing or
    /// older than the staleness threshold.
    pub async fn fresh(&self) -> Result<Arc<HolidayTable>, Error> {
        if let Some(table) = self.current(self.ttl) {
            return Ok(table);
        }

        let _gate = self.populate.lock().await;
        // Another caller may have repopulated while we waited on the gate.
        if let Some(table) = self.current(self.ttl) {
            return Ok(table);
        }
        self.populate_now().await
    }

    /// Forces a fetch-and-replace cycle regardless of staleness.
    pub async fn refresh(&self) -> Result<Arc<HolidayTable>, Error> {
        let _gate = self.populate.lock().await;
        self.populate_now().await
    }

    /// Current table without triggering any fetch, however stale.
    pub fn table(&self) -> Option<Arc<HolidayTable>> {
        self.current(Duration::MAX)
    }

    /// Wall-clock time of the most recent successful population.
    pub fn last_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.state
            .read()
            .expect("holiday cache lock poisoned")
            .as_ref()
            .map(|snap| snap.fetched_time)
    }

    fn current(&self, max_age: Duration) -> Option<Arc<HolidayTable>> {
        let state = self.state.read().expect("holiday cache lock poisoned");
        match state.as_ref() {
            Some(snap) if snap.fetched_at.elapsed() < max_age => Some(Arc::clone(&snap.table)),
            _ => None,
        }
    }

    async fn populate_now(&self) -> Result<Arc<HolidayTable>, Error> {
        let bytes = self.feed.fetch().await?;
        let table = Arc::new(parse_table(&(self.decode)(&bytes)));
        debug!("holiday table populated: {} entries", table.len());

        let snapshot = Snapshot {
            table: Arc::clone(&table),
            fetched_at: Instant::now(),
            fetched_time: Utc::now(),
        };
        *self.state.write().expect("holiday cache lock poisoned") = Some(snapshot);
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::decode_utf8;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const CSV: &str = "date,name\n2024-01-01,元日\n";

    struct StubFeed {
        calls: Arc<AtomicUsize>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl HolidayFeed for StubFeed {
        async fn fetch(&self) -> Result<Vec<u8>, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(CSV.as_bytes().to_vec())
        }
    }

    struct FailingFeed {
        calls: Arc<AtomicUsize>,
        fail_from: usize,
    }

    #[async_trait]
    impl HolidayFeed for FailingFeed {
        async fn fetch(&self) -> Result<Vec<u8>, Error> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call >= self.fail_from {
                Err(Error::Fetch("boom".to_owned()))
            } else {
                Ok(CSV.as_bytes().to_vec())
            }
        }
    }

    fn stub_cache(ttl: Duration) -> (Arc<AtomicUsize>, HolidayCache) {
        let calls = Arc::new(AtomicUsize::new(0));
        let feed = StubFeed {
            calls: Arc::clone(&calls),
            delay: None,
        };
        (calls, HolidayCache::new(Box::new(feed), ttl, decode_utf8))
    }

    #[tokio::test]
    async fn population_is_lazy_and_reused_while_fresh() {
        let (calls, cache) = stub_cache(CACHE_TTL);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let table = cache.fresh().await.unwrap();
        assert_eq!(table["2024-01-01"], "元日");
        cache.fresh().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stale_table_triggers_exactly_one_new_fetch() {
        let (calls, cache) = stub_cache(Duration::ZERO);
        cache.fresh().await.unwrap();
        cache.fresh().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn accessors_report_nothing_before_population() {
        let (_, cache) = stub_cache(CACHE_TTL);
        assert!(cache.table().is_none());
        assert!(cache.last_fetched_at().is_none());

        cache.fresh().await.unwrap();
        assert!(cache.table().is_some());
        assert!(cache.last_fetched_at().is_some());
    }

    #[tokio::test]
    async fn refresh_refetches_even_when_fresh() {
        let (calls, cache) = stub_cache(CACHE_TTL);
        cache.fresh().await.unwrap();
        cache.refresh().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn initial_failure_propagates_and_next_call_retries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let feed = FailingFeed {
            calls: Arc::clone(&calls),
            fail_from: 0,
        };
        let cache = HolidayCache::new(Box::new(feed), CACHE_TTL, decode_utf8);

        assert_eq!(
            cache.fresh().await.unwrap_err(),
            Error::Fetch("boom".to_owned())
        );
        assert!(cache.table().is_none());

        // Still uninitialized, so the next call fetches again.
        assert!(cache.fresh().await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn refresh_failure_propagates_and_keeps_table() {
        let calls = Arc::new(AtomicUsize::new(0));
        let feed = FailingFeed {
            calls: Arc::clone(&calls),
            fail_from: 1,
        };
        let cache = HolidayCache::new(Box::new(feed), CACHE_TTL, decode_utf8);

        cache.fresh().await.unwrap();
        let fetched = cache.last_fetched_at();

        assert!(cache.refresh().await.is_err());
        let table = cache.table().expect("prior table must survive");
        assert_eq!(table["2024-01-01"], "元日");
        assert_eq!(cache.last_fetched_at(), fetched);
    }

    #[tokio::test]
    async fn concurrent_cold_callers_share_one_population() {
        let calls = Arc::new(AtomicUsize::new(0));
        let feed = StubFeed {
            calls: Arc::clone(&calls),
            delay: Some(Duration::from_millis(20)),
        };
        let cache = HolidayCache::new(Box::new(feed), CACHE_TTL, decode_utf8);

        let (a, b) = tokio::join!(cache.fresh(), cache.fresh());
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
