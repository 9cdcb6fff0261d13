use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::cache::{HolidayCache, CACHE_TTL};
use crate::data::{decode_utf8, DecodeFn, HolidayTable};
use crate::date::{date_key, DateInput};
use crate::feed::{HolidayFeed, HttpFeed};
use crate::{Error, Holiday};

/// Japanese national holiday lookups backed by the remote feed.
///
/// Each client owns its own table cache, so tests construct a fresh one per
/// case; applications build one and share it.
pub struct Holidays {
    cache: HolidayCache,
}

impl Holidays {
    /// Client against the published feed with the default 24-hour cache.
    pub fn new() -> Self {
        Self::with_feed(HttpFeed::new())
    }

    /// Client reading from a caller-supplied feed.
    pub fn with_feed(feed: impl HolidayFeed + 'static) -> Self {
        Holidays {
            cache: HolidayCache::new(Box::new(feed), CACHE_TTL, decode_utf8),
        }
    }

    /// Replaces the staleness threshold.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache.set_ttl(ttl);
        self
    }

    /// Replaces the feed byte decoder (lossy UTF-8 by default).
    pub fn decode_with(mut self, decode: DecodeFn) -> Self {
        self.cache.set_decode(decode);
        self
    }

    /// Looks up the holiday falling on `date`, `None` when it is a plain
    /// day. Populates or refreshes the table first when needed.
    pub async fn get(&self, date: impl Into<DateInput>) -> Result<Option<Holiday>, Error> {
        let date = date.into().resolve()?;
        let table = self.cache.fresh().await?;
        Ok(table.get(&date_key(date)).map(|name| Holiday {
            date,
            name: name.clone(),
        }))
    }

    /// Whether `date` is a holiday.
    pub async fn contains(&self, date: impl Into<DateInput>) -> Result<bool, Error> {
        Ok(self.get(date).await?.is_some())
    }

    /// All holidays from `start` through `end` inclusive, ascending.
    ///
    /// A reversed range yields an empty list, not an error.
    pub async fn between(
        &self,
        start: impl Into<DateInput>,
        end: impl Into<DateInput>,
    ) -> Result<Vec<Holiday>, Error> {
        let start = start.into().resolve()?;
        let end = end.into().resolve()?;
        if start > end {
            return Ok(Vec::new());
        }

        // One snapshot for the whole scan; a refresh landing partway
        // through can never produce a mixed result.
        let table = self.cache.fresh().await?;
        let mut found = Vec::new();
        for day in start.iter_days().take_while(|day| *day <= end) {
            if let Some(name) = table.get(&date_key(day)) {
                found.push(Holiday {
                    date: day,
                    name: name.clone(),
                });
            }
        }
        Ok(found)
    }

    /// Forces a refetch regardless of staleness.
    pub async fn refresh(&self) -> Result<(), Error> {
        self.cache.refresh().await.map(|_| ())
    }

    /// Current table snapshot without triggering any fetch.
    pub fn table(&self) -> Option<Arc<HolidayTable>> {
        self.cache.table()
    }

    /// When the table was last successfully fetched.
    pub fn last_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.cache.last_fetched_at()
    }
}

impl Default for Holidays {
    fn default() -> Self {
        Self::new()
    }
}
