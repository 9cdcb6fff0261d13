//! Japanese national holiday lookups.
//!
//! Fetches the published two-column holiday CSV on first use, caches the
//! parsed table for 24 hours, and answers date queries against it.
//!
//! ```no_run
//! # async fn run() -> Result<(), syukujitsu::Error> {
//! let holidays = syukujitsu::Holidays::new();
//! if let Some(h) = holidays.get("2024-01-01").await? {
//!     println!("{} is {}", h.date, h.name);
//! }
//! # Ok(())
//! # }
//! ```

mod cache;
mod data;
mod date;
mod feed;
pub mod query;

pub use cache::{HolidayCache, CACHE_TTL};
pub use data::{DecodeFn, HolidayTable};
pub use date::{date_key, DateInput, DATE_KEY_FORMAT};
pub use feed::{HolidayFeed, HttpFeed, FEED_URL};
pub use query::Holidays;

use chrono::NaiveDate;

/// Represents a holiday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holiday {
    /// Date of holiday.
    pub date: NaiveDate,
    /// Name of holiday.
    pub name: String,
}

/// Error states the holiday crate might encounter.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// Input could not be normalized into a calendar date.
    #[error("invalid date input: {0}")]
    InvalidDate(String),
    /// The holiday feed could not be fetched.
    #[error("holiday feed request failed: {0}")]
    Fetch(String),
}
