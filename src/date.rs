use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::Error;

/// Canonical date-key format used for table lookups.
///
/// The remote feed's date column must render dates in this exact format for
/// lookups to match; the normalizer and the parser tests share this one
/// constant.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Renders the table lookup key for a date.
#[inline]
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// A date-like query input: a concrete date value, an epoch timestamp in
/// milliseconds, or a textual date.
///
/// Every query method takes `impl Into<DateInput>`, so callers pass
/// [`chrono::NaiveDate`], `DateTime`s, [`std::time::SystemTime`], `i64`
/// epoch milliseconds, or strings directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateInput {
    Date(NaiveDate),
    EpochMillis(i64),
    Text(String),
}

impl DateInput {
    /// Normalizes the input into a calendar date.
    ///
    /// Concrete date values pass through unchanged. Epoch milliseconds are
    /// resolved to the UTC calendar day. Text accepts `%Y-%m-%d`, `%Y/%m/%d`
    /// and RFC 3339 timestamps.
    pub fn resolve(self) -> Result<NaiveDate, Error> {
        match self {
            DateInput::Date(it) => Ok(it),
            DateInput::EpochMillis(ms) => DateTime::from_timestamp_millis(ms)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| Error::InvalidDate(ms.to_string())),
            DateInput::Text(it) => match parse_text(&it) {
                Some(date) => Ok(date),
                None => Err(Error::InvalidDate(it)),
            },
        }
    }
}

fn parse_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, DATE_KEY_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y/%m/%d"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

impl From<NaiveDate> for DateInput {
    fn from(value: NaiveDate) -> Self {
        DateInput::Date(value)
    }
}
impl From<DateTime<Utc>> for DateInput {
    #[inline]
    fn from(value: DateTime<Utc>) -> Self {
        DateInput::Date(value.date_naive())
    }
}
impl From<DateTime<Local>> for DateInput {
    #[inline]
    fn from(value: DateTime<Local>) -> Self {
        DateInput::Date(value.date_naive())
    }
}
impl From<std::time::SystemTime> for DateInput {
    fn from(value: std::time::SystemTime) -> Self {
        DateInput::Date(DateTime::<Utc>::from(value).date_naive())
    }
}

impl From<i64> for DateInput {
    fn from(value: i64) -> Self {
        DateInput::EpochMillis(value)
    }
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        DateInput::Text(value.to_owned())
    }
}
impl From<String> for DateInput {
    fn from(value: String) -> Self {
        DateInput::Text(value)
    }
}

#[cfg(feature = "time")]
impl From<time::Date> for DateInput {
    fn from(value: time::Date) -> Self {
        // A time::Date is always a valid civil date within chrono's range.
        let date = NaiveDate::from_ymd_opt(
            value.year(),
            u8::from(value.month()) as u32,
            value.day() as u32,
        )
        .unwrap();
        DateInput::Date(date)
    }
}
#[cfg(feature = "time")]
impl From<time::OffsetDateTime> for DateInput {
    #[inline]
    fn from(value: time::OffsetDateTime) -> Self {
        DateInput::from(value.date())
    }
}
