use std::collections::HashMap;

/// One complete snapshot of known holidays: canonical date-key to name.
pub type HolidayTable = HashMap<String, String>;

/// Decodes raw feed bytes into text.
///
/// The published feed is plain UTF-8; callers pointing at a host serving a
/// legacy encoding supply their own decoder via
/// [`Holidays::decode_with`](crate::Holidays::decode_with).
pub type DecodeFn = fn(&[u8]) -> String;

/// Baseline decoder: lossy UTF-8.
pub(crate) fn decode_utf8(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Parses the two-column holiday CSV into a lookup table.
///
/// The first line is dropped unconditionally as the header. Each remaining
/// line is split on its first comma; it enters the table only when both
/// fields are non-empty after trimming, everything else is skipped. Later
/// lines overwrite earlier ones on duplicate dates. Date fields are stored
/// verbatim, so a malformed date simply never matches a lookup key.
pub(crate) fn parse_table(text: &str) -> HolidayTable {
    let mut table = HolidayTable::new();
    for line in text.lines().skip(1) {
        let (date, name) = match line.split_once(',') {
            Some(it) => it,
            None => continue,
        };
        let (date, name) = (date.trim(), name.trim());
        if date.is_empty() || name.is_empty() {
            continue;
        }
        table.insert(date.to_owned(), name.to_owned());
    }
    table
}
