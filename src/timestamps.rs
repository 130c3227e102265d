use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono::offset::LocalResult;
use chrono_tz::Tz;
use crate::errors::TimestampError;

/// Naive layouts seen from the providers, most specific first
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses an ISO-8601 timestamp into an instant.
///
/// Timestamps carrying an offset (or `Z`) are taken as-is. Timestamps without offset are
/// wall-clock times in the source timezone and are resolved with that zone's rules. A wall-clock
/// time that occurs twice (DST fold) resolves to the earlier instant, one that falls in a DST gap
/// can't be placed and gives an error.
///
/// # Arguments
///
/// * 's' - the timestamp string
/// * 'source_tz' - timezone naive timestamps are expressed in
pub fn parse_instant(s: &str, source_tz: &Tz) -> Result<DateTime<Utc>, TimestampError> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M%:z") {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Some(naive) = s.strip_suffix('Z').and_then(parse_naive) {
        return Ok(naive.and_utc());
    }

    let naive = parse_naive(s).ok_or_else(|| TimestampError::Unparsable(s.to_string()))?;
    match source_tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(TimestampError::NonExistent(s.to_string())),
    }
}

/// Parses a calendar date, either a plain `YYYY-MM-DD` or the date part of a full timestamp
/// as written (no timezone conversion, a daily record's date is a label, not an instant)
///
/// # Arguments
///
/// * 's' - the date string
pub fn parse_date(s: &str) -> Result<NaiveDate, TimestampError> {
    let s = s.trim();

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }

    parse_naive(s.trim_end_matches('Z'))
        .map(|naive| naive.date())
        .ok_or_else(|| TimestampError::Unparsable(s.to_string()))
}

/// Parses a wall-clock timestamp without offset, e.g. sunrise/sunset times
///
/// # Arguments
///
/// * 's' - the timestamp string
pub fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
}
