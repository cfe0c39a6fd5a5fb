//! Timestamp normalization shared by the TCX and GPX readers.
//!
//! Both sources are reduced to integer epoch seconds with the same
//! [`TimeBasis`], so differences between them are meaningful.

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Offset-less layouts accepted after RFC 3339 fails.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// How a textual timestamp is turned into an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBasis {
    /// Wall-clock fields as written, read in the system time zone.
    /// Any offset in the text is discarded.
    #[default]
    Local,
    /// Offsets are honoured; offset-less text is read as UTC.
    Utc,
}

impl std::fmt::Display for TimeBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeBasis::Local => write!(f, "local"),
            TimeBasis::Utc => write!(f, "utc"),
        }
    }
}

impl std::str::FromStr for TimeBasis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(TimeBasis::Local),
            "utc" => Ok(TimeBasis::Utc),
            other => Err(format!("unknown time basis: {}", other)),
        }
    }
}

/// Errors from timestamp normalization.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimestampError {
    #[error("Unrecognized date/time: {0:?}")]
    Unrecognized(String),
}

/// A parsed timestamp, keeping whether the text carried an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parsed {
    Aware(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

fn parse(text: &str) -> Result<Parsed, TimestampError> {
    let trimmed = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Parsed::Aware(dt));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(Parsed::Naive)
        .ok_or_else(|| TimestampError::Unrecognized(text.to_string()))
}

/// Convert a date/time text to whole epoch seconds.
///
/// Fractional seconds are truncated. Under [`TimeBasis::Local`] a wall
/// clock that falls in a spring-forward gap is read with the offset in
/// force before the gap, the way `mktime` normalizes it.
pub fn to_epoch_seconds(text: &str, basis: TimeBasis) -> Result<i64, TimestampError> {
    let parsed = parse(text)?;

    match basis {
        TimeBasis::Utc => Ok(match parsed {
            Parsed::Aware(dt) => dt.timestamp(),
            Parsed::Naive(naive) => naive.and_utc().timestamp(),
        }),
        TimeBasis::Local => {
            let wall_clock = match parsed {
                Parsed::Aware(dt) => dt.naive_local(),
                Parsed::Naive(naive) => naive,
            };
            Ok(match Local.from_local_datetime(&wall_clock).earliest() {
                Some(dt) => dt.timestamp(),
                None => across_gap(wall_clock),
            })
        }
    }
}

/// Epoch seconds for a local wall clock skipped by a DST transition.
fn across_gap(wall_clock: NaiveDateTime) -> i64 {
    let offset = (1..=48)
        .map(|hours| wall_clock - Duration::hours(hours))
        .find_map(|before| Local.offset_from_local_datetime(&before).earliest())
        .map_or(0, |offset| offset.local_minus_utc());
    wall_clock.and_utc().timestamp() - i64::from(offset)
}
