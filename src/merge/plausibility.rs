//! Check that the activity log and the track describe the same session.

use super::types::{HeartRateTable, MergeError};

/// Default maximum start/end gap, in seconds (exclusive).
pub const DEFAULT_THRESHOLD_SECS: i64 = 60;

/// Outcome of comparing the two recordings' time ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlausibilityReport {
    /// |first track point - first heart-rate sample|, seconds
    pub start_diff: u64,
    /// |last track point - last heart-rate sample|, seconds
    pub end_diff: u64,
    pub threshold: i64,
    pub passed: bool,
}

/// Compare the track's first/last point times with the heart-rate table.
///
/// The table's first and last samples are taken in insertion order, not
/// by value. Both gaps must be strictly below `threshold`.
pub fn check_plausibility(
    table: &HeartRateTable,
    first_point: i64,
    last_point: i64,
    threshold: i64,
) -> Result<PlausibilityReport, MergeError> {
    let (Some(first), Some(last)) = (table.first(), table.last()) else {
        return Err(MergeError::EmptyHeartRateTable);
    };

    let start_diff = first_point.abs_diff(first.timestamp);
    let end_diff = last_point.abs_diff(last.timestamp);
    let limit = u64::try_from(threshold).unwrap_or(0);

    let report = PlausibilityReport {
        start_diff,
        end_diff,
        threshold,
        passed: start_diff < limit && end_diff < limit,
    };

    tracing::info!(
        "Start difference {}s, end difference {}s (threshold {}s)",
        start_diff,
        end_diff,
        threshold
    );

    Ok(report)
}
