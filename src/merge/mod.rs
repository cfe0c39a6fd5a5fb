//! Heart-rate merge: plausibility gate and nearest-match attachment.

pub mod merger;
pub mod plausibility;
pub mod types;

pub use merger::{merge_heart_rate, time_range, MergeSummary};
pub use plausibility::{check_plausibility, PlausibilityReport, DEFAULT_THRESHOLD_SECS};
pub use types::{HeartRateTable, MergeError, TimePoint};
