//! Unit tests for the plausibility check

use gpx_hr_merge::merge::{check_plausibility, HeartRateTable, MergeError, DEFAULT_THRESHOLD_SECS};

fn table() -> HeartRateTable {
    [(100, 120), (160, 130), (220, 140)].into_iter().collect()
}

#[test]
fn test_default_threshold() {
    assert_eq!(DEFAULT_THRESHOLD_SECS, 60);
}

#[test]
fn test_overlapping_recordings_pass() {
    let report = check_plausibility(&table(), 105, 215, DEFAULT_THRESHOLD_SECS).unwrap();
    assert!(report.passed);
    assert_eq!((report.start_diff, report.end_diff), (5, 5));
    assert_eq!(report.threshold, 60);
}

#[test]
fn test_boundary_sixty_rejected() {
    let start = check_plausibility(&table(), 160, 220, 60).unwrap();
    let end = check_plausibility(&table(), 100, 160, 60).unwrap();
    assert_eq!(start.start_diff, 60);
    assert!(!start.passed);
    assert_eq!(end.end_diff, 60);
    assert!(!end.passed);
}

#[test]
fn test_boundary_fifty_nine_accepted() {
    let report = check_plausibility(&table(), 159, 279, 60).unwrap();
    assert_eq!((report.start_diff, report.end_diff), (59, 59));
    assert!(report.passed);
}

#[test]
fn test_unrelated_recordings_rejected() {
    let report = check_plausibility(&table(), 86_400, 90_000, 60).unwrap();
    assert!(!report.passed);
}

#[test]
fn test_empty_table_is_error() {
    assert!(matches!(
        check_plausibility(&HeartRateTable::new(), 0, 0, 60),
        Err(MergeError::EmptyHeartRateTable)
    ));
}
