//! Integration tests for the default local-time basis
//!
//! Every test here pins the same zone, so they can run in parallel.

use super::fixtures::{gpx_document, tcx_document, write};
use gpx_hr_merge::import::gpx::parse_gpx;
use gpx_hr_merge::pipeline::{run, MergeOutcome, MergeRequest};
use gpx_hr_merge::{MergeConfig, TimeBasis};
use std::fs;

/// 2024-03-31T00:00:00, the day Paris skips 02:00-03:00.
const GAP_DAY: i64 = 1_711_843_200;

fn at(hours: i64, minutes: i64, seconds: i64) -> i64 {
    GAP_DAY + hours * 3600 + minutes * 60 + seconds
}

fn pin_zone() {
    std::env::set_var("TZ", "Europe/Paris");
}

fn merged_heart_rates(outcome: MergeOutcome) -> Vec<String> {
    let output = match outcome {
        MergeOutcome::Merged { output, .. } => output,
        other => panic!("expected merge, got {other:?}"),
    };
    let gpx = parse_gpx(&fs::read_to_string(output).unwrap()).unwrap();
    gpx.points()
        .flat_map(|p| {
            p.extension_blocks("TrackPointExtension")
                .filter_map(|b| b.child("hr"))
                .map(|hr| hr.text())
                .collect::<Vec<_>>()
        })
        .collect()
}

#[test]
fn test_default_config_is_local() {
    assert_eq!(MergeConfig::default().time_basis, TimeBasis::Local);
}

#[test]
fn test_merge_scenario_default_config() {
    pin_zone();
    let dir = tempfile::tempdir().unwrap();
    let tcx = write(
        dir.path(),
        "ride.tcx",
        &tcx_document(&[(100, Some(120)), (160, Some(130)), (220, Some(140))]),
    );
    let gpx = write(dir.path(), "ride.gpx", &gpx_document(&[105, 215]));

    let outcome = run(&MergeRequest::new(&gpx, &tcx), &MergeConfig::default()).unwrap();

    assert_eq!(merged_heart_rates(outcome), vec!["120", "140"]);
}

#[test]
fn test_session_across_dst_gap() {
    pin_zone();
    let dir = tempfile::tempdir().unwrap();
    let tcx = write(
        dir.path(),
        "gap.tcx",
        &tcx_document(&[
            (at(1, 59, 0), Some(110)),
            (at(2, 10, 0), Some(120)),
            (at(2, 30, 0), Some(130)),
            (at(2, 50, 0), Some(140)),
        ]),
    );
    let gpx = write(
        dir.path(),
        "gap.gpx",
        &gpx_document(&[at(1, 59, 30), at(2, 29, 0), at(2, 49, 50)]),
    );

    let outcome = run(&MergeRequest::new(&gpx, &tcx), &MergeConfig::default()).unwrap();

    assert_eq!(merged_heart_rates(outcome), vec!["110", "130", "140"]);
}

#[test]
fn test_dst_gap_plausibility_uses_local_reading() {
    pin_zone();
    let dir = tempfile::tempdir().unwrap();
    let tcx = write(
        dir.path(),
        "gap.tcx",
        &tcx_document(&[(at(1, 59, 0), Some(110)), (at(2, 30, 0), Some(130))]),
    );
    let gpx = write(
        dir.path(),
        "gap.gpx",
        &gpx_document(&[at(1, 59, 20), at(2, 30, 40)]),
    );

    let outcome = run(&MergeRequest::new(&gpx, &tcx), &MergeConfig::default()).unwrap();

    match outcome {
        MergeOutcome::Merged { report, .. } => {
            assert_eq!((report.start_diff, report.end_diff), (20, 40));
        }
        other => panic!("expected merge, got {other:?}"),
    }
}
