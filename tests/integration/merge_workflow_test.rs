//! Integration tests for the merge workflow

use super::fixtures::{gpx_document, tcx_document, utc_config, write};
use gpx_hr_merge::import::gpx::parse_gpx;
use gpx_hr_merge::import::{FileFormat, ImportError};
use gpx_hr_merge::merge::MergeError;
use gpx_hr_merge::pipeline::{run, MergeOutcome, MergeRequest, PipelineError, EXIT_INVALID_FORMAT};
use std::fs;

fn heart_rates(content: &str) -> Vec<String> {
    let gpx = parse_gpx(content).unwrap();
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
fn test_merge_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let tcx = write(
        dir.path(),
        "ride.tcx",
        &tcx_document(&[(100, Some(120)), (160, Some(130)), (220, Some(140))]),
    );
    let gpx = write(dir.path(), "ride.gpx", &gpx_document(&[105, 215]));

    let outcome = run(&MergeRequest::new(&gpx, &tcx), &utc_config()).unwrap();

    let (output, report, summary, skipped) = match outcome {
        MergeOutcome::Merged {
            output,
            report,
            summary,
            skipped,
        } => (output, report, summary, skipped),
        other => panic!("expected merge, got {other:?}"),
    };
    assert_eq!(output, dir.path().join("ride.gpx.new.gpx"));
    assert_eq!((report.start_diff, report.end_diff), (5, 5));
    assert_eq!(summary.points, 2);
    assert_eq!(skipped, 0);

    let merged = fs::read_to_string(&output).unwrap();
    assert_eq!(heart_rates(&merged), vec!["120", "140"]);
    assert!(merged.contains("http://www.garmin.com/xmlschemas/TrackPointExtension/v1"));
}

#[test]
fn test_input_left_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let original = gpx_document(&[105, 215]);
    let tcx = write(
        dir.path(),
        "ride.tcx",
        &tcx_document(&[(100, Some(120)), (220, Some(140))]),
    );
    let gpx = write(dir.path(), "ride.gpx", &original);

    run(&MergeRequest::new(&gpx, &tcx), &utc_config()).unwrap();

    assert_eq!(fs::read_to_string(&gpx).unwrap(), original);
}

#[test]
fn test_point_count_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let times: Vec<i64> = (0..300).map(|i| 1_000 + i * 3).collect();
    let samples: Vec<(i64, Option<u16>)> = (0..180)
        .map(|i| (1_000 + i * 5, Some(100 + (i % 60) as u16)))
        .collect();
    let tcx = write(dir.path(), "long.tcx", &tcx_document(&samples));
    let gpx = write(dir.path(), "long.gpx", &gpx_document(&times));

    let outcome = run(&MergeRequest::new(&gpx, &tcx), &utc_config()).unwrap();
    let output = match outcome {
        MergeOutcome::Merged { output, .. } => output,
        other => panic!("expected merge, got {other:?}"),
    };

    let merged = parse_gpx(&fs::read_to_string(output).unwrap()).unwrap();
    assert_eq!(merged.point_count(), times.len());
    assert!(merged
        .points()
        .all(|p| p.extension_blocks("TrackPointExtension").count() == 1));
}

#[test]
fn test_mismatched_sessions_write_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let tcx = write(
        dir.path(),
        "ride.tcx",
        &tcx_document(&[(100, Some(120)), (220, Some(140))]),
    );
    let gpx = write(dir.path(), "ride.gpx", &gpx_document(&[160, 215]));

    let outcome = run(&MergeRequest::new(&gpx, &tcx), &utc_config()).unwrap();

    match outcome {
        MergeOutcome::Rejected(report) => {
            assert_eq!(report.start_diff, 60);
            assert!(!report.passed);
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert!(!dir.path().join("ride.gpx.new.gpx").exists());
}

#[test]
fn test_wrong_gpx_root_fails_before_extraction() {
    let dir = tempfile::tempdir().unwrap();
    // An activity log that would fail extraction if it were ever read.
    let tcx = write(
        dir.path(),
        "ride.tcx",
        r#"<TrainingCenterDatabase><Activities/></TrainingCenterDatabase>"#,
    );
    let gpx = write(dir.path(), "ride.gpx", r#"<kml><Document/></kml>"#);

    let err = run(&MergeRequest::new(&gpx, &tcx), &utc_config()).unwrap_err();

    match &err {
        PipelineError::Import(ImportError::InvalidFormat {
            expected, found, ..
        }) => {
            assert_eq!(*expected, FileFormat::Gpx);
            assert_eq!(found, "kml");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.exit_code(), EXIT_INVALID_FORMAT);
    assert!(!dir.path().join("ride.gpx.new.gpx").exists());
}

#[test]
fn test_swapped_arguments_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let tcx = write(
        dir.path(),
        "ride.tcx",
        &tcx_document(&[(100, Some(120)), (220, Some(140))]),
    );
    let gpx = write(dir.path(), "ride.gpx", &gpx_document(&[105, 215]));

    let err = run(&MergeRequest::new(&tcx, &gpx), &utc_config()).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Import(ImportError::InvalidFormat {
            expected: FileFormat::Tcx,
            ..
        })
    ));
}

#[test]
fn test_no_heart_rate_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let tcx = write(
        dir.path(),
        "ride.tcx",
        &tcx_document(&[(100, None), (220, None)]),
    );
    let gpx = write(dir.path(), "ride.gpx", &gpx_document(&[105, 215]));

    let err = run(&MergeRequest::new(&gpx, &tcx), &utc_config()).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Merge(MergeError::EmptyHeartRateTable)
    ));
}

#[test]
fn test_skipped_points_reported() {
    let dir = tempfile::tempdir().unwrap();
    let tcx = write(
        dir.path(),
        "ride.tcx",
        &tcx_document(&[(100, Some(120)), (160, None), (220, Some(140))]),
    );
    let gpx = write(dir.path(), "ride.gpx", &gpx_document(&[105, 215]));

    let outcome = run(&MergeRequest::new(&gpx, &tcx), &utc_config()).unwrap();
    assert!(matches!(outcome, MergeOutcome::Merged { skipped: 1, .. }));
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let gpx = write(dir.path(), "ride.gpx", &gpx_document(&[105, 215]));

    let err = run(
        &MergeRequest::new(&gpx, dir.path().join("absent.tcx")),
        &utc_config(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Import(ImportError::FileNotFound(_))
    ));
}
