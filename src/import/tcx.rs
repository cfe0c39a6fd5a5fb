//! TCX activity log reader: heart-rate extraction.

use super::ImportError;
use crate::merge::HeartRateTable;
use crate::timestamp::{to_epoch_seconds, TimeBasis};
use quick_xml::de::from_str;
use serde::Deserialize;

/// Heart-rate samples pulled from an activity log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeartRateExtraction {
    pub table: HeartRateTable,
    /// Trackpoints lacking a time or a heart-rate value
    pub skipped: usize,
}

/// Build the heart-rate table from TCX content.
///
/// Only the first activity is read. Trackpoints missing either the time
/// or the heart-rate value are skipped and counted.
pub fn extract_heart_rate(
    content: &str,
    basis: TimeBasis,
) -> Result<HeartRateExtraction, ImportError> {
    let tcx: TrainingCenterDatabase = from_str(content)
        .map_err(|e| ImportError::ParseError(format!("TCX parse error: {}", e)))?;

    let activity = tcx
        .activities
        .and_then(|a| a.activity.into_iter().next())
        .ok_or(ImportError::NoActivity)?;

    let mut table = HeartRateTable::new();
    let mut skipped = 0;

    let trackpoints = activity
        .lap
        .into_iter()
        .flat_map(|lap| lap.track)
        .flat_map(|track| track.trackpoint);

    for trackpoint in trackpoints {
        let time = trackpoint.time.filter(|t| !t.trim().is_empty());
        let heart_rate = trackpoint.heart_rate_bpm.and_then(|hr| hr.value);

        match (time, heart_rate) {
            (Some(time), Some(heart_rate)) => {
                let timestamp = to_epoch_seconds(&time, basis)?;
                table.insert(timestamp, heart_rate);
            }
            _ => skipped += 1,
        }
    }

    tracing::debug!(
        "Extracted {} heart-rate samples ({} trackpoints skipped)",
        table.len(),
        skipped
    );

    Ok(HeartRateExtraction { table, skipped })
}

// TCX XML structures

#[derive(Debug, Deserialize)]
#[serde(rename = "TrainingCenterDatabase")]
struct TrainingCenterDatabase {
    #[serde(rename = "Activities")]
    activities: Option<Activities>,
}

#[derive(Debug, Deserialize)]
struct Activities {
    #[serde(rename = "Activity", default)]
    activity: Vec<Activity>,
}

#[derive(Debug, Deserialize)]
struct Activity {
    #[serde(rename = "Lap", default)]
    lap: Vec<Lap>,
}

#[derive(Debug, Deserialize)]
struct Lap {
    #[serde(rename = "Track", default)]
    track: Vec<Track>,
}

#[derive(Debug, Deserialize)]
struct Track {
    #[serde(rename = "Trackpoint", default)]
    trackpoint: Vec<Trackpoint>,
}

#[derive(Debug, Deserialize)]
struct Trackpoint {
    #[serde(rename = "Time")]
    time: Option<String>,
    #[serde(rename = "HeartRateBpm")]
    heart_rate_bpm: Option<HeartRateBpm>,
}

#[derive(Debug, Deserialize)]
struct HeartRateBpm {
    #[serde(rename = "Value")]
    value: Option<u16>,
}
