//! Nearest-match merge of heart-rate samples into GPX track points.

use super::types::{HeartRateTable, MergeError};
use crate::import::gpx::{Gpx, TrackPoint};
use crate::timestamp::{to_epoch_seconds, TimeBasis};
use crate::xml::XmlElement;

/// Garmin TrackPointExtension namespace.
pub const TRACKPOINT_EXTENSION_NS: &str = "http://www.garmin.com/xmlschemas/TrackPointExtension/v1";

/// Prefix declared for [`TRACKPOINT_EXTENSION_NS`] when the file has none.
pub const TRACKPOINT_EXTENSION_PREFIX: &str = "gpxtpx";

/// Counts from a merge pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeSummary {
    pub tracks: usize,
    pub points: usize,
}

/// Epoch seconds of a track point.
fn point_epoch(
    point: &TrackPoint,
    basis: TimeBasis,
    position: (usize, usize, usize),
) -> Result<i64, MergeError> {
    let (track, segment, index) = position;
    let time = point.time().ok_or(MergeError::MissingTime {
        track,
        segment,
        point: index,
    })?;
    Ok(to_epoch_seconds(&time, basis)?)
}

/// Epoch seconds of the first and last track point in document order.
pub fn time_range(gpx: &Gpx, basis: TimeBasis) -> Result<(i64, i64), MergeError> {
    let mut located = gpx.tracks.iter().enumerate().flat_map(|(t, track)| {
        track.segments.iter().enumerate().flat_map(move |(s, segment)| {
            segment
                .points
                .iter()
                .enumerate()
                .map(move |(p, point)| ((t, s, p), point))
        })
    });

    let (first_pos, first) = located.next().ok_or(MergeError::NoTrackPoints)?;
    let (last_pos, last) = located.last().unwrap_or((first_pos, first));

    Ok((
        point_epoch(first, basis, first_pos)?,
        point_epoch(last, basis, last_pos)?,
    ))
}

/// `<P:TrackPointExtension><P:hr>BPM</P:hr></P:TrackPointExtension>`
pub fn heart_rate_extension(prefix: &str, heart_rate: u16) -> XmlElement {
    let mut block = XmlElement::new(format!("{}:TrackPointExtension", prefix));
    block.push(XmlElement::with_text(
        format!("{}:hr", prefix),
        heart_rate.to_string(),
    ));
    block
}

/// Attach the nearest heart-rate sample to every track point.
///
/// Every point gets exactly one new extension block, however far away its
/// nearest sample is. Existing extensions are left in place.
pub fn merge_heart_rate(
    gpx: &mut Gpx,
    table: &HeartRateTable,
    basis: TimeBasis,
) -> Result<MergeSummary, MergeError> {
    let prefix = gpx.ensure_namespace(TRACKPOINT_EXTENSION_NS, TRACKPOINT_EXTENSION_PREFIX);
    let mut summary = MergeSummary::default();

    for (t, track) in gpx.tracks.iter_mut().enumerate() {
        tracing::info!(
            "Merging heart rate into track {}",
            track.name().unwrap_or_default()
        );

        for (s, segment) in track.segments.iter_mut().enumerate() {
            for (p, point) in segment.points.iter_mut().enumerate() {
                let timestamp = point_epoch(point, basis, (t, s, p))?;
                let nearest = table
                    .nearest(timestamp)
                    .ok_or(MergeError::EmptyHeartRateTable)?;
                point.push_extension(heart_rate_extension(&prefix, nearest.heart_rate));
                summary.points += 1;
            }
        }

        summary.tracks += 1;
        tracing::info!("done");
    }

    Ok(summary)
}
