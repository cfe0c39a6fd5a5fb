//! Core types for heart-rate merging.

use crate::timestamp::TimestampError;
use std::collections::HashMap;
use thiserror::Error;

/// A single heart-rate sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimePoint {
    /// Epoch seconds
    pub timestamp: i64,
    /// Heart rate in bpm
    pub heart_rate: u16,
}

/// Heart-rate samples keyed by epoch seconds, in insertion order.
///
/// Re-inserting a known timestamp replaces its value but keeps the slot
/// it was first inserted at, so `first`/`last` always refer to document
/// order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeartRateTable {
    entries: Vec<TimePoint>,
    index: HashMap<i64, usize>,
}

impl HeartRateTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a sample. Returns the replaced bpm for a known timestamp.
    pub fn insert(&mut self, timestamp: i64, heart_rate: u16) -> Option<u16> {
        match self.index.get(&timestamp) {
            Some(&slot) => {
                let previous = self.entries[slot].heart_rate;
                self.entries[slot].heart_rate = heart_rate;
                Some(previous)
            }
            None => {
                self.index.insert(timestamp, self.entries.len());
                self.entries.push(TimePoint {
                    timestamp,
                    heart_rate,
                });
                None
            }
        }
    }

    /// Heart rate recorded at exactly `timestamp`.
    pub fn get(&self, timestamp: i64) -> Option<u16> {
        self.index
            .get(&timestamp)
            .map(|&slot| self.entries[slot].heart_rate)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First sample in insertion order.
    pub fn first(&self) -> Option<TimePoint> {
        self.entries.first().copied()
    }

    /// Last sample in insertion order.
    pub fn last(&self) -> Option<TimePoint> {
        self.entries.last().copied()
    }

    /// Samples in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TimePoint> {
        self.entries.iter()
    }

    /// Sample whose timestamp is closest to `timestamp`.
    ///
    /// Full linear scan in insertion order; on equal distance the sample
    /// met first wins.
    pub fn nearest(&self, timestamp: i64) -> Option<TimePoint> {
        let mut best: Option<(u64, TimePoint)> = None;

        for point in self.iter() {
            let distance = point.timestamp.abs_diff(timestamp);
            match best {
                Some((best_distance, _)) if distance >= best_distance => {}
                _ => best = Some((distance, *point)),
            }
        }

        best.map(|(_, point)| point)
    }
}

impl FromIterator<(i64, u16)> for HeartRateTable {
    fn from_iter<I: IntoIterator<Item = (i64, u16)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (timestamp, heart_rate) in iter {
            table.insert(timestamp, heart_rate);
        }
        table
    }
}

/// Errors from the plausibility check and the merge pass.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("No heart-rate samples with both time and value in activity log")]
    EmptyHeartRateTable,

    #[error("GPX file contains no track points")]
    NoTrackPoints,

    #[error("Track point has no time (track {track}, segment {segment}, point {point})")]
    MissingTime {
        track: usize,
        segment: usize,
        point: usize,
    },

    #[error(transparent)]
    Timestamp(#[from] TimestampError),
}
