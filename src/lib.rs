//! gpx-hr-merge - merge TCX heart rate into GPX tracks
//!
//! Reads the heart-rate samples of a TCX activity log, checks that they
//! were recorded over the same session as a GPX track, and attaches the
//! nearest sample to every track point as a Garmin TrackPointExtension.

pub mod config;
pub mod export;
pub mod import;
pub mod merge;
pub mod pipeline;
pub mod timestamp;
pub mod xml;

// Re-export commonly used types
pub use config::MergeConfig;
pub use import::gpx::Gpx;
pub use merge::{HeartRateTable, PlausibilityReport};
pub use pipeline::{run, MergeOutcome, MergeRequest, PipelineError};
pub use timestamp::TimeBasis;
