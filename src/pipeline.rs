//! End-to-end merge of one activity log into one GPX track.
//!
//! Steps run strictly in sequence: read both files, check their root
//! elements, extract heart rate, parse the track, gate on plausibility,
//! merge, write. Nothing is written unless every step succeeds.

use crate::config::{ConfigError, MergeConfig};
use crate::export::gpx::save_gpx;
use crate::export::ExportError;
use crate::import::gpx::parse_gpx;
use crate::import::tcx::extract_heart_rate;
use crate::import::{read_input, validate_root, FileFormat, ImportError};
use crate::merge::{
    check_plausibility, merge_heart_rate, time_range, MergeError, MergeSummary,
    PlausibilityReport,
};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Exit status for a file whose root element does not match its role.
pub const EXIT_INVALID_FORMAT: u8 = 3;

/// Exit status for every other failure.
pub const EXIT_FAILURE: u8 = 1;

/// Input and output locations for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    /// GPX file with the track
    pub track: PathBuf,
    /// TCX file with heart rate
    pub cardio: PathBuf,
    /// Output override; derived from `track` when `None`
    pub output: Option<PathBuf>,
}

impl MergeRequest {
    pub fn new(track: impl Into<PathBuf>, cardio: impl Into<PathBuf>) -> Self {
        Self {
            track: track.into(),
            cardio: cardio.into(),
            output: None,
        }
    }

    /// Where the merged file goes.
    pub fn output_path(&self, config: &MergeConfig) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| derive_output_path(&self.track, &config.output_suffix))
    }
}

/// Append `suffix` to the full file name, e.g. `ride.gpx` → `ride.gpx.new.gpx`.
pub fn derive_output_path(track: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(track.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Result of a run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Heart rate merged and written
    Merged {
        output: PathBuf,
        report: PlausibilityReport,
        summary: MergeSummary,
        /// Activity-log trackpoints without time or heart rate
        skipped: usize,
    },
    /// The recordings do not line up; nothing written
    Rejected(PlausibilityReport),
}

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Refusing to overwrite input file {0}")]
    WouldOverwriteInput(PathBuf),
}

impl PipelineError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Import(ImportError::InvalidFormat { .. }) => EXIT_INVALID_FORMAT,
            _ => EXIT_FAILURE,
        }
    }
}

/// Run one merge.
pub fn run(request: &MergeRequest, config: &MergeConfig) -> Result<MergeOutcome, PipelineError> {
    config.validate()?;

    let output = request.output_path(config);
    if output == request.track || output == request.cardio {
        return Err(PipelineError::WouldOverwriteInput(output));
    }

    let tcx_content = read_input(&request.cardio)?;
    let gpx_content = read_input(&request.track)?;

    validate_root(&request.cardio, &tcx_content, FileFormat::Tcx)?;
    validate_root(&request.track, &gpx_content, FileFormat::Gpx)?;

    let extraction = extract_heart_rate(&tcx_content, config.time_basis)?;
    if extraction.table.is_empty() {
        return Err(MergeError::EmptyHeartRateTable.into());
    }
    tracing::info!(
        "{}: {} heart-rate samples",
        request.cardio.display(),
        extraction.table.len()
    );

    let mut gpx = parse_gpx(&gpx_content)?;
    let (first, last) = time_range(&gpx, config.time_basis)?;

    let report = check_plausibility(
        &extraction.table,
        first,
        last,
        config.plausibility_threshold_secs,
    )?;
    if !report.passed {
        tracing::warn!(
            "{} and {} do not describe the same session; nothing written",
            request.track.display(),
            request.cardio.display()
        );
        return Ok(MergeOutcome::Rejected(report));
    }

    let summary = merge_heart_rate(&mut gpx, &extraction.table, config.time_basis)?;
    save_gpx(&gpx, &output)?;

    Ok(MergeOutcome::Merged {
        output,
        report,
        summary,
        skipped: extraction.skipped,
    })
}
