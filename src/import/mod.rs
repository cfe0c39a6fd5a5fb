//! Input file handling for the activity log (TCX) and the track (GPX).
//!
//! Both inputs are read whole into memory. The root element is checked
//! before anything else is parsed so that a swapped or foreign file is
//! rejected early.

pub mod gpx;
pub mod tcx;

use crate::timestamp::TimestampError;
use crate::xml::{root_local_name, XmlError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading an input file
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("{path} is not a valid {expected} file (root element <{found}>)")]
    InvalidFormat {
        path: PathBuf,
        expected: FileFormat,
        found: String,
    },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("No activity found in TCX file")]
    NoActivity,

    #[error(transparent)]
    Xml(#[from] XmlError),

    #[error(transparent)]
    Timestamp(#[from] TimestampError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Gpx,
    Tcx,
}

impl FileFormat {
    /// Local name the document root must carry.
    pub fn root_element(self) -> &'static str {
        match self {
            FileFormat::Gpx => "gpx",
            FileFormat::Tcx => "TrainingCenterDatabase",
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileFormat::Gpx => write!(f, "GPX"),
            FileFormat::Tcx => write!(f, "TCX"),
        }
    }
}

/// Read an input file as UTF-8 text.
pub fn read_input(path: &Path) -> Result<String, ImportError> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.to_path_buf()));
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Check that `content` has the root element expected for `format`.
///
/// A document that is not XML at all is reported as a format mismatch
/// too, with an empty root name.
pub fn validate_root(path: &Path, content: &str, format: FileFormat) -> Result<(), ImportError> {
    let found = match root_local_name(content) {
        Ok(name) => name,
        Err(XmlError::Empty) => String::new(),
        Err(e) => {
            tracing::debug!("Root sniff of {} failed: {}", path.display(), e);
            String::new()
        }
    };

    if found == format.root_element() {
        Ok(())
    } else {
        Err(ImportError::InvalidFormat {
            path: path.to_path_buf(),
            expected: format,
            found,
        })
    }
}
