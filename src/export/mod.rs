//! Output of the merged track.

pub mod gpx;

use thiserror::Error;

/// Errors during export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// XML generation error
    #[error("XML error: {0}")]
    XmlError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
