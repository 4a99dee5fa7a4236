//! Error types for mdpdf

use thiserror::Error;

/// Result type alias using mdpdf's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while exporting a preview
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding/encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Remote resource could not be fetched
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Page geometry leaves no room for content
    #[error("Layout failed: {0}")]
    Layout(String),

    /// Export failed
    #[error("Export failed: {0}")]
    Export(String),

    /// The background export job panicked or was torn down
    #[error("Export task failed: {0}")]
    JobFailed(String),
}
