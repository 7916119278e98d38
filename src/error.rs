//! Error types shared across the application.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Failed to enumerate monitors: {0}")]
    MonitorEnumeration(String),

    #[error("No monitors available")]
    NoMonitor,

    #[error("Screen capture failed: {0}")]
    CaptureFailed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to load font: {0}")]
    Font(String),

    #[error("Drawing surface error: {0}")]
    Surface(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Nothing to export: the image is empty")]
    EmptyImage,

    #[error("Upload endpoint is not configured")]
    NoEndpoint,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upload rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, thiserror::Error)]
pub enum PreferencesError {
    #[error("Failed to access preferences file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed preferences file: {0}")]
    Parse(#[from] serde_json::Error),
}
