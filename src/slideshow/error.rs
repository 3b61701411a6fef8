/// Error types for slide show builds.
use crate::ooxml::error::OoxmlError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for slide show builds.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Fatal build errors. Structural validation findings are not errors; they
/// are returned in the build report.
#[derive(Error, Debug)]
pub enum BuildError {
    /// The template is missing, unreadable, or lacks a slide master or layout
    #[error("Template error: {0}")]
    Template(String),

    #[error("Cannot read image {}: {source}", path.display())]
    ImageRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unsupported image file format: {}", path.display())]
    UnsupportedImage { path: PathBuf },

    #[error("Invalid image {}: {reason}", path.display())]
    InvalidImage { path: PathBuf, reason: String },

    /// The next slide id would leave the valid slide id range
    #[error("No slide ids left: next id would be {next}")]
    Capacity { next: u64 },

    #[error("Relationship id '{r_id}' is already used by the presentation")]
    RelationshipCollision { r_id: String },

    #[error("Configuration error: {0}")]
    Config(String),

    /// The background task panicked or was aborted
    #[error("Build task failed: {0}")]
    Task(String),

    #[error("Package error: {0}")]
    Package(#[from] OoxmlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// The image a per-image error is about.
    pub fn image_path(&self) -> Option<&std::path::Path> {
        match self {
            Self::ImageRead { path, .. }
            | Self::UnsupportedImage { path }
            | Self::InvalidImage { path, .. } => Some(path),
            _ => None,
        }
    }
}
