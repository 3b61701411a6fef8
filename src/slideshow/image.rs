//! Reading and classifying source images.

use super::error::{BuildError, Result};
use super::geometry::Resolution;
use super::resolution::read_resolution;
use crate::ooxml::pptx::format::ImageFormat;
use image::ImageReader;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::trace;

/// A source image read into memory, with what the slide needs to know about it.
#[derive(Debug, Clone)]
pub struct ProbedImage {
    pub path: PathBuf,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub resolution: Resolution,
    /// False when the file carried no resolution and the fallback was used
    pub resolution_recorded: bool,
    /// The original file contents; these are embedded unchanged
    pub bytes: Vec<u8>,
}

impl ProbedImage {
    /// File name without directories or extension, used as the picture's name
    /// and description.
    pub fn display_name(&self) -> String {
        self.path
            .file_stem()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Read an image file, classify it and decode its header.
pub fn probe(path: &Path, fallback_dpi: f64) -> Result<ProbedImage> {
    let bytes = std::fs::read(path).map_err(|source| BuildError::ImageRead {
        path: path.to_path_buf(),
        source,
    })?;
    probe_bytes(path, bytes, fallback_dpi)
}

/// Classify and decode an image already in memory; `path` is only used for naming.
pub fn probe_bytes(path: &Path, bytes: Vec<u8>, fallback_dpi: f64) -> Result<ProbedImage> {
    let format = ImageFormat::detect_from_bytes(&bytes).ok_or_else(|| BuildError::UnsupportedImage {
        path: path.to_path_buf(),
    })?;

    let (width, height) = ImageReader::with_format(Cursor::new(bytes.as_slice()), format.decoder_format())
        .into_dimensions()
        .map_err(|e| BuildError::InvalidImage {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let recorded = read_resolution(format, &bytes);
    let resolution = recorded.unwrap_or(Resolution::uniform(fallback_dpi));

    trace!(
        path = %path.display(),
        %format,
        width,
        height,
        x_dpi = resolution.x_dpi,
        y_dpi = resolution.y_dpi,
        "probed image"
    );

    Ok(ProbedImage {
        path: path.to_path_buf(),
        format,
        width,
        height,
        resolution,
        resolution_recorded: recorded.is_some(),
        bytes,
    })
}
