//! Deck build configuration.

use super::error::{BuildError, Result};
use super::geometry::{MAX_HEIGHT_PX, MAX_WIDTH_PX, ScalePolicy};
use crate::ooxml::pptx::writer::slide::DEFAULT_PICTURE_OFFSET;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Build options for slide decks.
///
/// Every field has a default, so a configuration file only needs the keys it
/// changes.
///
/// # Examples
///
/// ```rust
/// use picdeck::slideshow::DeckOptions;
///
/// let options = DeckOptions::new()
///     .with_max_size(1280, 800)
///     .with_fallback_dpi(72.0)
///     .with_validation(false);
/// assert_eq!(options.max_width_px, 1280);
///
/// let options = DeckOptions::from_yaml_str("picture_offset_emu: 0\n")?;
/// assert_eq!(options.picture_offset_emu, 0);
/// assert_eq!(options.max_height_px, 720);
/// # Ok::<(), picdeck::slideshow::BuildError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckOptions {
    /// Pictures wider than this many pixels are scaled down
    pub max_width_px: u32,
    /// Pictures taller than this many pixels are scaled down
    pub max_height_px: u32,
    /// Distance of the picture from the slide's top-left corner, in EMUs
    pub picture_offset_emu: i64,
    /// Resolution assumed for images that do not record one
    pub fallback_dpi: f64,
    /// Run the structural validator on the finished deck
    pub validate: bool,
}

impl Default for DeckOptions {
    fn default() -> Self {
        Self {
            max_width_px: MAX_WIDTH_PX,
            max_height_px: MAX_HEIGHT_PX,
            picture_offset_emu: DEFAULT_PICTURE_OFFSET,
            fallback_dpi: 96.0,
            validate: true,
        }
    }
}

impl DeckOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pixel bounds applied before converting to EMUs.
    #[inline]
    pub fn with_max_size(mut self, width: u32, height: u32) -> Self {
        self.max_width_px = width;
        self.max_height_px = height;
        self
    }

    #[inline]
    pub fn with_picture_offset(mut self, offset_emu: i64) -> Self {
        self.picture_offset_emu = offset_emu;
        self
    }

    #[inline]
    pub fn with_fallback_dpi(mut self, dpi: f64) -> Self {
        self.fallback_dpi = dpi;
        self
    }

    #[inline]
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// The scaling bounds as used by the geometry calculator.
    #[inline]
    pub fn scale_policy(&self) -> ScalePolicy {
        ScalePolicy {
            max_width: self.max_width_px,
            max_height: self.max_height_px,
        }
    }

    /// Parse options from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let options: Self = serde_saphyr::from_str(yaml)
            .map_err(|e| BuildError::Config(format!("Failed to parse options: {}", e)))?;
        options.check()?;
        Ok(options)
    }

    /// Load options from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| BuildError::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&yaml)
    }

    /// Serialize options to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self)
            .map_err(|e| BuildError::Config(format!("Failed to serialize options: {}", e)))
    }

    fn check(&self) -> Result<()> {
        if self.max_width_px == 0 || self.max_height_px == 0 {
            return Err(BuildError::Config(format!(
                "maximum picture size must be positive, got {}x{}",
                self.max_width_px, self.max_height_px
            )));
        }
        if !(self.fallback_dpi > 0.0 && self.fallback_dpi.is_finite()) {
            return Err(BuildError::Config(format!(
                "fallback_dpi must be positive, got {}",
                self.fallback_dpi
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = DeckOptions::default();
        assert_eq!(options.scale_policy(), ScalePolicy::default());
        assert_eq!(options.picture_offset_emu, 100);
        assert_eq!(options.fallback_dpi, 96.0);
        assert!(options.validate);
    }

    #[test]
    fn test_partial_yaml() {
        let options = DeckOptions::from_yaml_str("max_width_px: 2048\nvalidate: false\n").unwrap();
        assert_eq!(options.max_width_px, 2048);
        assert_eq!(options.max_height_px, 720);
        assert!(!options.validate);
    }

    #[test]
    fn test_yaml_round_trip() {
        let options = DeckOptions::new().with_picture_offset(0).with_fallback_dpi(300.0);
        let yaml = options.to_yaml().unwrap();
        assert_eq!(DeckOptions::from_yaml_str(&yaml).unwrap(), options);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            DeckOptions::from_yaml_str("fallback_dpi: 0\n"),
            Err(BuildError::Config(_))
        ));
        assert!(matches!(
            DeckOptions::from_yaml_str("max_height_px: 0\n"),
            Err(BuildError::Config(_))
        ));
        assert!(matches!(
            DeckOptions::from_yaml_str("max_width_px: [1, 2]\n"),
            Err(BuildError::Config(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.yaml");
        std::fs::write(&path, "fallback_dpi: 150.0\n").unwrap();
        assert_eq!(DeckOptions::from_yaml_file(&path).unwrap().fallback_dpi, 150.0);
        assert!(DeckOptions::from_yaml_file(dir.path().join("missing.yaml")).is_err());
    }
}
