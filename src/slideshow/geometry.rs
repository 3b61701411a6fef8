//! Picture placement geometry.
//!
//! Pixel sizes are first bounded by the scaling policy, then converted to
//! EMUs with the image's resolution. The two bounding passes run in order and
//! both use the original width, so very wide or very tall pictures do not
//! keep their aspect ratio:
//!
//! - width above the limit: `height = round(height * width0 / max_width)`,
//!   then `width = max_width`
//! - height (possibly already rescaled) above the limit:
//!   `width = round(height * width0 / max_height)`, then `height = max_height`
//!
//! 2048x1080 therefore becomes 1024x2160 and then 6144x720.

use crate::common::unit::{MAX_POSITIVE_COORDINATE, px_to_emu};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default pixel width bound.
pub const MAX_WIDTH_PX: u32 = 1024;

/// Default pixel height bound.
pub const MAX_HEIGHT_PX: u32 = 720;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("resolution must be positive, got {x_dpi}x{y_dpi} dpi")]
    NonPositiveResolution { x_dpi: f64, y_dpi: f64 },

    #[error("scaling bounds must be positive, got {max_width}x{max_height}")]
    InvalidBounds { max_width: u32, max_height: u32 },

    #[error("rescaled size of a {width}x{height} px image does not fit in 64 bits")]
    PixelOverflow { width: u32, height: u32 },

    #[error("picture size {cx}x{cy} EMU is outside [1, 27273042316900]")]
    ExtentOutOfRange { cx: i64, cy: i64 },
}

/// Pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u64,
    pub height: u64,
}

/// Horizontal and vertical resolution in dots per inch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub x_dpi: f64,
    pub y_dpi: f64,
}

impl Resolution {
    pub fn uniform(dpi: f64) -> Self {
        Self { x_dpi: dpi, y_dpi: dpi }
    }
}

/// Pixel bounds applied before conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalePolicy {
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for ScalePolicy {
    fn default() -> Self {
        Self {
            max_width: MAX_WIDTH_PX,
            max_height: MAX_HEIGHT_PX,
        }
    }
}

/// Final placement size of one picture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Pixel size after bounding
    pub pixels: PixelSize,
    /// Width in EMUs
    pub cx: i64,
    /// Height in EMUs
    pub cy: i64,
}

/// `round(a * b / d)` in integers, halves rounding up. `None` when the
/// result does not fit in a `u64`.
#[inline]
fn mul_div_round(a: u64, b: u64, d: u64) -> Option<u64> {
    let product = u128::from(a) * u128::from(b);
    let rounded = (product + u128::from(d) / 2) / u128::from(d);
    u64::try_from(rounded).ok()
}

/// Apply the two bounding passes to a pixel size.
pub fn bound_pixels(width: u32, height: u32, policy: ScalePolicy) -> Result<PixelSize, GeometryError> {
    if width == 0 || height == 0 {
        return Err(GeometryError::EmptyImage { width, height });
    }
    if policy.max_width == 0 || policy.max_height == 0 {
        return Err(GeometryError::InvalidBounds {
            max_width: policy.max_width,
            max_height: policy.max_height,
        });
    }

    let original_width = u64::from(width);
    let max_width = u64::from(policy.max_width);
    let max_height = u64::from(policy.max_height);

    let overflow = || GeometryError::PixelOverflow { width, height };

    let mut w = original_width;
    let mut h = u64::from(height);

    if w > max_width {
        h = mul_div_round(h, original_width, max_width).ok_or_else(overflow)?;
        w = max_width;
    }

    if h > max_height {
        w = mul_div_round(h, original_width, max_height).ok_or_else(overflow)?;
        h = max_height;
    }

    Ok(PixelSize {
        width: w,
        height: h,
    })
}

/// Compute the placement geometry for a picture.
///
/// # Examples
///
/// ```rust
/// use picdeck::slideshow::geometry::{Resolution, ScalePolicy, compute_geometry};
///
/// let g = compute_geometry(2048, 1080, Resolution::uniform(96.0), ScalePolicy::default())?;
/// assert_eq!((g.pixels.width, g.pixels.height), (6144, 720));
/// assert_eq!((g.cx, g.cy), (58_521_600, 6_858_000));
/// # Ok::<(), picdeck::slideshow::geometry::GeometryError>(())
/// ```
pub fn compute_geometry(
    width: u32,
    height: u32,
    resolution: Resolution,
    policy: ScalePolicy,
) -> Result<Geometry, GeometryError> {
    let Resolution { x_dpi, y_dpi } = resolution;
    // NaN fails this check as well
    if !(x_dpi > 0.0 && y_dpi > 0.0) || !x_dpi.is_finite() || !y_dpi.is_finite() {
        return Err(GeometryError::NonPositiveResolution { x_dpi, y_dpi });
    }

    let pixels = bound_pixels(width, height, policy)?;

    let cx = px_to_emu(pixels.width, x_dpi);
    let cy = px_to_emu(pixels.height, y_dpi);
    let in_range = |emu: i64| (1..=MAX_POSITIVE_COORDINATE).contains(&emu);
    if !in_range(cx) || !in_range(cy) {
        return Err(GeometryError::ExtentOutOfRange { cx, cy });
    }

    Ok(Geometry { pixels, cx, cy })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dpi96() -> Resolution {
        Resolution::uniform(96.0)
    }

    #[test]
    fn test_two_pass_rescale() {
        let px = bound_pixels(2048, 1080, ScalePolicy::default()).unwrap();
        assert_eq!(
            px,
            PixelSize {
                width: 6144,
                height: 720
            }
        );
    }

    #[test]
    fn test_width_pass_only() {
        // 2000x600 -> height 600*2000/1024 = 1171.875 -> 1172, then the height pass
        let px = bound_pixels(2000, 600, ScalePolicy::default()).unwrap();
        assert_eq!(px.height, 720);
        assert_eq!(px.width, 3256);

        // 1100x300 -> height 300*1100/1024 = 322.27 -> 322, no height pass
        let px = bound_pixels(1100, 300, ScalePolicy::default()).unwrap();
        assert_eq!(
            px,
            PixelSize {
                width: 1024,
                height: 322
            }
        );
    }

    #[test]
    fn test_height_pass_only() {
        // 800x1000 -> width 1000*800/720 = 1111.1 -> 1111
        let px = bound_pixels(800, 1000, ScalePolicy::default()).unwrap();
        assert_eq!(
            px,
            PixelSize {
                width: 1111,
                height: 720
            }
        );
    }

    #[test]
    fn test_rounding_half_up() {
        // 1025x512: 512*1025/1024 = 512.5 -> 513
        let px = bound_pixels(1025, 512, ScalePolicy::default()).unwrap();
        assert_eq!(px.height, 513);
    }

    #[test]
    fn test_emu_conversion() {
        let g = compute_geometry(960, 720, dpi96(), ScalePolicy::default()).unwrap();
        assert_eq!(g.cx, 9_144_000);
        assert_eq!(g.cy, 6_858_000);

        let g = compute_geometry(300, 150, Resolution { x_dpi: 300.0, y_dpi: 150.0 }, ScalePolicy::default())
            .unwrap();
        assert_eq!(g.cx, 914_400);
        assert_eq!(g.cy, 914_400);
    }

    #[test]
    fn test_rejects_bad_resolution() {
        for dpi in [0.0, -72.0, f64::NAN, f64::INFINITY] {
            let err = compute_geometry(10, 10, Resolution::uniform(dpi), ScalePolicy::default())
                .unwrap_err();
            assert!(matches!(err, GeometryError::NonPositiveResolution { .. }));
        }
        let err = compute_geometry(10, 10, Resolution { x_dpi: 96.0, y_dpi: 0.0 }, ScalePolicy::default())
            .unwrap_err();
        assert!(matches!(err, GeometryError::NonPositiveResolution { .. }));
    }

    #[test]
    fn test_rejects_empty_image_and_bounds() {
        assert!(matches!(
            compute_geometry(0, 10, dpi96(), ScalePolicy::default()),
            Err(GeometryError::EmptyImage { .. })
        ));
        let policy = ScalePolicy {
            max_width: 0,
            max_height: 720,
        };
        assert!(matches!(
            bound_pixels(10, 10, policy),
            Err(GeometryError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn test_rejects_vanishing_extent() {
        // 1 px at an absurd resolution rounds to zero EMUs
        let err = compute_geometry(1, 1, Resolution::uniform(1e9), ScalePolicy::default()).unwrap_err();
        assert!(matches!(err, GeometryError::ExtentOutOfRange { .. }));
    }

    #[test]
    fn test_rejects_oversized_extent() {
        // 300000 px wide: the height pass widens it to 36621093750 px
        let px = bound_pixels(300_000, 300_000, ScalePolicy::default()).unwrap();
        assert_eq!(px.width, 36_621_093_750);

        let err = compute_geometry(300_000, 300_000, dpi96(), ScalePolicy::default()).unwrap_err();
        assert_eq!(
            err,
            GeometryError::ExtentOutOfRange {
                cx: 348_815_917_968_750,
                cy: 6_858_000
            }
        );
    }

    #[test]
    fn test_pixel_overflow_is_an_error() {
        // With 1x1 bounds the second pass multiplies two values near 2^32
        let policy = ScalePolicy {
            max_width: 1,
            max_height: 1,
        };
        let err = bound_pixels(u32::MAX, u32::MAX, policy).unwrap_err();
        assert_eq!(
            err,
            GeometryError::PixelOverflow {
                width: u32::MAX,
                height: u32::MAX
            }
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_small_images_keep_their_size(w in 1u32..=1024, h in 1u32..=720) {
            let px = bound_pixels(w, h, ScalePolicy::default()).unwrap();
            prop_assert_eq!(px, PixelSize { width: u64::from(w), height: u64::from(h) });
        }

        #[test]
        fn prop_height_is_bounded(w in 1u32..20_000, h in 1u32..20_000) {
            let px = bound_pixels(w, h, ScalePolicy::default()).unwrap();
            prop_assert!(px.height <= u64::from(MAX_HEIGHT_PX));
            prop_assert!(px.width > 0 && px.height > 0);
        }

        #[test]
        fn prop_geometry_is_pure(w in 1u32..10_000, h in 1u32..10_000, dpi in 1.0f64..1200.0) {
            let a = compute_geometry(w, h, Resolution::uniform(dpi), ScalePolicy::default()).unwrap();
            let b = compute_geometry(w, h, Resolution::uniform(dpi), ScalePolicy::default()).unwrap();
            prop_assert_eq!(a, b);
            prop_assert!(a.cx > 0 && a.cy > 0);
        }
    }
}
