//! Unit conversion utilities.
//!
//! DrawingML positions and sizes are expressed in English Metric Units (EMU).
//! Image resolutions arrive in whatever unit the file format stores them in,
//! so the helpers here normalise them to dots per inch first.

pub const EMUS_PER_INCH: i64 = 914_400;

/// Upper bound of `ST_PositiveCoordinate`, the type of `a:ext` `cx`/`cy`.
pub const MAX_POSITIVE_COORDINATE: i64 = 27_273_042_316_900;

/// Centimetres per inch, used for per-centimetre and per-metre resolutions.
pub const CM_PER_INCH: f64 = 2.54;

/// Convert a pixel count at a given resolution to EMUs, rounding to the nearest unit.
///
/// `dpi` must be positive; callers validate it before converting.
///
/// # Examples
///
/// ```
/// use picdeck::common::unit::px_to_emu;
/// assert_eq!(px_to_emu(96, 96.0), 914_400);
/// assert_eq!(px_to_emu(1, 72.0), 12_700);
/// ```
#[inline]
pub fn px_to_emu(px: u64, dpi: f64) -> i64 {
    (px as f64 / dpi * EMUS_PER_INCH as f64).round() as i64
}

/// Convert pixels per metre (PNG `pHYs`, BMP headers) to dots per inch.
#[inline]
pub fn pixels_per_meter_to_dpi(ppm: u32) -> f64 {
    ppm as f64 * CM_PER_INCH / 100.0
}

/// Convert dots per centimetre (JFIF units = 2, TIFF unit = 3) to dots per inch.
#[inline]
pub fn dots_per_cm_to_dpi(dpcm: f64) -> f64 {
    dpcm * CM_PER_INCH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_px_to_emu() {
        assert_eq!(px_to_emu(1024, 96.0), 9_753_600);
        assert_eq!(px_to_emu(720, 72.0), 9_144_000);
        // 100 px at 300 dpi is 304800.0 exactly
        assert_eq!(px_to_emu(100, 300.0), 304_800);
    }

    #[test]
    fn test_px_to_emu_rounds() {
        // 1 px at 7 dpi = 130628.57...
        assert_eq!(px_to_emu(1, 7.0), 130_629);
    }

    #[test]
    fn test_resolution_units() {
        // 3780 px/m is the usual encoding of 96 dpi
        assert!((pixels_per_meter_to_dpi(3780) - 96.012).abs() < 1e-9);
        assert!((dots_per_cm_to_dpi(118.11) - 299.9994).abs() < 1e-4);
    }
}
