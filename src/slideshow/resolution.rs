//! Resolution metadata from image headers.
//!
//! Only the containers' own resolution fields are read; EXIF blocks are not.
//! `None` means the file does not say, and the caller falls back to a default.

use super::geometry::Resolution;
use crate::common::unit::{CM_PER_INCH, dots_per_cm_to_dpi, pixels_per_meter_to_dpi};
use crate::ooxml::pptx::format::ImageFormat;
use std::io::Cursor;
use tiff::decoder::Decoder as TiffDecoder;
use tiff::decoder::ifd::Value;
use tiff::tags::{ResolutionUnit, Tag};

/// Read the resolution recorded in an image file.
pub fn read_resolution(format: ImageFormat, bytes: &[u8]) -> Option<Resolution> {
    match format {
        ImageFormat::Png => png_resolution(bytes),
        ImageFormat::Jpeg => jfif_resolution(bytes),
        ImageFormat::Bmp => bmp_resolution(bytes),
        ImageFormat::Tiff => tiff_resolution(bytes),
        // GIF has no physical resolution, only a pixel aspect ratio
        ImageFormat::Gif => None,
    }
}

#[inline]
fn be_u16(bytes: &[u8], offset: usize) -> Option<u16> {
    let b = bytes.get(offset..offset + 2)?;
    Some(u16::from_be_bytes([b[0], b[1]]))
}

#[inline]
fn le_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let b = bytes.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// `pHYs` chunk, as reported by the PNG decoder's header pass.
fn png_resolution(bytes: &[u8]) -> Option<Resolution> {
    // Only the chunks before IDAT are read, so no pixel buffer is reserved
    let decoder = png::Decoder::new_with_limits(Cursor::new(bytes), png::Limits { bytes: usize::MAX });
    let reader = decoder.read_info().ok()?;
    let dims = reader.info().pixel_dims?;
    // Unspecified only gives an aspect ratio
    match dims.unit {
        png::Unit::Meter => Some(Resolution {
            x_dpi: pixels_per_meter_to_dpi(dims.xppu),
            y_dpi: pixels_per_meter_to_dpi(dims.yppu),
        }),
        png::Unit::Unspecified => None,
    }
}

/// JFIF `APP0` segment.
fn jfif_resolution(bytes: &[u8]) -> Option<Resolution> {
    let mut pos = 2;
    loop {
        if *bytes.get(pos)? != 0xFF {
            return None;
        }
        let marker = *bytes.get(pos + 1)?;
        match marker {
            // Fill bytes
            0xFF => {
                pos += 1;
                continue;
            },
            // Start of scan: no more header segments
            0xDA | 0xD9 => return None,
            _ => {},
        }

        let len = be_u16(bytes, pos + 2)? as usize;
        let body = pos + 4;
        if marker == 0xE0 && bytes.get(body..body + 5)? == b"JFIF\0" {
            let units = *bytes.get(body + 7)?;
            let x = f64::from(be_u16(bytes, body + 8)?);
            let y = f64::from(be_u16(bytes, body + 10)?);
            return match units {
                1 => Some(Resolution { x_dpi: x, y_dpi: y }),
                2 => Some(Resolution {
                    x_dpi: dots_per_cm_to_dpi(x),
                    y_dpi: dots_per_cm_to_dpi(y),
                }),
                _ => None,
            };
        }

        pos = pos + 2 + len;
    }
}

/// `biXPelsPerMeter` / `biYPelsPerMeter` of a BITMAPINFOHEADER or later.
fn bmp_resolution(bytes: &[u8]) -> Option<Resolution> {
    const FILE_HEADER_LEN: usize = 14;
    let header_size = le_u32(bytes, FILE_HEADER_LEN)?;
    // BITMAPCOREHEADER has no resolution fields
    if header_size < 40 {
        return None;
    }

    let x = le_u32(bytes, FILE_HEADER_LEN + 24)? as i32;
    let y = le_u32(bytes, FILE_HEADER_LEN + 28)? as i32;
    // Most writers leave both fields at zero
    if x == 0 && y == 0 {
        return None;
    }

    // Signed fields; a negative value is passed on and rejected later
    let to_dpi = |ppm: i32| f64::from(ppm) * CM_PER_INCH / 100.0;
    Some(Resolution {
        x_dpi: to_dpi(x),
        y_dpi: to_dpi(y),
    })
}

fn tiff_rational<R>(decoder: &mut TiffDecoder<R>, tag: Tag) -> Option<f64>
where
    R: std::io::Read + std::io::Seek,
{
    match decoder.find_tag(tag).ok()?? {
        // Passed on as zero and rejected later
        Value::Rational(_, 0) => Some(0.0),
        Value::Rational(n, d) => Some(f64::from(n) / f64::from(d)),
        Value::Unsigned(v) => Some(f64::from(v)),
        Value::Short(v) => Some(f64::from(v)),
        _ => None,
    }
}

/// `XResolution`, `YResolution` and `ResolutionUnit` of the first image.
fn tiff_resolution(bytes: &[u8]) -> Option<Resolution> {
    let mut decoder = TiffDecoder::new(Cursor::new(bytes)).ok()?;
    let x = tiff_rational(&mut decoder, Tag::XResolution)?;
    let y = tiff_rational(&mut decoder, Tag::YResolution)?;
    // Absent ResolutionUnit means inches
    let unit = decoder
        .find_tag_unsigned::<u16>(Tag::ResolutionUnit)
        .ok()?
        .map_or(Some(ResolutionUnit::Inch), ResolutionUnit::from_u16)?;

    match unit {
        ResolutionUnit::Inch => Some(Resolution { x_dpi: x, y_dpi: y }),
        ResolutionUnit::Centimeter => Some(Resolution {
            x_dpi: dots_per_cm_to_dpi(x),
            y_dpi: dots_per_cm_to_dpi(y),
        }),
        _ => None,
    }
}
