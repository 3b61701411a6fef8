//! Picture formats that can be embedded in a slide.

use crate::ooxml::opc::constants::content_type as ct;
use std::fmt;

/// Image format types supported by PPTX.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Bmp,
    Gif,
    Jpeg,
    Png,
    Tiff,
}

impl ImageFormat {
    /// Get the MIME type for this image format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Bmp => ct::BMP,
            Self::Gif => ct::GIF,
            Self::Jpeg => ct::JPEG,
            Self::Png => ct::PNG,
            Self::Tiff => ct::TIFF,
        }
    }

    /// Extension used for the media partname.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Bmp => "bmp",
            Self::Gif => "gif",
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Tiff => "tiff",
        }
    }

    /// Detect image format from bytes (magic number detection).
    pub fn detect_from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // GIF87a / GIF89a
        if bytes.starts_with(b"GIF8") {
            return Some(Self::Gif);
        }

        if bytes.starts_with(b"BM") {
            return Some(Self::Bmp);
        }

        // TIFF: II*\0 (little-endian) or MM\0* (big-endian)
        if bytes.starts_with(&[0x49, 0x49, 0x2A, 0x00])
            || bytes.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
        {
            return Some(Self::Tiff);
        }

        None
    }

    /// The matching `image` crate format, used for header decoding.
    pub fn decoder_format(&self) -> image::ImageFormat {
        match self {
            Self::Bmp => image::ImageFormat::Bmp,
            Self::Gif => image::ImageFormat::Gif,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
            Self::Tiff => image::ImageFormat::Tiff,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bmp => "BMP",
            Self::Gif => "GIF",
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::Tiff => "TIFF",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_from_bytes() {
        assert_eq!(
            ImageFormat::detect_from_bytes(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A]),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::detect_from_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::detect_from_bytes(b"GIF89a"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::detect_from_bytes(b"BM\x36\x00"), Some(ImageFormat::Bmp));
        assert_eq!(
            ImageFormat::detect_from_bytes(b"MM\x00\x2A\x00"),
            Some(ImageFormat::Tiff)
        );
        assert_eq!(ImageFormat::detect_from_bytes(b"%PDF-1.7"), None);
        assert_eq!(ImageFormat::detect_from_bytes(b"BM"), None);
    }

    #[test]
    fn test_mime_and_extension() {
        assert_eq!(ImageFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(ImageFormat::Jpeg.extension(), "jpeg");
        assert_eq!(ImageFormat::Tiff.to_string(), "TIFF");
    }
}
