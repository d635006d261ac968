use image::ColorType;
use std::fmt;

/// Colour representation of an upload as stored in its container.
///
/// The decoder expands CMYK and palette data into RGB(A), so those two modes
/// are only visible in the encoded header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelMode {
    Luma,
    LumaAlpha,
    Rgb,
    Rgba,
    Cmyk,
    Palette,
}

impl PixelMode {
    /// Read the mode from a PNG IHDR or JPEG SOF header.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, ..] => png_mode(bytes),
            [0xFF, 0xD8, ..] => jpeg_mode(bytes),
            _ => None,
        }
    }

    pub fn from_color(color: ColorType) -> Self {
        match (color.has_color(), color.has_alpha()) {
            (false, false) => PixelMode::Luma,
            (false, true) => PixelMode::LumaAlpha,
            (true, false) => PixelMode::Rgb,
            (true, true) => PixelMode::Rgba,
        }
    }

    /// Modes that must be normalized to RGB before being written as PNG.
    pub fn needs_rgb_for_png(self) -> bool {
        matches!(self, PixelMode::Cmyk | PixelMode::Palette)
    }
}

impl fmt::Display for PixelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelMode::Luma => "L",
            PixelMode::LumaAlpha => "LA",
            PixelMode::Rgb => "RGB",
            PixelMode::Rgba => "RGBA",
            PixelMode::Cmyk => "CMYK",
            PixelMode::Palette => "P",
        };
        f.write_str(name)
    }
}

// Signature (8) + IHDR length (4) + type (4) + width (4) + height (4) + depth (1).
const PNG_COLOR_TYPE_OFFSET: usize = 25;

fn png_mode(bytes: &[u8]) -> Option<PixelMode> {
    if bytes.get(12..16)? != b"IHDR" {
        return None;
    }
    match bytes.get(PNG_COLOR_TYPE_OFFSET)? {
        0 => Some(PixelMode::Luma),
        2 => Some(PixelMode::Rgb),
        3 => Some(PixelMode::Palette),
        4 => Some(PixelMode::LumaAlpha),
        6 => Some(PixelMode::Rgba),
        _ => None,
    }
}

fn jpeg_mode(bytes: &[u8]) -> Option<PixelMode> {
    let mut pos = 2;
    while pos + 3 < bytes.len() {
        if bytes[pos] != 0xFF {
            return None;
        }
        let marker = bytes[pos + 1];
        match marker {
            // Fill byte
            0xFF => {
                pos += 1;
                continue;
            }
            // Standalone markers carry no length
            0x01 | 0xD0..=0xD7 => {
                pos += 2;
                continue;
            }
            // Scan data or end of image before any frame header
            0xD9 | 0xDA => return None,
            _ => {}
        }

        let length = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        // SOF0..SOF15, excluding DHT, JPG and DAC which share the range
        if matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
            // Length (2) + precision (1) + height (2) + width (2), then component count.
            return match bytes.get(pos + 9)? {
                1 => Some(PixelMode::Luma),
                3 => Some(PixelMode::Rgb),
                4 => Some(PixelMode::Cmyk),
                _ => None,
            };
        }
        pos += 2 + length;
    }
    None
}
