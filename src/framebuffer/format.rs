//! Pixel formats and their storage encodings
use super::color::Color;

/// Layer pixel formats, numbered as the display controller encodes them.
///
/// Codes outside `0..=7` are kept as `Other` instead of being rejected; they
/// use the 16-bit storage path like the 16-bit formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Argb8888,
    Rgb888,
    Rgb565,
    Argb1555,
    Argb4444,
    L8,
    Al44,
    Al88,
    Other(u32),
}

/// Bus transaction width used to touch one pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessWidth {
    /// Three 8-bit accesses, blue at the lowest address
    Byte,
    HalfWord,
    Word,
}

/// One pixel in storage encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packed {
    Word(u32),
    /// `[blue, green, red]` in address order
    Bytes([u8; 3]),
    HalfWord(u16),
}

impl PixelFormat {
    pub const fn from_code(code: u32) -> Self {
        match code {
            0 => PixelFormat::Argb8888,
            1 => PixelFormat::Rgb888,
            2 => PixelFormat::Rgb565,
            3 => PixelFormat::Argb1555,
            4 => PixelFormat::Argb4444,
            5 => PixelFormat::L8,
            6 => PixelFormat::Al44,
            7 => PixelFormat::Al88,
            other => PixelFormat::Other(other),
        }
    }

    pub const fn code(self) -> u32 {
        match self {
            PixelFormat::Argb8888 => 0,
            PixelFormat::Rgb888 => 1,
            PixelFormat::Rgb565 => 2,
            PixelFormat::Argb1555 => 3,
            PixelFormat::Argb4444 => 4,
            PixelFormat::L8 => 5,
            PixelFormat::Al44 => 6,
            PixelFormat::Al88 => 7,
            PixelFormat::Other(code) => code,
        }
    }

    pub const fn access_width(self) -> AccessWidth {
        match self {
            PixelFormat::Argb8888 => AccessWidth::Word,
            PixelFormat::Rgb888 => AccessWidth::Byte,
            _ => AccessWidth::HalfWord,
        }
    }

    /// Address stride of one pixel.
    ///
    /// 8-bit formats (L8, AL44) and unknown codes are addressed with the
    /// 2-byte stride of the fallback path, not their native width.
    pub const fn bytes_per_pixel(self) -> usize {
        match self.access_width() {
            AccessWidth::Word => 4,
            AccessWidth::Byte => 3,
            AccessWidth::HalfWord => 2,
        }
    }

    /// Encode a caller color for storage.
    ///
    /// The 16-bit path stores the low half of the ARGB word unchanged. That
    /// is a narrowing cast, not an RGB565/ARGB4444 repack: on those layers
    /// the stored bits do not describe the requested color.
    pub const fn pack(self, color: Color) -> Packed {
        let argb = color.argb();
        match self.access_width() {
            AccessWidth::Word => Packed::Word(argb),
            AccessWidth::Byte => {
                Packed::Bytes([argb as u8, (argb >> 8) as u8, (argb >> 16) as u8])
            }
            AccessWidth::HalfWord => Packed::HalfWord(argb as u16),
        }
    }

    /// Decode storage back into an ARGB word.
    ///
    /// RGB888 comes back with zero alpha; the 16-bit path zero-extends.
    pub const fn unpack(self, packed: Packed) -> Color {
        let argb = match packed {
            Packed::Word(word) => word,
            Packed::Bytes([b, g, r]) => ((r as u32) << 16) | ((g as u32) << 8) | b as u32,
            Packed::HalfWord(half) => half as u32,
        };
        Color::from_argb(argb)
    }
}
