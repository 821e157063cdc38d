//! Color representation
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

/// A 32-bit ARGB value, 8 bits per channel, alpha in the top byte.
///
/// This is the encoding callers always use. Converting to the storage
/// format of a layer is the job of `PixelFormat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Color(u32);

impl Color {
    pub const BLUE: Color = Color(0xFF00_00FF);
    pub const GREEN: Color = Color(0xFF00_FF00);
    pub const RED: Color = Color(0xFFFF_0000);
    pub const CYAN: Color = Color(0xFF00_FFFF);
    pub const MAGENTA: Color = Color(0xFFFF_00FF);
    pub const YELLOW: Color = Color(0xFFFF_FF00);
    pub const LIGHT_BLUE: Color = Color(0xFF80_80FF);
    pub const LIGHT_GREEN: Color = Color(0xFF80_FF80);
    pub const LIGHT_RED: Color = Color(0xFFFF_8080);
    pub const LIGHT_CYAN: Color = Color(0xFF80_FFFF);
    pub const LIGHT_MAGENTA: Color = Color(0xFFFF_80FF);
    pub const LIGHT_YELLOW: Color = Color(0xFFFF_FF80);
    pub const DARK_BLUE: Color = Color(0xFF00_0080);
    pub const DARK_GREEN: Color = Color(0xFF00_8000);
    pub const DARK_RED: Color = Color(0xFF80_0000);
    pub const DARK_CYAN: Color = Color(0xFF00_8080);
    pub const DARK_MAGENTA: Color = Color(0xFF80_0080);
    pub const DARK_YELLOW: Color = Color(0xFF80_8000);
    pub const WHITE: Color = Color(0xFFFF_FFFF);
    pub const LIGHT_GRAY: Color = Color(0xFFD3_D3D3);
    pub const GRAY: Color = Color(0xFF80_8080);
    pub const DARK_GRAY: Color = Color(0xFF40_4040);
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const BROWN: Color = Color(0xFFA5_2A2A);
    pub const ORANGE: Color = Color(0xFFFF_A500);
    /// Same bits as `BLACK`; the controller palette has no alpha-zero entry
    pub const TRANSPARENT: Color = Color(0xFF00_0000);

    /// Opaque color from components
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self::with_alpha(r, g, b, 0xFF)
    }

    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Raw ARGB word, alpha included as given
    pub const fn from_argb(argb: u32) -> Self {
        Self(argb)
    }

    /// Opaque color from a `0xRRGGBB` literal
    pub const fn from_hex(hex: u32) -> Self {
        Self(0xFF00_0000 | (hex & 0x00FF_FFFF))
    }

    pub const fn argb(self) -> u32 {
        self.0
    }

    pub const fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    pub fn to_rgb888(self) -> Rgb888 {
        Rgb888::new(self.r(), self.g(), self.b())
    }
}

impl From<u32> for Color {
    fn from(argb: u32) -> Self {
        Color(argb)
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.0
    }
}

impl From<Rgb888> for Color {
    fn from(color: Rgb888) -> Self {
        Color::new(color.r(), color.g(), color.b())
    }
}
