//! # Blitter
//!
//! Bulk pixel work handed to the 2D transfer engine instead of CPU stores.
//!
//! ## Modules
//!
//! - `soft`: `SoftBlitter`, a CPU implementation of the engine, and
//!   `SharedBlitter`, a lock-guarded handle to one engine
//!
//! ## Transfer sequence
//!
//! Every operation runs the same four stages, stopping at the first error:
//!
//! 1. `init`: transfer mode, output color mode, output line offset
//! 2. `config_layer`: input layer setup
//! 3. `start`: source, destination, and size
//! 4. `poll_for_transfer`: wait for completion with a bounded budget
//!
//! A failed stage leaves the remaining stages unrun. A poll that times out
//! may leave a partial fill behind.

pub mod soft;

pub use soft::{SharedBlitter, SoftBlitter, Stage};

use core::fmt;

use log::trace;

use crate::framebuffer::{Color, FrameBuffer, PixelFormat};
use crate::surface::Surface;

// =============================================================================
// Engine configuration
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// Fill the destination with the color register
    RegisterToMemory,
    /// Copy from memory, converting the pixel format on the way
    MemoryToMemoryPfc,
}

/// Pixel encodings the engine can read and write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Argb8888,
    Rgb888,
    Rgb565,
    Argb1555,
    Argb4444,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaMode {
    /// Keep the alpha of each source pixel
    NoModify,
    /// Use the layer's input alpha instead
    Replace,
    /// Multiply the source alpha by the input alpha
    Combine,
}

/// Stage 1 parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferConfig {
    pub mode: TransferMode,
    pub color_mode: ColorMode,
    /// Pixels skipped at the end of each output line
    pub output_offset: u32,
}

/// Stage 2 parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerSetup {
    pub input_color_mode: ColorMode,
    pub alpha_mode: AlphaMode,
    pub input_alpha: u8,
    /// Pixels skipped at the end of each input line
    pub input_offset: u32,
}

impl LayerSetup {
    pub const fn passthrough(input_color_mode: ColorMode) -> Self {
        Self {
            input_color_mode,
            alpha_mode: AlphaMode::NoModify,
            input_alpha: 0xFF,
            input_offset: 0,
        }
    }
}

/// What a transfer reads from
#[derive(Debug, Clone, Copy)]
pub enum Source<'s> {
    /// ARGB8888 color register value
    Color(u32),
    Memory {
        buffer: &'s FrameBuffer<'s>,
        offset: usize,
    },
}

/// Poll budgets in engine ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlitTimeouts {
    /// Area fills, lines, and clears
    pub fill: u32,
    /// Line format conversions
    pub convert: u32,
}

impl Default for BlitTimeouts {
    fn default() -> Self {
        Self {
            fill: 100,
            convert: 10,
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The layer format has no engine color mode
    UnsupportedFormat(PixelFormat),
    /// No such engine input layer
    Layer(usize),
    /// Mode and source do not match, or `start` ran before `init`
    Mode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlitError {
    Config(ConfigError),
    /// Completion was not signalled within the poll budget
    Timeout,
    /// The engine reported a transfer or bus error
    Transfer,
}

impl From<ConfigError> for BlitError {
    fn from(err: ConfigError) -> Self {
        BlitError::Config(err)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnsupportedFormat(format) => {
                write!(f, "no blitter color mode for {:?}", format)
            }
            ConfigError::Layer(layer) => write!(f, "invalid blitter layer {}", layer),
            ConfigError::Mode => write!(f, "transfer mode does not match source"),
        }
    }
}

impl fmt::Display for BlitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlitError::Config(err) => write!(f, "blitter configuration failed: {}", err),
            BlitError::Timeout => write!(f, "blitter transfer timed out"),
            BlitError::Transfer => write!(f, "blitter transfer error"),
        }
    }
}

// =============================================================================
// Engine contract
// =============================================================================

/// A 2D transfer engine.
///
/// Calls are synchronous and never retried. Implementations for real
/// hardware program the destination address from `dest.address()`.
pub trait Blitter {
    fn init(&mut self, config: &TransferConfig) -> Result<(), BlitError>;

    fn config_layer(&mut self, layer: usize, setup: &LayerSetup) -> Result<(), BlitError>;

    fn start(
        &mut self,
        source: Source<'_>,
        dest: &mut FrameBuffer<'_>,
        dest_offset: usize,
        width: u32,
        height: u32,
    ) -> Result<(), BlitError>;

    fn poll_for_transfer(&mut self, timeout: u32) -> Result<(), BlitError>;
}

impl<B: Blitter + ?Sized> Blitter for &mut B {
    fn init(&mut self, config: &TransferConfig) -> Result<(), BlitError> {
        (**self).init(config)
    }

    fn config_layer(&mut self, layer: usize, setup: &LayerSetup) -> Result<(), BlitError> {
        (**self).config_layer(layer, setup)
    }

    fn start(
        &mut self,
        source: Source<'_>,
        dest: &mut FrameBuffer<'_>,
        dest_offset: usize,
        width: u32,
        height: u32,
    ) -> Result<(), BlitError> {
        (**self).start(source, dest, dest_offset, width, height)
    }

    fn poll_for_transfer(&mut self, timeout: u32) -> Result<(), BlitError> {
        (**self).poll_for_transfer(timeout)
    }
}

impl ColorMode {
    /// Engine mode writing the same storage layout as `format`.
    ///
    /// L8, AL44, AL88 and unknown formats cannot be a fill target.
    pub const fn for_format(format: PixelFormat) -> Result<Self, ConfigError> {
        match format {
            PixelFormat::Argb8888 => Ok(ColorMode::Argb8888),
            PixelFormat::Rgb888 => Ok(ColorMode::Rgb888),
            PixelFormat::Rgb565 => Ok(ColorMode::Rgb565),
            PixelFormat::Argb1555 => Ok(ColorMode::Argb1555),
            PixelFormat::Argb4444 => Ok(ColorMode::Argb4444),
            other => Err(ConfigError::UnsupportedFormat(other)),
        }
    }

    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            ColorMode::Argb8888 => 4,
            ColorMode::Rgb888 => 3,
            ColorMode::Rgb565 | ColorMode::Argb1555 | ColorMode::Argb4444 => 2,
        }
    }

    /// Encode an ARGB color the way the engine converts its color register
    /// for output: channels are truncated to the mode's bit widths and
    /// repacked.
    pub const fn encode(self, color: Color) -> u32 {
        let (a, r, g, b) = (
            color.a() as u32,
            color.r() as u32,
            color.g() as u32,
            color.b() as u32,
        );
        match self {
            ColorMode::Argb8888 => color.argb(),
            ColorMode::Rgb888 => color.argb() & 0x00FF_FFFF,
            ColorMode::Rgb565 => ((r >> 3) << 11) | ((g >> 2) << 5) | (b >> 3),
            ColorMode::Argb1555 => ((a >> 7) << 15) | ((r >> 3) << 10) | ((g >> 3) << 5) | (b >> 3),
            ColorMode::Argb4444 => ((a >> 4) << 12) | ((r >> 4) << 8) | ((g >> 4) << 4) | (b >> 4),
        }
    }

    /// Expand a stored pixel to ARGB8888 as the format converter does:
    /// short channels repeat their top bits, modes without alpha read as
    /// opaque.
    pub const fn decode(self, raw: u32) -> Color {
        match self {
            ColorMode::Argb8888 => Color::from_argb(raw),
            ColorMode::Rgb888 => Color::from_argb(0xFF00_0000 | (raw & 0x00FF_FFFF)),
            ColorMode::Rgb565 => Color::new(
                expand5((raw >> 11) & 0x1F),
                expand6((raw >> 5) & 0x3F),
                expand5(raw & 0x1F),
            ),
            ColorMode::Argb1555 => Color::with_alpha(
                expand5((raw >> 10) & 0x1F),
                expand5((raw >> 5) & 0x1F),
                expand5(raw & 0x1F),
                if raw & 0x8000 != 0 { 0xFF } else { 0 },
            ),
            ColorMode::Argb4444 => Color::with_alpha(
                ((raw >> 8) & 0xF) as u8 * 0x11,
                ((raw >> 4) & 0xF) as u8 * 0x11,
                (raw & 0xF) as u8 * 0x11,
                ((raw >> 12) & 0xF) as u8 * 0x11,
            ),
        }
    }
}

const fn expand5(v: u32) -> u8 {
    ((v << 3) | (v >> 2)) as u8
}

const fn expand6(v: u32) -> u8 {
    ((v << 2) | (v >> 4)) as u8
}

impl AlphaMode {
    pub const fn apply(self, color: Color, input_alpha: u8) -> Color {
        let alpha = match self {
            AlphaMode::NoModify => color.a(),
            AlphaMode::Replace => input_alpha,
            AlphaMode::Combine => ((color.a() as u32 * input_alpha as u32) / 255) as u8,
        };
        Color::from_argb((color.argb() & 0x00FF_FFFF) | ((alpha as u32) << 24))
    }
}

// =============================================================================
// Fill delegate
// =============================================================================

/// Rectangle handed to the engine.
///
/// `row_gap` is the number of pixels between the end of one row of the
/// region and the start of the next, i.e. layer width minus region width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub row_gap: u32,
}

impl Region {
    pub const fn new(x: u32, y: u32, width: u32, height: u32, row_gap: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            row_gap,
        }
    }

    /// `width x height` pixels at `(x, y)` on a layer `stride` pixels wide
    pub const fn within(stride: u32, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self::new(x, y, width, height, stride.saturating_sub(width))
    }

    /// The whole layer
    pub fn full(surface: &Surface<'_>) -> Self {
        Self::new(0, 0, surface.width(), surface.height(), 0)
    }
}

/// Fill `region` of `surface` with `color` through the engine.
///
/// `layer` is the engine input layer index passed to `config_layer`.
pub fn fill_region<B: Blitter + ?Sized>(
    blitter: &mut B,
    layer: usize,
    surface: &mut Surface<'_>,
    region: Region,
    color: Color,
    timeout: u32,
) -> Result<(), BlitError> {
    let color_mode = ColorMode::for_format(surface.format())?;

    blitter.init(&TransferConfig {
        mode: TransferMode::RegisterToMemory,
        color_mode,
        output_offset: region.row_gap,
    })?;
    blitter.config_layer(layer, &LayerSetup::passthrough(color_mode))?;

    let offset = surface.offset_of(region.x, region.y);
    trace!(
        "fill {}x{} at {:#x} gap {} mode {:?}",
        region.width,
        region.height,
        offset,
        region.row_gap,
        color_mode
    );
    blitter.start(
        Source::Color(color.argb()),
        surface.buffer_mut(),
        offset,
        region.width,
        region.height,
    )?;
    blitter.poll_for_transfer(timeout)
}

/// Convert `len` pixels of `input` encoding at `src_offset` into ARGB8888 at
/// `dst_offset`, through the engine's foreground layer.
#[allow(clippy::too_many_arguments)]
pub fn convert_line<B: Blitter + ?Sized>(
    blitter: &mut B,
    src: &FrameBuffer<'_>,
    src_offset: usize,
    dst: &mut FrameBuffer<'_>,
    dst_offset: usize,
    len: u32,
    input: ColorMode,
    timeout: u32,
) -> Result<(), BlitError> {
    blitter.init(&TransferConfig {
        mode: TransferMode::MemoryToMemoryPfc,
        color_mode: ColorMode::Argb8888,
        output_offset: 0,
    })?;
    blitter.config_layer(1, &LayerSetup::passthrough(input))?;

    trace!("convert {} px {:?} -> Argb8888", len, input);
    blitter.start(
        Source::Memory {
            buffer: src,
            offset: src_offset,
        },
        dst,
        dst_offset,
        len,
        1,
    )?;
    blitter.poll_for_transfer(timeout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fillable_formats_map_one_to_one() {
        assert_eq!(ColorMode::for_format(PixelFormat::Argb8888), Ok(ColorMode::Argb8888));
        assert_eq!(ColorMode::for_format(PixelFormat::Rgb888), Ok(ColorMode::Rgb888));
        assert_eq!(ColorMode::for_format(PixelFormat::Rgb565), Ok(ColorMode::Rgb565));
        assert_eq!(ColorMode::for_format(PixelFormat::Argb1555), Ok(ColorMode::Argb1555));
        assert_eq!(ColorMode::for_format(PixelFormat::Argb4444), Ok(ColorMode::Argb4444));
        let unfillable = [
            PixelFormat::L8,
            PixelFormat::Al44,
            PixelFormat::Al88,
            PixelFormat::Other(9),
        ];
        for format in unfillable {
            assert_eq!(
                ColorMode::for_format(format),
                Err(ConfigError::UnsupportedFormat(format))
            );
        }
    }

    #[test]
    fn color_register_encoding_repacks_channels() {
        assert_eq!(ColorMode::Rgb565.encode(Color::RED), 0xF800);
        assert_eq!(ColorMode::Rgb565.encode(Color::GREEN), 0x07E0);
        assert_eq!(ColorMode::Rgb565.encode(Color::BLUE), 0x001F);
        assert_eq!(ColorMode::Argb1555.encode(Color::WHITE), 0xFFFF);
        assert_eq!(ColorMode::Argb1555.encode(Color::with_alpha(255, 0, 0, 0x7F)), 0x7C00);
        assert_eq!(ColorMode::Argb4444.encode(Color::from_argb(0x80FF_8000)), 0x8F80);
        assert_eq!(ColorMode::Rgb888.encode(Color::from_argb(0x12AB_CDEF)), 0x00AB_CDEF);
        assert_eq!(ColorMode::Argb8888.encode(Color::ORANGE), Color::ORANGE.argb());
    }

    #[test]
    fn decode_expands_short_channels() {
        assert_eq!(ColorMode::Rgb565.decode(0xF800), Color::RED);
        assert_eq!(ColorMode::Rgb565.decode(0xFFFF), Color::WHITE);
        assert_eq!(ColorMode::Argb1555.decode(0x7C00), Color::with_alpha(255, 0, 0, 0));
        assert_eq!(ColorMode::Argb4444.decode(0xF0F0), Color::from_argb(0xFF00_FF00));
        assert_eq!(ColorMode::Rgb888.decode(0x0012_3456), Color::from_hex(0x123456));
    }

    #[test]
    fn alpha_modes() {
        let c = Color::from_argb(0x8011_2233);
        assert_eq!(AlphaMode::NoModify.apply(c, 0x10), c);
        assert_eq!(AlphaMode::Replace.apply(c, 0x10), Color::from_argb(0x1011_2233));
        assert_eq!(AlphaMode::Combine.apply(c, 0xFF), c);
        assert_eq!(AlphaMode::Combine.apply(c, 0), Color::from_argb(0x0011_2233));
    }

    #[test]
    fn regions_carry_the_row_gap() {
        assert_eq!(Region::within(200, 3, 4, 50, 10), Region::new(3, 4, 50, 10, 150));
        assert_eq!(Region::within(200, 0, 0, 300, 1).row_gap, 0);
    }
}
