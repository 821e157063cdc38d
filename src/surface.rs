//! # Surface
//!
//! One display layer: its memory, geometry, pixel format, and the draw
//! colors the rasterizer reads. Geometry and format come from the hardware
//! setup code; colors may change at any time.
//!
//! Pixel `(x, y)` lives at `bytes_per_pixel * (y * width + x)` from the
//! start of the layer memory, where `width` is the configured stride. There
//! is no check of `x` against `width`: a column past the right edge lands on
//! the next row. Only accesses outside the memory span are refused.

use core::fmt;

use log::debug;

use crate::framebuffer::{AccessWidth, Color, FrameBuffer, Packed, PixelError, PixelFormat};

// =============================================================================
// Configuration
// =============================================================================

/// Geometry and format of a layer as configured in the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerConfig {
    pub format: PixelFormat,
    /// Image width in pixels, also the row stride
    pub width: u32,
    /// Image height in lines
    pub height: u32,
}

impl LayerConfig {
    pub const fn new(format: PixelFormat, width: u32, height: u32) -> Self {
        Self {
            format,
            width,
            height,
        }
    }

    /// Bytes needed to back `width * height` pixels, saturating at
    /// `usize::MAX` when the frame is larger than the address space
    pub const fn frame_bytes(&self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(self.format.bytes_per_pixel())
    }
}

/// Per-layer draw colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawProps {
    /// Foreground color used by every primitive
    pub text_color: Color,
    pub back_color: Color,
}

impl Default for DrawProps {
    fn default() -> Self {
        Self {
            text_color: Color::WHITE,
            back_color: Color::BLACK,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceError {
    /// The memory span is smaller than the configured frame
    BufferTooSmall { required: usize, available: usize },
    /// Layer memory must start on a word boundary
    Misaligned { address: usize },
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceError::BufferTooSmall {
                required,
                available,
            } => write!(
                f,
                "layer needs {} bytes but framebuffer holds {}",
                required, available
            ),
            SurfaceError::Misaligned { address } => {
                write!(f, "framebuffer at {:#x} is not word aligned", address)
            }
        }
    }
}

// =============================================================================
// Surface
// =============================================================================

pub struct Surface<'a> {
    buffer: FrameBuffer<'a>,
    config: LayerConfig,
    props: DrawProps,
}

impl<'a> Surface<'a> {
    pub fn new(buffer: FrameBuffer<'a>, config: LayerConfig) -> Result<Self, SurfaceError> {
        if buffer.address() % 4 != 0 {
            return Err(SurfaceError::Misaligned {
                address: buffer.address(),
            });
        }
        check_fits(&buffer, &config)?;
        Ok(Self {
            buffer,
            config,
            props: DrawProps::default(),
        })
    }

    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    pub fn format(&self) -> PixelFormat {
        self.config.format
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    pub fn base_address(&self) -> usize {
        self.buffer.address()
    }

    pub fn buffer(&self) -> &FrameBuffer<'a> {
        &self.buffer
    }

    /// Memory handle for the blitter, which writes behind the accessor's back
    pub fn buffer_mut(&mut self) -> &mut FrameBuffer<'a> {
        &mut self.buffer
    }

    /// Change the image size. Must not be called while a blit on this layer
    /// is outstanding.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        let config = LayerConfig::new(self.config.format, width, height);
        check_fits(&self.buffer, &config)?;
        debug!(
            "layer resized {}x{} -> {}x{}",
            self.config.width, self.config.height, width, height
        );
        self.config = config;
        Ok(())
    }

    pub fn set_width(&mut self, width: u32) -> Result<(), SurfaceError> {
        self.resize(width, self.config.height)
    }

    pub fn set_height(&mut self, height: u32) -> Result<(), SurfaceError> {
        self.resize(self.config.width, height)
    }

    pub fn props(&self) -> &DrawProps {
        &self.props
    }

    pub fn text_color(&self) -> Color {
        self.props.text_color
    }

    pub fn back_color(&self) -> Color {
        self.props.back_color
    }

    pub fn set_text_color(&mut self, color: Color) {
        self.props.text_color = color;
    }

    pub fn set_back_color(&mut self, color: Color) {
        self.props.back_color = color;
    }

    pub fn set_colors(&mut self, text: Color, back: Color) {
        self.props = DrawProps {
            text_color: text,
            back_color: back,
        };
    }

    /// Byte offset of `(x, y)` from the start of the layer memory.
    ///
    /// Saturates instead of wrapping, so absurd coordinates always fail the
    /// bounds check of the following access.
    pub fn offset_of(&self, x: u32, y: u32) -> usize {
        (y as usize)
            .saturating_mul(self.config.width as usize)
            .saturating_add(x as usize)
            .saturating_mul(self.config.format.bytes_per_pixel())
    }

    /// Absolute address of `(x, y)` as the controller sees it
    pub fn address_of(&self, x: u32, y: u32) -> usize {
        self.base_address().saturating_add(self.offset_of(x, y))
    }

    pub fn read_pixel(&self, x: u32, y: u32) -> Result<Color, PixelError> {
        let format = self.config.format;
        let offset = self.offset_of(x, y);
        let packed = match format.access_width() {
            AccessWidth::Word => Packed::Word(self.buffer.read_u32(offset)?),
            AccessWidth::Byte => {
                self.buffer.check_range(offset, 3)?;
                Packed::Bytes([
                    self.buffer.read_u8(offset)?,
                    self.buffer.read_u8(offset + 1)?,
                    self.buffer.read_u8(offset + 2)?,
                ])
            }
            AccessWidth::HalfWord => Packed::HalfWord(self.buffer.read_u16(offset)?),
        };
        Ok(format.unpack(packed))
    }

    pub fn write_pixel(&mut self, x: u32, y: u32, color: Color) -> Result<(), PixelError> {
        let offset = self.offset_of(x, y);
        match self.config.format.pack(color) {
            Packed::Word(word) => self.buffer.write_u32(offset, word),
            Packed::Bytes([b, g, r]) => {
                self.buffer.check_range(offset, 3)?;
                self.buffer.write_u8(offset + 2, r)?;
                self.buffer.write_u8(offset + 1, g)?;
                self.buffer.write_u8(offset, b)
            }
            Packed::HalfWord(half) => self.buffer.write_u16(offset, half),
        }
    }
}

impl fmt::Debug for Surface<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("buffer", &self.buffer)
            .field("config", &self.config)
            .field("props", &self.props)
            .finish()
    }
}

fn check_fits(buffer: &FrameBuffer<'_>, config: &LayerConfig) -> Result<(), SurfaceError> {
    let required = config.frame_bytes();
    if required > buffer.len() {
        return Err(SurfaceError::BufferTooSmall {
            required,
            available: buffer.len(),
        });
    }
    Ok(())
}
