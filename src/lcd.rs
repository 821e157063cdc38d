//! # Lcd
//!
//! The two-layer display front end: owns both layer surfaces and the
//! blitter, tracks which layer is active, and forwards every drawing call to
//! a painter over the active layer.
//!
//! Only one thread of control is expected. Selecting another layer while a
//! transfer on the previous one is outstanding is not allowed; with the
//! synchronous blitter contract no transfer outlives its call.

use log::debug;

use crate::blit::{self, BlitError, BlitTimeouts, Blitter, ColorMode};
use crate::framebuffer::{Color, FrameBuffer, PixelError};
use crate::raster::Painter;
use crate::surface::{Surface, SurfaceError};

pub const MAX_LAYER_NUMBER: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerId {
    Background = 0,
    Foreground = 1,
}

impl LayerId {
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for LayerId {
    type Error = usize;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(LayerId::Background),
            1 => Ok(LayerId::Foreground),
            other => Err(other),
        }
    }
}

pub struct Lcd<'a, B> {
    layers: [Surface<'a>; MAX_LAYER_NUMBER],
    active: LayerId,
    blitter: B,
    timeouts: BlitTimeouts,
}

impl<'a, B: Blitter> Lcd<'a, B> {
    /// Starts with the background layer active
    pub fn new(background: Surface<'a>, foreground: Surface<'a>, blitter: B) -> Self {
        Self {
            layers: [background, foreground],
            active: LayerId::Background,
            blitter,
            timeouts: BlitTimeouts::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: BlitTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn timeouts(&self) -> BlitTimeouts {
        self.timeouts
    }

    pub fn select_layer(&mut self, layer: LayerId) {
        debug!("active layer {:?} -> {:?}", self.active, layer);
        self.active = layer;
    }

    pub fn active_layer(&self) -> LayerId {
        self.active
    }

    pub fn layer(&self, layer: LayerId) -> &Surface<'a> {
        &self.layers[layer.index()]
    }

    pub fn layer_mut(&mut self, layer: LayerId) -> &mut Surface<'a> {
        &mut self.layers[layer.index()]
    }

    fn active_surface(&self) -> &Surface<'a> {
        self.layer(self.active)
    }

    fn active_surface_mut(&mut self) -> &mut Surface<'a> {
        self.layer_mut(self.active)
    }

    // =========================================================================
    // Geometry and colors of the active layer
    // =========================================================================

    pub fn x_size(&self) -> u32 {
        self.active_surface().width()
    }

    pub fn y_size(&self) -> u32 {
        self.active_surface().height()
    }

    pub fn set_x_size(&mut self, width: u32) -> Result<(), SurfaceError> {
        self.active_surface_mut().set_width(width)
    }

    pub fn set_y_size(&mut self, height: u32) -> Result<(), SurfaceError> {
        self.active_surface_mut().set_height(height)
    }

    pub fn text_color(&self) -> Color {
        self.active_surface().text_color()
    }

    pub fn back_color(&self) -> Color {
        self.active_surface().back_color()
    }

    pub fn set_text_color(&mut self, color: Color) {
        debug!("layer {:?} text color {:#010x}", self.active, color.argb());
        self.active_surface_mut().set_text_color(color);
    }

    pub fn set_back_color(&mut self, color: Color) {
        debug!("layer {:?} back color {:#010x}", self.active, color.argb());
        self.active_surface_mut().set_back_color(color);
    }

    pub fn set_colors(&mut self, text: Color, back: Color) {
        debug!(
            "layer {:?} colors {:#010x}/{:#010x}",
            self.active,
            text.argb(),
            back.argb()
        );
        self.active_surface_mut().set_colors(text, back);
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    /// Painter over the active layer, sharing this display's blitter
    pub fn painter(&mut self) -> Painter<'_, 'a, B> {
        let layer = self.active.index();
        Painter::new(layer, &mut self.layers[layer], &mut self.blitter).with_timeouts(self.timeouts)
    }

    pub fn read_pixel(&self, x: u32, y: u32) -> Result<Color, PixelError> {
        self.active_surface().read_pixel(x, y)
    }

    pub fn draw_pixel(&mut self, x: u32, y: u32, color: Color) {
        self.painter().draw_pixel(x, y, color);
    }

    pub fn draw_hline(&mut self, x: u32, y: u32, len: u32) {
        self.painter().draw_hline(x, y, len);
    }

    pub fn draw_vline(&mut self, x: u32, y: u32, len: u32) {
        self.painter().draw_vline(x, y, len);
    }

    pub fn draw_line(&mut self, x1: u32, y1: u32, x2: u32, y2: u32) {
        self.painter().draw_line(x1, y1, x2, y2);
    }

    pub fn draw_rect(&mut self, x: u32, y: u32, w: u32, h: u32) {
        self.painter().draw_rect(x, y, w, h);
    }

    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32) {
        self.painter().fill_rect(x, y, w, h);
    }

    pub fn draw_circle(&mut self, cx: u32, cy: u32, radius: u32) {
        self.painter().draw_circle(cx, cy, radius);
    }

    pub fn clear(&mut self, color: Color) {
        self.painter().clear(color);
    }

    /// Convert `len` pixels in `input` encoding to ARGB8888 with the blitter.
    ///
    /// Independent of the layers: source and destination are any memory.
    #[allow(clippy::too_many_arguments)]
    pub fn convert_line(
        &mut self,
        src: &FrameBuffer<'_>,
        src_offset: usize,
        dst: &mut FrameBuffer<'_>,
        dst_offset: usize,
        len: u32,
        input: ColorMode,
    ) -> Result<(), BlitError> {
        blit::convert_line(
            &mut self.blitter,
            src,
            src_offset,
            dst,
            dst_offset,
            len,
            input,
            self.timeouts.convert,
        )
    }

    pub fn blitter(&self) -> &B {
        &self.blitter
    }

    pub fn blitter_mut(&mut self) -> &mut B {
        &mut self.blitter
    }

    /// Give back both layers and the blitter
    pub fn into_parts(self) -> ([Surface<'a>; MAX_LAYER_NUMBER], B) {
        (self.layers, self.blitter)
    }
}
