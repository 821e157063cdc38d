//! # Raster
//!
//! Geometric primitives over one layer. Single pixels go through the
//! surface's pixel accessor; lines along an axis, rectangles and clears are
//! handed to the blitter as region fills.
//!
//! Primitives follow the "do nothing and continue" policy: a fill the
//! blitter refuses, or a pixel outside the layer memory, is logged and
//! dropped. The caller sees no status. `fill_region` and `read_pixel` return
//! the underlying result for callers that want it.

use core::fmt;

use log::{debug, trace, warn};

use crate::blit::{self, BlitError, BlitTimeouts, Blitter, Region};
use crate::framebuffer::{Color, PixelError};
use crate::surface::Surface;

/// Draws on one surface with the blitter as fill engine.
///
/// `layer` is the engine input layer programmed for fills, which is the
/// index of the display layer being drawn.
pub struct Painter<'s, 'a, B: ?Sized> {
    surface: &'s mut Surface<'a>,
    blitter: &'s mut B,
    layer: usize,
    timeouts: BlitTimeouts,
}

impl<'s, 'a, B: Blitter + ?Sized> Painter<'s, 'a, B> {
    pub fn new(layer: usize, surface: &'s mut Surface<'a>, blitter: &'s mut B) -> Self {
        Self {
            surface,
            blitter,
            layer,
            timeouts: BlitTimeouts::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: BlitTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn surface(&self) -> &Surface<'a> {
        &*self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface<'a> {
        &mut *self.surface
    }

    pub fn layer(&self) -> usize {
        self.layer
    }

    pub fn read_pixel(&self, x: u32, y: u32) -> Result<Color, PixelError> {
        self.surface.read_pixel(x, y)
    }

    pub fn draw_pixel(&mut self, x: u32, y: u32, color: Color) {
        if let Err(err) = self.surface.write_pixel(x, y, color) {
            warn!("layer {}: pixel ({}, {}) dropped: {}", self.layer, x, y, err);
        }
    }

    /// Fill `region` with `color` through the blitter
    pub fn fill_region(&mut self, region: Region, color: Color) -> Result<(), BlitError> {
        blit::fill_region(
            &mut *self.blitter,
            self.layer,
            &mut *self.surface,
            region,
            color,
            self.timeouts.fill,
        )
    }

    pub fn draw_hline(&mut self, x: u32, y: u32, len: u32) {
        let color = self.surface.text_color();
        let result = self.fill_region(Region::new(x, y, len, 1, 0), color);
        self.absorb("hline", result);
    }

    pub fn draw_vline(&mut self, x: u32, y: u32, len: u32) {
        let color = self.surface.text_color();
        let gap = self.surface.width().saturating_sub(1);
        let result = self.fill_region(Region::new(x, y, 1, len, gap), color);
        self.absorb("vline", result);
    }

    /// Arbitrary line, one accessor write per point of `line_points`
    pub fn draw_line(&mut self, x1: u32, y1: u32, x2: u32, y2: u32) {
        let color = self.surface.text_color();
        for (x, y) in line_points(x1, y1, x2, y2) {
            self.draw_pixel(x, y, color);
        }
    }

    /// Outline of a `w x h` rectangle, corners drawn once.
    ///
    /// Edges past `u32::MAX` are clamped there and fail the memory check.
    pub fn draw_rect(&mut self, x: u32, y: u32, w: u32, h: u32) {
        if w == 0 || h == 0 {
            return;
        }

        self.draw_hline(x, y, w);
        if h > 1 {
            self.draw_hline(x, y.saturating_add(h - 1), w);
        }
        if h > 2 {
            self.draw_vline(x, y.saturating_add(1), h - 2);
            if w > 1 {
                self.draw_vline(x.saturating_add(w - 1), y.saturating_add(1), h - 2);
            }
        }
    }

    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32) {
        let color = self.surface.text_color();
        let region = Region::within(self.surface.width(), x, y, w, h);
        let result = self.fill_region(region, color);
        self.absorb("fill_rect", result);
    }

    /// Midpoint circle. Points left or above the layer origin are skipped;
    /// points past the right edge wrap like any other out-of-row column.
    pub fn draw_circle(&mut self, cx: u32, cy: u32, radius: u32) {
        let color = self.surface.text_color();
        for (px, py) in circle_points(cx, cy, radius) {
            match (u32::try_from(px), u32::try_from(py)) {
                (Ok(x), Ok(y)) => self.draw_pixel(x, y, color),
                _ => trace!("circle point ({}, {}) off layer", px, py),
            }
        }
    }

    /// Fill the whole layer with `color`, not the text color
    pub fn clear(&mut self, color: Color) {
        let region = Region::full(&*self.surface);
        let result = self.fill_region(region, color);
        self.absorb("clear", result);
    }

    pub(crate) fn absorb<E: fmt::Display>(&self, op: &str, result: Result<(), E>) {
        if let Err(err) = result {
            debug!("layer {}: {} abandoned: {}", self.layer, op, err);
        }
    }
}

// =============================================================================
// Line rasterization
// =============================================================================

/// Points of the integer line between two endpoints, both included.
///
/// The axis with the larger delta drives the walk, one pixel per step; the
/// other axis steps when the accumulated error reaches the driving delta.
/// Ties go to the x axis. The walk always starts from the endpoint with the
/// lower driving coordinate, so both directions yield the same points.
pub fn line_points(x1: u32, y1: u32, x2: u32, y2: u32) -> LinePoints {
    let dx = x1.abs_diff(x2);
    let dy = y1.abs_diff(y2);
    let x_drives = dx >= dy;

    let ((x1, y1), (x2, y2)) = if (x_drives && x1 > x2) || (!x_drives && y1 > y2) {
        ((x2, y2), (x1, y1))
    } else {
        ((x1, y1), (x2, y2))
    };
    let xinc: i64 = if x2 >= x1 { 1 } else { -1 };
    let yinc: i64 = if y2 >= y1 { 1 } else { -1 };

    let (den, numadd, major, minor) = if x_drives {
        (dx as u64, dy as u64, (xinc, 0), (0, yinc))
    } else {
        (dy as u64, dx as u64, (0, yinc), (xinc, 0))
    };

    LinePoints {
        x: x1 as i64,
        y: y1 as i64,
        major,
        minor,
        num: den / 2,
        den,
        numadd,
        remaining: den + 1,
    }
}

#[derive(Debug, Clone)]
pub struct LinePoints {
    x: i64,
    y: i64,
    major: (i64, i64),
    minor: (i64, i64),
    num: u64,
    den: u64,
    numadd: u64,
    remaining: u64,
}

impl Iterator for LinePoints {
    type Item = (u32, u32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let point = (self.x as u32, self.y as u32);

        self.num += self.numadd;
        if self.num >= self.den {
            self.num -= self.den;
            self.x += self.minor.0;
            self.y += self.minor.1;
        }
        self.x += self.major.0;
        self.y += self.major.1;
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (n, Some(n))
    }
}

// =============================================================================
// Circle rasterization
// =============================================================================

/// First octant of a midpoint circle, from `(0, radius)` to the diagonal.
pub fn circle_octant(radius: u32) -> CircleOctant {
    CircleOctant {
        x: 0,
        y: radius as i64,
        decision: 3 - 2 * radius as i64,
    }
}

/// The octant mirrored eight ways around `(cx, cy)`. Points on the axes
/// and diagonals come out more than once.
pub fn circle_points(cx: u32, cy: u32, radius: u32) -> impl Iterator<Item = (i64, i64)> {
    let (cx, cy) = (cx as i64, cy as i64);
    circle_octant(radius).flat_map(move |(x, y)| {
        [
            (cx + x, cy - y),
            (cx - x, cy - y),
            (cx + y, cy - x),
            (cx - y, cy - x),
            (cx + x, cy + y),
            (cx - x, cy + y),
            (cx + y, cy + x),
            (cx - y, cy + x),
        ]
    })
}

#[derive(Debug, Clone)]
pub struct CircleOctant {
    x: i64,
    y: i64,
    decision: i64,
}

impl Iterator for CircleOctant {
    type Item = (i64, i64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.x > self.y {
            return None;
        }
        let point = (self.x, self.y);
        if self.decision < 0 {
            self.decision += 4 * self.x + 6;
        } else {
            self.decision += 4 * (self.x - self.y) + 10;
            self.y -= 1;
        }
        self.x += 1;
        Some(point)
    }
}
