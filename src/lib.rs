//! # layerfb
//!
//! Pixel-format-aware drawing on the memory-mapped layers of a 2D display
//! controller with a hardware blitter.
//!
//! ## Modules
//!
//! - `framebuffer`: owned volatile memory span, `Color`, and `PixelFormat`
//! - `surface`: one layer's geometry, format, draw colors, and pixel access
//! - `blit`: the blitter contract, the fill/convert delegate, and a
//!   software engine
//! - `raster`: lines, rectangles, and circles on a `Painter`
//! - `graphics`: `embedded-graphics` integration
//! - `lcd`: the two-layer context with an active-layer selector
//!
//! ## Failure policy
//!
//! Out-of-range accesses, blitter failures, and unknown pixel formats never
//! reach the caller of a drawing primitive. The lower layers report them as
//! `PixelError` / `BlitError`; the primitives log and drop them.

#![cfg_attr(not(test), no_std)]

pub mod blit;
pub mod framebuffer;
pub mod graphics;
pub mod lcd;
pub mod raster;
pub mod surface;

pub use blit::{
    BlitError, BlitTimeouts, Blitter, ColorMode, ConfigError, Region, SharedBlitter, SoftBlitter,
};
pub use framebuffer::{Color, FrameBuffer, PixelError, PixelFormat};
pub use lcd::{Lcd, LayerId};
pub use raster::Painter;
pub use surface::{DrawProps, LayerConfig, Surface, SurfaceError};
