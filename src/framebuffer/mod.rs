//! # Framebuffer Memory
//!
//! Raw storage and encodings shared by every layer.
//!
//! ## Modules
//!
//! - `buffer`: `FrameBuffer`, an owned, non-aliasable span of layer memory
//!   accessed only through volatile loads and stores
//! - `color`: `Color`, the caller-facing 32-bit ARGB value, with the
//!   controller palette
//! - `format`: `PixelFormat`, bytes per pixel and pack/unpack rules
//!
//! ## Access widths
//!
//! Every access uses the transaction width implied by the layer format:
//! 32-bit for ARGB8888, three 8-bit stores for RGB888, and 16-bit for
//! everything else. Buffers are word aligned so 16- and 32-bit accesses at
//! pixel boundaries are naturally aligned.

pub mod buffer;
pub mod color;
pub mod format;

pub use buffer::{FrameBuffer, PixelError};
pub use color::Color;
pub use format::{AccessWidth, Packed, PixelFormat};
