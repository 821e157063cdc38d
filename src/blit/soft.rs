//! CPU transfer engine and shared engine handle
use log::trace;
use spin::Mutex;

use super::{
    BlitError, Blitter, ColorMode, ConfigError, LayerSetup, Source, TransferConfig, TransferMode,
};
use crate::framebuffer::{Color, FrameBuffer, PixelError};

/// Transfer stages, for fault injection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    ConfigLayer,
    Start,
    Poll,
}

/// Engine that performs transfers with CPU stores.
///
/// Behaves like the hardware engine as seen from the driver: fills encode
/// the color register for the output mode, conversions expand the input
/// mode to ARGB8888. The work happens in `start`; `poll_for_transfer`
/// completes it. A fault can be armed on any stage to make it fail.
#[derive(Debug, Clone, Default)]
pub struct SoftBlitter {
    config: Option<TransferConfig>,
    layers: [Option<LayerSetup>; 2],
    pending: bool,
    fault: Option<(Stage, BlitError)>,
    completed: u32,
    last_timeout: Option<u32>,
}

impl SoftBlitter {
    pub const fn new() -> Self {
        Self {
            config: None,
            layers: [None, None],
            pending: false,
            fault: None,
            completed: 0,
            last_timeout: None,
        }
    }

    /// Make `stage` fail with `error` until the fault is cleared
    pub fn fail_at(mut self, stage: Stage, error: BlitError) -> Self {
        self.fault = Some((stage, error));
        self
    }

    pub fn set_fault(&mut self, fault: Option<(Stage, BlitError)>) {
        self.fault = fault;
    }

    /// Transfers that ran to a successful poll
    pub fn completed(&self) -> u32 {
        self.completed
    }

    /// Budget passed to the most recent poll
    pub fn last_timeout(&self) -> Option<u32> {
        self.last_timeout
    }

    pub fn config(&self) -> Option<&TransferConfig> {
        self.config.as_ref()
    }

    fn check(&self, stage: Stage) -> Result<(), BlitError> {
        match self.fault {
            Some((at, error)) if at == stage => Err(error),
            _ => Ok(()),
        }
    }
}

impl Blitter for SoftBlitter {
    fn init(&mut self, config: &TransferConfig) -> Result<(), BlitError> {
        self.check(Stage::Init)?;
        self.config = Some(*config);
        self.pending = false;
        Ok(())
    }

    fn config_layer(&mut self, layer: usize, setup: &LayerSetup) -> Result<(), BlitError> {
        self.check(Stage::ConfigLayer)?;
        let slot = self
            .layers
            .get_mut(layer)
            .ok_or(BlitError::Config(ConfigError::Layer(layer)))?;
        *slot = Some(*setup);
        Ok(())
    }

    fn start(
        &mut self,
        source: Source<'_>,
        dest: &mut FrameBuffer<'_>,
        dest_offset: usize,
        width: u32,
        height: u32,
    ) -> Result<(), BlitError> {
        self.check(Stage::Start)?;
        let config = self.config.ok_or(ConfigError::Mode)?;
        let geometry = Geometry {
            offset: dest_offset,
            width: width as usize,
            height: height as usize,
            gap: config.output_offset as usize,
        };

        let result = match (config.mode, source) {
            (TransferMode::RegisterToMemory, Source::Color(argb)) => {
                fill(dest, geometry, config.color_mode, Color::from_argb(argb))
            }
            (TransferMode::MemoryToMemoryPfc, Source::Memory { buffer, offset }) => {
                let setup = self.layers[1].ok_or(ConfigError::Layer(1))?;
                convert(buffer, offset, &setup, dest, geometry, config.color_mode)
            }
            _ => return Err(ConfigError::Mode.into()),
        };
        result.map_err(|err| {
            trace!("soft transfer aborted: {}", err);
            BlitError::Transfer
        })?;
        self.pending = true;
        Ok(())
    }

    fn poll_for_transfer(&mut self, timeout: u32) -> Result<(), BlitError> {
        self.last_timeout = Some(timeout);
        self.check(Stage::Poll)?;
        if core::mem::take(&mut self.pending) {
            self.completed += 1;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct Geometry {
    offset: usize,
    width: usize,
    height: usize,
    gap: usize,
}

impl Geometry {
    /// Byte offset of a pixel of the region, or `OutOfBounds` against `len`
    /// when it is not representable
    fn pixel(&self, row: usize, col: usize, bpp: usize, len: usize) -> Result<usize, PixelError> {
        self.width
            .checked_add(self.gap)
            .and_then(|stride| row.checked_mul(stride))
            .and_then(|index| index.checked_add(col))
            .and_then(|index| index.checked_mul(bpp))
            .and_then(|bytes| self.offset.checked_add(bytes))
            .ok_or(PixelError::OutOfBounds {
                offset: self.offset,
                len,
            })
    }
}

fn store(
    buf: &mut FrameBuffer<'_>,
    offset: usize,
    mode: ColorMode,
    raw: u32,
) -> Result<(), PixelError> {
    match mode {
        ColorMode::Argb8888 => buf.write_u32(offset, raw),
        ColorMode::Rgb888 => {
            buf.check_range(offset, 3)?;
            buf.write_u8(offset, raw as u8)?;
            buf.write_u8(offset + 1, (raw >> 8) as u8)?;
            buf.write_u8(offset + 2, (raw >> 16) as u8)
        }
        ColorMode::Rgb565 | ColorMode::Argb1555 | ColorMode::Argb4444 => {
            buf.write_u16(offset, raw as u16)
        }
    }
}

fn load(buf: &FrameBuffer<'_>, offset: usize, mode: ColorMode) -> Result<u32, PixelError> {
    match mode {
        ColorMode::Argb8888 => buf.read_u32(offset),
        ColorMode::Rgb888 => {
            buf.check_range(offset, 3)?;
            Ok(buf.read_u8(offset)? as u32
                | (buf.read_u8(offset + 1)? as u32) << 8
                | (buf.read_u8(offset + 2)? as u32) << 16)
        }
        ColorMode::Rgb565 | ColorMode::Argb1555 | ColorMode::Argb4444 => {
            buf.read_u16(offset).map(u32::from)
        }
    }
}

fn fill(
    dest: &mut FrameBuffer<'_>,
    at: Geometry,
    mode: ColorMode,
    color: Color,
) -> Result<(), PixelError> {
    let raw = mode.encode(color);
    let bpp = mode.bytes_per_pixel();
    for row in 0..at.height {
        for col in 0..at.width {
            let offset = at.pixel(row, col, bpp, dest.len())?;
            store(dest, offset, mode, raw)?;
        }
    }
    Ok(())
}

fn convert(
    src: &FrameBuffer<'_>,
    src_offset: usize,
    setup: &LayerSetup,
    dest: &mut FrameBuffer<'_>,
    at: Geometry,
    output: ColorMode,
) -> Result<(), PixelError> {
    let input = setup.input_color_mode;
    let from = Geometry {
        offset: src_offset,
        gap: setup.input_offset as usize,
        ..at
    };
    for row in 0..at.height {
        for col in 0..at.width {
            let src_at = from.pixel(row, col, input.bytes_per_pixel(), src.len())?;
            let raw = load(src, src_at, input)?;
            let color = setup.alpha_mode.apply(input.decode(raw), setup.input_alpha);
            let dest_at = at.pixel(row, col, output.bytes_per_pixel(), dest.len())?;
            store(dest, dest_at, output, output.encode(color))?;
        }
    }
    Ok(())
}

// =============================================================================
// Shared engine
// =============================================================================

/// Handle to one engine shared by several owners.
///
/// There is a single transfer engine but each layer may be driven from a
/// different owner. The handle is `Copy`; every stage locks the engine for
/// its duration. Drawing is synchronous, so one owner's four stages finish
/// before another owner can start.
#[derive(Debug)]
pub struct SharedBlitter<'m, B> {
    engine: &'m Mutex<B>,
}

impl<'m, B> SharedBlitter<'m, B> {
    pub const fn new(engine: &'m Mutex<B>) -> Self {
        Self { engine }
    }

    /// Exclusive access to the engine, e.g. to inspect or reconfigure it
    pub fn lock(&self) -> spin::MutexGuard<'m, B> {
        self.engine.lock()
    }
}

impl<B> Clone for SharedBlitter<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B> Copy for SharedBlitter<'_, B> {}

impl<B: Blitter> Blitter for SharedBlitter<'_, B> {
    fn init(&mut self, config: &TransferConfig) -> Result<(), BlitError> {
        self.engine.lock().init(config)
    }

    fn config_layer(&mut self, layer: usize, setup: &LayerSetup) -> Result<(), BlitError> {
        self.engine.lock().config_layer(layer, setup)
    }

    fn start(
        &mut self,
        source: Source<'_>,
        dest: &mut FrameBuffer<'_>,
        dest_offset: usize,
        width: u32,
        height: u32,
    ) -> Result<(), BlitError> {
        self.engine.lock().start(source, dest, dest_offset, width, height)
    }

    fn poll_for_transfer(&mut self, timeout: u32) -> Result<(), BlitError> {
        self.engine.lock().poll_for_transfer(timeout)
    }
}
