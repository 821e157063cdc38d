//! Owned span of layer memory with volatile access
use core::fmt;
use core::marker::PhantomData;
use core::ptr::{self, NonNull};

/// A pixel access that could not be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelError {
    /// The access would touch bytes outside the span
    OutOfBounds { offset: usize, len: usize },
    /// A 16- or 32-bit access at an offset that is not a multiple of its width
    Misaligned { offset: usize, width: usize },
}

impl fmt::Display for PixelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelError::OutOfBounds { offset, len } => {
                write!(f, "offset {:#x} outside {} byte framebuffer", offset, len)
            }
            PixelError::Misaligned { offset, width } => {
                write!(f, "offset {:#x} not aligned to {} bytes", offset, width)
            }
        }
    }
}

/// Layer memory.
///
/// Holds the only handle to its bytes for `'a`: it is neither `Clone` nor
/// `Copy`, so two layers can never alias the same span. All reads and writes
/// are volatile so the compiler cannot merge or drop them.
pub struct FrameBuffer<'a> {
    base: NonNull<u8>,
    len: usize,
    _memory: PhantomData<&'a mut [u8]>,
}

impl<'a> FrameBuffer<'a> {
    /// Wrap word storage (host memory, statics, test fixtures)
    pub fn from_words(words: &'a mut [u32]) -> Self {
        let len = core::mem::size_of_val(words);
        Self {
            base: NonNull::from(words).cast(),
            len,
            _memory: PhantomData,
        }
    }

    /// Wrap a memory-mapped region such as external SDRAM.
    ///
    /// Returns `None` for a null base.
    ///
    /// # Safety
    /// `base` must be valid for volatile reads and writes of `len` bytes for
    /// `'a`, and nothing else may access that memory while the returned
    /// value is alive. The blitter engine driven by this crate is the only
    /// permitted second writer.
    pub unsafe fn from_raw_parts(base: *mut u8, len: usize) -> Option<Self> {
        NonNull::new(base).map(|base| Self {
            base,
            len,
            _memory: PhantomData,
        })
    }

    /// Address of byte 0, as programmed into the controller
    pub fn address(&self) -> usize {
        self.base.as_ptr() as usize
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check that `width` bytes starting at `offset` lie inside the span
    pub fn check_range(&self, offset: usize, width: usize) -> Result<(), PixelError> {
        match offset.checked_add(width) {
            Some(end) if end <= self.len => Ok(()),
            _ => Err(PixelError::OutOfBounds {
                offset,
                len: self.len,
            }),
        }
    }

    fn at(&self, offset: usize, width: usize) -> Result<*mut u8, PixelError> {
        self.check_range(offset, width)?;
        if offset % width != 0 {
            return Err(PixelError::Misaligned { offset, width });
        }
        // SAFETY: offset + width <= len, so the pointer stays in the span.
        Ok(unsafe { self.base.as_ptr().add(offset) })
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, PixelError> {
        let p = self.at(offset, 1)?;
        Ok(unsafe { ptr::read_volatile(p) })
    }

    pub fn read_u16(&self, offset: usize) -> Result<u16, PixelError> {
        let p = self.at(offset, 2)?;
        Ok(unsafe { ptr::read_volatile(p as *const u16) })
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32, PixelError> {
        let p = self.at(offset, 4)?;
        Ok(unsafe { ptr::read_volatile(p as *const u32) })
    }

    pub fn write_u8(&mut self, offset: usize, value: u8) -> Result<(), PixelError> {
        let p = self.at(offset, 1)?;
        unsafe { ptr::write_volatile(p, value) };
        Ok(())
    }

    pub fn write_u16(&mut self, offset: usize, value: u16) -> Result<(), PixelError> {
        let p = self.at(offset, 2)?;
        unsafe { ptr::write_volatile(p as *mut u16, value) };
        Ok(())
    }

    pub fn write_u32(&mut self, offset: usize, value: u32) -> Result<(), PixelError> {
        let p = self.at(offset, 4)?;
        unsafe { ptr::write_volatile(p as *mut u32, value) };
        Ok(())
    }
}

impl fmt::Debug for FrameBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("address", &format_args!("{:#x}", self.address()))
            .field("len", &self.len)
            .finish()
    }
}
