//=========================================================================
// Software Video Backend
//
// CPU-side back buffer that the application writes into and that is
// stretched to the window's client area on every flip.
//
// Pixel layout:
// - Top-down rows, `width` pixels each, `stride = width * 4` bytes
// - One `u32` per pixel, `0xAARRGGBB`
// - Freshly allocated buffers are opaque black (`0xFF000000`)
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::{VideoBackend, VideoDriverKind};
use crate::core::error::{PlatformError, Result};
use crate::core::host::WindowSize;

//=== BackBuffer ==========================================================

/// Fill color of a freshly allocated back buffer.
pub const CLEAR_COLOR: u32 = 0xFF00_0000;

/// Top-down 32-bit pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackBuffer {
    pixels: Vec<u32>,
    width: u32,
    height: u32,
    stride: u32,
}

impl BackBuffer {
    /// Allocates a `width * height` buffer cleared to [`CLEAR_COLOR`].
    ///
    /// Returns `None` if the stride or pixel count overflows, or if the
    /// allocator refuses the request.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        let stride = width.checked_mul(std::mem::size_of::<u32>() as u32)?;
        let len = usize::try_from(width)
            .ok()?
            .checked_mul(usize::try_from(height).ok()?)?;

        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len).ok()?;
        pixels.resize(len, CLEAR_COLOR);

        Some(Self {
            pixels,
            width,
            height,
            stride,
        })
    }

    /// Zero-sized buffer; owns no pixel storage.
    pub fn empty() -> Self {
        Self {
            pixels: Vec::new(),
            width: 0,
            height: 0,
            stride: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row pitch in bytes.
    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn size(&self) -> WindowSize {
        WindowSize::new(self.width, self.height)
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Pixels of row `y`, or `None` if out of range.
    pub fn row_mut(&mut self, y: u32) -> Option<&mut [u32]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.width as usize;
        self.pixels.get_mut(start..start + self.width as usize)
    }

    /// Writes one pixel. Out-of-range coordinates are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: u32) {
        if x < self.width && y < self.height {
            self.pixels[y as usize * self.width as usize + x as usize] = color;
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }

    /// Fills the whole buffer with `color`.
    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }
}

//=== Stretch Blit ========================================================

/// Nearest-neighbour scale of `source` into a `dst_width * dst_height`
/// destination.
///
/// `dst` must hold at least `dst_width * dst_height` pixels; extra
/// pixels are left untouched. An empty source leaves `dst` untouched.
pub fn stretch_blit(source: &BackBuffer, dst: &mut [u32], dst_width: u32, dst_height: u32) {
    if source.width == 0 || source.height == 0 || dst_width == 0 || dst_height == 0 {
        return;
    }

    let src_w = source.width as u64;
    let src_h = source.height as u64;
    for (dy, row) in dst
        .chunks_exact_mut(dst_width as usize)
        .take(dst_height as usize)
        .enumerate()
    {
        let sy = (dy as u64 * src_h / dst_height as u64) as usize;
        let src_row = &source.pixels[sy * source.width as usize..][..source.width as usize];
        for (dx, out) in row.iter_mut().enumerate() {
            let sx = (dx as u64 * src_w / dst_width as u64) as usize;
            *out = src_row[sx];
        }
    }
}

//=== Presenter ===========================================================

/// Host-side sink for software frames.
pub trait Presenter {
    /// Shows `buffer` stretched over a `target`-sized client area.
    fn present(&mut self, buffer: &BackBuffer, target: WindowSize) -> Result<()>;
}

//=== SoftwareBackend =====================================================

/// [`VideoBackend`] over a [`BackBuffer`] and a host [`Presenter`].
pub struct SoftwareBackend {
    buffer: BackBuffer,
    presenter: Box<dyn Presenter>,
}

impl SoftwareBackend {
    /// # Errors
    ///
    /// [`PlatformError::Allocation`] if a `width * height` back buffer
    /// cannot be allocated.
    pub fn new(presenter: Box<dyn Presenter>, width: u32, height: u32) -> Result<Self> {
        let buffer = BackBuffer::new(width, height)
            .ok_or_else(|| PlatformError::Allocation(format!("{}x{}", width, height)))?;
        Ok(Self { buffer, presenter })
    }
}

impl VideoBackend for SoftwareBackend {
    fn kind(&self) -> VideoDriverKind {
        VideoDriverKind::Software
    }

    fn present(&mut self, client: WindowSize) -> Result<()> {
        if client.width == 0 || client.height == 0 {
            // Minimized; nothing to show.
            return Ok(());
        }
        self.presenter.present(&self.buffer, client)
    }

    fn resize_back_buffer(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            warn!(target: "platform::video", "Rejected back buffer resize to {}x{}", width, height);
            return false;
        }
        let Some(buffer) = BackBuffer::new(width, height) else {
            warn!(target: "platform::video", "Failed to allocate {}x{} back buffer", width, height);
            return false;
        };
        debug!(target: "platform::video", "Back buffer resized to {}x{}", width, height);
        self.buffer = buffer;
        true
    }

    fn back_buffer(&mut self) -> Option<&mut BackBuffer> {
        Some(&mut self.buffer)
    }

    fn back_buffer_size(&self) -> Option<WindowSize> {
        Some(self.buffer.size())
    }

    fn release(&mut self) {
        self.buffer = BackBuffer::empty();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
