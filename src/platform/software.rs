//=========================================================================
// Softbuffer Presenter
//
// Software frames onto a winit window through softbuffer.
//
// The surface is resized lazily to the target size on each present, then
// the back buffer is stretched into it. Softbuffer expects 0RGB, so the
// alpha byte is masked off after the blit.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::num::NonZeroU32;
use std::sync::Arc;

use log::debug;
use softbuffer::{Context, Surface};
use winit::window::Window;

//=== Internal Dependencies ===============================================

use crate::core::error::{PlatformError, Result};
use crate::core::host::WindowSize;
use crate::core::video::{stretch_blit, BackBuffer, Presenter};

const RGB_MASK: u32 = 0x00FF_FFFF;

//=== SoftbufferPresenter =================================================

pub struct SoftbufferPresenter {
    surface: Surface<Arc<Window>, Arc<Window>>,
    surface_size: Option<WindowSize>,
    // Keeps the display connection alive for the surface's lifetime.
    _context: Context<Arc<Window>>,
}

impl SoftbufferPresenter {
    pub fn new(window: Arc<Window>) -> Result<Self> {
        let context =
            Context::new(window.clone()).map_err(|e| PlatformError::Present(e.to_string()))?;
        let surface =
            Surface::new(&context, window).map_err(|e| PlatformError::Present(e.to_string()))?;
        debug!(target: "platform::video", "Softbuffer surface created");
        Ok(Self {
            surface,
            surface_size: None,
            _context: context,
        })
    }
}

impl Presenter for SoftbufferPresenter {
    fn present(&mut self, buffer: &BackBuffer, target: WindowSize) -> Result<()> {
        let (Some(width), Some(height)) = (NonZeroU32::new(target.width), NonZeroU32::new(target.height)) else {
            return Ok(());
        };

        if self.surface_size != Some(target) {
            self.surface
                .resize(width, height)
                .map_err(|e| PlatformError::Present(e.to_string()))?;
            self.surface_size = Some(target);
        }

        let mut frame = self
            .surface
            .buffer_mut()
            .map_err(|e| PlatformError::Present(e.to_string()))?;
        stretch_blit(buffer, &mut frame, target.width, target.height);
        for pixel in frame.iter_mut() {
            *pixel &= RGB_MASK;
        }
        frame.present().map_err(|e| PlatformError::Present(e.to_string()))
    }
}
