//=========================================================================
// Video Subsystem
//
// Chooses and owns the session's presentation backend.
//
// Architecture:
// ```text
//   VideoSettings.driver
//        │
//        ├─ None      → NullBackend       (present is a no-op)
//        ├─ Hardware  → HardwareBackend   (GlDriver + negotiated context)
//        └─ Software  → SoftwareBackend   (BackBuffer + Presenter)
//
//   WindowSession::window_flip()  ──►  VideoBackend::present(client_size)
// ```
//
// The backend is selected once at init. Everything driver-specific
// (swap buffers, blitting, back-buffer reallocation) sits behind the
// `VideoBackend` trait.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod gl;
pub mod software;

//=== External Dependencies ===============================================

use log::{error, info};

//=== Internal Dependencies ===============================================

use super::error::{ErrorLog, Result};
use super::host::{HostWindow, WindowSize};

pub use gl::{
    negotiate_context, ContextAttribs, ContextHandle, ContextKind, GlDriver, GlExtensions,
    HardwareBackend, NegotiatedContext, PixelFormat,
};
pub use software::{stretch_blit, BackBuffer, Presenter, SoftwareBackend, CLEAR_COLOR};

//=== Settings ============================================================

/// Presentation driver family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoDriverKind {
    /// No video output.
    None,

    /// Hardware-accelerated rendering context.
    Hardware,

    /// CPU-side back buffer blitted to the window.
    Software,
}

impl Default for VideoDriverKind {
    #[cfg(windows)]
    fn default() -> Self {
        Self::Hardware
    }

    #[cfg(not(windows))]
    fn default() -> Self {
        Self::Software
    }
}

/// Hardware context compatibility profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VideoProfile {
    /// Baseline context as created by the legacy entry point.
    #[default]
    Legacy,

    /// Versioned core profile.
    Core,

    /// Versioned forward-compatible context.
    Forward,
}

/// Video configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoSettings {
    pub driver: VideoDriverKind,
    pub profile: VideoProfile,

    /// Requested major version (only for `Core`/`Forward`).
    pub major_version: u32,

    /// Requested minor version (only for `Core`/`Forward`).
    pub minor_version: u32,

    /// Synchronize presentation with the display refresh.
    pub vsync: bool,

    /// Reallocate the software back buffer when the window is resized.
    pub auto_size: bool,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            driver: VideoDriverKind::default(),
            profile: VideoProfile::Legacy,
            major_version: 0,
            minor_version: 0,
            vsync: false,
            auto_size: true,
        }
    }
}

//=== VideoBackend ========================================================

/// Presentation backend selected at init.
pub trait VideoBackend {
    fn kind(&self) -> VideoDriverKind;

    /// Shows the current frame, scaled to `client` where applicable.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Present`](super::error::PlatformError::Present)
    /// if the host refused the frame.
    fn present(&mut self, client: WindowSize) -> Result<()>;

    /// Reallocates the back buffer. `false` if the backend has none.
    fn resize_back_buffer(&mut self, width: u32, height: u32) -> bool;

    /// CPU-writable back buffer, if the backend has one.
    fn back_buffer(&mut self) -> Option<&mut BackBuffer>;

    /// Size of the back buffer, if the backend has one.
    fn back_buffer_size(&self) -> Option<WindowSize>;

    /// Active hardware context, if any.
    fn context(&self) -> Option<&NegotiatedContext> {
        None
    }

    /// Releases driver resources. Idempotent.
    fn release(&mut self);
}

//--- NullBackend ---------------------------------------------------------

/// Backend for sessions without video output.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl VideoBackend for NullBackend {
    fn kind(&self) -> VideoDriverKind {
        VideoDriverKind::None
    }

    fn present(&mut self, _client: WindowSize) -> Result<()> {
        Ok(())
    }

    fn resize_back_buffer(&mut self, _width: u32, _height: u32) -> bool {
        false
    }

    fn back_buffer(&mut self) -> Option<&mut BackBuffer> {
        None
    }

    fn back_buffer_size(&self) -> Option<WindowSize> {
        None
    }

    fn release(&mut self) {}
}

//=== Backend Selection ===================================================

/// Creates the backend requested by `settings` for `host`.
///
/// # Errors
///
/// Fails if the host cannot provide the requested driver, or if hardware
/// context negotiation hits a hard failure. The cause is also recorded in
/// `errors`.
pub fn create_backend(
    host: &mut dyn HostWindow,
    settings: &VideoSettings,
    errors: &mut ErrorLog,
) -> Result<Box<dyn VideoBackend>> {
    match settings.driver {
        VideoDriverKind::None => {
            info!(target: "platform::video", "No video driver requested");
            Ok(Box::new(NullBackend))
        }

        VideoDriverKind::Hardware => {
            let mut driver = host.create_gl_driver().map_err(|e| {
                error!(target: "platform::video", "{}", e);
                errors.push_error(&e);
                e
            })?;
            let context = negotiate_context(driver.as_mut(), settings, errors)?;
            info!(target: "platform::video", "Hardware context ready: {:?}", context.kind);
            Ok(Box::new(HardwareBackend::new(driver, context)))
        }

        VideoDriverKind::Software => {
            let presenter = host.create_presenter().map_err(|e| {
                error!(target: "platform::video", "{}", e);
                errors.push_error(&e);
                e
            })?;
            let size = host.client_size();
            let backend = SoftwareBackend::new(presenter, size.width, size.height).map_err(|e| {
                error!(target: "platform::video", "{}", e);
                errors.push_error(&e);
                e
            })?;
            info!(
                target: "platform::video",
                "Software back buffer {}x{}",
                size.width,
                size.height
            );
            Ok(Box::new(backend))
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
