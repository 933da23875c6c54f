//=========================================================================
// WGL Driver
//
// `GlDriver` over the Win32 device context of a winit window.
//
// Context handles are the raw HGLRC values. Extension entry points are
// resolved with `wglGetProcAddress`, which needs a current context, so
// they are only valid after `load_extensions` ran under the baseline
// context.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::ffi::CStr;
use std::io;

use log::{debug, warn};
use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use windows_sys::Win32::Foundation::{BOOL, HWND};
use windows_sys::Win32::Graphics::Gdi::{GetDC, ReleaseDC, HDC};
use windows_sys::Win32::Graphics::OpenGL::{
    wglCreateContext, wglDeleteContext, wglGetProcAddress, wglMakeCurrent, ChoosePixelFormat,
    SetPixelFormat, SwapBuffers, HGLRC, PFD_DOUBLEBUFFER, PFD_DRAW_TO_WINDOW, PFD_MAIN_PLANE,
    PFD_SUPPORT_OPENGL, PFD_TYPE_RGBA, PIXELFORMATDESCRIPTOR,
};
use winit::window::Window;

//=== Internal Dependencies ===============================================

use crate::core::error::{PlatformError, Result};
use crate::core::video::{ContextHandle, GlDriver, GlExtensions, PixelFormat};

//=== Extension Signatures ================================================

type RawProc = unsafe extern "system" fn() -> isize;
type CreateContextAttribsArb = unsafe extern "system" fn(HDC, HGLRC, *const i32) -> HGLRC;
type SwapIntervalExt = unsafe extern "system" fn(i32) -> BOOL;

fn proc_address(name: &CStr) -> Option<RawProc> {
    // SAFETY: `name` is NUL-terminated; a current context is required by
    // the caller and absent entry points come back as sentinels.
    let proc = unsafe { wglGetProcAddress(name.as_ptr().cast()) }?;
    match proc as usize as isize {
        1 | 2 | 3 | -1 => None,
        _ => Some(proc),
    }
}

//=== WglDriver ===========================================================

pub struct WglDriver {
    hwnd: HWND,
    hdc: HDC,
    create_context_attribs: Option<CreateContextAttribsArb>,
    swap_interval: Option<SwapIntervalExt>,
}

impl WglDriver {
    /// Acquires the device context of `window`.
    ///
    /// # Errors
    ///
    /// [`PlatformError::DeviceContext`] if the window is not a Win32
    /// window or has no device context.
    pub fn new(window: &Window) -> Result<Self> {
        let handle = window
            .window_handle()
            .map_err(|e| PlatformError::DeviceContext(e.to_string()))?;
        let hwnd = match handle.as_raw() {
            RawWindowHandle::Win32(win32) => win32.hwnd.get(),
            other => {
                return Err(PlatformError::DeviceContext(format!(
                    "unexpected window handle {:?}",
                    other
                )))
            }
        };

        // SAFETY: `hwnd` belongs to a live window owned by the host.
        let hdc = unsafe { GetDC(hwnd) };
        if hdc == 0 {
            return Err(PlatformError::DeviceContext(io::Error::last_os_error().to_string()));
        }

        debug!(target: "platform::video", "Acquired device context {:#x}", hdc);
        Ok(Self {
            hwnd,
            hdc,
            create_context_attribs: None,
            swap_interval: None,
        })
    }
}

impl GlDriver for WglDriver {
    fn apply_pixel_format(&mut self, format: &PixelFormat) -> Result<()> {
        let mut flags = PFD_DRAW_TO_WINDOW | PFD_SUPPORT_OPENGL;
        if format.double_buffered {
            flags |= PFD_DOUBLEBUFFER;
        }

        // SAFETY: plain-old-data descriptor; all-zero is a valid start.
        let mut pfd: PIXELFORMATDESCRIPTOR = unsafe { std::mem::zeroed() };
        pfd.nSize = std::mem::size_of::<PIXELFORMATDESCRIPTOR>() as u16;
        pfd.nVersion = 1;
        pfd.dwFlags = flags;
        pfd.iPixelType = PFD_TYPE_RGBA as _;
        pfd.cColorBits = format.color_bits;
        pfd.cDepthBits = format.depth_bits;
        pfd.cAlphaBits = format.alpha_bits;
        pfd.iLayerType = PFD_MAIN_PLANE as _;

        // SAFETY: `hdc` is valid for the driver's lifetime; `pfd` outlives the calls.
        let index = unsafe { ChoosePixelFormat(self.hdc, &pfd) };
        if index == 0 {
            return Err(PlatformError::PixelFormat(io::Error::last_os_error().to_string()));
        }
        // SAFETY: as above.
        if unsafe { SetPixelFormat(self.hdc, index, &pfd) } == 0 {
            return Err(PlatformError::PixelFormat(io::Error::last_os_error().to_string()));
        }
        Ok(())
    }

    fn create_legacy_context(&mut self) -> Result<ContextHandle> {
        // SAFETY: `hdc` has a pixel format applied.
        let hglrc = unsafe { wglCreateContext(self.hdc) };
        if hglrc == 0 {
            return Err(PlatformError::ContextCreation(io::Error::last_os_error().to_string()));
        }
        Ok(ContextHandle(hglrc as u64))
    }

    fn make_current(&mut self, context: Option<ContextHandle>) -> bool {
        // SAFETY: handles come from this driver; (0, 0) releases the current context.
        let ok = unsafe {
            match context {
                Some(ctx) => wglMakeCurrent(self.hdc, ctx.0 as HGLRC),
                None => wglMakeCurrent(0, 0),
            }
        };
        ok != 0
    }

    fn delete_context(&mut self, context: ContextHandle) {
        // SAFETY: handle comes from this driver and is not used afterwards.
        if unsafe { wglDeleteContext(context.0 as HGLRC) } == 0 {
            warn!(target: "platform::video", "wglDeleteContext failed: {}", io::Error::last_os_error());
        }
    }

    fn load_extensions(&mut self) -> GlExtensions {
        let choose_pixel_format = proc_address(c"wglChoosePixelFormatARB").is_some();

        // SAFETY: resolved entry points have the documented signatures.
        self.create_context_attribs = proc_address(c"wglCreateContextAttribsARB")
            .map(|p| unsafe { std::mem::transmute::<RawProc, CreateContextAttribsArb>(p) });
        self.swap_interval = proc_address(c"wglSwapIntervalEXT")
            .map(|p| unsafe { std::mem::transmute::<RawProc, SwapIntervalExt>(p) });

        GlExtensions {
            choose_pixel_format,
            create_context_attribs: self.create_context_attribs.is_some(),
            swap_interval: self.swap_interval.is_some(),
        }
    }

    fn create_context_attribs(&mut self, attribs: &[i32]) -> Option<ContextHandle> {
        let create = self.create_context_attribs?;
        // SAFETY: `attribs` is zero-terminated; no share context.
        let hglrc = unsafe { create(self.hdc, 0, attribs.as_ptr()) };
        (hglrc != 0).then_some(ContextHandle(hglrc as u64))
    }

    fn set_swap_interval(&mut self, interval: i32) -> bool {
        match self.swap_interval {
            // SAFETY: resolved entry point; applies to the current context.
            Some(swap) => unsafe { swap(interval) != 0 },
            None => false,
        }
    }

    fn swap_buffers(&mut self) -> Result<()> {
        // SAFETY: `hdc` is valid for the driver's lifetime.
        if unsafe { SwapBuffers(self.hdc) } == 0 {
            return Err(PlatformError::Present(io::Error::last_os_error().to_string()));
        }
        Ok(())
    }
}

impl Drop for WglDriver {
    fn drop(&mut self) {
        // SAFETY: pairs with the GetDC in `new`.
        unsafe { ReleaseDC(self.hwnd, self.hdc) };
    }
}
