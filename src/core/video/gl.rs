//=========================================================================
// Hardware Context Negotiation
//
// Brings up a hardware rendering context for the session's window, with
// a versioned/profiled context when requested and a graceful fallback to
// the baseline context when the driver cannot honour it.
//
// Negotiation:
// ```text
//   apply pixel format (32 color / 24 depth / 8 alpha, double buffered)
//        │ fail → hard error
//   create baseline context, make current
//        │ fail → hard error
//   resolve extensions, release current
//        │
//        ├─ Legacy ─────────────► re-activate baseline
//        │
//        └─ Core / Forward
//             │ major < 3 or extensions missing → hard error
//             ├─ create versioned context
//             │     fail → warning, re-activate baseline
//             ├─ make versioned current
//             │     fail → delete it, warning, re-activate baseline
//             └─ ok → delete baseline, adopt versioned
//
//   swap-interval extension present → apply vsync
// ```
//
// Hard errors abort init. Warnings are recorded in the error log and
// init continues with the baseline context.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, error, info, warn};

//=== Internal Dependencies ===============================================

use super::{BackBuffer, VideoBackend, VideoDriverKind, VideoProfile, VideoSettings};
use crate::core::error::{ErrorLog, PlatformError, Result};
use crate::core::host::WindowSize;

//=== Attribute Constants =================================================

pub const CONTEXT_MAJOR_VERSION: i32 = 0x2091;
pub const CONTEXT_MINOR_VERSION: i32 = 0x2092;
pub const CONTEXT_FLAGS: i32 = 0x2094;
pub const CONTEXT_PROFILE_MASK: i32 = 0x9126;
pub const CONTEXT_CORE_PROFILE_BIT: i32 = 0x0001;
pub const CONTEXT_FORWARD_COMPATIBLE_BIT: i32 = 0x0002;

//=== Driver Types ========================================================

/// Opaque handle to a driver-owned rendering context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextHandle(pub u64);

/// Framebuffer layout requested from the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormat {
    pub color_bits: u8,
    pub depth_bits: u8,
    pub alpha_bits: u8,
    pub double_buffered: bool,
}

impl Default for PixelFormat {
    fn default() -> Self {
        Self {
            color_bits: 32,
            depth_bits: 24,
            alpha_bits: 8,
            double_buffered: true,
        }
    }
}

/// Extension entry points the driver could resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlExtensions {
    /// Profile-aware pixel format selection.
    pub choose_pixel_format: bool,

    /// Context creation from an attribute list.
    pub create_context_attribs: bool,

    /// Swap interval control.
    pub swap_interval: bool,
}

/// Window-bound hardware context driver.
pub trait GlDriver {
    /// Selects and applies `format` to the window's drawing surface.
    fn apply_pixel_format(&mut self, format: &PixelFormat) -> Result<()>;

    /// Creates a baseline context.
    fn create_legacy_context(&mut self) -> Result<ContextHandle>;

    /// Makes `context` current on the window, or releases the current one.
    fn make_current(&mut self, context: Option<ContextHandle>) -> bool;

    fn delete_context(&mut self, context: ContextHandle);

    /// Resolves extension entry points. Requires a current context.
    fn load_extensions(&mut self) -> GlExtensions;

    /// Creates a context from a zero-terminated attribute list.
    fn create_context_attribs(&mut self, attribs: &[i32]) -> Option<ContextHandle>;

    fn set_swap_interval(&mut self, interval: i32) -> bool;

    fn swap_buffers(&mut self) -> Result<()>;
}

//=== ContextAttribs ======================================================

/// Versioned context request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextAttribs {
    pub profile: VideoProfile,
    pub major: u32,
    pub minor: u32,
}

impl ContextAttribs {
    /// Zero-terminated attribute list for the context-attribute entry point.
    pub fn to_attrib_list(&self) -> Vec<i32> {
        let mut list = vec![
            CONTEXT_MAJOR_VERSION,
            self.major as i32,
            CONTEXT_MINOR_VERSION,
            self.minor as i32,
        ];
        match self.profile {
            VideoProfile::Core => {
                list.extend([CONTEXT_PROFILE_MASK, CONTEXT_CORE_PROFILE_BIT]);
            }
            VideoProfile::Forward => {
                list.extend([CONTEXT_FLAGS, CONTEXT_FORWARD_COMPATIBLE_BIT]);
            }
            VideoProfile::Legacy => {}
        }
        list.push(0);
        list
    }
}

//=== Negotiation =========================================================

/// Which kind of context ended up active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    /// Baseline context (requested, or fallen back to).
    Baseline,

    /// Versioned context honouring the requested profile.
    Versioned(ContextAttribs),
}

/// Outcome of a successful negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiatedContext {
    pub context: ContextHandle,
    pub kind: ContextKind,

    /// Whether a swap interval was applied.
    pub vsync_applied: bool,
}

/// Runs the context negotiation against `driver`.
///
/// # Errors
///
/// - [`PlatformError::PixelFormat`] if the framebuffer layout is rejected
/// - [`PlatformError::ContextCreation`] if the baseline context cannot be
///   created or activated
/// - [`PlatformError::Profile`] if a versioned profile was requested with
///   `major_version < 3` or without the required extensions
///
/// Failing to create or activate the versioned context is not an error:
/// a warning is recorded in `errors` and the baseline context is kept.
pub fn negotiate_context(
    driver: &mut dyn GlDriver,
    settings: &VideoSettings,
    errors: &mut ErrorLog,
) -> Result<NegotiatedContext> {
    let fail = |errors: &mut ErrorLog, err: PlatformError| {
        error!(target: "platform::video", "{}", err);
        errors.push_error(&err);
        err
    };

    //--- 1. Pixel format --------------------------------------------------
    let format = PixelFormat::default();
    driver.apply_pixel_format(&format).map_err(|e| fail(errors, e))?;
    debug!(target: "platform::video", "Pixel format applied: {:?}", format);

    //--- 2. Baseline context ----------------------------------------------
    let legacy = driver.create_legacy_context().map_err(|e| fail(errors, e))?;
    if !driver.make_current(Some(legacy)) {
        driver.delete_context(legacy);
        return Err(fail(
            errors,
            PlatformError::ContextCreation("could not activate baseline context".into()),
        ));
    }

    //--- 3. Extensions ----------------------------------------------------
    let extensions = driver.load_extensions();
    debug!(target: "platform::video", "Extensions: {:?}", extensions);
    driver.make_current(None);

    //--- 4. Profile -------------------------------------------------------
    let (context, kind) = match settings.profile {
        VideoProfile::Legacy => {
            driver.make_current(Some(legacy));
            (legacy, ContextKind::Baseline)
        }

        profile @ (VideoProfile::Core | VideoProfile::Forward) => {
            if settings.major_version < 3 {
                driver.delete_context(legacy);
                return Err(fail(
                    errors,
                    PlatformError::Profile(format!(
                        "{:?} profile requires version 3.0 or newer, got {}.{}",
                        profile, settings.major_version, settings.minor_version
                    )),
                ));
            }
            if !extensions.choose_pixel_format {
                driver.delete_context(legacy);
                return Err(fail(
                    errors,
                    PlatformError::Profile(format!(
                        "{:?} profile requires the pixel format extension, select a different profile",
                        profile
                    )),
                ));
            }
            if !extensions.create_context_attribs {
                driver.delete_context(legacy);
                return Err(fail(
                    errors,
                    PlatformError::Profile(format!(
                        "{:?} profile requires the context attribute extension, select a different profile",
                        profile
                    )),
                ));
            }

            let attribs = ContextAttribs {
                profile,
                major: settings.major_version,
                minor: settings.minor_version,
            };
            upgrade_context(driver, legacy, attribs, errors)
        }
    };

    //--- 5. Swap interval -------------------------------------------------
    let vsync_applied = if extensions.swap_interval {
        driver.set_swap_interval(i32::from(settings.vsync))
    } else {
        false
    };

    info!(
        target: "platform::video",
        "Context negotiated: {:?} (vsync applied: {})",
        kind,
        vsync_applied
    );

    Ok(NegotiatedContext {
        context,
        kind,
        vsync_applied,
    })
}

// Attempts the versioned context; falls back to `legacy` on any failure.
fn upgrade_context(
    driver: &mut dyn GlDriver,
    legacy: ContextHandle,
    attribs: ContextAttribs,
    errors: &mut ErrorLog,
) -> (ContextHandle, ContextKind) {
    let Some(modern) = driver.create_context_attribs(&attribs.to_attrib_list()) else {
        return fall_back(driver, legacy, &attribs, errors, "failed creating");
    };

    if !driver.make_current(Some(modern)) {
        driver.delete_context(modern);
        return fall_back(driver, legacy, &attribs, errors, "failed activating");
    }

    driver.delete_context(legacy);
    (modern, ContextKind::Versioned(attribs))
}

fn fall_back(
    driver: &mut dyn GlDriver,
    legacy: ContextHandle,
    attribs: &ContextAttribs,
    errors: &mut ErrorLog,
    reason: &str,
) -> (ContextHandle, ContextKind) {
    let message = format!(
        "Warning: {} {:?} context {}.{}, falling back to baseline context",
        reason, attribs.profile, attribs.major, attribs.minor
    );
    warn!(target: "platform::video", "{}", message);
    errors.push(message);
    driver.make_current(Some(legacy));
    (legacy, ContextKind::Baseline)
}

//=== HardwareBackend =====================================================

/// [`VideoBackend`] over a negotiated hardware context.
pub struct HardwareBackend {
    driver: Box<dyn GlDriver>,
    context: Option<NegotiatedContext>,
}

impl HardwareBackend {
    pub fn new(driver: Box<dyn GlDriver>, context: NegotiatedContext) -> Self {
        Self {
            driver,
            context: Some(context),
        }
    }
}

impl VideoBackend for HardwareBackend {
    fn kind(&self) -> VideoDriverKind {
        VideoDriverKind::Hardware
    }

    fn present(&mut self, _client: WindowSize) -> Result<()> {
        if self.context.is_none() {
            return Ok(());
        }
        self.driver.swap_buffers()
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

    fn context(&self) -> Option<&NegotiatedContext> {
        self.context.as_ref()
    }

    fn release(&mut self) {
        if let Some(negotiated) = self.context.take() {
            self.driver.make_current(None);
            self.driver.delete_context(negotiated.context);
            debug!(target: "platform::video", "Hardware context released");
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
