//=========================================================================
// Fullscreen State Machine
//
// Two states, two transitions:
//
// ```text
//              enter(request)                     change_display_mode ok
//   Windowed ───────────────► snapshot placement ─────────────────────► Fullscreen
//      ▲                      popup + topmost style          │
//      │                                                     │ rejected
//      │         restore style (current resizable flag)      ▼
//      └──────── restore snapshot, reset display mode ◄──── leave()
// ```
//
// The snapshot is taken before any change to the window and is restored
// verbatim, so a round trip leaves the window exactly where it was.
// Calling `enter` while fullscreen or `leave` while windowed is a
// contract violation (debug assertion).
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{info, warn};

//=== Internal Dependencies ===============================================

use super::host::{DisplayMode, HostWindow, WindowPlacement, WindowPosition, WindowSize, WindowStyle};

//=== Mode Resolution =====================================================

/// Fills unspecified (`0`) fields of `request` from `current`.
///
/// Width and height are resolved together: if either is `0`, both come
/// from the current display mode.
pub fn resolve_display_mode(request: &DisplayMode, current: &DisplayMode) -> DisplayMode {
    let (width, height) = if request.width == 0 || request.height == 0 {
        (current.width, current.height)
    } else {
        (request.width, request.height)
    };
    let or_current = |requested: u32, current: u32| if requested == 0 { current } else { requested };

    DisplayMode {
        width,
        height,
        refresh_rate: or_current(request.refresh_rate, current.refresh_rate),
        color_bits: or_current(request.color_bits, current.color_bits),
    }
}

//=== FullscreenState =====================================================

/// Fullscreen flag plus the placement to restore on leave.
#[derive(Debug, Default, Clone)]
pub struct FullscreenState {
    active: bool,
    saved: Option<WindowPlacement>,
}

impl FullscreenState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.active
    }

    /// Placement captured by the last `enter`, while fullscreen.
    pub fn saved_placement(&self) -> Option<&WindowPlacement> {
        self.saved.as_ref()
    }

    //--- Transitions ------------------------------------------------------

    /// Switches the window to fullscreen at `request` (zeros = current mode).
    ///
    /// Returns `false` if the display rejected the mode; the window is then
    /// put back into its windowed state before returning.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if already fullscreen.
    pub fn enter(&mut self, host: &mut dyn HostWindow, request: &DisplayMode, resizable: bool) -> bool {
        debug_assert!(!self.active, "enter() called while already fullscreen");

        self.saved = Some(host.placement());

        let target = resolve_display_mode(request, &host.current_display_mode());
        host.set_style(WindowStyle::Fullscreen);
        host.set_position(WindowPosition::new(0, 0));
        host.set_client_size(WindowSize::new(target.width, target.height));

        if host.change_display_mode(&target) {
            self.active = true;
            info!(
                target: "platform",
                "Entered fullscreen {}x{} @ {}Hz, {} bpp",
                target.width,
                target.height,
                target.refresh_rate,
                target.color_bits
            );
            true
        } else {
            warn!(
                target: "platform",
                "Display rejected {}x{} @ {}Hz, staying windowed",
                target.width,
                target.height,
                target.refresh_rate
            );
            self.restore(host, resizable);
            false
        }
    }

    /// Returns the window to its pre-fullscreen placement.
    ///
    /// `resizable` selects the windowed style, so a resizable change made
    /// while fullscreen takes effect here. Returns whether the display mode
    /// reset succeeded.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if not fullscreen.
    pub fn leave(&mut self, host: &mut dyn HostWindow, resizable: bool) -> bool {
        debug_assert!(self.active, "leave() called while not fullscreen");
        let reset = self.restore(host, resizable);
        info!(target: "platform", "Left fullscreen");
        reset
    }

    fn restore(&mut self, host: &mut dyn HostWindow, resizable: bool) -> bool {
        host.set_style(WindowStyle::windowed(resizable));
        if let Some(placement) = self.saved.take() {
            host.set_placement(&placement);
        }
        let reset = host.reset_display_mode();
        self.active = false;
        reset
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
