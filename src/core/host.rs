//=========================================================================
// Host Window Abstraction
//
// The seam between host-independent session logic and the OS window.
//
// Architecture:
// ```text
//   WindowSession ──► HostWindow::pump_messages(&mut dyn MessageSink)
//                              │
//                              │  for each OS notification
//                              ▼
//                      MessageSink::on_message(HostMessage, &dyn KeyboardState)
//                              │
//                              ▼
//                      translate + push into EventQueue
// ```
//
// Hosts report notifications as `HostMessage` values using virtual-key
// numbering for keys and raw wheel units (120 per detent) for the wheel.
// They never build `Event`s themselves; translation lives in one place.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::error::Result;
use super::video::{GlDriver, Presenter};

//=== Geometry ============================================================

/// Client area size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Window position in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WindowPosition {
    pub left: i32,
    pub top: i32,
}

impl WindowPosition {
    pub fn new(left: i32, top: i32) -> Self {
        Self { left, top }
    }
}

/// Show state captured with a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShowState {
    #[default]
    Normal,
    Maximized,
    Minimized,
}

/// Everything needed to put a window back exactly where it was.
///
/// Snapshotted before entering fullscreen and restored verbatim on leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WindowPlacement {
    pub position: WindowPosition,
    pub size: WindowSize,
    pub show: ShowState,
}

/// Window frame style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowStyle {
    /// Decorated, user-resizable.
    Resizable,

    /// Decorated, fixed size.
    Fixed,

    /// Borderless, topmost popup covering the display.
    Fullscreen,
}

impl WindowStyle {
    /// Windowed style for the given resizable setting.
    pub fn windowed(resizable: bool) -> Self {
        if resizable {
            Self::Resizable
        } else {
            Self::Fixed
        }
    }
}

/// A display mode. `0` in any field of a request means "keep current".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DisplayMode {
    pub width: u32,
    pub height: u32,
    pub refresh_rate: u32,
    pub color_bits: u32,
}

//=== Messages ============================================================

/// Raw host notification, prior to translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMessage {
    /// User or OS asked the window to close.
    CloseRequested,

    /// Native window was destroyed.
    Destroyed,

    /// Client area resized.
    Resized { width: u32, height: u32 },

    /// Keyboard focus gained (`true`) or lost (`false`).
    Focus(bool),

    /// Key transition or auto-repeat.
    ///
    /// `raw_code` is a virtual-key code. `was_down` is the key state before
    /// this message; a repeat has `is_down && was_down`.
    Key {
        raw_code: u32,
        is_down: bool,
        was_down: bool,
    },

    /// Printable character input.
    Char { code: u32 },

    /// Mouse button transition at client coordinates.
    MouseButton {
        button: HostMouseButton,
        pressed: bool,
        x: i32,
        y: i32,
    },

    /// Cursor moved to client coordinates.
    MouseMove { x: i32, y: i32 },

    /// Wheel rotated by `raw_delta` units (120 per detent).
    MouseWheel { x: i32, y: i32, raw_delta: i16 },
}

/// Mouse buttons a host can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostMouseButton {
    Left,
    Right,
    Middle,
}

//=== Callback Traits =====================================================

/// Live keyboard state, queried at translation time.
pub trait KeyboardState {
    /// Whether the key with the given virtual-key code is currently held.
    fn is_key_down(&self, raw_code: u32) -> bool;
}

/// Receiver for host messages during a pump.
pub trait MessageSink {
    fn on_message(&mut self, message: HostMessage, keyboard: &dyn KeyboardState);
}

//=== HostWindow ==========================================================

/// The single OS window a session owns.
///
/// All calls happen on the thread that created the session.
pub trait HostWindow {
    /// Delivers every pending host notification to `sink` without blocking.
    fn pump_messages(&mut self, sink: &mut dyn MessageSink);

    //--- Geometry ---------------------------------------------------------

    fn client_size(&self) -> WindowSize;
    fn set_client_size(&mut self, size: WindowSize);
    fn position(&self) -> WindowPosition;
    fn set_position(&mut self, position: WindowPosition);
    fn placement(&self) -> WindowPlacement;
    fn set_placement(&mut self, placement: &WindowPlacement);

    //--- Appearance -------------------------------------------------------

    fn set_style(&mut self, style: WindowStyle);
    fn set_title(&mut self, title: &str);
    fn set_cursor_visible(&mut self, visible: bool);

    //--- Display Mode -----------------------------------------------------

    /// Mode the display is currently running in.
    fn current_display_mode(&self) -> DisplayMode;

    /// Switches the display to `mode`. Returns `false` if rejected.
    fn change_display_mode(&mut self, mode: &DisplayMode) -> bool;

    /// Restores the display's default mode. Returns `false` if rejected.
    fn reset_display_mode(&mut self) -> bool;

    //--- Clipboard --------------------------------------------------------

    /// Text on the system clipboard; `Ok(None)` if it holds no text.
    ///
    /// # Errors
    ///
    /// [`PlatformError::Clipboard`](crate::core::error::PlatformError::Clipboard)
    /// if the clipboard cannot be opened.
    fn get_clipboard_text(&mut self) -> Result<Option<String>>;

    /// Replaces the clipboard contents with `text`.
    ///
    /// # Errors
    ///
    /// [`PlatformError::Clipboard`](crate::core::error::PlatformError::Clipboard)
    /// if the clipboard cannot be opened or written.
    fn set_clipboard_text(&mut self, text: &str) -> Result<()>;

    //--- Video ------------------------------------------------------------

    /// Hardware context driver bound to this window.
    ///
    /// # Errors
    ///
    /// Fails if the window has no usable device context or the platform
    /// has no hardware driver.
    fn create_gl_driver(&mut self) -> Result<Box<dyn GlDriver>>;

    /// Software presenter bound to this window.
    ///
    /// # Errors
    ///
    /// Fails if the window cannot be presented to.
    fn create_presenter(&mut self) -> Result<Box<dyn Presenter>>;
}

//=========================================================================
// Unit Tests
//=========================================================================
