//=========================================================================
// Platform Backends
//
// Real implementations of the core's OS seams on top of winit.
//
// Architecture:
// ```text
//  WindowSession::window_update()
//        │
//        ▼
//  WinitHost::pump_messages(sink)
//   └─ EventLoop::pump_app_events(timeout = 0)
//        └─ PumpHandler (ApplicationHandler)
//             ├─ KeyboardInput → keymap → HostMessage::Key (+ Char per text char)
//             ├─ Cursor/Mouse  → HostMessage::Mouse*
//             ├─ Resized/Focus → HostMessage::Resized / Focus
//             └─ Close/Destroy → HostMessage::CloseRequested / Destroyed
//
//  WinitHost::create_presenter()  → SoftbufferPresenter (softbuffer)
//  WinitHost::create_gl_driver()  → WglDriver (Windows only)
//  GilrsGamepads                  → GamepadSource (gilrs)
//  WinitHost::*_clipboard_text()  → arboard::Clipboard (opened lazily)
// ```
//
// Key Design Decisions:
// - **Pumped, not run**: the caller owns the frame loop, so the event
//   loop is pumped with a zero timeout instead of handed control
// - **Window created on first pump**: winit only allows window creation
//   from inside `resumed()`, so `open` pumps once to get there. Resize
//   and focus events raised during that pump are held back and replayed
//   at the start of the first `pump_messages`
// - **Virtual-key numbering**: physical keys are reduced to virtual-key
//   codes here; everything past the host works on that numbering
// - **Pressed-key set**: modifiers are sampled from keys this host has
//   seen go down, and the set is cleared when focus is lost
//
// Main thread requirement: winit mandates the main thread on macOS, so
// the session must be built and driven from there.
//
//=========================================================================

//=== Submodules ==========================================================

mod gamepad;
mod keymap;
mod software;
#[cfg(windows)]
mod wgl;

pub use gamepad::GilrsGamepads;
pub use software::SoftbufferPresenter;
#[cfg(windows)]
pub use wgl::WglDriver;

//=== External Crates =====================================================

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use arboard::Clipboard;
use log::*;
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::PhysicalKey,
    monitor::{MonitorHandle, VideoModeHandle},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Fullscreen, Window, WindowAttributes, WindowId, WindowLevel},
};

//=== Internal Imports ====================================================

use crate::core::error::{PlatformError, Result};
use crate::core::host::{
    DisplayMode, HostMessage, HostMouseButton, HostWindow, KeyboardState, MessageSink, ShowState,
    WindowPlacement, WindowPosition, WindowSize, WindowStyle,
};
use crate::core::settings::WindowSettings;
use crate::core::video::{GlDriver, Presenter};

//=== Constants ===========================================================

const VK_SHIFT: u32 = 0x10;
const VK_CONTROL: u32 = 0x11;
const VK_MENU: u32 = 0x12;
const VK_LSHIFT: u32 = 0xA0;
const VK_RSHIFT: u32 = 0xA1;
const VK_LCONTROL: u32 = 0xA2;
const VK_RCONTROL: u32 = 0xA3;
const VK_LMENU: u32 = 0xA4;
const VK_RMENU: u32 = 0xA5;

const WHEEL_DELTA: f32 = 120.0;

//=== PressedKeys =========================================================

/// Virtual-key codes currently held, as reported by winit.
#[derive(Debug, Default)]
struct PressedKeys(HashSet<u32>);

impl KeyboardState for PressedKeys {
    fn is_key_down(&self, raw_code: u32) -> bool {
        let either = |left, right| self.0.contains(&left) || self.0.contains(&right);
        match raw_code {
            VK_SHIFT => either(VK_LSHIFT, VK_RSHIFT),
            VK_CONTROL => either(VK_LCONTROL, VK_RCONTROL),
            VK_MENU => either(VK_LMENU, VK_RMENU),
            code => self.0.contains(&code),
        }
    }
}

//=== WinitHost ===========================================================

/// Winit window driven by pumping its event loop once per frame.
///
/// # Thread Safety
///
/// NOT Send/Sync; owns the event loop, which must stay on the thread
/// that created it.
pub struct WinitHost {
    event_loop: EventLoop<()>,
    window: Arc<Window>,
    keys: PressedKeys,
    cursor: PhysicalPosition<f64>,
    startup: Vec<WindowEvent>,
    clipboard: Option<Clipboard>,
}

impl WinitHost {
    //--- Construction -----------------------------------------------------

    /// Creates the event loop and the window described by `settings`.
    ///
    /// # Errors
    ///
    /// - [`PlatformError::EventLoop`] if the event loop cannot be created
    ///   (including a second call in the same process)
    /// - [`PlatformError::WindowCreation`] if the window cannot be created
    pub fn open(settings: &WindowSettings) -> Result<Self> {
        debug!(target: "platform", "Creating winit event loop");
        let mut event_loop = EventLoop::new().map_err(|e| PlatformError::EventLoop(e.to_string()))?;

        let attributes = WindowAttributes::default()
            .with_title(settings.effective_title())
            .with_inner_size(PhysicalSize::new(settings.window_width, settings.window_height))
            .with_resizable(settings.is_resizable);

        let mut creator = WindowCreator {
            attributes: Some(attributes),
            window: None,
            error: None,
            startup: Vec::new(),
        };
        if let PumpStatus::Exit(code) = event_loop.pump_app_events(Some(Duration::ZERO), &mut creator) {
            return Err(PlatformError::EventLoop(format!("event loop exited with code {}", code)));
        }

        let window = match creator.window {
            Some(window) => window,
            None => {
                let reason = creator.error.unwrap_or_else(|| "event loop did not resume".to_owned());
                return Err(PlatformError::WindowCreation(reason));
            }
        };

        info!(
            target: "platform",
            "Window created: {}x{} @ {}x DPI",
            window.inner_size().width,
            window.inner_size().height,
            window.scale_factor()
        );

        Ok(Self {
            event_loop,
            window,
            keys: PressedKeys::default(),
            cursor: PhysicalPosition::new(0.0, 0.0),
            startup: creator.startup,
            clipboard: None,
        })
    }

    /// Underlying winit window.
    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    fn monitor(&self) -> Option<MonitorHandle> {
        self.window.current_monitor().or_else(|| self.window.primary_monitor())
    }

    /// System clipboard, opened on first use.
    fn clipboard(&mut self) -> Result<&mut Clipboard> {
        let clipboard = match self.clipboard.take() {
            Some(clipboard) => clipboard,
            None => {
                let clipboard = Clipboard::new().map_err(|e| PlatformError::Clipboard(e.to_string()))?;
                debug!(target: "platform", "System clipboard opened");
                clipboard
            }
        };
        Ok(self.clipboard.insert(clipboard))
    }
}

impl HostWindow for WinitHost {
    fn pump_messages(&mut self, sink: &mut dyn MessageSink) {
        let startup = std::mem::take(&mut self.startup);
        let mut handler = PumpHandler {
            keys: &mut self.keys,
            cursor: &mut self.cursor,
            sink,
        };
        handler.replay(startup);
        if let PumpStatus::Exit(code) = self.event_loop.pump_app_events(Some(Duration::ZERO), &mut handler) {
            debug!(target: "platform", "Event loop exited with code {}", code);
            handler.deliver(HostMessage::Destroyed);
        }
    }

    //--- Geometry ---------------------------------------------------------

    fn client_size(&self) -> WindowSize {
        let size = self.window.inner_size();
        WindowSize::new(size.width, size.height)
    }

    fn set_client_size(&mut self, size: WindowSize) {
        let _ = self.window.request_inner_size(PhysicalSize::new(size.width, size.height));
    }

    fn position(&self) -> WindowPosition {
        self.window
            .outer_position()
            .map(|p| WindowPosition::new(p.x, p.y))
            .unwrap_or_default()
    }

    fn set_position(&mut self, position: WindowPosition) {
        self.window
            .set_outer_position(PhysicalPosition::new(position.left, position.top));
    }

    fn placement(&self) -> WindowPlacement {
        let show = if self.window.is_minimized() == Some(true) {
            ShowState::Minimized
        } else if self.window.is_maximized() {
            ShowState::Maximized
        } else {
            ShowState::Normal
        };
        WindowPlacement {
            position: self.position(),
            size: self.client_size(),
            show,
        }
    }

    fn set_placement(&mut self, placement: &WindowPlacement) {
        self.window.set_minimized(false);
        self.window.set_maximized(false);
        self.set_position(placement.position);
        self.set_client_size(placement.size);
        match placement.show {
            ShowState::Normal => {}
            ShowState::Maximized => self.window.set_maximized(true),
            ShowState::Minimized => self.window.set_minimized(true),
        }
    }

    //--- Appearance -------------------------------------------------------

    fn set_style(&mut self, style: WindowStyle) {
        let (decorated, resizable, level) = match style {
            WindowStyle::Resizable => (true, true, WindowLevel::Normal),
            WindowStyle::Fixed => (true, false, WindowLevel::Normal),
            WindowStyle::Fullscreen => (false, false, WindowLevel::AlwaysOnTop),
        };
        self.window.set_decorations(decorated);
        self.window.set_resizable(resizable);
        self.window.set_window_level(level);
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.window.set_cursor_visible(visible);
    }

    //--- Display Modes ----------------------------------------------------

    fn current_display_mode(&self) -> DisplayMode {
        if let Some(Fullscreen::Exclusive(mode)) = self.window.fullscreen() {
            return display_mode_of(&mode);
        }
        match self.monitor() {
            Some(monitor) => DisplayMode {
                width: monitor.size().width,
                height: monitor.size().height,
                refresh_rate: monitor.refresh_rate_millihertz().map_or(0, millihertz_to_hz),
                color_bits: monitor
                    .video_modes()
                    .map(|m| m.bit_depth() as u32)
                    .max()
                    .unwrap_or(32),
            },
            None => DisplayMode::default(),
        }
    }

    fn change_display_mode(&mut self, mode: &DisplayMode) -> bool {
        let Some(monitor) = self.monitor() else {
            warn!(target: "platform", "No monitor available for a display mode change");
            return false;
        };
        match monitor.video_modes().find(|m| display_mode_of(m) == *mode) {
            Some(video_mode) => {
                self.window.set_fullscreen(Some(Fullscreen::Exclusive(video_mode)));
                true
            }
            None => false,
        }
    }

    fn reset_display_mode(&mut self) -> bool {
        self.window.set_fullscreen(None);
        true
    }

    //--- Clipboard --------------------------------------------------------

    fn get_clipboard_text(&mut self) -> Result<Option<String>> {
        match self.clipboard()?.get_text() {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(PlatformError::Clipboard(e.to_string())),
        }
    }

    fn set_clipboard_text(&mut self, text: &str) -> Result<()> {
        self.clipboard()?
            .set_text(text)
            .map_err(|e| PlatformError::Clipboard(e.to_string()))
    }

    //--- Video ------------------------------------------------------------

    fn create_gl_driver(&mut self) -> Result<Box<dyn GlDriver>> {
        #[cfg(windows)]
        {
            Ok(Box::new(WglDriver::new(&self.window)?))
        }
        #[cfg(not(windows))]
        {
            Err(PlatformError::Unsupported(
                "hardware video driver is only available on Windows".to_owned(),
            ))
        }
    }

    fn create_presenter(&mut self) -> Result<Box<dyn Presenter>> {
        Ok(Box::new(SoftbufferPresenter::new(self.window.clone())?))
    }
}

fn millihertz_to_hz(millihertz: u32) -> u32 {
    (millihertz + 500) / 1000
}

fn display_mode_of(mode: &VideoModeHandle) -> DisplayMode {
    DisplayMode {
        width: mode.size().width,
        height: mode.size().height,
        refresh_rate: millihertz_to_hz(mode.refresh_rate_millihertz()),
        color_bits: mode.bit_depth() as u32,
    }
}

//=== Winit Integration ===================================================

/// One-shot handler that creates the window on the first `resumed()`.
///
/// Resize and focus events that arrive in the same pump are kept in
/// `startup` for the host to replay.
struct WindowCreator {
    attributes: Option<WindowAttributes>,
    window: Option<Arc<Window>>,
    error: Option<String>,
    startup: Vec<WindowEvent>,
}

impl ApplicationHandler for WindowCreator {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(attributes) = self.attributes.take() else {
            return;
        };
        match event_loop.create_window(attributes) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                self.error = Some(e.to_string());
            }
        }
    }

    fn window_event(&mut self, _: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        if is_startup_event(&event) {
            trace!(target: "platform", "Holding startup event: {:?}", event);
            self.startup.push(event);
        }
    }
}

/// Window-state events worth keeping from before the session exists.
fn is_startup_event(event: &WindowEvent) -> bool {
    matches!(event, WindowEvent::Resized(_) | WindowEvent::Focused(_))
}

/// Per-pump handler forwarding winit events to the session's sink.
struct PumpHandler<'a> {
    keys: &'a mut PressedKeys,
    cursor: &'a mut PhysicalPosition<f64>,
    sink: &'a mut dyn MessageSink,
}

impl PumpHandler<'_> {
    fn deliver(&mut self, message: HostMessage) {
        self.sink.on_message(message, &*self.keys);
    }

    fn cursor(&self) -> (i32, i32) {
        (self.cursor.x as i32, self.cursor.y as i32)
    }

    /// Handles events held back while the window was being created.
    fn replay(&mut self, events: Vec<WindowEvent>) {
        for event in events {
            self.handle(event);
        }
    }

    fn handle(&mut self, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.deliver(HostMessage::CloseRequested),

            WindowEvent::Destroyed => self.deliver(HostMessage::Destroyed),

            WindowEvent::Resized(size) => self.deliver(HostMessage::Resized {
                width: size.width,
                height: size.height,
            }),

            WindowEvent::Focused(focused) => {
                if !focused {
                    self.keys.0.clear();
                }
                self.deliver(HostMessage::Focus(focused));
            }

            WindowEvent::KeyboardInput { event: key_event, .. } => {
                let is_down = key_event.state == ElementState::Pressed;

                if let PhysicalKey::Code(code) = key_event.physical_key {
                    match keymap::virtual_key(code) {
                        Some(raw_code) => {
                            let was_down = if is_down {
                                !self.keys.0.insert(raw_code)
                            } else {
                                self.keys.0.remove(&raw_code)
                            };
                            self.deliver(HostMessage::Key { raw_code, is_down, was_down });
                        }
                        None => trace!(target: "platform::input", "Unmapped key ignored: {:?}", code),
                    }
                }

                if is_down {
                    if let Some(text) = &key_event.text {
                        for ch in text.chars() {
                            self.deliver(HostMessage::Char { code: ch as u32 });
                        }
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                *self.cursor = position;
                let (x, y) = self.cursor();
                self.deliver(HostMessage::MouseMove { x, y });
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    WinitMouseButton::Left => HostMouseButton::Left,
                    WinitMouseButton::Right => HostMouseButton::Right,
                    WinitMouseButton::Middle => HostMouseButton::Middle,
                    _ => return,
                };
                let (x, y) = self.cursor();
                self.deliver(HostMessage::MouseButton {
                    button,
                    pressed: state == ElementState::Pressed,
                    x,
                    y,
                });
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let raw = match delta {
                    MouseScrollDelta::LineDelta(_, lines) => lines * WHEEL_DELTA,
                    MouseScrollDelta::PixelDelta(pixels) => pixels.y as f32,
                };
                let raw_delta = raw.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16;
                let (x, y) = self.cursor();
                self.deliver(HostMessage::MouseWheel { x, y, raw_delta });
            }

            _ => {}
        }
    }
}

impl ApplicationHandler for PumpHandler<'_> {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        self.handle(event);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_modifier_codes_match_either_side() {
        let mut keys = PressedKeys::default();
        assert!(!keys.is_key_down(VK_MENU));

        keys.0.insert(VK_RMENU);
        assert!(keys.is_key_down(VK_MENU), "Right Alt should count as Alt");
        assert!(!keys.is_key_down(VK_LMENU));

        keys.0.insert(VK_LCONTROL);
        assert!(keys.is_key_down(VK_CONTROL));
        assert!(!keys.is_key_down(VK_SHIFT));
    }

    #[derive(Default)]
    struct Delivered(Vec<HostMessage>);

    impl MessageSink for Delivered {
        fn on_message(&mut self, message: HostMessage, _keyboard: &dyn KeyboardState) {
            self.0.push(message);
        }
    }

    #[test]
    fn only_resize_and_focus_are_held_at_startup() {
        assert!(is_startup_event(&WindowEvent::Resized(PhysicalSize::new(640, 480))));
        assert!(is_startup_event(&WindowEvent::Focused(true)));
        assert!(!is_startup_event(&WindowEvent::CloseRequested));
        assert!(!is_startup_event(&WindowEvent::Destroyed));
    }

    #[test]
    fn startup_events_replay_in_order() {
        let mut keys = PressedKeys::default();
        keys.0.insert(VK_LSHIFT);
        let mut cursor = PhysicalPosition::new(0.0, 0.0);
        let mut sink = Delivered::default();

        let mut handler = PumpHandler {
            keys: &mut keys,
            cursor: &mut cursor,
            sink: &mut sink,
        };
        handler.replay(vec![
            WindowEvent::Resized(PhysicalSize::new(640, 480)),
            WindowEvent::Focused(true),
            WindowEvent::Focused(false),
        ]);

        assert_eq!(
            sink.0,
            vec![
                HostMessage::Resized { width: 640, height: 480 },
                HostMessage::Focus(true),
                HostMessage::Focus(false),
            ]
        );
        assert!(keys.0.is_empty(), "Focus loss clears held keys");
    }

    #[test]
    fn refresh_rate_rounds_to_nearest_hz() {
        assert_eq!(millihertz_to_hz(59_940), 60);
        assert_eq!(millihertz_to_hz(144_000), 144);
        assert_eq!(millihertz_to_hz(0), 0);
    }
}
