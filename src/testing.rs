//=========================================================================
// Test Doubles
//
// Scripted stand-ins for the OS seams, shared by unit tests across the
// crate: a host window, a hardware context driver, a software presenter
// and a gamepad source. Each records the calls it receives so tests can
// assert on side effects after the double has been moved into a session.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::cell::{Ref, RefCell, RefMut};
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

//=== Internal Dependencies ===============================================

use crate::core::error::{PlatformError, Result};
use crate::core::gamepad::{GamepadSource, RawGamepadState, MAX_GAMEPADS};
use crate::core::host::{
    DisplayMode, HostMessage, HostWindow, KeyboardState, MessageSink, WindowPlacement,
    WindowPosition, WindowSize, WindowStyle,
};
use crate::core::video::{
    stretch_blit, BackBuffer, ContextHandle, GlDriver, GlExtensions, PixelFormat, Presenter,
};

//=== FakeGlDriver ========================================================

/// First handle any [`FakeGlDriver`] hands out; always the baseline context.
pub(crate) const LEGACY: ContextHandle = ContextHandle(1);

#[derive(Debug, Default)]
pub(crate) struct GlScript {
    //--- Behaviour --------------------------------------------------------
    pub extensions: GlExtensions,
    pub reject_pixel_format: bool,
    pub fail_modern_create: bool,
    pub fail_modern_activate: bool,

    //--- Observed ---------------------------------------------------------
    pub next_handle: u64,
    pub current: Option<ContextHandle>,
    pub live: Vec<ContextHandle>,
    pub deleted: Vec<ContextHandle>,
    pub attrib_lists: Vec<Vec<i32>>,
    pub swap_interval: Option<i32>,
    pub swaps: u32,
}

/// Hardware driver whose outcomes are scripted through [`GlScript`].
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeGlDriver {
    script: Rc<RefCell<GlScript>>,
}

impl FakeGlDriver {
    /// Driver resolving every extension.
    pub fn with_extensions() -> Self {
        let driver = Self::default();
        driver.script_mut().extensions = GlExtensions {
            choose_pixel_format: true,
            create_context_attribs: true,
            swap_interval: true,
        };
        driver
    }

    pub fn script(&self) -> Ref<'_, GlScript> {
        self.script.borrow()
    }

    pub fn script_mut(&self) -> RefMut<'_, GlScript> {
        self.script.borrow_mut()
    }
}

impl GlDriver for FakeGlDriver {
    fn apply_pixel_format(&mut self, format: &PixelFormat) -> Result<()> {
        assert_eq!(*format, PixelFormat::default(), "Unexpected pixel format request");
        if self.script().reject_pixel_format {
            Err(PlatformError::PixelFormat("no matching format".into()))
        } else {
            Ok(())
        }
    }

    fn create_legacy_context(&mut self) -> Result<ContextHandle> {
        Ok(self.script_mut().alloc())
    }

    fn make_current(&mut self, context: Option<ContextHandle>) -> bool {
        let mut script = self.script_mut();
        if let Some(ctx) = context {
            if ctx != LEGACY && script.fail_modern_activate {
                return false;
            }
        }
        script.current = context;
        true
    }

    fn delete_context(&mut self, context: ContextHandle) {
        let mut script = self.script_mut();
        script.live.retain(|&c| c != context);
        script.deleted.push(context);
    }

    fn load_extensions(&mut self) -> GlExtensions {
        let script = self.script();
        assert!(script.current.is_some(), "Extensions need a current context");
        script.extensions
    }

    fn create_context_attribs(&mut self, attribs: &[i32]) -> Option<ContextHandle> {
        let mut script = self.script_mut();
        script.attrib_lists.push(attribs.to_vec());
        if script.fail_modern_create {
            None
        } else {
            Some(script.alloc())
        }
    }

    fn set_swap_interval(&mut self, interval: i32) -> bool {
        self.script_mut().swap_interval = Some(interval);
        true
    }

    fn swap_buffers(&mut self) -> Result<()> {
        self.script_mut().swaps += 1;
        Ok(())
    }
}

impl GlScript {
    fn alloc(&mut self) -> ContextHandle {
        self.next_handle += 1;
        let handle = ContextHandle(self.next_handle);
        self.live.push(handle);
        handle
    }
}

//=== RecordingPresenter ==================================================

/// One frame as the window would have shown it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PresentedFrame {
    pub buffer: WindowSize,
    pub target: WindowSize,
    /// Back buffer stretched to `target`.
    pub pixels: Vec<u32>,
}

/// Presenter recording every frame it is given.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingPresenter {
    pub frames: Rc<RefCell<Vec<PresentedFrame>>>,
}

impl Presenter for RecordingPresenter {
    fn present(&mut self, buffer: &BackBuffer, target: WindowSize) -> Result<()> {
        let mut pixels = vec![0; target.width as usize * target.height as usize];
        stretch_blit(buffer, &mut pixels, target.width, target.height);
        self.frames.borrow_mut().push(PresentedFrame {
            buffer: buffer.size(),
            target,
            pixels,
        });
        Ok(())
    }
}

//=== FakeHost ============================================================

/// Host window living entirely in memory.
///
/// Messages queued with [`FakeHost::queue`] are delivered on the next
/// pump. Held keys are reported through [`KeyboardState`].
#[derive(Debug)]
pub(crate) struct FakeHost {
    pub pending: VecDeque<HostMessage>,
    pub held: HashSet<u32>,

    pub client: WindowSize,
    pub placement: WindowPlacement,
    pub style: WindowStyle,
    pub title: String,
    pub cursor_visible: bool,

    pub desktop: DisplayMode,
    pub display: DisplayMode,
    pub reject_display_change: bool,
    pub display_changes: Vec<DisplayMode>,

    pub clipboard: Option<String>,
    pub clipboard_unavailable: bool,

    pub gl: Option<FakeGlDriver>,
    pub presenter: Option<RecordingPresenter>,

    /// Shared record of drops; the host appends `"host"` when dropped.
    pub teardown: Rc<RefCell<Vec<&'static str>>>,
}

impl FakeHost {
    pub fn new(client: WindowSize) -> Self {
        let desktop = DisplayMode {
            width: 1920,
            height: 1080,
            refresh_rate: 60,
            color_bits: 32,
        };
        Self {
            pending: VecDeque::new(),
            held: HashSet::new(),
            client,
            placement: WindowPlacement {
                position: WindowPosition::new(100, 100),
                size: client,
                ..Default::default()
            },
            style: WindowStyle::Resizable,
            title: String::new(),
            cursor_visible: true,
            desktop,
            display: desktop,
            reject_display_change: false,
            display_changes: Vec::new(),
            clipboard: None,
            clipboard_unavailable: false,
            gl: None,
            presenter: Some(RecordingPresenter::default()),
            teardown: Rc::default(),
        }
    }

    pub fn queue(&mut self, message: HostMessage) {
        self.pending.push_back(message);
    }
}

impl Drop for FakeHost {
    fn drop(&mut self) {
        self.teardown.borrow_mut().push("host");
    }
}

struct HeldKeys<'a>(&'a HashSet<u32>);

impl KeyboardState for HeldKeys<'_> {
    fn is_key_down(&self, raw_code: u32) -> bool {
        self.0.contains(&raw_code)
    }
}

impl HostWindow for FakeHost {
    fn pump_messages(&mut self, sink: &mut dyn MessageSink) {
        while let Some(message) = self.pending.pop_front() {
            if let HostMessage::Resized { width, height } = message {
                self.client = WindowSize::new(width, height);
                self.placement.size = self.client;
            }
            sink.on_message(message, &HeldKeys(&self.held));
        }
    }

    fn client_size(&self) -> WindowSize {
        self.client
    }

    fn set_client_size(&mut self, size: WindowSize) {
        self.client = size;
        self.placement.size = size;
    }

    fn position(&self) -> WindowPosition {
        self.placement.position
    }

    fn set_position(&mut self, position: WindowPosition) {
        self.placement.position = position;
    }

    fn placement(&self) -> WindowPlacement {
        self.placement
    }

    fn set_placement(&mut self, placement: &WindowPlacement) {
        self.placement = *placement;
        self.client = placement.size;
    }

    fn set_style(&mut self, style: WindowStyle) {
        self.style = style;
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_owned();
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }

    fn current_display_mode(&self) -> DisplayMode {
        self.display
    }

    fn change_display_mode(&mut self, mode: &DisplayMode) -> bool {
        self.display_changes.push(*mode);
        if self.reject_display_change {
            return false;
        }
        self.display = *mode;
        true
    }

    fn reset_display_mode(&mut self) -> bool {
        self.display = self.desktop;
        true
    }

    fn get_clipboard_text(&mut self) -> Result<Option<String>> {
        if self.clipboard_unavailable {
            return Err(PlatformError::Clipboard("fake clipboard is locked".into()));
        }
        Ok(self.clipboard.clone())
    }

    fn set_clipboard_text(&mut self, text: &str) -> Result<()> {
        if self.clipboard_unavailable {
            return Err(PlatformError::Clipboard("fake clipboard is locked".into()));
        }
        self.clipboard = Some(text.to_owned());
        Ok(())
    }

    fn create_gl_driver(&mut self) -> Result<Box<dyn GlDriver>> {
        match &self.gl {
            Some(driver) => Ok(Box::new(driver.clone())),
            None => Err(PlatformError::Unsupported("no hardware driver on fake host".into())),
        }
    }

    fn create_presenter(&mut self) -> Result<Box<dyn Presenter>> {
        match &self.presenter {
            Some(presenter) => Ok(Box::new(presenter.clone())),
            None => Err(PlatformError::Present("no presenter on fake host".into())),
        }
    }
}

//=== ScriptedGamepads ====================================================

/// Gamepad source whose per-slot reports are set from the test body.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedGamepads {
    slots: Rc<RefCell<[Option<RawGamepadState>; MAX_GAMEPADS]>>,
    frames: Rc<RefCell<u32>>,
}

impl ScriptedGamepads {
    pub fn set(&self, slot: usize, report: Option<RawGamepadState>) {
        self.slots.borrow_mut()[slot] = report;
    }

    pub fn frames(&self) -> u32 {
        *self.frames.borrow()
    }
}

impl GamepadSource for ScriptedGamepads {
    fn begin_frame(&mut self) {
        *self.frames.borrow_mut() += 1;
    }

    fn query(&mut self, slot: usize) -> Option<RawGamepadState> {
        self.slots.borrow()[slot]
    }
}
