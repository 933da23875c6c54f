//=========================================================================
// Window Session
//
// Owning facade over one host window and everything attached to it.
//
// Architecture:
// ```text
//     PlatformBuilder ──build()──> WindowSession<H>
//         │                           │
//         ├─ with_flags()             ├─ window_update()      gamepads → pump → translate → queue
//         ├─ with_settings()          ├─ poll_window_event()  FIFO drain
//         ├─ with_event_capacity()    ├─ window_flip()        VideoBackend::present
//         ├─ with_error_mode()        ├─ set_window_*()       host + fullscreen state
//         └─ with_gamepads()          └─ release()            leave fullscreen, free video
// ```
//
// Frame contract (single thread, never blocks):
// ```text
//   while session.window_update() {
//       while let Some(event) = session.poll_window_event() { ... }
//       render
//       session.window_flip();
//   }
// ```
//
// Init order: host window → event queue → initial fullscreen → video
// backend → gamepads → running. A failure at any step tears down what
// was already brought up and returns an `InitError` carrying the
// diagnostic history.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, error, info, warn};

//=== Internal Dependencies ===============================================

use crate::core::error::{ErrorLog, ErrorMode, InitError, PlatformError, Result};
use crate::core::event::Event;
use crate::core::event_queue::{EventQueue, DEFAULT_EVENT_CAPACITY};
use crate::core::fullscreen::FullscreenState;
use crate::core::gamepad::{DisconnectedGamepads, GamepadPoller, GamepadSource, MAX_GAMEPADS};
use crate::core::host::{
    DisplayMode, HostMessage, HostWindow, KeyboardState, MessageSink, WindowPosition, WindowSize,
    WindowStyle,
};
use crate::core::settings::{InitFlags, Settings, WindowSettings};
use crate::core::translator::{is_close_chord, translate_message};
use crate::core::video::{
    create_backend, BackBuffer, NegotiatedContext, NullBackend, VideoBackend, VideoDriverKind,
};

#[cfg(any(
    windows,
    target_os = "macos",
    target_os = "linux",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
))]
use crate::platform::{GilrsGamepads, WinitHost};

//=== PlatformBuilder =====================================================

/// Builder for configuring and opening a [`WindowSession`].
///
/// # Default Values
///
/// - **Flags**: [`InitFlags::ALL`] (window + video)
/// - **Settings**: [`Settings::default`]
/// - **Event capacity**: 32768 events
/// - **Error mode**: history of up to 1024 diagnostics
///
/// # Examples
///
/// ```no_run
/// use aetheric_platform::PlatformBuilder;
/// use aetheric_platform::core::settings::Settings;
/// use aetheric_platform::core::video::VideoDriverKind;
///
/// let mut session = PlatformBuilder::new()
///     .with_settings(
///         Settings::default()
///             .with_title("Demo")
///             .with_driver(VideoDriverKind::Software),
///     )
///     .build()
///     .expect("platform init failed");
///
/// while session.window_update() {
///     while let Some(event) = session.poll_window_event() {
///         println!("{:?}", event);
///     }
///     session.window_flip();
/// }
/// ```
pub struct PlatformBuilder {
    flags: InitFlags,
    settings: Settings,
    event_capacity: usize,
    error_mode: ErrorMode,
    gamepads: Option<Box<dyn GamepadSource>>,
}

impl PlatformBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            flags: InitFlags::default(),
            settings: Settings::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
            error_mode: ErrorMode::default(),
            gamepads: None,
        }
    }

    /// Selects the subsystems to bring up. `VIDEO` implies `WINDOW`.
    pub fn with_flags(mut self, flags: InitFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the maximum number of undrained events.
    ///
    /// Events pushed while the queue is full are dropped.
    ///
    /// Default: 32768
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Event capacity must be positive");
        self.event_capacity = capacity;
        self
    }

    /// Selects single-slot or history storage for diagnostics.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Overrides the gamepad backend.
    pub fn with_gamepads(mut self, source: Box<dyn GamepadSource>) -> Self {
        self.gamepads = Some(source);
        self
    }

    //--- Build ------------------------------------------------------------

    /// Opens a winit-backed session on the calling thread.
    ///
    /// Uses gilrs for gamepads unless [`with_gamepads`](Self::with_gamepads)
    /// was called. Must be called from the main thread on platforms that
    /// require it, and at most once per process.
    ///
    /// # Errors
    ///
    /// See [`build_with_host`](Self::build_with_host).
    #[cfg(any(
        windows,
        target_os = "macos",
        target_os = "linux",
        target_os = "freebsd",
        target_os = "dragonfly",
        target_os = "netbsd",
        target_os = "openbsd"
    ))]
    pub fn build(mut self) -> std::result::Result<WindowSession<WinitHost>, InitError> {
        if self.gamepads.is_none() {
            let source: Box<dyn GamepadSource> = match GilrsGamepads::new() {
                Ok(source) => Box::new(source),
                Err(e) => {
                    warn!(target: "platform::input", "Gamepad backend unavailable: {}", e);
                    Box::new(DisconnectedGamepads)
                }
            };
            self.gamepads = Some(source);
        }
        self.build_with_host(WinitHost::open)
    }

    /// Opens a session over a caller-supplied host window.
    ///
    /// `open` receives the window settings and creates the window.
    ///
    /// # Errors
    ///
    /// - [`PlatformError::NothingRequested`] if the flags request no window
    /// - whatever `open` returns
    /// - video backend failures (missing driver, hard negotiation failure)
    ///
    /// Every failure is also recorded in [`InitError::errors`].
    pub fn build_with_host<H, F>(self, open: F) -> std::result::Result<WindowSession<H>, InitError>
    where
        H: HostWindow,
        F: FnOnce(&WindowSettings) -> Result<H>,
    {
        let PlatformBuilder {
            flags,
            mut settings,
            event_capacity,
            error_mode,
            gamepads,
        } = self;
        let mut errors = ErrorLog::new(error_mode);
        let flags = flags.normalized();

        info!(target: "platform", "Initializing platform (flags: {:?})", flags);

        //--- 1. Window ----------------------------------------------------
        if !flags.contains(InitFlags::WINDOW) {
            return Err(init_failure(PlatformError::NothingRequested, errors));
        }

        let mut host = match open(&settings.window) {
            Ok(host) => host,
            Err(e) => return Err(init_failure(e, errors)),
        };

        //--- 2. Event queue -----------------------------------------------
        let queue = EventQueue::new(event_capacity);
        debug!(target: "platform", "Event queue ready (capacity: {})", event_capacity);

        //--- 3. Initial fullscreen ----------------------------------------
        let mut fullscreen = FullscreenState::new();
        if settings.window.is_fullscreen {
            let request = DisplayMode {
                width: settings.window.fullscreen_width,
                height: settings.window.fullscreen_height,
                ..Default::default()
            };
            settings.window.is_fullscreen =
                fullscreen.enter(&mut host, &request, settings.window.is_resizable);
        }

        //--- 4. Video -----------------------------------------------------
        let video: Box<dyn VideoBackend> = if flags.contains(InitFlags::VIDEO) {
            match create_backend(&mut host, &settings.video, &mut errors) {
                Ok(backend) => backend,
                Err(e) => {
                    if fullscreen.is_fullscreen() {
                        fullscreen.leave(&mut host, settings.window.is_resizable);
                    }
                    return Err(init_failure(e, errors));
                }
            }
        } else {
            settings.video.driver = VideoDriverKind::None;
            Box::new(NullBackend)
        };

        //--- 5. Gamepads --------------------------------------------------
        let gamepads = GamepadPoller::new(gamepads.unwrap_or_else(|| Box::new(DisconnectedGamepads)));

        info!(
            target: "platform",
            "Platform ready: {}x{} window, {:?} video",
            host.client_size().width,
            host.client_size().height,
            video.kind()
        );

        Ok(WindowSession {
            video,
            host,
            queue,
            gamepads,
            fullscreen,
            settings,
            flags,
            errors,
            running: true,
            cursor_visible: true,
            released: false,
        })
    }
}

impl Default for PlatformBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn init_failure(source: PlatformError, mut errors: ErrorLog) -> InitError {
    error!(target: "platform", "Platform initialization failed: {}", source);
    if errors.last_error() != Some(source.to_string().as_str()) {
        errors.push_error(&source);
    }
    InitError { source, errors }
}

/// Opens a winit-backed session with the given flags and settings.
///
/// Shorthand for `PlatformBuilder::new().with_flags(flags).with_settings(settings).build()`.
#[cfg(any(
    windows,
    target_os = "macos",
    target_os = "linux",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
))]
pub fn init_platform(
    flags: InitFlags,
    settings: Settings,
) -> std::result::Result<WindowSession<WinitHost>, InitError> {
    PlatformBuilder::new().with_flags(flags).with_settings(settings).build()
}

//=== WindowSession =======================================================

/// A live window with its event queue, video backend and gamepads.
///
/// Not `Send`: every call must come from the thread that built it.
/// Dropping the session releases it; [`release`](Self::release) does the
/// same explicitly.
pub struct WindowSession<H: HostWindow> {
    // Fields drop in declaration order. The backend holds surfaces and
    // contexts tied to the host's window, so it goes first.
    video: Box<dyn VideoBackend>,
    host: H,
    queue: EventQueue,
    gamepads: GamepadPoller,
    fullscreen: FullscreenState,
    settings: Settings,
    flags: InitFlags,
    errors: ErrorLog,
    running: bool,
    cursor_visible: bool,
    released: bool,
}

impl<H: HostWindow> WindowSession<H> {
    //--- Frame Loop -------------------------------------------------------

    /// Polls gamepads and drains pending host messages into the queue.
    ///
    /// Returns whether the window is still running. Never blocks.
    pub fn window_update(&mut self) -> bool {
        self.gamepads.poll(&mut self.queue);

        let mut sink = FrameSink {
            queue: &mut self.queue,
            video: self.video.as_mut(),
            settings: &mut self.settings,
            running: &mut self.running,
            fullscreen: self.fullscreen.is_fullscreen(),
        };
        self.host.pump_messages(&mut sink);

        self.running
    }

    /// Next queued event in FIFO order, or `None` once drained.
    pub fn poll_window_event(&mut self) -> Option<Event> {
        self.queue.poll()
    }

    /// Presents the current frame.
    ///
    /// Hardware: swaps buffers. Software: stretches the back buffer over
    /// the client area. Failures are logged and recorded as diagnostics.
    pub fn window_flip(&mut self) {
        let client = self.host.client_size();
        if let Err(e) = self.video.present(client) {
            warn!(target: "platform::video", "Present failed: {}", e);
            self.errors.push_error(&e);
        }
    }

    //--- Fullscreen -------------------------------------------------------

    /// Enters or leaves fullscreen.
    ///
    /// Zero `width`/`height`/`refresh_rate` keep the display's current
    /// values. Returns whether the window ends up in the requested state;
    /// a rejected mode change leaves the window windowed and returns
    /// `false`.
    ///
    /// # Panics
    ///
    /// In debug builds, if the window is already in the requested state.
    /// Release builds ignore such a call and return `true`.
    pub fn set_window_fullscreen(&mut self, enable: bool, width: u32, height: u32, refresh_rate: u32) -> bool {
        let fullscreen = self.fullscreen.is_fullscreen();
        debug_assert!(
            enable != fullscreen,
            "set_window_fullscreen({}) called while already {}",
            enable,
            if fullscreen { "fullscreen" } else { "windowed" }
        );
        if enable == fullscreen {
            return true;
        }

        let resizable = self.settings.window.is_resizable;
        if enable {
            let request = DisplayMode {
                width,
                height,
                refresh_rate,
                color_bits: 0,
            };
            let entered = self.fullscreen.enter(&mut self.host, &request, resizable);
            self.settings.window.is_fullscreen = entered;
            if entered {
                self.settings.window.fullscreen_width = width;
                self.settings.window.fullscreen_height = height;
            }
            entered
        } else {
            if !self.fullscreen.leave(&mut self.host, resizable) {
                warn!(target: "platform", "Display mode reset was rejected");
            }
            self.settings.window.is_fullscreen = false;
            true
        }
    }

    pub fn is_window_fullscreen(&self) -> bool {
        self.fullscreen.is_fullscreen()
    }

    //--- Window Properties ------------------------------------------------

    /// Switches between resizable and fixed frames. Ignored while
    /// fullscreen.
    pub fn set_window_resizable(&mut self, resizable: bool) {
        if self.fullscreen.is_fullscreen() {
            debug!(target: "platform", "Resizable change ignored while fullscreen");
            return;
        }
        self.host.set_style(WindowStyle::windowed(resizable));
        self.settings.window.is_resizable = resizable;
    }

    /// Whether the window currently has a resizable frame.
    pub fn is_window_resizable(&self) -> bool {
        !self.fullscreen.is_fullscreen() && self.settings.window.is_resizable
    }

    /// Client area size.
    pub fn window_area(&self) -> WindowSize {
        self.host.client_size()
    }

    /// Resizes the client area (the frame grows around it).
    pub fn set_window_area(&mut self, width: u32, height: u32) {
        self.host.set_client_size(WindowSize::new(width, height));
    }

    pub fn window_position(&self) -> WindowPosition {
        self.host.position()
    }

    pub fn set_window_position(&mut self, left: i32, top: i32) {
        self.host.set_position(WindowPosition::new(left, top));
    }

    pub fn set_window_title(&mut self, title: &str) {
        self.host.set_title(title);
        self.settings.window.title = title.to_owned();
    }

    /// Shows or hides the cursor over the client area.
    pub fn set_window_cursor_enabled(&mut self, enabled: bool) {
        self.host.set_cursor_visible(enabled);
        self.cursor_visible = enabled;
    }

    pub fn is_window_cursor_enabled(&self) -> bool {
        self.cursor_visible
    }

    pub fn is_window_running(&self) -> bool {
        self.running
    }

    //--- Clipboard --------------------------------------------------------

    /// Text currently on the system clipboard.
    ///
    /// `None` if the clipboard holds no text or cannot be read; a read
    /// failure is also recorded as a diagnostic.
    pub fn get_clipboard_text(&mut self) -> Option<String> {
        match self.host.get_clipboard_text() {
            Ok(text) => text,
            Err(e) => {
                warn!(target: "platform", "{}", e);
                self.errors.push_error(&e);
                None
            }
        }
    }

    /// Replaces the clipboard contents with `text`.
    ///
    /// Returns `false` and records a diagnostic if the clipboard cannot
    /// be written.
    pub fn set_clipboard_text(&mut self, text: &str) -> bool {
        match self.host.set_clipboard_text(text) {
            Ok(()) => {
                debug!(target: "platform", "Clipboard set ({} bytes)", text.len());
                true
            }
            Err(e) => {
                warn!(target: "platform", "{}", e);
                self.errors.push_error(&e);
                false
            }
        }
    }

    //--- Video ------------------------------------------------------------

    /// Software back buffer, if the software driver is active.
    pub fn video_back_buffer(&mut self) -> Option<&mut BackBuffer> {
        self.video.back_buffer()
    }

    /// Reallocates the software back buffer. `false` for other drivers.
    pub fn resize_video_back_buffer(&mut self, width: u32, height: u32) -> bool {
        self.video.resize_back_buffer(width, height)
    }

    pub fn video_driver(&self) -> VideoDriverKind {
        self.video.kind()
    }

    /// Active hardware context, if the hardware driver is active.
    pub fn video_context(&self) -> Option<&NegotiatedContext> {
        self.video.context()
    }

    //--- Diagnostics ------------------------------------------------------

    /// Most recent diagnostic.
    pub fn last_error(&self) -> Option<&str> {
        self.errors.last_error()
    }

    /// Diagnostic at `index`; see [`ErrorLog::error_at`].
    pub fn error_at(&self, index: usize) -> Option<&str> {
        self.errors.error_at(index)
    }

    pub fn error_count(&self) -> usize {
        self.errors.count()
    }

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    //--- Introspection ----------------------------------------------------

    /// Settings in effect, reflecting runtime changes.
    pub fn current_settings(&self) -> &Settings {
        &self.settings
    }

    pub fn init_flags(&self) -> InitFlags {
        self.flags
    }

    pub fn gamepad_connections(&self) -> [bool; MAX_GAMEPADS] {
        self.gamepads.connections()
    }

    /// Events dropped because the queue was full.
    pub fn dropped_event_count(&self) -> u64 {
        self.queue.dropped()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    //--- Teardown ---------------------------------------------------------

    /// Leaves fullscreen, releases the video backend and consumes the
    /// session.
    pub fn release(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.released {
            return;
        }
        if self.fullscreen.is_fullscreen() {
            self.fullscreen.leave(&mut self.host, self.settings.window.is_resizable);
            self.settings.window.is_fullscreen = false;
        }
        self.video.release();
        self.running = false;
        self.released = true;
        info!(target: "platform", "Platform released");
    }
}

impl<H: HostWindow> Drop for WindowSession<H> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

//=== FrameSink ===========================================================

// Per-pump view of the session the host delivers messages into.
struct FrameSink<'a> {
    queue: &'a mut EventQueue,
    video: &'a mut dyn VideoBackend,
    settings: &'a mut Settings,
    running: &'a mut bool,
    fullscreen: bool,
}

impl MessageSink for FrameSink<'_> {
    fn on_message(&mut self, message: HostMessage, keyboard: &dyn KeyboardState) {
        match message {
            HostMessage::CloseRequested | HostMessage::Destroyed => {
                info!(target: "platform", "Window close requested ({:?})", message);
                *self.running = false;
            }
            HostMessage::Resized { width, height } => self.on_resized(width, height),
            _ => {}
        }

        if is_close_chord(&message, keyboard) {
            info!(target: "platform", "Alt+F4 pressed, closing window");
            *self.running = false;
        }

        if let Some(event) = translate_message(&message, keyboard) {
            self.queue.push(event);
        }
    }
}

impl FrameSink<'_> {
    fn on_resized(&mut self, width: u32, height: u32) {
        if !self.fullscreen && width > 0 && height > 0 {
            self.settings.window.window_width = width;
            self.settings.window.window_height = height;
        }

        let auto_size = self.settings.video.auto_size && self.video.kind() == VideoDriverKind::Software;
        if auto_size
            && width > 0
            && height > 0
            && self.video.back_buffer_size() != Some(WindowSize::new(width, height))
        {
            self.video.resize_back_buffer(width, height);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::{GamepadEvent, KeyboardEventKind, WindowEvent};
    use crate::core::gamepad::RawGamepadState;
    use crate::core::host::ShowState;
    use crate::core::translator::{VK_F4, VK_MENU};
    use crate::core::video::{ContextKind, VideoProfile, CLEAR_COLOR};
    use crate::testing::{FakeGlDriver, FakeHost, ScriptedGamepads, LEGACY};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn software_settings() -> Settings {
        Settings::default().with_driver(VideoDriverKind::Software)
    }

    fn open_with(settings: Settings) -> WindowSession<FakeHost> {
        PlatformBuilder::new()
            .with_settings(settings)
            .build_with_host(|window| {
                Ok(FakeHost::new(WindowSize::new(window.window_width, window.window_height)))
            })
            .unwrap()
    }

    fn open_hardware(driver: FakeGlDriver, settings: Settings) -> std::result::Result<WindowSession<FakeHost>, InitError> {
        PlatformBuilder::new()
            .with_settings(settings.with_driver(VideoDriverKind::Hardware))
            .build_with_host(move |window| {
                let mut host = FakeHost::new(WindowSize::new(window.window_width, window.window_height));
                host.gl = Some(driver);
                Ok(host)
            })
    }

    fn drain(session: &mut WindowSession<FakeHost>) -> Vec<Event> {
        std::iter::from_fn(|| session.poll_window_event()).collect()
    }

    //=====================================================================
    // PlatformBuilder Tests
    //=====================================================================

    #[test]
    fn builder_defaults() {
        let builder = PlatformBuilder::new();
        assert_eq!(builder.flags, InitFlags::ALL);
        assert_eq!(builder.event_capacity, DEFAULT_EVENT_CAPACITY);
        assert_eq!(builder.error_mode, ErrorMode::default());
        assert!(builder.gamepads.is_none());
    }

    #[test]
    #[should_panic(expected = "Event capacity must be positive")]
    fn builder_with_zero_capacity_panics() {
        PlatformBuilder::new().with_event_capacity(0);
    }

    #[test]
    fn empty_flags_fail_init() {
        let result = PlatformBuilder::new()
            .with_flags(InitFlags::empty())
            .build_with_host(|_| Ok(FakeHost::new(WindowSize::new(1, 1))));

        let err = result.err().expect("Init must fail without a window");
        assert_eq!(err.source, PlatformError::NothingRequested);
        assert!(err.last_error().is_some());
    }

    #[test]
    fn host_open_failure_is_reported() {
        let result = PlatformBuilder::new().build_with_host(|_| -> Result<FakeHost> {
            Err(PlatformError::WindowCreation("denied".into()))
        });

        let err = result.err().expect("Init must fail");
        assert_eq!(err.last_error(), Some("Failed to create window: denied"));
        assert_eq!(err.errors.count(), 1);
    }

    #[test]
    fn window_only_session_has_no_video() {
        let session = PlatformBuilder::new()
            .with_flags(InitFlags::WINDOW)
            .with_settings(software_settings())
            .build_with_host(|_| Ok(FakeHost::new(WindowSize::new(10, 10))))
            .unwrap();

        assert_eq!(session.video_driver(), VideoDriverKind::None);
        assert_eq!(session.current_settings().video.driver, VideoDriverKind::None);
    }

    #[test]
    fn video_flag_implies_window() {
        let session = PlatformBuilder::new()
            .with_flags(InitFlags::VIDEO)
            .with_settings(software_settings())
            .build_with_host(|_| Ok(FakeHost::new(WindowSize::new(10, 10))))
            .unwrap();
        assert_eq!(session.init_flags(), InitFlags::ALL);
    }

    //=====================================================================
    // Frame Loop
    //=====================================================================

    #[test]
    fn update_translates_messages_in_order() {
        let mut session = open_with(software_settings());
        session.host_mut().queue(HostMessage::Focus(true));
        session.host_mut().queue(HostMessage::Key { raw_code: 0x41, is_down: true, was_down: false });
        session.host_mut().queue(HostMessage::MouseMove { x: 3, y: 4 });

        assert!(session.window_update());
        let events = drain(&mut session);

        assert_eq!(events.len(), 3);
        assert_eq!(events[0], Event::Window(WindowEvent::GotFocus));
        assert!(matches!(events[1], Event::Keyboard(k) if k.kind == KeyboardEventKind::KeyDown));
        assert!(matches!(events[2], Event::Mouse(m) if (m.x, m.y) == (3, 4)));
    }

    #[test]
    fn undrained_events_survive_next_update() {
        let mut session = open_with(software_settings());
        session.host_mut().queue(HostMessage::Focus(true));
        session.host_mut().queue(HostMessage::Focus(false));
        session.window_update();
        assert_eq!(session.poll_window_event(), Some(Event::Window(WindowEvent::GotFocus)));

        session.host_mut().queue(HostMessage::Resized { width: 20, height: 10 });
        session.window_update();

        assert_eq!(
            drain(&mut session),
            vec![
                Event::Window(WindowEvent::LostFocus),
                Event::Window(WindowEvent::Resized { width: 20, height: 10 }),
            ]
        );
    }

    #[test]
    fn close_request_stops_running() {
        let mut session = open_with(software_settings());
        session.host_mut().queue(HostMessage::CloseRequested);

        assert!(!session.window_update());
        assert!(!session.is_window_running());
        assert!(drain(&mut session).is_empty(), "Close produces no event");
    }

    #[test]
    fn alt_f4_stops_running_and_still_reports_key() {
        let mut session = open_with(software_settings());
        session.host_mut().held.insert(VK_MENU);
        session.host_mut().queue(HostMessage::Key { raw_code: VK_F4, is_down: true, was_down: false });

        assert!(!session.window_update());
        assert_eq!(drain(&mut session).len(), 1);
    }

    #[test]
    fn queue_overflow_drops_excess_events() {
        let mut session = PlatformBuilder::new()
            .with_settings(software_settings())
            .with_event_capacity(2)
            .build_with_host(|_| Ok(FakeHost::new(WindowSize::new(10, 10))))
            .unwrap();
        for _ in 0..5 {
            session.host_mut().queue(HostMessage::Focus(true));
        }

        session.window_update();
        assert_eq!(drain(&mut session).len(), 2);
        assert_eq!(session.dropped_event_count(), 3);
    }

    //=====================================================================
    // Gamepads
    //=====================================================================

    #[test]
    fn gamepad_events_precede_host_messages() {
        let pads = ScriptedGamepads::default();
        pads.set(0, Some(RawGamepadState::default()));
        let mut session = PlatformBuilder::new()
            .with_settings(software_settings())
            .with_gamepads(Box::new(pads.clone()))
            .build_with_host(|_| Ok(FakeHost::new(WindowSize::new(10, 10))))
            .unwrap();
        session.host_mut().queue(HostMessage::Focus(true));

        session.window_update();
        assert_eq!(
            drain(&mut session),
            vec![
                Event::Gamepad(GamepadEvent::Connected { device_index: 0 }),
                Event::Window(WindowEvent::GotFocus),
            ]
        );
        assert_eq!(session.gamepad_connections(), [true, false, false, false]);

        for _ in 0..3 {
            session.window_update();
            let events = drain(&mut session);
            assert!(
                matches!(events.as_slice(), [Event::Gamepad(GamepadEvent::StateChanged { device_index: 0, .. })]),
                "Expected one StateChanged per frame, got {:?}",
                events
            );
        }
        assert_eq!(pads.frames(), 4);
    }

    //=====================================================================
    // Software Video
    //=====================================================================

    #[test]
    fn software_back_buffer_matches_client_area() {
        let mut session = open_with(software_settings().with_window_size(64, 48));
        let buffer = session.video_back_buffer().expect("Software driver has a back buffer");

        assert_eq!((buffer.width(), buffer.height()), (64, 48));
        assert_eq!(buffer.stride(), 64 * 4);
        assert!(buffer.pixels().iter().all(|&p| p == CLEAR_COLOR));
    }

    #[test]
    fn flip_presents_at_client_size() {
        let mut session = open_with(software_settings().with_window_size(32, 32));
        let frames = session.host().presenter.as_ref().unwrap().frames.clone();
        session.set_window_area(64, 64);

        session.window_flip();

        let frames = frames.borrow();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].buffer, WindowSize::new(32, 32));
        assert_eq!(frames[0].target, WindowSize::new(64, 64));
    }

    #[test]
    fn resize_message_reallocates_with_auto_size() {
        let mut session = open_with(software_settings().with_window_size(32, 32));
        session.host_mut().queue(HostMessage::Resized { width: 50, height: 40 });
        session.window_update();

        let buffer = session.video_back_buffer().unwrap();
        assert_eq!((buffer.width(), buffer.height()), (50, 40));
        assert_eq!(session.current_settings().window.window_width, 50);
    }

    #[test]
    fn resize_message_keeps_buffer_without_auto_size() {
        let mut session = open_with(software_settings().with_window_size(32, 32).with_auto_size(false));
        session.host_mut().queue(HostMessage::Resized { width: 50, height: 40 });
        session.window_update();

        let buffer = session.video_back_buffer().unwrap();
        assert_eq!((buffer.width(), buffer.height()), (32, 32));
    }

    #[test]
    fn explicit_back_buffer_resize() {
        let mut session = open_with(software_settings());
        assert!(session.resize_video_back_buffer(16, 8));
        assert_eq!(session.video_back_buffer().map(|b| b.size()), Some(WindowSize::new(16, 8)));
    }

    #[test]
    fn oversized_client_fails_software_init() {
        let result = PlatformBuilder::new()
            .with_settings(software_settings())
            .build_with_host(|_| Ok(FakeHost::new(WindowSize::new(1 << 30, 1))));

        let err = result.err().expect("Back buffer allocation must fail");
        assert!(matches!(err.source, PlatformError::Allocation(_)));
        assert_eq!(err.errors.count(), 1);
    }

    #[test]
    fn failed_back_buffer_resize_keeps_buffer() {
        let mut session = open_with(software_settings().with_window_size(32, 32));
        assert!(!session.resize_video_back_buffer(1 << 29, 1 << 29));
        assert_eq!(session.video_back_buffer().map(|b| b.size()), Some(WindowSize::new(32, 32)));
    }

    #[test]
    fn missing_presenter_fails_init() {
        let result = PlatformBuilder::new()
            .with_settings(software_settings())
            .build_with_host(|_| {
                let mut host = FakeHost::new(WindowSize::new(10, 10));
                host.presenter = None;
                Ok(host)
            });
        assert!(matches!(result.err().map(|e| e.source), Some(PlatformError::Present(_))));
    }

    //=====================================================================
    // Hardware Video
    //=====================================================================

    #[test]
    fn core_profile_without_extensions_fails_init() {
        let result = open_hardware(
            FakeGlDriver::default(),
            Settings::default().with_profile(VideoProfile::Core, 3, 3),
        );

        let err = result.err().expect("Core without entry points must fail");
        assert!(matches!(err.source, PlatformError::Profile(_)));
        assert!(err.last_error().is_some_and(|e| !e.is_empty()));
    }

    #[test]
    fn core_profile_creation_failure_falls_back() {
        let driver = FakeGlDriver::with_extensions();
        driver.script_mut().fail_modern_create = true;

        let session = open_hardware(driver.clone(), Settings::default().with_profile(VideoProfile::Core, 3, 3))
            .expect("Soft failure must not fail init");

        let context = session.video_context().expect("Hardware context expected");
        assert_eq!(context.kind, ContextKind::Baseline);
        assert_eq!(driver.script().current, Some(LEGACY));
        assert_eq!(session.error_count(), 1);
        assert!(session.video_back_buffer_is_absent());
    }

    #[test]
    fn hardware_flip_swaps_buffers() {
        let driver = FakeGlDriver::with_extensions();
        let mut session = open_hardware(driver.clone(), Settings::default()).unwrap();

        session.window_flip();
        session.window_flip();
        assert_eq!(driver.script().swaps, 2);
        assert!(!session.resize_video_back_buffer(10, 10));
    }

    #[test]
    fn missing_hardware_driver_fails_init() {
        let result = PlatformBuilder::new()
            .with_settings(Settings::default().with_driver(VideoDriverKind::Hardware))
            .build_with_host(|_| Ok(FakeHost::new(WindowSize::new(10, 10))));
        assert!(matches!(result.err().map(|e| e.source), Some(PlatformError::Unsupported(_))));
    }

    #[test]
    fn release_deletes_hardware_context() {
        let driver = FakeGlDriver::with_extensions();
        let session = open_hardware(driver.clone(), Settings::default()).unwrap();

        session.release();
        assert!(driver.script().live.is_empty());
        assert_eq!(driver.script().current, None);
    }

    //=====================================================================
    // Window Properties
    //=====================================================================

    #[test]
    fn fullscreen_round_trip_restores_window() {
        let mut session = open_with(software_settings());
        let desktop = DisplayMode {
            width: 2560,
            height: 1440,
            refresh_rate: 144,
            color_bits: 32,
        };
        session.host_mut().desktop = desktop;
        session.host_mut().display = desktop;
        session.host_mut().placement.show = ShowState::Maximized;
        let before = session.host().placement;

        assert!(session.set_window_fullscreen(true, 1920, 1080, 60));
        assert!(session.is_window_fullscreen());
        assert_eq!(
            session.host().display,
            DisplayMode {
                width: 1920,
                height: 1080,
                refresh_rate: 60,
                color_bits: 32,
            }
        );
        assert_eq!(session.host().client, WindowSize::new(1920, 1080));
        assert_eq!(session.current_settings().window.fullscreen_width, 1920);
        assert!(!session.is_window_resizable(), "Fullscreen frame is not resizable");
        assert!(session.current_settings().window.is_fullscreen);

        assert!(session.set_window_fullscreen(false, 0, 0, 0));
        assert!(!session.is_window_fullscreen());
        assert_eq!(session.host().display, desktop);
        assert_eq!(session.host().placement, before);
        assert!(session.is_window_resizable());
    }

    #[test]
    fn rejected_fullscreen_reports_false() {
        let mut session = open_with(software_settings());
        session.host_mut().reject_display_change = true;

        assert!(!session.set_window_fullscreen(true, 1024, 768, 60));
        assert!(!session.is_window_fullscreen());
        assert!(!session.current_settings().window.is_fullscreen);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "set_window_fullscreen(true) called while already fullscreen")]
    fn repeated_fullscreen_enter_panics() {
        let mut session = open_with(software_settings());
        assert!(session.set_window_fullscreen(true, 0, 0, 0));
        session.set_window_fullscreen(true, 0, 0, 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "set_window_fullscreen(false) called while already windowed")]
    fn leaving_fullscreen_while_windowed_panics() {
        let mut session = open_with(software_settings());
        session.set_window_fullscreen(false, 0, 0, 0);
    }

    #[test]
    fn resizable_change_ignored_while_fullscreen() {
        let mut session = open_with(software_settings());
        session.set_window_fullscreen(true, 0, 0, 0);
        session.set_window_resizable(false);
        assert_eq!(session.host().style, WindowStyle::Fullscreen);

        session.set_window_fullscreen(false, 0, 0, 0);
        assert_eq!(session.host().style, WindowStyle::Resizable, "Setting was ignored, not deferred");
    }

    #[test]
    fn resizable_toggle_updates_style() {
        let mut session = open_with(software_settings());
        session.set_window_resizable(false);
        assert_eq!(session.host().style, WindowStyle::Fixed);
        assert!(!session.is_window_resizable());
    }

    #[test]
    fn start_fullscreen_from_settings() {
        let session = open_with(software_settings().with_fullscreen(1280, 720));
        assert!(session.is_window_fullscreen());
        assert_eq!(session.host().client, WindowSize::new(1280, 720));
    }

    #[test]
    fn release_leaves_fullscreen() {
        let mut session = open_with(software_settings());
        let desktop = session.host().desktop;
        session.set_window_fullscreen(true, 800, 600, 0);
        assert_ne!(session.host().display, desktop);

        session.shutdown();
        assert!(!session.is_window_fullscreen());
        assert_eq!(session.host().display, desktop);
        assert!(!session.is_window_running());
    }

    #[test]
    fn title_cursor_position_area() {
        let mut session = open_with(software_settings());

        session.set_window_title("Hello");
        session.set_window_cursor_enabled(false);
        session.set_window_position(10, 20);
        session.set_window_area(300, 200);

        assert_eq!(session.host().title, "Hello");
        assert_eq!(session.current_settings().window.title, "Hello");
        assert!(!session.host().cursor_visible);
        assert!(!session.is_window_cursor_enabled());
        assert_eq!(session.window_position(), WindowPosition::new(10, 20));
        assert_eq!(session.window_area(), WindowSize::new(300, 200));
    }

    //=====================================================================
    // Clipboard
    //=====================================================================

    #[test]
    fn clipboard_round_trip() {
        let mut session = open_with(software_settings());
        assert_eq!(session.get_clipboard_text(), None, "Empty clipboard has no text");

        assert!(session.set_clipboard_text("Hello, clipboard"));
        assert_eq!(session.host().clipboard.as_deref(), Some("Hello, clipboard"));
        assert_eq!(session.get_clipboard_text().as_deref(), Some("Hello, clipboard"));
        assert_eq!(session.error_count(), 0);
    }

    #[test]
    fn clipboard_keeps_unicode_text() {
        let mut session = open_with(software_settings());
        session.host_mut().clipboard = Some("Grüße, 世界".to_owned());
        assert_eq!(session.get_clipboard_text().as_deref(), Some("Grüße, 世界"));
    }

    #[test]
    fn unavailable_clipboard_is_reported() {
        let mut session = open_with(software_settings());
        session.host_mut().clipboard = Some("kept".to_owned());
        session.host_mut().clipboard_unavailable = true;

        assert!(!session.set_clipboard_text("lost"));
        assert_eq!(session.get_clipboard_text(), None);
        assert_eq!(session.error_count(), 2);
        assert!(session.last_error().is_some_and(|e| e.starts_with("Clipboard unavailable")));
        assert_eq!(session.host().clipboard.as_deref(), Some("kept"));
    }

    //=====================================================================
    // Diagnostics
    //=====================================================================

    #[test]
    fn single_error_mode_keeps_latest() {
        let driver = FakeGlDriver::with_extensions();
        driver.script_mut().fail_modern_activate = true;
        let session = PlatformBuilder::new()
            .with_error_mode(ErrorMode::Single)
            .with_settings(
                Settings::default()
                    .with_driver(VideoDriverKind::Hardware)
                    .with_profile(VideoProfile::Forward, 3, 2),
            )
            .build_with_host(move |_| {
                let mut host = FakeHost::new(WindowSize::new(10, 10));
                host.gl = Some(driver);
                Ok(host)
            })
            .unwrap();

        assert_eq!(session.error_count(), 1);
        assert_eq!(session.error_at(5), session.last_error());
    }

    //=====================================================================
    // Teardown
    //=====================================================================

    /// Backend that records when it is dropped.
    struct TeardownBackend(Rc<RefCell<Vec<&'static str>>>);

    impl VideoBackend for TeardownBackend {
        fn kind(&self) -> VideoDriverKind {
            VideoDriverKind::Software
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

        fn release(&mut self) {
            self.0.borrow_mut().push("release");
        }
    }

    impl Drop for TeardownBackend {
        fn drop(&mut self) {
            self.0.borrow_mut().push("video");
        }
    }

    #[test]
    fn video_backend_drops_before_host() {
        let mut session = open_with(software_settings());
        let teardown = session.host().teardown.clone();
        session.video = Box::new(TeardownBackend(teardown.clone()));

        drop(session);
        assert_eq!(*teardown.borrow(), ["release", "video", "host"]);
    }

    impl<H: HostWindow> WindowSession<H> {
        fn video_back_buffer_is_absent(&self) -> bool {
            self.video.back_buffer_size().is_none()
        }
    }
}
