//=========================================================================
// Platform Settings
//
// Initialization flags and the window/video configuration a session is
// created with. `WindowSession::current_settings()` returns the same
// structure, updated as the window is resized or toggled at runtime.
//
// Defaults:
// - Window: 800x600, resizable, windowed, fullscreen size from display
// - Video: legacy profile, no version, vsync off, auto-size on
//
//=========================================================================

//=== External Dependencies ===============================================

use bitflags::bitflags;

//=== Internal Dependencies ===============================================

use super::video::{VideoDriverKind, VideoProfile, VideoSettings};

//=== InitFlags ===========================================================

bitflags! {
    /// Subsystems to bring up at init.
    ///
    /// `VIDEO` implies `WINDOW`; see [`InitFlags::normalized`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InitFlags: u32 {
        const WINDOW = 1 << 0;
        const VIDEO  = 1 << 1;
        const ALL    = Self::WINDOW.bits() | Self::VIDEO.bits();
    }
}

impl InitFlags {
    /// Returns the flags with implied subsystems added.
    pub fn normalized(self) -> Self {
        if self.contains(Self::VIDEO) {
            self | Self::WINDOW
        } else {
            self
        }
    }
}

impl Default for InitFlags {
    fn default() -> Self {
        Self::ALL
    }
}

//=== WindowSettings ======================================================

/// Title used when [`WindowSettings::title`] is empty.
pub const DEFAULT_WINDOW_TITLE: &str = "Aetheric Platform";

/// Window configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSettings {
    /// Window title. Empty selects [`DEFAULT_WINDOW_TITLE`].
    pub title: String,

    /// Windowed client width.
    pub window_width: u32,

    /// Windowed client height.
    pub window_height: u32,

    /// Fullscreen width. `0` keeps the display's current width.
    pub fullscreen_width: u32,

    /// Fullscreen height. `0` keeps the display's current height.
    pub fullscreen_height: u32,

    pub is_resizable: bool,
    pub is_fullscreen: bool,
}

impl WindowSettings {
    /// Title the host should display.
    pub fn effective_title(&self) -> &str {
        if self.title.is_empty() {
            DEFAULT_WINDOW_TITLE
        } else {
            &self.title
        }
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: String::new(),
            window_width: 800,
            window_height: 600,
            fullscreen_width: 0,
            fullscreen_height: 0,
            is_resizable: true,
            is_fullscreen: false,
        }
    }
}

//=== Settings ============================================================

/// Complete session configuration.
///
/// # Examples
///
/// ```
/// use aetheric_platform::core::settings::Settings;
/// use aetheric_platform::core::video::{VideoDriverKind, VideoProfile};
///
/// let settings = Settings::default()
///     .with_title("Demo")
///     .with_window_size(1280, 720)
///     .with_driver(VideoDriverKind::Hardware)
///     .with_profile(VideoProfile::Core, 3, 3)
///     .with_vsync(true);
///
/// assert_eq!(settings.window.window_width, 1280);
/// assert_eq!(settings.video.major_version, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Settings {
    pub window: WindowSettings,
    pub video: VideoSettings,
}

impl Settings {
    //--- Window -----------------------------------------------------------

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.window.title = title.into();
        self
    }

    /// Sets the windowed client size.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "Window size must be positive, got {}x{}", width, height);
        self.window.window_width = width;
        self.window.window_height = height;
        self
    }

    /// Starts the session fullscreen at the given size (`0` = display value).
    pub fn with_fullscreen(mut self, width: u32, height: u32) -> Self {
        self.window.is_fullscreen = true;
        self.window.fullscreen_width = width;
        self.window.fullscreen_height = height;
        self
    }

    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.window.is_resizable = resizable;
        self
    }

    //--- Video ------------------------------------------------------------

    pub fn with_driver(mut self, driver: VideoDriverKind) -> Self {
        self.video.driver = driver;
        self
    }

    pub fn with_profile(mut self, profile: VideoProfile, major: u32, minor: u32) -> Self {
        self.video.profile = profile;
        self.video.major_version = major;
        self.video.minor_version = minor;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.video.vsync = vsync;
        self
    }

    pub fn with_auto_size(mut self, auto_size: bool) -> Self {
        self.video.auto_size = auto_size;
        self
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
