//=========================================================================
// Platform Errors & Diagnostics
//
// Two complementary channels:
//
// - `PlatformError`: typed errors returned through `Result` by host
//   backends, video drivers and session initialization.
// - `ErrorLog`: the queryable diagnostic history behind
//   `last_error()` / `error_at()` / `error_count()`. It records both
//   fatal init failures and non-fatal degradations (e.g. a modern GL
//   context falling back to the baseline one).
//
// Every diagnostic pushed into the log is also emitted through `log`.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::VecDeque;

//=== External Dependencies ===============================================

use log::debug;
use thiserror::Error;

//=== PlatformError =======================================================

/// Errors raised by the platform layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// Failed to create the host event loop
    #[error("Failed to create event loop: {0}")]
    EventLoop(String),

    /// Failed to create the native window
    #[error("Failed to create window: {0}")]
    WindowCreation(String),

    /// Failed to acquire the window's device context
    #[error("Failed to get device context: {0}")]
    DeviceContext(String),

    /// No usable pixel format for the requested framebuffer layout
    #[error("Failed to set pixel format: {0}")]
    PixelFormat(String),

    /// Requested video profile cannot be satisfied at all
    #[error("Video profile not supported: {0}")]
    Profile(String),

    /// Rendering context creation or activation failed
    #[error("Failed to create rendering context: {0}")]
    ContextCreation(String),

    /// Presenting a frame to the window failed
    #[error("Failed to present frame: {0}")]
    Present(String),

    /// Back buffer dimensions overflow or the allocation was refused
    #[error("Failed to allocate back buffer: {0}")]
    Allocation(String),

    /// System clipboard could not be read or written
    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),

    /// Init flags request no subsystem that owns a window
    #[error("Nothing to initialize: no window or video subsystem requested")]
    NothingRequested,

    /// Operation not available on this platform or host
    #[error("Not supported: {0}")]
    Unsupported(String),
}

/// Result type for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;

//=== ErrorLog ============================================================

/// Upper bound on stored diagnostics in [`ErrorMode::History`].
pub const MAX_ERROR_HISTORY: usize = 1024;

/// Upper bound on a single diagnostic's length in bytes.
pub const MAX_ERROR_LENGTH: usize = 1024;

/// Storage policy for the diagnostic log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMode {
    /// Only the most recent diagnostic is kept.
    Single,

    /// Up to `n` diagnostics are kept (clamped to [`MAX_ERROR_HISTORY`]).
    /// When full, the oldest entry is discarded.
    History(usize),
}

impl Default for ErrorMode {
    fn default() -> Self {
        Self::History(MAX_ERROR_HISTORY)
    }
}

/// Bounded, queryable history of formatted diagnostics.
#[derive(Debug, Clone)]
pub struct ErrorLog {
    mode: ErrorMode,
    entries: VecDeque<String>,
}

impl ErrorLog {
    pub fn new(mode: ErrorMode) -> Self {
        let mode = match mode {
            ErrorMode::History(n) => ErrorMode::History(n.clamp(1, MAX_ERROR_HISTORY)),
            single => single,
        };
        Self {
            mode,
            entries: VecDeque::new(),
        }
    }

    /// Records a diagnostic, truncated to [`MAX_ERROR_LENGTH`] bytes.
    pub fn push(&mut self, message: impl Into<String>) {
        let mut message = message.into();
        truncate_on_char_boundary(&mut message, MAX_ERROR_LENGTH);
        debug!(target: "platform", "Diagnostic recorded: {}", message);

        let limit = match self.mode {
            ErrorMode::Single => 1,
            ErrorMode::History(n) => n,
        };
        while self.entries.len() >= limit {
            self.entries.pop_front();
        }
        self.entries.push_back(message);
    }

    /// Records a typed error using its display form.
    pub fn push_error(&mut self, error: &PlatformError) {
        self.push(error.to_string());
    }

    /// Most recent diagnostic.
    pub fn last_error(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }

    /// Diagnostic at `index` (0 = oldest retained).
    ///
    /// An out-of-range index yields the most recent diagnostic, and in
    /// [`ErrorMode::Single`] the index is ignored.
    pub fn error_at(&self, index: usize) -> Option<&str> {
        match self.mode {
            ErrorMode::Single => self.last_error(),
            ErrorMode::History(_) => self
                .entries
                .get(index)
                .map(String::as_str)
                .or_else(|| self.last_error()),
        }
    }

    /// Number of retained diagnostics.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn mode(&self) -> ErrorMode {
        self.mode
    }

    /// Iterates retained diagnostics from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for ErrorLog {
    fn default() -> Self {
        Self::new(ErrorMode::default())
    }
}

fn truncate_on_char_boundary(message: &mut String, max: usize) {
    if message.len() <= max {
        return;
    }
    let mut end = max;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    message.truncate(end);
}

//=== InitError ===========================================================

/// Initialization failure.
///
/// Carries the typed cause plus every diagnostic recorded while the
/// session was being brought up, so callers can inspect the full history
/// even though no session exists.
#[derive(Error, Debug)]
#[error("Platform initialization failed: {source}")]
pub struct InitError {
    #[source]
    pub source: PlatformError,
    pub errors: ErrorLog,
}

impl InitError {
    /// Most recent diagnostic recorded during initialization.
    pub fn last_error(&self) -> Option<&str> {
        self.errors.last_error()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
