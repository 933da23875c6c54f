//=========================================================================
// Platform Core
//
// Host-independent building blocks of the platform layer. Nothing in
// this module talks to the OS directly; every OS interaction goes
// through the traits in `host`, `video` and `gamepad`, which the
// `platform` module implements for real windows and devices.
//
// Layout:
// ```text
//   event        canonical event vocabulary
//   event_queue  fixed-capacity FIFO with lazy drain reset
//   translator   host message → event, key table, modifiers
//   gamepad      per-frame connection tracking, normalization
//   video        backend selection, context negotiation, back buffer
//   fullscreen   enter/leave with placement save/restore
//   host         OS window seam
//   settings     init flags and configuration
//   error        typed errors and the diagnostic log
// ```
//
//=========================================================================

pub mod error;
pub mod event;
pub mod event_queue;
pub mod fullscreen;
pub mod gamepad;
pub mod host;
pub mod settings;
pub mod translator;
pub mod video;

//--- Re-exports ----------------------------------------------------------

pub use error::{ErrorLog, ErrorMode, InitError, PlatformError};
pub use event::{
    Event, GamepadEvent, GamepadState, Key, KeyboardEvent, KeyboardEventKind, KeyboardModifiers,
    MouseButton, MouseEvent, MouseEventKind, WindowEvent,
};
pub use event_queue::{EventQueue, DEFAULT_EVENT_CAPACITY};
pub use host::{DisplayMode, HostWindow, WindowPlacement, WindowPosition, WindowSize, WindowStyle};
pub use settings::{InitFlags, Settings, WindowSettings};
pub use video::{BackBuffer, VideoDriverKind, VideoProfile, VideoSettings};
