//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use aetheric_platform::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Session
pub use crate::session::{PlatformBuilder, WindowSession};

// Configuration
pub use crate::core::error::{ErrorMode, InitError, PlatformError};
pub use crate::core::settings::{InitFlags, Settings, WindowSettings};
pub use crate::core::video::{VideoDriverKind, VideoProfile, VideoSettings};

// Events
pub use crate::core::event::{
    Event, GamepadEvent, GamepadState, Key, KeyboardEvent, KeyboardEventKind, KeyboardModifiers,
    MouseButton, MouseEvent, MouseEventKind, WindowEvent,
};

// Video
pub use crate::core::video::BackBuffer;

// Host seam
pub use crate::core::host::{HostWindow, WindowPosition, WindowSize};
