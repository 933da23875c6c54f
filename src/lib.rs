//=========================================================================
// Aetheric Platform - Library Root
//
// Single-window platform layer: one OS window per process, a buffered
// queue of normalized input events, per-frame gamepad polling,
// fullscreen switching and a video backend (hardware context or
// software back buffer).
//
// Responsibilities:
// - Expose the session facade (`PlatformBuilder`, `WindowSession`)
// - Expose host-independent building blocks under `core`
// - Provide winit/softbuffer/gilrs backends under `platform`
//
// Typical usage:
// ```no_run
// use aetheric_platform::PlatformBuilder;
//
// let mut session = PlatformBuilder::new().build().unwrap();
// while session.window_update() {
//     while let Some(event) = session.poll_window_event() {
//         // handle event
//     }
//     session.window_flip();
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the event model, queue, translator, gamepad tracking,
// fullscreen state machine and video negotiation. None of it touches the
// OS; the `HostWindow` trait is the seam.
//
// `platform` implements that seam on desktop targets.
//
pub mod core;
#[cfg(any(
    windows,
    target_os = "macos",
    target_os = "linux",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
))]
pub mod platform;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------

mod session;

#[cfg(test)]
mod testing;

//--- Public Exports ------------------------------------------------------

pub use session::{PlatformBuilder, WindowSession};

#[cfg(any(
    windows,
    target_os = "macos",
    target_os = "linux",
    target_os = "freebsd",
    target_os = "dragonfly",
    target_os = "netbsd",
    target_os = "openbsd"
))]
pub use session::init_platform;
