//=========================================================================
// Gamepad Poller
//
// Per-frame connection tracking and state normalization for a fixed set
// of controller slots.
//
// Per slot, each frame:
// ```text
//   query fails,    was connected  → Disconnected, clear flag
//   query fails,    not connected  → (nothing)
//   query succeeds, not connected  → Connected, set flag (state not read)
//   query succeeds, was connected  → StateChanged{state}   (every frame)
// ```
//
// `StateChanged` is emitted every frame a controller stays connected,
// whether or not anything changed. Consumers that only care about edges
// compare against the previous state themselves.
//
//=========================================================================

//=== External Dependencies ===============================================

use bitflags::bitflags;
use log::{info, trace};

//=== Internal Dependencies ===============================================

use super::event::{Event, GamepadEvent, GamepadState};
use super::event_queue::EventQueue;

//=== Constants ===========================================================

/// Number of controller slots polled each frame.
pub const MAX_GAMEPADS: usize = 4;

/// Default left-stick deadzone (raw units).
pub const LEFT_THUMB_DEADZONE: i16 = 7849;

/// Default right-stick deadzone (raw units).
pub const RIGHT_THUMB_DEADZONE: i16 = 8689;

//=== Raw State ===========================================================

bitflags! {
    /// Digital buttons in the raw controller report.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GamepadButtons: u16 {
        const DPAD_UP        = 0x0001;
        const DPAD_DOWN      = 0x0002;
        const DPAD_LEFT      = 0x0004;
        const DPAD_RIGHT     = 0x0008;
        const START          = 0x0010;
        const BACK           = 0x0020;
        const LEFT_THUMB     = 0x0040;
        const RIGHT_THUMB    = 0x0080;
        const LEFT_SHOULDER  = 0x0100;
        const RIGHT_SHOULDER = 0x0200;
        const A              = 0x1000;
        const B              = 0x2000;
        const X              = 0x4000;
        const Y              = 0x8000;
    }
}

/// Controller report as a source delivers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawGamepadState {
    pub buttons: GamepadButtons,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub thumb_left_x: i16,
    pub thumb_left_y: i16,
    pub thumb_right_x: i16,
    pub thumb_right_y: i16,
}

//=== Normalization =======================================================

/// Maps a raw stick axis to `[-1.0, 1.0]` with a radial deadzone per axis.
///
/// `|raw| <= deadzone` yields `0.0`. Beyond it the value scales linearly
/// so that `32767` maps to `1.0` and `-32768` maps to `-1.0`.
pub fn normalize_stick(raw: i16, deadzone: i16) -> f32 {
    let value = f32::from(raw);
    let deadzone = f32::from(deadzone.max(0));
    if value < -deadzone {
        (value + deadzone) / (32768.0 - deadzone)
    } else if value > deadzone {
        (value - deadzone) / (32767.0 - deadzone)
    } else {
        0.0
    }
}

/// Maps a raw trigger (`0..=255`) to `[0.0, 1.0]`.
pub fn normalize_trigger(raw: u8) -> f32 {
    f32::from(raw) / 255.0
}

impl GamepadState {
    /// Builds a normalized state from a raw report.
    ///
    /// Starts from a zeroed state; a button is `true` only if its bit is set.
    pub fn from_raw(raw: &RawGamepadState, deadzones: Deadzones) -> Self {
        let held = |flag: GamepadButtons| raw.buttons.contains(flag);
        Self {
            dpad_up: held(GamepadButtons::DPAD_UP),
            dpad_down: held(GamepadButtons::DPAD_DOWN),
            dpad_left: held(GamepadButtons::DPAD_LEFT),
            dpad_right: held(GamepadButtons::DPAD_RIGHT),
            action_a: held(GamepadButtons::A),
            action_b: held(GamepadButtons::B),
            action_x: held(GamepadButtons::X),
            action_y: held(GamepadButtons::Y),
            start: held(GamepadButtons::START),
            back: held(GamepadButtons::BACK),
            left_thumb: held(GamepadButtons::LEFT_THUMB),
            right_thumb: held(GamepadButtons::RIGHT_THUMB),
            left_shoulder: held(GamepadButtons::LEFT_SHOULDER),
            right_shoulder: held(GamepadButtons::RIGHT_SHOULDER),

            left_stick_x: normalize_stick(raw.thumb_left_x, deadzones.left),
            left_stick_y: normalize_stick(raw.thumb_left_y, deadzones.left),
            right_stick_x: normalize_stick(raw.thumb_right_x, deadzones.right),
            right_stick_y: normalize_stick(raw.thumb_right_y, deadzones.right),
            left_trigger: normalize_trigger(raw.left_trigger),
            right_trigger: normalize_trigger(raw.right_trigger),
        }
    }
}

/// Stick deadzones in raw units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadzones {
    pub left: i16,
    pub right: i16,
}

impl Default for Deadzones {
    fn default() -> Self {
        Self {
            left: LEFT_THUMB_DEADZONE,
            right: RIGHT_THUMB_DEADZONE,
        }
    }
}

//=== GamepadSource =======================================================

/// Backend that reports controller state by slot.
pub trait GamepadSource {
    /// Called once per frame before any slot is queried.
    fn begin_frame(&mut self) {}

    /// Current report for `slot`, or `None` if no controller answers.
    fn query(&mut self, slot: usize) -> Option<RawGamepadState>;
}

/// Source with no controllers attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisconnectedGamepads;

impl GamepadSource for DisconnectedGamepads {
    fn query(&mut self, _slot: usize) -> Option<RawGamepadState> {
        None
    }
}

//=== GamepadPoller =======================================================

/// Tracks connection state per slot and emits gamepad events.
pub struct GamepadPoller {
    source: Box<dyn GamepadSource>,
    connected: [bool; MAX_GAMEPADS],
    deadzones: Deadzones,
}

impl GamepadPoller {
    pub fn new(source: Box<dyn GamepadSource>) -> Self {
        Self {
            source,
            connected: [false; MAX_GAMEPADS],
            deadzones: Deadzones::default(),
        }
    }

    pub fn with_deadzones(mut self, deadzones: Deadzones) -> Self {
        self.deadzones = deadzones;
        self
    }

    /// Polls every slot once and pushes the resulting events.
    pub fn poll(&mut self, queue: &mut EventQueue) {
        self.source.begin_frame();

        for slot in 0..MAX_GAMEPADS {
            let device_index = slot as u32;
            let report = self.source.query(slot);

            let event = match (report, self.connected[slot]) {
                (None, true) => {
                    self.connected[slot] = false;
                    info!(target: "platform::input", "Gamepad {} disconnected", slot);
                    Some(GamepadEvent::Disconnected { device_index })
                }
                (None, false) => None,
                (Some(_), false) => {
                    self.connected[slot] = true;
                    info!(target: "platform::input", "Gamepad {} connected", slot);
                    Some(GamepadEvent::Connected { device_index })
                }
                (Some(raw), true) => Some(GamepadEvent::StateChanged {
                    device_index,
                    state: GamepadState::from_raw(&raw, self.deadzones),
                }),
            };

            if let Some(event) = event {
                trace!(target: "platform::input", "Gamepad event: {:?}", event);
                queue.push(Event::Gamepad(event));
            }
        }
    }

    /// Connection flag per slot.
    pub fn connections(&self) -> [bool; MAX_GAMEPADS] {
        self.connected
    }

    pub fn is_connected(&self, slot: usize) -> bool {
        self.connected.get(slot).copied().unwrap_or(false)
    }
}

impl std::fmt::Debug for GamepadPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GamepadPoller")
            .field("connected", &self.connected)
            .field("deadzones", &self.deadzones)
            .finish_non_exhaustive()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
