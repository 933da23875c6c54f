//=========================================================================
// Gilrs Gamepads
//
// `GamepadSource` over gilrs.
//
// Gilrs identifies controllers by id; the core polls fixed slots. The
// first four connected controllers get the lowest free slots and keep
// them until they disconnect. Reports are rebuilt in the raw XInput
// layout so the core's deadzone and normalization apply unchanged.
//
//=========================================================================

//=== External Dependencies ===============================================

use gilrs::{Axis, Button, EventType, Gamepad, GamepadId, Gilrs};
use log::{debug, warn};

//=== Internal Dependencies ===============================================

use crate::core::error::{PlatformError, Result};
use crate::core::gamepad::{GamepadButtons, GamepadSource, RawGamepadState, MAX_GAMEPADS};

//=== GilrsGamepads =======================================================

pub struct GilrsGamepads {
    gilrs: Gilrs,
    slots: [Option<GamepadId>; MAX_GAMEPADS],
}

impl GilrsGamepads {
    /// Opens the gilrs backend and assigns already connected controllers.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Unsupported`] if gilrs has no backend for
    /// this platform or fails to start.
    pub fn new() -> Result<Self> {
        let gilrs = Gilrs::new().map_err(|e| PlatformError::Unsupported(e.to_string()))?;
        let mut source = Self {
            gilrs,
            slots: [None; MAX_GAMEPADS],
        };
        let ids: Vec<GamepadId> = source.gilrs.gamepads().map(|(id, _)| id).collect();
        for id in ids {
            source.assign(id);
        }
        Ok(source)
    }

    fn assign(&mut self, id: GamepadId) {
        if self.slots.contains(&Some(id)) {
            return;
        }
        match self.slots.iter_mut().position(|slot| slot.is_none()) {
            Some(index) => {
                self.slots[index] = Some(id);
                debug!(target: "platform::input", "Gamepad {} assigned to slot {}", id, index);
            }
            None => warn!(target: "platform::input", "No free gamepad slot for {}", id),
        }
    }

    fn unassign(&mut self, id: GamepadId) {
        for slot in self.slots.iter_mut().filter(|slot| **slot == Some(id)) {
            *slot = None;
        }
    }
}

impl GamepadSource for GilrsGamepads {
    fn begin_frame(&mut self) {
        while let Some(event) = self.gilrs.next_event() {
            match event.event {
                EventType::Connected => self.assign(event.id),
                EventType::Disconnected => self.unassign(event.id),
                _ => {}
            }
        }
    }

    fn query(&mut self, slot: usize) -> Option<RawGamepadState> {
        let id = (*self.slots.get(slot)?)?;
        let gamepad = self.gilrs.connected_gamepad(id)?;
        Some(raw_state(&gamepad))
    }
}

//=== Report Conversion ===================================================

const BUTTON_MAP: [(Button, GamepadButtons); 14] = [
    (Button::DPadUp, GamepadButtons::DPAD_UP),
    (Button::DPadDown, GamepadButtons::DPAD_DOWN),
    (Button::DPadLeft, GamepadButtons::DPAD_LEFT),
    (Button::DPadRight, GamepadButtons::DPAD_RIGHT),
    (Button::Start, GamepadButtons::START),
    (Button::Select, GamepadButtons::BACK),
    (Button::LeftThumb, GamepadButtons::LEFT_THUMB),
    (Button::RightThumb, GamepadButtons::RIGHT_THUMB),
    (Button::LeftTrigger, GamepadButtons::LEFT_SHOULDER),
    (Button::RightTrigger, GamepadButtons::RIGHT_SHOULDER),
    (Button::South, GamepadButtons::A),
    (Button::East, GamepadButtons::B),
    (Button::West, GamepadButtons::X),
    (Button::North, GamepadButtons::Y),
];

fn raw_state(gamepad: &Gamepad<'_>) -> RawGamepadState {
    let buttons = BUTTON_MAP
        .iter()
        .filter(|(button, _)| gamepad.is_pressed(*button))
        .fold(GamepadButtons::empty(), |acc, (_, flag)| acc | *flag);

    let trigger = |button: Button| {
        let value = gamepad.button_data(button).map_or(0.0, |data| data.value());
        axis_to_trigger(value)
    };

    RawGamepadState {
        buttons,
        left_trigger: trigger(Button::LeftTrigger2),
        right_trigger: trigger(Button::RightTrigger2),
        thumb_left_x: axis_to_raw(gamepad.value(Axis::LeftStickX)),
        thumb_left_y: axis_to_raw(gamepad.value(Axis::LeftStickY)),
        thumb_right_x: axis_to_raw(gamepad.value(Axis::RightStickX)),
        thumb_right_y: axis_to_raw(gamepad.value(Axis::RightStickY)),
    }
}

fn axis_to_raw(value: f32) -> i16 {
    (value.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

fn axis_to_trigger(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * u8::MAX as f32).round() as u8
}

//=========================================================================
// Unit Tests
//=========================================================================
