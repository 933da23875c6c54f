//=========================================================================
// Message Translator
//
// Pure mapping from host notifications (`HostMessage`) to canonical
// platform events (`Event`).
//
// Responsibilities:
// - Total, deterministic virtual-key → `Key` table
// - Live modifier sampling through `KeyboardState`
// - Wheel normalization (120 raw units → 1.0)
// - Alt+F4 close chord detection
//
// Notes:
// Modifiers are read from the keyboard state at the moment the message
// is translated, not from the message itself. This matches how the OS
// exposes them and means a modifier released before the pump runs is
// reported as up.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::event::{
    Event, Key, KeyboardEvent, KeyboardEventKind, KeyboardModifiers, MouseButton, MouseEvent,
    MouseEventKind, WindowEvent,
};
use super::host::{HostMessage, HostMouseButton, KeyboardState};

//=== Virtual-Key Codes ===================================================

pub const VK_MENU: u32 = 0x12;
pub const VK_LSHIFT: u32 = 0xA0;
pub const VK_LCONTROL: u32 = 0xA2;
pub const VK_LWIN: u32 = 0x5B;
pub const VK_F4: u32 = 0x73;

/// Raw wheel units per detent.
pub const WHEEL_DELTA: f32 = 120.0;

//=== Key Table ===========================================================

/// Maps a virtual-key code to its canonical key.
///
/// Total over `u32`: unmapped codes yield [`Key::None`].
pub fn translate_key(raw_code: u32) -> Key {
    use Key::*;
    match raw_code {
        0x08 => Backspace,
        0x09 => Tab,
        0x0C => Clear,
        0x0D => Enter,
        0x10 => Shift,
        0x11 => Control,
        0x12 => Alt,
        0x13 => Pause,
        0x14 => CapsLock,
        0x1B => Escape,
        0x20 => Space,
        0x21 => PageUp,
        0x22 => PageDown,
        0x23 => End,
        0x24 => Home,
        0x25 => Left,
        0x26 => Up,
        0x27 => Right,
        0x28 => Down,
        0x29 => Select,
        0x2A => Print,
        0x2B => Execute,
        0x2C => Snapshot,
        0x2D => Insert,
        0x2E => Delete,
        0x2F => Help,

        //--- Digits -------------------------------------------------------
        0x30 => Key0,
        0x31 => Key1,
        0x32 => Key2,
        0x33 => Key3,
        0x34 => Key4,
        0x35 => Key5,
        0x36 => Key6,
        0x37 => Key7,
        0x38 => Key8,
        0x39 => Key9,

        //--- Letters ------------------------------------------------------
        0x41 => A,
        0x42 => B,
        0x43 => C,
        0x44 => D,
        0x45 => E,
        0x46 => F,
        0x47 => G,
        0x48 => H,
        0x49 => I,
        0x4A => J,
        0x4B => K,
        0x4C => L,
        0x4D => M,
        0x4E => N,
        0x4F => O,
        0x50 => P,
        0x51 => Q,
        0x52 => R,
        0x53 => S,
        0x54 => T,
        0x55 => U,
        0x56 => V,
        0x57 => W,
        0x58 => X,
        0x59 => Y,
        0x5A => Z,

        0x5B => LeftSuper,
        0x5C => RightSuper,
        0x5D => Apps,
        0x5F => Sleep,

        //--- Numeric Keypad -----------------------------------------------
        0x60 => NumPad0,
        0x61 => NumPad1,
        0x62 => NumPad2,
        0x63 => NumPad3,
        0x64 => NumPad4,
        0x65 => NumPad5,
        0x66 => NumPad6,
        0x67 => NumPad7,
        0x68 => NumPad8,
        0x69 => NumPad9,
        0x6A => Multiply,
        0x6B => Add,
        0x6C => Separator,
        0x6D => Subtract,
        0x6E => Decimal,
        0x6F => Divide,

        //--- Function Keys ------------------------------------------------
        0x70 => F1,
        0x71 => F2,
        0x72 => F3,
        0x73 => F4,
        0x74 => F5,
        0x75 => F6,
        0x76 => F7,
        0x77 => F8,
        0x78 => F9,
        0x79 => F10,
        0x7A => F11,
        0x7B => F12,
        0x7C => F13,
        0x7D => F14,
        0x7E => F15,
        0x7F => F16,
        0x80 => F17,
        0x81 => F18,
        0x82 => F19,
        0x83 => F20,
        0x84 => F21,
        0x85 => F22,
        0x86 => F23,
        0x87 => F24,

        0x90 => NumLock,
        0x91 => Scroll,

        //--- Sided Modifiers ----------------------------------------------
        0xA0 => LeftShift,
        0xA1 => RightShift,
        0xA2 => LeftControl,
        0xA3 => RightControl,
        0xA4 => LeftAlt,
        0xA5 => RightAlt,

        _ => None,
    }
}

//=== Modifiers ===========================================================

/// Samples the modifier keys currently held.
pub fn sample_modifiers(keyboard: &dyn KeyboardState) -> KeyboardModifiers {
    let mut modifiers = KeyboardModifiers::empty();
    if keyboard.is_key_down(VK_MENU) {
        modifiers |= KeyboardModifiers::ALT;
    }
    if keyboard.is_key_down(VK_LSHIFT) {
        modifiers |= KeyboardModifiers::SHIFT;
    }
    if keyboard.is_key_down(VK_LCONTROL) {
        modifiers |= KeyboardModifiers::CTRL;
    }
    if keyboard.is_key_down(VK_LWIN) {
        modifiers |= KeyboardModifiers::SUPER;
    }
    modifiers
}

//=== Messages ============================================================

/// Translates one host message into at most one event.
///
/// Close and destroy notifications produce no event; they only affect the
/// session's running flag.
pub fn translate_message(message: &HostMessage, keyboard: &dyn KeyboardState) -> Option<Event> {
    match *message {
        HostMessage::CloseRequested | HostMessage::Destroyed => None,

        HostMessage::Resized { width, height } => {
            Some(Event::Window(WindowEvent::Resized { width, height }))
        }

        HostMessage::Focus(true) => Some(Event::Window(WindowEvent::GotFocus)),
        HostMessage::Focus(false) => Some(Event::Window(WindowEvent::LostFocus)),

        HostMessage::Key { raw_code, is_down, .. } => {
            let kind = if is_down {
                KeyboardEventKind::KeyDown
            } else {
                KeyboardEventKind::KeyUp
            };
            Some(keyboard_event(kind, raw_code, sample_modifiers(keyboard)))
        }

        HostMessage::Char { code } => Some(keyboard_event(
            KeyboardEventKind::Char,
            code,
            KeyboardModifiers::empty(),
        )),

        HostMessage::MouseButton { button, pressed, x, y } => {
            let kind = if pressed {
                MouseEventKind::ButtonDown
            } else {
                MouseEventKind::ButtonUp
            };
            Some(mouse_event(kind, button.into(), x, y, 0.0))
        }

        HostMessage::MouseMove { x, y } => {
            Some(mouse_event(MouseEventKind::Move, MouseButton::None, x, y, 0.0))
        }

        HostMessage::MouseWheel { x, y, raw_delta } => Some(mouse_event(
            MouseEventKind::Wheel,
            MouseButton::None,
            x,
            y,
            f32::from(raw_delta) / WHEEL_DELTA,
        )),
    }
}

/// Whether `message` is the Alt+F4 close chord.
///
/// Only the down transition counts; auto-repeats and releases do not.
pub fn is_close_chord(message: &HostMessage, keyboard: &dyn KeyboardState) -> bool {
    match *message {
        HostMessage::Key { raw_code, is_down, was_down } => {
            is_down && !was_down && raw_code == VK_F4 && keyboard.is_key_down(VK_MENU)
        }
        _ => false,
    }
}

//--- Internal Helpers ----------------------------------------------------

// Char events run the character code through the key table as well, so
// their `mapped_key` is only meaningful where the two numberings overlap.
fn keyboard_event(kind: KeyboardEventKind, raw_code: u32, modifiers: KeyboardModifiers) -> Event {
    Event::Keyboard(KeyboardEvent {
        kind,
        key_code: raw_code,
        mapped_key: translate_key(raw_code),
        modifiers,
    })
}

fn mouse_event(kind: MouseEventKind, button: MouseButton, x: i32, y: i32, wheel_delta: f32) -> Event {
    Event::Mouse(MouseEvent {
        kind,
        button,
        x,
        y,
        wheel_delta,
    })
}

impl From<HostMouseButton> for MouseButton {
    fn from(button: HostMouseButton) -> Self {
        match button {
            HostMouseButton::Left => Self::Left,
            HostMouseButton::Right => Self::Right,
            HostMouseButton::Middle => Self::Middle,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
