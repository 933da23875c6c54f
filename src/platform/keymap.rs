//=========================================================================
// Key Map
//
// Winit physical key codes → virtual-key codes.
//
// The core translator works on virtual-key numbering, so every physical
// key is reduced to that numbering here before it leaves the winit host.
// Punctuation keys carry their OEM codes; they have no `Key` variant and
// surface as `Key::None` with the raw code preserved.
//
//=========================================================================

//=== External Dependencies ===============================================

use winit::keyboard::KeyCode as WinitKeyCode;

//=== Internal Dependencies ===============================================

use crate::core::event::Key;

//=== OEM Codes ===========================================================

const VK_OEM_1: u32 = 0xBA;
const VK_OEM_PLUS: u32 = 0xBB;
const VK_OEM_COMMA: u32 = 0xBC;
const VK_OEM_MINUS: u32 = 0xBD;
const VK_OEM_PERIOD: u32 = 0xBE;
const VK_OEM_2: u32 = 0xBF;
const VK_OEM_3: u32 = 0xC0;
const VK_OEM_4: u32 = 0xDB;
const VK_OEM_5: u32 = 0xDC;
const VK_OEM_6: u32 = 0xDD;
const VK_OEM_7: u32 = 0xDE;

//=== Mapping =============================================================

/// Virtual-key code for a winit key, or `None` if it has no counterpart.
pub(crate) fn virtual_key(code: WinitKeyCode) -> Option<u32> {
    use WinitKeyCode::*;

    let key = match code {
        // Letters
        KeyA => Key::A, KeyB => Key::B, KeyC => Key::C, KeyD => Key::D,
        KeyE => Key::E, KeyF => Key::F, KeyG => Key::G, KeyH => Key::H,
        KeyI => Key::I, KeyJ => Key::J, KeyK => Key::K, KeyL => Key::L,
        KeyM => Key::M, KeyN => Key::N, KeyO => Key::O, KeyP => Key::P,
        KeyQ => Key::Q, KeyR => Key::R, KeyS => Key::S, KeyT => Key::T,
        KeyU => Key::U, KeyV => Key::V, KeyW => Key::W, KeyX => Key::X,
        KeyY => Key::Y, KeyZ => Key::Z,

        // Digits
        Digit0 => Key::Key0, Digit1 => Key::Key1, Digit2 => Key::Key2,
        Digit3 => Key::Key3, Digit4 => Key::Key4, Digit5 => Key::Key5,
        Digit6 => Key::Key6, Digit7 => Key::Key7, Digit8 => Key::Key8,
        Digit9 => Key::Key9,

        // Editing & control
        Backspace => Key::Backspace,
        Tab => Key::Tab,
        Enter | NumpadEnter => Key::Enter,
        Pause => Key::Pause,
        CapsLock => Key::CapsLock,
        Escape => Key::Escape,
        Space => Key::Space,

        // Navigation
        PageUp => Key::PageUp,
        PageDown => Key::PageDown,
        End => Key::End,
        Home => Key::Home,
        ArrowLeft => Key::Left,
        ArrowUp => Key::Up,
        ArrowRight => Key::Right,
        ArrowDown => Key::Down,
        PrintScreen => Key::Snapshot,
        Insert => Key::Insert,
        Delete => Key::Delete,
        Help => Key::Help,

        // System
        SuperLeft => Key::LeftSuper,
        SuperRight => Key::RightSuper,
        ContextMenu => Key::Apps,
        Sleep => Key::Sleep,

        // Keypad
        Numpad0 => Key::NumPad0, Numpad1 => Key::NumPad1, Numpad2 => Key::NumPad2,
        Numpad3 => Key::NumPad3, Numpad4 => Key::NumPad4, Numpad5 => Key::NumPad5,
        Numpad6 => Key::NumPad6, Numpad7 => Key::NumPad7, Numpad8 => Key::NumPad8,
        Numpad9 => Key::NumPad9,
        NumpadMultiply => Key::Multiply,
        NumpadAdd => Key::Add,
        NumpadComma => Key::Separator,
        NumpadSubtract => Key::Subtract,
        NumpadDecimal => Key::Decimal,
        NumpadDivide => Key::Divide,

        // Function keys
        F1 => Key::F1, F2 => Key::F2, F3 => Key::F3, F4 => Key::F4,
        F5 => Key::F5, F6 => Key::F6, F7 => Key::F7, F8 => Key::F8,
        F9 => Key::F9, F10 => Key::F10, F11 => Key::F11, F12 => Key::F12,
        F13 => Key::F13, F14 => Key::F14, F15 => Key::F15, F16 => Key::F16,
        F17 => Key::F17, F18 => Key::F18, F19 => Key::F19, F20 => Key::F20,
        F21 => Key::F21, F22 => Key::F22, F23 => Key::F23, F24 => Key::F24,

        // Locks
        NumLock => Key::NumLock,
        ScrollLock => Key::Scroll,

        // Sided modifiers
        ShiftLeft => Key::LeftShift,
        ShiftRight => Key::RightShift,
        ControlLeft => Key::LeftControl,
        ControlRight => Key::RightControl,
        AltLeft => Key::LeftAlt,
        AltRight => Key::RightAlt,

        // Punctuation (no Key variant)
        Semicolon => return Some(VK_OEM_1),
        Equal => return Some(VK_OEM_PLUS),
        Comma => return Some(VK_OEM_COMMA),
        Minus => return Some(VK_OEM_MINUS),
        Period => return Some(VK_OEM_PERIOD),
        Slash => return Some(VK_OEM_2),
        Backquote => return Some(VK_OEM_3),
        BracketLeft => return Some(VK_OEM_4),
        Backslash => return Some(VK_OEM_5),
        BracketRight => return Some(VK_OEM_6),
        Quote => return Some(VK_OEM_7),

        _ => return None,
    };
    Some(key.code())
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::translator::{translate_key, VK_LSHIFT, VK_LWIN};

    #[test]
    fn letters_and_digits_use_ascii_codes() {
        assert_eq!(virtual_key(WinitKeyCode::KeyA), Some(0x41));
        assert_eq!(virtual_key(WinitKeyCode::KeyZ), Some(0x5A));
        assert_eq!(virtual_key(WinitKeyCode::Digit0), Some(0x30));
        assert_eq!(virtual_key(WinitKeyCode::Digit9), Some(0x39));
    }

    #[test]
    fn sided_modifiers_keep_their_side() {
        assert_eq!(virtual_key(WinitKeyCode::ShiftLeft), Some(VK_LSHIFT));
        assert_eq!(virtual_key(WinitKeyCode::ShiftRight), Some(0xA1));
        assert_eq!(virtual_key(WinitKeyCode::SuperLeft), Some(VK_LWIN));
        assert_eq!(virtual_key(WinitKeyCode::AltRight), Some(0xA5));
    }

    #[test]
    fn both_enter_keys_map_to_enter() {
        assert_eq!(virtual_key(WinitKeyCode::Enter), virtual_key(WinitKeyCode::NumpadEnter));
    }

    #[test]
    fn punctuation_has_raw_code_but_no_key() {
        let code = virtual_key(WinitKeyCode::Minus).expect("Minus has an OEM code");
        assert_eq!(code, 0xBD);
        assert_eq!(translate_key(code), Key::None);
    }

    #[test]
    fn unknown_keys_are_dropped() {
        assert_eq!(virtual_key(WinitKeyCode::Fn), None);
        assert_eq!(virtual_key(WinitKeyCode::MediaPlayPause), None);
    }

    #[test]
    fn mapped_codes_round_trip_through_translator() {
        for code in [WinitKeyCode::KeyQ, WinitKeyCode::F12, WinitKeyCode::ArrowUp, WinitKeyCode::Numpad5] {
            let raw = virtual_key(code).unwrap();
            assert_eq!(translate_key(raw).code(), raw, "{:?} should map to a known key", code);
        }
    }
}
