//=========================================================================
// Platform Event Types
//
// Canonical, host-independent representation of everything the platform
// layer reports to the application: window notifications, keyboard and
// mouse input, and gamepad connection/state updates.
//
// Responsibilities:
// - One enum case per source, each carrying only its own payload
// - Stable key vocabulary numbered after virtual-key codes
// - Modifier flags sampled at translation time
//
// Design:
// Every type in this module is `Copy`. Events are stored by value in the
// fixed-capacity `EventQueue` and handed out by value on poll, so no event
// ever owns heap memory.
//
// Event Flow:
// ```text
// Host message pump ──► Translator ──┐
//                                    ├──► EventQueue ──► poll_window_event()
// Gamepad poller ────────────────────┘
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use bitflags::bitflags;

//=== Event ===============================================================

/// A single platform event.
///
/// Produced by the session during [`window_update`] and consumed in FIFO
/// order through [`poll_window_event`].
///
/// [`window_update`]: crate::WindowSession::window_update
/// [`poll_window_event`]: crate::WindowSession::poll_window_event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// Window resize or focus change.
    Window(WindowEvent),

    /// Key transition or character input.
    Keyboard(KeyboardEvent),

    /// Pointer button, motion or wheel.
    Mouse(MouseEvent),

    /// Gamepad connection change or per-frame state.
    Gamepad(GamepadEvent),
}

//=== Window Events =======================================================

/// Window-level notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    /// Client area changed size (pixels).
    Resized { width: u32, height: u32 },

    /// Window gained keyboard focus.
    GotFocus,

    /// Window lost keyboard focus.
    LostFocus,
}

//=== Keyboard Events =====================================================

/// Sub-type of a [`KeyboardEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyboardEventKind {
    KeyDown,
    KeyUp,

    /// Printable character input. `key_code` holds the character code.
    Char,
}

/// Keyboard input.
///
/// `key_code` is the raw host code (a virtual-key code for key transitions,
/// a character code for [`KeyboardEventKind::Char`]). `mapped_key` is the
/// canonical key for that code, or [`Key::None`] if the code is unmapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardEvent {
    pub kind: KeyboardEventKind,
    pub key_code: u32,
    pub mapped_key: Key,
    pub modifiers: KeyboardModifiers,
}

bitflags! {
    /// Modifier keys held at the moment a key event was translated.
    ///
    /// These are queried live from the host keyboard state during
    /// translation, not captured with the host message. A modifier
    /// released between the OS generating a key message and the pump
    /// delivering it is therefore reported as released.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyboardModifiers: u32 {
        const ALT   = 1 << 0;
        const CTRL  = 1 << 1;
        const SHIFT = 1 << 2;
        const SUPER = 1 << 3;
    }
}

//=== Mouse Events ========================================================

/// Sub-type of a [`MouseEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Move,
    ButtonDown,
    ButtonUp,
    Wheel,
}

/// Mouse button identifier.
///
/// `None` is used for motion and wheel events, which carry no button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    None,
    Left,
    Right,
    Middle,
}

/// Pointer input in window-relative client coordinates.
///
/// `wheel_delta` is normalized so one wheel detent is `±1.0`; it is `0.0`
/// for every kind other than [`MouseEventKind::Wheel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub button: MouseButton,
    pub x: i32,
    pub y: i32,
    pub wheel_delta: f32,
}

//=== Gamepad Events ======================================================

/// Gamepad connection change or state report for one controller slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GamepadEvent {
    /// Slot became connected this frame. State is not read on this frame.
    Connected { device_index: u32 },

    /// Slot stopped answering this frame.
    Disconnected { device_index: u32 },

    /// Full state of a connected slot. Emitted every frame while connected.
    StateChanged {
        device_index: u32,
        state: GamepadState,
    },
}

impl GamepadEvent {
    /// Controller slot this event refers to.
    pub fn device_index(&self) -> u32 {
        match *self {
            Self::Connected { device_index }
            | Self::Disconnected { device_index }
            | Self::StateChanged { device_index, .. } => device_index,
        }
    }
}

/// Normalized gamepad state.
///
/// Stick axes are in `[-1.0, 1.0]` with the deadzone already applied;
/// triggers are in `[0.0, 1.0]`. Buttons are `true` only while held.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GamepadState {
    //--- Digital Buttons --------------------------------------------------
    pub dpad_up: bool,
    pub dpad_down: bool,
    pub dpad_left: bool,
    pub dpad_right: bool,
    pub action_a: bool,
    pub action_b: bool,
    pub action_x: bool,
    pub action_y: bool,
    pub start: bool,
    pub back: bool,
    pub left_thumb: bool,
    pub right_thumb: bool,
    pub left_shoulder: bool,
    pub right_shoulder: bool,

    //--- Analog Axes ------------------------------------------------------
    pub left_stick_x: f32,
    pub left_stick_y: f32,
    pub right_stick_x: f32,
    pub right_stick_y: f32,
    pub left_trigger: f32,
    pub right_trigger: f32,
}

//=== Key =================================================================

/// Canonical key vocabulary.
///
/// Discriminants follow virtual-key numbering, so `Key::A as u32 == 0x41`.
/// Codes without a canonical key translate to [`Key::None`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum Key {
    /// Sentinel for unmapped codes.
    #[default]
    None = 0,

    //--- Editing & Control ------------------------------------------------
    Backspace = 0x08,
    Tab = 0x09,
    Clear = 0x0C,
    Enter = 0x0D,
    Shift = 0x10,
    Control = 0x11,
    Alt = 0x12,
    Pause = 0x13,
    CapsLock = 0x14,
    Escape = 0x1B,
    Space = 0x20,

    //--- Navigation -------------------------------------------------------
    PageUp = 0x21,
    PageDown = 0x22,
    End = 0x23,
    Home = 0x24,
    Left = 0x25,
    Up = 0x26,
    Right = 0x27,
    Down = 0x28,
    Select = 0x29,
    Print = 0x2A,
    Execute = 0x2B,
    Snapshot = 0x2C,
    Insert = 0x2D,
    Delete = 0x2E,
    Help = 0x2F,

    //--- Digits -----------------------------------------------------------
    Key0 = 0x30, Key1 = 0x31, Key2 = 0x32, Key3 = 0x33, Key4 = 0x34,
    Key5 = 0x35, Key6 = 0x36, Key7 = 0x37, Key8 = 0x38, Key9 = 0x39,

    //--- Letters ----------------------------------------------------------
    A = 0x41, B = 0x42, C = 0x43, D = 0x44, E = 0x45, F = 0x46, G = 0x47,
    H = 0x48, I = 0x49, J = 0x4A, K = 0x4B, L = 0x4C, M = 0x4D, N = 0x4E,
    O = 0x4F, P = 0x50, Q = 0x51, R = 0x52, S = 0x53, T = 0x54, U = 0x55,
    V = 0x56, W = 0x57, X = 0x58, Y = 0x59, Z = 0x5A,

    //--- System -----------------------------------------------------------
    LeftSuper = 0x5B,
    RightSuper = 0x5C,
    Apps = 0x5D,
    Sleep = 0x5F,

    //--- Numeric Keypad ---------------------------------------------------
    NumPad0 = 0x60, NumPad1 = 0x61, NumPad2 = 0x62, NumPad3 = 0x63,
    NumPad4 = 0x64, NumPad5 = 0x65, NumPad6 = 0x66, NumPad7 = 0x67,
    NumPad8 = 0x68, NumPad9 = 0x69,
    Multiply = 0x6A,
    Add = 0x6B,
    Separator = 0x6C,
    Subtract = 0x6D,
    Decimal = 0x6E,
    Divide = 0x6F,

    //--- Function Keys ----------------------------------------------------
    F1 = 0x70, F2 = 0x71, F3 = 0x72, F4 = 0x73, F5 = 0x74, F6 = 0x75,
    F7 = 0x76, F8 = 0x77, F9 = 0x78, F10 = 0x79, F11 = 0x7A, F12 = 0x7B,
    F13 = 0x7C, F14 = 0x7D, F15 = 0x7E, F16 = 0x7F, F17 = 0x80, F18 = 0x81,
    F19 = 0x82, F20 = 0x83, F21 = 0x84, F22 = 0x85, F23 = 0x86, F24 = 0x87,

    //--- Locks ------------------------------------------------------------
    NumLock = 0x90,
    Scroll = 0x91,

    //--- Sided Modifiers --------------------------------------------------
    LeftShift = 0xA0,
    RightShift = 0xA1,
    LeftControl = 0xA2,
    RightControl = 0xA3,
    LeftAlt = 0xA4,
    RightAlt = 0xA5,
}

impl Key {
    /// Virtual-key code of this key (`0` for [`Key::None`]).
    pub fn code(self) -> u32 {
        self as u32
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
