// SPDX-License-Identifier: MIT
//
// Input event types.
//
// Everything `Screen::poll_event` can hand back: keystrokes, mouse reports
// and resize notifications. Key identities use the classic 16-bit key table
// (control codes below 0x20, special keys counting down from 0xFFFF) so
// programs written against that numbering can compare codes directly.
// Printable text arrives with `key == Key::NONE` and the character in `ch`.

use std::fmt;

use bitflags::bitflags;

// ─── Event ──────────────────────────────────────────────────────────────────

/// A decoded input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A keystroke: special key, control chord or printable character.
    Key(KeyEvent),
    /// A mouse button, wheel or motion report.
    Mouse(MouseEvent),
    /// The terminal changed size. The screen grid has already been resized.
    Resize {
        width: u16,
        height: u16,
    },
}

// ─── Keys ───────────────────────────────────────────────────────────────────

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Key identity. [`Key::NONE`] for printable characters.
    pub key: Key,
    /// The character typed, for printable input.
    pub ch: Option<char>,
    /// Active modifier keys.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A special or control key with no character.
    #[inline]
    #[must_use]
    pub const fn key(key: Key) -> Self {
        Self {
            key,
            ch: None,
            modifiers: Modifiers::empty(),
        }
    }

    /// A printable character.
    #[inline]
    #[must_use]
    pub const fn char(ch: char) -> Self {
        Self {
            key: Key::NONE,
            ch: Some(ch),
            modifiers: Modifiers::empty(),
        }
    }

    /// Replace the modifier set.
    #[inline]
    #[must_use]
    pub const fn with_modifiers(self, modifiers: Modifiers) -> Self {
        Self { modifiers, ..self }
    }
}

impl From<KeyEvent> for Event {
    fn from(key: KeyEvent) -> Self {
        Self::Key(key)
    }
}

/// A 16-bit key code from the classic key table.
///
/// Control keys carry their ASCII control value; special keys count down
/// from `0xFFFF`. Several names alias the same code (`BACKSPACE` and
/// `CTRL_H` are both `0x08`) because the terminal sends the same byte.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(pub u16);

impl Key {
    /// No key: the event carries a printable character instead.
    pub const NONE: Self = Self(0);

    pub const CTRL_TILDE: Self = Self(0x00);
    pub const CTRL_2: Self = Self(0x00);
    pub const CTRL_A: Self = Self(0x01);
    pub const CTRL_B: Self = Self(0x02);
    pub const CTRL_C: Self = Self(0x03);
    pub const CTRL_D: Self = Self(0x04);
    pub const CTRL_E: Self = Self(0x05);
    pub const CTRL_F: Self = Self(0x06);
    pub const CTRL_G: Self = Self(0x07);
    pub const BACKSPACE: Self = Self(0x08);
    pub const CTRL_H: Self = Self(0x08);
    pub const TAB: Self = Self(0x09);
    pub const CTRL_I: Self = Self(0x09);
    pub const CTRL_J: Self = Self(0x0A);
    pub const CTRL_K: Self = Self(0x0B);
    pub const CTRL_L: Self = Self(0x0C);
    pub const ENTER: Self = Self(0x0D);
    pub const CTRL_M: Self = Self(0x0D);
    pub const CTRL_N: Self = Self(0x0E);
    pub const CTRL_O: Self = Self(0x0F);
    pub const CTRL_P: Self = Self(0x10);
    pub const CTRL_Q: Self = Self(0x11);
    pub const CTRL_R: Self = Self(0x12);
    pub const CTRL_S: Self = Self(0x13);
    pub const CTRL_T: Self = Self(0x14);
    pub const CTRL_U: Self = Self(0x15);
    pub const CTRL_V: Self = Self(0x16);
    pub const CTRL_W: Self = Self(0x17);
    pub const CTRL_X: Self = Self(0x18);
    pub const CTRL_Y: Self = Self(0x19);
    pub const CTRL_Z: Self = Self(0x1A);
    pub const ESC: Self = Self(0x1B);
    pub const CTRL_LSQ_BRACKET: Self = Self(0x1B);
    pub const CTRL_3: Self = Self(0x1B);
    pub const CTRL_4: Self = Self(0x1C);
    pub const CTRL_BACKSLASH: Self = Self(0x1C);
    pub const CTRL_5: Self = Self(0x1D);
    pub const CTRL_RSQ_BRACKET: Self = Self(0x1D);
    pub const CTRL_6: Self = Self(0x1E);
    pub const CTRL_7: Self = Self(0x1F);
    pub const CTRL_SLASH: Self = Self(0x1F);
    pub const CTRL_UNDERSCORE: Self = Self(0x1F);
    pub const SPACE: Self = Self(0x20);
    pub const BACKSPACE2: Self = Self(0x7F);
    pub const CTRL_8: Self = Self(0x7F);

    pub const F1: Self = Self(0xFFFF);
    pub const F2: Self = Self(0xFFFF - 1);
    pub const F3: Self = Self(0xFFFF - 2);
    pub const F4: Self = Self(0xFFFF - 3);
    pub const F5: Self = Self(0xFFFF - 4);
    pub const F6: Self = Self(0xFFFF - 5);
    pub const F7: Self = Self(0xFFFF - 6);
    pub const F8: Self = Self(0xFFFF - 7);
    pub const F9: Self = Self(0xFFFF - 8);
    pub const F10: Self = Self(0xFFFF - 9);
    pub const F11: Self = Self(0xFFFF - 10);
    pub const F12: Self = Self(0xFFFF - 11);
    pub const INSERT: Self = Self(0xFFFF - 12);
    pub const DELETE: Self = Self(0xFFFF - 13);
    pub const HOME: Self = Self(0xFFFF - 14);
    pub const END: Self = Self(0xFFFF - 15);
    pub const PGUP: Self = Self(0xFFFF - 16);
    pub const PGDN: Self = Self(0xFFFF - 17);
    pub const ARROW_UP: Self = Self(0xFFFF - 18);
    pub const ARROW_DOWN: Self = Self(0xFFFF - 19);
    pub const ARROW_LEFT: Self = Self(0xFFFF - 20);
    pub const ARROW_RIGHT: Self = Self(0xFFFF - 21);
    pub const BACK_TAB: Self = Self(0xFFFF - 22);
    pub const MOUSE_LEFT: Self = Self(0xFFFF - 23);
    pub const MOUSE_RIGHT: Self = Self(0xFFFF - 24);
    pub const MOUSE_MIDDLE: Self = Self(0xFFFF - 25);
    pub const MOUSE_RELEASE: Self = Self(0xFFFF - 26);
    pub const MOUSE_WHEEL_UP: Self = Self(0xFFFF - 27);
    pub const MOUSE_WHEEL_DOWN: Self = Self(0xFFFF - 28);

    /// F1..=F12 in order, for table lookups.
    const FUNCTION: [Self; 12] = [
        Self::F1,
        Self::F2,
        Self::F3,
        Self::F4,
        Self::F5,
        Self::F6,
        Self::F7,
        Self::F8,
        Self::F9,
        Self::F10,
        Self::F11,
        Self::F12,
    ];

    /// Function key `n` (1-based). `None` outside 1..=12.
    #[must_use]
    pub const fn function(n: u8) -> Option<Self> {
        if matches!(n, 1..=12) {
            Some(Self::FUNCTION[(n - 1) as usize])
        } else {
            None
        }
    }

    /// The raw 16-bit code.
    #[inline]
    #[must_use]
    pub const fn code(self) -> u16 {
        self.0
    }

    /// Whether this is one of the keys counted down from `0xFFFF`.
    #[inline]
    #[must_use]
    pub const fn is_special(self) -> bool {
        self.0 >= Self::MOUSE_WHEEL_DOWN.0
    }

    /// A readable name for special and control keys.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::BACKSPACE => "Backspace",
            Self::TAB => "Tab",
            Self::ENTER => "Enter",
            Self::ESC => "Esc",
            Self::SPACE => "Space",
            Self::BACKSPACE2 => "Backspace2",
            Self::INSERT => "Insert",
            Self::DELETE => "Delete",
            Self::HOME => "Home",
            Self::END => "End",
            Self::PGUP => "PageUp",
            Self::PGDN => "PageDown",
            Self::ARROW_UP => "Up",
            Self::ARROW_DOWN => "Down",
            Self::ARROW_LEFT => "Left",
            Self::ARROW_RIGHT => "Right",
            Self::BACK_TAB => "BackTab",
            Self::MOUSE_LEFT => "MouseLeft",
            Self::MOUSE_RIGHT => "MouseRight",
            Self::MOUSE_MIDDLE => "MouseMiddle",
            Self::MOUSE_RELEASE => "MouseRelease",
            Self::MOUSE_WHEEL_UP => "WheelUp",
            Self::MOUSE_WHEEL_DOWN => "WheelDown",
            Self::F1 => "F1",
            Self::F2 => "F2",
            Self::F3 => "F3",
            Self::F4 => "F4",
            Self::F5 => "F5",
            Self::F6 => "F6",
            Self::F7 => "F7",
            Self::F8 => "F8",
            Self::F9 => "F9",
            Self::F10 => "F10",
            Self::F11 => "F11",
            Self::F12 => "F12",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Key({name})"),
            None => write!(f, "Key({:#06x})", self.0),
        }
    }
}

bitflags! {
    /// Modifier keys held during an event.
    ///
    /// Values follow the classic event numbering: ALT 1, CTRL 2, SHIFT 4,
    /// MOTION 8 (mouse moved with a button held).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const ALT    = 1;
        const CTRL   = 2;
        const SHIFT  = 4;
        const MOTION = 8;
    }
}

impl Modifiers {
    /// Decode an xterm CSI modifier parameter (`1 + bitmask`).
    ///
    /// The bitmask is Shift 1, Alt 2, Ctrl 4; anything above is ignored.
    #[must_use]
    pub const fn from_csi_param(param: u16) -> Self {
        let mask = param.saturating_sub(1);
        let mut mods = Self::empty();
        if mask & 1 != 0 {
            mods = mods.union(Self::SHIFT);
        }
        if mask & 2 != 0 {
            mods = mods.union(Self::ALT);
        }
        if mask & 4 != 0 {
            mods = mods.union(Self::CTRL);
        }
        mods
    }
}

// ─── Mouse ──────────────────────────────────────────────────────────────────

/// A mouse report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// 0-indexed column.
    pub x: u16,
    /// 0-indexed row.
    pub y: u16,
    /// The button involved. `None` for a release whose button the
    /// terminal did not report, or motion with no button held.
    pub button: Option<MouseButton>,
    /// Press, release or motion.
    pub action: MouseAction,
    /// Shift / Alt / Ctrl held, plus MOTION for drags.
    pub modifiers: Modifiers,
}

impl MouseEvent {
    /// The classic key code for this report.
    ///
    /// Releases and button-less motion map to [`Key::MOUSE_RELEASE`].
    #[must_use]
    pub const fn key(&self) -> Key {
        if matches!(self.action, MouseAction::Release) {
            return Key::MOUSE_RELEASE;
        }
        match self.button {
            Some(MouseButton::Left) => Key::MOUSE_LEFT,
            Some(MouseButton::Middle) => Key::MOUSE_MIDDLE,
            Some(MouseButton::Right) => Key::MOUSE_RIGHT,
            Some(MouseButton::WheelUp) => Key::MOUSE_WHEEL_UP,
            Some(MouseButton::WheelDown) => Key::MOUSE_WHEEL_DOWN,
            None => Key::MOUSE_RELEASE,
        }
    }
}

/// Mouse button identity. The wheel counts as two buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
}

/// What the mouse did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseAction {
    Press,
    Release,
    /// Moved with a button held.
    Motion,
}

// ─── Tests ──────────────────────────────────────────────────────────────────
