// SPDX-License-Identifier: MIT
//
// Terminal input decoder.
//
// Turns raw terminal bytes into events: keys, mouse reports and text.
// Understands:
//
// - Control bytes (Ctrl chords, Tab, Enter, Backspace)
// - CSI letter keys with optional modifiers (`ESC [ 1 ; 5 A` = Ctrl+Up)
// - CSI tilde keys (Insert, Delete, Home, End, PgUp, PgDn, F1–F12)
// - SS3 keys (`ESC O A`, `ESC O P`)
// - Legacy X10 mouse reports (`ESC [ M cb cx cy`)
// - SGR mouse reports (`ESC [ < b ; x ; y M|m`)
// - Alt+key (`ESC` followed by any key byte)
// - UTF-8 multi-byte characters
//
// # Design
//
// A byte-at-a-time state machine: Idle, Escape (collecting a sequence) or
// Utf8 (collecting continuation bytes). The bytes of the sequence being
// collected live in a bounded pending buffer, so sequences may be split
// across any number of reads.
//
// A lone ESC is ambiguous: it is the Escape key, or the start of a longer
// sequence whose rest hasn't arrived. The decoder keeps it pending; the
// caller waits a short quiet period and then calls `flush()`, which
// resolves it as the Escape key and re-decodes anything behind it.
//
// Nothing here ever fails. Bytes that can't be decoded come out as a
// U+FFFD key event (invalid UTF-8) or are dropped (unknown sequences),
// with a debug log either way.

use tracing::debug;

use crate::event::{Event, Key, KeyEvent, Modifiers, MouseAction, MouseButton, MouseEvent};

/// Longest escape sequence the decoder will collect before giving up.
pub const MAX_SEQUENCE_LEN: usize = 32;

// ─── State ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Escape,
    Utf8 { remaining: u8 },
}

/// Input decoder.
///
/// Feed bytes with [`advance`](Decoder::advance); call
/// [`flush`](Decoder::flush) once input has been quiet for the escape
/// timeout to resolve a pending lone ESC.
///
/// ```
/// use cellterm_core::event::{Event, Key, KeyEvent};
/// use cellterm_core::input::Decoder;
///
/// let mut decoder = Decoder::new();
/// assert_eq!(decoder.advance(b"\x1b[A"), vec![Event::Key(KeyEvent::key(Key::ARROW_UP))]);
///
/// assert!(decoder.advance(b"\x1b").is_empty());
/// assert_eq!(decoder.flush(), vec![Event::Key(KeyEvent::key(Key::ESC))]);
/// ```
#[derive(Debug)]
pub struct Decoder {
    state: State,
    pending: Vec<u8>,
}

impl Decoder {
    /// Create a decoder in the idle state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            pending: Vec::with_capacity(MAX_SEQUENCE_LEN),
        }
    }

    /// Whether bytes are waiting for more input (or a flush).
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.state != State::Idle
    }

    /// Feed raw bytes and return every event they complete.
    pub fn advance(&mut self, data: &[u8]) -> Vec<Event> {
        let mut events = Vec::new();
        for &byte in data {
            self.push_byte(byte, &mut events);
        }
        events
    }

    /// Resolve whatever is pending as if no more bytes will follow.
    ///
    /// A pending ESC becomes the Escape key and the bytes collected after
    /// it are decoded again from scratch. A partial UTF-8 character becomes
    /// a replacement-character event.
    pub fn flush(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        loop {
            match self.state {
                State::Idle => break,
                State::Escape => {
                    let rest: Vec<u8> = self.pending.drain(1..).collect();
                    self.reset();
                    events.push(Event::Key(KeyEvent::key(Key::ESC)));
                    for byte in rest {
                        self.push_byte(byte, &mut events);
                    }
                }
                State::Utf8 { .. } => {
                    let bytes = std::mem::take(&mut self.pending);
                    self.reset();
                    events.push(malformed(&bytes));
                }
            }
        }
        events
    }

    fn reset(&mut self) {
        self.state = State::Idle;
        self.pending.clear();
    }

    // ─── State Machine ──────────────────────────────────────────────────

    fn push_byte(&mut self, byte: u8, events: &mut Vec<Event>) {
        match self.state {
            State::Idle => self.idle(byte, events),
            State::Escape => self.escape(byte, events),
            State::Utf8 { remaining } => self.utf8(byte, remaining, events),
        }
    }

    fn idle(&mut self, byte: u8, events: &mut Vec<Event>) {
        match byte {
            0x1B => {
                self.state = State::Escape;
                self.pending.push(byte);
            }
            0x00..=0x1F | 0x7F => events.push(Event::Key(control_key(byte))),
            0x20..=0x7E => events.push(Event::Key(KeyEvent::char(char::from(byte)))),
            0xC0..=0xF7 => {
                let remaining = match byte {
                    0xC0..=0xDF => 1,
                    0xE0..=0xEF => 2,
                    _ => 3,
                };
                self.state = State::Utf8 { remaining };
                self.pending.push(byte);
            }
            _ => events.push(malformed(&[byte])),
        }
    }

    fn utf8(&mut self, byte: u8, remaining: u8, events: &mut Vec<Event>) {
        if byte & 0xC0 != 0x80 {
            let bytes = std::mem::take(&mut self.pending);
            self.reset();
            events.push(malformed(&bytes));
            self.idle(byte, events);
            return;
        }

        self.pending.push(byte);
        if remaining > 1 {
            self.state = State::Utf8 { remaining: remaining - 1 };
            return;
        }

        let event = match std::str::from_utf8(&self.pending)
            .ok()
            .and_then(|s| s.chars().next())
        {
            Some(ch) => Event::Key(KeyEvent::char(ch)),
            None => malformed(&self.pending),
        };
        self.reset();
        events.push(event);
    }

    fn escape(&mut self, byte: u8, events: &mut Vec<Event>) {
        self.pending.push(byte);

        match parse_escape(&self.pending) {
            Parsed::Event(event) => {
                self.reset();
                events.push(event);
            }
            Parsed::Incomplete => {
                if self.pending.len() >= MAX_SEQUENCE_LEN {
                    debug!(bytes = ?self.pending, "escape sequence too long, discarded");
                    self.reset();
                }
            }
            Parsed::Unknown => {
                debug!(bytes = ?self.pending, "unrecognized escape sequence, discarded");
                self.reset();
            }
            Parsed::Interrupted => {
                let prefix = &self.pending[..self.pending.len() - 1];
                if prefix == [0x1B] {
                    events.push(Event::Key(KeyEvent::key(Key::ESC)));
                } else {
                    debug!(bytes = ?prefix, "escape sequence interrupted, discarded");
                }
                self.reset();
                self.idle(byte, events);
            }
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Stateless Parsing Functions ────────────────────────────────────────────
//
// Each function looks at the whole pending sequence (always starting with
// ESC) and reports whether it is a complete event, needs more bytes, or
// can never become anything we know.

/// Outcome of matching the pending escape sequence.
#[derive(Debug, PartialEq, Eq)]
enum Parsed {
    /// Complete and recognized.
    Event(Event),
    /// A valid prefix; keep collecting.
    Incomplete,
    /// Complete but not in any table.
    Unknown,
    /// The last byte can't continue this sequence and must be decoded
    /// on its own.
    Interrupted,
}

fn parse_escape(seq: &[u8]) -> Parsed {
    debug_assert!(seq.len() >= 2 && seq[0] == 0x1B);

    match seq[1] {
        b'[' => parse_csi(seq),
        b'O' => parse_ss3(seq),
        // Alt+Escape.
        0x1B => Parsed::Event(alt(KeyEvent::key(Key::ESC))),
        // Alt+control byte.
        b @ (0x00..=0x1F | 0x7F) => Parsed::Event(alt(control_key(b))),
        // Alt+printable.
        b @ 0x20..=0x7E => Parsed::Event(alt(KeyEvent::char(char::from(b)))),
        // ESC followed by UTF-8 or garbage: ESC stands alone.
        _ => Parsed::Interrupted,
    }
}

// ── CSI (Control Sequence Introducer) ───────────────────────────────────────

fn parse_csi(seq: &[u8]) -> Parsed {
    if seq.len() < 3 {
        return Parsed::Incomplete;
    }

    match seq[2] {
        // X10 mouse payload bytes may be anything, so check before the
        // parameter-byte validation below.
        b'M' => return parse_x10_mouse(seq),
        b'<' => return parse_sgr_mouse(seq),
        _ => {}
    }

    // Parameter bytes 0x30..=0x3F, intermediates 0x20..=0x2F, final
    // 0x40..=0x7E. Bytes arrive one at a time, so everything before the
    // last byte has already been accepted as a parameter or intermediate.
    let end = seq.len() - 1;
    let last = seq[end];
    match last {
        0x20..=0x3F => return Parsed::Incomplete,
        0x40..=0x7E => {}
        _ => return Parsed::Interrupted,
    }

    let params = parse_params(&seq[2..end]);
    let modifiers = params
        .get(1)
        .map_or(Modifiers::empty(), |&p| Modifiers::from_csi_param(p));

    let key = match last {
        b'~' => match params.first().copied().unwrap_or(0) {
            1 | 7 => Key::HOME,
            2 => Key::INSERT,
            3 => Key::DELETE,
            4 | 8 => Key::END,
            5 => Key::PGUP,
            6 => Key::PGDN,
            11 => Key::F1,
            12 => Key::F2,
            13 => Key::F3,
            14 => Key::F4,
            15 => Key::F5,
            17 => Key::F6,
            18 => Key::F7,
            19 => Key::F8,
            20 => Key::F9,
            21 => Key::F10,
            23 => Key::F11,
            24 => Key::F12,
            _ => return Parsed::Unknown,
        },
        b'A' => Key::ARROW_UP,
        b'B' => Key::ARROW_DOWN,
        b'C' => Key::ARROW_RIGHT,
        b'D' => Key::ARROW_LEFT,
        b'H' => Key::HOME,
        b'F' => Key::END,
        b'P' => Key::F1,
        b'Q' => Key::F2,
        b'R' => Key::F3,
        b'S' => Key::F4,
        b'Z' => Key::BACK_TAB,
        _ => return Parsed::Unknown,
    };

    Parsed::Event(Event::Key(KeyEvent::key(key).with_modifiers(modifiers)))
}

// ── SS3 (Single Shift 3) ───────────────────────────────────────────────────

fn parse_ss3(seq: &[u8]) -> Parsed {
    if seq.len() < 3 {
        return Parsed::Incomplete;
    }

    let key = match seq[2] {
        b'A' => Key::ARROW_UP,
        b'B' => Key::ARROW_DOWN,
        b'C' => Key::ARROW_RIGHT,
        b'D' => Key::ARROW_LEFT,
        b'H' => Key::HOME,
        b'F' => Key::END,
        b'P' => Key::F1,
        b'Q' => Key::F2,
        b'R' => Key::F3,
        b'S' => Key::F4,
        0x1B | 0x80..=0xFF => return Parsed::Interrupted,
        _ => return Parsed::Unknown,
    };

    Parsed::Event(Event::Key(KeyEvent::key(key)))
}

// ── Mouse ──────────────────────────────────────────────────────────────────

fn parse_x10_mouse(seq: &[u8]) -> Parsed {
    // ESC [ M cb cx cy, each payload byte offset by 32, coordinates 1-based.
    if seq.len() < 6 {
        return Parsed::Incomplete;
    }

    let cb = u16::from(seq[3].saturating_sub(32));
    let x = u16::from(seq[4].saturating_sub(33));
    let y = u16::from(seq[5].saturating_sub(33));

    decode_mouse(cb, x, y, false).map_or(Parsed::Unknown, |ev| Parsed::Event(Event::Mouse(ev)))
}

fn parse_sgr_mouse(seq: &[u8]) -> Parsed {
    // ESC [ < b ; x ; y M   (press / motion)
    // ESC [ < b ; x ; y m   (release)
    let last = seq[seq.len() - 1];
    if seq.len() == 3 || last.is_ascii_digit() || last == b';' {
        return Parsed::Incomplete;
    }
    if last != b'M' && last != b'm' {
        return Parsed::Interrupted;
    }

    let params = parse_params(&seq[3..seq.len() - 1]);
    let [cb, raw_x, raw_y] = params[..] else {
        return Parsed::Unknown;
    };

    decode_mouse(cb, raw_x.saturating_sub(1), raw_y.saturating_sub(1), last == b'm')
        .map_or(Parsed::Unknown, |ev| Parsed::Event(Event::Mouse(ev)))
}

/// Decode an xterm button byte into a mouse event.
///
/// Bits 0–1: button (3 = release / none), 2: Shift, 3: Alt, 4: Ctrl,
/// 5: motion, 6: wheel.
fn decode_mouse(cb: u16, x: u16, y: u16, released: bool) -> Option<MouseEvent> {
    let mut modifiers = Modifiers::empty();
    if cb & 4 != 0 {
        modifiers |= Modifiers::SHIFT;
    }
    if cb & 8 != 0 {
        modifiers |= Modifiers::ALT;
    }
    if cb & 16 != 0 {
        modifiers |= Modifiers::CTRL;
    }

    let base = cb & 3;
    let held = match base {
        0 => Some(MouseButton::Left),
        1 => Some(MouseButton::Middle),
        2 => Some(MouseButton::Right),
        _ => None,
    };

    let (button, action) = if cb & 64 != 0 {
        let wheel = match base {
            0 => MouseButton::WheelUp,
            1 => MouseButton::WheelDown,
            _ => return None,
        };
        (Some(wheel), MouseAction::Press)
    } else if cb & 32 != 0 {
        modifiers |= Modifiers::MOTION;
        (held, MouseAction::Motion)
    } else if released || held.is_none() {
        (held, MouseAction::Release)
    } else {
        (held, MouseAction::Press)
    };

    Some(MouseEvent {
        x,
        y,
        button,
        action,
        modifiers,
    })
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// A control byte as a key event.
///
/// Bytes a dedicated key produces on its own (Backspace, Tab, Enter, Esc,
/// Delete-as-backspace) carry no modifier; the rest are Ctrl chords.
fn control_key(byte: u8) -> KeyEvent {
    let event = KeyEvent::key(Key(u16::from(byte)));
    match byte {
        0x08 | 0x09 | 0x0D | 0x1B | 0x7F => event,
        _ => event.with_modifiers(Modifiers::CTRL),
    }
}

fn alt(event: KeyEvent) -> Event {
    Event::Key(event.with_modifiers(event.modifiers | Modifiers::ALT))
}

/// Report undecodable bytes as a single replacement character.
fn malformed(bytes: &[u8]) -> Event {
    debug!(?bytes, "malformed input");
    Event::Key(KeyEvent::char(char::REPLACEMENT_CHARACTER))
}

/// Parse semicolon-separated decimal parameters. Empty fields are 0.
fn parse_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |acc, &b| acc.saturating_mul(10).saturating_add(u16::from(b - b'0')))
        })
        .collect()
}

// ─── Tests ──────────────────────────────────────────────────────────────────
