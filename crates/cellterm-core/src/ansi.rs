// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit. `SgrEncoder` and the renderer decide
// that. This module only knows the byte-level encoding.
//
// Cursor positions are 0-indexed in our API and converted to 1-indexed for
// the terminal (CUP is 1-based).

use std::io::{self, Write};

use crate::color::Color;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using CUP: `ESC [ y+1 ; x+1 H`.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Full attribute reset: select the ASCII character set, then SGR 0.
///
/// The charset reset undoes any line-drawing set a previous glyph may have
/// left selected. Everything the encoder tracked is gone afterwards.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b(B\x1b[m")
}

/// A single SGR parameter: `ESC [ n m`.
#[inline]
pub fn sgr(w: &mut impl Write, code: u8) -> io::Result<()> {
    write!(w, "\x1b[{code}m")
}

// ─── Colors ──────────────────────────────────────────────────────────────────

/// Set the foreground color.
///
/// Named colors use 30–37, bright ones 90–97, the rest of the palette
/// `38;5;n`, RGB `38;2;r;g;b`. `Default` writes nothing: after a reset the
/// terminal is already on its default.
pub fn fg(w: &mut impl Write, color: Color) -> io::Result<()> {
    match color {
        Color::Default => Ok(()),
        Color::Indexed(idx) if idx < 8 => write!(w, "\x1b[{}m", 30 + u16::from(idx)),
        Color::Indexed(idx) if idx < 16 => write!(w, "\x1b[{}m", 82 + u16::from(idx)),
        Color::Indexed(idx) => write!(w, "\x1b[38;5;{idx}m"),
        Color::Rgb(r, g, b) => write!(w, "\x1b[38;2;{r};{g};{b}m"),
    }
}

/// Set the background color (40–47, 100–107, `48;5;n`, `48;2;r;g;b`).
pub fn bg(w: &mut impl Write, color: Color) -> io::Result<()> {
    match color {
        Color::Default => Ok(()),
        Color::Indexed(idx) if idx < 8 => write!(w, "\x1b[{}m", 40 + u16::from(idx)),
        Color::Indexed(idx) if idx < 16 => write!(w, "\x1b[{}m", 92 + u16::from(idx)),
        Color::Indexed(idx) => write!(w, "\x1b[48;5;{idx}m"),
        Color::Rgb(r, g, b) => write!(w, "\x1b[48;2;{r};{g};{b}m"),
    }
}

// ─── Alternate Screen ───────────────────────────────────────────────────────

/// Enter the alternate screen buffer (DEC Private Mode 1049).
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// Exit the alternate screen buffer and restore original content.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

// ─── Mouse ──────────────────────────────────────────────────────────────────

/// Enable button-event mouse reporting (DEC 1000) in SGR format (DEC 1006).
///
/// Terminals that ignore 1006 fall back to the legacy `ESC [ M` reports;
/// the decoder understands both.
pub fn enable_mouse(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1000h\x1b[?1006h")
}

/// Disable mouse reporting.
pub fn disable_mouse(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1006l\x1b[?1000l")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
