// SPDX-License-Identifier: MIT
//
// SgrEncoder — turns a cell's style into SGR escape codes, once per change.
//
// The encoder remembers the last (fg, bg, attrs) triple it emitted. A cell
// with the same style produces no bytes at all; a cell with a different
// style produces a full reset followed by the complete new style:
//
//   ESC ( B ESC [ m      reset (ASCII charset + SGR 0)
//   ESC [ n m ...        one per attribute, ascending SGR number
//   ESC [ 3x m           foreground, omitted for Default
//   ESC [ 4x m           background, omitted for Default
//
// No attribute is ever switched off on its own.
//
// The cache describes one output stream. Anything that puts the terminal in
// an unknown state (screen clear, failed write, new writer) must call
// `reset()` so the next cell re-emits its style.

use std::io::{self, Write};

use crate::ansi;
use crate::cell::{Attr, Cell};
use crate::color::Color;

/// Stateful style encoder with a last-emitted cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SgrEncoder {
    last: Option<(Color, Color, Attr)>,
}

impl SgrEncoder {
    /// Create an encoder that has emitted nothing yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Forget the cached style. The next `encode` always emits.
    pub const fn reset(&mut self) {
        self.last = None;
    }

    /// The style last written, if any.
    #[inline]
    #[must_use]
    pub const fn last(&self) -> Option<(Color, Color, Attr)> {
        self.last
    }

    /// Emit the codes for `(fg, bg, attrs)` unless they are already active.
    ///
    /// Returns whether anything was written.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails. The cache is only
    /// updated after every code was written.
    pub fn encode(
        &mut self,
        out: &mut impl Write,
        fg: Color,
        bg: Color,
        attrs: Attr,
    ) -> io::Result<bool> {
        let style = (fg, bg, attrs);
        if self.last == Some(style) {
            return Ok(false);
        }

        ansi::reset(out)?;
        for code in attrs.sgr_codes() {
            ansi::sgr(out, code)?;
        }
        ansi::fg(out, fg)?;
        ansi::bg(out, bg)?;

        self.last = Some(style);
        Ok(true)
    }

    /// Emit the style of `cell`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    #[inline]
    pub fn encode_cell(&mut self, out: &mut impl Write, cell: &Cell) -> io::Result<bool> {
        self.encode(out, cell.fg, cell.bg, cell.attrs)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn encode(enc: &mut SgrEncoder, fg: Color, bg: Color, attrs: Attr) -> String {
        let mut buf = Vec::new();
        enc.encode(&mut buf, fg, bg, attrs).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn first_style_always_emits() {
        let mut enc = SgrEncoder::new();
        assert_eq!(encode(&mut enc, Color::Default, Color::Default, Attr::empty()), "\x1b(B\x1b[m");
    }

    #[test]
    fn bold_on_red() {
        let mut enc = SgrEncoder::new();
        assert_eq!(
            encode(&mut enc, Color::Default, Color::RED, Attr::BOLD),
            "\x1b(B\x1b[m\x1b[1m\x1b[41m"
        );
    }

    #[test]
    fn full_style_order() {
        let mut enc = SgrEncoder::new();
        assert_eq!(
            encode(
                &mut enc,
                Color::YELLOW,
                Color::BLUE,
                Attr::REVERSE | Attr::UNDERLINE | Attr::BOLD,
            ),
            "\x1b(B\x1b[m\x1b[1m\x1b[4m\x1b[7m\x1b[33m\x1b[44m"
        );
    }

    #[test]
    fn repeated_style_is_silent() {
        let mut enc = SgrEncoder::new();
        encode(&mut enc, Color::GREEN, Color::Default, Attr::ITALIC);
        assert_eq!(encode(&mut enc, Color::GREEN, Color::Default, Attr::ITALIC), "");
        assert_eq!(enc.last(), Some((Color::GREEN, Color::Default, Attr::ITALIC)));
    }

    #[test]
    fn any_change_re_emits_everything() {
        let mut enc = SgrEncoder::new();
        encode(&mut enc, Color::GREEN, Color::RED, Attr::BOLD);
        assert_eq!(
            encode(&mut enc, Color::GREEN, Color::BLUE, Attr::BOLD),
            "\x1b(B\x1b[m\x1b[1m\x1b[32m\x1b[44m"
        );
    }

    #[test]
    fn dropping_attributes_resets_to_plain() {
        let mut enc = SgrEncoder::new();
        encode(&mut enc, Color::Default, Color::Default, Attr::BOLD);
        assert_eq!(encode(&mut enc, Color::Default, Color::Default, Attr::empty()), "\x1b(B\x1b[m");
    }

    #[test]
    fn reset_forgets_cache() {
        let mut enc = SgrEncoder::new();
        encode(&mut enc, Color::Default, Color::RED, Attr::empty());
        enc.reset();
        assert_eq!(enc.last(), None);
        assert_eq!(
            encode(&mut enc, Color::Default, Color::RED, Attr::empty()),
            "\x1b(B\x1b[m\x1b[41m"
        );
    }

    #[test]
    fn encode_cell_reports_emission() {
        let mut enc = SgrEncoder::new();
        let cell = Cell::new('x').with_fg(Color::Indexed(200));
        let mut buf = Vec::new();
        assert!(enc.encode_cell(&mut buf, &cell).unwrap());
        assert!(!enc.encode_cell(&mut buf, &cell).unwrap());
        assert_eq!(String::from_utf8(buf).unwrap(), "\x1b(B\x1b[m\x1b[38;5;200m");
    }
}
