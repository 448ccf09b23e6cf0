// SPDX-License-Identifier: MIT
//
// Terminal colors and the numeric attribute-word contract.
//
// `Color` is what a Cell stores: the terminal's own default, a palette
// index, or 24-bit RGB. Palette indices 0–7 are the eight named ANSI colors
// and 8–15 their bright variants; both get compact SGR codes.
//
// The `format` module carries the 16-bit attribute words other tooling
// passes around: a color number in the low byte (0 = default, 1–8 = the
// named colors) and style bits in the high byte. `decode_word` turns one
// of those words into a typed (Color, Attr) pair.

use crate::cell::Attr;

/// A resolved terminal color.
///
/// `Default` means "whatever the terminal uses" and never produces an SGR
/// color code of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Terminal default color.
    #[default]
    Default,
    /// Palette index: 0–7 named, 8–15 bright, 16–255 extended.
    Indexed(u8),
    /// 24-bit color.
    Rgb(u8, u8, u8),
}

impl Color {
    pub const BLACK: Self = Self::Indexed(0);
    pub const RED: Self = Self::Indexed(1);
    pub const GREEN: Self = Self::Indexed(2);
    pub const YELLOW: Self = Self::Indexed(3);
    pub const BLUE: Self = Self::Indexed(4);
    pub const MAGENTA: Self = Self::Indexed(5);
    pub const CYAN: Self = Self::Indexed(6);
    pub const WHITE: Self = Self::Indexed(7);

    /// Whether this is the terminal default.
    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }

    /// The bright variant of a named color. Other colors are returned as-is.
    #[inline]
    #[must_use]
    pub const fn bright(self) -> Self {
        match self {
            Self::Indexed(n) if n < 8 => Self::Indexed(n + 8),
            other => other,
        }
    }
}

// ─── Attribute Words ─────────────────────────────────────────────────────────

/// The 16-bit attribute-word constants.
///
/// Values are fixed: scripts and bindings built against the same numbering
/// pass them straight through.
pub mod format {
    /// Attribute word: color number in bits 0–7, style bits in 8–15.
    pub type Word = u16;

    pub const DEFAULT: Word = 0x0000;
    pub const BLACK: Word = 0x0001;
    pub const RED: Word = 0x0002;
    pub const GREEN: Word = 0x0003;
    pub const YELLOW: Word = 0x0004;
    pub const BLUE: Word = 0x0005;
    pub const MAGENTA: Word = 0x0006;
    pub const CYAN: Word = 0x0007;
    pub const WHITE: Word = 0x0008;

    pub const BOLD: Word = 0x0100;
    pub const UNDERLINE: Word = 0x0200;
    pub const REVERSE: Word = 0x0400;
    pub const ITALIC: Word = 0x0800;
    pub const BLINK: Word = 0x1000;
    pub const HI_BLACK: Word = 0x2000;
    pub const BRIGHT: Word = 0x4000;
    pub const DIM: Word = 0x8000;
    /// Alias kept for the 256-color naming.
    pub const BLACK_256: Word = HI_BLACK;

    pub(crate) const COLOR_MASK: Word = 0x00FF;
}

/// Decode one attribute word into its color and style bits.
///
/// ```
/// use cellterm_core::cell::Attr;
/// use cellterm_core::color::{decode_word, format, Color};
///
/// assert_eq!(decode_word(format::RED), (Color::RED, Attr::empty()));
/// assert_eq!(decode_word(format::BOLD), (Color::Default, Attr::BOLD));
/// assert_eq!(
///     decode_word(format::BLUE | format::BRIGHT | format::UNDERLINE),
///     (Color::Indexed(12), Attr::UNDERLINE),
/// );
/// ```
#[must_use]
pub const fn decode_word(word: format::Word) -> (Color, Attr) {
    #[allow(clippy::cast_possible_truncation)] // masked to the low byte
    let number = (word & format::COLOR_MASK) as u8;

    let mut color = if number == 0 {
        if word & format::HI_BLACK != 0 {
            Color::BLACK
        } else {
            Color::Default
        }
    } else if number <= 8 {
        Color::Indexed(number - 1)
    } else {
        Color::Indexed(number)
    };
    if word & format::BRIGHT != 0 {
        color = color.bright();
    }

    let mut attrs = Attr::empty();
    if word & format::BOLD != 0 {
        attrs = attrs.union(Attr::BOLD);
    }
    if word & format::UNDERLINE != 0 {
        attrs = attrs.union(Attr::UNDERLINE);
    }
    if word & format::REVERSE != 0 {
        attrs = attrs.union(Attr::REVERSE);
    }
    if word & format::ITALIC != 0 {
        attrs = attrs.union(Attr::ITALIC);
    }
    if word & format::BLINK != 0 {
        attrs = attrs.union(Attr::BLINK);
    }
    if word & format::DIM != 0 {
        attrs = attrs.union(Attr::DIM);
    }

    (color, attrs)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
