// SPDX-License-Identifier: MIT
//
// Cell — one grid position: a codepoint, two colors, a set of attributes.
//
// Every character position on screen is a Cell. The CellBuffer holds two
// grids of them, the renderer diffs those grids, and the SGR encoder turns a
// cell's style into escape codes. Cells are 16 bytes and `Copy`.
//
// Wide characters (CJK, most emoji) occupy two columns. The first cell holds
// the codepoint; the second is a continuation cell (ch = 0) that carries the
// same colors but never produces glyph output of its own.

use std::fmt;

use unicode_width::UnicodeWidthChar;

use crate::color::Color;

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text attributes stored as a compact bitfield.
    ///
    /// Each flag maps to one SGR parameter. The encoder emits them in
    /// ascending SGR order, one `ESC [ n m` per flag:
    ///
    /// ```
    /// use cellterm_core::cell::Attr;
    ///
    /// let style = Attr::BOLD | Attr::UNDERLINE;
    /// assert!(style.contains(Attr::BOLD));
    /// assert!(!style.contains(Attr::REVERSE));
    /// assert_eq!(Attr::REVERSE.sgr_codes().collect::<Vec<_>>(), vec![7]);
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1: increased intensity.
        const BOLD      = 1 << 0;
        /// SGR 2: decreased intensity.
        const DIM       = 1 << 1;
        /// SGR 3: italic.
        const ITALIC    = 1 << 2;
        /// SGR 4: single underline.
        const UNDERLINE = 1 << 3;
        /// SGR 5: blink.
        const BLINK     = 1 << 4;
        /// SGR 7: swap foreground and background.
        const REVERSE   = 1 << 5;
        /// SGR 8: invisible text.
        const INVISIBLE = 1 << 6;
        /// SGR 9: crossed-out text.
        const STRIKEOUT = 1 << 7;
    }
}

/// Flag → SGR parameter, in emission order.
const SGR_TABLE: [(Attr, u8); 8] = [
    (Attr::BOLD, 1),
    (Attr::DIM, 2),
    (Attr::ITALIC, 3),
    (Attr::UNDERLINE, 4),
    (Attr::BLINK, 5),
    (Attr::REVERSE, 7),
    (Attr::INVISIBLE, 8),
    (Attr::STRIKEOUT, 9),
];

impl Attr {
    /// SGR parameters for the active flags, ascending.
    pub fn sgr_codes(self) -> impl Iterator<Item = u8> {
        SGR_TABLE
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, code)| code)
    }
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// A single terminal cell.
///
/// # Layout (16 bytes)
///
/// ```text
/// ┌──────────┬──────────┬──────────┬───────┬─────────┐
/// │ ch: u32  │ fg: Color│ bg: Color│ attrs │ padding │
/// │ 4 bytes  │ 4 bytes  │ 4 bytes  │  u8   │ 3 bytes │
/// └──────────┴──────────┴──────────┴───────┴─────────┘
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Unicode codepoint to display.
    ///
    /// - `0` = continuation cell (second column of a wide character)
    /// - `b' '` (32) = empty / space (the default)
    pub ch: u32,

    /// Foreground (text) color.
    pub fg: Color,

    /// Background color.
    pub bg: Color,

    /// Text attributes.
    pub attrs: Attr,
}

/// Continuation marker for the second column of a wide character.
const CONTINUATION: u32 = 0;

/// Default character for empty cells.
const SPACE: u32 = b' ' as u32;

/// Not a Unicode scalar value, so never equal to anything the API can store.
const STALE: u32 = u32::MAX;

/// The stored codepoint for a written character.
const fn glyph(ch: char) -> u32 {
    if ch as u32 == CONTINUATION { SPACE } else { ch as u32 }
}

impl Cell {
    /// An empty cell: space character, default colors, no attributes.
    pub const EMPTY: Self = Self {
        ch: SPACE,
        fg: Color::Default,
        bg: Color::Default,
        attrs: Attr::empty(),
    };

    /// A cell that compares unequal to every cell an application can write.
    ///
    /// Filling the front grid with it forces the next present to repaint
    /// every position.
    pub(crate) const STALE: Self = Self {
        ch: STALE,
        fg: Color::Default,
        bg: Color::Default,
        attrs: Attr::empty(),
    };

    /// Create a cell with a character and default styling.
    ///
    /// NUL is stored as a space; its codepoint marks continuation cells.
    #[inline]
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self {
            ch: glyph(ch),
            fg: Color::Default,
            bg: Color::Default,
            attrs: Attr::empty(),
        }
    }

    /// Create a cell with full styling.
    #[inline]
    #[must_use]
    pub const fn styled(ch: char, fg: Color, bg: Color, attrs: Attr) -> Self {
        Self {
            ch: glyph(ch),
            fg,
            bg,
            attrs,
        }
    }

    /// Create a continuation cell for the second column of a wide character.
    ///
    /// It inherits the owner's style so the background fills both columns.
    #[inline]
    #[must_use]
    pub const fn continuation(fg: Color, bg: Color, attrs: Attr) -> Self {
        Self {
            ch: CONTINUATION,
            fg,
            bg,
            attrs,
        }
    }

    // ─── Queries ──────────────────────────────────────────────────────────

    /// Whether this is a continuation cell (second column of a wide char).
    #[inline]
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        self.ch == CONTINUATION
    }

    /// Whether this cell is visually empty (space, default colors, no attrs).
    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.ch == SPACE
            && self.fg == Color::Default
            && self.bg == Color::Default
            && self.attrs.is_empty()
    }

    /// The codepoint as a `char`. `None` for continuation cells.
    #[inline]
    #[must_use]
    pub const fn character(self) -> Option<char> {
        if self.ch == CONTINUATION {
            return None;
        }
        char::from_u32(self.ch)
    }

    /// Display width in terminal columns: 2 for wide glyphs, otherwise 1.
    ///
    /// Zero-width and control codepoints still occupy their cell, so they
    /// count as 1. Continuation cells report 1 as well; callers skip them.
    #[must_use]
    pub fn width(self) -> usize {
        self.character()
            .and_then(UnicodeWidthChar::width)
            .map_or(1, |w| w.max(1))
    }

    // ─── Builders ─────────────────────────────────────────────────────────

    /// Set the foreground color.
    #[inline]
    #[must_use]
    pub const fn with_fg(self, fg: Color) -> Self {
        Self { fg, ..self }
    }

    /// Set the background color.
    #[inline]
    #[must_use]
    pub const fn with_bg(self, bg: Color) -> Self {
        Self { bg, ..self }
    }

    /// Set text attributes.
    #[inline]
    #[must_use]
    pub const fn with_attrs(self, attrs: Attr) -> Self {
        Self { attrs, ..self }
    }

    /// Whether two cells share colors and attributes, ignoring the glyph.
    #[inline]
    #[must_use]
    pub fn same_style(self, other: &Self) -> bool {
        self.fg == other.fg && self.bg == other.bg && self.attrs == other.attrs
    }
}

impl Default for Cell {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_continuation() {
            return write!(f, "Cell(continuation)");
        }
        if self.ch == STALE {
            return write!(f, "Cell(stale)");
        }
        let ch = char::from_u32(self.ch).unwrap_or('?');
        write!(f, "Cell({ch:?}")?;
        if self.fg != Color::Default {
            write!(f, ", fg={:?}", self.fg)?;
        }
        if self.bg != Color::Default {
            write!(f, ", bg={:?}", self.bg)?;
        }
        if !self.attrs.is_empty() {
            write!(f, ", {:?}", self.attrs)?;
        }
        write!(f, ")")
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem;

    #[test]
    fn cell_is_16_bytes() {
        assert_eq!(mem::size_of::<Cell>(), 16);
    }

    #[test]
    fn attr_is_1_byte() {
        assert_eq!(mem::size_of::<Attr>(), 1);
    }

    #[test]
    fn default_cell_is_empty() {
        let cell = Cell::default();
        assert!(cell.is_empty());
        assert_eq!(cell.ch, u32::from(b' '));
        assert_eq!(cell, Cell::EMPTY);
    }

    #[test]
    fn styled_cell_is_not_empty() {
        assert!(!Cell::EMPTY.with_bg(Color::RED).is_empty());
        assert!(!Cell::EMPTY.with_fg(Color::Indexed(200)).is_empty());
        assert!(!Cell::EMPTY.with_attrs(Attr::BOLD).is_empty());
    }

    #[test]
    fn styled_cell_has_all_fields() {
        let cell = Cell::styled('Z', Color::YELLOW, Color::BLUE, Attr::BOLD | Attr::REVERSE);
        assert_eq!(cell.character(), Some('Z'));
        assert_eq!(cell.fg, Color::YELLOW);
        assert_eq!(cell.bg, Color::BLUE);
        assert!(cell.attrs.contains(Attr::REVERSE));
    }

    #[test]
    fn nul_is_stored_as_space() {
        assert_eq!(Cell::new('\0'), Cell::EMPTY);
        let cell = Cell::styled('\0', Color::RED, Color::BLUE, Attr::BOLD);
        assert!(!cell.is_continuation());
        assert_eq!(cell.character(), Some(' '));
    }

    #[test]
    fn continuation_cell_has_no_character() {
        let cell = Cell::continuation(Color::RED, Color::Default, Attr::BOLD);
        assert!(cell.is_continuation());
        assert!(cell.character().is_none());
        assert_eq!(cell.fg, Color::RED);
    }

    #[test]
    fn stale_never_equals_written_cells() {
        assert_ne!(Cell::STALE, Cell::EMPTY);
        assert_ne!(Cell::STALE, Cell::continuation(Color::Default, Color::Default, Attr::empty()));
        assert!(Cell::STALE.character().is_none());
    }

    #[test]
    fn width_of_narrow_wide_and_zero_width() {
        assert_eq!(Cell::new('a').width(), 1);
        assert_eq!(Cell::new('あ').width(), 2);
        assert_eq!(Cell::new('🔥').width(), 2);
        assert_eq!(Cell::new('\u{0301}').width(), 1);
    }

    #[test]
    fn sgr_codes_ascend() {
        let all = Attr::all();
        assert_eq!(all.sgr_codes().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 7, 8, 9]);
        let some = Attr::REVERSE | Attr::BOLD | Attr::UNDERLINE;
        assert_eq!(some.sgr_codes().collect::<Vec<_>>(), vec![1, 4, 7]);
        assert_eq!(Attr::empty().sgr_codes().count(), 0);
    }

    #[test]
    fn same_style_ignores_character() {
        let a = Cell::new('A').with_fg(Color::RED);
        let b = Cell::new('B').with_fg(Color::RED);
        assert!(a.same_style(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn debug_formats() {
        assert_eq!(
            format!("{:?}", Cell::continuation(Color::Default, Color::Default, Attr::empty())),
            "Cell(continuation)"
        );
        let dbg = format!("{:?}", Cell::new('A').with_attrs(Attr::BOLD).with_bg(Color::RED));
        assert!(dbg.contains("Cell('A'"));
        assert!(dbg.contains("bg="));
        assert!(dbg.contains("BOLD"));
    }
}
