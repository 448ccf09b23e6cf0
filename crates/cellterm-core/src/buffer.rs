// SPDX-License-Identifier: MIT
//
// Grid and CellBuffer — the double-buffered cell storage.
//
// A Grid is one snapshot of the screen: a flat `Vec<Cell>` in row-major
// order, so a row is contiguous and the renderer's left-to-right scan is a
// linear walk.
//
// CellBuffer pairs two grids of identical size:
//
//   - `back`   what the application wants on screen (all edits land here)
//   - `front`  what the terminal is known to show
//
// `present()` diffs back against front and, once the bytes are out, calls
// `commit()` so front catches up. Resize and invalidate mark front stale:
// it is filled with a sentinel cell that equals nothing the application can
// write, so every position is damaged on the next present.
//
// Wide characters occupy two columns. The owner cell holds the codepoint,
// the cell after it is a continuation (ch = 0). Writing over either half
// breaks the pair so no orphaned half survives in the grid.

use unicode_width::UnicodeWidthChar;

use crate::cell::{Attr, Cell};
use crate::color::Color;

// ─── Grid ───────────────────────────────────────────────────────────────────────

/// A 2D grid of terminal cells.
///
/// Flat `Vec<Cell>` with row-major indexing: `index = y * width + x`.
///
/// # Examples
///
/// ```
/// use cellterm_core::buffer::Grid;
/// use cellterm_core::cell::Cell;
///
/// let mut grid = Grid::new(80, 24);
/// assert_eq!(grid.width(), 80);
/// assert_eq!(grid.height(), 24);
///
/// grid.put(5, 3, Cell::new('X'));
/// assert_eq!(grid.get(5, 3).unwrap().character(), Some('X'));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid filled with empty cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self::filled(width, height, Cell::EMPTY)
    }

    /// Create a grid with every position set to `cell`.
    #[must_use]
    pub fn filled(width: u16, height: u16, cell: Cell) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            cells: vec![cell; size],
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    /// Grid width in columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Grid height in rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Total number of cells (`width × height`).
    #[inline]
    #[must_use]
    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    /// Whether `(x, y)` is within the grid.
    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get a cell, or `None` if out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// The raw cell slice.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// A single row as a slice. `None` if `y` is out of bounds.
    #[inline]
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y < self.height {
            let start = self.index(0, y);
            Some(&self.cells[start..start + usize::from(self.width)])
        } else {
            None
        }
    }

    /// Iterate cells with their `(x, y)` coordinates.
    #[allow(clippy::cast_possible_truncation)]
    pub fn iter(&self) -> impl Iterator<Item = (u16, u16, &Cell)> {
        let w = usize::from(self.width).max(1);
        self.cells.iter().enumerate().map(move |(i, cell)| {
            // x < width and y < height, both u16.
            let x = (i % w) as u16;
            let y = (i / w) as u16;
            (x, y, cell)
        })
    }

    // ─── Bulk Operations ─────────────────────────────────────────────────

    /// Set every cell to `cell`.
    pub fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    /// Reallocate to `width × height`, keeping the overlapping rectangle.
    ///
    /// Positions outside the old grid become `blank`. A wide glyph whose
    /// continuation fell off the right edge keeps its codepoint; the
    /// renderer emits a space for it.
    pub fn resize(&mut self, width: u16, height: u16, blank: Cell) {
        let mut next = Self::filled(width, height, blank);
        let keep_w = usize::from(self.width.min(width));
        for y in 0..self.height.min(height) {
            let src = self.index(0, y);
            let dst = next.index(0, y);
            next.cells[dst..dst + keep_w].copy_from_slice(&self.cells[src..src + keep_w]);
        }
        *self = next;
    }

    /// Bounds-checked raw write. No wide-character bookkeeping.
    ///
    /// Returns `true` if the position was in bounds.
    #[inline]
    pub fn put(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    // ─── Wide Character Cleanup ──────────────────────────────────────────

    /// Break any wide character that touches position `(x, y)`.
    ///
    /// - If `(x, y)` is a continuation, the owner at `x-1` becomes a space.
    /// - If the cell after `(x, y)` is a continuation, it belonged to a wide
    ///   char starting here and is cleared.
    fn break_wide_char_at(&mut self, x: u16, y: u16) {
        let idx = self.index(x, y);

        if self.cells[idx].is_continuation() && x > 0 {
            let prev = self.index(x - 1, y);
            self.cells[prev].ch = u32::from(b' ');
        }

        if x + 1 < self.width {
            let next = self.index(x + 1, y);
            if self.cells[next].is_continuation() {
                self.cells[next] = Cell::EMPTY;
            }
        }
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Grid({}x{})", self.width, self.height)
    }
}

// ─── CellBuffer ─────────────────────────────────────────────────────────────────

/// Front/back grid pair with damage tracking.
///
/// Both grids always have the same dimensions. All writes go to `back`;
/// `front` changes only through [`commit`](Self::commit), [`resize`](Self::resize)
/// and [`invalidate`](Self::invalidate).
#[derive(Debug, Clone)]
pub struct CellBuffer {
    back: Grid,
    front: Grid,
    stale: bool,
}

impl CellBuffer {
    /// Create a buffer pair of the given size.
    ///
    /// The front starts stale: nothing is known about the terminal yet, so
    /// the first present clears the screen and paints every cell.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            back: Grid::new(width, height),
            front: Grid::filled(width, height, Cell::STALE),
            stale: true,
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.back.width()
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.back.height()
    }

    /// Pending content.
    #[inline]
    #[must_use]
    pub const fn back(&self) -> &Grid {
        &self.back
    }

    /// What the terminal is known to show.
    #[inline]
    #[must_use]
    pub const fn front(&self) -> &Grid {
        &self.front
    }

    /// Whether front holds no trustworthy content (after new/resize/invalidate).
    #[inline]
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    /// Read a pending cell.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.back.get(x, y)
    }

    /// Write a cell into the back grid.
    ///
    /// Out-of-range positions are ignored and return `false`. A glyph of
    /// display width 2 also claims `x + 1` with a continuation cell when
    /// that column exists; when it doesn't, the glyph is still stored.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.back.in_bounds(x, y) {
            return false;
        }

        let wide = !cell.is_continuation() && cell.width() == 2;
        let cont_x = x + 1;
        let has_room = cont_x < self.back.width();

        self.back.break_wide_char_at(x, y);
        if wide && has_room {
            self.back.break_wide_char_at(cont_x, y);
        }

        self.back.put(x, y, cell);
        if wide && has_room {
            self.back
                .put(cont_x, y, Cell::continuation(cell.fg, cell.bg, cell.attrs));
        }
        true
    }

    /// Place a string left to right starting at `(x, y)`.
    ///
    /// Zero-width and control characters are skipped. A wide character
    /// that would straddle the right edge is replaced by a space and ends
    /// the run. Returns the number of columns consumed.
    pub fn print(&mut self, x: u16, y: u16, text: &str, fg: Color, bg: Color, attrs: Attr) -> u16 {
        if y >= self.height() {
            return 0;
        }

        let mut col = x;
        for ch in text.chars() {
            if col >= self.width() {
                break;
            }

            let char_w = ch.width().unwrap_or(0);
            if char_w == 0 {
                continue;
            }

            if char_w == 2 && col + 1 >= self.width() {
                self.set(col, y, Cell::styled(' ', fg, bg, attrs));
                col += 1;
                break;
            }

            self.set(col, y, Cell::styled(ch, fg, bg, attrs));

            // char_w is 1 or 2.
            #[allow(clippy::cast_possible_truncation)]
            let w = char_w as u16;
            col = col.saturating_add(w);
        }

        col.saturating_sub(x)
    }

    /// Reset every back cell to a space on `bg`.
    pub fn clear(&mut self, bg: Color) {
        self.back.fill(Cell::EMPTY.with_bg(bg));
    }

    /// Change dimensions. Back keeps the overlapping rectangle; front
    /// becomes stale.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.back.resize(width, height, Cell::EMPTY);
        self.front = Grid::filled(width, height, Cell::STALE);
        self.stale = true;
    }

    /// Forget what the terminal shows. The next present repaints everything.
    pub fn invalidate(&mut self) {
        self.front.fill(Cell::STALE);
        self.stale = true;
    }

    /// Record that the terminal now shows the back grid.
    pub fn commit(&mut self) {
        self.front.cells.copy_from_slice(&self.back.cells);
        self.stale = false;
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn chars_of_row(grid: &Grid, y: u16) -> String {
        grid.row(y)
            .unwrap()
            .iter()
            .map(|c| {
                if c.is_continuation() {
                    '_'
                } else {
                    c.character().unwrap_or('?')
                }
            })
            .collect()
    }

    // ── Grid ────────────────────────────────────────────────────────────

    #[test]
    fn new_creates_correct_size() {
        let grid = Grid::new(80, 24);
        assert_eq!(grid.width(), 80);
        assert_eq!(grid.height(), 24);
        assert_eq!(grid.total_cells(), 80 * 24);
        assert!(grid.iter().all(|(_, _, c)| c.is_empty()));
    }

    #[test]
    fn zero_size_grid() {
        let grid = Grid::new(0, 0);
        assert_eq!(grid.total_cells(), 0);
        assert!(grid.get(0, 0).is_none());
        assert!(grid.row(0).is_none());
    }

    #[test]
    fn get_out_of_bounds() {
        let grid = Grid::new(10, 5);
        assert!(grid.get(9, 4).is_some());
        assert!(grid.get(10, 0).is_none());
        assert!(grid.get(0, 5).is_none());
    }

    #[test]
    fn put_out_of_bounds_fails() {
        let mut grid = Grid::new(10, 5);
        assert!(grid.put(5, 3, Cell::new('X')));
        assert!(!grid.put(10, 0, Cell::new('X')));
        assert!(!grid.put(0, 5, Cell::new('X')));
    }

    #[test]
    fn iter_yields_row_major_coordinates() {
        let grid = Grid::new(3, 2);
        let coords: Vec<(u16, u16)> = grid.iter().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(coords, vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
    }

    #[test]
    fn grid_resize_keeps_overlap() {
        let mut grid = Grid::new(4, 3);
        grid.put(0, 0, Cell::new('a'));
        grid.put(3, 0, Cell::new('b'));
        grid.put(1, 2, Cell::new('c'));

        grid.resize(2, 4, Cell::EMPTY);
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.get(0, 0).unwrap().character(), Some('a'));
        assert_eq!(grid.get(1, 2).unwrap().character(), Some('c'));
        assert!(grid.get(0, 3).unwrap().is_empty());
    }

    // ── CellBuffer — set / get ──────────────────────────────────────────

    #[test]
    fn new_buffer_is_stale_and_blank() {
        let buf = CellBuffer::new(10, 5);
        assert!(buf.is_stale());
        assert!(buf.get(0, 0).unwrap().is_empty());
        assert_ne!(buf.front().get(0, 0), buf.back().get(0, 0));
    }

    #[test]
    fn set_writes_back_only() {
        let mut buf = CellBuffer::new(10, 5);
        assert!(buf.set(2, 1, Cell::new('A')));
        assert_eq!(buf.get(2, 1).unwrap().character(), Some('A'));
        assert_eq!(*buf.front().get(2, 1).unwrap(), Cell::STALE);
    }

    #[test]
    fn set_out_of_range_is_ignored() {
        let mut buf = CellBuffer::new(10, 5);
        assert!(!buf.set(10, 0, Cell::new('A')));
        assert!(!buf.set(0, 5, Cell::new('A')));
        assert!(!buf.set(u16::MAX, u16::MAX, Cell::new('A')));
        assert!(buf.back().iter().all(|(_, _, c)| c.is_empty()));
    }

    #[test]
    fn wide_glyph_claims_two_columns() {
        let mut buf = CellBuffer::new(6, 1);
        buf.set(1, 0, Cell::new('あ').with_bg(Color::RED));
        assert_eq!(chars_of_row(buf.back(), 0), " あ_   ");
        let cont = buf.get(2, 0).unwrap();
        assert!(cont.is_continuation());
        assert_eq!(cont.bg, Color::RED);
    }

    #[test]
    fn wide_glyph_at_last_column_is_stored_alone() {
        let mut buf = CellBuffer::new(4, 1);
        buf.set(3, 0, Cell::new('あ'));
        assert_eq!(buf.get(3, 0).unwrap().character(), Some('あ'));
        assert_eq!(chars_of_row(buf.back(), 0), "   あ");
    }

    #[test]
    fn writing_over_continuation_breaks_owner() {
        let mut buf = CellBuffer::new(6, 1);
        buf.set(1, 0, Cell::new('中'));
        buf.set(2, 0, Cell::new('x'));
        assert_eq!(chars_of_row(buf.back(), 0), "  x   ");
    }

    #[test]
    fn writing_over_owner_clears_continuation() {
        let mut buf = CellBuffer::new(6, 1);
        buf.set(1, 0, Cell::new('中'));
        buf.set(1, 0, Cell::new('y'));
        assert_eq!(chars_of_row(buf.back(), 0), " y    ");
        assert!(buf.get(2, 0).unwrap().is_empty());
    }

    #[test]
    fn wide_over_wide_shifted_by_one() {
        let mut buf = CellBuffer::new(6, 1);
        buf.set(1, 0, Cell::new('中'));
        buf.set(2, 0, Cell::new('文'));
        // The first glyph lost its second half, so it is gone.
        assert_eq!(chars_of_row(buf.back(), 0), "  文_  ");
    }

    // ── CellBuffer — print ──────────────────────────────────────────────

    #[test]
    fn print_ascii() {
        let mut buf = CellBuffer::new(10, 2);
        let cols = buf.print(2, 1, "Hi!", Color::GREEN, Color::Default, Attr::BOLD);
        assert_eq!(cols, 3);
        assert_eq!(chars_of_row(buf.back(), 1), "  Hi!     ");
        let cell = buf.get(3, 1).unwrap();
        assert_eq!(cell.fg, Color::GREEN);
        assert!(cell.attrs.contains(Attr::BOLD));
    }

    #[test]
    fn print_truncates_at_edge() {
        let mut buf = CellBuffer::new(5, 1);
        let cols = buf.print(3, 0, "abcdef", Color::Default, Color::Default, Attr::empty());
        assert_eq!(cols, 2);
        assert_eq!(chars_of_row(buf.back(), 0), "   ab");
    }

    #[test]
    fn print_wide_and_zero_width() {
        let mut buf = CellBuffer::new(8, 1);
        let cols = buf.print(0, 0, "a中\u{0301}b", Color::Default, Color::Default, Attr::empty());
        assert_eq!(cols, 4);
        assert_eq!(chars_of_row(buf.back(), 0), "a中_b    ");
    }

    #[test]
    fn print_wide_at_edge_becomes_space() {
        let mut buf = CellBuffer::new(4, 1);
        buf.set(3, 0, Cell::new('z'));
        let cols = buf.print(2, 0, "a中", Color::Default, Color::BLUE, Attr::empty());
        assert_eq!(cols, 2);
        assert_eq!(chars_of_row(buf.back(), 0), "  a ");
        assert_eq!(buf.get(3, 0).unwrap().bg, Color::BLUE);
    }

    #[test]
    fn print_off_screen_row_is_noop() {
        let mut buf = CellBuffer::new(4, 1);
        assert_eq!(buf.print(0, 1, "abc", Color::Default, Color::Default, Attr::empty()), 0);
    }

    // ── CellBuffer — clear / resize / commit ────────────────────────────

    #[test]
    fn clear_fills_with_background() {
        let mut buf = CellBuffer::new(3, 2);
        buf.set(1, 1, Cell::new('Q').with_attrs(Attr::BOLD));
        buf.clear(Color::BLUE);
        for (_, _, cell) in buf.back().iter() {
            assert_eq!(*cell, Cell::EMPTY.with_bg(Color::BLUE));
        }
    }

    #[test]
    fn resize_keeps_overlap_and_blanks_the_rest() {
        let mut buf = CellBuffer::new(4, 4);
        buf.set(1, 1, Cell::new('k'));
        buf.set(3, 3, Cell::new('g'));
        buf.commit();

        buf.resize(3, 5);
        assert_eq!(buf.width(), 3);
        assert_eq!(buf.height(), 5);
        assert_eq!(buf.front().width(), 3);
        assert_eq!(buf.front().height(), 5);
        assert_eq!(buf.get(1, 1).unwrap().character(), Some('k'));
        assert!(buf.get(2, 3).unwrap().is_empty());
        assert!(buf.get(0, 4).unwrap().is_empty());
        assert!(buf.is_stale());
        assert!(buf.front().iter().all(|(_, _, c)| *c == Cell::STALE));
    }

    #[test]
    fn commit_syncs_front() {
        let mut buf = CellBuffer::new(3, 1);
        buf.set(0, 0, Cell::new('A'));
        buf.commit();
        assert!(!buf.is_stale());
        assert_eq!(buf.front(), buf.back());
    }

    #[test]
    fn invalidate_keeps_back() {
        let mut buf = CellBuffer::new(3, 1);
        buf.set(0, 0, Cell::new('A'));
        buf.commit();
        buf.invalidate();
        assert!(buf.is_stale());
        assert_eq!(buf.get(0, 0).unwrap().character(), Some('A'));
        assert_eq!(*buf.front().get(0, 0).unwrap(), Cell::STALE);
    }
}
