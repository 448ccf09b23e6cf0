// SPDX-License-Identifier: MIT
//
// Renderer — diffs the back grid against the front grid and encodes the
// changes as terminal output.
//
// The pipeline per present:
//
//   1. The application edits the back grid through Screen.
//   2. Renderer::render() walks back row by row, comparing against front.
//   3. Each damaged cell goes out as: style codes (only when the style
//      differs from the last one emitted), a cursor move (only when the
//      terminal cursor is not already there), then the UTF-8 glyph.
//   4. The cursor is placed (or hidden) after the pass.
//   5. Everything lands in an OutputBuffer; Screen writes it with a single
//      write and commits back into front only if that write succeeded.
//
// Optimizations:
//
//   - Row-level skip: unchanged rows are detected with one slice comparison.
//   - Run-length cursor: after a glyph the terminal cursor sits right after
//     it, so a run of adjacent damaged cells needs one cursor move.
//   - Style cache: SgrEncoder persists across presents, so a steady style
//     costs nothing after the first cell.

use std::io::{self, Write};

use crate::ansi;
use crate::buffer::CellBuffer;
use crate::output::OutputBuffer;
use crate::sgr::SgrEncoder;

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// Statistics from a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Cells that differed from the front grid and were emitted.
    pub cells_rendered: usize,
    /// Columns that matched the front grid and were skipped.
    pub cells_skipped: usize,
    /// Total bytes of output generated.
    pub bytes_written: usize,
}

impl RenderStats {
    /// Total positions processed (rendered + skipped).
    #[inline]
    #[must_use]
    pub const fn total_cells(&self) -> usize {
        self.cells_rendered + self.cells_skipped
    }
}

// ─── Renderer ────────────────────────────────────────────────────────────────

/// Differential renderer with a persistent style cache.
///
/// # Usage
///
/// ```
/// use cellterm_core::buffer::CellBuffer;
/// use cellterm_core::cell::Cell;
/// use cellterm_core::render::Renderer;
///
/// let mut buffer = CellBuffer::new(4, 1);
/// let mut renderer = Renderer::new();
///
/// buffer.set(0, 0, Cell::new('A'));
/// let stats = renderer.render(&buffer, None);
/// assert_eq!(stats.cells_rendered, 4);
///
/// let mut terminal = Vec::new();
/// renderer.flush_to(&mut terminal).unwrap();
/// buffer.commit();
/// assert!(terminal.ends_with(b"\x1b[?25l"));
/// ```
pub struct Renderer {
    output: OutputBuffer,
    encoder: SgrEncoder,
    cursor_shown: bool,
}

impl Renderer {
    /// Create a renderer that assumes a hidden cursor and no active style.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: OutputBuffer::new(),
            encoder: SgrEncoder::new(),
            cursor_shown: false,
        }
    }

    /// Diff `buffer.back()` against `buffer.front()` and generate output.
    ///
    /// `cursor` is the requested cursor position, `None` to hide it. The
    /// buffer is not modified: the caller commits after a successful
    /// write.
    pub fn render(&mut self, buffer: &CellBuffer, cursor: Option<(u16, u16)>) -> RenderStats {
        self.output.clear();

        let back = buffer.back();
        let front = buffer.front();
        let width = back.width();
        let height = back.height();
        let stale = buffer.is_stale();
        let mut stats = RenderStats::default();

        if stale {
            ansi::clear_screen(&mut self.output).ok();
        }

        // Where the terminal cursor sits after the last glyph we emitted.
        let mut next_pos: Option<(u16, u16)> = None;

        for y in 0..height {
            let (Some(back_row), Some(front_row)) = (back.row(y), front.row(y)) else {
                continue;
            };
            if !stale && back_row == front_row {
                stats.cells_skipped += usize::from(width);
                continue;
            }

            let mut x = 0u16;
            while x < width {
                let col = usize::from(x);
                let cell = back_row[col];
                let fits = x + 1 < width;
                let wide = !cell.is_continuation() && cell.width() == 2;
                // A wide glyph owns x + 1 only if that cell is its continuation.
                let paired = wide && fits && back_row[col + 1].is_continuation();

                let damaged = cell != front_row[col]
                    || (paired && back_row[col + 1] != front_row[col + 1]);

                if !damaged {
                    let span = if paired { 2 } else { 1 };
                    stats.cells_skipped += usize::from(span);
                    x += span;
                    continue;
                }

                self.encoder.encode_cell(&mut self.output, &cell).ok();
                if next_pos != Some((x, y)) {
                    ansi::cursor_to(&mut self.output, x, y).ok();
                }

                let advance = if cell.is_continuation() || (wide && !paired) {
                    self.output.push(b' ');
                    1
                } else {
                    self.output.write_codepoint(cell.ch);
                    if paired { 2 } else { 1 }
                };

                stats.cells_rendered += 1;
                x += advance;
                next_pos = Some((x, y));
            }
        }

        self.place_cursor(cursor, width, height);

        stats.bytes_written = self.output.len();
        stats
    }

    /// Emit the cursor state: position when visible, hide otherwise.
    fn place_cursor(&mut self, cursor: Option<(u16, u16)>, width: u16, height: u16) {
        match cursor {
            Some((x, y)) => {
                if !self.cursor_shown {
                    ansi::cursor_show(&mut self.output).ok();
                    self.cursor_shown = true;
                }
                let x = x.min(width.saturating_sub(1));
                let y = y.min(height.saturating_sub(1));
                ansi::cursor_to(&mut self.output, x, y).ok();
            }
            None => {
                ansi::cursor_hide(&mut self.output).ok();
                self.cursor_shown = false;
            }
        }
    }

    /// The bytes from the last render.
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        self.output.as_bytes()
    }

    /// Write the last render to `w` in one write and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        self.output.flush_to(w)
    }

    /// Forget the cached style and cursor visibility.
    ///
    /// The next render re-emits a full style before its first glyph and
    /// re-shows the cursor if one is requested.
    pub const fn reset(&mut self) {
        self.encoder.reset();
        self.cursor_shown = false;
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
