// SPDX-License-Identifier: MIT
//
// Screen — the application-facing facade.
//
// A `Screen` owns one output sink, one input channel and the double-buffered
// cell grid. Cell operations only touch the back grid. `present()` renders
// the damage into one contiguous byte run and writes it in a single call;
// the front grid is committed only once that write succeeded.
//
// Input is pull-based. `poll_event()` and `peek_event()` drain the channel,
// feed byte chunks through the decoder and queue the resulting events. A
// resize notice is held aside (only the latest one counts) and handed out
// before anything already queued. A lone ESC stays pending inside the
// decoder until input has been quiet for `Config::escape_timeout`.
//
// `Screen::new` works on any `Write` and any `Receiver<Input>`, which is how
// the tests drive it. `Screen::init` builds the real-terminal variant: raw
// mode, alternate screen and a background stdin reader.

use std::collections::VecDeque;
use std::io::{self, Stdout, Write};
use std::mem;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant};

use crate::buffer::CellBuffer;
use crate::cell::Cell;
use crate::color::{decode_word, format::Word};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::input::Decoder;
use crate::reader::{Input, StdinReader};
use crate::render::{RenderStats, Renderer};
use crate::terminal::{self, Size, Terminal};

/// The real-terminal resources behind [`Screen::init`].
struct Session {
    terminal: Terminal,
    reader: StdinReader,
}

/// A terminal screen: cell grid, renderer and input decoder.
///
/// ```
/// use std::sync::mpsc;
/// use cellterm_core::color::format;
/// use cellterm_core::{Config, Screen, Size};
///
/// let (_tx, rx) = mpsc::channel();
/// let mut screen = Screen::new(Vec::new(), rx, Size::new(80, 24), Config::default());
///
/// screen.set_cell(0, 0, '@', format::BOLD, format::RED);
/// screen.present()?;
///
/// let out = String::from_utf8_lossy(screen.writer());
/// assert!(out.contains("\x1b[1;1H@"));
/// # Ok::<(), cellterm_core::Error>(())
/// ```
pub struct Screen<W: Write> {
    out: W,
    input: Receiver<Input>,
    buffer: CellBuffer,
    renderer: Renderer,
    decoder: Decoder,
    cursor: Option<(u16, u16)>,
    events: VecDeque<Event>,
    pending_resize: Option<Size>,
    last_input: Instant,
    input_closed: bool,
    config: Config,
    session: Option<Session>,
}

impl Screen<Stdout> {
    /// Take over the controlling terminal.
    ///
    /// Enters raw mode and the configured modes, then starts a background
    /// reader for stdin and resize signals. The terminal is restored by
    /// [`shutdown`](Screen::shutdown), on drop, and on panic.
    ///
    /// # Errors
    ///
    /// [`Error::NotATerminal`] if stdin is not a tty, [`Error::Init`] if
    /// raw mode or the reader thread can't be set up.
    pub fn init(config: Config) -> Result<Self> {
        if !terminal::is_tty() {
            return Err(Error::NotATerminal);
        }

        let mut terminal = Terminal::new();
        terminal.enter(&config).map_err(Error::Init)?;
        let (reader, rx) = StdinReader::spawn().map_err(Error::Init)?;

        let size = terminal.size();
        tracing::debug!(cols = size.cols, rows = size.rows, "terminal session started");

        let mut screen = Self::new(io::stdout(), rx, size, config);
        screen.session = Some(Session { terminal, reader });
        Ok(screen)
    }
}

impl<W: Write> Screen<W> {
    /// Create a screen over an arbitrary sink and input channel.
    ///
    /// Nothing is written until the first [`present`](Self::present), which
    /// clears the screen and paints every cell.
    pub fn new(out: W, input: Receiver<Input>, size: Size, config: Config) -> Self {
        Self {
            out,
            input,
            buffer: CellBuffer::new(size.cols, size.rows),
            renderer: Renderer::new(),
            decoder: Decoder::new(),
            cursor: None,
            events: VecDeque::new(),
            pending_resize: None,
            last_input: Instant::now(),
            input_closed: false,
            config,
            session: None,
        }
    }

    /// Restore the terminal and stop the reader, if this screen owns them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] if the sink or the terminal restore fails.
    pub fn shutdown(mut self) -> Result<()> {
        self.out.flush().map_err(Error::Write)?;
        if let Some(mut session) = self.session.take() {
            session.reader.stop();
            session.terminal.leave().map_err(Error::Write)?;
            tracing::debug!("terminal session ended");
        }
        Ok(())
    }

    // ── Dimensions ──────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.buffer.width()
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.buffer.height()
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    // ── Cells ───────────────────────────────────────────────────────

    /// Set one cell from attribute words.
    ///
    /// Colors come from each word's low byte; the cell's attributes are the
    /// union of both words' style bits. Out-of-range positions are ignored.
    pub fn set_cell(&mut self, x: u16, y: u16, ch: char, fg: Word, bg: Word) {
        let (fg, fg_attrs) = decode_word(fg);
        let (bg, bg_attrs) = decode_word(bg);
        self.buffer.set(x, y, Cell::styled(ch, fg, bg, fg_attrs | bg_attrs));
    }

    /// Set one cell. Returns whether the position was in range.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        self.buffer.set(x, y, cell)
    }

    /// The pending cell at (x, y).
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.buffer.get(x, y)
    }

    /// Write a string starting at (x, y), clipped at the right edge.
    ///
    /// Returns the number of columns used.
    pub fn print(&mut self, x: u16, y: u16, fg: Word, bg: Word, text: &str) -> u16 {
        let (fg, fg_attrs) = decode_word(fg);
        let (bg, bg_attrs) = decode_word(bg);
        self.buffer.print(x, y, text, fg, bg, fg_attrs | bg_attrs)
    }

    /// Blank every pending cell with the color of `bg`.
    ///
    /// Also forgets the cached style, so the next present re-emits it.
    pub fn clear(&mut self, bg: Word) {
        let (bg, _) = decode_word(bg);
        self.buffer.clear(bg);
        self.renderer.reset();
    }

    /// Force the next present to clear the screen and repaint every cell.
    pub fn invalidate(&mut self) {
        self.buffer.invalidate();
        self.renderer.reset();
    }

    // ── Cursor ──────────────────────────────────────────────────────

    /// Show the cursor at (x, y) on the next present.
    pub const fn set_cursor(&mut self, x: u16, y: u16) {
        self.cursor = Some((x, y));
    }

    /// Hide the cursor on the next present.
    pub const fn hide_cursor(&mut self) {
        self.cursor = None;
    }

    #[must_use]
    pub const fn cursor(&self) -> Option<(u16, u16)> {
        self.cursor
    }

    // ── Output ──────────────────────────────────────────────────────

    /// Bring the terminal in sync with the pending grid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] if the sink fails. Nothing is committed and
    /// the next present repaints from scratch, so the call can be retried.
    pub fn present(&mut self) -> Result<RenderStats> {
        let stats = self.renderer.render(&self.buffer, self.cursor);

        if let Err(err) = self.renderer.flush_to(&mut self.out) {
            tracing::debug!(error = %err, "present failed, next frame repaints everything");
            self.renderer.reset();
            self.buffer.invalidate();
            return Err(Error::Write(err));
        }

        self.buffer.commit();
        tracing::trace!(
            rendered = stats.cells_rendered,
            skipped = stats.cells_skipped,
            bytes = stats.bytes_written,
            "present"
        );
        Ok(stats)
    }

    /// Swap the output sink and return the old one.
    ///
    /// The new sink is assumed to show nothing we know about: the next
    /// present clears it and repaints every cell.
    pub fn set_writer(&mut self, out: W) -> W {
        self.renderer.reset();
        self.buffer.invalidate();
        mem::replace(&mut self.out, out)
    }

    #[must_use]
    pub const fn writer(&self) -> &W {
        &self.out
    }

    pub const fn writer_mut(&mut self) -> &mut W {
        &mut self.out
    }

    // ── Events ──────────────────────────────────────────────────────

    /// Block until the next event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputClosed`] once the input channel is gone and
    /// every buffered byte has been turned into events.
    pub fn poll_event(&mut self) -> Result<Event> {
        loop {
            if let Some(event) = self.next_event(None)? {
                return Ok(event);
            }
        }
    }

    /// Wait up to `timeout` for the next event. `Ok(None)` on timeout.
    ///
    /// Bytes that arrive without completing an event stay buffered for the
    /// next call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputClosed`] once the input channel is gone and
    /// every buffered byte has been turned into events.
    pub fn peek_event(&mut self, timeout: Duration) -> Result<Option<Event>> {
        self.next_event(Some(Instant::now() + timeout))
    }

    fn next_event(&mut self, deadline: Option<Instant>) -> Result<Option<Event>> {
        loop {
            self.drain_input();

            if let Some(size) = self.pending_resize.take() {
                return Ok(Some(self.apply_resize(size)));
            }
            if let Some(event) = self.events.pop_front() {
                return Ok(Some(event));
            }

            if self.decoder.has_pending()
                && (self.input_closed || self.last_input.elapsed() >= self.config.escape_timeout)
            {
                self.events.extend(self.decoder.flush());
                continue;
            }
            if self.input_closed {
                return Err(Error::InputClosed);
            }

            let now = Instant::now();
            if deadline.is_some_and(|d| now >= d) {
                return Ok(None);
            }

            let mut wait = deadline.map(|d| d - now);
            if self.decoder.has_pending() {
                let quiet = self.config.escape_timeout.saturating_sub(self.last_input.elapsed());
                wait = Some(wait.map_or(quiet, |w| w.min(quiet)));
            }

            let received = match wait {
                Some(wait) => match self.input.recv_timeout(wait) {
                    Ok(input) => Some(input),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => {
                        self.input_closed = true;
                        None
                    }
                },
                None => match self.input.recv() {
                    Ok(input) => Some(input),
                    Err(_) => {
                        self.input_closed = true;
                        None
                    }
                },
            };
            if let Some(input) = received {
                self.accept(input);
            }
        }
    }

    /// Take everything already on the channel without blocking.
    fn drain_input(&mut self) {
        loop {
            match self.input.try_recv() {
                Ok(input) => self.accept(input),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.input_closed = true;
                    break;
                }
            }
        }
    }

    fn accept(&mut self, input: Input) {
        match input {
            Input::Bytes(bytes) => {
                self.last_input = Instant::now();
                self.events.extend(self.decoder.advance(&bytes));
            }
            Input::Resize(size) => {
                self.pending_resize = Some(size);
            }
        }
    }

    fn apply_resize(&mut self, size: Size) -> Event {
        tracing::debug!(cols = size.cols, rows = size.rows, "resizing cell grid");
        self.buffer.resize(size.cols, size.rows);
        self.renderer.reset();
        Event::Resize {
            width: size.cols,
            height: size.rows,
        }
    }
}

impl<W: Write> std::fmt::Debug for Screen<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screen")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("cursor", &self.cursor)
            .field("queued", &self.events.len())
            .field("session", &self.session.is_some())
            .finish_non_exhaustive()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Attr;
    use crate::color::{format, Color};
    use crate::event::{Key, KeyEvent, Modifiers, MouseAction, MouseButton, MouseEvent};
    use pretty_assertions::assert_eq;
    use std::sync::mpsc::{self, Sender};

    fn screen(cols: u16, rows: u16) -> (Screen<Vec<u8>>, Sender<Input>) {
        let (tx, rx) = mpsc::channel();
        let config = Config::default().with_escape_timeout(Duration::from_millis(10));
        (Screen::new(Vec::new(), rx, Size::new(cols, rows), config), tx)
    }

    /// Present and return what was written.
    fn present(screen: &mut Screen<Vec<u8>>) -> String {
        screen.present().unwrap();
        String::from_utf8(mem::take(screen.writer_mut())).unwrap()
    }

    fn key(k: Key) -> Event {
        Event::Key(KeyEvent::key(k))
    }

    fn ch(c: char) -> Event {
        Event::Key(KeyEvent::char(c))
    }

    // ── Dimensions ────────────────────────────────────────────────────

    #[test]
    fn new_reports_size() {
        let (s, _tx) = screen(80, 24);
        assert_eq!(s.width(), 80);
        assert_eq!(s.height(), 24);
        assert_eq!(s.cursor(), None);
    }

    // ── Cells ─────────────────────────────────────────────────────────

    #[test]
    fn set_cell_unions_word_attributes() {
        let (mut s, _tx) = screen(4, 1);
        s.set_cell(0, 0, 'a', format::GREEN | format::BOLD, format::BLUE | format::UNDERLINE);
        assert_eq!(
            s.get(0, 0).copied(),
            Some(Cell::styled('a', Color::GREEN, Color::BLUE, Attr::BOLD | Attr::UNDERLINE))
        );
    }

    #[test]
    fn out_of_range_writes_are_ignored() {
        let (mut s, _tx) = screen(4, 2);
        s.set_cell(4, 0, 'x', format::DEFAULT, format::DEFAULT);
        s.set_cell(0, 2, 'x', format::DEFAULT, format::DEFAULT);
        assert!(!s.set(9, 9, Cell::new('x')));
        assert!(s.get(4, 0).is_none());
        assert_eq!(s.print(0, 5, format::DEFAULT, format::DEFAULT, "hi"), 0);
    }

    #[test]
    fn nul_cell_renders_as_space() {
        let (mut s, _tx) = screen(3, 1);
        present(&mut s);

        s.set_cell(1, 0, '\0', format::RED, format::DEFAULT);
        assert_eq!(s.get(1, 0).and_then(|c| c.character()), Some(' '));
        assert_eq!(present(&mut s), "\x1b(B\x1b[m\x1b[31m\x1b[1;2H \x1b[?25l");
    }

    #[test]
    fn print_clips_at_right_edge() {
        let (mut s, _tx) = screen(4, 1);
        let used = s.print(1, 0, format::RED, format::DEFAULT, "hello");
        assert_eq!(used, 3);
        assert_eq!(s.get(3, 0).map(|c| c.ch), Some('l' as u32));
        assert_eq!(s.get(1, 0).map(|c| c.fg), Some(Color::RED));
    }

    // ── Present ───────────────────────────────────────────────────────

    #[test]
    fn bold_red_then_plain_neighbor() {
        let (mut s, _tx) = screen(80, 24);
        s.set_cell(0, 0, '@', format::BOLD, format::RED);
        s.set_cell(1, 0, 'X', format::DEFAULT, format::DEFAULT);

        let out = present(&mut s);
        assert!(out.starts_with("\x1b[2J"));
        assert!(
            out.contains("\x1b(B\x1b[m\x1b[1m\x1b[41m\x1b[1;1H@\x1b(B\x1b[mX"),
            "got {out:?}"
        );
    }

    #[test]
    fn set_then_present_moves_then_writes() {
        let (mut s, _tx) = screen(10, 5);
        present(&mut s);

        s.set_cell(3, 2, 'Z', format::DEFAULT, format::DEFAULT);
        assert_eq!(present(&mut s), "\x1b[3;4HZ\x1b[?25l");
    }

    #[test]
    fn second_present_emits_no_glyphs() {
        let (mut s, _tx) = screen(10, 5);
        s.set_cell(0, 0, 'A', format::RED, format::DEFAULT);
        present(&mut s);
        assert_eq!(present(&mut s), "\x1b[?25l");
    }

    #[test]
    fn same_style_run_emits_sgr_once() {
        let (mut s, _tx) = screen(10, 1);
        present(&mut s);

        s.set_cell(2, 0, 'A', format::YELLOW, format::DEFAULT);
        s.set_cell(3, 0, 'B', format::YELLOW, format::DEFAULT);
        s.set_cell(4, 0, 'C', format::YELLOW, format::DEFAULT);

        let out = present(&mut s);
        assert_eq!(out, "\x1b(B\x1b[m\x1b[33m\x1b[1;3HABC\x1b[?25l");
        assert_eq!(out.matches("\x1b[33m").count(), 1);
    }

    #[test]
    fn utf8_glyph_bytes() {
        let (mut s, _tx) = screen(10, 1);
        present(&mut s);

        s.set_cell(0, 0, 'é', format::DEFAULT, format::WHITE);
        s.set_cell(4, 0, 'あ', format::DEFAULT, format::DEFAULT);
        let out = present(&mut s);
        assert!(out.contains("\x1b[47m"));
        assert!(out.contains("\x1b[1;1H\u{e9}"));
        assert!(out.as_bytes().windows(3).any(|w| w == [0xE3, 0x81, 0x82]));
    }

    #[test]
    fn cursor_show_and_hide() {
        let (mut s, _tx) = screen(80, 24);
        present(&mut s);

        s.set_cursor(5, 5);
        assert_eq!(present(&mut s), "\x1b[?25h\x1b[6;6H");
        assert_eq!(present(&mut s), "\x1b[6;6H");

        s.hide_cursor();
        s.hide_cursor();
        assert!(present(&mut s).contains("\x1b[?25l"));
    }

    #[test]
    fn clear_blanks_previous_content() {
        let (mut s, _tx) = screen(5, 1);
        s.set_cell(0, 0, '@', format::DEFAULT, format::DEFAULT);
        present(&mut s);

        s.clear(format::DEFAULT);
        s.clear(format::DEFAULT);
        let out = present(&mut s);
        assert!(!out.contains('@'));
        assert!(out.contains("\x1b[1;1H "));
    }

    #[test]
    fn invalidate_repaints_everything() {
        let (mut s, _tx) = screen(3, 1);
        s.print(0, 0, format::DEFAULT, format::DEFAULT, "abc");
        present(&mut s);

        s.invalidate();
        let out = present(&mut s);
        assert_eq!(out, "\x1b[2J\x1b(B\x1b[m\x1b[1;1Habc\x1b[?25l");
    }

    #[test]
    fn write_failure_is_retryable() {
        struct Flaky {
            fail: bool,
            data: Vec<u8>,
        }
        impl Write for Flaky {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                if self.fail {
                    return Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
                }
                self.data.extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let (_tx, rx) = mpsc::channel();
        let sink = Flaky { fail: false, data: Vec::new() };
        let mut s = Screen::new(sink, rx, Size::new(4, 1), Config::default());
        s.present().unwrap();

        s.set_cell(0, 0, 'Q', format::RED, format::DEFAULT);
        s.writer_mut().fail = true;
        let err = s.present().unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(s.get(0, 0).map(|c| c.ch), Some('Q' as u32));

        s.writer_mut().fail = false;
        s.writer_mut().data.clear();
        s.present().unwrap();
        let out = String::from_utf8(s.writer().data.clone()).unwrap();
        assert!(out.starts_with("\x1b[2J"));
        assert!(out.contains("\x1b(B\x1b[m\x1b[31m\x1b[1;1HQ"));
    }

    #[test]
    fn set_writer_repaints_on_new_sink() {
        let (mut s, _tx) = screen(2, 1);
        s.print(0, 0, format::DEFAULT, format::DEFAULT, "ok");
        present(&mut s);

        let old = s.set_writer(Vec::new());
        assert!(old.is_empty());
        assert_eq!(present(&mut s), "\x1b[2J\x1b(B\x1b[m\x1b[1;1Hok\x1b[?25l");
    }

    // ── Events ────────────────────────────────────────────────────────

    #[test]
    fn arrow_key_is_one_event() {
        let (mut s, tx) = screen(10, 5);
        tx.send(Input::from(b"\x1b[A".as_slice())).unwrap();
        assert_eq!(s.poll_event().unwrap(), key(Key::ARROW_UP));
        assert_eq!(s.peek_event(Duration::ZERO).unwrap(), None);
    }

    #[test]
    fn sequence_split_across_chunks() {
        let (mut s, tx) = screen(10, 5);
        tx.send(Input::from(b"\x1b[".as_slice())).unwrap();
        tx.send(Input::from(b"1;5C".as_slice())).unwrap();
        assert_eq!(
            s.poll_event().unwrap(),
            Event::Key(KeyEvent::key(Key::ARROW_RIGHT).with_modifiers(Modifiers::CTRL))
        );
    }

    #[test]
    fn lone_escape_after_quiet_period() {
        let (mut s, tx) = screen(10, 5);
        tx.send(Input::from(vec![0x1b])).unwrap();
        assert_eq!(s.peek_event(Duration::from_secs(2)).unwrap(), Some(key(Key::ESC)));
    }

    #[test]
    fn peek_times_out_without_input() {
        let (mut s, _tx) = screen(10, 5);
        let start = Instant::now();
        assert_eq!(s.peek_event(Duration::from_millis(20)).unwrap(), None);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn text_and_mouse_events_in_order() {
        let (mut s, tx) = screen(10, 5);
        tx.send(Input::from("hé\x1b[<0;3;4M".as_bytes())).unwrap();
        assert_eq!(s.poll_event().unwrap(), ch('h'));
        assert_eq!(s.poll_event().unwrap(), ch('é'));
        assert_eq!(
            s.poll_event().unwrap(),
            Event::Mouse(MouseEvent {
                x: 2,
                y: 3,
                button: Some(MouseButton::Left),
                action: MouseAction::Press,
                modifiers: Modifiers::empty(),
            })
        );
    }

    #[test]
    fn resize_comes_first_and_coalesces() {
        let (mut s, tx) = screen(10, 5);
        tx.send(Input::from(b"a".as_slice())).unwrap();
        tx.send(Input::Resize(Size::new(40, 10))).unwrap();
        tx.send(Input::Resize(Size::new(100, 30))).unwrap();

        assert_eq!(
            s.poll_event().unwrap(),
            Event::Resize {
                width: 100,
                height: 30
            }
        );
        assert_eq!((s.width(), s.height()), (100, 30));
        assert_eq!(s.poll_event().unwrap(), ch('a'));
    }

    #[test]
    fn resize_keeps_overlap_and_repaints() {
        let (mut s, tx) = screen(4, 2);
        s.set_cell(1, 1, 'k', format::DEFAULT, format::DEFAULT);
        s.set_cell(3, 0, 'x', format::DEFAULT, format::DEFAULT);
        present(&mut s);

        tx.send(Input::Resize(Size::new(2, 3))).unwrap();
        s.poll_event().unwrap();

        assert_eq!(s.get(1, 1).map(|c| c.ch), Some('k' as u32));
        assert!(s.get(3, 0).is_none());
        assert_eq!(s.get(0, 2).copied(), Some(Cell::EMPTY));
        assert!(present(&mut s).starts_with("\x1b[2J"));
    }

    #[test]
    fn cell_next_to_edge_wide_glyph_survives_widening() {
        let (mut s, tx) = screen(3, 1);
        s.set_cell(2, 0, 'あ', format::DEFAULT, format::DEFAULT);
        present(&mut s);

        tx.send(Input::Resize(Size::new(5, 1))).unwrap();
        s.poll_event().unwrap();
        present(&mut s);

        s.set_cell(3, 0, 'b', format::DEFAULT, format::DEFAULT);
        assert_eq!(present(&mut s), "\x1b[1;4Hb\x1b[?25l");
    }

    #[test]
    fn closed_input_flushes_then_errors() {
        let (mut s, tx) = screen(10, 5);
        tx.send(Input::from(vec![0x1b])).unwrap();
        drop(tx);

        assert_eq!(s.poll_event().unwrap(), key(Key::ESC));
        assert!(matches!(s.poll_event(), Err(Error::InputClosed)));
        assert!(matches!(s.peek_event(Duration::ZERO), Err(Error::InputClosed)));
    }

    #[test]
    fn malformed_utf8_is_replacement_char() {
        let (mut s, tx) = screen(10, 5);
        tx.send(Input::from(vec![0xC3, b'a'])).unwrap();
        assert_eq!(s.poll_event().unwrap(), ch('\u{FFFD}'));
        assert_eq!(s.poll_event().unwrap(), ch('a'));
    }

    #[test]
    fn shutdown_without_session() {
        let (s, _tx) = screen(2, 2);
        s.shutdown().unwrap();
    }

    #[test]
    fn debug_summary() {
        let (s, _tx) = screen(3, 2);
        let dbg = format!("{s:?}");
        assert!(dbg.contains("width: 3"));
        assert!(dbg.contains("session: false"));
    }
}
