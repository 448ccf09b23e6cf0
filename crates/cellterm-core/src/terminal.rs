// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode, alternate screen, resize signal, RAII cleanup.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, sigaction and raw fd writes.
// These are the POSIX interfaces for terminal control; each unsafe block is
// minimal.
#![allow(unsafe_code)]
//
// This module owns the terminal's raw state for a real session. It enters
// raw mode via termios, optionally switches to the alternate screen and
// enables mouse reporting, and guarantees cleanup on drop, even if the
// application panics mid-frame.
//
// The panic hook bypasses Rust's stdout lock and writes a pre-built restore
// sequence directly to fd 1, so a panic raised while the lock is held can't
// deadlock the restore. Then the original hook prints to a working terminal.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, Once};

use crate::ansi;
use crate::config::Config;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns.
    pub cols: u16,
    /// Number of rows.
    pub rows: u16,
}

impl Size {
    /// Fallback when the size can't be queried.
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };

    #[inline]
    #[must_use]
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    /// Total number of cells (`cols × rows`).
    #[inline]
    #[must_use]
    pub const fn area(self) -> u32 {
        self.cols as u32 * self.rows as u32
    }
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal or the query fails.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size::new(ws.ws_col, ws.ws_row))
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Check whether stdin is connected to a terminal.
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── SIGWINCH ───────────────────────────────────────────────────────────────

/// Set by the SIGWINCH handler, cleared by [`take_resize`].
static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

static SIGWINCH_INSTALLED: Once = Once::new();

/// Install a SIGWINCH handler that raises a process-wide flag.
///
/// Storing to an atomic is async-signal-safe. Installed at most once.
#[cfg(unix)]
pub fn install_sigwinch_handler() {
    SIGWINCH_INSTALLED.call_once(|| unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    });
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
pub fn install_sigwinch_handler() {
    SIGWINCH_INSTALLED.call_once(|| {});
}

/// Whether a resize signal arrived since the last call. Clears the flag.
pub fn take_resize() -> bool {
    SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed)
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of the original termios for the panic hook, which can't
/// reach the [`Terminal`] that owns the real copy.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, original);
            }
        }
    }
}

/// Complete restore sequence for emergency use: disable mouse reporting
/// (SGR format, then clicks), reset charset and attributes, show cursor,
/// exit the alternate screen.
///
/// Alternate screen exit is last so the restored shell content appears
/// with no leftovers.
#[rustfmt::skip]
const EMERGENCY_RESTORE: &[u8] = b"\
    \x1b[?1006l\x1b[?1000l\
    \x1b(B\x1b[m\
    \x1b[?25h\
    \x1b[?1049l";

static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write the restore sequence straight to stdout's file descriptor.
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Real-terminal session handle with RAII cleanup.
///
/// [`enter`](Self::enter) switches the terminal into full-screen mode; the
/// terminal is restored when the handle is dropped, even on panic.
///
/// ```no_run
/// use cellterm_core::config::Config;
/// use cellterm_core::terminal::Terminal;
///
/// let mut term = Terminal::new();
/// term.enter(&Config::default())?;
/// // ... present frames, poll events ...
/// // Restored automatically on drop.
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Terminal {
    #[cfg(unix)]
    original_termios: Option<libc::termios>,
    size: Size,
    active: bool,
    mouse: bool,
    alt_screen: bool,
}

impl Terminal {
    /// Create a handle and query the current size (80×24 when unknown).
    ///
    /// Does not touch the terminal; call [`enter`](Self::enter) for that.
    #[must_use]
    pub fn new() -> Self {
        Self {
            #[cfg(unix)]
            original_termios: None,
            size: get_size().unwrap_or(Size::FALLBACK),
            active: false,
            mouse: false,
            alt_screen: false,
        }
    }

    /// Cached terminal size.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Re-query the size from the OS and cache it.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(s) = get_size() {
            self.size = s;
        }
        self.size
    }

    /// Whether full-screen mode is active.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Enter full-screen mode.
    ///
    /// Enables raw mode, then writes: alternate screen (if configured),
    /// hide cursor, clear screen, mouse reporting (if configured).
    /// Idempotent. On failure the terminal is restored before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode or terminal output fails.
    pub fn enter(&mut self, config: &Config) -> io::Result<()> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.enter_with(config, &mut lock)
    }

    /// Leave full-screen mode and restore the terminal. Idempotent.
    ///
    /// Raw mode is turned off even when writing the restore sequence fails.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal output or the termios restore fails.
    pub fn leave(&mut self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.leave_with(&mut lock)
    }

    fn enter_with(&mut self, config: &Config, out: &mut impl Write) -> io::Result<()> {
        if self.active {
            return Ok(());
        }

        install_panic_hook();
        self.enable_raw_mode()?;

        // Active from here on, so every exit path restores.
        self.mouse = config.mouse;
        self.alt_screen = config.alt_screen;
        self.active = true;

        if let Err(err) = write_enter_sequence(out, config) {
            tracing::debug!(error = %err, "entering full-screen mode failed, restoring");
            let _ = self.leave_with(out);
            return Err(err);
        }
        Ok(())
    }

    fn leave_with(&mut self, out: &mut impl Write) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }

        let written = write_leave_sequence(out, self.mouse, self.alt_screen);
        let restored = self.disable_raw_mode();
        self.active = false;
        written.and(restored)
    }

    // ── Raw Mode (termios) ──────────────────────────────────────────

    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        use std::os::unix::io::AsRawFd;

        if !is_tty() {
            return Ok(());
        }

        let fd = io::stdin().as_raw_fd();

        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }

            self.original_termios = Some(termios);
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some(termios);
            }

            // cfmakeraw equivalent.
            termios.c_iflag &= !(libc::IGNBRK
                | libc::BRKINT
                | libc::PARMRK
                | libc::ISTRIP
                | libc::INLCR
                | libc::IGNCR
                | libc::ICRNL
                | libc::IXON);
            termios.c_oflag &= !libc::OPOST;
            termios.c_lflag &=
                !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
            termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
            termios.c_cflag |= libc::CS8;

            // read() blocks until at least one byte.
            termios.c_cc[libc::VMIN] = 1;
            termios.c_cc[libc::VTIME] = 0;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) != 0 {
                return Err(io::Error::last_os_error());
            }
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        if let Some(ref original) = self.original_termios {
            use std::os::unix::io::AsRawFd;
            let fd = io::stdin().as_raw_fd();

            unsafe {
                if libc::tcsetattr(fd, libc::TCSAFLUSH, original) != 0 {
                    return Err(io::Error::last_os_error());
                }
            }

            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }
            self.original_termios = None;
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn write_enter_sequence(out: &mut impl Write, config: &Config) -> io::Result<()> {
    if config.alt_screen {
        ansi::enter_alt_screen(out)?;
    }
    ansi::cursor_hide(out)?;
    ansi::clear_screen(out)?;
    if config.mouse {
        ansi::enable_mouse(out)?;
    }
    out.flush()
}

fn write_leave_sequence(out: &mut impl Write, mouse: bool, alt_screen: bool) -> io::Result<()> {
    if mouse {
        ansi::disable_mouse(out)?;
    }
    ansi::reset(out)?;
    ansi::cursor_show(out)?;
    if alt_screen {
        ansi::exit_alt_screen(out)?;
    } else {
        ansi::clear_screen(out)?;
        ansi::cursor_to(out, 0, 0)?;
    }
    out.flush()
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.active {
            let _ = self.leave();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
