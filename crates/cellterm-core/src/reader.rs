// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Background stdin reader — collects raw bytes and resize notices.
//
// A dedicated thread reads stdin and forwards what it sees through a
// standard channel as `Input` values. The screen drains that channel,
// feeding byte chunks into the decoder and applying resizes.
//
// `read()` on stdin blocks, but a screen must still be able to time out a
// lone ESC and return from `peek_event`. With a reader thread, the consumer
// waits with `recv_timeout()` instead.
//
// The thread polls stdin with a short timeout and checks two things between
// polls: the stop flag, and whether SIGWINCH fired. A SIGWINCH interrupts
// `poll()` with EINTR, so a resize is forwarded almost immediately.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::terminal::{self, Size};

/// Byte chunk read from stdin.
///
/// A keypress is 1-6 bytes, a paste can be kilobytes.
const READ_BUF_SIZE: usize = 4096;

/// How often the reader thread checks its flags (milliseconds).
const POLL_TIMEOUT_MS: i32 = 50;

/// One item on the input channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Raw bytes exactly as the terminal sent them. Never empty.
    Bytes(Vec<u8>),
    /// The terminal now has this size.
    Resize(Size),
}

impl From<Vec<u8>> for Input {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for Input {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

/// Background stdin reader thread.
///
/// The thread runs until [`stop`](Self::stop) is called (or the
/// `StdinReader` is dropped), stdin reaches EOF, or the receiver is gone.
///
/// ```no_run
/// use cellterm_core::reader::{Input, StdinReader};
///
/// let (reader, rx) = StdinReader::spawn()?;
/// while let Ok(input) = rx.recv() {
///     if let Input::Bytes(bytes) = input {
///         println!("got {} bytes", bytes.len());
///     }
/// }
/// drop(reader);
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct StdinReader {
    /// `None` after `stop()` joins it.
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl StdinReader {
    /// Install the SIGWINCH handler and spawn the reader thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to spawn the thread.
    pub fn spawn() -> io::Result<(Self, Receiver<Input>)> {
        terminal::install_sigwinch_handler();

        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("stdin-reader".into())
            .spawn(move || {
                Self::reader_loop(tx, stop_flag);
            })?;

        Ok((
            Self {
                handle: Some(handle),
                stop,
            },
            rx,
        ))
    }

    /// Signal the reader thread to stop and wait for it to exit. Idempotent.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Forward a pending resize, if any. `false` when the receiver is gone.
    fn forward_resize(tx: &Sender<Input>) -> bool {
        if !terminal::take_resize() {
            return true;
        }
        let Some(size) = terminal::get_size() else {
            return true;
        };
        tracing::debug!(cols = size.cols, rows = size.rows, "terminal resized");
        tx.send(Input::Resize(size)).is_ok()
    }

    #[cfg(unix)]
    #[allow(clippy::needless_pass_by_value)] // Owned values moved into thread closure.
    fn reader_loop(tx: Sender<Input>, stop: Arc<AtomicBool>) {
        use std::os::unix::io::AsRawFd;

        let stdin_fd = io::stdin().as_raw_fd();
        let mut buf = [0u8; READ_BUF_SIZE];

        loop {
            if stop.load(Ordering::Relaxed) {
                break;
            }
            if !Self::forward_resize(&tx) {
                break;
            }

            let ready = unsafe {
                let mut pfd = libc::pollfd {
                    fd: stdin_fd,
                    events: libc::POLLIN,
                    revents: 0,
                };
                libc::poll(&raw mut pfd, 1, POLL_TIMEOUT_MS)
            };

            // Timeout, or EINTR from SIGWINCH.
            if ready <= 0 {
                continue;
            }

            let n = unsafe { libc::read(stdin_fd, buf.as_mut_ptr().cast(), buf.len()) };

            if n <= 0 {
                tracing::debug!("stdin closed");
                break;
            }

            #[allow(clippy::cast_sign_loss)] // n > 0 guaranteed above.
            let chunk = buf[..n as usize].to_vec();

            if tx.send(Input::Bytes(chunk)).is_err() {
                break;
            }
        }
    }

    /// Blocking reads with no poll. The thread can stay parked in `read()`
    /// after `stop()`.
    #[cfg(not(unix))]
    #[allow(clippy::needless_pass_by_value)]
    fn reader_loop(tx: Sender<Input>, stop: Arc<AtomicBool>) {
        use std::io::Read;

        let stdin = std::io::stdin();
        let mut buf = [0u8; READ_BUF_SIZE];

        loop {
            if stop.load(Ordering::Relaxed) {
                break;
            }

            match stdin.lock().read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if tx.send(Input::Bytes(buf[..n].to_vec())).is_err() {
                        break;
                    }
                }
            }
        }
    }
}

impl Drop for StdinReader {
    fn drop(&mut self) {
        self.stop();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
