// SPDX-License-Identifier: MIT
//
// Error types for screen operations.
//
// Only device-level failures are errors. Out-of-range coordinates are
// ignored and undecodable input is turned into events, so neither shows up
// here.

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The terminal could not be set up (raw mode, size query, reader).
    #[error("failed to initialize terminal: {0}")]
    Init(#[source] io::Error),

    /// Standard input is not a terminal.
    #[error("standard input is not a terminal")]
    NotATerminal,

    /// Writing rendered output failed. Nothing was committed, so the
    /// present can be retried.
    #[error("failed to write to terminal: {0}")]
    Write(#[source] io::Error),

    /// The input source went away and no events are left.
    #[error("input closed")]
    InputClosed,
}

impl Error {
    /// Whether retrying the same call can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Write(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
