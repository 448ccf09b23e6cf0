// SPDX-License-Identifier: MIT
//
// Runtime configuration.
//
// Plain struct with builder-style setters. `Default` is the fixed baseline;
// `from_env()` lets an operator adjust it without recompiling:
//
//   CELLTERM_ESCAPE_TIMEOUT_MS   quiet period before a lone ESC is a keypress
//   CELLTERM_MOUSE               enable mouse reporting (1/0, true/false)
//   CELLTERM_ALT_SCREEN          use the alternate screen buffer
//
// Unparseable values fall back to the default.

use std::env;
use std::time::Duration;

const DEFAULT_ESCAPE_TIMEOUT_MS: u64 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// How long input must stay quiet before a pending ESC is reported as
    /// the Escape key rather than the start of a sequence.
    pub escape_timeout: Duration,
    /// Enable mouse reporting on a real terminal session.
    pub mouse: bool,
    /// Switch to the alternate screen buffer on a real terminal session.
    pub alt_screen: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            escape_timeout: Duration::from_millis(DEFAULT_ESCAPE_TIMEOUT_MS),
            mouse: true,
            alt_screen: true,
        }
    }
}

impl Config {
    /// Defaults overridden by `CELLTERM_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            escape_timeout: lookup("CELLTERM_ESCAPE_TIMEOUT_MS")
                .and_then(|v| v.trim().parse().ok())
                .map_or(defaults.escape_timeout, Duration::from_millis),
            mouse: lookup("CELLTERM_MOUSE")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.mouse),
            alt_screen: lookup("CELLTERM_ALT_SCREEN")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.alt_screen),
        }
    }

    #[must_use]
    pub const fn with_escape_timeout(mut self, timeout: Duration) -> Self {
        self.escape_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_mouse(mut self, enabled: bool) -> Self {
        self.mouse = enabled;
        self
    }

    #[must_use]
    pub const fn with_alt_screen(mut self, enabled: bool) -> Self {
        self.alt_screen = enabled;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
