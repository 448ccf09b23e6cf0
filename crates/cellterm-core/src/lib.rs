// SPDX-License-Identifier: MIT
//
// cellterm-core — double-buffered terminal rendering and input decoding.
//
// The application writes cells into an in-memory grid. `present()` diffs the
// pending grid against what the terminal is known to show and emits only the
// escape sequences needed to bring the two in sync: one cursor move per run
// of changed cells, one SGR group per style change, UTF-8 glyph bytes.
//
// In the other direction, raw terminal bytes are fed through a small state
// machine that assembles escape sequences, mouse reports and UTF-8 text into
// discrete events. Resize notifications arrive on the same channel and are
// surfaced ahead of any queued keystroke.
//
// Everything targets one xterm-compatible output profile. There is no
// terminfo lookup; every escape code is written out in `ansi`.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod color;
pub mod config;
pub mod error;
pub mod event;
pub mod input;
pub mod output;
pub mod reader;
pub mod render;
pub mod screen;
pub mod sgr;
pub mod terminal;

pub use buffer::{CellBuffer, Grid};
pub use cell::{Attr, Cell};
pub use color::Color;
pub use config::Config;
pub use error::{Error, Result};
pub use event::{Event, Key, KeyEvent, Modifiers, MouseAction, MouseButton, MouseEvent};
pub use input::Decoder;
pub use reader::Input;
pub use render::{RenderStats, Renderer};
pub use screen::Screen;
pub use terminal::Size;
