// SPDX-License-Identifier: MIT
//
// cellterm — event viewer and drawing demo.
//
// Takes over the terminal through cellterm-core, paints a color/attribute
// sampler and a scrolling log of every decoded event. Useful for checking
// what a terminal actually sends for a key chord or mouse gesture.
//
//   ┌──────────────────────────────┐
//   │ title (REVERSE)              │  ← row 0
//   │ palette + attribute sampler  │  ← rows 1-3
//   ├──────────────────────────────┤
//   │ event log, newest last       │  ← remaining rows
//   └──────────────────────────────┘
//
// `q` or Ctrl-Q quits. Logs go to a file (never to the terminal we draw on).

use std::collections::VecDeque;
use std::fs::File;
use std::path::PathBuf;
use std::process;
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cellterm_core::color::format::{self, Word};
use cellterm_core::{Config, Event, Key, KeyEvent, Modifiers, MouseAction, Screen};

const MAX_LOG_LINES: usize = 512;

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal event viewer and cell renderer demo")]
struct Args {
    /// Write tracing output to this file
    #[arg(long, env = "CELLTERM_LOG")]
    log_file: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Quiet period before a lone ESC counts as the Escape key
    #[arg(long)]
    escape_timeout_ms: Option<u64>,

    /// Don't enable mouse reporting
    #[arg(long)]
    no_mouse: bool,

    /// Draw on the main screen instead of the alternate screen
    #[arg(long)]
    no_alt_screen: bool,
}

impl Args {
    /// Environment-derived config with command-line overrides on top.
    fn config(&self, base: Config) -> Config {
        let mut config = base;
        if let Some(ms) = self.escape_timeout_ms {
            config = config.with_escape_timeout(Duration::from_millis(ms));
        }
        if self.no_mouse {
            config = config.with_mouse(false);
        }
        if self.no_alt_screen {
            config = config.with_alt_screen(false);
        }
        config
    }
}

fn init_tracing(args: &Args) -> std::io::Result<()> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };
    let file = File::create(path)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_thread_names(true)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

// ─── Event Log ──────────────────────────────────────────────────────────────

/// Human-readable one-line description of an event.
fn describe(event: &Event) -> String {
    match event {
        Event::Key(key) => describe_key(key),
        Event::Mouse(mouse) => {
            let button = mouse
                .button
                .map_or_else(|| "none".to_string(), |b| format!("{b:?}"));
            let action = match mouse.action {
                MouseAction::Press => "press",
                MouseAction::Release => "release",
                MouseAction::Motion => "motion",
            };
            format!(
                "mouse {action} {button} at {},{}{}",
                mouse.x,
                mouse.y,
                modifier_suffix(mouse.modifiers)
            )
        }
        Event::Resize { width, height } => format!("resize {width}x{height}"),
    }
}

fn describe_key(key: &KeyEvent) -> String {
    let mods = modifier_suffix(key.modifiers);
    if let Some(ch) = key.ch {
        return format!("char {ch:?} U+{:04X}{mods}", u32::from(ch));
    }
    let code = key.key.code();
    match key.key.name() {
        Some(name) => format!("key {name} ({code:#06x}){mods}"),
        None if code < 0x20 => {
            let letter = char::from(b'@' + u8::try_from(code).unwrap_or(0));
            format!("key Ctrl-{letter} ({code:#06x}){mods}")
        }
        None => format!("key {code:#06x}{mods}"),
    }
}

fn modifier_suffix(mods: Modifiers) -> String {
    let mut out = String::new();
    for (flag, name) in [
        (Modifiers::CTRL, "ctrl"),
        (Modifiers::ALT, "alt"),
        (Modifiers::SHIFT, "shift"),
        (Modifiers::MOTION, "motion"),
    ] {
        if mods.contains(flag) {
            out.push_str(if out.is_empty() { " [" } else { "+" });
            out.push_str(name);
        }
    }
    if !out.is_empty() {
        out.push(']');
    }
    out
}

/// Whether the event asks the viewer to exit.
fn is_quit(event: &Event) -> bool {
    matches!(
        event,
        Event::Key(KeyEvent { key: Key::CTRL_Q, .. })
            | Event::Key(KeyEvent { ch: Some('q'), .. })
    )
}

// ─── Drawing ────────────────────────────────────────────────────────────────

const PALETTE: [Word; 8] = [
    format::BLACK,
    format::RED,
    format::GREEN,
    format::YELLOW,
    format::BLUE,
    format::MAGENTA,
    format::CYAN,
    format::WHITE,
];

const STYLES: [(&str, Word); 6] = [
    ("bold", format::BOLD),
    ("dim", format::DIM),
    ("italic", format::ITALIC),
    ("underline", format::UNDERLINE),
    ("reverse", format::REVERSE),
    ("blink", format::BLINK),
];

fn draw<W: std::io::Write>(screen: &mut Screen<W>, log: &VecDeque<String>) {
    screen.clear(format::DEFAULT);
    let width = screen.width();
    let height = screen.height();

    let title = " cellterm  q / Ctrl-Q quits ";
    for x in 0..width {
        screen.set_cell(x, 0, ' ', format::REVERSE, format::DEFAULT);
    }
    screen.print(0, 0, format::REVERSE, format::DEFAULT, title);

    let mut x = 0;
    for (i, &color) in PALETTE.iter().enumerate() {
        let label = format!(" {i} ");
        x += screen.print(x, 1, format::DEFAULT, color, &label);
        x += screen.print(x, 1, color | format::BRIGHT, format::DEFAULT, "██");
    }

    let mut x = 0;
    for (name, style) in STYLES {
        x += screen.print(x, 2, style, format::DEFAULT, name);
        x += screen.print(x, 2, format::DEFAULT, format::DEFAULT, " ");
    }
    screen.print(x, 2, format::DEFAULT, format::DEFAULT, "漢字 wide");

    for x in 0..width {
        screen.set_cell(x, 3, '─', format::BLACK | format::BRIGHT, format::DEFAULT);
    }

    let rows = usize::from(height.saturating_sub(4));
    let skip = log.len().saturating_sub(rows);
    for (y, line) in (4..height).zip(log.iter().skip(skip)) {
        screen.print(0, y, format::DEFAULT, format::DEFAULT, line);
    }

    screen.set_cursor(0, height.saturating_sub(1));
}

fn run(config: Config) -> cellterm_core::Result<()> {
    let mut screen = Screen::init(config)?;
    let mut log: VecDeque<String> = VecDeque::new();

    loop {
        draw(&mut screen, &log);
        screen.present()?;

        let event = screen.poll_event()?;
        tracing::info!(event = ?event, "event");
        if is_quit(&event) {
            break;
        }

        log.push_back(describe(&event));
        while log.len() > MAX_LOG_LINES {
            log.pop_front();
        }
    }

    screen.shutdown()
}

fn main() {
    let args = Args::parse();

    if let Err(e) = init_tracing(&args) {
        eprintln!("cellterm: failed to open log file: {e}");
        process::exit(1);
    }

    let config = args.config(Config::from_env());
    if let Err(e) = run(config) {
        eprintln!("cellterm: {e}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use cellterm_core::reader::Input;
    use cellterm_core::{MouseButton, MouseEvent, Size};
    use std::sync::mpsc;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("cellterm").chain(argv.iter().copied())).unwrap()
    }

    // ── Arguments ───────────────────────────────────────────────────

    #[test]
    fn flags_override_config() {
        let config = args(&["--no-mouse", "--escape-timeout-ms", "80"]).config(Config::default());
        assert!(!config.mouse);
        assert!(config.alt_screen);
        assert_eq!(config.escape_timeout, Duration::from_millis(80));
    }

    #[test]
    fn no_flags_keep_base() {
        let base = Config::default().with_alt_screen(false);
        assert_eq!(args(&[]).config(base), base);
    }

    // ── Descriptions ────────────────────────────────────────────────

    #[test]
    fn describe_chars_and_keys() {
        assert_eq!(describe(&Event::Key(KeyEvent::char('a'))), "char 'a' U+0061");
        assert_eq!(
            describe(&Event::Key(KeyEvent::key(Key::ARROW_UP))),
            "key Up (0xffed)"
        );
        assert_eq!(
            describe(&Event::Key(KeyEvent::key(Key::CTRL_A))),
            "key Ctrl-A (0x0001)"
        );
        assert_eq!(
            describe(&Event::Key(
                KeyEvent::key(Key::ARROW_LEFT).with_modifiers(Modifiers::CTRL | Modifiers::SHIFT)
            )),
            "key Left (0xffeb) [ctrl+shift]"
        );
    }

    #[test]
    fn describe_mouse_and_resize() {
        let mouse = Event::Mouse(MouseEvent {
            x: 4,
            y: 7,
            button: Some(MouseButton::Left),
            action: MouseAction::Press,
            modifiers: Modifiers::empty(),
        });
        assert_eq!(describe(&mouse), "mouse press Left at 4,7");
        assert_eq!(
            describe(&Event::Resize {
                width: 120,
                height: 40
            }),
            "resize 120x40"
        );
    }

    #[test]
    fn quit_keys() {
        assert!(is_quit(&Event::Key(KeyEvent::char('q'))));
        assert!(is_quit(&Event::Key(KeyEvent::key(Key::CTRL_Q))));
        assert!(!is_quit(&Event::Key(KeyEvent::char('Q'))));
        assert!(!is_quit(&Event::Key(KeyEvent::key(Key::ESC))));
    }

    // ── Drawing ─────────────────────────────────────────────────────

    #[test]
    fn draw_shows_newest_log_lines() {
        let (_tx, rx) = mpsc::channel::<Input>();
        let mut screen = Screen::new(Vec::new(), rx, Size::new(40, 6), Config::default());
        let log: VecDeque<String> = ["one", "two", "three"].map(String::from).into();

        draw(&mut screen, &log);
        assert_eq!(screen.get(0, 4).and_then(|c| c.character()), Some('t'));
        assert_eq!(screen.get(1, 5).and_then(|c| c.character()), Some('h'));
        assert_eq!(screen.cursor(), Some((0, 5)));

        screen.present().unwrap();
        let out = String::from_utf8_lossy(screen.writer());
        assert!(out.contains("three"));
        assert!(!out.contains("one"));
    }
}
