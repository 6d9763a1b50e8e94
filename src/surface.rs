//! Visible surface and input events

use std::{
    io::{self, Stdout, Write},
    time::{Duration, Instant},
};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{debug, warn};
use snafu::{ensure, ResultExt};

use crate::{
    config::Config,
    errors::{DockError, TerminalIoSnafu, TerminalSetupSnafu, TerminalTooSmallSnafu},
    pixmap::{Compositor, Rgb},
    render::{Canvas, Rect, Sheet, SIZE},
    sprites::Sheets,
};

/// Mouse buttons, numbered 1 to 5 the way X11 does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Button {
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
}

/// A keyboard modifier that can select the suspend command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum Modifier {
    Control,
    Shift,
    Alt,
}

/// Modifiers held during a button press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Modifiers {
    pub control: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub(crate) const NONE: Self = Self {
        control: false,
        shift: false,
        alt: false,
    };

    /// Exactly `modifier` and nothing else.
    pub(crate) fn only(modifier: Modifier) -> Self {
        let mut m = Self::NONE;
        match modifier {
            Modifier::Control => m.control = true,
            Modifier::Shift => m.shift = true,
            Modifier::Alt => m.alt = true,
        }
        m
    }
}

impl From<KeyModifiers> for Modifiers {
    fn from(value: KeyModifiers) -> Self {
        Self {
            control: value.contains(KeyModifiers::CONTROL),
            shift: value.contains(KeyModifiers::SHIFT),
            alt: value.contains(KeyModifiers::ALT),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputEvent {
    ButtonPress { button: Button, modifiers: Modifiers },
    /// The user asked the program to exit.
    Quit,
}

/// Where frames are shown and input comes from.
pub(crate) trait Surface: Canvas {
    /// Show the composed frame.
    fn flush(&mut self) -> Result<(), DockError>;
    /// Wait for the next input event. `None` means `timeout` expired.
    fn next_event(&mut self, timeout: Duration) -> Result<Option<InputEvent>, DockError>;
}

/// Minimum terminal size: one cell holds two pixel rows.
const MIN_COLS: u16 = SIZE;
const MIN_ROWS: u16 = SIZE / 2;

/// Renders the widget with half block characters in a true color terminal.
#[derive(Debug)]
pub(crate) struct TerminalSurface {
    out: Stdout,
    compositor: Compositor,
    /// Top-left cell of the widget.
    origin: (u16, u16),
    alternate_screen: bool,
    active: bool,
}

impl TerminalSurface {
    pub(crate) fn new(config: &Config) -> Result<Self, DockError> {
        if let Some(display) = &config.display {
            warn!("Display {display:?} ignored, drawing on the controlling terminal");
        }
        let (cols, rows) = terminal::size().context(TerminalSetupSnafu)?;
        ensure!(
            cols >= MIN_COLS && rows >= MIN_ROWS,
            TerminalTooSmallSnafu {
                cols,
                rows,
                min_cols: MIN_COLS,
                min_rows: MIN_ROWS,
            }
        );

        let mut surface = Self {
            out: io::stdout(),
            compositor: Compositor::new(Sheets::new(config.light_color, config.windowed)),
            origin: (0, 0),
            alternate_screen: !config.broken_wm,
            active: false,
        };
        surface.enter().context(TerminalSetupSnafu)?;
        restore_on_panic(surface.alternate_screen);
        Ok(surface)
    }

    fn enter(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        self.active = true;
        if self.alternate_screen {
            execute!(self.out, EnterAlternateScreen)?;
        }
        execute!(self.out, EnableMouseCapture, Hide, Clear(ClearType::All))
    }

    fn leave(&mut self) -> io::Result<()> {
        write_restore(&mut self.out, self.alternate_screen)?;
        terminal::disable_raw_mode()
    }

    fn translate(&mut self, event: Event) -> Result<Option<InputEvent>, DockError> {
        match event {
            Event::Mouse(mouse) => {
                let button = match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => Button::Left,
                    MouseEventKind::Down(MouseButton::Middle) => Button::Middle,
                    MouseEventKind::Down(MouseButton::Right) => Button::Right,
                    MouseEventKind::ScrollUp => Button::WheelUp,
                    MouseEventKind::ScrollDown => Button::WheelDown,
                    _ => return Ok(None),
                };
                if !hit(self.origin, mouse.column, mouse.row) {
                    return Ok(None);
                }
                Ok(Some(InputEvent::ButtonPress {
                    button,
                    modifiers: mouse.modifiers.into(),
                }))
            }
            Event::Key(key) if is_quit(&key) => Ok(Some(InputEvent::Quit)),
            Event::Resize(cols, rows) => {
                debug!("Terminal resized to {cols}x{rows}");
                execute!(self.out, Clear(ClearType::All)).context(TerminalIoSnafu)?;
                self.flush()?;
                Ok(None)
            }
            _ => Ok(None),
        }
    }
}

/// Undo the terminal modes set up by [`TerminalSurface::enter`].
fn write_restore(out: &mut impl Write, alternate_screen: bool) -> io::Result<()> {
    execute!(out, ResetColor, DisableMouseCapture, Show)?;
    if alternate_screen {
        execute!(out, LeaveAlternateScreen)?;
    }
    Ok(())
}

/// Release builds abort on panic, which skips `Drop`.
fn restore_on_panic(alternate_screen: bool) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = terminal::disable_raw_mode();
        let _ = write_restore(&mut io::stdout(), alternate_screen);
        default_hook(info);
    }));
}

/// Is the cell at `column`, `row` covered by a widget drawn at `origin`?
fn hit(origin: (u16, u16), column: u16, row: u16) -> bool {
    let (x, y) = origin;
    (x..x + MIN_COLS).contains(&column) && (y..y + MIN_ROWS).contains(&row)
}

/// Wait until `translate` accepts an event or `timeout` runs out. Skipped
/// events do not extend the deadline.
fn wait_for_input<E>(
    timeout: Duration,
    mut poll: impl FnMut(Duration) -> io::Result<bool>,
    mut read: impl FnMut() -> io::Result<E>,
    mut translate: impl FnMut(E) -> Result<Option<InputEvent>, DockError>,
) -> Result<Option<InputEvent>, DockError> {
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() || !poll(remaining).context(TerminalIoSnafu)? {
            return Ok(None);
        }
        let event = read().context(TerminalIoSnafu)?;
        if let Some(input) = translate(event)? {
            return Ok(Some(input));
        }
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    key.kind == KeyEventKind::Press
        && match key.code {
            KeyCode::Char('q') => key.modifiers.is_empty(),
            KeyCode::Char('c') => key.modifiers == KeyModifiers::CONTROL,
            _ => false,
        }
}

fn color(pixel: Option<Rgb>) -> Color {
    match pixel {
        Some(Rgb(r, g, b)) => Color::Rgb { r, g, b },
        None => Color::Reset,
    }
}

impl Canvas for TerminalSurface {
    fn copy_area(&mut self, sheet: Sheet, src: Rect, dx: u16, dy: u16) {
        self.compositor.copy_area(sheet, src, dx, dy);
    }
}

impl Surface for TerminalSurface {
    fn flush(&mut self) -> Result<(), DockError> {
        let frame = self.compositor.frame();
        let (ox, oy) = self.origin;
        for row in 0..frame.height().div_ceil(2) {
            queue!(self.out, MoveTo(ox, oy + row)).context(TerminalIoSnafu)?;
            for x in 0..frame.width() {
                let top = frame.get(x, row * 2);
                let bottom = frame.get(x, row * 2 + 1);
                // Transparent halves keep the terminal background.
                let (glyph, fg, bg) = match (top, bottom) {
                    (None, None) => (' ', None, None),
                    (None, Some(_)) => ('▄', bottom, None),
                    _ => ('▀', top, bottom),
                };
                queue!(
                    self.out,
                    SetForegroundColor(color(fg)),
                    SetBackgroundColor(color(bg)),
                    Print(glyph)
                )
                .context(TerminalIoSnafu)?;
            }
        }
        queue!(self.out, ResetColor).context(TerminalIoSnafu)?;
        self.out.flush().context(TerminalIoSnafu)
    }

    fn next_event(&mut self, timeout: Duration) -> Result<Option<InputEvent>, DockError> {
        wait_for_input(timeout, event::poll, event::read, |event| self.translate(event))
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        if self.active {
            if let Err(e) = self.leave() {
                warn!("Failed to restore terminal: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::VecDeque, thread};

    use super::*;

    /// Button press on `Some(button)`, an ignored event on `None`.
    fn translate_script(event: Option<Button>) -> Result<Option<InputEvent>, DockError> {
        Ok(event.map(|button| InputEvent::ButtonPress {
            button,
            modifiers: Modifiers::NONE,
        }))
    }

    #[test]
    fn ignored_events_keep_the_deadline() {
        let timeout = Duration::from_millis(200);
        let script = RefCell::new(VecDeque::<Option<Button>>::from([None, None, None]));
        let mut polls = Vec::new();
        let start = Instant::now();
        let result = wait_for_input(
            timeout,
            |remaining| {
                polls.push(remaining);
                if script.borrow().is_empty() {
                    thread::sleep(remaining);
                    Ok(false)
                } else {
                    thread::sleep(Duration::from_millis(20));
                    Ok(true)
                }
            },
            || Ok(script.borrow_mut().pop_front().flatten()),
            translate_script,
        )
        .unwrap();
        let elapsed = start.elapsed();

        assert_eq!(result, None);
        assert_eq!(polls.len(), 4);
        assert!(polls.windows(2).all(|w| w[1] < w[0]), "{polls:?}");
        assert!(polls.iter().all(|&p| p <= timeout));
        assert!(elapsed >= timeout);
        assert!(elapsed < timeout + Duration::from_millis(150), "{elapsed:?}");
    }

    #[test]
    fn accepted_event_ends_the_wait() {
        let script = RefCell::new(VecDeque::<Option<Button>>::from([None, Some(Button::Right)]));
        let result = wait_for_input(
            Duration::from_secs(5),
            |_| Ok(!script.borrow().is_empty()),
            || Ok(script.borrow_mut().pop_front().flatten()),
            translate_script,
        )
        .unwrap();
        assert_eq!(
            result,
            Some(InputEvent::ButtonPress {
                button: Button::Right,
                modifiers: Modifiers::NONE,
            })
        );
    }

    #[test]
    fn poll_failure_is_reported() {
        let result = wait_for_input(
            Duration::from_secs(5),
            |_| Err(io::Error::other("gone")),
            || Ok(None),
            translate_script,
        );
        assert!(matches!(result, Err(DockError::TerminalIo { .. })));
    }

    #[test]
    fn clicks_outside_the_widget_miss() {
        assert!(hit((0, 0), 0, 0));
        assert!(hit((0, 0), MIN_COLS - 1, MIN_ROWS - 1));
        assert!(!hit((0, 0), MIN_COLS, 0));
        assert!(!hit((0, 0), 0, MIN_ROWS));
        assert!(!hit((10, 5), 9, 5));
        assert!(hit((10, 5), 10, 5));
    }

    #[test]
    fn restore_releases_mouse_and_screen() {
        let mut out = Vec::new();
        write_restore(&mut out, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\x1b[?1000l"), "{text:?}");
        assert!(text.contains("\x1b[?25h"), "{text:?}");
        assert!(text.contains("\x1b[?1049l"), "{text:?}");

        let mut out = Vec::new();
        write_restore(&mut out, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\x1b[?1000l"));
        assert!(!text.contains("\x1b[?1049l"));
    }

    #[test]
    fn exact_modifier_match() {
        let ctrl: Modifiers = KeyModifiers::CONTROL.into();
        assert_eq!(ctrl, Modifiers::only(Modifier::Control));
        let ctrl_shift: Modifiers = (KeyModifiers::CONTROL | KeyModifiers::SHIFT).into();
        assert_ne!(ctrl_shift, Modifiers::only(Modifier::Control));
        assert_eq!(Modifiers::from(KeyModifiers::NONE), Modifiers::NONE);
    }

    #[test]
    fn quit_keys() {
        let press = |code, modifiers| KeyEvent::new(code, modifiers);
        assert!(is_quit(&press(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_quit(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_quit(&press(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_quit(&press(KeyCode::Char('x'), KeyModifiers::NONE)));
    }

    #[test]
    fn transparent_pixels_keep_terminal_background() {
        assert_eq!(color(None), Color::Reset);
        assert_eq!(color(Some(Rgb(1, 2, 3))), Color::Rgb { r: 1, g: 2, b: 3 });
    }
}
