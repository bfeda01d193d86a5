//! Terminal window: raw mode, key state, resize events and frame pacing
use std::collections::HashMap;
use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use objview_core::backend::ResizeCallback;
use objview_core::{BackendError, Key, Window};

use crate::framebuffer::{FrameBuffer, SharedFrameBuffer, CELL_ASPECT};

/// Rows reserved above the framebuffer for the status line
const STATUS_ROWS: u16 = 1;

/// Without release events a key counts as held this long after its last
/// press or repeat; covers the usual auto-repeat delay.
const HOLD_TIMEOUT: Duration = Duration::from_millis(600);

#[derive(Debug, Clone)]
pub struct WindowOptions {
    pub target_fps: u32,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self { target_fps: 30 }
    }
}

/// Held keys, built from terminal key events
#[derive(Debug, Default)]
struct KeyState {
    held: HashMap<Key, Instant>,
    /// The terminal reports releases, so holds never time out
    release_events: bool,
}

impl KeyState {
    fn new(release_events: bool) -> Self {
        Self {
            held: HashMap::new(),
            release_events,
        }
    }

    /// Record a key event; returns true for Ctrl-C
    fn apply(&mut self, event: &KeyEvent, now: Instant) -> bool {
        if event.modifiers.contains(KeyModifiers::CONTROL) && event.code == KeyCode::Char('c') {
            return true;
        }

        let key = match event.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Key::Escape,
            KeyCode::Char(c) => Key::Char(c.to_ascii_lowercase()),
            _ => return false,
        };

        match event.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.held.insert(key, now);
            }
            KeyEventKind::Release => {
                self.held.remove(&key);
            }
        }
        false
    }

    fn expire(&mut self, now: Instant) {
        if !self.release_events {
            self.held
                .retain(|_, pressed| now.duration_since(*pressed) < HOLD_TIMEOUT);
        }
    }

    fn is_held(&self, key: Key) -> bool {
        let key = match key {
            Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
            other => other,
        };
        self.held.contains_key(&key)
    }
}

/// Frames per second, refreshed once a second
#[derive(Debug)]
struct FpsCounter {
    frames: u32,
    since: Instant,
    value: f32,
}

impl FpsCounter {
    fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            since: now,
            value: 0.0,
        }
    }

    fn tick(&mut self, now: Instant) {
        self.frames += 1;
        let window = now.duration_since(self.since);
        if window.as_secs() >= 1 {
            self.value = self.frames as f32 / window.as_secs_f32();
            self.frames = 0;
            self.since = now;
        }
    }
}

fn status_line(title: &str, fps: f32, columns: u16) -> String {
    let line = format!("{title} | FPS: {fps:.1} | C=camera Esc/Q=quit");
    line.chars().take(columns as usize).collect()
}

/// The terminal as a [`Window`].
///
/// Creating it switches the terminal to raw mode on the alternate screen;
/// dropping it restores the previous state.
pub struct TerminalWindow {
    title: String,
    out: Stdout,
    surface: SharedFrameBuffer,
    columns: u16,
    rows: u16,
    keys: KeyState,
    should_close: bool,
    resize_callback: Option<ResizeCallback>,
    started: Instant,
    frame_budget: Duration,
    last_present: Instant,
    fps: FpsCounter,
    enhanced_keys: bool,
    active: bool,
}

impl TerminalWindow {
    pub fn create(title: &str, options: WindowOptions) -> Result<Self, BackendError> {
        let (columns, rows) =
            terminal::size().map_err(|e| BackendError::Init(format!("terminal size: {e}")))?;
        let now = Instant::now();

        let mut window = Self {
            title: title.to_string(),
            out: io::stdout(),
            surface: FrameBuffer::shared(0, 0),
            columns,
            rows,
            keys: KeyState::new(false),
            should_close: false,
            resize_callback: None,
            started: now,
            frame_budget: Duration::from_secs(1) / options.target_fps.max(1),
            last_present: now,
            fps: FpsCounter::new(now),
            enhanced_keys: false,
            active: false,
        };
        window
            .enter()
            .map_err(|e| BackendError::Init(format!("terminal setup: {e}")))?;

        log::info!(
            "terminal {columns}x{rows}, key release events {}",
            if window.enhanced_keys { "on" } else { "off" }
        );
        Ok(window)
    }

    /// Framebuffer presented by `swap_buffers`, shared with the renderer
    pub fn surface(&self) -> SharedFrameBuffer {
        self.surface.clone()
    }

    fn enter(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        self.active = true;
        execute!(
            self.out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(ClearType::All)
        )?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.out,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced_keys = true;
            self.keys = KeyState::new(true);
        }
        Ok(())
    }

    fn leave(&mut self) -> io::Result<()> {
        if self.enhanced_keys {
            execute!(self.out, PopKeyboardEnhancementFlags)?;
        }
        execute!(self.out, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    fn handle_resize(&mut self, columns: u16, rows: u16) -> io::Result<()> {
        self.columns = columns;
        self.rows = rows;

        let (width, height) = self.size();
        if let Some(callback) = self.resize_callback.as_mut() {
            callback(width, height);
        }
        queue_clear(&mut self.out)
    }
}

/// Wipe cells the previous, larger frame may have left behind
fn queue_clear<W: Write>(out: &mut W) -> io::Result<()> {
    queue!(out, terminal::Clear(ClearType::All))
}

impl Window for TerminalWindow {
    fn poll_events(&mut self) -> Result<(), BackendError> {
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => {
                    if self.keys.apply(&key, Instant::now()) {
                        self.should_close = true;
                    }
                }
                Event::Resize(columns, rows) => self.handle_resize(columns, rows)?,
                _ => {}
            }
        }
        self.keys.expire(Instant::now());
        Ok(())
    }

    fn should_close(&self) -> bool {
        self.should_close
    }

    fn set_should_close(&mut self, close: bool) {
        self.should_close = close;
    }

    fn swap_buffers(&mut self) -> Result<(), BackendError> {
        self.surface.borrow().draw(&mut self.out, STATUS_ROWS)?;

        queue!(
            self.out,
            cursor::MoveTo(0, 0),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(status_line(&self.title, self.fps.value, self.columns)),
            ResetColor
        )?;
        self.out.flush()?;

        // Frame pacing
        let elapsed = self.last_present.elapsed();
        if elapsed < self.frame_budget {
            std::thread::sleep(self.frame_budget - elapsed);
        }
        let now = Instant::now();
        self.last_present = now;
        self.fps.tick(now);
        Ok(())
    }

    fn size(&self) -> (u32, u32) {
        let rows = self.rows.saturating_sub(STATUS_ROWS) as u32;
        (self.columns as u32, rows * CELL_ASPECT)
    }

    fn elapsed_time(&self) -> f32 {
        self.started.elapsed().as_secs_f32()
    }

    fn key_pressed(&self, key: Key) -> bool {
        self.keys.is_held(key)
    }

    fn set_resize_callback(&mut self, callback: ResizeCallback) {
        self.resize_callback = Some(callback);
    }
}

impl Drop for TerminalWindow {
    fn drop(&mut self) {
        if self.active {
            if let Err(e) = self.leave() {
                log::error!("failed to restore terminal: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_release_events_clear_hold() {
        let mut keys = KeyState::new(true);
        let start = Instant::now();
        keys.apply(&key(KeyCode::Char('C'), KeyEventKind::Press), start);
        assert!(keys.is_held(Key::Char('c')));

        // Holds never time out while releases are reported
        keys.expire(start + Duration::from_secs(5));
        assert!(keys.is_held(Key::Char('c')));

        keys.apply(&key(KeyCode::Char('c'), KeyEventKind::Release), start);
        assert!(!keys.is_held(Key::Char('c')));
    }

    #[test]
    fn test_hold_times_out_without_releases() {
        let mut keys = KeyState::new(false);
        let start = Instant::now();
        keys.apply(&key(KeyCode::Char('c'), KeyEventKind::Press), start);

        keys.expire(start + HOLD_TIMEOUT / 2);
        assert!(keys.is_held(Key::Char('c')));

        // A repeat refreshes the hold
        keys.apply(&key(KeyCode::Char('c'), KeyEventKind::Repeat), start + HOLD_TIMEOUT / 2);
        keys.expire(start + HOLD_TIMEOUT);
        assert!(keys.is_held(Key::Char('c')));

        keys.expire(start + HOLD_TIMEOUT * 2);
        assert!(!keys.is_held(Key::Char('c')));
    }

    #[test]
    fn test_q_and_escape_both_close() {
        let now = Instant::now();
        for code in [KeyCode::Esc, KeyCode::Char('q')] {
            let mut keys = KeyState::new(true);
            keys.apply(&key(code, KeyEventKind::Press), now);
            assert!(keys.is_held(Key::Escape));
        }
    }

    #[test]
    fn test_ctrl_c_requests_close() {
        let mut keys = KeyState::new(true);
        let mut event = key(KeyCode::Char('c'), KeyEventKind::Press);
        event.modifiers = KeyModifiers::CONTROL;
        assert!(keys.apply(&event, Instant::now()));
        // Not a camera toggle
        assert!(!keys.is_held(Key::Char('c')));
    }

    #[test]
    fn test_fps_counter() {
        let start = Instant::now();
        let mut fps = FpsCounter::new(start);
        for i in 1..=30 {
            fps.tick(start + Duration::from_millis(i * 1000 / 30));
        }
        assert!((fps.value - 30.0).abs() < 0.5);
    }

    struct ClosedTerminal;

    impl Write for ClosedTerminal {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_clear_reports_write_errors() {
        let mut out = Vec::new();
        queue_clear(&mut out).unwrap();
        assert!(!out.is_empty());

        let err = queue_clear(&mut ClosedTerminal).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_status_line_truncates() {
        assert_eq!(status_line("objview", 29.96, 80), "objview | FPS: 30.0 | C=camera Esc/Q=quit");
        assert_eq!(status_line("objview", 0.0, 7), "objview");
    }
}
