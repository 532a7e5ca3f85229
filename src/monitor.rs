//! Terminal dashboard.
//!
//! Fullscreen ratatui view over the running engine: gain sliders, feedback
//! mode, relay status, and pointer capture. Mouse motion inside the window
//! maps to the feedback graph's gesture input, with the motion speed driving
//! the rate parameter.

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, MouseEvent,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

use crate::engine::AudioEngine;
use crate::feedback::FeedbackMode;
use crate::gains::{GAIN_DB_MAX, GAIN_DB_MIN};
use crate::mixer::MixerControls;
use crate::relay::{Relay, RelayEvent};
use crate::samples::{ping_table, SampleBank};
use crate::version::long_version;

const FRAME_POLL: Duration = Duration::from_millis(33);
const DB_STEP: f32 = 1.0;
const SLIDER_WIDTH: usize = 30;

/// Seconds rendered as `HHH:MM:SS`.
pub fn format_hms(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:03}:{minutes:02}:{seconds:02}")
}

pub struct Monitor<'a> {
    engine: &'a AudioEngine,
    relay: &'a Relay,
    bank: Option<&'a mut SampleBank>,
    controls: MixerControls,
    selected: usize,
    started: Instant,
    last_ping: Option<Instant>,
    last_pointer: Option<(f32, f32, Instant)>,
    status: String,
}

impl<'a> Monitor<'a> {
    pub fn new(
        engine: &'a AudioEngine,
        relay: &'a Relay,
        bank: Option<&'a mut SampleBank>,
    ) -> Self {
        let controls = engine.controls();
        Self {
            engine,
            relay,
            bank,
            controls,
            selected: 0,
            started: Instant::now(),
            last_ping: None,
            last_pointer: None,
            status: String::from("ready"),
        }
    }

    /// Take over the terminal until the user quits.
    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.run_app(&mut terminal);

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn run_app(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            self.drain_relay();
            terminal.draw(|f| self.ui(f))?;

            if event::poll(FRAME_POLL)? {
                match event::read()? {
                    Event::Key(key) => {
                        if !self.handle_key(key)? {
                            break;
                        }
                    }
                    Event::Mouse(mouse) => {
                        let size = terminal.size()?;
                        self.handle_mouse(mouse, size.width, size.height);
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// One relay event per frame, matching the relay's poll contract.
    fn drain_relay(&mut self) {
        let Some(event) = self.relay.poll() else {
            return;
        };
        match event {
            RelayEvent::Ping => self.ping(),
            RelayEvent::Control { x, y, rate } => {
                self.controls.feedback.set_control(x, y, rate);
            }
            RelayEvent::Gain { name, db } => match self.controls.gains.set_db(&name, db) {
                Ok(db) => self.status = format!("relay: {name} = {db:.1} dB"),
                Err(e) => self.status = format!("relay: {e}"),
            },
        }
    }

    /// Returns false when the user quits.
    fn handle_key(&mut self, key: KeyEvent) -> Result<bool, Box<dyn std::error::Error>> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(false),
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down => {
                let count = self.controls.gains.len();
                if count > 0 && self.selected < count - 1 {
                    self.selected += 1;
                }
            }
            KeyCode::Left => self.nudge_selected(-DB_STEP),
            KeyCode::Right => self.nudge_selected(DB_STEP),
            KeyCode::Char('m') => self.cycle_mode()?,
            KeyCode::Char('p') | KeyCode::Char(' ') => self.ping(),
            _ => {}
        }
        Ok(true)
    }

    fn nudge_selected(&mut self, delta_db: f32) {
        let Some(name) = self
            .controls
            .gains
            .names()
            .get(self.selected)
            .map(|s| s.to_string())
        else {
            return;
        };
        if let Ok(db) = self.controls.gains.db(&name) {
            match self.controls.gains.set_db(&name, db + delta_db) {
                Ok(db) => self.status = format!("{name} = {db:.1} dB"),
                Err(e) => self.status = e.to_string(),
            }
        }
    }

    fn cycle_mode(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let current = self.engine.mode();
        let all = FeedbackMode::ALL;
        let next = all
            .iter()
            .cycle()
            .skip_while(|m| **m != current)
            .nth(1)
            .copied()
            .unwrap_or_default();
        self.engine.set_feedback(next)?;
        // The switch invalidated every handle; fetch a fresh snapshot.
        self.controls = self.engine.controls();
        self.selected = 0;
        self.status = format!("feedback mode: {next}");
        Ok(())
    }

    fn ping(&mut self) {
        let table = self
            .bank
            .as_mut()
            .and_then(|bank| bank.get("ping"))
            .unwrap_or_else(|| ping_table(self.engine.sample_rate()));
        self.engine.trigger(table, 0.8, 1.0);
        self.last_ping = Some(Instant::now());
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, width: u16, height: u16) {
        if !matches!(
            mouse.kind,
            MouseEventKind::Moved | MouseEventKind::Drag(_)
        ) {
            return;
        }
        let x = mouse.column as f32 / width.max(1) as f32;
        let y = mouse.row as f32 / height.max(1) as f32;
        let now = Instant::now();

        // Motion speed drives the rate input: still pointer, silent wind.
        let rate = match self.last_pointer {
            Some((px, py, at)) => {
                let dt = now.duration_since(at).as_secs_f32().max(1e-3);
                ((x - px).powi(2) + (y - py).powi(2)).sqrt() / dt
            }
            None => 0.0,
        };
        self.last_pointer = Some((x, y, now));
        self.controls.feedback.set_control(x, y, rate);
    }

    fn ui(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Min(4),
                Constraint::Length(3),
            ])
            .split(f.size());

        let header = Paragraph::new(vec![
            Line::from(Span::styled(
                format!("aeolus {}", long_version()),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from("John H. Williamson"),
            Line::from(format!(
                "mode: {}   voices: {}   up: {}",
                self.engine.mode(),
                self.engine.active_voices(),
                format_hms(self.started.elapsed().as_secs()),
            )),
        ])
        .block(Block::default().borders(Borders::ALL).title(" feedback demo "));
        f.render_widget(header, chunks[0]);

        let mut lines = Vec::new();
        for (i, name) in self.controls.gains.names().iter().enumerate() {
            let db = self.controls.gains.db(name).unwrap_or(GAIN_DB_MIN);
            let filled = (((db - GAIN_DB_MIN) / (GAIN_DB_MAX - GAIN_DB_MIN))
                * SLIDER_WIDTH as f32)
                .round() as usize;
            let bar: String = "█".repeat(filled.min(SLIDER_WIDTH))
                + &"░".repeat(SLIDER_WIDTH - filled.min(SLIDER_WIDTH));
            let style = if i == self.selected {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default().fg(Color::White)
            };
            lines.push(Line::from(Span::styled(
                format!(" {name:<10} {bar} {db:>6.1} dB "),
                style,
            )));
        }
        let sliders = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" gains "));
        f.render_widget(sliders, chunks[1]);

        let relay_state = if self.relay.live() { "live" } else { "idle" };
        let ping = match self.last_ping {
            Some(at) => format_hms(at.elapsed().as_secs()),
            None => String::from("---:--:--"),
        };
        let footer = Paragraph::new(vec![
            Line::from(format!(
                "relay {} [{}]   last ping {}   {}",
                self.relay.address(),
                relay_state,
                ping,
                self.status,
            )),
        ])
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL).title(
            " q quit | arrows gains | m mode | p ping | mouse wind ",
        ));
        f.render_widget(footer, chunks[2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hms_formats_long_uptimes() {
        assert_eq!(format_hms(0), "000:00:00");
        assert_eq!(format_hms(61), "000:01:01");
        assert_eq!(format_hms(3600 * 123 + 45 * 60 + 6), "123:45:06");
    }
}
