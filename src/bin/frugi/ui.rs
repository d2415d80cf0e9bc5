//! Terminal front panel: key map, latched notes, engine settings and an
//! output meter.

use std::{sync::Arc, time::Duration};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    DefaultTerminal, Frame,
};

use frugi_dsp::engine::{BufferHalf, DmaBuffer, EngineConfig, MidiIn};

use super::keyboard::{note_name, Keyboard, KEY_MAP};

pub struct UiApp {
    keyboard: Keyboard,
    midi_in: MidiIn,
    buffer: Arc<DmaBuffer>,
    config: EngineConfig,
    voices: usize,
    should_quit: bool,
}

impl UiApp {
    pub fn new(midi_in: MidiIn, buffer: Arc<DmaBuffer>, config: EngineConfig, voices: usize) -> Self {
        Self {
            keyboard: Keyboard::new(),
            midi_in,
            buffer,
            config,
            voices,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;

            // ~60fps redraw for the meter
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        // Leave nothing latched behind
        let off = self.keyboard.release_all();
        self.midi_in.send(&off);
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Char(' ') => {
                let off = self.keyboard.release_all();
                self.midi_in.send(&off);
            }
            KeyCode::Char('z') => self.keyboard.octave_down(),
            KeyCode::Char('x') => self.keyboard.octave_up(),
            KeyCode::Char(c) => {
                if let Some(msg) = self.keyboard.press(c) {
                    self.midi_in.send(&msg);
                }
            }
            _ => {}
        }
    }

    /// Peak of whatever is sitting in the double buffer right now.
    fn output_peak(&self) -> f32 {
        let mut peak = 0.0f32;
        for half in [BufferHalf::Ping, BufferHalf::Pong] {
            for frame in 0..self.buffer.block_size() {
                let (l, r) = self.buffer.read_frame(half, frame);
                let level = (l.unsigned_abs().max(r.unsigned_abs())) as f32 / i32::MAX as f32;
                peak = peak.max(level);
            }
        }
        peak.min(1.0)
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Settings
                Constraint::Length(4), // Key map
                Constraint::Min(3),    // Held notes
                Constraint::Length(3), // Meter
                Constraint::Length(1), // Help
            ])
            .split(frame.area());

        self.render_settings(frame, chunks[0]);
        self.render_key_map(frame, chunks[1]);
        self.render_held(frame, chunks[2]);

        let meter = Gauge::default()
            .block(Block::default().title(" Output ").borders(Borders::ALL))
            .gauge_style(Style::default().fg(Color::Green))
            .ratio(self.output_peak() as f64);
        frame.render_widget(meter, chunks[3]);

        let help = Paragraph::new(" [keys] Latch note  [Z/X] Octave  [Space] All notes off  [Q] Quit")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[4]);
    }

    fn render_settings(&self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::styled(
                format!(" {:.1}kHz  ", self.config.sample_rate.hz() as f32 / 1000.0),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                format!("{} frames/block  ", self.config.block_size),
                Style::default().fg(Color::White),
            ),
            Span::styled(
                format!("{:.1}ms latency  ", self.config.block_period() * 1000.0),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                format!("{} voices  ", self.voices),
                Style::default().fg(Color::Magenta),
            ),
            Span::styled(
                format!("octave {}", self.keyboard.octave()),
                Style::default().fg(Color::Yellow),
            ),
        ]);

        let block = Block::default().title(" frugi ").borders(Borders::ALL);
        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    fn render_key_map(&self, frame: &mut Frame, area: Rect) {
        let row = |black: bool| {
            let spans: Vec<Span> = KEY_MAP
                .iter()
                .filter(|(_, s)| matches!(s % 12, 1 | 3 | 6 | 8 | 10) == black)
                .map(|(k, _)| Span::raw(format!(" {} ", k.to_ascii_uppercase())))
                .collect();
            Line::from(spans)
        };

        let block = Block::default().title(" Keys ").borders(Borders::ALL);
        frame.render_widget(Paragraph::new(vec![row(true), row(false)]).block(block), area);
    }

    fn render_held(&self, frame: &mut Frame, area: Rect) {
        let names: Vec<String> = self.keyboard.held().map(note_name).collect();
        let text = if names.is_empty() {
            Span::styled(" (none)", Style::default().fg(Color::DarkGray))
        } else {
            Span::styled(format!(" {}", names.join("  ")), Style::default().fg(Color::Green))
        };

        let block = Block::default().title(" Held ").borders(Borders::ALL);
        frame.render_widget(Paragraph::new(Line::from(text)).block(block), area);
    }
}
