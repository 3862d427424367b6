//! TUI module for saavy
//!
//! Plays the synth from the computer keyboard and shows what the engine is
//! doing: voice activity, output spectrum and engine health.

mod spectrum;
mod status;
mod voices;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;
use std::time::{Duration, Instant};

use saavy_synth::{ActivitySnapshot, Controller, Param, Result as SynthResult, Waveform};

use spectrum::{render_spectrum, SpectrumAnalyzer};
use status::{render_status, AudioStats};
use voices::render_voices;

/// Samples kept for visualization (also the FFT size)
const VIS_BUFFER_SIZE: usize = 2048;

/// Capacity of the audio → UI sample ring
pub const SCOPE_CAPACITY: usize = VIS_BUFFER_SIZE * 8;

/// Terminals only report key presses, so a note is released once its key
/// has not repeated for this long.
const NOTE_HOLD: Duration = Duration::from_millis(350);

/// Two rows of a piano: white keys on the home row, black keys above.
const PIANO_KEYS: [char; 17] = [
    'a', 'w', 's', 'e', 'd', 'f', 't', 'g', 'y', 'h', 'u', 'j', 'k', 'o', 'l', 'p', ';',
];

const DEFAULT_OCTAVE: i8 = 4;
const CUTOFF_STEP: f32 = 1.12;
const AMOUNT_STEP: f32 = 0.05;

/// UI application state
pub struct UiApp {
    controller: Controller,
    /// Ring buffer receiver for output samples
    audio_rx: Consumer<f32>,
    audio_buffer: Vec<f32>,
    analyzer: SpectrumAnalyzer,
    activity: ActivitySnapshot,
    sample_rate: f32,
    octave: i8,
    /// Notes started from the keyboard and when their key last fired
    held: Vec<(u8, Instant)>,
    /// Last rejected command, shown in the status bar
    message: Option<String>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(controller: Controller, audio_rx: Consumer<f32>, sample_rate: f32) -> Self {
        Self {
            controller,
            audio_rx,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            analyzer: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate),
            activity: ActivitySnapshot::default(),
            sample_rate,
            octave: DEFAULT_OCTAVE,
            held: Vec::new(),
            message: None,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.activity = self.controller.activity();
            self.release_stale_notes();

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        let _ = self.controller.all_notes_off();
        Ok(())
    }

    /// Pull new output samples, keeping the last VIS_BUFFER_SIZE
    fn poll_audio(&mut self) {
        let mut received = false;
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
            received = true;
        }

        if received {
            if self.audio_buffer.len() > VIS_BUFFER_SIZE {
                let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
                self.audio_buffer.drain(0..excess);
            }
            self.analyzer.update(&self.audio_buffer);
        }
    }

    fn release_stale_notes(&mut self) {
        let now = Instant::now();
        let mut released = Vec::new();
        self.held.retain(|&(note, last)| {
            let stale = now.duration_since(last) > NOTE_HOLD;
            if stale {
                released.push(note);
            }
            !stale
        });
        for note in released {
            let result = self.controller.note_off(note);
            self.report(result);
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        let result = match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
                Ok(())
            }
            KeyCode::Char(c) if PIANO_KEYS.contains(&c) => self.play_key(c),
            KeyCode::Char('z') => {
                self.octave = (self.octave - 1).max(0);
                Ok(())
            }
            KeyCode::Char('x') => {
                self.octave = (self.octave + 1).min(8);
                Ok(())
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                self.controller.select_preset(index)
            }
            KeyCode::Tab => {
                let next = Waveform::ALL
                    [(self.controller.parameters().waveform.index() + 1) % Waveform::ALL.len()];
                self.controller.set_waveform(next)
            }
            KeyCode::Up => self.scale(Param::Cutoff, CUTOFF_STEP),
            KeyCode::Down => self.scale(Param::Cutoff, 1.0 / CUTOFF_STEP),
            KeyCode::Right => self.nudge(Param::Resonance, AMOUNT_STEP),
            KeyCode::Left => self.nudge(Param::Resonance, -AMOUNT_STEP),
            KeyCode::Char('+') | KeyCode::Char('=') => self.nudge(Param::Gain, AMOUNT_STEP),
            KeyCode::Char('-') => self.nudge(Param::Gain, -AMOUNT_STEP),
            KeyCode::Char(' ') => {
                self.held.clear();
                self.controller.all_notes_off()
            }
            KeyCode::Backspace => {
                self.held.clear();
                self.controller.reset()
            }
            _ => Ok(()),
        };
        self.report(result);
    }

    fn play_key(&mut self, key: char) -> SynthResult<()> {
        let Some(offset) = PIANO_KEYS.iter().position(|&k| k == key) else {
            return Ok(());
        };
        let note = (self.octave as i32 + 1) * 12 + offset as i32;
        let Ok(note) = u8::try_from(note) else {
            return Ok(());
        };

        let now = Instant::now();
        if let Some(entry) = self.held.iter_mut().find(|(n, _)| *n == note) {
            // Key repeat: keep holding
            entry.1 = now;
            return Ok(());
        }
        self.held.push((note, now));
        self.controller.note_on(note, 0.8)
    }

    fn nudge(&mut self, param: Param, delta: f32) -> SynthResult<()> {
        let value = self.controller.parameters().get(param) + delta;
        self.controller.set_parameter(param, value)
    }

    fn scale(&mut self, param: Param, factor: f32) -> SynthResult<()> {
        let value = self.controller.parameters().get(param) * factor;
        self.controller.set_parameter(param, value)
    }

    fn report(&mut self, result: SynthResult<()>) {
        if let Err(err) = result {
            self.message = Some(err.to_string());
        }
    }

    /// Render the UI
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Main layout: status, voices + spectrum, help
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // Status
                Constraint::Min(8),    // Voices and spectrum
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        let stats = AudioStats::from_buffer(&self.audio_buffer);
        render_status(frame, chunks[0], self, &stats);

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[1]);
        render_voices(frame, middle[0], &self.activity);
        render_spectrum(frame, middle[1], self.analyzer.data());

        let help = Paragraph::new(
            " [A-;] Play  [Z/X] Octave  [1-8] Preset  [Tab] Wave  [↑↓] Cutoff  [←→] Res  [+/-] Gain  [Space] Release  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[2]);
    }
}
