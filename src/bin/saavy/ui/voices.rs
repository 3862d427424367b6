//! Voice activity widget - one row per sounding voice

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use saavy_synth::{dsp::EnvelopeStage, ActivitySnapshot};

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Width of the level meter in cells
const METER_WIDTH: usize = 16;

fn note_name(note: u8) -> String {
    let octave = note as i32 / 12 - 1;
    format!("{}{}", NOTE_NAMES[note as usize % 12], octave)
}

fn meter(level: f32) -> String {
    let filled = (level.clamp(0.0, 1.0) * METER_WIDTH as f32).round() as usize;
    format!("{}{}", "█".repeat(filled), "·".repeat(METER_WIDTH - filled))
}

fn stage_color(stage: EnvelopeStage) -> Color {
    match stage {
        EnvelopeStage::Attack => Color::Green,
        EnvelopeStage::Decay => Color::Yellow,
        EnvelopeStage::Sustain => Color::Cyan,
        EnvelopeStage::Release => Color::Magenta,
        EnvelopeStage::Idle => Color::DarkGray,
    }
}

/// Render the voice table
pub fn render_voices(frame: &mut Frame, area: Rect, activity: &ActivitySnapshot) {
    let block = Block::default()
        .title(format!(
            " Voices {}/{} ",
            activity.active_voices, activity.pool_size
        ))
        .borders(Borders::ALL);

    let rows = activity.voices().iter().map(|voice| {
        let color = stage_color(voice.stage);
        Row::new(vec![
            Cell::from(format!("{:>2}", voice.slot)),
            Cell::from(note_name(voice.note)),
            Cell::from(format!("{:.2}", voice.velocity)),
            Cell::from(format!("{:?}", voice.stage)).style(Style::default().fg(color)),
            Cell::from(meter(voice.level)).style(Style::default().fg(color)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Length(8),
            Constraint::Length(METER_WIDTH as u16),
        ],
    )
    .header(
        Row::new(vec!["#", "Note", "Vel", "Stage", "Level"])
            .style(Style::default().fg(Color::DarkGray)),
    )
    .block(block);

    frame.render_widget(table, area);
}
