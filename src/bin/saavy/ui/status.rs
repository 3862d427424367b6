//! Status panel - preset, sound parameters, output level and engine health

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::UiApp;

/// Output level for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    /// Compute audio stats from a buffer
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

/// Render the status panel
pub fn render_status(frame: &mut Frame, area: Rect, app: &UiApp, stats: &AudioStats) {
    let block = Block::default().title(" saavy ").borders(Borders::ALL);

    let preset = app.controller.current_preset();
    let params = preset.params;
    let activity = &app.activity;

    let preset_label = match app.controller.current_preset_index() {
        Some(index) => format!(" [{}] {}  ", index + 1, preset.name),
        None => format!(" {}  ", preset.name),
    };

    let sound = Line::from(vec![
        Span::styled(preset_label, Style::default().fg(Color::Cyan)),
        Span::styled(
            format!("{}  ", params.waveform),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!(
                "A {:.3}s D {:.3}s S {:.2} R {:.3}s  ",
                params.attack, params.decay, params.sustain, params.release
            ),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(
            format!("Cutoff {:.0} Hz  Res {:.2}  ", params.cutoff, params.resonance),
            Style::default().fg(Color::Green),
        ),
        Span::styled(
            format!("Gain {:.2}  Detune {:+.0}c", params.gain, params.detune),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let health_color = if activity.underruns > 0 || activity.recoveries > 0 {
        Color::Red
    } else {
        Color::DarkGray
    };

    let engine = Line::from(vec![
        Span::styled(
            format!(" Voices {}/{}  ", activity.active_voices, activity.pool_size),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("Octave {}  ", app.octave),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("{:.1}kHz  ", app.sample_rate / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}  ", stats.peak, stats.rms),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(
            format!(
                "Blocks {}  Underruns {}  Recoveries {}",
                activity.blocks_rendered, activity.underruns, activity.recoveries
            ),
            Style::default().fg(health_color),
        ),
    ]);

    let notice = Line::from(Span::styled(
        format!(" {}", app.message.as_deref().unwrap_or("")),
        Style::default().fg(Color::Red),
    ));

    let paragraph = Paragraph::new(vec![sound, engine, notice]).block(block);
    frame.render_widget(paragraph, area);
}
