//! Spectrum widget
//!
//! Windowed FFT of the synth output, sampled at log-spaced frequencies and
//! drawn against a log frequency axis so each octave gets equal width.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::{f32::consts::PI, sync::Arc};

/// Points drawn across the frequency axis
const SPECTRUM_POINTS: usize = 64;

const MIN_FREQ: f64 = 20.0;
const FLOOR_DB: f64 = -100.0;

/// dB lost per UI frame once a peak stops being fed
const FALL_DB_PER_FRAME: f64 = 3.0;

pub struct SpectrumAnalyzer {
    /// Hann window, one coefficient per input sample
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// FFT bin read for each display point
    bins: Vec<usize>,
    /// (log10 Hz, dB) per display point, with falling peaks
    points: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    /// `fft_size` must match the length of the buffers given to `update`.
    pub fn new(fft_size: usize, sample_rate: f32) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(fft_size);

        let denom = fft_size.saturating_sub(1).max(1) as f32;
        let window = (0..fft_size)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / denom).cos()))
            .collect();

        let max_freq = (sample_rate as f64 / 2.0).min(20_000.0).max(MIN_FREQ * 2.0);
        let last_bin = (fft_size / 2).saturating_sub(1);
        let (bins, points) = (0..SPECTRUM_POINTS)
            .map(|i| {
                let t = i as f64 / (SPECTRUM_POINTS - 1) as f64;
                let freq = MIN_FREQ * (max_freq / MIN_FREQ).powf(t);
                let bin = (freq * fft_size as f64 / sample_rate as f64).round() as usize;
                (bin.min(last_bin), (freq.log10(), FLOOR_DB))
            })
            .unzip();

        Self {
            window,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); fft_size],
            bins,
            points,
        }
    }

    /// Analyze the newest samples. Buffers of the wrong length are ignored.
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        // Normalize so a full-scale sine lands near 0 dB
        let norm = 2.0 / self.window.len() as f32;
        for (point, &bin) in self.points.iter_mut().zip(&self.bins) {
            let magnitude = (self.scratch[bin].norm() * norm).max(1e-6) as f64;
            let db = (20.0 * magnitude.log10()).max(FLOOR_DB);
            point.1 = db.max(point.1 - FALL_DB_PER_FRAME);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.points
    }
}

/// Render the spectrum chart
pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(spectrum);

    let (min_x, max_x) = match (spectrum.first(), spectrum.last()) {
        (Some(first), Some(last)) => (first.0, last.0.max(first.0 + 1.0)),
        _ => (MIN_FREQ.log10(), 20_000f64.log10()),
    };

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([min_x, max_x])
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 6.0])
                .labels(vec!["-100", "-60", "-20", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
