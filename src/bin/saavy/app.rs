//! Saavy - application builder and runner

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use rtrb::RingBuffer;

use saavy_synth::{Engine, EngineConfig, PresetBank};

use super::ui::{UiApp, SCOPE_CAPACITY};

/// Main application builder
pub struct Saavy {
    max_voices: usize,
    preset: Option<String>,
}

impl Saavy {
    pub fn new() -> Self {
        Self {
            max_voices: EngineConfig::default().max_voices,
            preset: None,
        }
    }

    /// Set the polyphony
    pub fn voices(mut self, max_voices: usize) -> Self {
        self.max_voices = max_voices;
        self
    }

    /// Start on a named factory preset instead of the first one
    pub fn preset(mut self, name: impl Into<String>) -> Self {
        self.preset = Some(name.into());
        self
    }

    /// Run the application (takes over the terminal, plays audio)
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let engine_config = EngineConfig::default()
            .with_sample_rate(sample_rate)
            .with_max_voices(self.max_voices);
        let max_block = engine_config.max_block_size;
        let (mut engine, mut controller) = Engine::new(engine_config, PresetBank::factory())
            .wrap_err("failed to build synth engine")?;

        if let Some(name) = &self.preset {
            controller
                .select_preset_by_name(name)
                .wrap_err_with(|| format!("cannot start on preset {name:?}"))?;
        }

        // Output samples for the scope and spectrum; dropped when the UI lags
        let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_CAPACITY);
        let mut render_buf = vec![0.0f32; max_block];

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames_to_render = (total_frames - frames_written).min(max_block);
                    let block = &mut render_buf[..frames_to_render];

                    // Overruns and recoveries surface through the activity snapshot
                    engine.render_block(block);

                    // Copy to output (mono to all channels)
                    let out_off = frames_written * channels;
                    for (i, &s) in block.iter().enumerate() {
                        let frame = out_off + i * channels;
                        data[frame..frame + channels].fill(s);
                        let _ = scope_tx.push(s);
                    }

                    frames_written += frames_to_render;
                }
            },
            |err| log::error!("audio stream error: {err}"),
            None,
        )?;

        stream.play()?;
        log::info!("playing at {sample_rate} Hz on {channels} channels");

        let mut terminal = ratatui::init();
        let result = UiApp::new(controller, scope_rx, sample_rate).run(&mut terminal);
        ratatui::restore();

        drop(stream);
        result
    }
}

impl Default for Saavy {
    fn default() -> Self {
        Self::new()
    }
}
