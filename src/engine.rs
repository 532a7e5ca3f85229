//! Real-time audio output using cpal.
//!
//! The engine is an explicitly owned handle: `new` boots the device and
//! stream, `start`/`stop` map to stream play/pause, and dropping the engine
//! tears the stream down. Device and boot failures are fatal and surfaced to
//! the caller; they are never retried silently.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};
use tracing::{error, info};

use crate::error::EngineError;
use crate::feedback::FeedbackMode;
use crate::mixer::{Mixer, MixerControls};
use crate::samples::ping_table;
use crate::voices::SampleTable;

/// Boot parameters, resolved from config plus CLI flags.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Output device name; `None` picks the host default.
    pub device: Option<String>,
    pub mode: FeedbackMode,
    pub master_db: f32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            device: None,
            mode: FeedbackMode::default(),
            master_db: crate::mixer::DEFAULT_MASTER_DB,
        }
    }
}

pub struct AudioEngine {
    sample_rate: f32,
    mixer: Arc<Mutex<Mixer>>,
    stream: cpal::Stream,
}

impl AudioEngine {
    /// Boot the output device and start rendering. Plays a short startup
    /// ping through the voice pool so a silent boot is audibly distinct
    /// from a broken one.
    pub fn new(settings: &EngineSettings) -> Result<Self, EngineError> {
        let host = cpal::default_host();
        info!("audio host: {:?}", host.id());

        let device = match &settings.device {
            Some(name) => host
                .output_devices()?
                .find(|d| d.name().map(|n| &n == name).unwrap_or(false))
                .ok_or_else(|| EngineError::UnknownDevice(name.clone()))?,
            None => host
                .default_output_device()
                .ok_or(EngineError::NoOutputDevice)?,
        };
        info!("audio device: {}", device.name()?);

        let config = device.default_output_config()?;
        info!("audio config: {:?}", config);

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let mixer = Arc::new(Mutex::new(Mixer::new(
            sample_rate,
            settings.mode,
            settings.master_db,
        )?));
        let mixer_clone = mixer.clone();

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &config.into(), mixer_clone, channels)
            }
            cpal::SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &config.into(), mixer_clone, channels)
            }
            cpal::SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &config.into(), mixer_clone, channels)
            }
            other => return Err(EngineError::UnsupportedFormat(other.to_string())),
        }?;

        stream.play()?;
        info!("audio stream started at {} Hz", sample_rate);

        let engine = Self {
            sample_rate,
            mixer,
            stream,
        };
        engine.trigger(ping_table(sample_rate), 0.8, 1.0);
        Ok(engine)
    }

    fn build_stream<T>(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        mixer: Arc<Mutex<Mixer>>,
        channels: usize,
    ) -> Result<cpal::Stream, EngineError>
    where
        T: cpal::SizedSample + cpal::FromSample<f32>,
    {
        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let mut mixer = mixer.lock().unwrap();
                mixer.process_block(data, channels);
            },
            |err| error!("audio stream error: {}", err),
            None,
        )?;
        Ok(stream)
    }

    pub fn start(&self) -> Result<(), EngineError> {
        self.stream.play()?;
        Ok(())
    }

    pub fn stop(&self) -> Result<(), EngineError> {
        self.stream.pause()?;
        Ok(())
    }

    /// Switch the feedback graph. The stream is paused for the swap so the
    /// callback never renders a half-built graph, then resumed.
    pub fn set_feedback(&self, mode: FeedbackMode) -> Result<(), EngineError> {
        info!("switching feedback mode to {}", mode);
        self.stream.pause()?;
        {
            let mut mixer = self.mixer.lock().unwrap();
            mixer.set_feedback(mode)?;
        }
        self.stream.play()?;
        Ok(())
    }

    /// Queue a sample trigger; it lands on the next block boundary.
    pub fn trigger(&self, table: SampleTable, gain: f32, rate: f32) {
        let mut mixer = self.mixer.lock().unwrap();
        mixer.queue_trigger(table, gain, rate);
    }

    /// Fresh control-side handles. Re-fetch after every mode switch.
    pub fn controls(&self) -> MixerControls {
        self.mixer.lock().unwrap().controls()
    }

    pub fn mode(&self) -> FeedbackMode {
        self.mixer.lock().unwrap().mode()
    }

    pub fn active_voices(&self) -> usize {
        self.mixer.lock().unwrap().active_voices()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

/// Names of the available output devices, for `aeolus devices`.
pub fn list_output_devices() -> Result<Vec<String>, EngineError> {
    let host = cpal::default_host();
    let mut names = Vec::new();
    for device in host.output_devices()? {
        names.push(device.name()?);
    }
    Ok(names)
}
