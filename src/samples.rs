//! Sample loading and the built-in placeholder/ping tables.
//!
//! WAV files are loaded with hound, mono-ized, and cached by name. The
//! allocator's placeholder table and the synthesized startup/ping blip also
//! live here so the engine works with no sample directory configured.

use std::collections::HashMap;
use std::f32::consts::TAU;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::transfer::midi_to_freq;
use crate::voices::SampleTable;

/// Frames in the silent placeholder table.
const PLACEHOLDER_FRAMES: usize = 64;

/// The ping blip: pitch (MIDI note) and length in seconds.
const PING_NOTE: f32 = 81.0; // A5
const PING_SECONDS: f32 = 0.15;

/// Silent table every voice is bound to before its first trigger.
pub fn placeholder_table(sample_rate: f32) -> SampleTable {
    SampleTable::silent(PLACEHOLDER_FRAMES, sample_rate)
}

/// Hann-windowed sine blip used for the startup sound and relay pings.
pub fn ping_table(sample_rate: f32) -> SampleTable {
    let frames = (PING_SECONDS * sample_rate).round().max(2.0) as usize;
    let freq = midi_to_freq(PING_NOTE);
    let data: Vec<f32> = (0..frames)
        .map(|n| {
            let t = n as f32 / sample_rate;
            let window = 0.5 * (1.0 - (TAU * n as f32 / (frames - 1) as f32).cos());
            (TAU * freq * t).sin() * window * 0.8
        })
        .collect();
    SampleTable::new(data, sample_rate)
}

/// Directory-backed bank of named sample tables.
pub struct SampleBank {
    root: PathBuf,
    cache: HashMap<String, SampleTable>,
}

impl SampleBank {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: HashMap::new(),
        }
    }

    /// Get `<root>/<name>.wav`, loading and caching it on first use.
    /// Returns `None` when the file is missing or unreadable.
    pub fn get(&mut self, name: &str) -> Option<SampleTable> {
        if let Some(table) = self.cache.get(name) {
            return Some(table.clone());
        }
        let path = self.root.join(format!("{name}.wav"));
        match load_wav(&path) {
            Ok(table) => {
                info!("loaded sample {name:?} ({} frames)", table.len());
                self.cache.insert(name.to_string(), table.clone());
                Some(table)
            }
            Err(err) => {
                warn!("could not load sample {name:?} from {}: {err}", path.display());
                None
            }
        }
    }
}

/// Load a WAV file into a mono f32 table at its source sample rate.
/// Multi-channel files are averaged down to mono.
pub fn load_wav(path: &Path) -> Result<SampleTable, hound::Error> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()?
        }
    };

    let mono: Vec<f32> = if channels <= 1 {
        samples
    } else {
        samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    Ok(SampleTable::new(mono, spec.sample_rate as f32))
}
