//! Audio-side state shared with the stream callback.
//!
//! The engine owns a `Mixer` behind `Arc<Mutex<_>>`; the cpal callback locks
//! it once per block. Control-rate code never writes graph parameters
//! through the lock — gains and gestures go through smoother targets — but
//! voice triggers and mode switches are queued here so they land exactly on
//! a block boundary.

use std::collections::VecDeque;

use crate::error::ControlError;
use crate::feedback::{FeedbackControls, FeedbackGraph, FeedbackMode};
use crate::gains::{GainControl, GainNode, GainRegistry};
use crate::voices::{SampleTable, VoiceAllocator};

pub const VOICE_POOL_SIZE: usize = 8;
pub const DEFAULT_MASTER_DB: f32 = -6.0;

/// Queued voice trigger, drained at the top of each block.
pub struct TriggerCommand {
    pub table: SampleTable,
    pub gain: f32,
    pub rate: f32,
}

/// Control-side snapshot of the mixer's live handles. Invalidated by a mode
/// switch; fetch a fresh one afterwards.
#[derive(Clone)]
pub struct MixerControls {
    pub gains: GainControl,
    pub feedback: FeedbackControls,
}

pub struct Mixer {
    sample_rate: f32,
    gains: GainRegistry,
    voices: VoiceAllocator,
    voices_gain: GainNode,
    master_gain: GainNode,
    feedback: FeedbackGraph,
    pending: VecDeque<TriggerCommand>,
    scratch: Vec<f32>,
}

impl Mixer {
    pub fn new(
        sample_rate: f32,
        mode: FeedbackMode,
        master_db: f32,
    ) -> Result<Self, ControlError> {
        let mut gains = GainRegistry::new();
        let master_gain = GainNode::new();
        let voices_gain = GainNode::new();
        gains.register("master", master_gain.clone(), master_db)?;
        gains.register("voices", voices_gain.clone(), -3.0)?;
        let feedback = FeedbackGraph::build(mode, sample_rate, &mut gains)?;

        Ok(Self {
            sample_rate,
            gains,
            voices: VoiceAllocator::new(
                VOICE_POOL_SIZE,
                crate::samples::placeholder_table(sample_rate),
                sample_rate,
            ),
            voices_gain,
            master_gain,
            feedback,
            pending: VecDeque::new(),
            scratch: Vec::new(),
        })
    }

    /// Queue a voice trigger for the next block boundary.
    pub fn queue_trigger(&mut self, table: SampleTable, gain: f32, rate: f32) {
        self.pending.push_back(TriggerCommand { table, gain, rate });
    }

    /// Replace the feedback graph. Meant to be called with the stream
    /// paused: the old graph, its smoothers, and its gain entries are
    /// dropped before the new ones exist, so no stale writer can reach the
    /// replacement. Master and voice gains carry their current targets over.
    pub fn set_feedback(&mut self, mode: FeedbackMode) -> Result<(), ControlError> {
        let master_db = self.gains.db("master")?;
        let voices_db = self.gains.db("voices")?;

        self.feedback = FeedbackGraph::None;
        let mut gains = GainRegistry::new();
        gains.register("master", self.master_gain.clone(), master_db)?;
        gains.register("voices", self.voices_gain.clone(), voices_db)?;
        self.feedback = FeedbackGraph::build(mode, self.sample_rate, &mut gains)?;
        self.gains = gains;
        Ok(())
    }

    pub fn mode(&self) -> FeedbackMode {
        self.feedback.mode()
    }

    pub fn controls(&self) -> MixerControls {
        MixerControls {
            gains: self.gains.controls(),
            feedback: self.feedback.controls(),
        }
    }

    pub fn active_voices(&self) -> usize {
        self.voices.active_voices()
    }

    /// Seed the feedback graph's noise source. Test hook.
    pub fn reseed_noise(&mut self, seed: u64) {
        self.feedback.reseed_noise(seed);
    }

    /// Render one block of interleaved output. Drains pending triggers,
    /// advances every smoother once, renders voices plus the feedback graph,
    /// applies the master gain, and soft-clips.
    pub fn process_block<T>(&mut self, output: &mut [T], channels: usize)
    where
        T: cpal::SizedSample + cpal::FromSample<f32>,
    {
        let channels = channels.max(1);
        let frames = output.len() / channels;
        if frames == 0 {
            return;
        }

        while let Some(cmd) = self.pending.pop_front() {
            self.voices.trigger(&cmd.table, cmd.gain, cmd.rate);
        }

        let dt = frames as f32 / self.sample_rate;
        self.gains.apply(dt);

        self.scratch.resize(frames, 0.0);
        self.scratch.fill(0.0);
        self.voices.mix_into(&mut self.scratch);
        let voices_amp = self.voices_gain.amp();
        for s in self.scratch.iter_mut() {
            *s *= voices_amp;
        }
        self.feedback.render_into(&mut self.scratch);

        let master = self.master_gain.amp();
        for (frame, &s) in output.chunks_mut(channels).zip(self.scratch.iter()) {
            let v = T::from_sample((s * master).tanh());
            for out in frame.iter_mut() {
                *out = v;
            }
        }
    }

    /// Mono block render, used by the offline path and tests.
    pub fn render_mono(&mut self, buf: &mut [f32]) {
        self.process_block(buf, 1);
    }
}
