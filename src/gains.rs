//! Named decibel gains applied through smoothed linear multipliers.
//!
//! A [`GainRegistry`] maps slider names to graph output stages. The UI or
//! relay edits gains in dB through a [`GainControl`] handle; once per audio
//! block [`GainRegistry::apply`] ticks each backing smoother and writes the
//! smoothed value, converted to linear, into the stage's [`GainNode`]. A
//! stage therefore never sees the raw slider value, only the smoothed one.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::error::ControlError;
use crate::smoother::{Smoother, SmootherHandle};
use crate::transfer::db_to_linear;

/// Legal slider range in dB.
pub const GAIN_DB_MIN: f32 = -40.0;
pub const GAIN_DB_MAX: f32 = 0.0;

/// Shared linear-amplitude cell read by an audio-graph stage.
///
/// The registry is the sole writer; stages multiply by [`GainNode::amp`]
/// when rendering. Cloning shares the cell.
#[derive(Debug, Clone)]
pub struct GainNode {
    amp: Arc<AtomicU32>,
}

impl GainNode {
    /// New node at unity gain. The registry overwrites the amplitude with
    /// the smoothed value of its entry on every `apply`.
    pub fn new() -> Self {
        Self {
            amp: Arc::new(AtomicU32::new(1.0_f32.to_bits())),
        }
    }

    /// Current linear multiplier.
    #[inline]
    pub fn amp(&self) -> f32 {
        f32::from_bits(self.amp.load(Ordering::Acquire))
    }

    fn store(&self, amp: f32) {
        self.amp.store(amp.to_bits(), Ordering::Release);
    }
}

impl Default for GainNode {
    fn default() -> Self {
        Self::new()
    }
}

struct GainEntry {
    name: String,
    smoother: Smoother,
    node: GainNode,
}

/// Registry of named gains, owned by the audio-side mixer.
///
/// Entries are registered once at graph construction and live until the
/// graph is torn down. Mutation after construction goes through smoother
/// targets only, so a [`GainControl`] snapshot stays valid for the graph's
/// whole lifetime.
pub struct GainRegistry {
    entries: Vec<GainEntry>,
    index: HashMap<String, usize>,
}

impl GainRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a named gain once. `initial_db` must already lie in the
    /// legal range; out-of-range defaults fail fast rather than clamp.
    pub fn register(&mut self, name: &str, node: GainNode, initial_db: f32) -> Result<(), ControlError> {
        if self.index.contains_key(name) {
            return Err(ControlError::DuplicateName(name.to_string()));
        }
        if !(GAIN_DB_MIN..=GAIN_DB_MAX).contains(&initial_db) {
            return Err(ControlError::InvalidRange {
                value: initial_db,
                min: GAIN_DB_MIN,
                max: GAIN_DB_MAX,
            });
        }
        node.store(db_to_linear(initial_db));
        self.index.insert(name.to_string(), self.entries.len());
        self.entries.push(GainEntry {
            name: name.to_string(),
            smoother: Smoother::with_default_time(initial_db),
            node,
        });
        Ok(())
    }

    /// Set a gain target in dB. The value is clamped into the legal range
    /// and handed to the entry's smoother; the clamped value is returned.
    pub fn set_db(&self, name: &str, db: f32) -> Result<f32, ControlError> {
        let entry = self.entry(name)?;
        let db = db.clamp(GAIN_DB_MIN, GAIN_DB_MAX);
        entry.smoother.set_target(db);
        Ok(db)
    }

    /// The gain target in dB, as shown on a slider.
    pub fn db(&self, name: &str) -> Result<f32, ControlError> {
        Ok(self.entry(name)?.smoother.target())
    }

    /// Registered names, sorted, for UI rendering.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.iter().map(|e| e.name.clone()).collect();
        names.sort();
        names
    }

    /// Advance every smoother by `dt` seconds and write the smoothed dB
    /// values, converted to linear, into the stage nodes. Called once per
    /// audio block before the graph renders.
    pub fn apply(&mut self, dt: f32) {
        for entry in &mut self.entries {
            let db = entry.smoother.tick(dt);
            entry.node.store(db_to_linear(db));
        }
    }

    /// Snapshot a control-side handle over all registered entries.
    pub fn controls(&self) -> GainControl {
        let mut slots: Vec<GainSlot> = self
            .entries
            .iter()
            .map(|e| GainSlot {
                name: e.name.clone(),
                handle: e.smoother.handle(),
            })
            .collect();
        slots.sort_by(|a, b| a.name.cmp(&b.name));
        GainControl {
            slots: Arc::new(slots),
        }
    }

    fn entry(&self, name: &str) -> Result<&GainEntry, ControlError> {
        self.index
            .get(name)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| ControlError::UnknownName(name.to_string()))
    }
}

impl Default for GainRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct GainSlot {
    name: String,
    handle: SmootherHandle,
}

/// Control-side view of a registry: names plus lock-free dB setters.
/// Cloneable; stays tied to the graph it was snapshotted from.
#[derive(Debug, Clone)]
pub struct GainControl {
    slots: Arc<Vec<GainSlot>>,
}

impl GainControl {
    /// Set a gain target in dB (clamped). Returns the clamped value.
    pub fn set_db(&self, name: &str, db: f32) -> Result<f32, ControlError> {
        let slot = self.slot(name)?;
        let db = db.clamp(GAIN_DB_MIN, GAIN_DB_MAX);
        slot.handle.set_target(db);
        Ok(db)
    }

    /// The gain target in dB.
    pub fn db(&self, name: &str) -> Result<f32, ControlError> {
        Ok(self.slot(name)?.handle.target())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    fn slot(&self, name: &str) -> Result<&GainSlot, ControlError> {
        self.slots
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ControlError::UnknownName(name.to_string()))
    }
}
