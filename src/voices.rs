//! Polyphonic sample playback with least-recently-used voice stealing.
//!
//! A fixed pool of monophonic voices shares the playback load. Triggering
//! always succeeds: when every voice is busy, the one that was triggered
//! longest ago is stopped and reused. Bounded polyphony over unbounded
//! voices — the oldest still-sounding note may be cut off, but resource
//! usage stays predictable.

use std::sync::Arc;

/// Immutable sample data shared across voices. The table outlives any voice
/// that references it.
#[derive(Debug, Clone)]
pub struct SampleTable {
    data: Arc<[f32]>,
    sample_rate: f32,
}

impl SampleTable {
    pub fn new(data: Vec<f32>, sample_rate: f32) -> Self {
        Self {
            data: data.into(),
            sample_rate,
        }
    }

    /// A silent table, used as the placeholder every voice is born with.
    pub fn silent(frames: usize, sample_rate: f32) -> Self {
        Self::new(vec![0.0; frames.max(1)], sample_rate)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Source sample rate of the table's data.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// True if both tables share the same underlying data.
    pub fn same_table(&self, other: &SampleTable) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

/// One monophonic playback voice.
#[derive(Debug)]
struct Voice {
    table: SampleTable,
    position: f32,
    step: f32,
    gain: f32,
    playing: bool,
    last_used: u64,
}

impl Voice {
    fn new(placeholder: SampleTable) -> Self {
        Self {
            table: placeholder,
            position: 0.0,
            step: 1.0,
            gain: 0.0,
            playing: false,
            last_used: 0,
        }
    }

    fn retrigger(&mut self, table: SampleTable, gain: f32, step: f32, stamp: u64) {
        // Stopping first means no dangling read of the old table mid-frame.
        self.playing = false;
        self.table = table;
        self.gain = gain;
        self.step = step;
        self.position = 0.0;
        self.playing = true;
        self.last_used = stamp;
    }

    /// Render one sample and advance. Linear interpolation keeps non-unity
    /// playback rates from stair-stepping.
    fn process(&mut self) -> f32 {
        if !self.playing {
            return 0.0;
        }
        let idx = self.position as usize;
        if idx >= self.table.len() {
            self.playing = false;
            return 0.0;
        }
        let data = self.table.data();
        let frac = self.position - idx as f32;
        let a = data[idx];
        let b = if idx + 1 < data.len() { data[idx + 1] } else { a };
        let sample = a + (b - a) * frac;
        self.position += self.step;
        sample * self.gain
    }
}

/// Fixed pool of voices with LRU stealing.
pub struct VoiceAllocator {
    voices: Vec<Voice>,
    clock: u64,
    engine_rate: f32,
}

impl VoiceAllocator {
    /// Create a pool of `pool_size` voices (>= 1), all bound to the given
    /// placeholder table and stopped. `engine_rate` is the output sample
    /// rate playback steps are computed against.
    pub fn new(pool_size: usize, placeholder: SampleTable, engine_rate: f32) -> Self {
        assert!(pool_size >= 1, "voice pool must hold at least one voice");
        let voices = (0..pool_size)
            .map(|_| Voice::new(placeholder.clone()))
            .collect();
        Self {
            voices,
            clock: 0,
            engine_rate,
        }
    }

    /// Trigger a table on the least-recently-used voice and return the pool
    /// index used. Ties resolve to the lowest index. Never fails: under full
    /// polyphony the oldest voice is stolen.
    pub fn trigger(&mut self, table: &SampleTable, gain: f32, rate: f32) -> usize {
        let mut oldest = 0;
        for i in 1..self.voices.len() {
            if self.voices[i].last_used < self.voices[oldest].last_used {
                oldest = i;
            }
        }

        self.clock += 1;
        let step = rate * table.sample_rate() / self.engine_rate;
        self.voices[oldest].retrigger(table.clone(), gain, step, self.clock);
        oldest
    }

    /// Sum one sample from every voice. Plain addition, not normalized:
    /// overall headroom is the master gain's responsibility.
    pub fn mix(&mut self) -> f32 {
        let mut out = 0.0;
        for voice in &mut self.voices {
            out += voice.process();
        }
        out
    }

    /// Sum a block of samples into `out` (additive).
    pub fn mix_into(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample += self.mix();
        }
    }

    /// Number of voices currently sounding.
    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.playing).count()
    }

    pub fn pool_size(&self) -> usize {
        self.voices.len()
    }

    /// The table a voice is currently bound to (diagnostics/tests).
    pub fn voice_table(&self, index: usize) -> &SampleTable {
        &self.voices[index].table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(value: f32) -> SampleTable {
        SampleTable::new(vec![value; 64], 44_100.0)
    }

    fn allocator(n: usize) -> VoiceAllocator {
        VoiceAllocator::new(n, SampleTable::silent(16, 44_100.0), 44_100.0)
    }

    #[test]
    fn fresh_pool_is_silent() {
        let mut pool = allocator(4);
        assert_eq!(pool.active_voices(), 0);
        for _ in 0..32 {
            assert_eq!(pool.mix(), 0.0);
        }
    }

    #[test]
    fn n_triggers_fill_n_distinct_voices() {
        let mut pool = allocator(4);
        let mut used = Vec::new();
        for i in 0..4 {
            used.push(pool.trigger(&table(i as f32), 1.0, 1.0));
        }
        used.sort();
        used.dedup();
        assert_eq!(used.len(), 4);
        assert_eq!(pool.active_voices(), 4);
    }

    #[test]
    fn trigger_beyond_pool_steals_exactly_one() {
        let mut pool = allocator(4);
        let mut first = Vec::new();
        for i in 0..4 {
            first.push(pool.trigger(&table(i as f32), 1.0, 1.0));
        }
        let stolen = pool.trigger(&table(9.0), 1.0, 1.0);
        assert!(first.contains(&stolen));
        assert_eq!(pool.active_voices(), 4);
    }

    #[test]
    fn ties_break_to_lowest_index() {
        let mut pool = allocator(3);
        // All stamps equal (zero) at start: index 0 must win.
        assert_eq!(pool.trigger(&table(1.0), 1.0, 1.0), 0);
        assert_eq!(pool.trigger(&table(2.0), 1.0, 1.0), 1);
        assert_eq!(pool.trigger(&table(3.0), 1.0, 1.0), 2);
    }

    #[test]
    fn mix_is_plain_sum() {
        let mut pool = allocator(2);
        pool.trigger(&table(0.25), 1.0, 1.0);
        pool.trigger(&table(0.5), 1.0, 1.0);
        assert!((pool.mix() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn gain_scales_voice_output() {
        let mut pool = allocator(1);
        pool.trigger(&table(1.0), 0.5, 1.0);
        assert!((pool.mix() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn voice_stops_at_table_end() {
        let mut pool = allocator(1);
        pool.trigger(&SampleTable::new(vec![1.0; 8], 44_100.0), 1.0, 1.0);
        for _ in 0..8 {
            pool.mix();
        }
        assert_eq!(pool.mix(), 0.0);
        assert_eq!(pool.active_voices(), 0);
    }

    #[test]
    fn rate_scales_playback_speed() {
        // Double rate exhausts the table in half the samples.
        let mut pool = allocator(1);
        pool.trigger(&SampleTable::new(vec![1.0; 8], 44_100.0), 1.0, 2.0);
        for _ in 0..4 {
            pool.mix();
        }
        assert_eq!(pool.active_voices(), 1);
        pool.mix();
        assert_eq!(pool.active_voices(), 0);
    }

    #[test]
    fn table_rate_mismatch_adjusts_step() {
        // A 22.05 kHz table on a 44.1 kHz engine plays at half step, so a
        // 4-frame table sustains for 8 output samples.
        let mut pool = allocator(1);
        pool.trigger(&SampleTable::new(vec![1.0; 4], 22_050.0), 1.0, 1.0);
        for _ in 0..8 {
            assert_ne!(pool.mix(), 0.0);
        }
        assert_eq!(pool.mix(), 0.0);
        assert_eq!(pool.active_voices(), 0);
    }
}
