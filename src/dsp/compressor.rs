//! Dynamics compressor with a dB-domain envelope follower.

/// Feed-forward compressor. Gain reduction is computed in dB above the
/// threshold and smoothed by an attack/release envelope follower, so the
/// applied gain never jumps.
pub struct Compressor {
    threshold_db: f32,
    ratio: f32,
    attack_coeff: f32,
    release_coeff: f32,
    envelope_db: f32,
}

impl Compressor {
    pub fn new(
        threshold_db: f32,
        ratio: f32,
        attack_secs: f32,
        release_secs: f32,
        sample_rate: f32,
    ) -> Self {
        Self {
            threshold_db,
            ratio: ratio.max(1.0),
            attack_coeff: (-1.0 / (attack_secs.max(1e-4) * sample_rate)).exp(),
            release_coeff: (-1.0 / (release_secs.max(1e-4) * sample_rate)).exp(),
            envelope_db: 0.0,
        }
    }

    /// The limiter stage at the tail of the feedback graphs: -20 dB
    /// threshold, 2:1, 10 ms attack, 100 ms release.
    pub fn feedback_tail(sample_rate: f32) -> Self {
        Self::new(-20.0, 2.0, 0.01, 0.1, sample_rate)
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let level_db = 20.0 * input.abs().max(1e-10).log10();
        let over = level_db - self.threshold_db;
        let target_db = if over > 0.0 {
            -over * (1.0 - 1.0 / self.ratio)
        } else {
            0.0
        };

        // Attack when reduction deepens, release when it eases.
        let coeff = if target_db < self.envelope_db {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope_db = coeff * self.envelope_db + (1.0 - coeff) * target_db;

        input * 10.0_f32.powf(self.envelope_db / 20.0)
    }

    /// Current gain reduction in dB (<= 0).
    pub fn reduction_db(&self) -> f32 {
        self.envelope_db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transparent_below_threshold() {
        let mut comp = Compressor::new(-10.0, 4.0, 0.001, 0.01, 44_100.0);
        for _ in 0..1000 {
            let out = comp.process(0.05); // ~-26 dB, well under threshold
            assert!((out - 0.05).abs() < 1e-3);
        }
    }

    #[test]
    fn reduces_loud_signals() {
        let mut comp = Compressor::new(-20.0, 2.0, 0.001, 0.1, 44_100.0);
        let mut out = 0.0;
        for _ in 0..4_410 {
            out = comp.process(1.0);
        }
        assert!(out < 1.0);
        assert!(comp.reduction_db() < -1.0);
    }

    #[test]
    fn reduction_is_gradual_not_instant() {
        let mut comp = Compressor::new(-20.0, 4.0, 0.05, 0.1, 44_100.0);
        let first = comp.process(1.0);
        // With a 50 ms attack the very first sample is barely reduced.
        assert!(first > 0.95);
    }
}
