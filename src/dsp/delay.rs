//! Feedback delay line over a circular buffer.

/// Fixed-time delay with feedback. The output is the wet (delayed) signal
/// only; the wind graph's delay stage feeds its input forward, not dry.
pub struct FeedbackDelay {
    buffer: Vec<f32>,
    write_pos: usize,
    feedback: f32,
}

impl FeedbackDelay {
    /// `delay_secs` of delay at `sample_rate`, recirculating `feedback` of
    /// the delayed signal back into the line.
    pub fn new(delay_secs: f32, feedback: f32, sample_rate: f32) -> Self {
        assert!(delay_secs > 0.0, "delay time must be greater than 0");
        let frames = (delay_secs * sample_rate).round().max(1.0) as usize;
        Self {
            buffer: vec![0.0; frames],
            write_pos: 0,
            feedback,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        // Buffer length equals the delay, so the slot about to be written
        // holds the sample from exactly one delay period ago.
        let delayed = self.buffer[self.write_pos];
        self.buffer[self.write_pos] = input + delayed * self.feedback;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
        delayed
    }

    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    pub fn delay_frames(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_returns_after_delay_period() {
        let mut delay = FeedbackDelay::new(0.001, 0.5, 8_000.0); // 8 frames
        assert_eq!(delay.delay_frames(), 8);

        assert_eq!(delay.process(1.0), 0.0);
        for _ in 0..7 {
            assert_eq!(delay.process(0.0), 0.0);
        }
        // One full period later the impulse comes back.
        assert_eq!(delay.process(0.0), 1.0);
        // After another period it recirculates at the feedback level.
        for _ in 0..7 {
            assert_eq!(delay.process(0.0), 0.0);
        }
        assert_eq!(delay.process(0.0), 0.5);
    }

    #[test]
    fn clear_silences_the_line() {
        let mut delay = FeedbackDelay::new(0.001, 0.2, 8_000.0);
        delay.process(1.0);
        delay.clear();
        for _ in 0..32 {
            assert_eq!(delay.process(0.0), 0.0);
        }
    }
}
