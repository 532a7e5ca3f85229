//! Basic transfer functions shared by the gain and voice paths.

/// Convert a decibel value to a linear multiplier: `10^(db/10)`.
///
/// All named gains are edited in dB and applied as linear multipliers, so
/// this is the single conversion point between the two domains.
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 10.0)
}

/// Inverse of [`db_to_linear`].
pub fn linear_to_db(linear: f32) -> f32 {
    10.0 * linear.log10()
}

/// MIDI note number to frequency in Hz (A4 = note 69 = 440 Hz).
pub fn midi_to_freq(note: f32) -> f32 {
    440.0 * 2.0_f32.powf((note - 69.0) / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unity_gain_is_zero_db() {
        assert_eq!(db_to_linear(0.0), 1.0);
        assert_relative_eq!(linear_to_db(1.0), 0.0);
    }

    #[test]
    fn db_round_trip() {
        // Full slider range, 1 dB steps
        for step in 0..=40 {
            let db = -(step as f32);
            assert_relative_eq!(linear_to_db(db_to_linear(db)), db, epsilon = 1e-4);
        }
    }

    #[test]
    fn attenuation_is_below_unity() {
        assert!(db_to_linear(-40.0) < db_to_linear(-20.0));
        assert!(db_to_linear(-20.0) < 1.0);
    }

    #[test]
    fn concert_pitch() {
        assert_relative_eq!(midi_to_freq(69.0), 440.0);
        assert_relative_eq!(midi_to_freq(81.0), 880.0, epsilon = 1e-3);
        assert_relative_eq!(midi_to_freq(57.0), 220.0, epsilon = 1e-3);
    }
}
