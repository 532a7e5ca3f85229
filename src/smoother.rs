//! Smoothed control values for click-free parameter changes.
//!
//! Any control signal written directly into a running synthesis graph
//! produces a discontinuity audible as a click. Every mutable audio
//! parameter in this crate is therefore routed through a [`Smoother`]: the
//! control side stores a target, and the audio side advances the current
//! value toward it once per block with an exponential ramp.
//!
//! The pending target lives in a single `AtomicU32` (f32 bits), so a
//! [`SmootherHandle`] on the UI or relay thread can retarget the smoother
//! without locks and without the audio thread ever observing a torn value:
//! each `tick` sees either the old target or the new one, fully written.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Default response time, in seconds. Good for most parameters; gains that
/// ride a gesture use a longer constant (see the wind graph).
pub const DEFAULT_TIME_CONSTANT: f32 = 0.025;

/// Once the current value is this close to the target, snap to it. Avoids
/// denormal crawl near convergence.
const SNAP_EPSILON: f32 = 1e-6;

/// Exponentially smoothed scalar. Owned by the audio side; retargeted from
/// anywhere via [`SmootherHandle`].
#[derive(Debug)]
pub struct Smoother {
    current: f32,
    time_constant: f32,
    target: Arc<AtomicU32>,
}

/// Cheap cloneable write handle to a smoother's target.
#[derive(Debug, Clone)]
pub struct SmootherHandle {
    target: Arc<AtomicU32>,
}

impl Smoother {
    /// Create a smoother resting at `initial` with the given time constant
    /// in seconds (time to cover ~63% of the remaining distance).
    pub fn new(initial: f32, time_constant: f32) -> Self {
        Self {
            current: initial,
            time_constant,
            target: Arc::new(AtomicU32::new(initial.to_bits())),
        }
    }

    /// Create a smoother with the default 25 ms response.
    pub fn with_default_time(initial: f32) -> Self {
        Self::new(initial, DEFAULT_TIME_CONSTANT)
    }

    /// Handle for retargeting from the control side.
    pub fn handle(&self) -> SmootherHandle {
        SmootherHandle {
            target: Arc::clone(&self.target),
        }
    }

    /// Store a new target. Equivalent to writing through a handle.
    pub fn set_target(&self, value: f32) {
        self.target.store(value.to_bits(), Ordering::Release);
    }

    /// The target currently being approached.
    pub fn target(&self) -> f32 {
        f32::from_bits(self.target.load(Ordering::Acquire))
    }

    /// Advance the current value toward the target over `dt` seconds and
    /// return it. Called once per control/audio tick by the consumer.
    pub fn tick(&mut self, dt: f32) -> f32 {
        let target = self.target();
        if self.time_constant <= 0.0 {
            self.current = target;
            return self.current;
        }
        let coeff = 1.0 - (-dt.max(0.0) / self.time_constant).exp();
        self.current += (target - self.current) * coeff;
        if (self.current - target).abs() < SNAP_EPSILON {
            self.current = target;
        }
        self.current
    }

    /// The most recently ticked value.
    pub fn current(&self) -> f32 {
        self.current
    }

    /// True while the current value has not yet reached the target.
    pub fn is_smoothing(&self) -> bool {
        self.current != self.target()
    }
}

impl SmootherHandle {
    /// Store a new target for the owning smoother. Lock-free; safe to call
    /// from any thread while the audio side is ticking.
    pub fn set_target(&self, value: f32) {
        self.target.store(value.to_bits(), Ordering::Release);
    }

    /// The pending target (used by the dashboard to display slider values).
    pub fn target(&self) -> f32 {
        f32::from_bits(self.target.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DT: f32 = 512.0 / 44_100.0; // one block at 44.1 kHz

    #[test]
    fn rests_at_initial_value() {
        let mut s = Smoother::with_default_time(0.5);
        assert_eq!(s.current(), 0.5);
        assert_eq!(s.tick(DT), 0.5);
        assert!(!s.is_smoothing());
    }

    #[test]
    fn converges_to_last_target() {
        let mut s = Smoother::with_default_time(0.0);
        s.set_target(1.0);
        for _ in 0..200 {
            s.tick(DT);
        }
        assert_relative_eq!(s.current(), 1.0, epsilon = 1e-5);
        assert!(!s.is_smoothing());
    }

    #[test]
    fn distance_to_target_never_grows() {
        let mut s = Smoother::with_default_time(0.0);
        s.set_target(-3.0);
        let mut dist = (s.current() - (-3.0_f32)).abs();
        for _ in 0..500 {
            s.tick(DT);
            let d = (s.current() - (-3.0_f32)).abs();
            assert!(d <= dist);
            dist = d;
        }
    }

    #[test]
    fn step_is_bounded_by_time_constant() {
        let mut s = Smoother::new(0.0, 0.1);
        s.set_target(1.0);
        let coeff = 1.0 - (-DT / 0.1_f32).exp();
        let before = s.current();
        let after = s.tick(DT);
        assert_relative_eq!(after - before, (1.0 - before) * coeff, epsilon = 1e-6);
    }

    #[test]
    fn retarget_mid_ramp() {
        let mut s = Smoother::with_default_time(0.0);
        s.set_target(1.0);
        for _ in 0..5 {
            s.tick(DT);
        }
        let mid = s.current();
        assert!(mid > 0.0 && mid < 1.0);

        s.set_target(0.0);
        for _ in 0..500 {
            s.tick(DT);
        }
        assert_relative_eq!(s.current(), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn handle_retargets_across_threads() {
        let mut s = Smoother::with_default_time(0.0);
        let handle = s.handle();

        let writer = std::thread::spawn(move || {
            handle.set_target(0.25);
        });
        writer.join().unwrap();

        for _ in 0..500 {
            s.tick(DT);
        }
        assert_relative_eq!(s.current(), 0.25, epsilon = 1e-5);
    }

    #[test]
    fn zero_time_constant_snaps() {
        let mut s = Smoother::new(0.0, 0.0);
        s.set_target(2.0);
        assert_eq!(s.tick(DT), 2.0);
    }
}
