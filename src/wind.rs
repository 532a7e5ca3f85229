//! Wind-noise feedback graph.
//!
//! Fixed topology: white noise -> lowpass -> resonant bandpass -> smoothed
//! main gain -> feedback delay -> compressor -> output gain stage. Only
//! parameter values change at runtime, and every one of them arrives through
//! a [`Smoother`]; nothing writes a filter coefficient or gain directly from
//! a control event.
//!
//! A 2-D gesture input (x, y in [0,1]) plus a motion rate drive the graph
//! through nonlinear transfer functions: `tanh` compresses unbounded gesture
//! input into a bounded response, `exp` gives multiplicative frequency
//! control from an additive input.

use biquad::{Biquad, Coefficients, DirectForm1, ToHertz, Type};

use crate::dsp::{Compressor, FeedbackDelay, Noise};
use crate::error::ControlError;
use crate::gains::{GainNode, GainRegistry};
use crate::smoother::{Smoother, SmootherHandle};

/// Gain smoothing rides the gesture rate, so it gets a longer response than
/// the filter parameters.
const GAIN_TIME_CONSTANT: f32 = 0.1;

const DELAY_SECS: f32 = 0.4;
const DELAY_FEEDBACK: f32 = 0.2;

/// Smoother targets derived from one gesture sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindTargets {
    pub lp_cutoff: f32,
    pub freq: f32,
    pub q: f32,
    pub main_gain: f32,
}

/// Map a gesture `(x, y, rate)` to parameter targets. `x` and `y` are
/// clamped into [0, 1]; `rate` is already bounded by its `tanh`.
pub fn control_targets(x: f32, y: f32, rate: f32) -> WindTargets {
    let x = x.clamp(0.0, 1.0);
    let y = y.clamp(0.0, 1.0);
    WindTargets {
        lp_cutoff: (1.0 - (y * 2.0).tanh()) * 1000.0,
        freq: 1000.0 * ((x - 0.5) * 3.0).exp(),
        q: 2.0 * (1.0 - y),
        main_gain: rate.tanh() * 0.4,
    }
}

/// The wind graph proper. Owned by the mixer on the audio side; retargeted
/// from anywhere through [`WindControls`].
pub struct WindGraph {
    sample_rate: f32,
    noise: Noise,
    lowpass: DirectForm1<f32>,
    resonator: DirectForm1<f32>,
    delay: FeedbackDelay,
    compressor: Compressor,
    lp_cutoff: Smoother,
    freq: Smoother,
    q: Smoother,
    main_gain: Smoother,
    out_gain: GainNode,
}

/// Control-side write handle to a wind graph's smoothers. Cloneable; writes
/// after the owning graph is dropped land in orphaned targets and reach
/// nothing.
#[derive(Debug, Clone)]
pub struct WindControls {
    lp_cutoff: SmootherHandle,
    freq: SmootherHandle,
    q: SmootherHandle,
    main_gain: SmootherHandle,
}

impl WindGraph {
    /// Build the graph at `sample_rate` and register its output stage with
    /// the mixer's gain registry under the name `"wind"`.
    pub fn new(sample_rate: f32, gains: &mut GainRegistry) -> Result<Self, ControlError> {
        let out_gain = GainNode::new();
        gains.register("wind", out_gain.clone(), -6.0)?;

        let rest = control_targets(0.5, 0.5, 0.0);
        Ok(Self {
            sample_rate,
            noise: Noise::new(),
            lowpass: DirectForm1::<f32>::new(filter_coeffs(
                Type::LowPass,
                sample_rate,
                rest.lp_cutoff,
                0.707,
            )),
            resonator: DirectForm1::<f32>::new(filter_coeffs(
                Type::BandPass,
                sample_rate,
                rest.freq,
                rest.q,
            )),
            delay: FeedbackDelay::new(DELAY_SECS, DELAY_FEEDBACK, sample_rate),
            compressor: Compressor::feedback_tail(sample_rate),
            lp_cutoff: Smoother::with_default_time(rest.lp_cutoff),
            freq: Smoother::with_default_time(rest.freq),
            q: Smoother::with_default_time(rest.q),
            main_gain: Smoother::new(rest.main_gain, GAIN_TIME_CONSTANT),
            out_gain,
        })
    }

    /// Handle for the dashboard / relay side.
    pub fn controls(&self) -> WindControls {
        WindControls {
            lp_cutoff: self.lp_cutoff.handle(),
            freq: self.freq.handle(),
            q: self.q.handle(),
            main_gain: self.main_gain.handle(),
        }
    }

    /// Push gesture targets directly (offline render path).
    pub fn set_control(&self, x: f32, y: f32, rate: f32) {
        let t = control_targets(x, y, rate);
        self.lp_cutoff.set_target(t.lp_cutoff);
        self.freq.set_target(t.freq);
        self.q.set_target(t.q);
        self.main_gain.set_target(t.main_gain);
    }

    /// Advance all smoothers by `dt` seconds and refresh the filter
    /// coefficients. Called once per audio block, before any samples.
    pub fn begin_block(&mut self, dt: f32) {
        let lp_moving = self.lp_cutoff.is_smoothing();
        let res_moving = self.freq.is_smoothing() || self.q.is_smoothing();

        let lp_cutoff = self.lp_cutoff.tick(dt);
        let freq = self.freq.tick(dt);
        let q = self.q.tick(dt);
        self.main_gain.tick(dt);

        if lp_moving {
            self.lowpass
                .update_coefficients(filter_coeffs(Type::LowPass, self.sample_rate, lp_cutoff, 0.707));
        }
        if res_moving {
            self.resonator
                .update_coefficients(filter_coeffs(Type::BandPass, self.sample_rate, freq, q));
        }
    }

    /// Render one output sample.
    #[inline]
    pub fn process_sample(&mut self) -> f32 {
        let excitation = self.noise.process();
        let shaped = self.resonator.run(self.lowpass.run(excitation));
        let driven = shaped * self.main_gain.current() * 2.0;
        let wet = self.delay.process(driven);
        self.compressor.process(wet) * self.out_gain.amp()
    }

    /// Render a whole block: one smoother tick, then `buf.len()` samples
    /// summed into `buf`.
    pub fn render_into(&mut self, buf: &mut [f32]) {
        self.begin_block(buf.len() as f32 / self.sample_rate);
        for out in buf.iter_mut() {
            *out += self.process_sample();
        }
    }

    /// Replace the noise source with a seeded one. Test hook.
    pub fn reseed_noise(&mut self, seed: u64) {
        self.noise = Noise::with_seed(seed);
    }

    pub fn lp_cutoff(&self) -> f32 {
        self.lp_cutoff.current()
    }

    pub fn freq(&self) -> f32 {
        self.freq.current()
    }

    pub fn q(&self) -> f32 {
        self.q.current()
    }

    pub fn main_gain(&self) -> f32 {
        self.main_gain.current()
    }
}

impl WindControls {
    /// Map a gesture to smoother targets. Lock-free; callable from any
    /// thread while the graph renders.
    pub fn set_control(&self, x: f32, y: f32, rate: f32) {
        let t = control_targets(x, y, rate);
        self.lp_cutoff.set_target(t.lp_cutoff);
        self.freq.set_target(t.freq);
        self.q.set_target(t.q);
        self.main_gain.set_target(t.main_gain);
    }

    /// The targets currently pending, for dashboard display.
    pub fn targets(&self) -> WindTargets {
        WindTargets {
            lp_cutoff: self.lp_cutoff.target(),
            freq: self.freq.target(),
            q: self.q.target(),
            main_gain: self.main_gain.target(),
        }
    }
}

/// Biquad coefficients with the center frequency and Q clamped into the
/// filter's valid domain for this sample rate.
fn filter_coeffs(kind: Type<f32>, sample_rate: f32, f0: f32, q: f32) -> Coefficients<f32> {
    let f0 = f0.clamp(10.0, sample_rate * 0.45);
    let q = q.max(0.05);
    match Coefficients::<f32>::from_params(kind, sample_rate.hz(), f0.hz(), q) {
        Ok(c) => c,
        // Unreachable with clamped inputs; pass the signal through untouched.
        Err(_) => Coefficients {
            a1: 0.0,
            a2: 0.0,
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
        },
    }
}
