//! # Aeolus - Interactive Audio Feedback Demo
//!
//! Aeolus is a small interactive procedural-audio demo: a real-time engine
//! drives a switchable feedback-synthesis graph (wind noise through filters,
//! a feedback delay, and a compressor), a polyphonic sample-voice pool, and
//! a registry of named, smoothed gains. A terminal dashboard and an OSC
//! relay provide the control surface.
//!
//! The design rule underneath everything: no control event ever writes a
//! live audio parameter directly. Gains and gesture inputs set smoother
//! targets; the audio callback advances the smoothers once per block and is
//! the only reader. That single gateway is what keeps slider drags and
//! network messages from clicking.
//!
//! ## Quick start
//!
//! ```rust
//! use aeolus::voices::{SampleTable, VoiceAllocator};
//!
//! // A pool of 4 voices on a 44.1 kHz engine.
//! let placeholder = SampleTable::silent(16, 44_100.0);
//! let mut pool = VoiceAllocator::new(4, placeholder, 44_100.0);
//!
//! // Triggering always succeeds; the least-recently-used voice is stolen
//! // when the pool is full.
//! let blip = SampleTable::new(vec![0.5; 64], 44_100.0);
//! let voice = pool.trigger(&blip, 1.0, 1.0);
//! assert_eq!(voice, 0);
//!
//! // Mix one output sample from all voices.
//! let sample = pool.mix();
//! assert!(sample != 0.0);
//! ```
//!
//! ## Offline rendering
//!
//! The wind graph runs engine-free too, which is how the `render`
//! subcommand and the integration tests drive it:
//!
//! ```rust
//! use aeolus::feedback::FeedbackMode;
//! use aeolus::mixer::Mixer;
//!
//! let mut mixer = Mixer::new(44_100.0, FeedbackMode::Wind, -6.0).unwrap();
//! mixer.reseed_noise(1);
//! mixer.controls().feedback.set_control(0.5, 0.5, 3.0);
//!
//! let mut block = vec![0.0f32; 512];
//! for _ in 0..10 {
//!     mixer.render_mono(&mut block);
//! }
//! assert!(block.iter().all(|s| s.is_finite()));
//! ```

pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod gains;
pub mod mixer;
pub mod monitor;
pub mod relay;
pub mod samples;
pub mod smoother;
pub mod transfer;
pub mod version;
pub mod voices;
pub mod wind;

pub use error::{ConfigError, ControlError, EngineError};
pub use feedback::FeedbackMode;
pub use gains::{GainControl, GainNode, GainRegistry};
pub use smoother::{Smoother, SmootherHandle};
pub use voices::{SampleTable, VoiceAllocator};
