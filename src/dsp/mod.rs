//! Per-sample DSP stages used by the feedback graphs.

mod compressor;
mod delay;
mod noise;

pub use compressor::Compressor;
pub use delay::FeedbackDelay;
pub use noise::Noise;
