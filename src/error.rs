//! Error types for the control surface and the audio engine.
//!
//! Control errors are recoverable and reported back to whoever issued the
//! edit (dashboard or relay). Engine errors are fatal: a misconfigured audio
//! device is surfaced to the operator rather than retried, since retrying a
//! bad device produces repeated audible startup artifacts.

use thiserror::Error;

/// Errors from the named-parameter control surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlError {
    /// No gain or parameter is registered under this name.
    #[error("unknown parameter name {0:?}")]
    UnknownName(String),

    /// A gain was registered twice under the same name.
    #[error("parameter {0:?} is already registered")]
    DuplicateName(String),

    /// A registration-time value lies outside its documented domain.
    /// Runtime control inputs clamp instead; only defaults fail fast.
    #[error("value {value} outside legal range [{min}, {max}]")]
    InvalidRange { value: f32, min: f32, max: f32 },
}

/// Fatal audio-engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no audio output device found")]
    NoOutputDevice,

    #[error("audio output device {0:?} not found")]
    UnknownDevice(String),

    #[error("unsupported sample format {0}")]
    UnsupportedFormat(String),

    #[error("failed to enumerate audio devices: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("failed to read device name: {0}")]
    DeviceName(#[from] cpal::DeviceNameError),

    #[error("failed to query stream config: {0}")]
    StreamConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("failed to pause audio stream: {0}")]
    PauseStream(#[from] cpal::PauseStreamError),

    #[error(transparent)]
    Control(#[from] ControlError),
}

/// Errors loading the demo configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}
