//! Error types for each subsystem.
//!
//! Nothing in the steady-state tick path propagates these to the caller;
//! they surface at load time, at sinks, and at startup.

use std::path::PathBuf;

use thiserror::Error;

/// Failures while decoding, loading, or playing audio
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("WAV decode failed: {0}")]
    Decode(#[from] hound::Error),

    #[error("WAV stream declares zero channels")]
    NoChannels,

    #[error("failed to spawn decode thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("decode thread exited without a result")]
    Disconnected,

    #[error("audio output unavailable: {0}")]
    Output(String),
}

/// Failures inside the generator boundary
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("tensor backend error: {0}")]
    Backend(#[from] candle_core::Error),

    #[error("latent has dimension {actual}, generator expects {expected}")]
    LatentDim { expected: usize, actual: usize },

    #[error("generator returned {actual} values for a {channels}x{height}x{width} image")]
    TensorShape {
        channels: usize,
        height: usize,
        width: usize,
        actual: usize,
    },
}

/// Invalid or unreadable configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Failures publishing a frame to an output sink
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encode failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Failures setting up or driving the on-screen display
#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter found")]
    NoAdapter,

    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoFormat,
}
