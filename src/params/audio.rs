//! Audio analysis and playback configuration.

use clap::ValueEnum;
use serde::Deserialize;

use crate::error::ConfigError;

/// Analysis window length (samples per chunk)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
pub enum WindowSize {
    /// 1024 samples (≈23 ms @ 44.1 kHz)
    #[default]
    #[value(name = "1024")]
    #[serde(rename = "1024")]
    Ws1024,

    /// 2048 samples (≈46 ms @ 44.1 kHz)
    #[value(name = "2048")]
    #[serde(rename = "2048")]
    Ws2048,

    /// 4096 samples (≈93 ms @ 44.1 kHz)
    #[value(name = "4096")]
    #[serde(rename = "4096")]
    Ws4096,
}

impl WindowSize {
    pub fn samples(self) -> usize {
        match self {
            Self::Ws1024 => 1024,
            Self::Ws2048 => 2048,
            Self::Ws4096 => 4096,
        }
    }
}

/// Audio feature extraction and playback parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AudioConfig {
    /// Samples per analysis chunk
    pub window_size: WindowSize,

    /// Drift between output cursor and transport clock that forces a resync (ms)
    pub output_resync_ms: u64,

    /// Transport seek step for the arrow keys (ms)
    pub seek_step_ms: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            window_size: WindowSize::Ws1024,
            output_resync_ms: 60,
            seek_step_ms: 5000,
        }
    }
}

impl AudioConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seek_step_ms > i64::MAX as u64 {
            return Err(ConfigError::invalid("audio.seek_step_ms", "out of range"));
        }
        if self.output_resync_ms == 0 {
            return Err(ConfigError::invalid("audio.output_resync_ms", "must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_sizes() {
        assert_eq!(WindowSize::Ws1024.samples(), 1024);
        assert_eq!(WindowSize::Ws2048.samples(), 2048);
        assert_eq!(WindowSize::Ws4096.samples(), 4096);
        assert_eq!(WindowSize::default().samples(), 1024);
    }

    #[test]
    fn test_zero_resync_rejected() {
        let config = AudioConfig {
            output_resync_ms: 0,
            ..AudioConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
