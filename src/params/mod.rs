//! Parameter definitions with units and documented semantics.
//!
//! All tuning constants live here with:
//! - Units (samples, Hz, milliseconds, latent-space distance)
//! - Documented ranges and meanings
//! - Validation where a bad value would break the real-time loop

mod audio;
mod navigator;
mod render;
mod settings;

// Re-export all types
pub use audio::{AudioConfig, WindowSize};
pub use navigator::{VolumeParams, WalkParams};
pub use render::{DevicePreference, DisplayConfig, FrameRate, GeneratorConfig, RecordingConfig};
pub use settings::Settings;
