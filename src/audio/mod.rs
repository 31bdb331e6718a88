//! Audio decoding, playback-aligned feature extraction, and transport.
//!
//! The decode runs once per file on a background thread; the tick loop only
//! reads a finished `Waveform` and returns silence until one is available.

mod decode;
mod features;
mod loader;
mod output;
mod transport;

// Re-export public types
pub use decode::{decode_wav, decode_wav_from, downmix, full_scale_divisor};
pub use features::{compute_loudness, AudioChunk, FeatureExtractor, Waveform};
pub use loader::{LoadStatus, WaveformLoader};
pub use output::{AudioOutput, PlaybackCursor};
pub use transport::{format_time, PlayState, PlaybackState, SharedTransport, Transport};
