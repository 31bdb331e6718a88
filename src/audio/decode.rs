//! WAV decoding into a normalized mono waveform.

use std::io::Read;
use std::path::Path;

use hound::{SampleFormat, WavReader};
use log::debug;

use super::features::Waveform;
use crate::error::AudioError;

/// Decode a WAV file from disk
pub fn decode_wav(path: &Path) -> Result<Waveform, AudioError> {
    let reader = WavReader::open(path)?;
    decode_reader(reader)
}

/// Decode a WAV stream from any reader
pub fn decode_wav_from<R: Read>(source: R) -> Result<Waveform, AudioError> {
    let reader = WavReader::new(source)?;
    decode_reader(reader)
}

fn decode_reader<R: Read>(reader: WavReader<R>) -> Result<Waveform, AudioError> {
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(AudioError::NoChannels);
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Int => {
            let full_scale = full_scale_divisor(spec.bits_per_sample);
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| (v as f32 / full_scale).clamp(-1.0, 1.0)))
                .collect::<Result<_, _>>()?
        }
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(|v| v.clamp(-1.0, 1.0)))
            .collect::<Result<_, _>>()?,
    };

    let mono = downmix(&interleaved, channels);
    debug!(
        "Decoded {} frames ({} ch, {} bit, {} Hz)",
        mono.len(),
        channels,
        spec.bits_per_sample,
        spec.sample_rate
    );

    Ok(Waveform::new(mono, spec.sample_rate))
}

/// 2^(bits - 1): 32768 for 16-bit, 8388608 for 24-bit
pub fn full_scale_divisor(bits_per_sample: u16) -> f32 {
    (1u64 << (bits_per_sample.saturating_sub(1))) as f32
}

/// Average interleaved frames down to one channel
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode_int(channels: u16, bits: u16, samples: &[i32]) -> Cursor<Vec<u8>> {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 8000,
            bits_per_sample: bits,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.set_position(0);
        cursor
    }

    #[test]
    fn test_full_scale_divisor() {
        assert_eq!(full_scale_divisor(8), 128.0);
        assert_eq!(full_scale_divisor(16), 32768.0);
        assert_eq!(full_scale_divisor(24), 8_388_608.0);
    }

    #[test]
    fn test_16_bit_mono_normalization() {
        let wav = encode_int(1, 16, &[0, 16384, -32768, 32767]);
        let waveform = decode_wav_from(wav).unwrap();

        assert_eq!(waveform.sample_rate_hz(), 8000);
        assert_eq!(waveform.samples()[0], 0.0);
        assert_eq!(waveform.samples()[1], 0.5);
        assert_eq!(waveform.samples()[2], -1.0);
        assert!((waveform.samples()[3] - 32767.0 / 32768.0).abs() < 1e-7);
    }

    #[test]
    fn test_24_bit_uses_own_full_scale() {
        let wav = encode_int(1, 24, &[4_194_304]);
        let waveform = decode_wav_from(wav).unwrap();
        assert_eq!(waveform.samples(), &[0.5]);
    }

    #[test]
    fn test_stereo_downmixed_to_mono() {
        // Frames: (L=16384, R=0), (L=-16384, R=-16384)
        let wav = encode_int(2, 16, &[16384, 0, -16384, -16384]);
        let waveform = decode_wav_from(wav).unwrap();

        assert_eq!(waveform.len(), 2);
        assert_eq!(waveform.samples()[0], 0.25);
        assert_eq!(waveform.samples()[1], -0.5);
    }

    #[test]
    fn test_float_samples_clipped() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for s in [0.25f32, 1.5, -2.0] {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.set_position(0);

        let waveform = decode_wav_from(cursor).unwrap();
        assert_eq!(waveform.samples(), &[0.25, 1.0, -1.0]);
    }

    #[test]
    fn test_garbage_input_is_an_error() {
        let result = decode_wav_from(Cursor::new(b"not a wav file".to_vec()));
        assert!(matches!(result, Err(AudioError::Decode(_))));
    }
}
