use std::io::{Cursor, Read};

use hound::{SampleFormat, WavReader};
use thiserror::Error;

/// Raw output of a decoder, before it becomes a registered [`Clip`](super::Clip).
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub sample_rate: u32,
    pub channel_count: u16,
    pub samples: Vec<f32>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("no audio data to decode")]
    Empty,
    #[error("malformed audio data: {0}")]
    Malformed(String),
    #[error("unsupported channel count {0}")]
    UnsupportedChannels(u16),
    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),
}

impl From<hound::Error> for DecodeError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::Unsupported | hound::Error::TooWide => {
                Self::UnsupportedFormat(err.to_string())
            }
            other => Self::Malformed(other.to_string()),
        }
    }
}

/// Turns raw encoded bytes into mono `f32` samples.
pub trait AudioDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedAudio, DecodeError>;
}

/// Decodes RIFF/WAVE data into mono samples.
///
/// Supports:
/// - Mono and stereo files (stereo is averaged down to mono)
/// - 8/16/24/32-bit integer or 32-bit float samples (converted to `f32`)
///
/// Does NOT support:
/// - More than 2 channels
/// - Resampling; the sample rate is reported as found
#[derive(Debug, Default, Clone, Copy)]
pub struct WavDecoder;

impl WavDecoder {
    fn decode_reader<R: Read>(reader: WavReader<R>) -> Result<DecodedAudio, DecodeError> {
        let spec = reader.spec();
        if spec.channels == 0 || spec.channels > 2 {
            return Err(DecodeError::UnsupportedChannels(spec.channels));
        }

        let raw_samples = Self::decode_pcm_samples(reader)?;
        Ok(DecodedAudio {
            sample_rate: spec.sample_rate,
            channel_count: 1,
            samples: Self::downmix(raw_samples, spec.channels as usize),
        })
    }

    fn decode_pcm_samples<R: Read>(reader: WavReader<R>) -> Result<Vec<f32>, DecodeError> {
        let spec = reader.spec();
        match spec.sample_format {
            SampleFormat::Int => {
                let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|s| s as f32 / scale).map_err(DecodeError::from))
                    .collect()
            }
            SampleFormat::Float => reader
                .into_samples::<f32>()
                .map(|s| s.map_err(DecodeError::from))
                .collect(),
        }
    }

    /// Folds interleaved frames into a single channel.
    fn downmix(samples: Vec<f32>, channels: usize) -> Vec<f32> {
        match channels {
            1 => samples,
            _ => samples
                .chunks_exact(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                .collect(),
        }
    }
}

impl AudioDecoder for WavDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedAudio, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        let reader = WavReader::new(Cursor::new(bytes))?;
        Self::decode_reader(reader)
    }
}
