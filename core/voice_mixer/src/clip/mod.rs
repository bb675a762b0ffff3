use std::{collections::HashMap, sync::Arc};

pub mod decode;
pub mod registry;

/// An immutable, decoded sample buffer registered under a unique name.
///
/// Samples are interleaved when `channel_count > 1`, but the mixer only
/// ever sees mono clips because registration rejects anything else.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    name: String,
    sample_rate: u32,
    channel_count: u16,
    samples: Vec<f32>,
}

impl Clip {
    pub fn new(
        name: impl Into<String>,
        sample_rate: u32,
        channel_count: u16,
        samples: Vec<f32>,
    ) -> Self {
        Self {
            name: name.into(),
            sample_rate,
            channel_count,
            samples,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Converts a sample index into seconds.
    /// Returns 0.0 when the clip has no usable rate.
    pub fn seconds_at(&self, sample_index: usize) -> f64 {
        let samples_per_second = f64::from(self.sample_rate) * f64::from(self.channel_count);
        if samples_per_second == 0.0 {
            return 0.0;
        }
        sample_index as f64 / samples_per_second
    }

    /// Length of the clip in seconds.
    pub fn duration(&self) -> f64 {
        self.seconds_at(self.samples.len())
    }
}

/// Read access to registered clips.
///
/// A `None` result is treated by playback exactly like an empty clip.
pub trait ClipLookup {
    fn lookup(&self, name: &str) -> Option<Arc<Clip>>;
}

impl ClipLookup for HashMap<String, Arc<Clip>> {
    fn lookup(&self, name: &str) -> Option<Arc<Clip>> {
        self.get(name).cloned()
    }
}

#[cfg(test)]
mod clip_tests {
    use super::*;
    use crate::constants::SAMPLE_RATE;

    #[test]
    fn duration_follows_rate_and_channels() {
        let clip = Clip::new("tone", SAMPLE_RATE, 1, vec![0.0; 96_000]);
        assert_eq!(clip.duration(), 2.0);
        assert_eq!(clip.seconds_at(24_000), 0.5);

        let stereo = Clip::new("tone", SAMPLE_RATE, 2, vec![0.0; 96_000]);
        assert_eq!(stereo.duration(), 1.0);
    }

    #[test]
    fn zero_rate_clip_reports_zero_duration() {
        let clip = Clip::new("broken", 0, 1, vec![0.5; 10]);
        assert_eq!(clip.duration(), 0.0);
        assert_eq!(clip.seconds_at(5), 0.0);
    }

    #[test]
    fn hash_map_lookup_resolves_by_name() {
        let mut table = HashMap::new();
        table.insert(
            "kick".to_owned(),
            Arc::new(Clip::new("kick", SAMPLE_RATE, 1, vec![1.0])),
        );

        assert_eq!(table.lookup("kick").map(|c| c.len()), Some(1));
        assert!(table.lookup("snare").is_none());
    }
}
