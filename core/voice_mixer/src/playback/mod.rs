use crate::{
    clip::ClipLookup,
    constants::{PACKET_SIZE, Packet},
};

pub mod voice_id;

pub use voice_id::VoiceId;

/// Result of advancing one voice by one packet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PacketStep<'a> {
    /// A full `PACKET_SIZE` packet, zero-padded at the tail if the clip ran out.
    Packet(&'a Packet),
    /// Paused, or the clip is missing or empty. Never means end-of-stream.
    Silent,
    /// The cursor is past the end of a non-looping clip.
    Ended,
}

impl PacketStep<'_> {
    pub fn is_ended(&self) -> bool {
        matches!(self, Self::Ended)
    }
}

/// Streaming state of a single voice.
///
/// The clip is referenced by name and resolved on every step, so removing a
/// clip from the registry turns its voices silent instead of failing them.
/// Such a voice never reports [`PacketStep::Ended`] and stays in the mix
/// until its owner drops it.
#[derive(Debug, Clone)]
pub struct Playback {
    id: VoiceId,
    clip_name: String,
    looping: bool,
    /// Disposal hint for the driver; never read by the streaming code.
    destroy_on_end: bool,
    paused: bool,
    volume: f32,
    read_position: usize,
    packet: Box<Packet>,
    has_packet: bool,
}

impl Playback {
    pub fn new(id: VoiceId, clip_name: impl Into<String>) -> Self {
        Self {
            id,
            clip_name: clip_name.into(),
            looping: false,
            destroy_on_end: true,
            paused: false,
            volume: 1.0,
            read_position: 0,
            packet: Box::new([0.0; PACKET_SIZE]),
            has_packet: false,
        }
    }

    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_destroy_on_end(mut self, destroy_on_end: bool) -> Self {
        self.destroy_on_end = destroy_on_end;
        self
    }

    pub fn paused(mut self) -> Self {
        self.paused = true;
        self
    }

    pub fn id(&self) -> VoiceId {
        self.id
    }

    pub fn clip_name(&self) -> &str {
        &self.clip_name
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    pub fn destroy_on_end(&self) -> bool {
        self.destroy_on_end
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// No range is enforced; values above 1.0 saturate harder in the mix.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    pub fn read_position(&self) -> usize {
        self.read_position
    }

    /// Rewinds the cursor to the first sample.
    pub fn restart(&mut self) {
        self.read_position = 0;
        self.has_packet = false;
    }

    /// The packet produced by the most recent step, if that step produced one.
    pub fn last_packet(&self) -> Option<&Packet> {
        self.has_packet.then_some(&*self.packet)
    }

    /// Advances the cursor by up to one packet.
    ///
    /// A looping voice that finds its cursor at the end rewinds and streams
    /// from sample 0 on the same call. The zero padding of a short final
    /// packet is always silence; the wrap happens on the next call.
    pub fn produce_next_packet<L: ClipLookup + ?Sized>(&mut self, clips: &L) -> PacketStep<'_> {
        self.has_packet = false;
        if self.paused {
            return PacketStep::Silent;
        }

        let Some(clip) = clips.lookup(&self.clip_name) else {
            return PacketStep::Silent;
        };
        let samples = clip.samples();
        if samples.is_empty() {
            return PacketStep::Silent;
        }

        if self.read_position >= samples.len() {
            if !self.looping {
                return PacketStep::Ended;
            }
            self.read_position = 0;
        }

        let start = self.read_position;
        let n = PACKET_SIZE.min(samples.len() - start);
        self.packet[..n].copy_from_slice(&samples[start..start + n]);
        self.packet[n..].fill(0.0);
        self.read_position += n;
        self.has_packet = true;

        PacketStep::Packet(&*self.packet)
    }

    /// Clip length in seconds, 0.0 if the clip is missing.
    pub fn duration<L: ClipLookup + ?Sized>(&self, clips: &L) -> f64 {
        clips
            .lookup(&self.clip_name)
            .map_or(0.0, |clip| clip.duration())
    }

    /// Cursor position in seconds, 0.0 if the clip is missing.
    pub fn current_time<L: ClipLookup + ?Sized>(&self, clips: &L) -> f64 {
        clips
            .lookup(&self.clip_name)
            .map_or(0.0, |clip| clip.seconds_at(self.read_position))
    }

    /// Fraction of the clip consumed, in `[0, 1]`.
    /// An empty or missing clip counts as fully at the start.
    pub fn progress<L: ClipLookup + ?Sized>(&self, clips: &L) -> f64 {
        match clips.lookup(&self.clip_name) {
            Some(clip) if !clip.is_empty() => {
                (self.read_position as f64 / clip.len() as f64).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod playback_tests {
    use std::{collections::HashMap, sync::Arc};

    use super::*;
    use crate::{clip::Clip, constants::SAMPLE_RATE};

    fn clips_with(name: &str, samples: Vec<f32>) -> HashMap<String, Arc<Clip>> {
        let mut table = HashMap::new();
        table.insert(
            name.to_owned(),
            Arc::new(Clip::new(name, SAMPLE_RATE, 1, samples)),
        );
        table
    }

    fn ramp(len: usize) -> Vec<f32> {
        (0..len).map(|i| i as f32 / len as f32).collect()
    }

    #[test]
    fn paused_voice_never_moves_or_ends() {
        let clips = clips_with("a", ramp(100));
        let mut voice = Playback::new(VoiceId(1), "a").paused();

        for _ in 0..10 {
            assert_eq!(voice.produce_next_packet(&clips), PacketStep::Silent);
            assert_eq!(voice.read_position(), 0);
        }
        assert!(voice.last_packet().is_none());

        voice.resume();
        assert!(matches!(
            voice.produce_next_packet(&clips),
            PacketStep::Packet(_)
        ));
        assert_eq!(voice.read_position(), 100);
    }

    #[test]
    fn voice_paused_at_end_of_clip_stays_silent() {
        let clips = clips_with("a", ramp(480));
        let mut voice = Playback::new(VoiceId(1), "a");

        assert!(matches!(
            voice.produce_next_packet(&clips),
            PacketStep::Packet(_)
        ));
        assert_eq!(voice.read_position(), 480);

        voice.pause();
        assert!(voice.is_paused());
        for _ in 0..10 {
            assert_eq!(voice.produce_next_packet(&clips), PacketStep::Silent);
            assert_eq!(voice.read_position(), 480);
        }

        voice.resume();
        assert!(voice.produce_next_packet(&clips).is_ended());
    }

    #[test]
    fn missing_or_empty_clip_is_silent_forever() {
        let clips = clips_with("empty", Vec::new());

        let mut missing = Playback::new(VoiceId(1), "nope");
        let mut empty = Playback::new(VoiceId(2), "empty");
        for _ in 0..5 {
            assert_eq!(missing.produce_next_packet(&clips), PacketStep::Silent);
            assert_eq!(empty.produce_next_packet(&clips), PacketStep::Silent);
        }
        assert_eq!(empty.read_position(), 0);
    }

    #[test]
    fn short_packet_is_zero_padded_to_full_size() {
        let samples = ramp(100);
        let clips = clips_with("a", samples.clone());
        let mut voice = Playback::new(VoiceId(1), "a");

        let PacketStep::Packet(packet) = voice.produce_next_packet(&clips) else {
            panic!("expected a packet");
        };
        assert_eq!(packet.len(), PACKET_SIZE);
        assert_eq!(&packet[..100], samples.as_slice());
        assert!(packet[100..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn non_looping_voice_ends_once_exhausted() {
        let clips = clips_with("a", ramp(960));
        let mut voice = Playback::new(VoiceId(7), "a");

        assert!(matches!(
            voice.produce_next_packet(&clips),
            PacketStep::Packet(_)
        ));
        assert_eq!(voice.read_position(), 480);
        assert!(matches!(
            voice.produce_next_packet(&clips),
            PacketStep::Packet(_)
        ));
        assert_eq!(voice.read_position(), 960);

        assert!(voice.produce_next_packet(&clips).is_ended());
        assert!(voice.produce_next_packet(&clips).is_ended());
        assert_eq!(voice.read_position(), 960);
        assert!(voice.last_packet().is_none());
    }

    #[test]
    fn looping_voice_wraps_without_a_silent_frame() {
        let samples = ramp(600);
        let clips = clips_with("a", samples.clone());
        let mut voice = Playback::new(VoiceId(1), "a").with_looping(true);

        voice.produce_next_packet(&clips);
        let PacketStep::Packet(tail) = voice.produce_next_packet(&clips) else {
            panic!("expected the tail packet");
        };
        // Padding stays silent even though looping is on.
        assert_eq!(&tail[..120], &samples[480..]);
        assert!(tail[120..].iter().all(|&s| s == 0.0));
        assert_eq!(voice.read_position(), 600);

        let PacketStep::Packet(wrapped) = voice.produce_next_packet(&clips) else {
            panic!("expected the loop to restart immediately");
        };
        assert_eq!(&wrapped[..], &samples[..480]);
        assert_eq!(voice.read_position(), 480);
    }

    #[test]
    fn loop_can_be_toggled_live() {
        let clips = clips_with("a", ramp(480));
        let mut voice = Playback::new(VoiceId(1), "a");

        voice.produce_next_packet(&clips);
        voice.set_looping(true);
        assert!(matches!(
            voice.produce_next_packet(&clips),
            PacketStep::Packet(_)
        ));

        voice.set_looping(false);
        assert!(voice.produce_next_packet(&clips).is_ended());
    }

    #[test]
    fn shrunken_clip_is_treated_as_exhausted() {
        let mut clips = clips_with("a", ramp(960));
        let mut voice = Playback::new(VoiceId(1), "a");
        voice.produce_next_packet(&clips);
        voice.produce_next_packet(&clips);

        clips.insert(
            "a".to_owned(),
            Arc::new(Clip::new("a", SAMPLE_RATE, 1, ramp(10))),
        );
        assert!(voice.produce_next_packet(&clips).is_ended());
    }

    #[test]
    fn restart_rewinds_cursor() {
        let clips = clips_with("a", ramp(100));
        let mut voice = Playback::new(VoiceId(1), "a");
        voice.produce_next_packet(&clips);
        assert!(voice.last_packet().is_some());

        voice.restart();
        assert_eq!(voice.read_position(), 0);
        assert!(voice.last_packet().is_none());
        assert!(matches!(
            voice.produce_next_packet(&clips),
            PacketStep::Packet(_)
        ));
    }

    #[test]
    fn time_queries_follow_cursor() {
        let clips = clips_with("a", vec![0.0; 96_000]);
        let mut voice = Playback::new(VoiceId(1), "a");
        assert_eq!(voice.duration(&clips), 2.0);
        assert_eq!(voice.progress(&clips), 0.0);

        for _ in 0..100 {
            voice.produce_next_packet(&clips);
        }
        assert_eq!(voice.read_position(), 48_000);
        assert_eq!(voice.current_time(&clips), 1.0);
        assert_eq!(voice.progress(&clips), 0.5);
    }

    #[test]
    fn progress_of_empty_or_missing_clip_is_zero() {
        let clips = clips_with("empty", Vec::new());
        assert_eq!(Playback::new(VoiceId(1), "empty").progress(&clips), 0.0);
        assert_eq!(Playback::new(VoiceId(2), "missing").progress(&clips), 0.0);
        assert_eq!(Playback::new(VoiceId(2), "missing").duration(&clips), 0.0);
        assert_eq!(Playback::new(VoiceId(2), "missing").current_time(&clips), 0.0);
    }
}
