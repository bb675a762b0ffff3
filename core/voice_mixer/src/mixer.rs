use crate::{
    clip::ClipLookup,
    constants::{PACKET_SIZE, Packet},
    playback::{PacketStep, Playback, VoiceId},
};

/// Outcome of one mix step.
#[derive(Debug, PartialEq)]
pub struct MixOutput<'a> {
    /// The clamped sum, or `None` when no voice produced a packet.
    pub packet: Option<&'a Packet>,
    /// Voices that reached end-of-stream this step, in input order.
    pub ended: Vec<VoiceId>,
}

/// Sums active voices into a single mono packet.
///
/// The mixer owns its output buffer and reuses it on every call. The packet
/// in a [`MixOutput`] borrows the mixer, so it must be released (or copied)
/// before the next [`Mixer::mix`] overwrites it.
#[derive(Debug)]
pub struct Mixer {
    output: Box<Packet>,
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

impl Mixer {
    pub fn new() -> Self {
        Self {
            output: Box::new([0.0; PACKET_SIZE]),
        }
    }

    /// Advances every voice by one packet and mixes the result.
    ///
    /// Each contributing packet is scaled by its voice volume, summed, then
    /// hard-clipped to `[-1.0, 1.0]`. A NaN sum comes out as silence.
    pub fn mix<'a, L: ClipLookup + ?Sized>(
        &'a mut self,
        voices: &mut [Playback],
        clips: &L,
    ) -> MixOutput<'a> {
        self.output.fill(0.0);
        let mut ended = Vec::new();
        let mut contributed = false;

        for voice in voices.iter_mut() {
            let id = voice.id();
            let volume = voice.volume();

            match voice.produce_next_packet(clips) {
                PacketStep::Packet(packet) => {
                    contributed = true;
                    for (out, sample) in self.output.iter_mut().zip(packet) {
                        *out += sample * volume;
                    }
                }
                PacketStep::Silent => {}
                PacketStep::Ended => ended.push(id),
            }
        }

        if !contributed {
            return MixOutput {
                packet: None,
                ended,
            };
        }

        for sample in self.output.iter_mut() {
            *sample = if sample.is_nan() {
                0.0
            } else {
                sample.clamp(-1.0, 1.0)
            };
        }

        MixOutput {
            packet: Some(&*self.output),
            ended,
        }
    }
}
