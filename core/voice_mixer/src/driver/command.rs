use rtrb::{Consumer, Producer, RingBuffer};

use crate::playback::{Playback, VoiceId};

/// Control messages for a [`MixDriver`](super::MixDriver), applied at the
/// start of the next tick.
#[derive(Debug)]
pub enum DriverCommand {
    /// Start a new voice. Rejected if its id is already active.
    Play(Playback),
    /// Drop a voice, active or idle.
    Stop { id: VoiceId },
    Pause { id: VoiceId },
    Resume { id: VoiceId },
    SetVolume { id: VoiceId, volume: f32 },
    SetLoop { id: VoiceId, enabled: bool },
    /// Rewind a voice; an idle voice is put back into the mix.
    Restart { id: VoiceId },
}

pub type DriverCommandProducer = Producer<DriverCommand>;
pub type DriverCommandConsumer = Consumer<DriverCommand>;

/// Creates the single-producer single-consumer ring that feeds a driver.
pub fn command_channel(capacity: usize) -> (DriverCommandProducer, DriverCommandConsumer) {
    RingBuffer::new(capacity)
}
