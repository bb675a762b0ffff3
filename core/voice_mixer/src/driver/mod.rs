use std::{fmt, sync::Arc, time::Duration};

use log::{debug, warn};

use crate::{
    clip::{ClipLookup, registry::ClipRegistry},
    constants::{DEFAULT_COMMAND_CAPACITY, PACKET_DURATION},
    driver::command::{
        DriverCommand, DriverCommandConsumer, DriverCommandProducer, command_channel,
    },
    mixer::{MixOutput, Mixer},
    playback::{Playback, VoiceId},
};

pub mod command;

/// Owns the voice list and calls the mixer once per packet quantum.
///
/// Voices reported ended are taken out of the mix. Those created with
/// `destroy_on_end` are dropped; the rest are parked as idle until a
/// `Restart` or `Stop` command arrives.
///
/// A voice whose clip has been removed from the registry never ends and is
/// never retired here. Use [`MixDriver::orphaned_voices`] to find and stop
/// such voices.
pub struct MixDriver {
    clips: Arc<ClipRegistry>,
    mixer: Mixer,
    /// voices in the mix, in play order
    active: Vec<Playback>,
    /// ended voices kept for a later restart
    idle: Vec<Playback>,
    commands: DriverCommandConsumer,
    packets_mixed: u64,
}

impl fmt::Debug for MixDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MixDriver")
            .field("active", &self.active.len())
            .field("idle", &self.idle.len())
            .field("pending_commands", &self.commands.slots())
            .field("packets_mixed", &self.packets_mixed)
            .finish_non_exhaustive()
    }
}

impl MixDriver {
    pub fn new(clips: Arc<ClipRegistry>, commands: DriverCommandConsumer) -> Self {
        Self {
            clips,
            mixer: Mixer::new(),
            active: Vec::new(),
            idle: Vec::new(),
            commands,
            packets_mixed: 0,
        }
    }

    /// Builds a driver together with the producer half of its command ring.
    pub fn with_channel(clips: Arc<ClipRegistry>) -> (Self, DriverCommandProducer) {
        let (producer, consumer) = command_channel(DEFAULT_COMMAND_CAPACITY);
        (Self::new(clips, consumer), producer)
    }

    pub fn process_command(&mut self, cmd: DriverCommand) {
        match cmd {
            DriverCommand::Play(voice) => self.play(voice),
            DriverCommand::Stop { id } => self.stop(id),
            DriverCommand::Pause { id } => self.with_voice(id, Playback::pause),
            DriverCommand::Resume { id } => self.with_voice(id, Playback::resume),
            DriverCommand::SetVolume { id, volume } => {
                self.with_voice(id, |voice| voice.set_volume(volume));
            }
            DriverCommand::SetLoop { id, enabled } => {
                self.with_voice(id, |voice| voice.set_looping(enabled));
            }
            DriverCommand::Restart { id } => self.restart(id),
        }
    }

    /// Mixes one packet.
    ///
    /// Pending commands are applied first, then every active voice advances
    /// by one packet and ended voices are retired.
    pub fn tick(&mut self) -> MixOutput<'_> {
        while let Ok(cmd) = self.commands.pop() {
            self.process_command(cmd);
        }

        let output = self.mixer.mix(&mut self.active, &*self.clips);
        retire(&mut self.active, &mut self.idle, &output.ended);
        self.packets_mixed += 1;
        output
    }

    fn play(&mut self, voice: Playback) {
        let id = voice.id();
        if self.active.iter().any(|v| v.id() == id) {
            warn!("{id} is already playing, ignoring play request");
            return;
        }

        self.idle.retain(|v| v.id() != id);
        debug!("{id} started on clip '{}'", voice.clip_name());
        self.active.push(voice);
    }

    fn stop(&mut self, id: VoiceId) {
        let before = self.active.len() + self.idle.len();
        self.active.retain(|v| v.id() != id);
        self.idle.retain(|v| v.id() != id);

        if before == self.active.len() + self.idle.len() {
            warn!("stop requested for unknown {id}");
        } else {
            debug!("{id} stopped");
        }
    }

    fn restart(&mut self, id: VoiceId) {
        if let Some(voice) = self.active.iter_mut().find(|v| v.id() == id) {
            voice.restart();
            return;
        }

        match self.idle.iter().position(|v| v.id() == id) {
            Some(index) => {
                let mut voice = self.idle.remove(index);
                voice.restart();
                debug!("{id} restarted from idle");
                self.active.push(voice);
            }
            None => warn!("restart requested for unknown {id}"),
        }
    }

    fn with_voice(&mut self, id: VoiceId, f: impl FnOnce(&mut Playback)) {
        match self.voice_mut(id) {
            Some(voice) => f(voice),
            None => warn!("command for unknown {id} ignored"),
        }
    }

    fn voice_mut(&mut self, id: VoiceId) -> Option<&mut Playback> {
        self.active
            .iter_mut()
            .chain(self.idle.iter_mut())
            .find(|v| v.id() == id)
    }

    pub fn voice(&self, id: VoiceId) -> Option<&Playback> {
        self.active
            .iter()
            .chain(self.idle.iter())
            .find(|v| v.id() == id)
    }

    pub fn active_voices(&self) -> &[Playback] {
        &self.active
    }

    pub fn idle_voices(&self) -> &[Playback] {
        &self.idle
    }

    /// Active voices whose clip is no longer registered.
    pub fn orphaned_voices(&self) -> Vec<VoiceId> {
        self.active
            .iter()
            .filter(|v| self.clips.lookup(v.clip_name()).is_none())
            .map(Playback::id)
            .collect()
    }

    pub fn clips(&self) -> &Arc<ClipRegistry> {
        &self.clips
    }

    pub fn packets_mixed(&self) -> u64 {
        self.packets_mixed
    }

    /// Stream time covered by the packets mixed so far.
    pub fn elapsed(&self) -> Duration {
        Duration::from_micros(
            self.packets_mixed.saturating_mul(PACKET_DURATION.as_micros() as u64),
        )
    }
}

fn retire(active: &mut Vec<Playback>, idle: &mut Vec<Playback>, ended: &[VoiceId]) {
    for id in ended {
        let Some(index) = active.iter().position(|v| v.id() == *id) else {
            continue;
        };
        let voice = active.remove(index);
        if voice.destroy_on_end() {
            debug!("{id} finished, disposing");
        } else {
            debug!("{id} finished, parked idle");
            idle.push(voice);
        }
    }
}
