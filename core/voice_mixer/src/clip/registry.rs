use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use log::{info, warn};
use thiserror::Error;

use crate::{
    clip::{
        Clip, ClipLookup,
        decode::{AudioDecoder, DecodeError, DecodedAudio},
    },
    constants::{CHANNEL_COUNT, SAMPLE_RATE},
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("clip '{0}' is already registered")]
    AlreadyExists(String),
    #[error("clip '{0}' is not registered")]
    NotFound(String),
    #[error("invalid audio data: {0}")]
    InvalidData(String),
}

impl From<DecodeError> for RegistryError {
    fn from(err: DecodeError) -> Self {
        Self::InvalidData(err.to_string())
    }
}

/// Name-keyed table of decoded clips, shared between the control side and
/// the mixing side.
///
/// Lookups take a read lock only long enough to clone an `Arc`, so a mix
/// step keeps a clip alive even if it is removed mid-packet.
#[derive(Debug, Default)]
pub struct ClipRegistry {
    clips: RwLock<HashMap<String, Arc<Clip>>>,
}

impl ClipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers already decoded audio under `name`.
    /// Collisions are rejected, never overwritten.
    pub fn register(
        &self,
        name: impl Into<String>,
        audio: DecodedAudio,
    ) -> Result<Arc<Clip>, RegistryError> {
        let name = name.into();
        if let Err(err) = Self::validate(&name, &audio) {
            warn!("rejected clip '{name}': {err}");
            return Err(err);
        }

        let clip = Arc::new(Clip::new(
            name.clone(),
            audio.sample_rate,
            audio.channel_count,
            audio.samples,
        ));
        let inserted = {
            let mut clips = self.clips.write().unwrap_or_else(PoisonError::into_inner);
            if clips.contains_key(&name) {
                false
            } else {
                clips.insert(name.clone(), Arc::clone(&clip));
                true
            }
        };

        if !inserted {
            warn!("rejected clip '{name}': name already registered");
            return Err(RegistryError::AlreadyExists(name));
        }
        info!("registered clip '{name}' ({} samples)", clip.len());
        Ok(clip)
    }

    /// Decodes `bytes` with `decoder` and registers the result.
    pub fn register_encoded<D: AudioDecoder + ?Sized>(
        &self,
        name: impl Into<String>,
        bytes: &[u8],
        decoder: &D,
    ) -> Result<Arc<Clip>, RegistryError> {
        let name = name.into();
        if self.contains(&name) {
            warn!("rejected clip '{name}': name already registered");
            return Err(RegistryError::AlreadyExists(name));
        }

        let audio = decoder.decode(bytes).map_err(|err| {
            warn!("failed to decode clip '{name}': {err}");
            RegistryError::from(err)
        })?;
        self.register(name, audio)
    }

    pub fn remove(&self, name: &str) -> Result<Arc<Clip>, RegistryError> {
        let removed = self
            .clips
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);

        match removed {
            Some(clip) => {
                info!("removed clip '{name}'");
                Ok(clip)
            }
            None => Err(RegistryError::NotFound(name.to_owned())),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.clips
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.clips.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .clips
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    fn validate(name: &str, audio: &DecodedAudio) -> Result<(), RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::InvalidData("clip name is empty".into()));
        }
        if audio.channel_count != CHANNEL_COUNT {
            return Err(RegistryError::InvalidData(format!(
                "expected {CHANNEL_COUNT} channel(s), got {}",
                audio.channel_count
            )));
        }
        if audio.sample_rate != SAMPLE_RATE {
            return Err(RegistryError::InvalidData(format!(
                "expected {SAMPLE_RATE} Hz, got {} Hz",
                audio.sample_rate
            )));
        }
        if let Some(index) = audio.samples.iter().position(|s| !s.is_finite()) {
            return Err(RegistryError::InvalidData(format!(
                "non-finite sample at index {index}"
            )));
        }
        Ok(())
    }
}

impl ClipLookup for ClipRegistry {
    fn lookup(&self, name: &str) -> Option<Arc<Clip>> {
        self.clips
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}
