use std::fmt;

/// Caller-assigned identity of a voice, unique among active voices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(pub u64);

impl From<u64> for VoiceId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "voice#{}", self.0)
    }
}
