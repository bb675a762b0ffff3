use std::time::Duration;

/// Samples per packet. One packet is one mix step.
pub const PACKET_SIZE: usize = 480;

/// Sample rate shared by the decode/storage stage and the mixing stage.
pub const SAMPLE_RATE: u32 = 48_000;

/// Only mono clips are mixed.
pub const CHANNEL_COUNT: u16 = 1;

/// Wall-clock length of one packet (10 ms at 48 kHz).
pub const PACKET_DURATION: Duration =
    Duration::from_micros(PACKET_SIZE as u64 * 1_000_000 / SAMPLE_RATE as u64);

/// Default slot count for the driver command ring.
pub const DEFAULT_COMMAND_CAPACITY: usize = 64;

pub const AUDIO_SAMPLE_EPSILON: f32 = 1e-6;

/// One mixed or per-voice packet of mono samples.
pub type Packet = [f32; PACKET_SIZE];
