use std::io::Read;
use std::time::Duration;

use crate::error::StreamError;

/// Size of the canonical RIFF/WAVE header preceding the PCM data.
pub const WAV_HEADER_LEN: usize = 44;

/// The only sample width the player accepts.
pub const SUPPORTED_BITS_PER_SAMPLE: u16 = 16;

/// Format tag for uncompressed integer PCM.
pub const WAVE_FORMAT_PCM: u16 = 1;

/// Fields of a canonical 44-byte WAV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub riff_size: u32,
    pub audio_format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_size: u32,
}

fn le_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn le_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

impl WavHeader {
    /// Decode and validate a header from the first 44 bytes of `bytes`.
    ///
    /// Only the RIFF/WAVE magic and the bit depth are checked; the `fmt `
    /// and `data` markers and the chunk sizes are taken as sent, since
    /// streaming servers do not know the final data size up front.
    pub fn parse(bytes: &[u8]) -> Result<Self, StreamError> {
        if bytes.len() < WAV_HEADER_LEN {
            return Err(StreamError::ShortHeader {
                received: bytes.len(),
            });
        }
        if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
            return Err(StreamError::NotWav);
        }

        let header = Self {
            riff_size: le_u32(bytes, 4),
            audio_format: le_u16(bytes, 20),
            channels: le_u16(bytes, 22),
            sample_rate: le_u32(bytes, 24),
            byte_rate: le_u32(bytes, 28),
            block_align: le_u16(bytes, 32),
            bits_per_sample: le_u16(bytes, 34),
            data_size: le_u32(bytes, 40),
        };

        if header.bits_per_sample != SUPPORTED_BITS_PER_SAMPLE {
            return Err(StreamError::UnsupportedBitDepth(header.bits_per_sample));
        }
        Ok(header)
    }

    /// Playback time of `bytes` bytes of PCM at this header's rate and
    /// sample width, laid out as mono. The player opens a mono output
    /// whatever channel count the header declares.
    pub fn duration_of(&self, bytes: u64) -> Duration {
        let per_second = u64::from(self.sample_rate) * u64::from(self.bits_per_sample / 8);
        if per_second == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(bytes as f64 / per_second as f64)
    }
}

/// Read exactly the header from `reader` without consuming any PCM after it.
///
/// Short reads are retried until 44 bytes arrive or the stream ends.
pub fn read_header<R: Read>(reader: &mut R) -> Result<WavHeader, StreamError> {
    let mut buf = Vec::with_capacity(WAV_HEADER_LEN);
    reader.take(WAV_HEADER_LEN as u64).read_to_end(&mut buf)?;
    WavHeader::parse(&buf)
}

/// Build a canonical PCM WAV header.
pub fn encode_header(
    sample_rate: u32,
    channels: u16,
    bits_per_sample: u16,
    data_size: u32,
) -> [u8; WAV_HEADER_LEN] {
    let sample_bytes = u64::from(bits_per_sample / 8);
    let byte_rate = u32::try_from(u64::from(sample_rate) * u64::from(channels) * sample_bytes)
        .unwrap_or(u32::MAX);
    let block_align = u16::try_from(u64::from(channels) * sample_bytes).unwrap_or(u16::MAX);
    let riff_size: u32 = data_size.saturating_add(36);

    let mut out = [0u8; WAV_HEADER_LEN];

    // RIFF header
    out[0..4].copy_from_slice(b"RIFF");
    out[4..8].copy_from_slice(&riff_size.to_le_bytes());
    out[8..12].copy_from_slice(b"WAVE");

    // fmt chunk
    out[12..16].copy_from_slice(b"fmt ");
    out[16..20].copy_from_slice(&16u32.to_le_bytes());
    out[20..22].copy_from_slice(&WAVE_FORMAT_PCM.to_le_bytes());
    out[22..24].copy_from_slice(&channels.to_le_bytes());
    out[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    out[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    out[32..34].copy_from_slice(&block_align.to_le_bytes());
    out[34..36].copy_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    out[36..40].copy_from_slice(b"data");
    out[40..44].copy_from_slice(&data_size.to_le_bytes());

    out
}
