//! Decoding and playback of streamed 16-bit PCM WAV audio.

pub mod error;
pub mod sink;
pub mod stream;
pub mod wav;

pub use error::StreamError;
pub use sink::{DeviceSink, PcmSink, SampleAssembler, WavFileSink};
pub use stream::{pump, PumpStats, DEFAULT_CHUNK_SIZE};
pub use wav::{encode_header, read_header, WavHeader, WAVE_FORMAT_PCM, WAV_HEADER_LEN};
