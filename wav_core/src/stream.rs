//! Streaming copy loop.
//!
//! Once the header has been consumed, the rest of the response body is raw
//! PCM. It is moved to the sink in fixed-size chunks as it arrives rather
//! than buffered whole, so playback starts as soon as the first chunk lands.

use std::io::Read;

use tracing::debug;

use crate::error::StreamError;
use crate::sink::PcmSink;

/// Bytes requested from the body per iteration.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Totals for one pumped stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    pub bytes: u64,
    pub chunks: u64,
}

/// Fill `buf` with up to `limit` bytes, retrying short reads until the
/// limit is reached or the reader is exhausted.
fn read_chunk<R: Read>(reader: &mut R, buf: &mut Vec<u8>, limit: usize) -> Result<usize, StreamError> {
    buf.clear();
    let n = reader.take(limit as u64).read_to_end(buf)?;
    Ok(n)
}

/// Copy `reader` into `sink` chunk by chunk until end of stream, then
/// finish the sink.
pub fn pump<R, S>(reader: &mut R, sink: &mut S, chunk_size: usize) -> Result<PumpStats, StreamError>
where
    R: Read,
    S: PcmSink + ?Sized,
{
    if chunk_size == 0 {
        return Err(StreamError::InvalidChunkSize);
    }

    let mut stats = PumpStats::default();
    let mut buf = Vec::with_capacity(chunk_size);
    loop {
        let n = read_chunk(reader, &mut buf, chunk_size)?;
        if n == 0 {
            break;
        }
        sink.write(&buf)?;
        stats.bytes += n as u64;
        stats.chunks += 1;
        debug!(chunk = stats.chunks, bytes = n, total = stats.bytes, "chunk written");
    }

    sink.finish()?;
    Ok(stats)
}
