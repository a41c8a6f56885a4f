//! Destinations for the PCM bytes that follow the WAV header.
//!
//! Every sink takes raw little-endian signed 16-bit PCM. Chunk boundaries
//! on the wire are not sample aligned, so sinks that decode samples keep a
//! dangling odd byte around until the next write completes it.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use std::thread;
use std::time::Duration;

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, info, warn};

use crate::error::StreamError;

/// Output that accepts raw 16-bit little-endian PCM bytes.
pub trait PcmSink {
    /// Write the next slice of the stream. Slices may split samples.
    fn write(&mut self, pcm: &[u8]) -> Result<(), StreamError>;

    /// Flush anything buffered once the stream has ended.
    fn finish(&mut self) -> Result<(), StreamError> {
        Ok(())
    }
}

impl<S: PcmSink + ?Sized> PcmSink for Box<S> {
    fn write(&mut self, pcm: &[u8]) -> Result<(), StreamError> {
        (**self).write(pcm)
    }

    fn finish(&mut self) -> Result<(), StreamError> {
        (**self).finish()
    }
}

/// Collects the stream in memory, byte for byte.
impl PcmSink for Vec<u8> {
    fn write(&mut self, pcm: &[u8]) -> Result<(), StreamError> {
        self.extend_from_slice(pcm);
        Ok(())
    }
}

/// Discards the stream.
impl PcmSink for io::Sink {
    fn write(&mut self, _pcm: &[u8]) -> Result<(), StreamError> {
        Ok(())
    }
}

/// Fans every write out to each sink in order.
impl PcmSink for Vec<Box<dyn PcmSink>> {
    fn write(&mut self, pcm: &[u8]) -> Result<(), StreamError> {
        for sink in self.iter_mut() {
            sink.write(pcm)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), StreamError> {
        for sink in self.iter_mut() {
            sink.finish()?;
        }
        Ok(())
    }
}

/// Reassembles i16 samples from byte slices that may end mid-sample.
#[derive(Debug, Default)]
pub struct SampleAssembler {
    pending: Option<u8>,
}

impl SampleAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as many whole samples as `bytes` (plus any carried byte) holds.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<i16> {
        let mut samples = Vec::with_capacity((bytes.len() + 1) / 2);
        let mut rest = bytes;

        if let Some(low) = self.pending.take() {
            match rest.split_first() {
                Some((&high, tail)) => {
                    samples.push(i16::from_le_bytes([low, high]));
                    rest = tail;
                }
                None => {
                    self.pending = Some(low);
                    return samples;
                }
            }
        }

        let mut pairs = rest.chunks_exact(2);
        for pair in &mut pairs {
            samples.push(i16::from_le_bytes([pair[0], pair[1]]));
        }
        if let [odd] = pairs.remainder() {
            self.pending = Some(*odd);
        }
        samples
    }

    /// True when half a sample is still waiting for its second byte.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Audio carried by each buffer handed to the device.
const BLOCK_DURATION_MS: u32 = 50;
/// Blocks queued in the device before `write` blocks (200 ms of audio).
const MAX_QUEUED_BLOCKS: usize = 4;
const QUEUE_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Plays mono 16-bit PCM on the default output device.
///
/// Incoming samples are regrouped into fixed 50 ms blocks, so the amount
/// of queued audio does not depend on how the body was chunked. Writes
/// block while the device queue is full, which paces the caller at the
/// playback rate. Dropping the sink closes the device.
pub struct DeviceSink {
    sink: Sink,
    sample_rate: u32,
    block_samples: usize,
    pending: Vec<i16>,
    assembler: SampleAssembler,
    // Dropped after `sink`; closing the stream stops playback.
    _output: Option<(OutputStreamHandle, OutputStream)>,
}

impl DeviceSink {
    pub fn open(sample_rate: u32) -> Result<Self, StreamError> {
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| StreamError::Audio(format!("no output device available: {e}")))?;
        let sink = Sink::try_new(&handle)
            .map_err(|e| StreamError::Audio(format!("failed to open output stream: {e}")))?;
        info!("Opened output device: {} Hz, mono, int16", sample_rate);

        let mut device = Self::from_sink(sink, sample_rate);
        device._output = Some((handle, stream));
        Ok(device)
    }

    /// Wrap an already connected rodio sink.
    pub fn from_sink(sink: Sink, sample_rate: u32) -> Self {
        let block_samples = (sample_rate as usize * BLOCK_DURATION_MS as usize / 1000).max(1);
        Self {
            sink,
            sample_rate,
            block_samples,
            pending: Vec::with_capacity(block_samples),
            assembler: SampleAssembler::new(),
            _output: None,
        }
    }

    fn append_block(&mut self, block: Vec<i16>) {
        while self.sink.len() >= MAX_QUEUED_BLOCKS {
            thread::sleep(QUEUE_POLL_INTERVAL);
        }
        self.sink
            .append(SamplesBuffer::new(1, self.sample_rate, block));
    }
}

impl PcmSink for DeviceSink {
    fn write(&mut self, pcm: &[u8]) -> Result<(), StreamError> {
        let samples = self.assembler.push(pcm);
        self.pending.extend_from_slice(&samples);
        while self.pending.len() >= self.block_samples {
            let rest = self.pending.split_off(self.block_samples);
            let block = std::mem::replace(&mut self.pending, rest);
            self.append_block(block);
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), StreamError> {
        if self.assembler.has_pending() {
            warn!("Stream ended on half a sample; dropping trailing byte");
        }
        if !self.pending.is_empty() {
            let block = std::mem::take(&mut self.pending);
            self.append_block(block);
        }
        debug!("Waiting for {} queued block(s) to play", self.sink.len());
        self.sink.sleep_until_end();
        Ok(())
    }
}

/// Records the stream to a mono 16-bit WAV file.
pub struct WavFileSink {
    writer: Option<hound::WavWriter<BufWriter<File>>>,
    assembler: SampleAssembler,
}

impl WavFileSink {
    pub fn create<P: AsRef<Path>>(path: P, sample_rate: u32) -> Result<Self, StreamError> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let writer = hound::WavWriter::create(path.as_ref(), spec)?;
        info!("Recording stream to {}", path.as_ref().display());
        Ok(Self {
            writer: Some(writer),
            assembler: SampleAssembler::new(),
        })
    }
}

impl PcmSink for WavFileSink {
    fn write(&mut self, pcm: &[u8]) -> Result<(), StreamError> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| io::Error::other("WAV recording already finalized"))?;
        for sample in self.assembler.push(pcm) {
            writer.write_sample(sample)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), StreamError> {
        if let Some(writer) = self.writer.take() {
            if self.assembler.has_pending() {
                warn!("Stream ended on half a sample; trailing byte not recorded");
            }
            writer.finalize()?;
        }
        Ok(())
    }
}
