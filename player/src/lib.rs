pub mod config;

use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{info, warn};

use tts_client::TtsClient;
use wav_core::{
    pump, read_header, DeviceSink, PcmSink, PumpStats, WavFileSink, WavHeader, WAVE_FORMAT_PCM,
};

use crate::config::PlayerConfig;

/// Outcome of one streamed synthesis.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub header: WavHeader,
    pub stats: PumpStats,
    /// Time from sending the request until the header was parsed.
    pub header_latency: Duration,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Length of the received audio at the header's sample rate.
    pub fn audio_duration(&self) -> Duration {
        self.header.duration_of(self.stats.bytes)
    }
}

/// Stream the configured text and play it on the default output device
/// (and/or record it, depending on `config`).
pub fn run(config: &PlayerConfig) -> Result<RunSummary> {
    run_with_sink(config, |header| open_sinks(config, header))
}

/// Same as [`run`], with the output built by `make_sink` once the header
/// is known.
pub fn run_with_sink<F>(config: &PlayerConfig, make_sink: F) -> Result<RunSummary>
where
    F: FnOnce(&WavHeader) -> Result<Box<dyn PcmSink>>,
{
    let t0 = Instant::now();

    let mut client = TtsClient::new(&config.url)?;
    if let Some(token) = &config.api_token {
        client = client.with_api_token(token.clone());
    }

    let mut response = client.open_stream(&config.text, &config.reference_id)?;
    let header = read_header(&mut response)?;
    let header_latency = t0.elapsed();
    info!(
        "Header received at {:.2}s: {} Hz, {}-bit",
        header_latency.as_secs_f64(),
        header.sample_rate,
        header.bits_per_sample
    );
    if header.channels != 1 {
        warn!("Header declares {} channels; playing as mono", header.channels);
    }
    if header.audio_format != WAVE_FORMAT_PCM {
        warn!("Header declares format tag {}; treating as PCM", header.audio_format);
    }

    let mut sink = make_sink(&header)?;
    let stats = pump(&mut response, &mut sink, config.chunk_size)
        .context("Audio stream interrupted")?;

    Ok(RunSummary {
        header,
        stats,
        header_latency,
        elapsed: t0.elapsed(),
    })
}

/// Build the outputs requested by `config` for a stream described by `header`.
pub fn open_sinks(config: &PlayerConfig, header: &WavHeader) -> Result<Box<dyn PcmSink>> {
    let mut sinks: Vec<Box<dyn PcmSink>> = Vec::new();
    if config.playback {
        let device = DeviceSink::open(header.sample_rate).context("Failed to open audio output")?;
        sinks.push(Box::new(device));
    }
    if let Some(path) = &config.save_wav {
        let file = WavFileSink::create(path, header.sample_rate)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        sinks.push(Box::new(file));
    }

    if sinks.is_empty() {
        warn!("Playback and recording both disabled; draining stream only");
        return Ok(Box::new(io::sink()));
    }
    Ok(Box::new(sinks))
}
