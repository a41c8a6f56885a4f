use anyhow::Result;
use tracing::info;

use player::config::PlayerConfig;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let _ = dotenv::dotenv();

    let config = PlayerConfig::from_env();
    info!(
        "Streaming TTS from {} (reference_id={}, chunk_size={}, playback={}, save_wav={:?})",
        config.url, config.reference_id, config.chunk_size, config.playback, config.save_wav
    );

    let summary = player::run(&config)?;
    info!(
        "Stream finished: {} bytes in {} chunks, {:.2}s of audio, {:.2}s total",
        summary.stats.bytes,
        summary.stats.chunks,
        summary.audio_duration().as_secs_f64(),
        summary.elapsed.as_secs_f64()
    );
    Ok(())
}
