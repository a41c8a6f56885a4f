use thiserror::Error;

/// Errors raised while decoding or playing a streamed WAV response
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Received only {received} bytes for header")]
    ShortHeader { received: usize },

    #[error("Did not receive a WAV header (is the server restarted?)")]
    NotWav,

    #[error("Unexpected bit depth: {0}")]
    UnsupportedBitDepth(u16),

    #[error("Chunk size must be greater than zero")]
    InvalidChunkSize,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Audio device error: {0}")]
    Audio(String),

    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),
}
