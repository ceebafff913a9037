//! Audio decode errors.

/// The fetched payload could not be turned into playable audio.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("payload is not decodable audio: {0}")]
    Unsupported(#[from] rodio::decoder::DecoderError),

    #[error("decoded audio contains no samples")]
    Empty,

    /// The blocking decode task panicked or was cancelled
    #[error("decode task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
