// Error handling for the playback controller

use thiserror::Error;

/// Playback error types
#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    /// Failed to load media
    #[error("Load error: {0}")]
    Load(String),

    /// The media decoder rejected a call
    #[error("Decoder error: {0}")]
    Decoder(String),

    /// Surface texture creation or frame pull failed
    #[error("Surface texture error: {0}")]
    Surface(String),

    /// The GPU texture bridge failed
    #[error("Texture bridge error: {0}")]
    Texture(String),

    /// Operation not allowed in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A call into the host platform (JNI) failed
    #[error("Platform error: {0}")]
    Platform(String),

    /// Malformed configuration
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

impl From<serde_json::Error> for PlaybackError {
    fn from(err: serde_json::Error) -> Self {
        PlaybackError::Config(err.to_string())
    }
}
