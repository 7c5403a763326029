//! Error types for Taler.

use thiserror::Error;

/// Library-level error type for Taler operations.
#[derive(Error, Debug)]
pub enum TalerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No raw audio for item '{0}'")]
    MissingInput(String),

    #[error("Audio conversion failed: {0}")]
    Conversion(String),

    #[error("Diarization failed: {0}")]
    Diarization(String),

    #[error("Recognition failed: {0}")]
    Recognition(String),

    #[error("Recognition did not complete within the polling budget for item '{0}'")]
    RecognitionTimedOut(String),

    #[error("Item '{item}' is {seconds:.0}s long, over the {limit}s ceiling")]
    TooLong {
        item: String,
        seconds: f64,
        limit: u64,
    },

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),
}

/// Result type alias for Taler operations.
pub type Result<T> = std::result::Result<T, TalerError>;
