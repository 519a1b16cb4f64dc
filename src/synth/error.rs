use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the synth core and its configuration layer.
///
/// Index and timbre errors are caller contract violations coming from an input
/// adapter; they are rejected rather than clamped.
#[derive(Debug, Error)]
pub enum SynthError {
    #[error("chunk frame count must be positive, got {0}")]
    InvalidFrameCount(usize),

    #[error("key index {0} out of range (0..96)")]
    KeyOutOfRange(usize),

    #[error("fundamental index {0} out of range (0..12)")]
    FundamentalOutOfRange(usize),

    #[error("invalid timbre: {0}")]
    InvalidTimbre(String),

    #[error("failed to read config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    ConfigFormat(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
