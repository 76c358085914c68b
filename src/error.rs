// Error taxonomy for loading artifacts and running predictions.
//
// Load and inference failures are always surfaced to the caller. The one
// condition recovered locally (a predicted topic index with no name) is not
// an error at all; it goes through the predictor's Diagnostics sink.

use std::path::{Path, PathBuf};

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, TopicModelError>;

#[derive(Debug, thiserror::Error)]
pub enum TopicModelError {
    /// Artifact missing, unreadable, malformed, or internally inconsistent.
    #[error("failed to load {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },

    /// Bag-of-words transform or model query failed during prediction.
    #[error("inference failed: {0}")]
    Inference(String),

    /// Topic names rejected because their count differs from the model's.
    #[error("expected {expected} topic names, got {actual}")]
    NameCountMismatch { expected: usize, actual: usize },

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),
}

impl TopicModelError {
    pub fn load(path: &Path, reason: impl Into<String>) -> Self {
        Self::Load {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
