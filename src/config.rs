use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Result, TopicModelError};
use crate::loader::LoaderOptions;
use crate::topics::NamingPolicy;

const MODEL_FILE: &str = "lda_model.json";
const DATASET_FILE: &str = "dataset.json";

/// Returns the default directory holding the model artifacts.
/// Uses the platform data directory: ~/.local/share/topicmodel/ on Linux.
pub fn default_artifact_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("topicmodel")
}

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded at startup via dotenvy, so every value can live
/// there instead of the shell environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Trained model artifact (TOPICMODEL_MODEL_PATH)
    pub model_path: PathBuf,
    /// Dataset artifact with the dictionary (TOPICMODEL_DATASET_PATH)
    pub dataset_path: PathBuf,
    /// Terms shown per topic (TOPICMODEL_NUM_WORDS, default 10)
    pub num_words: usize,
    /// Inference cutoff (TOPICMODEL_MIN_PROBABILITY, default: the model's 0.01)
    pub minimum_probability: Option<f64>,
    /// TOPICMODEL_NAMING: "strict" (default) or "truncate"
    pub naming: NamingPolicy,
    /// Optional file of topic names applied after load (TOPICMODEL_TOPIC_NAMES)
    pub topic_names_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every setting has a default; malformed numbers or an unknown naming
    /// policy are rejected rather than silently ignored.
    pub fn load() -> Result<Self> {
        let dir = default_artifact_dir();

        let num_words = match env::var("TOPICMODEL_NUM_WORDS") {
            Ok(v) => v.trim().parse().map_err(|_| {
                TopicModelError::config(format!("TOPICMODEL_NUM_WORDS must be an integer, got {v:?}"))
            })?,
            Err(_) => LoaderOptions::default().num_words,
        };

        let minimum_probability = match env::var("TOPICMODEL_MIN_PROBABILITY") {
            Ok(v) => {
                let p: f64 = v.trim().parse().map_err(|_| {
                    TopicModelError::config(format!(
                        "TOPICMODEL_MIN_PROBABILITY must be a number, got {v:?}"
                    ))
                })?;
                if !(0.0..=1.0).contains(&p) {
                    return Err(TopicModelError::config(format!(
                        "TOPICMODEL_MIN_PROBABILITY must be between 0 and 1, got {p}"
                    )));
                }
                Some(p)
            }
            Err(_) => None,
        };

        let naming = match env::var("TOPICMODEL_NAMING") {
            Ok(v) => v.parse()?,
            Err(_) => NamingPolicy::default(),
        };

        Ok(Self {
            model_path: env::var("TOPICMODEL_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| dir.join(MODEL_FILE)),
            dataset_path: env::var("TOPICMODEL_DATASET_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| dir.join(DATASET_FILE)),
            num_words,
            minimum_probability,
            naming,
            topic_names_path: env::var("TOPICMODEL_TOPIC_NAMES").ok().map(PathBuf::from),
        })
    }

    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            num_words: self.num_words,
            minimum_probability: self.minimum_probability,
            naming: self.naming,
        }
    }

    /// Check that both artifacts exist before trying to load them.
    pub fn require_artifacts(&self) -> Result<()> {
        require_file(&self.model_path, "TOPICMODEL_MODEL_PATH")?;
        require_file(&self.dataset_path, "TOPICMODEL_DATASET_PATH")
    }
}

fn require_file(path: &Path, var: &str) -> Result<()> {
    if !path.exists() {
        return Err(TopicModelError::load(
            path,
            format!("file not found. Set {var} in your .env file to point at it."),
        ));
    }
    Ok(())
}
