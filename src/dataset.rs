// Dataset artifact: the preprocessing side of a trained model.
//
// Training produced two files: the model itself and this dataset, which holds
// the token dictionary plus the settings used to turn raw text into tokens.
// Both are loaded once and never mutated.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stop_words::{get, LANGUAGE};
use tracing::info;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{Result, TopicModelError};
use crate::model::dictionary::Dictionary;
use crate::model::traits::Vocabulary;

/// How raw text was tokenized before training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    pub lowercase: bool,
    /// Tokens shorter than this many characters are dropped
    pub min_token_len: usize,
    pub remove_stop_words: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            min_token_len: 3,
            remove_stop_words: true,
        }
    }
}

/// On-disk form of the dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetArtifact {
    pub name: String,
    /// Number of documents the model was trained on
    #[serde(default)]
    pub num_documents: usize,
    pub dictionary: Dictionary,
    #[serde(default)]
    pub preprocessing: PreprocessConfig,
}

/// A loaded dataset with its dictionary and a ready tokenizer.
#[derive(Debug)]
pub struct Dataset {
    name: String,
    num_documents: usize,
    dictionary: Arc<Dictionary>,
    preprocessing: PreprocessConfig,
    stop_words: HashSet<String>,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TopicModelError::load(path, "file not found"));
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| TopicModelError::load(path, e.to_string()))?;
        let artifact: DatasetArtifact = serde_json::from_str(&raw)
            .map_err(|e| TopicModelError::load(path, format!("malformed dataset: {e}")))?;
        let dataset =
            Self::build(artifact).map_err(|reason| TopicModelError::load(path, reason))?;

        info!(
            path = %path.display(),
            name = %dataset.name,
            documents = dataset.num_documents,
            vocabulary = dataset.dictionary.len(),
            "Loaded dataset"
        );
        Ok(dataset)
    }

    pub fn from_artifact(artifact: DatasetArtifact) -> Result<Self> {
        Self::build(artifact).map_err(|reason| TopicModelError::load(Path::new("<memory>"), reason))
    }

    fn build(artifact: DatasetArtifact) -> std::result::Result<Self, String> {
        artifact.dictionary.check_ids_unique()?;
        let stop_words = if artifact.preprocessing.remove_stop_words {
            get(LANGUAGE::English).into_iter().collect()
        } else {
            HashSet::new()
        };

        Ok(Self {
            name: artifact.name,
            num_documents: artifact.num_documents,
            dictionary: Arc::new(artifact.dictionary),
            preprocessing: artifact.preprocessing,
            stop_words,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_documents(&self) -> usize {
        self.num_documents
    }

    pub fn dictionary(&self) -> &Arc<Dictionary> {
        &self.dictionary
    }

    pub fn preprocessing(&self) -> &PreprocessConfig {
        &self.preprocessing
    }

    /// Tokenize raw text the same way the training corpus was tokenized.
    ///
    /// Words follow Unicode segmentation, so accented words stay whole.
    pub fn preprocess(&self, text: &str) -> Vec<String> {
        let cfg = &self.preprocessing;
        text.unicode_words()
            .map(|word| {
                if cfg.lowercase {
                    word.to_lowercase()
                } else {
                    word.to_string()
                }
            })
            .filter(|token| token.chars().count() >= cfg.min_token_len)
            .filter(|token| !self.stop_words.contains(&token.to_lowercase()))
            .collect()
    }
}
