// Topic labels and the derived (label, terms) summaries.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, TopicModelError};
use crate::model::traits::TopicTerm;

/// The name shown for a topic.
///
/// Freshly loaded models label every topic with its own index; callers
/// replace those with display names once they have read the topic terms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TopicLabel {
    Index(usize),
    Named(String),
}

impl fmt::Display for TopicLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicLabel::Index(i) => write!(f, "{i}"),
            TopicLabel::Named(name) => f.write_str(name),
        }
    }
}

impl From<String> for TopicLabel {
    fn from(name: String) -> Self {
        TopicLabel::Named(name)
    }
}

impl From<&str> for TopicLabel {
    fn from(name: &str) -> Self {
        TopicLabel::Named(name.to_string())
    }
}

/// Default labels for a model: `[Index(0), .., Index(n-1)]`.
pub fn default_labels(num_topics: usize) -> Vec<TopicLabel> {
    (0..num_topics).map(TopicLabel::Index).collect()
}

/// A labelled topic with its top terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub label: TopicLabel,
    pub terms: Vec<TopicTerm>,
}

/// What `set_topic_names` does when the name count differs from the
/// model's topic count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingPolicy {
    /// Reject the names and keep the current ones
    #[default]
    Strict,
    /// Accept the names; topics beyond the shorter side are left out
    Truncate,
}

impl NamingPolicy {
    /// Check `actual` names against a model with `expected` topics.
    ///
    /// Strict rejects any difference; Truncate logs it and accepts.
    pub fn check(self, expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            return Ok(());
        }
        match self {
            NamingPolicy::Strict => Err(TopicModelError::NameCountMismatch { expected, actual }),
            NamingPolicy::Truncate => {
                warn!(
                    expected,
                    actual, "Topic name count differs from topic count; extra entries are ignored"
                );
                Ok(())
            }
        }
    }
}

impl std::str::FromStr for NamingPolicy {
    type Err = TopicModelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(NamingPolicy::Strict),
            "truncate" => Ok(NamingPolicy::Truncate),
            other => Err(TopicModelError::config(format!(
                "unknown naming policy {other:?} (expected \"strict\" or \"truncate\")"
            ))),
        }
    }
}

/// Read topic names from a file.
///
/// Accepts either a JSON array of strings or plain text with one name per
/// line (blank lines are skipped). `.json` files must be valid JSON; other
/// files starting with `[` fall back to lines when they do not parse.
pub fn load_topic_names(path: &Path) -> Result<Vec<String>> {
    let raw =
        std::fs::read_to_string(path).map_err(|e| TopicModelError::load(path, e.to_string()))?;

    let is_json_file = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json_file || raw.trim_start().starts_with('[') {
        match serde_json::from_str(&raw) {
            Ok(names) => return Ok(names),
            Err(e) if is_json_file => {
                return Err(TopicModelError::load(path, format!("malformed topic names: {e}")));
            }
            Err(e) => debug!(error = %e, "Topic names are not a JSON array, reading lines"),
        }
    }

    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
