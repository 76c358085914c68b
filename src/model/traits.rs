// Backend traits: the swap-ready abstraction over the topic model.
//
// The loader and predictor only ever talk to these two traits. The default
// implementations are the JSON-backed `Dictionary` and `LdaModel`, but any
// other backend that can turn tokens into weighted ids and score a weighted-id
// document against topics plugs in without touching the wrapper logic.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A document as (vocabulary id, count) pairs, sorted by id.
pub type BagOfWords = Vec<(u32, u32)>;

/// One term of a topic summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicTerm {
    pub term: String,
    /// Share of the topic's probability mass carried by this term (0.0 to 1.0)
    pub weight: f64,
}

/// Maps tokens to vocabulary ids.
pub trait Vocabulary {
    /// Convert a tokenized document into a bag-of-words.
    /// Tokens missing from the vocabulary are dropped.
    fn doc2bow(&self, tokens: &[String]) -> Result<BagOfWords>;

    /// Number of distinct ids in the vocabulary.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Scores a bag-of-words document against a fixed set of topics.
pub trait TopicScorer {
    /// Number of latent topics in the model.
    fn num_topics(&self) -> usize;

    /// Topic distribution for one document: (topic index, probability) pairs.
    /// Implementations may omit topics whose probability is negligible.
    fn document_topics(&self, bow: &BagOfWords) -> Result<Vec<(usize, f64)>>;

    /// The `top_n` most probable terms of `topic`, highest weight first.
    fn topic_terms(&self, topic: usize, top_n: usize) -> Result<Vec<TopicTerm>>;
}
