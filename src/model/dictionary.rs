// Token dictionary: the vocabulary map shipped inside the dataset artifact.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::traits::{BagOfWords, Vocabulary};
use crate::error::Result;

/// Token → id mapping produced when the model was trained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dictionary {
    token2id: HashMap<String, u32>,
}

impl Dictionary {
    pub fn new(token2id: HashMap<String, u32>) -> Self {
        Self { token2id }
    }

    /// Build a dictionary assigning ids in first-seen order.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut token2id = HashMap::new();
        for token in tokens {
            let next_id = token2id.len() as u32;
            token2id.entry(token.into()).or_insert(next_id);
        }
        Self { token2id }
    }

    pub fn id(&self, token: &str) -> Option<u32> {
        self.token2id.get(token).copied()
    }

    /// Every id must be unique; two tokens sharing one would silently merge
    /// their counts.
    pub fn check_ids_unique(&self) -> std::result::Result<(), String> {
        let mut seen = HashSet::with_capacity(self.token2id.len());
        for (token, id) in &self.token2id {
            if !seen.insert(*id) {
                return Err(format!("id {id} is assigned to more than one token (one is {token:?})"));
            }
        }
        Ok(())
    }

    /// Largest id in the dictionary, `None` when it is empty.
    pub fn max_id(&self) -> Option<u32> {
        self.token2id.values().copied().max()
    }
}

impl Vocabulary for Dictionary {
    fn doc2bow(&self, tokens: &[String]) -> Result<BagOfWords> {
        let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
        for token in tokens {
            if let Some(id) = self.id(token) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        Ok(counts.into_iter().collect())
    }

    fn len(&self) -> usize {
        self.token2id.len()
    }
}
