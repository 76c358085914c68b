// ModelLoader: loads the trained model and its dataset, and owns the
// human-readable topic names.
//
// Topic term summaries are computed once at load time. Renaming topics
// re-pairs those summaries with the new names; predictors created earlier
// keep the names they were given.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::dataset::Dataset;
use crate::error::{Result, TopicModelError};
use crate::model::dictionary::Dictionary;
use crate::model::lda::LdaModel;
use crate::model::traits::{TopicScorer, TopicTerm};
use crate::predictor::TopicPredictor;
use crate::topics::{default_labels, NamingPolicy, Topic, TopicLabel};

/// Settings applied while loading.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderOptions {
    /// Terms kept per topic summary
    pub num_words: usize,
    /// Overrides the model's inference cutoff when set
    pub minimum_probability: Option<f64>,
    pub naming: NamingPolicy,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            num_words: 10,
            minimum_probability: None,
            naming: NamingPolicy::Strict,
        }
    }
}

pub struct ModelLoader {
    model: Arc<LdaModel>,
    dataset: Arc<Dataset>,
    naming: NamingPolicy,
    /// Term summary for every topic, by topic index
    topic_terms: Vec<Vec<TopicTerm>>,
    topic_names: Vec<TopicLabel>,
    topics: Vec<Topic>,
}

impl ModelLoader {
    /// Load a model and dataset with default options.
    pub fn load(model_path: &Path, dataset_path: &Path) -> Result<Self> {
        Self::load_with(model_path, dataset_path, &LoaderOptions::default())
    }

    pub fn load_with(model_path: &Path, dataset_path: &Path, options: &LoaderOptions) -> Result<Self> {
        let model = LdaModel::load(model_path)?;
        let dataset = Dataset::load(dataset_path)?;
        Self::assemble(model, dataset, options, dataset_path)
    }

    /// Assemble a loader from artifacts that are already in memory.
    pub fn from_parts(model: LdaModel, dataset: Dataset, options: &LoaderOptions) -> Result<Self> {
        Self::assemble(model, dataset, options, Path::new("<memory>"))
    }

    fn assemble(
        mut model: LdaModel,
        dataset: Dataset,
        options: &LoaderOptions,
        dataset_path: &Path,
    ) -> Result<Self> {
        if let Some(min) = options.minimum_probability {
            model.set_minimum_probability(min);
        }

        check_vocabulary(&model, &dataset).map_err(|reason| {
            warn!(dataset = %dataset_path.display(), %reason, "Dataset does not fit the model");
            TopicModelError::load(dataset_path, reason)
        })?;

        let num_topics = model.num_topics();
        let topic_terms = (0..num_topics)
            .map(|k| model.topic_terms(k, options.num_words))
            .collect::<Result<Vec<_>>>()?;

        let topic_names = default_labels(num_topics);
        let topics = pair_topics(&topic_names, &topic_terms);

        info!(num_topics, dataset = dataset.name(), "Topic model ready");

        Ok(Self {
            model: Arc::new(model),
            dataset: Arc::new(dataset),
            naming: options.naming,
            topic_terms,
            topic_names,
            topics,
        })
    }

    pub fn num_topics(&self) -> usize {
        self.model.num_topics()
    }

    pub fn topic_names(&self) -> &[TopicLabel] {
        &self.topic_names
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn model(&self) -> &Arc<LdaModel> {
        &self.model
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn naming_policy(&self) -> NamingPolicy {
        self.naming
    }

    /// Replace the topic names and re-pair them with the topic terms.
    ///
    /// Under `NamingPolicy::Strict` the count must equal `num_topics`,
    /// otherwise nothing changes and `NameCountMismatch` is returned.
    pub fn set_topic_names<I, S>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<TopicLabel> = names.into_iter().map(|n| TopicLabel::Named(n.into())).collect();
        self.naming.check(self.num_topics(), names.len())?;

        self.topics = pair_topics(&names, &self.topic_terms);
        self.topic_names = names;
        Ok(())
    }

    /// Predictor sharing this loader's model and dictionary, using a
    /// snapshot of the current topic names and the same naming policy.
    pub fn predictor(&self) -> TopicPredictor<LdaModel, Dictionary> {
        TopicPredictor::from_checked(
            Arc::clone(&self.model),
            Arc::clone(self.dataset.dictionary()),
            self.topic_names.clone(),
            self.naming,
        )
    }
}

/// Every dictionary id has to index a model column, or any document using
/// that token fails to predict.
fn check_vocabulary(model: &LdaModel, dataset: &Dataset) -> std::result::Result<(), String> {
    let vocab = model.vocabulary_size();
    match dataset.dictionary().max_id() {
        Some(max_id) if max_id as usize >= vocab => Err(format!(
            "dictionary id {max_id} is outside the model vocabulary of {vocab} terms"
        )),
        _ => Ok(()),
    }
}

fn pair_topics(names: &[TopicLabel], terms: &[Vec<TopicTerm>]) -> Vec<Topic> {
    names
        .iter()
        .zip(terms)
        .map(|(label, terms)| Topic {
            label: label.clone(),
            terms: terms.clone(),
        })
        .collect()
}
