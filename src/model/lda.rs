// Variational LDA scorer loaded from a JSON artifact.
//
// The artifact carries the trained variational topic-word parameters
// (lambda), the document-topic prior (alpha), and the id → term table.
// Inference is the standard online-LDA E-step: iterate the per-document
// Dirichlet parameter gamma against exp(E[log beta]) until it stops moving,
// then normalize gamma into a topic distribution.

use std::path::Path;

use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::traits::{BagOfWords, TopicScorer, TopicTerm};
use crate::error::{Result, TopicModelError};

/// Added to every phi normalizer so empty rows never divide by zero.
const PHI_EPSILON: f64 = 1e-100;

/// Lowest minimum_probability accepted; zero would return every topic.
const MIN_PROBABILITY_FLOOR: f64 = 1e-8;

/// Document-topic prior: one value shared by all topics, or one per topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Alpha {
    Symmetric(f64),
    Asymmetric(Vec<f64>),
}

/// On-disk form of a trained model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdaArtifact {
    pub num_topics: usize,
    pub alpha: Alpha,
    /// Term for each vocabulary id, indexed by id
    pub id2word: Vec<String>,
    /// Variational topic-word parameters, `num_topics` rows of `id2word.len()`
    pub lambda: Vec<Vec<f64>>,
}

/// Knobs for the per-document E-step.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceParams {
    /// Topics below this probability are left out of `document_topics`
    pub minimum_probability: f64,
    /// Upper bound on gamma updates per document
    pub iterations: usize,
    /// Stop once the mean absolute change in gamma drops below this
    pub gamma_threshold: f64,
}

impl Default for InferenceParams {
    fn default() -> Self {
        Self {
            minimum_probability: 0.01,
            iterations: 50,
            gamma_threshold: 0.001,
        }
    }
}

/// A trained LDA model ready for inference.
#[derive(Debug, Clone)]
pub struct LdaModel {
    alpha: Array1<f64>,
    id2word: Vec<String>,
    /// num_topics x vocabulary
    lambda: Array2<f64>,
    /// exp(E[log beta]), same shape as lambda
    exp_elog_beta: Array2<f64>,
    params: InferenceParams,
}

impl LdaModel {
    /// Read and validate a model artifact.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TopicModelError::load(path, "file not found"));
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| TopicModelError::load(path, e.to_string()))?;
        let artifact: LdaArtifact = serde_json::from_str(&raw)
            .map_err(|e| TopicModelError::load(path, format!("malformed model: {e}")))?;
        let model = Self::build(artifact).map_err(|reason| TopicModelError::load(path, reason))?;

        info!(
            path = %path.display(),
            num_topics = model.num_topics(),
            vocabulary = model.vocabulary_size(),
            "Loaded LDA model"
        );
        Ok(model)
    }

    /// Build a model from an artifact already in memory.
    pub fn from_artifact(artifact: LdaArtifact) -> Result<Self> {
        Self::build(artifact).map_err(|reason| TopicModelError::load(Path::new("<memory>"), reason))
    }

    fn build(artifact: LdaArtifact) -> std::result::Result<Self, String> {
        let LdaArtifact {
            num_topics,
            alpha,
            id2word,
            lambda,
        } = artifact;

        if num_topics == 0 {
            return Err("num_topics must be positive".to_string());
        }

        let alpha = match alpha {
            Alpha::Symmetric(a) => Array1::from_elem(num_topics, a),
            Alpha::Asymmetric(values) => Array1::from(values),
        };
        if alpha.len() != num_topics {
            return Err(format!(
                "alpha has {} entries for {num_topics} topics",
                alpha.len()
            ));
        }
        if alpha.iter().any(|a| !a.is_finite() || *a <= 0.0) {
            return Err("alpha values must be positive and finite".to_string());
        }

        if lambda.len() != num_topics {
            return Err(format!(
                "lambda has {} rows for {num_topics} topics",
                lambda.len()
            ));
        }
        let vocab = id2word.len();
        if vocab == 0 {
            return Err("id2word is empty".to_string());
        }
        for (k, row) in lambda.iter().enumerate() {
            if row.len() != vocab {
                return Err(format!(
                    "lambda row {k} has {} columns, expected {vocab}",
                    row.len()
                ));
            }
            if row.iter().any(|v| !v.is_finite() || *v <= 0.0) {
                return Err(format!("lambda row {k} has a non-positive or non-finite value"));
            }
        }

        let lambda = Array2::from_shape_vec((num_topics, vocab), lambda.concat())
            .map_err(|e| format!("lambda: {e}"))?;

        let mut exp_elog_beta = Array2::<f64>::zeros(lambda.raw_dim());
        for (mut out, row) in exp_elog_beta.outer_iter_mut().zip(lambda.outer_iter()) {
            out.assign(&dirichlet_expectation(row).mapv(f64::exp));
        }

        Ok(Self {
            alpha,
            id2word,
            lambda,
            exp_elog_beta,
            params: InferenceParams::default(),
        })
    }

    pub fn with_params(mut self, params: InferenceParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &InferenceParams {
        &self.params
    }

    pub fn set_minimum_probability(&mut self, minimum_probability: f64) {
        self.params.minimum_probability = minimum_probability;
    }

    pub fn vocabulary_size(&self) -> usize {
        self.id2word.len()
    }

    pub fn alpha(&self) -> ArrayView1<'_, f64> {
        self.alpha.view()
    }

    /// Run the E-step for one document and return its normalized gamma,
    /// covering every topic (no probability cutoff).
    pub fn infer(&self, bow: &BagOfWords) -> Result<Array1<f64>> {
        let vocab = self.vocabulary_size();
        if let Some((id, _)) = bow.iter().find(|(id, _)| *id as usize >= vocab) {
            return Err(TopicModelError::inference(format!(
                "word id {id} is outside the model vocabulary of {vocab} terms"
            )));
        }

        let ids: Vec<usize> = bow.iter().map(|(id, _)| *id as usize).collect();
        let counts: Array1<f64> = bow.iter().map(|(_, c)| *c as f64).collect();
        // num_topics x document words
        let beta_cols = self.exp_elog_beta.select(Axis(1), &ids);

        let mut gamma = Array1::<f64>::ones(self.num_topics());
        let mut exp_elog_theta = dirichlet_expectation(gamma.view()).mapv(f64::exp);
        let mut phinorm = exp_elog_theta.dot(&beta_cols) + PHI_EPSILON;

        for iteration in 0..self.params.iterations {
            let last = gamma;
            gamma = &self.alpha + &(&exp_elog_theta * &(&counts / &phinorm).dot(&beta_cols.t()));
            exp_elog_theta = dirichlet_expectation(gamma.view()).mapv(f64::exp);
            phinorm = exp_elog_theta.dot(&beta_cols) + PHI_EPSILON;

            let mean_change = (&gamma - &last).mapv(f64::abs).mean().unwrap_or(0.0);
            if mean_change < self.params.gamma_threshold {
                debug!(iterations = iteration + 1, "Gamma converged");
                break;
            }
        }

        let total = gamma.sum();
        Ok(gamma / total)
    }
}

impl TopicScorer for LdaModel {
    fn num_topics(&self) -> usize {
        self.alpha.len()
    }

    fn document_topics(&self, bow: &BagOfWords) -> Result<Vec<(usize, f64)>> {
        let cutoff = self.params.minimum_probability.max(MIN_PROBABILITY_FLOOR);
        let distribution = self.infer(bow)?;
        Ok(distribution
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, p)| *p >= cutoff)
            .collect())
    }

    fn topic_terms(&self, topic: usize, top_n: usize) -> Result<Vec<TopicTerm>> {
        if topic >= self.num_topics() {
            return Err(TopicModelError::inference(format!(
                "topic {topic} does not exist (model has {})",
                self.num_topics()
            )));
        }
        let row = self.lambda.row(topic);
        let total = row.sum();

        let mut ranked: Vec<(usize, f64)> =
            row.iter().map(|v| v / total).enumerate().collect();
        // Stable sort keeps lower ids first among equal weights
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(ranked
            .into_iter()
            .take(top_n)
            .map(|(id, weight)| TopicTerm {
                term: self.id2word[id].clone(),
                weight,
            })
            .collect())
    }
}

/// Render a topic summary as `0.120*"graph" + 0.080*"network"`.
pub fn format_terms(terms: &[TopicTerm]) -> String {
    terms
        .iter()
        .map(|t| format!("{:.3}*\"{}\"", t.weight, t.term))
        .collect::<Vec<_>>()
        .join(" + ")
}

/// E[log x] for x ~ Dirichlet(params).
fn dirichlet_expectation(params: ArrayView1<'_, f64>) -> Array1<f64> {
    let psi_total = digamma(params.sum());
    params.mapv(|p| digamma(p) - psi_total)
}

/// Digamma via upward recurrence and the asymptotic series.
fn digamma(mut x: f64) -> f64 {
    let mut result = 0.0;
    while x < 6.0 {
        result -= 1.0 / x;
        x += 1.0;
    }
    let f = 1.0 / (x * x);
    result + x.ln()
        - 0.5 / x
        - f * (1.0 / 12.0 - f * (1.0 / 120.0 - f * (1.0 / 252.0 - f * (1.0 / 240.0 - f / 132.0))))
}
