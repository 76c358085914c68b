// Topic prediction for a single tokenized document.
//
// The predictor is handed its model, vocabulary and topic names explicitly
// (usually by ModelLoader::predictor). Each call runs:
//   tokens -> bag-of-words -> topic distribution -> sort -> name lookup
// A topic index without a name is skipped and reported through the
// Diagnostics sink; it never fails the call.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dataset::Dataset;
use crate::error::{Result, TopicModelError};
use crate::model::traits::{TopicScorer, Vocabulary};
use crate::topics::{NamingPolicy, TopicLabel};

/// One predicted topic for a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: TopicLabel,
    pub probability: f64,
}

/// Receives notices about predictions that could not be labelled.
pub trait Diagnostics: Send + Sync {
    /// `topic_index` came back from the model but only `names_len` names exist.
    fn topic_index_out_of_range(&self, topic_index: usize, names_len: usize);
}

/// Default sink: a warning event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn topic_index_out_of_range(&self, topic_index: usize, names_len: usize) {
        warn!(
            topic_index,
            names_len, "Invalid topic index: exceeds topic names length, skipping"
        );
    }
}

/// Predicts named topic distributions using a shared model and vocabulary.
pub struct TopicPredictor<M, V> {
    model: Arc<M>,
    vocabulary: Arc<V>,
    // Swapped whole on rename; predict() works on the snapshot it read first
    names: RwLock<Arc<[TopicLabel]>>,
    naming: NamingPolicy,
    diagnostics: Arc<dyn Diagnostics>,
}

impl<M: TopicScorer, V: Vocabulary> TopicPredictor<M, V> {
    /// Build a predictor, checking `names` against the model's topic count
    /// under `naming`.
    pub fn new(
        model: Arc<M>,
        vocabulary: Arc<V>,
        names: Vec<TopicLabel>,
        naming: NamingPolicy,
    ) -> Result<Self> {
        naming.check(model.num_topics(), names.len())?;
        Ok(Self::from_checked(model, vocabulary, names, naming))
    }

    /// Names already passed `naming.check` (the loader's own list).
    pub(crate) fn from_checked(
        model: Arc<M>,
        vocabulary: Arc<V>,
        names: Vec<TopicLabel>,
        naming: NamingPolicy,
    ) -> Self {
        Self {
            model,
            vocabulary,
            names: RwLock::new(names.into()),
            naming,
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    /// Replace the diagnostics sink (e.g. to record or silence notices).
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn model(&self) -> &Arc<M> {
        &self.model
    }

    pub fn vocabulary(&self) -> &Arc<V> {
        &self.vocabulary
    }

    /// Current topic-name snapshot.
    pub fn topic_names(&self) -> Arc<[TopicLabel]> {
        let guard = self.names.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    pub fn naming_policy(&self) -> NamingPolicy {
        self.naming
    }

    /// Swap in a new set of names. Calls already in flight keep the old ones.
    ///
    /// The count is checked like `ModelLoader::set_topic_names`; a rejected
    /// list leaves the current names in place.
    pub fn set_topic_names(&self, names: Vec<TopicLabel>) -> Result<()> {
        self.naming.check(self.model.num_topics(), names.len())?;
        let mut guard = self.names.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = names.into();
        Ok(())
    }

    /// Predict the labelled topic distribution of a tokenized document,
    /// most probable topic first.
    pub fn predict(&self, tokens: &[String]) -> Result<Vec<Prediction>> {
        let names = self.topic_names();

        let bow = self.vocabulary.doc2bow(tokens).map_err(as_inference)?;
        let mut scored = self.model.document_topics(&bow).map_err(as_inference)?;

        // Stable: equal probabilities keep the model's order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut predictions = Vec::with_capacity(scored.len());
        for (topic_index, probability) in scored {
            match names.get(topic_index) {
                Some(label) => predictions.push(Prediction {
                    label: label.clone(),
                    probability,
                }),
                None => self
                    .diagnostics
                    .topic_index_out_of_range(topic_index, names.len()),
            }
        }

        debug!(
            tokens = tokens.len(),
            known_words = bow.len(),
            predictions = predictions.len(),
            "Predicted document topics"
        );
        Ok(predictions)
    }

    /// Tokenize raw text with the dataset's preprocessing, then predict.
    pub fn predict_text(&self, dataset: &Dataset, text: &str) -> Result<Vec<Prediction>> {
        let tokens = dataset.preprocess(text);
        self.predict(&tokens)
    }
}

/// Everything that goes wrong inside predict() is reported as inference.
fn as_inference(err: TopicModelError) -> TopicModelError {
    match err {
        TopicModelError::Inference(_) => err,
        other => TopicModelError::inference(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::dictionary::Dictionary;
    use crate::model::traits::{BagOfWords, TopicTerm};
    use std::io;
    use std::sync::Mutex;

    /// Scorer that ignores the document and returns fixed pairs.
    struct FixedScorer(Vec<(usize, f64)>);

    impl TopicScorer for FixedScorer {
        fn num_topics(&self) -> usize {
            self.0.len()
        }

        fn document_topics(&self, _bow: &BagOfWords) -> Result<Vec<(usize, f64)>> {
            Ok(self.0.clone())
        }

        fn topic_terms(&self, _topic: usize, _top_n: usize) -> Result<Vec<TopicTerm>> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(usize, usize)>>);

    impl Diagnostics for Recorder {
        fn topic_index_out_of_range(&self, topic_index: usize, names_len: usize) {
            self.0.lock().unwrap().push((topic_index, names_len));
        }
    }

    /// Collects formatted tracing output.
    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl CapturedLog {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLog {
        type Writer = CapturedLog;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn labels(names: &[&str]) -> Vec<TopicLabel> {
        names.iter().map(|n| TopicLabel::from(*n)).collect()
    }

    fn predictor_with(
        pairs: Vec<(usize, f64)>,
        names: &[&str],
        naming: NamingPolicy,
    ) -> Result<TopicPredictor<FixedScorer, Dictionary>> {
        TopicPredictor::new(
            Arc::new(FixedScorer(pairs)),
            Arc::new(Dictionary::from_tokens(["graph"])),
            labels(names),
            naming,
        )
    }

    fn predictor(pairs: Vec<(usize, f64)>, names: &[&str]) -> TopicPredictor<FixedScorer, Dictionary> {
        predictor_with(pairs, names, NamingPolicy::Strict).unwrap()
    }

    #[test]
    fn test_sorted_descending() {
        let p = predictor(vec![(0, 0.2), (1, 0.5), (2, 0.3)], &["A", "B", "C"]);
        let out = p.predict(&["graph".to_string()]).unwrap();
        let labels: Vec<String> = out.iter().map(|p| p.label.to_string()).collect();
        assert_eq!(labels, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_ties_keep_model_order() {
        let p = predictor(vec![(2, 0.4), (0, 0.4), (1, 0.2)], &["A", "B", "C"]);
        let out = p.predict(&[]).unwrap();
        let labels: Vec<String> = out.iter().map(|p| p.label.to_string()).collect();
        assert_eq!(labels, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_out_of_range_skipped_and_reported_once_each() {
        let recorder = Arc::new(Recorder::default());
        let p = predictor_with(vec![(0, 0.1), (5, 0.6), (3, 0.3)], &["A", "B"], NamingPolicy::Truncate)
            .unwrap()
            .with_diagnostics(recorder.clone());

        let out = p.predict(&[]).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].label, TopicLabel::from("A"));

        let events = recorder.0.lock().unwrap().clone();
        assert_eq!(events, vec![(5, 2), (3, 2)]);
    }

    #[test]
    fn test_set_topic_names_replaces_snapshot() {
        let p = predictor(vec![(0, 1.0)], &["Old"]);
        let before = p.topic_names();
        p.set_topic_names(labels(&["New"])).unwrap();

        assert_eq!(before[0], TopicLabel::from("Old"));
        let out = p.predict(&[]).unwrap();
        assert_eq!(out[0].label, TopicLabel::from("New"));
    }

    #[test]
    fn test_strict_new_rejects_name_count_mismatch() {
        let err = predictor_with(vec![(0, 0.5), (1, 0.5)], &["A"], NamingPolicy::Strict)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            TopicModelError::NameCountMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_strict_set_topic_names_keeps_old_names_on_mismatch() {
        let p = predictor(vec![(0, 0.6), (1, 0.4)], &["A", "B"]);

        let err = p.set_topic_names(labels(&["Only"])).unwrap_err();
        assert!(matches!(err, TopicModelError::NameCountMismatch { .. }));
        assert_eq!(&*p.topic_names(), labels(&["A", "B"]).as_slice());

        let err = p.set_topic_names(labels(&["A", "B", "C"])).unwrap_err();
        assert!(matches!(err, TopicModelError::NameCountMismatch { .. }));
        assert_eq!(p.predict(&[]).unwrap()[0].label, TopicLabel::from("A"));
    }

    #[test]
    fn test_truncate_set_topic_names_accepts_short_list() {
        let p = predictor_with(vec![(0, 0.6), (1, 0.4)], &["A", "B"], NamingPolicy::Truncate).unwrap();
        p.set_topic_names(labels(&["Only"])).unwrap();
        assert_eq!(p.topic_names().len(), 1);
    }

    #[test]
    fn test_default_diagnostics_logs_warning_per_skipped_topic() {
        let p = predictor_with(vec![(0, 0.1), (5, 0.6), (3, 0.3)], &["A", "B"], NamingPolicy::Truncate)
            .unwrap();

        let log = CapturedLog::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(log.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        let out = tracing::subscriber::with_default(subscriber, || p.predict(&[]).unwrap());
        assert_eq!(out.len(), 1);

        let output = log.contents();
        let warnings: Vec<&str> = output
            .lines()
            .filter(|line| line.contains("Invalid topic index"))
            .collect();
        assert_eq!(warnings.len(), 2, "{output}");
        assert!(warnings.iter().all(|line| line.contains("WARN")), "{output}");
        assert!(warnings[0].contains("topic_index=5"), "{output}");
        assert!(warnings[1].contains("topic_index=3"), "{output}");
        assert!(warnings.iter().all(|line| line.contains("names_len=2")), "{output}");
    }
}
