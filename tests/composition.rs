// Composition tests: load -> name -> predict with the bundled LDA backend.
//
// These tests check the properties callers rely on: predictions come back
// sorted, unnamed topics are skipped and reported, and renaming flows from
// the loader into new predictors only.

use std::sync::{Arc, Mutex};

use topicmodel::dataset::{Dataset, DatasetArtifact, PreprocessConfig};
use topicmodel::error::TopicModelError;
use topicmodel::loader::{LoaderOptions, ModelLoader};
use topicmodel::model::dictionary::Dictionary;
use topicmodel::model::lda::{Alpha, LdaArtifact, LdaModel};
use topicmodel::predictor::{Diagnostics, TopicPredictor};
use topicmodel::topics::{NamingPolicy, TopicLabel};

const WORDS: [&str; 6] = ["qubit", "entangle", "graph", "vertex", "neuron", "layer"];

fn model() -> LdaModel {
    let lambda: Vec<Vec<f64>> = (0..3)
        .map(|k| {
            (0..6)
                .map(|w| if w / 2 == k { 60.0 } else { 0.01 })
                .collect()
        })
        .collect();
    LdaModel::from_artifact(LdaArtifact {
        num_topics: 3,
        alpha: Alpha::Symmetric(0.1),
        id2word: WORDS.iter().map(|w| w.to_string()).collect(),
        lambda,
    })
    .unwrap()
}

fn dataset(dictionary: Dictionary) -> Dataset {
    Dataset::from_artifact(DatasetArtifact {
        name: "arxiv".to_string(),
        num_documents: 10,
        dictionary,
        preprocessing: PreprocessConfig::default(),
    })
    .unwrap()
}

fn loader(naming: NamingPolicy) -> ModelLoader {
    ModelLoader::from_parts(
        model(),
        dataset(Dictionary::from_tokens(WORDS)),
        &LoaderOptions {
            naming,
            ..LoaderOptions::default()
        },
    )
    .unwrap()
}

fn tokens(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn repeat(words: &[&str], times: usize) -> Vec<String> {
    let mut out = Vec::new();
    for _ in 0..times {
        out.extend(tokens(words));
    }
    out
}

#[derive(Default)]
struct Recorder(Mutex<Vec<usize>>);

impl Diagnostics for Recorder {
    fn topic_index_out_of_range(&self, topic_index: usize, _names_len: usize) {
        self.0.lock().unwrap().push(topic_index);
    }
}

// ============================================================
// Round trip
// ============================================================

#[test]
fn named_topic_comes_back_for_single_topic_document() {
    let mut loader = loader(NamingPolicy::Strict);
    loader.set_topic_names(["A", "B", "C"]).unwrap();

    let predictions = loader
        .predictor()
        .predict(&repeat(&["graph", "vertex"], 10))
        .unwrap();

    assert_eq!(predictions.len(), 1, "got {predictions:?}");
    assert_eq!(predictions[0].label, TopicLabel::from("B"));
    assert!(predictions[0].probability > 0.0 && predictions[0].probability <= 1.0);
}

#[test]
fn predictions_sorted_descending() {
    let loader = loader(NamingPolicy::Strict);
    let mut doc = repeat(&["neuron"], 8);
    doc.extend(repeat(&["qubit"], 4));
    doc.extend(repeat(&["graph"], 2));

    let predictions = loader.predictor().predict(&doc).unwrap();
    assert_eq!(predictions.len(), 3);
    for pair in predictions.windows(2) {
        assert!(pair[0].probability >= pair[1].probability);
    }
    assert_eq!(predictions[0].label, TopicLabel::Index(2));
}

#[test]
fn empty_document_does_not_fail() {
    let loader = loader(NamingPolicy::Strict);
    let predictions = loader.predictor().predict(&[]).unwrap();
    assert!(predictions.len() <= 3);
    let total: f64 = predictions.iter().map(|p| p.probability).sum();
    assert!(total <= 1.0 + 1e-9);
}

#[test]
fn unknown_tokens_are_ignored() {
    let loader = loader(NamingPolicy::Strict);
    let mut doc = repeat(&["qubit"], 10);
    doc.extend(tokens(&["blockchain", "synergy"]));

    let predictions = loader.predictor().predict(&doc).unwrap();
    assert_eq!(predictions[0].label, TopicLabel::Index(0));
}

#[test]
fn predict_text_uses_dataset_preprocessing() {
    let mut loader = loader(NamingPolicy::Strict);
    loader.set_topic_names(["Quantum", "Graphs", "Neural"]).unwrap();

    let text = "The neuron and the layer: a neuron, another LAYER, neuron layer neuron layer.";
    let predictions = loader
        .predictor()
        .predict_text(loader.dataset(), text)
        .unwrap();
    assert_eq!(predictions[0].label, TopicLabel::from("Neural"));
}

// ============================================================
// Out-of-range indices
// ============================================================

#[test]
fn unnamed_topics_skipped_and_reported() {
    let mut loader = loader(NamingPolicy::Truncate);
    loader.set_topic_names(["Quantum"]).unwrap();

    let recorder = Arc::new(Recorder::default());
    let predictor = loader.predictor().with_diagnostics(recorder.clone());

    let mut doc = repeat(&["neuron"], 8);
    doc.extend(repeat(&["graph"], 6));
    doc.extend(repeat(&["qubit"], 2));
    let predictions = predictor.predict(&doc).unwrap();

    assert_eq!(predictions.len(), 1);
    assert_eq!(predictions[0].label, TopicLabel::from("Quantum"));
    assert_eq!(*recorder.0.lock().unwrap(), vec![2, 1]);
}

// ============================================================
// Snapshots and errors
// ============================================================

#[test]
fn existing_predictor_keeps_its_names() {
    let mut loader = loader(NamingPolicy::Strict);
    let predictor = loader.predictor();
    loader.set_topic_names(["A", "B", "C"]).unwrap();

    let doc = repeat(&["graph"], 10);
    assert_eq!(predictor.predict(&doc).unwrap()[0].label, TopicLabel::Index(1));
    assert_eq!(
        loader.predictor().predict(&doc).unwrap()[0].label,
        TopicLabel::from("B")
    );
}

#[test]
fn loader_rejects_dictionary_outside_model() {
    let mut words: Vec<&str> = WORDS.to_vec();
    words.push("extra");
    let result = ModelLoader::from_parts(
        model(),
        dataset(Dictionary::from_tokens(words)),
        &LoaderOptions::default(),
    );
    assert!(matches!(result, Err(TopicModelError::Load { .. })));
}

#[test]
fn predictor_inherits_loader_naming_policy() {
    let strict = loader(NamingPolicy::Strict).predictor();
    let err = strict.set_topic_names(vec![TopicLabel::from("Only")]).unwrap_err();
    assert!(matches!(
        err,
        TopicModelError::NameCountMismatch {
            expected: 3,
            actual: 1
        }
    ));
    assert_eq!(strict.topic_names().len(), 3);

    let truncate = loader(NamingPolicy::Truncate).predictor();
    truncate.set_topic_names(vec![TopicLabel::from("Only")]).unwrap();
    assert_eq!(truncate.topic_names().len(), 1);
}

#[test]
fn dictionary_model_mismatch_is_inference_error() {
    // "extra" gets id 6, which the six-word model does not know
    let mut words: Vec<&str> = WORDS.to_vec();
    words.push("extra");
    let predictor = TopicPredictor::new(
        Arc::new(model()),
        Arc::new(Dictionary::from_tokens(words)),
        (0..3).map(TopicLabel::Index).collect(),
        NamingPolicy::Strict,
    )
    .unwrap();

    let err = predictor.predict(&tokens(&["extra"])).unwrap_err();
    assert!(matches!(err, TopicModelError::Inference(_)));
}
