// topicmodel: topic naming and prediction over a pretrained LDA model.
//
// This is the library root. `loader` and `predictor` are the public entry
// points; `model` and `dataset` hold the artifacts they work with.

pub mod config;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod model;
pub mod output;
pub mod predictor;
pub mod topics;
