// Colored terminal output for topic summaries and predictions.
//
// main.rs delegates all presentation here so the library types stay free of
// formatting concerns.

use colored::Colorize;

use crate::model::lda::format_terms;
use crate::predictor::Prediction;
use crate::topics::Topic;

const LABEL_WIDTH: usize = 36;
const BAR_WIDTH: usize = 20;

/// Display every topic with its label and top terms.
pub fn display_topics(topics: &[Topic]) {
    if topics.is_empty() {
        println!("No topics to show.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Topics ({}) ===", topics.len()).bold()
    );
    println!();

    for (i, topic) in topics.iter().enumerate() {
        let label = super::truncate_chars(&topic.label.to_string(), LABEL_WIDTH);
        println!("  {:>2}. {}", i, label.bold());
        println!("      {}", format_terms(&topic.terms).dimmed());
        println!();
    }
}

/// Display predictions as a bar chart, most probable first.
pub fn display_predictions(predictions: &[Prediction]) {
    if predictions.is_empty() {
        println!("No topic reached the minimum probability for this document.");
        return;
    }

    println!("\n{}", "=== Predicted Topics ===".bold());
    println!();

    for prediction in predictions {
        let label = super::truncate_chars(&prediction.label.to_string(), LABEL_WIDTH);
        println!(
            "  {:<width$} {} {:.3}",
            label,
            probability_bar(prediction.probability),
            prediction.probability,
            width = LABEL_WIDTH + 3,
        );
    }
    println!();
}

/// Colored `[=====     ]` bar for a probability in 0.0..=1.0.
fn probability_bar(probability: f64) -> colored::ColoredString {
    let filled = (probability.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    let bar = format!(
        "[{}{}]",
        "=".repeat(filled),
        " ".repeat(BAR_WIDTH.saturating_sub(filled))
    );

    if probability >= 0.5 {
        bar.bright_green()
    } else if probability >= 0.2 {
        bar.bright_yellow()
    } else {
        bar.bright_blue()
    }
}
