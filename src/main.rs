use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use topicmodel::config::Config;
use topicmodel::loader::ModelLoader;
use topicmodel::model::traits::Vocabulary;
use topicmodel::output::terminal;
use topicmodel::topics::load_topic_names;

/// topicmodel: name the topics of a trained LDA model and predict the
/// topics of new documents.
#[derive(Parser)]
#[command(name = "topicmodel", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the model and dataset and report what was found
    Check,

    /// List every topic with its label and top terms
    Topics {
        /// File of topic names (one per line, or a JSON array)
        #[arg(long)]
        names: Option<PathBuf>,
    },

    /// Predict the topics of a document
    Predict {
        /// File of topic names (one per line, or a JSON array)
        #[arg(long)]
        names: Option<PathBuf>,

        /// Raw text, tokenized with the dataset's preprocessing
        #[arg(long, conflicts_with = "tokens")]
        text: Option<String>,

        /// Print predictions as JSON instead of a chart
        #[arg(long)]
        json: bool,

        /// Pre-tokenized document
        tokens: Vec<String>,
    },
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("topicmodel=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Check => {
            let loader = open_loader(&config, None)?;
            let dataset = loader.dataset();
            println!("Model:   {}", config.model_path.display());
            println!("Dataset: {} ({})", config.dataset_path.display(), dataset.name());
            println!("  Topics:            {}", loader.num_topics());
            println!("  Model vocabulary:  {}", loader.model().vocabulary_size());
            println!("  Dictionary tokens: {}", dataset.dictionary().len());
            println!("  Training documents: {}", dataset.num_documents());
            println!("\n{}", "Artifacts look good.".bold());
        }

        Commands::Topics { names } => {
            let loader = open_loader(&config, names)?;
            terminal::display_topics(loader.topics());
        }

        Commands::Predict {
            names,
            text,
            json,
            tokens,
        } => {
            let loader = open_loader(&config, names)?;
            let predictor = loader.predictor();

            let predictions = match text {
                Some(text) => predictor.predict_text(loader.dataset(), &text)?,
                None => {
                    if tokens.is_empty() {
                        anyhow::bail!("Nothing to predict. Pass tokens or --text \"...\"");
                    }
                    predictor.predict(&tokens)?
                }
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&predictions)?);
            } else {
                terminal::display_predictions(&predictions);
            }
        }
    }

    Ok(())
}

/// Load the artifacts and apply topic names from `--names` or
/// TOPICMODEL_TOPIC_NAMES, in that order of preference.
fn open_loader(config: &Config, names: Option<PathBuf>) -> Result<ModelLoader> {
    config.require_artifacts()?;
    let mut loader = ModelLoader::load_with(
        &config.model_path,
        &config.dataset_path,
        &config.loader_options(),
    )
    .context("Failed to load the topic model")?;

    if let Some(path) = names.or_else(|| config.topic_names_path.clone()) {
        let names = load_topic_names(&path)?;
        info!(count = names.len(), path = %path.display(), "Applying topic names");
        loader
            .set_topic_names(names)
            .with_context(|| format!("Topic names in {} do not fit the model", path.display()))?;
    }

    Ok(loader)
}
