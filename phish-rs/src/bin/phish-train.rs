//! CLI tool for training the phishing model
//!
//! Fits the TF-IDF + logistic regression pipeline, prints a held-out
//! evaluation report and writes the model artifact loaded by `phish-rs`.
//!
//! # Usage
//!
//! ```bash
//! # Train from data/phishing_data.csv, or the bootstrap set if it is missing
//! phish-train
//!
//! # Explicit dataset and output
//! phish-train --dataset data/corpus.csv --output models/phishing_model.json
//!
//! # Only write the bootstrap dataset for inspection
//! phish-train --write-sample data/phishing_sample.csv
//! ```

use clap::Parser;
use phish_rs::dataset::{self, DatasetOrigin};
use phish_rs::{logging, Config, Trainer};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "phish-train")]
#[command(about = "Train the phishing classifier", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Labeled CSV dataset with `text` and `label` columns
    #[arg(short, long)]
    dataset: Option<String>,

    /// Where to write the trained model
    #[arg(short, long)]
    output: Option<String>,

    /// Seed for shuffling and splitting
    #[arg(long)]
    seed: Option<u64>,

    /// Fraction of examples held out for evaluation
    #[arg(long)]
    test_ratio: Option<f64>,

    /// Write the bootstrap dataset to this path and exit
    #[arg(long, value_name = "PATH")]
    write_sample: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dataset) = cli.dataset {
        config.training.dataset_path = dataset;
    }
    if let Some(output) = cli.output {
        config.model.path = output;
    }
    if let Some(seed) = cli.seed {
        config.training.seed = seed;
    }
    if let Some(test_ratio) = cli.test_ratio {
        config.training.test_ratio = test_ratio;
    }
    config.validate()?;

    logging::init(&config.logging)?;

    if let Some(path) = cli.write_sample {
        let examples = dataset::synthetic(config.training.seed);
        dataset::write_csv(&path, &examples)?;
        println!("✓ Wrote {} examples to {}", examples.len(), path.display());
        return Ok(());
    }

    let data = dataset::load_or_synthesize(&config.training)?;
    let (phishing, legitimate) = data.class_counts();
    match &data.origin {
        DatasetOrigin::File(path) => info!("Dataset: {}", path.display()),
        DatasetOrigin::Synthetic => info!("Dataset: bootstrap examples"),
    }
    info!(
        "{} examples (phishing: {}, legitimate: {})",
        data.examples.len(),
        phishing,
        legitimate
    );

    let trainer = Trainer::new(&config.training);
    let outcome = trainer.train_and_save(&data.examples, &config.model.path)?;

    println!("{}", outcome.report);
    println!();
    println!("✓ Model saved to {}", config.model.path);

    Ok(())
}
