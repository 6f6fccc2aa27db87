//! Corpus inspection tool
//!
//! Loads a tagged corpus the same way a training run would and prints the
//! resulting table sizes and batch shapes. Train runs can persist their
//! tables for later dev/test runs.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tagbatch_core::{DataConfig, DataManager, Purpose};
use tracing::{Level, info};

/// CLI arguments
#[derive(Parser)]
#[command(name = "tagbatch-inspect")]
#[command(about = "Inspect vocabulary, labels and batches of a tagged corpus")]
#[command(version)]
struct Cli {
    /// What the corpus is for: train, dev or test
    #[arg(short, long, default_value = "train", value_parser = parse_purpose)]
    purpose: Purpose,

    /// Corpus file (defaults to <data-dir>/<purpose>)
    #[arg(short, long)]
    corpus: Option<PathBuf>,

    /// Directory holding the train/dev/test corpora
    #[arg(short = 'D', long, env = "TAGBATCH_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Entity names for train runs, comma separated
    #[arg(short, long, value_delimiter = ',')]
    entities: Vec<String>,

    /// Examples per batch
    #[arg(short, long, default_value_t = 20)]
    batch_size: usize,

    /// Sequence length hint reported to the model
    #[arg(long, default_value_t = 100)]
    max_length: usize,

    /// Corpus charset label (utf-8, gbk, ...)
    #[arg(long, env = "TAGBATCH_ENCODING", default_value = "utf-8")]
    encoding: String,

    /// Persisted tables read by dev/test runs
    #[arg(short = 'm', long, env = "TAGBATCH_DATA_MAP", default_value = "models/data_map.json")]
    data_map: PathBuf,

    /// Write the tables here after a train run
    #[arg(long)]
    save_map: Option<PathBuf>,

    /// Print per-batch shapes
    #[arg(short, long)]
    verbose: bool,
}

fn parse_purpose(s: &str) -> std::result::Result<Purpose, String> {
    s.parse().map_err(|e: tagbatch_core::TagBatchError| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let mut config = DataConfig::new(cli.purpose)
        .with_entities(cli.entities)
        .with_batch_size(cli.batch_size)
        .with_max_length(cli.max_length)
        .with_data_dir(cli.data_dir)
        .with_data_map_path(cli.data_map)
        .with_encoding(cli.encoding);
    if let Some(corpus) = cli.corpus {
        config = config.with_corpus_path(corpus);
    }
    let corpus_path = config.corpus_path();
    let manager = DataManager::new(config)
        .with_context(|| format!("Failed to prepare {}", corpus_path.display()))?;

    let stats = manager.stats();
    let config = manager.config();
    println!("{} data: {}", manager.purpose(), stats.examples);
    println!("corpus: {} ({})", config.corpus_path().display(), config.encoding);
    if !manager.purpose().is_train() {
        println!("data map: {}", config.data_map_path.display());
    }
    println!("vocab size: {}", manager.vocab_size());
    println!("unique tag: {}", manager.tag_count());
    println!("skipped lines: {}", stats.skipped_lines);
    println!("empty examples: {}", stats.empty_examples);
    println!("batches: {}", manager.batches().len());
    println!("{}", "-".repeat(50));

    if cli.verbose {
        for (i, batch) in manager.batches().enumerate() {
            println!("batch {i}: {} x {}", batch.len(), batch.max_len);
        }
    }

    if let Some(path) = cli.save_map {
        anyhow::ensure!(
            manager.purpose().is_train(),
            "Only train runs produce tables worth saving"
        );
        manager
            .save_data_map(&path)
            .with_context(|| format!("Failed to save data map to {}", path.display()))?;
        info!("Saved data map to {}", path.display());
    }

    Ok(())
}
