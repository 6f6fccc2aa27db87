//! # Data Manager
//!
//! Ties the pipeline together: builds or loads the index tables, reads the
//! corpus for the configured purpose, and prepares padded batches.

use std::iter::Cycle;
use std::path::Path;
use std::slice;

use tracing::{info, warn};

use crate::config::DataConfig;
use crate::data::{CorpusReader, LoadStats, make_batches};
use crate::error::{Result, TagBatchError};
use crate::tagging::{Indexer, LabelSchema};
use crate::types::{Batch, Example, Purpose};

/// Loaded examples and their batches for one corpus.
///
/// Tables, examples and batches are fixed once [`DataManager::new`]
/// returns.
#[derive(Debug, Clone)]
pub struct DataManager {
    config: DataConfig,
    indexer: Indexer,
    examples: Vec<Example>,
    batches: Vec<Batch>,
    stats: LoadStats,
}

impl DataManager {
    /// Load the corpus described by `config`.
    ///
    /// Train runs expand `config.entities` into a schema and grow fresh
    /// tables; dev and test runs read `config.data_map_path` instead.
    ///
    /// # Errors
    /// Fails on invalid configuration, unreadable or undecodable files, and
    /// malformed data maps. Nothing is returned on partial failure.
    pub fn new(config: DataConfig) -> Result<Self> {
        config.validate()?;

        let indexer = if config.purpose.is_train() {
            Indexer::growing(LabelSchema::from_entities(&config.entities)?)
        } else {
            Indexer::load(&config.data_map_path)?
        };

        Self::with_indexer(config, indexer)
    }

    /// Load the corpus through an existing indexer, frozen afterwards.
    ///
    /// # Errors
    /// [`TagBatchError::Configuration`] if the config is invalid or the
    /// indexer is growing for a non-train purpose (or frozen for a train one).
    pub fn with_indexer(config: DataConfig, mut indexer: Indexer) -> Result<Self> {
        config.validate()?;
        if indexer.mode().is_growing() != config.purpose.is_train() {
            return Err(TagBatchError::Configuration(format!(
                "{} runs need a {} indexer, got {:?}",
                config.purpose,
                if config.purpose.is_train() { "growing" } else { "frozen" },
                indexer.mode()
            )));
        }

        let reader = CorpusReader::new().with_encoding_label(&config.encoding)?;
        let corpus = reader.read(config.corpus_path(), &mut indexer)?;
        indexer.freeze();

        if corpus.examples.is_empty() {
            warn!(purpose = %config.purpose, "corpus has no examples, no batches prepared");
        }

        let batches = make_batches(&corpus.examples, config.batch_size)?;
        info!(
            purpose = %config.purpose,
            batches = batches.len(),
            batch_size = config.batch_size,
            "prepared batches"
        );

        Ok(Self {
            config,
            indexer,
            examples: corpus.examples,
            batches,
            stats: corpus.stats,
        })
    }

    /// Each batch once, in order.
    pub fn batches(&self) -> slice::Iter<'_, Batch> {
        self.batches.iter()
    }

    /// Batches in order, wrapping to the first after the last.
    ///
    /// Never ends unless there are no batches; callers bound consumption.
    pub fn iter_forever(&self) -> Cycle<slice::Iter<'_, Batch>> {
        self.batches.iter().cycle()
    }

    pub fn batch_list(&self) -> &[Batch] {
        &self.batches
    }

    /// Re-batch the loaded examples with another batch size.
    pub fn rebatch(&self, batch_size: usize) -> Result<Vec<Batch>> {
        make_batches(&self.examples, batch_size)
    }

    /// Unpadded examples in corpus order.
    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn indexer(&self) -> &Indexer {
        &self.indexer
    }

    /// Token-table size, for sizing the embedding layer.
    pub fn vocab_size(&self) -> usize {
        self.indexer.vocab_size()
    }

    /// Label-table size, for sizing the output layer.
    pub fn tag_count(&self) -> usize {
        self.indexer.tag_count()
    }

    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    pub fn purpose(&self) -> Purpose {
        self.config.purpose
    }

    pub fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    pub fn max_length(&self) -> usize {
        self.config.max_length
    }

    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    /// Persist the tables so dev and test runs can reuse them.
    pub fn save_data_map<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.indexer.save(path)
    }
}
