//! # Tagbatch Core
//!
//! Turns line-oriented tagged corpora into padded integer batches for
//! sequence-tagging models: label schema expansion, token and label
//! indexing, corpus loading, fixed-size batching and batch iteration.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tagbatch_core::{DataConfig, DataManager};
//!
//! let config = DataConfig::train(["DISEASE", "BODY"])
//!     .with_batch_size(20)
//!     .with_corpus_path("data/train");
//! let manager = DataManager::new(config).unwrap();
//!
//! for batch in manager.batches() {
//!     assert!(batch.examples.iter().all(|e| e.tokens.len() == batch.max_len));
//! }
//! manager.save_data_map("models/data_map.json").unwrap();
//! ```
pub mod config;
pub mod data;
pub mod error;
pub mod manager;
pub mod tagging;
pub mod types;

// Re-export primary API
pub use config::DataConfig;
pub use data::{Corpus, CorpusReader, LoadStats, PAD_ID, batch_ranges, make_batches, pad_examples};
pub use error::{Result, TagBatchError};
pub use manager::DataManager;
pub use tagging::{DataMap, IndexMode, Indexer, LabelSchema, SymbolTable};
pub use types::{Batch, Example, PaddedExample, Purpose};
