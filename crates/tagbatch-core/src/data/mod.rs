pub mod batch;
pub mod corpus;

pub use batch::{PAD_ID, batch_ranges, make_batches, pad_examples};
pub use corpus::{Corpus, CorpusReader, FIELD_DELIMITER, LoadStats, SENTINEL};
