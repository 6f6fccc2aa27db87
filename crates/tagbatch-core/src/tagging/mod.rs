pub mod schema;
pub mod vocab;

pub use schema::{ENTITY_PREFIXES, LabelSchema};
pub use vocab::{
    DataMap, IndexMode, Indexer, OUTSIDE_ID, OUTSIDE_TAG, START_ID, START_TAG, STOP_ID, STOP_TAG,
    SymbolTable, UNK_ID, UNK_TOKEN,
};
