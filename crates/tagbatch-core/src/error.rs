use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while preparing tagged batches.
#[derive(Debug, Error)]
pub enum TagBatchError {
    /// Required setup is missing or invalid (e.g. no entity names for a train run).
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A corpus or data-map file could not be read or written.
    #[error("i/o error on {path:?}: {source}")]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Persisted vocabulary/label state is present but malformed.
    #[error("failed to load data map: {0}")]
    Load(String),

    /// The corpus bytes are not valid in the configured charset.
    #[error("failed to decode {path:?} as {encoding}")]
    Decode {
        /// The corpus file.
        path: PathBuf,
        /// Name of the charset used for decoding.
        encoding: &'static str,
    },

    /// Token and label sequences of one example have different lengths.
    #[error("token/label length mismatch: {tokens} tokens vs {labels} labels")]
    DataConsistency {
        /// Number of token ids.
        tokens: usize,
        /// Number of label ids.
        labels: usize,
    },

    /// The data map could not be (de)serialized.
    #[error("data map serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TagBatchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for tagbatch operations.
pub type Result<T> = std::result::Result<T, TagBatchError>;
