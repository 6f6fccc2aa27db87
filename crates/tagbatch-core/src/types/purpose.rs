use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TagBatchError;

/// What a corpus is loaded for.
///
/// Only [`Purpose::Train`] may grow the vocabulary and label tables;
/// every other purpose reuses the tables persisted by a train run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    /// Build the token and label tables while loading.
    #[default]
    Train,
    /// Held-out evaluation data.
    Dev,
    /// Final test data.
    Test,
}

impl Purpose {
    /// Returns `true` for the purpose that builds the index tables.
    #[must_use]
    pub fn is_train(self) -> bool {
        matches!(self, Self::Train)
    }

    /// Lowercase name, also used as the default corpus file name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Dev => "dev",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Purpose {
    type Err = TagBatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "train" => Ok(Self::Train),
            "dev" => Ok(Self::Dev),
            "test" => Ok(Self::Test),
            other => Err(TagBatchError::Configuration(format!(
                "unknown purpose {other:?}, expected train, dev or test"
            ))),
        }
    }
}
