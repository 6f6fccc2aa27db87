use std::path::PathBuf;

use crate::error::{Result, TagBatchError};
use crate::tagging::schema::check_entity_name;
use crate::types::Purpose;

pub const DEFAULT_BATCH_SIZE: usize = 20;
pub const DEFAULT_MAX_LENGTH: usize = 100;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_DATA_MAP: &str = "models/data_map.json";
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Configuration for a [`crate::DataManager`].
///
/// Build it with [`DataConfig::train`] for train runs or
/// [`DataConfig::new`] for dev and test runs. The [`Default`] value is a
/// train configuration with no entity names and does not pass
/// [`DataConfig::validate`] until some are added.
#[derive(Debug, Clone)]
pub struct DataConfig {
    /// What the corpus is loaded for; only train runs grow the tables.
    pub purpose: Purpose,
    /// Examples per batch.
    pub batch_size: usize,
    /// Sequence length hint for downstream model sizing. Not used to truncate.
    pub max_length: usize,
    /// Base entity names expanded into the label schema (train only).
    pub entities: Vec<String>,
    /// Directory holding `train`, `dev` and `test` corpora.
    pub data_dir: PathBuf,
    /// Explicit corpus file, overriding `data_dir/<purpose>`.
    pub corpus_path: Option<PathBuf>,
    /// Persisted tables read by dev and test runs.
    pub data_map_path: PathBuf,
    /// WHATWG label of the corpus charset.
    pub encoding: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            purpose: Purpose::Train,
            batch_size: DEFAULT_BATCH_SIZE,
            max_length: DEFAULT_MAX_LENGTH,
            entities: Vec::new(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            corpus_path: None,
            data_map_path: PathBuf::from(DEFAULT_DATA_MAP),
            encoding: DEFAULT_ENCODING.to_string(),
        }
    }
}

impl DataConfig {
    /// Default configuration for `purpose`.
    pub fn new(purpose: Purpose) -> Self {
        Self {
            purpose,
            ..Self::default()
        }
    }

    /// Train configuration over the given entity names.
    pub fn train<I, S>(entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Purpose::Train).with_entities(entities)
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_entities<I, S>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entities = entities.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_corpus_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.corpus_path = Some(path.into());
        self
    }

    pub fn with_data_map_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_map_path = path.into();
        self
    }

    pub fn with_encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = label.into();
        self
    }

    /// Corpus file this configuration reads.
    pub fn corpus_path(&self) -> PathBuf {
        self.corpus_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(self.purpose.as_str()))
    }

    /// Check the settings that do not need the filesystem.
    ///
    /// Entity names are required for train runs and rejected for the
    /// others, which take their schema from the persisted data map.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(TagBatchError::Configuration(
                "batch size must be at least 1".into(),
            ));
        }

        let has_entities = !self.entities.is_empty();
        match (self.purpose.is_train(), has_entities) {
            (true, true) => self
                .entities
                .iter()
                .try_for_each(|name| check_entity_name(name)),
            (true, false) => Err(TagBatchError::Configuration(
                "train runs need at least one entity name, e.g. [\"TREATMENT\", \"BODY\", \"SIGNS\", \"CHECK\", \"DISEASE\"]".into(),
            )),
            (false, true) => Err(TagBatchError::Configuration(format!(
                "{} runs take their labels from {:?}; entity names are only accepted for train",
                self.purpose, self.data_map_path
            ))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DataConfig::default();
        assert_eq!(config.purpose, Purpose::Train);
        assert_eq!(config.batch_size, 20);
        assert_eq!(config.max_length, 100);
        assert_eq!(config.encoding, "utf-8");
        assert_eq!(config.corpus_path(), PathBuf::from("data/train"));
    }

    #[test]
    fn default_needs_entities() {
        let err = DataConfig::default().validate().unwrap_err();
        assert!(matches!(err, TagBatchError::Configuration(_)));
        assert!(DataConfig::default().with_entities(["BODY"]).validate().is_ok());
    }

    #[test]
    fn corpus_path_follows_purpose() {
        let config = DataConfig::new(Purpose::Dev).with_data_dir("/corpora");
        assert_eq!(config.corpus_path(), PathBuf::from("/corpora/dev"));

        let config = config.with_corpus_path("/tmp/custom.txt");
        assert_eq!(config.corpus_path(), PathBuf::from("/tmp/custom.txt"));
    }

    #[test]
    fn train_requires_entities() {
        assert!(DataConfig::new(Purpose::Train).validate().is_err());
        assert!(DataConfig::train([" "]).validate().is_err());
        assert!(DataConfig::train([" BODY"]).validate().is_err());
        assert!(DataConfig::train(["BODY"]).validate().is_ok());
    }

    #[test]
    fn eval_rejects_entities() {
        assert!(DataConfig::new(Purpose::Test).validate().is_ok());
        let err = DataConfig::new(Purpose::Dev)
            .with_entities(["BODY"])
            .validate()
            .unwrap_err();
        assert!(matches!(err, TagBatchError::Configuration(_)));
    }

    #[test]
    fn zero_batch_size_rejected() {
        let config = DataConfig::train(["BODY"]).with_batch_size(0);
        assert!(config.validate().is_err());
    }
}
