//! Corpus loading for line-oriented tagged text.
//!
//! Each content line is `<token>\t<label>`; a line reading exactly `end`
//! closes the current example.

use std::fs;
use std::path::Path;

use encoding_rs::{Encoding, UTF_8};
use tracing::{debug, info, warn};

use crate::error::{Result, TagBatchError};
use crate::tagging::Indexer;
use crate::types::Example;

/// Line that terminates an example.
pub const SENTINEL: &str = "end";

/// Separator between the token and label fields.
pub const FIELD_DELIMITER: char = '\t';

/// Counters collected while reading a corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Examples kept.
    pub examples: usize,
    /// Lines that did not split into exactly two fields.
    pub skipped_lines: usize,
    /// Examples dropped because they had no content lines.
    pub empty_examples: usize,
    /// Content lines after the last sentinel, discarded.
    pub unterminated_lines: usize,
    /// Token-table size after loading.
    pub vocab_size: usize,
    /// Label-table size after loading.
    pub tag_count: usize,
}

/// Examples read from one corpus, in file order.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub examples: Vec<Example>,
    pub stats: LoadStats,
}

/// Reads tagged corpora and routes every symbol through an [`Indexer`].
#[derive(Debug, Clone)]
pub struct CorpusReader {
    encoding: &'static Encoding,
    sentinel: String,
    delimiter: char,
}

impl Default for CorpusReader {
    fn default() -> Self {
        Self {
            encoding: UTF_8,
            sentinel: SENTINEL.to_string(),
            delimiter: FIELD_DELIMITER,
        }
    }
}

impl CorpusReader {
    /// UTF-8 reader with the standard sentinel and delimiter.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Select the charset by its WHATWG label (`"utf-8"`, `"gbk"`, ...).
    ///
    /// # Errors
    /// [`TagBatchError::Configuration`] for labels `encoding_rs` does not know.
    pub fn with_encoding_label(self, label: &str) -> Result<Self> {
        let encoding = Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
            TagBatchError::Configuration(format!("unknown encoding {label:?}"))
        })?;
        Ok(self.with_encoding(encoding))
    }

    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Read and decode `path`, then index its examples.
    ///
    /// # Errors
    /// [`TagBatchError::Io`] if the file cannot be read,
    /// [`TagBatchError::Decode`] if its bytes are invalid in the charset.
    pub fn read<P: AsRef<Path>>(&self, path: P, indexer: &mut Indexer) -> Result<Corpus> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| TagBatchError::io(path, e))?;
        let text = self
            .encoding
            .decode_without_bom_handling_and_without_replacement(&bytes)
            .ok_or_else(|| TagBatchError::Decode {
                path: path.to_path_buf(),
                encoding: self.encoding.name(),
            })?;

        let corpus = self.read_str(&text, indexer)?;
        info!(
            path = %path.display(),
            examples = corpus.stats.examples,
            vocab_size = corpus.stats.vocab_size,
            unique_tags = corpus.stats.tag_count,
            "loaded corpus"
        );
        Ok(corpus)
    }

    /// Index already-decoded corpus text.
    pub fn read_str(&self, text: &str, indexer: &mut Indexer) -> Result<Corpus> {
        let mut examples = Vec::new();
        let mut stats = LoadStats::default();
        let mut tokens = Vec::new();
        let mut labels = Vec::new();
        let mut pending_lines = 0usize;

        for line in text.lines() {
            if line == self.sentinel {
                if tokens.is_empty() {
                    stats.empty_examples += 1;
                } else {
                    examples.push(Example::new(
                        std::mem::take(&mut tokens),
                        std::mem::take(&mut labels),
                    )?);
                }
                pending_lines = 0;
                continue;
            }

            let mut fields = line.split(self.delimiter);
            let (Some(token), Some(label), None) = (fields.next(), fields.next(), fields.next())
            else {
                stats.skipped_lines += 1;
                continue;
            };

            tokens.push(indexer.index_token(token));
            labels.push(indexer.index_label(label));
            pending_lines += 1;
        }

        if pending_lines > 0 {
            warn!(
                lines = pending_lines,
                sentinel = %self.sentinel,
                "discarding lines after the last sentinel"
            );
        }
        if stats.empty_examples > 0 {
            debug!(count = stats.empty_examples, "dropped empty examples");
        }
        if stats.skipped_lines > 0 {
            debug!(count = stats.skipped_lines, "skipped malformed lines");
        }

        stats.unterminated_lines = pending_lines;
        stats.examples = examples.len();
        stats.vocab_size = indexer.vocab_size();
        stats.tag_count = indexer.tag_count();

        Ok(Corpus { examples, stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagging::{DataMap, LabelSchema, OUTSIDE_ID, UNK_ID};

    fn train_indexer() -> Indexer {
        Indexer::growing(LabelSchema::from_entities(["DISEASE", "BODY"]).unwrap())
    }

    #[test]
    fn test_segments_on_sentinel() {
        let text = "头\tB-BODY\n部\tE-BODY\n痛\tS-DISEASE\nend\n发\tO\n热\tS-DISEASE\nend\n";
        let mut indexer = train_indexer();
        let corpus = CorpusReader::new().read_str(text, &mut indexer).unwrap();

        assert_eq!(corpus.examples.len(), 2);
        assert_eq!(corpus.examples[0].tokens(), &[1, 2, 3]);
        assert_eq!(corpus.examples[0].labels(), &[3, 4, 5]);
        assert_eq!(corpus.examples[1].tokens(), &[4, 5]);
        assert_eq!(corpus.examples[1].labels(), &[OUTSIDE_ID, 5]);

        assert_eq!(corpus.stats.examples, 2);
        assert_eq!(corpus.stats.vocab_size, 6);
        assert_eq!(corpus.stats.tag_count, 6);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let text = "a\tO\nno-tab-here\nb\tO\textra\n\nc\tS-BODY\nend\n";
        let mut indexer = train_indexer();
        let corpus = CorpusReader::new().read_str(text, &mut indexer).unwrap();

        assert_eq!(corpus.examples.len(), 1);
        assert_eq!(corpus.examples[0].len(), 2);
        assert_eq!(corpus.stats.skipped_lines, 3);
    }

    #[test]
    fn test_labels_outside_schema_map_to_outside() {
        let text = "a\tB-DRUG\nb\tSTART\nend\n";
        let mut indexer = train_indexer();
        let corpus = CorpusReader::new().read_str(text, &mut indexer).unwrap();

        // START is reserved, so it keeps its own id even though it is not in the schema
        assert_eq!(corpus.examples[0].labels(), &[OUTSIDE_ID, 1]);
        assert_eq!(indexer.tag_count(), 3);
    }

    #[test]
    fn test_empty_examples_dropped() {
        let text = "end\na\tO\nend\nend\n";
        let mut indexer = train_indexer();
        let corpus = CorpusReader::new().read_str(text, &mut indexer).unwrap();

        assert_eq!(corpus.examples.len(), 1);
        assert_eq!(corpus.stats.empty_examples, 2);
    }

    #[test]
    fn test_trailing_content_without_sentinel_is_discarded() {
        let text = "a\tO\nend\nb\tO\nc\tO";
        let mut indexer = train_indexer();
        let corpus = CorpusReader::new().read_str(text, &mut indexer).unwrap();

        assert_eq!(corpus.examples.len(), 1);
        assert_eq!(corpus.stats.unterminated_lines, 2);
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "a\tS-BODY\r\nend\r\n";
        let mut indexer = train_indexer();
        let corpus = CorpusReader::new().read_str(text, &mut indexer).unwrap();

        assert_eq!(corpus.examples.len(), 1);
        assert_eq!(indexer.tags().get("S-BODY"), Some(3));
    }

    #[test]
    fn test_frozen_reader_maps_unknowns_to_zero() {
        let map = DataMap::from_json(
            r#"{"vocab": {"unk": 0, "x": 1}, "tag_map": {"O": 0, "START": 1, "STOP": 2, "B-X": 3}}"#,
        )
        .unwrap();
        let mut indexer = Indexer::from_data_map(map).unwrap();
        let corpus = CorpusReader::new()
            .read_str("x\tB-X\ny\tB-Y\nend\n", &mut indexer)
            .unwrap();

        assert_eq!(corpus.examples[0].tokens(), &[1, UNK_ID]);
        assert_eq!(corpus.examples[0].labels(), &[3, OUTSIDE_ID]);
        assert_eq!(indexer.vocab_size(), 2);
        assert_eq!(indexer.tag_count(), 4);
    }

    #[test]
    fn test_custom_sentinel_and_delimiter() {
        let reader = CorpusReader::new().with_sentinel("").with_delimiter(' ');
        let mut indexer = train_indexer();
        let corpus = reader.read_str("a O\nb S-BODY\n\nc O\n\n", &mut indexer).unwrap();
        assert_eq!(corpus.examples.len(), 2);
    }

    #[test]
    fn test_unknown_encoding_label() {
        let err = CorpusReader::new().with_encoding_label("klingon").unwrap_err();
        assert!(matches!(err, TagBatchError::Configuration(_)));
        assert!(CorpusReader::new().with_encoding_label("gbk").is_ok());
    }
}
