use serde::{Deserialize, Serialize};

use crate::error::{Result, TagBatchError};

/// One segmented unit of the corpus as parallel token and label ids.
///
/// The two sequences always have the same length; [`Example::new`] is the
/// only way to build one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Example {
    tokens: Vec<u32>,
    labels: Vec<u32>,
}

impl Example {
    /// Pairs token ids with label ids.
    ///
    /// # Errors
    /// Returns [`TagBatchError::DataConsistency`] if the lengths differ.
    pub fn new(tokens: Vec<u32>, labels: Vec<u32>) -> Result<Self> {
        if tokens.len() != labels.len() {
            return Err(TagBatchError::DataConsistency {
                tokens: tokens.len(),
                labels: labels.len(),
            });
        }
        Ok(Self { tokens, labels })
    }

    pub fn tokens(&self) -> &[u32] {
        &self.tokens
    }

    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    /// Number of positions in the example.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// An [`Example`] right-padded to its batch's width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaddedExample {
    /// Token ids, padded with [`crate::PAD_ID`].
    pub tokens: Vec<u32>,
    /// Label ids, padded with [`crate::PAD_ID`].
    pub labels: Vec<u32>,
    /// Length before padding; never greater than `tokens.len()`.
    pub length: usize,
}

/// A group of padded examples sharing one sequence width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// Examples in corpus order.
    pub examples: Vec<PaddedExample>,
    /// Width every sequence in this batch was padded to.
    pub max_len: usize,
}

impl Batch {
    /// Number of examples in the batch.
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// True lengths of every example, in order.
    pub fn lengths(&self) -> Vec<usize> {
        self.examples.iter().map(|e| e.length).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PaddedExample> {
        self.examples.iter()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a PaddedExample;
    type IntoIter = std::slice::Iter<'a, PaddedExample>;

    fn into_iter(self) -> Self::IntoIter {
        self.examples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_rejects_mismatched_lengths() {
        let err = Example::new(vec![1, 2, 3], vec![0, 0]).unwrap_err();
        assert!(matches!(
            err,
            TagBatchError::DataConsistency {
                tokens: 3,
                labels: 2
            }
        ));
    }

    #[test]
    fn example_accessors() {
        let example = Example::new(vec![4, 5], vec![3, 0]).unwrap();
        assert_eq!(example.len(), 2);
        assert!(!example.is_empty());
        assert_eq!(example.tokens(), &[4, 5]);
        assert_eq!(example.labels(), &[3, 0]);
    }
}
