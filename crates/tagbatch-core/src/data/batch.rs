//! Fixed-size batching with batch-local padding.

use std::ops::Range;

use crate::error::{Result, TagBatchError};
use crate::types::{Batch, Example, PaddedExample};

/// Value written into padded token and label positions.
pub const PAD_ID: u32 = 0;

/// Ranges of example indices making up each batch.
///
/// Batches are taken at offsets `0, B, 2B, ...` until `offset + B` reaches
/// `total`; the final batch is then the last `B` examples, which may repeat
/// examples from the previous batch. When `total < B` the single batch holds
/// every example and is therefore shorter than `B`.
pub fn batch_ranges(total: usize, batch_size: usize) -> Vec<Range<usize>> {
    if total == 0 || batch_size == 0 {
        return Vec::new();
    }

    let mut ranges = Vec::with_capacity(total.div_ceil(batch_size));
    let mut offset = 0;
    while offset + batch_size < total {
        ranges.push(offset..offset + batch_size);
        offset += batch_size;
    }
    ranges.push(total.saturating_sub(batch_size)..total);
    ranges
}

/// Pad a group of examples to the group's longest example.
///
/// The source examples are only read; every padded sequence is a new vector.
pub fn pad_examples(group: &[Example]) -> Batch {
    let max_len = group.iter().map(Example::len).max().unwrap_or(0);

    let examples = group
        .iter()
        .map(|example| {
            let mut tokens = Vec::with_capacity(max_len);
            tokens.extend_from_slice(example.tokens());
            tokens.resize(max_len, PAD_ID);

            let mut labels = Vec::with_capacity(max_len);
            labels.extend_from_slice(example.labels());
            labels.resize(max_len, PAD_ID);

            PaddedExample {
                tokens,
                labels,
                length: example.len(),
            }
        })
        .collect();

    Batch { examples, max_len }
}

/// Split `examples` into padded batches of `batch_size`.
///
/// # Errors
/// [`TagBatchError::Configuration`] if `batch_size` is zero.
pub fn make_batches(examples: &[Example], batch_size: usize) -> Result<Vec<Batch>> {
    if batch_size == 0 {
        return Err(TagBatchError::Configuration(
            "batch size must be at least 1".into(),
        ));
    }

    Ok(batch_ranges(examples.len(), batch_size)
        .into_iter()
        .map(|range| pad_examples(&examples[range]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example(len: usize, seed: u32) -> Example {
        let tokens = (0..len as u32).map(|i| seed * 100 + i + 1).collect();
        let labels = (0..len as u32).map(|i| i % 3 + 3).collect();
        Example::new(tokens, labels).unwrap()
    }

    #[test]
    fn test_padding_to_group_max() {
        let group = vec![example(3, 0), example(5, 1), example(2, 2)];
        let batch = pad_examples(&group);

        assert_eq!(batch.max_len, 5);
        assert_eq!(batch.lengths(), vec![3, 5, 2]);
        for (padded, original) in batch.iter().zip(&group) {
            assert_eq!(padded.tokens.len(), 5);
            assert_eq!(padded.labels.len(), 5);
            assert_eq!(&padded.tokens[..padded.length], original.tokens());
            assert_eq!(&padded.labels[..padded.length], original.labels());
            assert!(padded.tokens[padded.length..].iter().all(|&t| t == PAD_ID));
            assert!(padded.labels[padded.length..].iter().all(|&l| l == PAD_ID));
        }
    }

    #[test]
    fn test_padding_leaves_source_untouched() {
        let group = vec![example(1, 0), example(4, 1)];
        let before = group.clone();
        let _ = pad_examples(&group);
        let _ = pad_examples(&group);
        assert_eq!(group, before);
    }

    #[test]
    fn test_ranges_overlap_on_last_batch() {
        assert_eq!(batch_ranges(45, 20), vec![0..20, 20..40, 25..45]);
    }

    #[test]
    fn test_ranges_exact_multiple() {
        assert_eq!(batch_ranges(40, 20), vec![0..20, 20..40]);
        assert_eq!(batch_ranges(20, 20), vec![0..20]);
    }

    #[test]
    fn test_ranges_short_corpus() {
        assert_eq!(batch_ranges(7, 20), vec![0..7]);
        assert!(batch_ranges(0, 20).is_empty());
    }

    #[test]
    fn test_batch_size_one() {
        assert_eq!(batch_ranges(3, 1), vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn test_make_batches_sizes() {
        let examples: Vec<Example> = (0..45).map(|i| example(i % 7 + 1, i as u32)).collect();
        let batches = make_batches(&examples, 20).unwrap();

        assert_eq!(batches.len(), 3);
        assert!(batches.iter().all(|b| b.len() == 20));
        // Third batch starts at example 25
        assert_eq!(batches[2].examples[0].tokens[0], 2501);
        // Padding width is per batch
        for batch in &batches {
            let widest = batch.lengths().into_iter().max().unwrap();
            assert_eq!(batch.max_len, widest);
        }
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let err = make_batches(&[example(2, 0)], 0).unwrap_err();
        assert!(matches!(err, TagBatchError::Configuration(_)));
    }
}
