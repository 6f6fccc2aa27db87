//! # Label Schema
//!
//! The closed set of label strings a train run may add to the label table.
//! Each base entity name expands into Begin/Inside/End/Single variants,
//! plus the shared "outside" label.

use std::collections::HashSet;
use std::fmt;

use crate::error::{Result, TagBatchError};
use crate::tagging::vocab::OUTSIDE_TAG;

/// Positional prefixes applied to every entity name, in schema order.
pub const ENTITY_PREFIXES: &[&str] = &["B-", "I-", "E-", "S-"];

/// Set of recognized label strings.
///
/// Keeps first-seen order for display and persistence; membership checks
/// go through a hash set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSchema {
    labels: Vec<String>,
    members: HashSet<String>,
}

impl LabelSchema {
    /// Expand base entity names into a schema.
    ///
    /// `["DISEASE"]` yields `B-DISEASE, I-DISEASE, E-DISEASE, S-DISEASE, O`.
    /// Repeated names collapse.
    ///
    /// # Errors
    /// Returns [`TagBatchError::Configuration`] if `names` is empty or any
    /// name is blank or has surrounding whitespace.
    pub fn from_entities<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut schema = Self::default();
        for name in names {
            let name = name.as_ref();
            check_entity_name(name)?;
            for prefix in ENTITY_PREFIXES {
                schema.push(format!("{prefix}{name}"));
            }
        }

        if schema.is_empty() {
            return Err(TagBatchError::Configuration(
                "train runs need at least one entity name, e.g. [\"DISEASE\", \"BODY\"]".into(),
            ));
        }

        schema.push(OUTSIDE_TAG.to_string());
        Ok(schema)
    }

    /// Rebuild a schema from persisted label strings, kept verbatim.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut schema = Self::default();
        for label in labels {
            schema.push(label.into());
        }
        schema
    }

    fn push(&mut self, label: String) {
        if self.members.insert(label.clone()) {
            self.labels.push(label);
        }
    }

    /// Whether `label` belongs to the schema.
    pub fn contains(&self, label: &str) -> bool {
        self.members.contains(label)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.labels.clone()
    }
}

/// Entity names are used verbatim, so blank or padded ones are rejected.
pub(crate) fn check_entity_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(TagBatchError::Configuration(
            "entity names must not be blank".into(),
        ));
    }
    if name.trim() != name {
        return Err(TagBatchError::Configuration(format!(
            "entity name {name:?} has surrounding whitespace"
        )));
    }
    Ok(())
}

impl fmt::Display for LabelSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.labels.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expands_every_prefix() {
        let schema = LabelSchema::from_entities(["DISEASE", "BODY"]).unwrap();
        let expected: HashSet<&str> = [
            "B-DISEASE",
            "I-DISEASE",
            "E-DISEASE",
            "S-DISEASE",
            "B-BODY",
            "I-BODY",
            "E-BODY",
            "S-BODY",
            "O",
        ]
        .into_iter()
        .collect();

        assert_eq!(schema.len(), 9);
        assert_eq!(schema.iter().collect::<HashSet<_>>(), expected);
    }

    #[test]
    fn test_order_and_outside_last() {
        let schema = LabelSchema::from_entities(["X"]).unwrap();
        assert_eq!(
            schema.to_vec(),
            vec!["B-X", "I-X", "E-X", "S-X", "O"]
        );
        assert_eq!(schema.to_string(), "[B-X, I-X, E-X, S-X, O]");
    }

    #[test]
    fn test_duplicates_collapse() {
        let schema = LabelSchema::from_entities(["BODY", "BODY"]).unwrap();
        assert_eq!(schema.len(), 5);
    }

    #[test]
    fn test_empty_names_rejected() {
        let err = LabelSchema::from_entities(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, TagBatchError::Configuration(_)));

        let err = LabelSchema::from_entities(["BODY", "  "]).unwrap_err();
        assert!(matches!(err, TagBatchError::Configuration(_)));
    }

    #[test]
    fn test_padded_names_rejected() {
        let err = LabelSchema::from_entities([" BODY"]).unwrap_err();
        assert!(matches!(err, TagBatchError::Configuration(msg) if msg.contains("\" BODY\"")));

        let err = LabelSchema::from_entities(["BODY\t"]).unwrap_err();
        assert!(matches!(err, TagBatchError::Configuration(_)));
    }

    #[test]
    fn test_membership() {
        let schema = LabelSchema::from_entities(["CHECK"]).unwrap();
        assert!(schema.contains("S-CHECK"));
        assert!(schema.contains("O"));
        assert!(!schema.contains("B-BODY"));
        assert!(!schema.contains("START"));
    }

    #[test]
    fn test_from_labels_keeps_input() {
        let schema = LabelSchema::from_labels(["O", "START", "STOP", "B-X"]);
        assert_eq!(schema.len(), 4);
        assert!(schema.contains("START"));
    }
}
