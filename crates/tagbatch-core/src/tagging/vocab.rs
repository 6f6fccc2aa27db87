//! # Token and Label Indexing
//!
//! Dense symbol→id tables for tokens and labels. A train run grows both
//! tables while reading its corpus; dev and test runs load the tables the
//! train run persisted and never add to them, so ids stay consistent
//! between training and evaluation.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, TagBatchError};
use crate::tagging::schema::LabelSchema;

/// Token every unknown token maps to.
pub const UNK_TOKEN: &str = "unk";
pub const UNK_ID: u32 = 0;

/// The "outside" label; also the id unknown labels map to.
pub const OUTSIDE_TAG: &str = "O";
pub const OUTSIDE_ID: u32 = 0;
pub const START_TAG: &str = "START";
pub const START_ID: u32 = 1;
pub const STOP_TAG: &str = "STOP";
pub const STOP_ID: u32 = 2;

/// Entries every token table starts with.
pub const RESERVED_TOKENS: &[(&str, u32)] = &[(UNK_TOKEN, UNK_ID)];

/// Entries every label table starts with.
pub const RESERVED_TAGS: &[(&str, u32)] = &[
    (OUTSIDE_TAG, OUTSIDE_ID),
    (START_TAG, START_ID),
    (STOP_TAG, STOP_ID),
];

/// A bijective, append-only mapping from symbols to dense ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    ids: HashMap<String, u32>,
    symbols: Vec<String>,
    default_id: u32,
}

impl SymbolTable {
    /// Create a table holding only `reserved`, which must list ids `0..n` in order.
    /// Unknown lookups return the first reserved id.
    pub fn with_reserved(reserved: &[(&str, u32)]) -> Self {
        let mut table = Self {
            ids: HashMap::with_capacity(reserved.len()),
            symbols: Vec::with_capacity(reserved.len()),
            default_id: reserved.first().map_or(0, |&(_, id)| id),
        };
        for &(symbol, id) in reserved {
            debug_assert_eq!(id as usize, table.symbols.len());
            table.push(symbol.to_string());
        }
        table
    }

    /// Replace the table wholesale with persisted entries.
    ///
    /// # Errors
    /// Returns [`TagBatchError::Load`] if a reserved entry is missing or bound
    /// to another id, or if the ids are not exactly `0..n`.
    pub fn from_map<I>(entries: I, reserved: &[(&str, u32)], kind: &str) -> Result<Self>
    where
        I: IntoIterator<Item = (String, u32)>,
    {
        let ids: HashMap<String, u32> = entries.into_iter().collect();

        for &(symbol, id) in reserved {
            match ids.get(symbol) {
                Some(&found) if found == id => {}
                Some(&found) => {
                    return Err(TagBatchError::Load(format!(
                        "{kind}: reserved entry {symbol:?} has id {found}, expected {id}"
                    )));
                }
                None => {
                    return Err(TagBatchError::Load(format!(
                        "{kind}: missing reserved entry {symbol:?}"
                    )));
                }
            }
        }

        let mut slots: Vec<Option<String>> = vec![None; ids.len()];
        for (symbol, &id) in &ids {
            let slot = slots.get_mut(id as usize).ok_or_else(|| {
                TagBatchError::Load(format!(
                    "{kind}: id {id} for {symbol:?} is outside 0..{}",
                    ids.len()
                ))
            })?;
            if let Some(other) = slot {
                return Err(TagBatchError::Load(format!(
                    "{kind}: {symbol:?} and {other:?} share id {id}"
                )));
            }
            *slot = Some(symbol.clone());
        }
        // Every id is in range and none repeats, so every slot is filled.
        let symbols: Vec<String> = slots.into_iter().flatten().collect();

        Ok(Self {
            ids,
            symbols,
            default_id: reserved.first().map_or(0, |&(_, id)| id),
        })
    }

    fn push(&mut self, symbol: String) -> u32 {
        let id = self.symbols.len() as u32;
        self.ids.insert(symbol.clone(), id);
        self.symbols.push(symbol);
        id
    }

    /// Id of `symbol`, if present.
    pub fn get(&self, symbol: &str) -> Option<u32> {
        self.ids.get(symbol).copied()
    }

    /// Read-only lookup; unknown symbols map to the default id.
    pub fn lookup(&self, symbol: &str) -> u32 {
        self.get(symbol).unwrap_or(self.default_id)
    }

    /// Look up `symbol`, appending it first when allowed.
    ///
    /// A new symbol gets id [`SymbolTable::len`] only if `allow_insert` is
    /// set and `allowed` is `None` or contains it. Otherwise unknown symbols
    /// map to the default id and the table is left untouched.
    pub fn lookup_or_insert(
        &mut self,
        symbol: &str,
        allow_insert: bool,
        allowed: Option<&LabelSchema>,
    ) -> u32 {
        if let Some(id) = self.get(symbol) {
            return id;
        }
        if allow_insert && allowed.is_none_or(|set| set.contains(symbol)) {
            return self.push(symbol.to_string());
        }
        self.default_id
    }

    /// Symbol bound to `id`.
    pub fn symbol(&self, id: u32) -> Option<&str> {
        self.symbols.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// `(symbol, id)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(id, symbol)| (symbol.as_str(), id as u32))
    }

    pub fn to_map(&self) -> BTreeMap<String, u32> {
        self.iter().map(|(s, id)| (s.to_string(), id)).collect()
    }
}

/// Whether an [`Indexer`] may add new symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMode {
    /// New tokens, and new labels inside the schema, are appended.
    Growing,
    /// Lookup only; unknown symbols map to id 0.
    Frozen,
}

impl IndexMode {
    pub fn is_growing(self) -> bool {
        matches!(self, Self::Growing)
    }
}

/// Persisted form of the token and label tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataMap {
    pub vocab: BTreeMap<String, u32>,
    pub tag_map: BTreeMap<String, u32>,
    /// Label schema of the train run; defaults to the `tag_map` keys.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
struct RawDataMap {
    vocab: Option<BTreeMap<String, u32>>,
    tag_map: Option<BTreeMap<String, u32>>,
    #[serde(default)]
    tags: Vec<String>,
}

impl DataMap {
    /// Parse a JSON data map.
    ///
    /// # Errors
    /// [`TagBatchError::Load`] if `vocab` or `tag_map` is absent,
    /// [`TagBatchError::Json`] if the text is not a valid data map.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawDataMap = serde_json::from_str(json)?;
        let vocab = raw
            .vocab
            .ok_or_else(|| TagBatchError::Load("missing key `vocab`".into()))?;
        let tag_map = raw
            .tag_map
            .ok_or_else(|| TagBatchError::Load("missing key `tag_map`".into()))?;
        Ok(Self {
            vocab,
            tag_map,
            tags: raw.tags,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Owns the token table, the label table and the label schema.
#[derive(Debug, Clone)]
pub struct Indexer {
    tokens: SymbolTable,
    tags: SymbolTable,
    schema: LabelSchema,
    mode: IndexMode,
}

impl Indexer {
    /// Fresh tables that grow while a train corpus is read.
    pub fn growing(schema: LabelSchema) -> Self {
        Self {
            tokens: SymbolTable::with_reserved(RESERVED_TOKENS),
            tags: SymbolTable::with_reserved(RESERVED_TAGS),
            schema,
            mode: IndexMode::Growing,
        }
    }

    /// Frozen tables rebuilt from a persisted [`DataMap`].
    pub fn from_data_map(map: DataMap) -> Result<Self> {
        let tokens = SymbolTable::from_map(map.vocab, RESERVED_TOKENS, "vocab")?;
        let tags = SymbolTable::from_map(map.tag_map, RESERVED_TAGS, "tag_map")?;
        let schema = if map.tags.is_empty() {
            LabelSchema::from_labels(tags.iter().map(|(s, _)| s.to_string()))
        } else {
            LabelSchema::from_labels(map.tags)
        };

        Ok(Self {
            tokens,
            tags,
            schema,
            mode: IndexMode::Frozen,
        })
    }

    /// Read a JSON data map from disk into frozen tables.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| TagBatchError::io(path, e))?;
        let indexer = Self::from_data_map(DataMap::from_json(&json)?)?;
        info!(
            path = %path.display(),
            vocab = indexer.vocab_size(),
            tags = indexer.tag_count(),
            "loaded data map"
        );
        Ok(indexer)
    }

    /// Stop growing; later lookups never change the tables.
    pub fn freeze(&mut self) {
        self.mode = IndexMode::Frozen;
    }

    pub fn mode(&self) -> IndexMode {
        self.mode
    }

    pub fn schema(&self) -> &LabelSchema {
        &self.schema
    }

    pub fn tokens(&self) -> &SymbolTable {
        &self.tokens
    }

    pub fn tags(&self) -> &SymbolTable {
        &self.tags
    }

    /// Id for `token`, appending it in growing mode.
    pub fn index_token(&mut self, token: &str) -> u32 {
        self.tokens
            .lookup_or_insert(token, self.mode.is_growing(), None)
    }

    /// Id for `label`; only labels in the schema are appended.
    pub fn index_label(&mut self, label: &str) -> u32 {
        self.tags
            .lookup_or_insert(label, self.mode.is_growing(), Some(&self.schema))
    }

    /// Current token-table size.
    pub fn vocab_size(&self) -> usize {
        self.tokens.len()
    }

    /// Current label-table size.
    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    pub fn data_map(&self) -> DataMap {
        DataMap {
            vocab: self.tokens.to_map(),
            tag_map: self.tags.to_map(),
            tags: self.schema.to_vec(),
        }
    }

    /// Write the tables as JSON, creating parent directories as needed.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| TagBatchError::io(parent, e))?;
        }
        fs::write(path, self.data_map().to_json()?).map_err(|e| TagBatchError::io(path, e))?;
        debug!(path = %path.display(), "saved data map");
        Ok(())
    }
}
