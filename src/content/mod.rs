//! Bilingual content document and its editing model.
//!
//! The site content is a single JSON document holding one tree per
//! language. Trees are loosely shaped: sections map field names to strings,
//! nested records, or ordered sequences. This module keeps that flexibility
//! (trees are plain `serde_json::Value`s) while guaranteeing that both
//! language trees are always present.
//!
//! - `path`: dotted-path lookup over arbitrary JSON
//! - `defaults`: built-in document used when no backend has content

pub mod defaults;
pub mod path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Errors raised while validating or editing a content document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("Invalid content structure: missing '{0}' language tree")]
    MissingLanguage(Language),

    #[error("Invalid content structure: '{0}' language tree must be an object")]
    InvalidTree(Language),

    #[error("Invalid content structure: document must be a JSON object")]
    NotAnObject,

    #[error("Unknown language code: '{0}'")]
    UnknownLanguage(String),

    #[error("Field '{section}.{field}' is not a sequence")]
    NotASequence { section: String, field: String },

    #[error("Index {index} is out of range for '{section}.{field}' (length {len})")]
    IndexOutOfRange {
        section: String,
        field: String,
        index: usize,
        len: usize,
    },
}

/// A supported site language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    /// Primary language.
    #[serde(rename = "jp")]
    Japanese,
    /// Secondary language.
    #[serde(rename = "vn")]
    Vietnamese,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Japanese, Language::Vietnamese];

    /// Parse a wire code (`jp` or `vn`).
    pub fn from_code(code: &str) -> Result<Language, ContentError> {
        match code {
            "jp" => Ok(Language::Japanese),
            "vn" => Ok(Language::Vietnamese),
            other => Err(ContentError::UnknownLanguage(other.to_string())),
        }
    }

    /// The key this language uses in the content document.
    pub fn code(&self) -> &'static str {
        match self {
            Language::Japanese => "jp",
            Language::Vietnamese => "vn",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The full bilingual content tree.
///
/// Both language trees are always JSON objects. Construct one from untrusted
/// JSON with [`ContentDocument::from_value`]; every edit returns a new
/// document and leaves the receiver untouched, so readers holding the old
/// document never observe a half-applied change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentDocument {
    jp: Value,
    vn: Value,
}

impl ContentDocument {
    /// Build a document from two language trees.
    pub fn new(jp: Map<String, Value>, vn: Map<String, Value>) -> Self {
        Self {
            jp: Value::Object(jp),
            vn: Value::Object(vn),
        }
    }

    /// Validate an arbitrary JSON value as a content document.
    ///
    /// A language key that is absent or `null` is reported as missing. Keys
    /// other than the two language codes are dropped.
    pub fn from_value(value: Value) -> Result<Self, ContentError> {
        let Value::Object(mut root) = value else {
            return Err(ContentError::NotAnObject);
        };

        let mut take = |language: Language| match root.remove(language.code()) {
            None | Some(Value::Null) => Err(ContentError::MissingLanguage(language)),
            Some(tree @ Value::Object(_)) => Ok(tree),
            Some(_) => Err(ContentError::InvalidTree(language)),
        };

        let jp = take(Language::Japanese)?;
        let vn = take(Language::Vietnamese)?;
        Ok(Self { jp, vn })
    }

    /// Borrow one language tree.
    pub fn tree(&self, language: Language) -> &Value {
        match language {
            Language::Japanese => &self.jp,
            Language::Vietnamese => &self.vn,
        }
    }

    fn tree_mut(&mut self, language: Language) -> &mut Map<String, Value> {
        let tree = match language {
            Language::Japanese => &mut self.jp,
            Language::Vietnamese => &mut self.vn,
        };
        ensure_object(tree)
    }

    /// `true` when neither language tree has any section.
    pub fn is_empty(&self) -> bool {
        Language::ALL.iter().all(|&language| {
            self.tree(language)
                .as_object()
                .map_or(true, |tree| tree.is_empty())
        })
    }

    /// Resolve `"{language}.{section}.{field}[.{sub}...]"`, returning
    /// `default` when any segment is absent or the value is `null`.
    pub fn get(&self, dotted_path: &str, default: Value) -> Value {
        let (code, rest) = dotted_path
            .split_once('.')
            .unwrap_or((dotted_path, ""));
        let Ok(language) = Language::from_code(code) else {
            return default;
        };
        if rest.is_empty() {
            return self.tree(language).clone();
        }
        path::get_or(self.tree(language), rest, default)
    }

    /// Write `value` at `section.field` (or `section.field.sub_field`) of
    /// one language, creating the section and field record as needed.
    ///
    /// Without a sub-field the value replaces the field wholesale, which is
    /// how whole slide lists and partner lists are updated. With a sub-field
    /// only that key of the record is written; sibling keys are kept.
    pub fn with_field(
        &self,
        language: Language,
        section: &str,
        field: &str,
        value: Value,
        sub_field: Option<&str>,
    ) -> ContentDocument {
        let mut next = self.clone();
        let section_map = ensure_object(
            next.tree_mut(language)
                .entry(section.to_string())
                .or_insert_with(|| Value::Object(Map::new())),
        );

        match sub_field {
            Some(sub_field) => {
                let record = ensure_object(
                    section_map
                        .entry(field.to_string())
                        .or_insert_with(|| Value::Object(Map::new())),
                );
                record.insert(sub_field.to_string(), value);
            }
            None => {
                section_map.insert(field.to_string(), value);
            }
        }

        next
    }

    /// Clone the sequence stored at `section.field`. An absent field reads as
    /// an empty sequence.
    pub fn sequence(
        &self,
        language: Language,
        section: &str,
        field: &str,
    ) -> Result<Vec<Value>, ContentError> {
        let path = format!("{}.{}", section, field);
        match path::lookup(self.tree(language), &path) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items.clone()),
            Some(_) => Err(ContentError::NotASequence {
                section: section.to_string(),
                field: field.to_string(),
            }),
        }
    }

    /// Replace element `index` of a sequence field; `index == len` appends.
    pub fn with_entry(
        &self,
        language: Language,
        section: &str,
        field: &str,
        index: usize,
        value: Value,
    ) -> Result<ContentDocument, ContentError> {
        let mut items = self.sequence(language, section, field)?;
        match index.cmp(&items.len()) {
            std::cmp::Ordering::Less => items[index] = value,
            std::cmp::Ordering::Equal => items.push(value),
            std::cmp::Ordering::Greater => {
                return Err(out_of_range(section, field, index, items.len()))
            }
        }
        Ok(self.with_field(language, section, field, Value::Array(items), None))
    }

    /// Append one element to a sequence field.
    pub fn with_appended(
        &self,
        language: Language,
        section: &str,
        field: &str,
        value: Value,
    ) -> Result<ContentDocument, ContentError> {
        let mut items = self.sequence(language, section, field)?;
        items.push(value);
        Ok(self.with_field(language, section, field, Value::Array(items), None))
    }

    /// Remove element `index` of a sequence field.
    pub fn with_removed(
        &self,
        language: Language,
        section: &str,
        field: &str,
        index: usize,
    ) -> Result<ContentDocument, ContentError> {
        let mut items = self.sequence(language, section, field)?;
        if index >= items.len() {
            return Err(out_of_range(section, field, index, items.len()));
        }
        items.remove(index);
        Ok(self.with_field(language, section, field, Value::Array(items), None))
    }

    /// Swap two elements of a sequence field (slide and partner reordering).
    pub fn with_swapped(
        &self,
        language: Language,
        section: &str,
        field: &str,
        a: usize,
        b: usize,
    ) -> Result<ContentDocument, ContentError> {
        let mut items = self.sequence(language, section, field)?;
        for index in [a, b] {
            if index >= items.len() {
                return Err(out_of_range(section, field, index, items.len()));
            }
        }
        items.swap(a, b);
        Ok(self.with_field(language, section, field, Value::Array(items), None))
    }

    /// Convert into a plain JSON value.
    pub fn into_value(self) -> Value {
        let mut root = Map::new();
        root.insert(Language::Japanese.code().to_string(), self.jp);
        root.insert(Language::Vietnamese.code().to_string(), self.vn);
        Value::Object(root)
    }
}

impl<'de> Deserialize<'de> for ContentDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        ContentDocument::from_value(value).map_err(serde::de::Error::custom)
    }
}

/// Coerce a value into an object in place and borrow the map. Scalars and
/// sequences standing where a record is needed are replaced by `{}`.
fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}

fn out_of_range(section: &str, field: &str, index: usize, len: usize) -> ContentError {
    ContentError::IndexOutOfRange {
        section: section.to_string(),
        field: field.to_string(),
        index,
        len,
    }
}
