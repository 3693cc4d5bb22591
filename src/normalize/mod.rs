//! Pokémon label normalization.
//!
//! Battle logs and pastes name the same fighter in many ways: nicknames, gender markers,
//! level/detail suffixes, and cosmetic forms. Every statistic is keyed on the canonical id
//! produced here, never on the raw label.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while loading a form table.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Failed to read form table: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse form table: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid form table: {0}")]
    ValidationError(String),
}

/// Maps a raw Pokémon label to its canonical key.
///
/// Implementations must be total: unrecognized input yields an empty string, which callers skip.
pub trait NameNormalizer {
    fn normalize(&self, raw: &str) -> String;
}

impl<F> NameNormalizer for F
where
    F: Fn(&str) -> String,
{
    fn normalize(&self, raw: &str) -> String {
        self(raw)
    }
}

const BUILTIN_FORMS: &str = include_str!("forms.toml");

/// Versioned lookup table collapsing form variants onto one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormTable {
    pub version: u32,

    #[serde(default)]
    pub forms: BTreeMap<String, String>,
}

impl FormTable {
    /// The table shipped with the crate.
    pub fn builtin() -> Result<Self, NormalizeError> {
        Self::from_toml(BUILTIN_FORMS)
    }

    pub fn from_file(path: &Path) -> Result<Self, NormalizeError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, NormalizeError> {
        let table: FormTable = toml::from_str(contents)?;
        table.validate()?;
        debug!(
            "Loaded form table v{} with {} entries",
            table.version,
            table.forms.len()
        );
        Ok(table)
    }

    fn validate(&self) -> Result<(), NormalizeError> {
        if self.version == 0 {
            return Err(NormalizeError::ValidationError(
                "version must be greater than 0".to_string(),
            ));
        }

        for (from, to) in &self.forms {
            if to.is_empty() || to_id(to) != *to {
                return Err(NormalizeError::ValidationError(format!(
                    "'{}' maps to non-canonical key '{}'",
                    from, to
                )));
            }
            if from.trim_end_matches('*').trim_end_matches('-').is_empty() {
                return Err(NormalizeError::ValidationError(
                    "empty form key".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Resolve an id to its bucket. Ids with no entry are their own bucket.
    pub fn resolve(&self, id: &str) -> String {
        if id.is_empty() {
            return String::new();
        }

        if let Some(target) = self.forms.get(id) {
            return target.clone();
        }

        self.forms
            .iter()
            .filter_map(|(key, target)| {
                let prefix = key.strip_suffix('*')?;
                id.starts_with(prefix).then_some((prefix.len(), target))
            })
            .max_by_key(|(len, _)| *len)
            .map(|(_, target)| target.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

/// Reduce a label to the species/form part.
///
/// Handles `Species, L50, M`, `Species @ Item`, `Species (M)` and `Nickname (Species)`.
pub fn strip_label(raw: &str) -> &str {
    let mut label = raw.trim();

    if let Some((head, _)) = label.split_once(',') {
        label = head.trim();
    }
    if let Some((head, _)) = label.split_once(" @ ") {
        label = head.trim();
    }
    for marker in ["(M)", "(F)"] {
        if let Some(head) = label.strip_suffix(marker) {
            label = head.trim();
        }
    }
    if let (Some(open), true) = (label.rfind('('), label.ends_with(')')) {
        let inner = label[open + 1..label.len() - 1].trim();
        if !inner.is_empty() {
            label = inner;
        }
    }

    label
}

/// Lower-case id with single `-` separators and no punctuation.
pub fn to_id(label: &str) -> String {
    let mut id = String::with_capacity(label.len());
    let mut pending_sep = false;

    for c in label.chars() {
        let c = match c {
            'é' | 'É' => 'e',
            c => c.to_ascii_lowercase(),
        };
        if c.is_ascii_alphanumeric() {
            if pending_sep && !id.is_empty() {
                id.push('-');
            }
            pending_sep = false;
            id.push(c);
        } else if matches!(c, ' ' | '-' | '_') {
            pending_sep = true;
        }
    }

    id
}

/// Default normalizer for Showdown labels.
#[derive(Debug, Clone)]
pub struct ShowdownNormalizer {
    table: FormTable,
}

impl ShowdownNormalizer {
    pub fn new(table: FormTable) -> Self {
        Self { table }
    }

    /// Normalizer backed by the built-in form table.
    pub fn builtin() -> Result<Self, NormalizeError> {
        Ok(Self::new(FormTable::builtin()?))
    }

    pub fn table_version(&self) -> u32 {
        self.table.version
    }
}

impl NameNormalizer for ShowdownNormalizer {
    fn normalize(&self, raw: &str) -> String {
        self.table.resolve(&to_id(strip_label(raw)))
    }
}
