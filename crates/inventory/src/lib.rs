//! Local herbarium inventory and 3D model catalog.
//!
//! The inventory is the curated list of specimens the herbarium holds. It
//! backs every `SearchScope::Local` lookup (genus candidates, common-name
//! candidates, autocomplete) and maps 3D model display names to species.
//! A default inventory ships with the crate; deployments can load their
//! own JSON file with the same layout.

use herbarium_model::{CommonNameCandidate, TaxonRank};
use herbarium_names::{
    contains_ignore_case, dedup_case_insensitive, eq_ignore_case, genus_of, scientific_case,
    title_case,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const BUILTIN_INVENTORY: &str = include_str!("../data/inventory.json");

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Failed to read inventory {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid inventory JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid inventory entry: {0}")]
    Invalid(String),
}

/// One specimen held by the herbarium.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    /// Scientific (binomial) name
    pub scientific_name: String,

    /// English common names, most familiar first
    #[serde(default)]
    pub common_names: Vec<String>,

    /// Display name of the 3D model, if one was scanned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Encyclopedia title when it differs from the scientific name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki_name: Option<String>,
}

impl InventoryEntry {
    pub fn new(scientific_name: impl Into<String>) -> Self {
        Self {
            scientific_name: scientific_name.into(),
            common_names: Vec::new(),
            model: None,
            wiki_name: None,
        }
    }

    pub fn with_common_names(mut self, names: &[&str]) -> Self {
        self.common_names = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_wiki_name(mut self, wiki_name: impl Into<String>) -> Self {
        self.wiki_name = Some(wiki_name.into());
        self
    }

    pub fn genus(&self) -> Option<String> {
        genus_of(&self.scientific_name)
    }
}

#[derive(Debug, Deserialize)]
struct InventoryFile {
    entries: Vec<InventoryEntry>,
}

/// The herbarium's curated specimen list.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    entries: Vec<InventoryEntry>,
}

impl Inventory {
    pub fn new(entries: Vec<InventoryEntry>) -> Result<Self, InventoryError> {
        let entries = entries
            .into_iter()
            .map(|mut entry| {
                if entry.scientific_name.trim().is_empty() {
                    return Err(InventoryError::Invalid(
                        "scientific_name must not be empty".to_string(),
                    ));
                }
                entry.scientific_name = scientific_case(&entry.scientific_name);
                Ok(entry)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }

    /// The inventory bundled with this crate.
    pub fn builtin() -> Result<Self, InventoryError> {
        Self::from_json(BUILTIN_INVENTORY)
    }

    pub fn from_json(json: &str) -> Result<Self, InventoryError> {
        let file: InventoryFile = serde_json::from_str(json)?;
        Self::new(file.entries)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, InventoryError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| InventoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let inventory = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), entries = inventory.len(), "Loaded inventory");
        Ok(inventory)
    }

    pub fn entries(&self) -> &[InventoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for a scientific name, compared case-insensitively.
    pub fn find_species(&self, name: &str) -> Option<&InventoryEntry> {
        self.entries
            .iter()
            .find(|entry| eq_ignore_case(&entry.scientific_name, name))
    }

    /// Distinct genera, in inventory order.
    pub fn genera(&self) -> Vec<String> {
        dedup_case_insensitive(self.entries.iter().filter_map(InventoryEntry::genus))
    }

    pub fn has_genus(&self, genus: &str) -> bool {
        self.genera().iter().any(|g| eq_ignore_case(g, genus))
    }

    /// Species of a genus held locally, in inventory order.
    pub fn species_in_genus(&self, genus: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| {
                entry
                    .genus()
                    .is_some_and(|g| eq_ignore_case(&g, genus))
            })
            .map(|entry| entry.scientific_name.clone())
            .collect()
    }

    /// Species whose common names include `term` exactly (case-insensitive).
    pub fn by_common_name(&self, term: &str) -> Vec<CommonNameCandidate> {
        self.entries
            .iter()
            .filter(|entry| entry.common_names.iter().any(|c| eq_ignore_case(c, term)))
            .map(|entry| CommonNameCandidate::new(entry.scientific_name.clone(), TaxonRank::Species))
            .collect()
    }

    pub fn wiki_name_for(&self, scientific_name: &str) -> Option<&str> {
        self.find_species(scientific_name)
            .and_then(|entry| entry.wiki_name.as_deref())
    }

    /// Scientific names whose scientific or common names contain `query`.
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<String> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        self.entries
            .iter()
            .filter(|entry| {
                contains_ignore_case(&entry.scientific_name, query)
                    || entry
                        .common_names
                        .iter()
                        .any(|c| contains_ignore_case(c, query))
            })
            .map(|entry| entry.scientific_name.clone())
            .take(limit)
            .collect()
    }

    /// Display names of every 3D model, in inventory order.
    pub fn models(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|entry| entry.model.as_deref())
            .collect()
    }

    /// Models whose display name contains `query` (case-insensitive).
    pub fn filter_models(&self, query: &str) -> Vec<&str> {
        let query = query.trim();
        self.models()
            .into_iter()
            .filter(|model| query.is_empty() || contains_ignore_case(model, query))
            .collect()
    }

    /// Whether `name` (any casing, e.g. from a URL path) is a known model.
    pub fn in_model_list(&self, name: &str) -> bool {
        self.model_entry(name).is_some()
    }

    /// Scientific name behind a model display name.
    pub fn species_for_model(&self, name: &str) -> Option<&str> {
        self.model_entry(name)
            .map(|entry| entry.scientific_name.as_str())
    }

    /// Model display name for a species, if one was scanned.
    pub fn model_for_species(&self, scientific_name: &str) -> Option<&str> {
        self.find_species(scientific_name)
            .and_then(|entry| entry.model.as_deref())
    }

    fn model_entry(&self, name: &str) -> Option<&InventoryEntry> {
        let wanted = title_case(name.trim());
        self.entries.iter().find(|entry| {
            entry
                .model
                .as_deref()
                .is_some_and(|model| title_case(model) == wanted)
        })
    }
}
