//! User preferences.
//!
//! A small key-value store remembers the last selected 3D model, the last
//! searched specimen and whether searches are restricted to the local
//! inventory. Values are plain strings; the local-search flag is stored as
//! `"true"` / `"false"`.

use herbarium_model::SearchScope;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid preference file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Preference store lock poisoned")]
    Poisoned,
}

/// The keys this application stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    Model,
    Specimen,
    LocalSearchChecked,
}

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 3] = [Self::Model, Self::Specimen, Self::LocalSearchChecked];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Specimen => "specimen",
            Self::LocalSearchChecked => "localSearchChecked",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == s)
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key-value storage for preferences.
pub trait PreferenceStore {
    fn get(&self, key: PreferenceKey) -> Option<String>;

    fn set(&self, key: PreferenceKey, value: &str) -> Result<(), PrefsError>;
}

/// Preferences kept in memory only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: PreferenceKey) -> Option<String> {
        self.values.lock().ok()?.get(key.as_str()).cloned()
    }

    fn set(&self, key: PreferenceKey, value: &str) -> Result<(), PrefsError> {
        self.values
            .lock()
            .map_err(|_| PrefsError::Poisoned)?
            .insert(key.as_str().to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences persisted as a flat JSON object.
///
/// The file is read once when opened and rewritten whole on every `set`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PrefsError> {
        let path = path.as_ref().to_path_buf();

        let values = match std::fs::read_to_string(&path) {
            Ok(json) if json.trim().is_empty() => BTreeMap::new(),
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(PrefsError::Io { path, source }),
        };

        tracing::debug!(path = %path.display(), keys = values.len(), "Opened preference store");

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, values: &BTreeMap<String, String>) -> Result<(), PrefsError> {
        let io_err = |source| PrefsError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, json).map_err(io_err)
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: PreferenceKey) -> Option<String> {
        self.values.lock().ok()?.get(key.as_str()).cloned()
    }

    fn set(&self, key: PreferenceKey, value: &str) -> Result<(), PrefsError> {
        let mut values = self.values.lock().map_err(|_| PrefsError::Poisoned)?;
        let mut updated = values.clone();
        updated.insert(key.as_str().to_string(), value.to_string());
        self.write(&updated)?;
        *values = updated;
        Ok(())
    }
}

/// The user's remembered selections, backed by a store.
pub struct UserPreferences<S> {
    store: S,
    model: Option<String>,
    specimen: Option<String>,
    local_search: bool,
}

impl<S: PreferenceStore> UserPreferences<S> {
    /// Read every preference from `store`.
    pub fn load(store: S) -> Self {
        let model = store.get(PreferenceKey::Model);
        let specimen = store.get(PreferenceKey::Specimen);
        let local_search = parse_flag(store.get(PreferenceKey::LocalSearchChecked).as_deref());

        Self {
            store,
            model,
            specimen,
            local_search,
        }
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn specimen(&self) -> Option<&str> {
        self.specimen.as_deref()
    }

    pub fn local_search(&self) -> bool {
        self.local_search
    }

    pub fn scope(&self) -> SearchScope {
        SearchScope::from(self.local_search)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn select_model(&mut self, model: &str) -> Result<(), PrefsError> {
        self.store.set(PreferenceKey::Model, model)?;
        self.model = Some(model.to_string());
        Ok(())
    }

    pub fn select_specimen(&mut self, specimen: &str) -> Result<(), PrefsError> {
        self.store.set(PreferenceKey::Specimen, specimen)?;
        self.specimen = Some(specimen.to_string());
        Ok(())
    }

    pub fn set_local_search(&mut self, local: bool) -> Result<(), PrefsError> {
        self.store
            .set(PreferenceKey::LocalSearchChecked, if local { "true" } else { "false" })?;
        self.local_search = local;
        Ok(())
    }
}

/// `"true"` is true; anything else, including absence, is false.
pub fn parse_flag(value: Option<&str>) -> bool {
    value == Some("true")
}
