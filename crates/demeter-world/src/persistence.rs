//! Storage for the player's location preference.
//!
//! The store is a dumb key-less slot: it saves and loads one opaque blob.
//! [`LocationPreference`] handles the JSON encoding, so swapping the
//! backing store never changes the stored format.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use demeter_types::LocationId;

/// Errors from a [`PreferenceStore`] or from decoding its contents.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Reading or writing the backing file failed.
    #[error("preference store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored blob is not a valid preference.
    #[error("preference encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// A slot holding one opaque preference blob.
pub trait PreferenceStore {
    /// Replace the stored blob.
    fn save(&mut self, blob: &[u8]) -> Result<(), PersistError>;

    /// The stored blob, or `None` if nothing has been saved.
    fn load(&self) -> Result<Option<Vec<u8>>, PersistError>;
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for Box<S> {
    fn save(&mut self, blob: &[u8]) -> Result<(), PersistError> {
        (**self).save(blob)
    }

    fn load(&self) -> Result<Option<Vec<u8>>, PersistError> {
        (**self).load()
    }
}

// ---------------------------------------------------------------------------
// Preference payload
// ---------------------------------------------------------------------------

/// A user-defined location outside the built-in list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomLocation {
    /// Display name.
    pub name: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// The saved location choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPreference {
    /// Selected built-in location.
    pub location: LocationId,
    /// Custom coordinates, if the player entered any.
    pub custom: Option<CustomLocation>,
    /// When the preference was saved.
    pub saved_at: DateTime<Utc>,
}

impl LocationPreference {
    /// A preference for `location` stamped with the current time.
    pub fn new(location: LocationId, custom: Option<CustomLocation>) -> Self {
        Self {
            location,
            custom,
            saved_at: Utc::now(),
        }
    }

    /// Encode as a JSON blob.
    pub fn to_blob(&self) -> Result<Vec<u8>, PersistError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a JSON blob.
    pub fn from_blob(blob: &[u8]) -> Result<Self, PersistError> {
        Ok(serde_json::from_slice(blob)?)
    }
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// Keeps the blob in memory. Used by tests and headless runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    /// The saved blob.
    blob: Option<Vec<u8>>,
}

impl MemoryStore {
    /// An empty store.
    pub const fn new() -> Self {
        Self { blob: None }
    }
}

impl PreferenceStore for MemoryStore {
    fn save(&mut self, blob: &[u8]) -> Result<(), PersistError> {
        self.blob = Some(blob.to_vec());
        Ok(())
    }

    fn load(&self) -> Result<Option<Vec<u8>>, PersistError> {
        Ok(self.blob.clone())
    }
}

/// Keeps the blob in a single file. A missing file means nothing saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStore {
    /// Path of the backing file.
    path: PathBuf,
}

impl FileStore {
    /// A store backed by `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FileStore {
    fn save(&mut self, blob: &[u8]) -> Result<(), PersistError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, blob)?;
        debug!(path = %self.path.display(), bytes = blob.len(), "Saved preference");
        Ok(())
    }

    fn load(&self) -> Result<Option<Vec<u8>>, PersistError> {
        match std::fs::read(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!(
                "demeter_pref_{}_{:?}",
                std::process::id(),
                std::thread::current().id()
            ))
            .join(name)
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());

        let pref = LocationPreference::new(LocationId::new("palmas"), None);
        store.save(&pref.to_blob().unwrap()).unwrap();

        let loaded = LocationPreference::from_blob(&store.load().unwrap().unwrap()).unwrap();
        assert_eq!(loaded, pref);
    }

    #[test]
    fn file_store_persists_custom_location() {
        let path = temp_path("location.json");
        let mut store = FileStore::new(&path);
        let pref = LocationPreference::new(
            LocationId::new("goiania"),
            Some(CustomLocation {
                name: "North field".to_owned(),
                latitude: -16.5,
                longitude: -49.1,
            }),
        );
        store.save(&pref.to_blob().unwrap()).unwrap();

        let reopened = FileStore::new(&path);
        let blob = reopened.load().unwrap().unwrap();
        assert_eq!(LocationPreference::from_blob(&blob).unwrap(), pref);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_loads_nothing() {
        let store = FileStore::new(temp_path("never_written.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn garbage_blob_is_an_encoding_error() {
        let err = LocationPreference::from_blob(b"not json").unwrap_err();
        assert!(matches!(err, PersistError::Encoding(_)));
    }
}
