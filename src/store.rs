//! Persistence for tournament documents.
//!
//! The store has no business rules: it loads, saves and creates whole
//! documents keyed by [`TournamentId`]. [`JsonFileStore`] keeps one JSON
//! file per tournament and replaces it atomically (write to a temporary
//! file in the same directory, then rename over the old one), so a reader
//! never sees a half-written document.

use crate::models::{Tournament, TournamentFormat, TournamentId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Errors from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Owner of the canonical tournament documents.
pub trait TournamentStore: Send + Sync {
    /// Current document, or `None` if it was never created.
    fn load(&self, id: TournamentId) -> Result<Option<Tournament>, StoreError>;

    /// Durably replace the document stored under `tournament.id`.
    fn save(&self, tournament: &Tournament) -> Result<(), StoreError>;

    /// Build an empty document, persist it and return it. Overwrites any existing one.
    fn create(
        &self,
        id: TournamentId,
        name: &str,
        format: TournamentFormat,
    ) -> Result<Tournament, StoreError> {
        let tournament = Tournament::with_format(id, name, format);
        self.save(&tournament)?;
        Ok(tournament)
    }
}

impl<T: TournamentStore + ?Sized> TournamentStore for Arc<T> {
    fn load(&self, id: TournamentId) -> Result<Option<Tournament>, StoreError> {
        (**self).load(id)
    }

    fn save(&self, tournament: &Tournament) -> Result<(), StoreError> {
        (**self).save(tournament)
    }

    fn create(
        &self,
        id: TournamentId,
        name: &str,
        format: TournamentFormat,
    ) -> Result<Tournament, StoreError> {
        (**self).create(id, name, format)
    }
}

/// One pretty-printed JSON file per tournament under `dir`.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for `id`.
    pub fn path_for(&self, id: TournamentId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

impl TournamentStore for JsonFileStore {
    fn load(&self, id: TournamentId) -> Result<Option<Tournament>, StoreError> {
        let path = self.path_for(id);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, tournament: &Tournament) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        // Temp file must live in the same directory so the rename stays on one filesystem.
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer_pretty(&mut tmp, tournament)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path_for(tournament.id))
            .map_err(|e| e.error)?;
        sync_dir(&self.dir)?;
        log::debug!("Saved tournament {} to {}", tournament.id, self.dir.display());
        Ok(())
    }
}

/// Flush the directory entry so the rename itself survives a power loss.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    std::fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

/// In-memory store for tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<TournamentId, Tournament>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TournamentStore for MemoryStore {
    fn load(&self, id: TournamentId) -> Result<Option<Tournament>, StoreError> {
        Ok(self.documents.read().get(&id).cloned())
    }

    fn save(&self, tournament: &Tournament) -> Result<(), StoreError> {
        self.documents
            .write()
            .insert(tournament.id, tournament.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn memory_store_load_missing_is_none() {
        let store = MemoryStore::new();
        assert!(store.load(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn create_overwrites_existing_document() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        let mut first = store.create(id, "First", TournamentFormat::Open).unwrap();
        first.players.push("A".into());
        first.prizes.insert("A".into(), 0.0);
        store.save(&first).unwrap();

        let second = store.create(id, "Second", TournamentFormat::Open).unwrap();
        let loaded = store.load(id).unwrap().unwrap();
        assert_eq!(loaded, second);
        assert!(loaded.players.is_empty());
    }

    #[test]
    fn file_store_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let id = Uuid::new_v4();
        store.create(id, "Cup", TournamentFormat::Open).unwrap();
        store.create(id, "Cup again", TournamentFormat::Open).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from(format!("{id}.json"))]);
    }
}
