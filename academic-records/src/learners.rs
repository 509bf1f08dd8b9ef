//! Learner store backed by `usuarios.json`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{RecordKind, RecordsError, StoreError};
use crate::persist;
use crate::types::LearnerRecord;

/// Access to learner records with whole-store persistence.
///
/// Mutations happen in memory; [`save`](LearnerRepository::save) writes the
/// entire store back.
pub trait LearnerRepository {
    /// Look up a learner by name.
    fn get(&self, name: &str) -> Option<&LearnerRecord>;

    /// Mutable lookup by name.
    fn get_mut(&mut self, name: &str) -> Option<&mut LearnerRecord>;

    /// Add a learner. Returns `false` if the name is already taken.
    fn insert(&mut self, record: LearnerRecord) -> bool;

    /// Drop a learner, returning the removed record.
    fn remove(&mut self, name: &str) -> Option<LearnerRecord>;

    /// All learners, in key order.
    fn learners(&self) -> Box<dyn Iterator<Item = &LearnerRecord> + '_>;

    /// Persist every record.
    fn save(&self) -> Result<(), StoreError>;

    /// Like [`get`](LearnerRepository::get), but unknown names are an error.
    fn require(&self, name: &str) -> Result<&LearnerRecord, RecordsError> {
        self.get(name)
            .ok_or_else(|| RecordsError::not_found(RecordKind::Learner, name))
    }

    /// Like [`get_mut`](LearnerRepository::get_mut), but unknown names are an error.
    fn require_mut(&mut self, name: &str) -> Result<&mut LearnerRecord, RecordsError> {
        self.get_mut(name)
            .ok_or_else(|| RecordsError::not_found(RecordKind::Learner, name))
    }
}

/// JSON-file learner store.
#[derive(Debug, Clone, Default)]
pub struct LearnerStore {
    /// Backing file; `None` for a store that never touches disk
    path: Option<PathBuf>,
    learners: BTreeMap<String, LearnerRecord>,
}

impl LearnerStore {
    /// Load the store. A missing file yields an empty store.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut learners: BTreeMap<String, LearnerRecord> =
            persist::read_document(&path)?.unwrap_or_default();
        for (name, record) in learners.iter_mut() {
            record.name = name.clone();
        }

        debug!(path = %path.display(), learners = learners.len(), "Loaded learner store");
        Ok(Self {
            path: Some(path),
            learners,
        })
    }

    /// An empty store with no backing file.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.learners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.learners.is_empty()
    }
}

impl LearnerRepository for LearnerStore {
    fn get(&self, name: &str) -> Option<&LearnerRecord> {
        self.learners.get(name)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut LearnerRecord> {
        self.learners.get_mut(name)
    }

    fn insert(&mut self, record: LearnerRecord) -> bool {
        if self.learners.contains_key(&record.name) {
            return false;
        }
        self.learners.insert(record.name.clone(), record);
        true
    }

    fn remove(&mut self, name: &str) -> Option<LearnerRecord> {
        self.learners.remove(name)
    }

    fn learners(&self) -> Box<dyn Iterator<Item = &LearnerRecord> + '_> {
        Box::new(self.learners.values())
    }

    fn save(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        persist::write_document(path, &self.learners)?;
        debug!(path = %path.display(), "Saved learner store");
        Ok(())
    }
}
