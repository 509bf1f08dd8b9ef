//! Audit trail of record-changing events.
//!
//! Events are appended to a JSON-lines file and kept in a bounded in-memory
//! buffer for the current session.

use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Maximum entries kept in memory before pruning.
const MAX_AUDIT_ENTRIES: usize = 1_000;

/// Action recorded after a certificate is issued.
pub const CERTIFICATE_ISSUED: &str = "Certificado emitido";
/// Action recorded after a learner enrolls in a course.
pub const ENROLLMENT: &str = "Matrícula realizada";
/// Action recorded after a learner completes a module.
pub const MODULE_COMPLETED: &str = "Módulo concluído";
/// Action recorded after a learner is registered.
pub const LEARNER_REGISTERED: &str = "Aluno cadastrado";
/// Action recorded after a course is created.
pub const COURSE_CREATED: &str = "Curso criado";
/// Action recorded after a course is edited.
pub const COURSE_EDITED: &str = "Curso editado";
/// Action recorded after a course is removed from the catalog.
pub const COURSE_REMOVED: &str = "Curso deletado";
/// Action recorded after a module is added to a course.
pub const MODULE_ADDED: &str = "Módulo adicionado";

/// One line of the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    #[serde(with = "crate::timestamp")]
    pub at: DateTime<Utc>,
    pub action: String,
    pub details: String,
}

/// Append-only audit log.
#[derive(Debug)]
pub struct AuditLog {
    /// JSON-lines file; `None` keeps events in memory only
    path: Option<PathBuf>,
    /// Session entries (newest first)
    entries: VecDeque<AuditEntry>,
    max_entries: usize,
}

impl AuditLog {
    /// Log to a JSON-lines file, created on first event.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            entries: VecDeque::new(),
            max_entries: MAX_AUDIT_ENTRIES,
        }
    }

    /// Keep events in memory only.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: VecDeque::new(),
            max_entries: MAX_AUDIT_ENTRIES,
        }
    }

    /// Record an event.
    pub fn log_event(&mut self, action: &str, details: &str) -> Result<&AuditEntry, StoreError> {
        let entry = AuditEntry {
            id: uuid::Uuid::new_v4().to_string(),
            at: Utc::now(),
            action: action.to_string(),
            details: details.to_string(),
        };

        if let Some(path) = &self.path {
            let line = serde_json::to_string(&entry).map_err(|e| StoreError::json(path, e))?;
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| StoreError::io(path, e))?;
            writeln!(file, "{line}").map_err(|e| StoreError::io(path, e))?;
        }

        tracing::debug!(action = %entry.action, details = %entry.details, "Audit event");

        self.entries.push_front(entry);
        while self.entries.len() > self.max_entries {
            self.entries.pop_back();
        }
        Ok(&self.entries[0])
    }

    /// Most recent session entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<&AuditEntry> {
        self.entries.iter().take(limit).collect()
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::in_memory()
    }
}
