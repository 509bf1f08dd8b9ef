//! Core record types for the catalog and learner stores.
//!
//! Field names on the wire follow the stores' existing JSON layout
//! (`nome`, `carga_horaria`, `modulos_concluidos`, ...), so files written by
//! the earlier tooling load unchanged.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A unit of course content whose completion is tracked per learner.
///
/// The module name doubles as its identifier within a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDefinition {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "criado_por", default)]
    pub created_by: String,
}

/// Who last edited a course, and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditStamp {
    #[serde(rename = "por")]
    pub by: String,
    #[serde(rename = "em", with = "crate::timestamp")]
    pub at: DateTime<Utc>,
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseDefinition {
    /// Catalog key; not stored inside the entry itself
    #[serde(skip)]
    pub id: String,
    /// Display name
    #[serde(rename = "nome")]
    pub name: String,
    /// Free-text workload label, e.g. "40h"
    #[serde(rename = "carga_horaria")]
    pub workload: String,
    /// Modules in teaching order
    #[serde(rename = "modulos", default)]
    pub modules: Vec<ModuleDefinition>,
    #[serde(rename = "criado_por", default)]
    pub created_by: String,
    #[serde(rename = "data_criacao", with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "ultima_edicao", default, skip_serializing_if = "Option::is_none")]
    pub last_edit: Option<EditStamp>,
}

impl CourseDefinition {
    /// Create an empty course.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        workload: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            workload: workload.into(),
            modules: Vec::new(),
            created_by: created_by.into(),
            created_at: Utc::now(),
            last_edit: None,
        }
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn has_module(&self, name: &str) -> bool {
        self.modules.iter().any(|m| m.name == name)
    }
}

/// A certificate issued to a learner. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuedCertificate {
    #[serde(rename = "curso")]
    pub course_id: String,
    /// Globally unique validation code (`CERT-` + 12 hex digits)
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "data", with = "crate::timestamp")]
    pub issued_at: DateTime<Utc>,
    /// Where the rendered document was written
    #[serde(rename = "caminho", default)]
    pub artifact: PathBuf,
}

/// A learner as stored in the user store.
///
/// Fields owned by other tools (credentials, roles, flags) are kept in
/// `extra` and written back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearnerRecord {
    /// Store key; not stored inside the entry itself
    #[serde(skip)]
    pub name: String,
    /// Enrolled course ids, in enrollment order
    #[serde(rename = "cursos", default)]
    pub enrolled: Vec<String>,
    /// Course id to completed module names
    #[serde(rename = "modulos_concluidos", default)]
    pub completed_modules: BTreeMap<String, Vec<String>>,
    /// Certificate history, in issuance order
    #[serde(rename = "certificados", default)]
    pub certificates: Vec<IssuedCertificate>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LearnerRecord {
    /// Create a learner with no enrollments.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut extra = Map::new();
        extra.insert("nome".to_string(), Value::String(name.clone()));
        Self {
            name,
            extra,
            ..Default::default()
        }
    }

    pub fn is_enrolled(&self, course_id: &str) -> bool {
        self.enrolled.iter().any(|c| c == course_id)
    }

    /// Completed module names for a course (empty if none recorded).
    pub fn completed_in(&self, course_id: &str) -> &[String] {
        self.completed_modules
            .get(course_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
