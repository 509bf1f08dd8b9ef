//! Error types for academic-records

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Kind of record a lookup or uniqueness check was about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Learner,
    Course,
    Module,
    Certificate,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Learner => "Learner",
            Self::Course => "Course",
            Self::Module => "Module",
            Self::Certificate => "Certificate",
        };
        f.write_str(name)
    }
}

/// Failures reading or writing one of the flat JSON stores.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

/// Failures writing a certificate artifact.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Could not create certificate directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not write certificate {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Domain errors surfaced by every records operation.
#[derive(Error, Debug)]
pub enum RecordsError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: RecordKind, id: String },

    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: RecordKind, id: String },

    #[error("Learner {learner} is not enrolled in course {course_id}")]
    NotEnrolled { learner: String, course_id: String },

    #[error("Learner {learner} has completed {completed} of {total} modules of course {course_id}")]
    Ineligible {
        learner: String,
        course_id: String,
        completed: usize,
        total: usize,
    },

    #[error("Render failure: {0}")]
    Render(#[from] RenderError),

    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),

    #[error("Could not mint a fresh certificate code: {0}")]
    DuplicateCode(String),

    #[error("Invalid input: {0}")]
    Invalid(String),
}

impl RecordsError {
    pub(crate) fn not_found(kind: RecordKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub(crate) fn already_exists(kind: RecordKind, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind,
            id: id.into(),
        }
    }

    /// Expected refusals (not enrolled yet, modules still pending) as opposed
    /// to failures of the system itself.
    pub fn is_routine(&self) -> bool {
        matches!(self, Self::NotEnrolled { .. } | Self::Ineligible { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routine_errors() {
        let ineligible = RecordsError::Ineligible {
            learner: "Ana".to_string(),
            course_id: "1".to_string(),
            completed: 1,
            total: 2,
        };
        assert!(ineligible.is_routine());
        assert!(!RecordsError::not_found(RecordKind::Course, "9").is_routine());
        assert!(!RecordsError::Persistence(StoreError::Unavailable("disk".into())).is_routine());
    }

    #[test]
    fn test_error_messages() {
        let err = RecordsError::not_found(RecordKind::Certificate, "CERT-000000000000");
        assert_eq!(err.to_string(), "Certificate not found: CERT-000000000000");

        let err = RecordsError::NotEnrolled {
            learner: "Ana".to_string(),
            course_id: "2".to_string(),
        };
        assert_eq!(err.to_string(), "Learner Ana is not enrolled in course 2");
    }
}
