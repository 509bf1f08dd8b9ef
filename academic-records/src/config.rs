//! Configuration for academic-records

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors loading or saving a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Where the stores, certificates and audit log live.
///
/// Relative file names resolve against `data_dir`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordsConfig {
    /// Base directory for every file below
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Course catalog
    #[serde(default = "default_courses_file")]
    pub courses_file: PathBuf,

    /// Learner store
    #[serde(default = "default_learners_file")]
    pub learners_file: PathBuf,

    /// Rendered certificate documents
    #[serde(default = "default_certificates_dir")]
    pub certificates_dir: PathBuf,

    /// JSON-lines audit trail
    #[serde(default = "default_audit_log")]
    pub audit_log: PathBuf,

    /// Write the audit trail at all
    #[serde(default = "default_true")]
    pub audit_enabled: bool,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_courses_file() -> PathBuf {
    PathBuf::from("cursos.json")
}

fn default_learners_file() -> PathBuf {
    PathBuf::from("usuarios.json")
}

fn default_certificates_dir() -> PathBuf {
    PathBuf::from("certificados")
}

fn default_audit_log() -> PathBuf {
    PathBuf::from("logs.jsonl")
}

fn default_true() -> bool {
    true
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            courses_file: default_courses_file(),
            learners_file: default_learners_file(),
            certificates_dir: default_certificates_dir(),
            audit_log: default_audit_log(),
            audit_enabled: true,
        }
    }
}

impl RecordsConfig {
    /// Defaults rooted at `data_dir`.
    pub fn with_data_dir<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Load config from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save config to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }

    pub fn courses_path(&self) -> PathBuf {
        self.resolve(&self.courses_file)
    }

    pub fn learners_path(&self) -> PathBuf {
        self.resolve(&self.learners_file)
    }

    pub fn certificates_path(&self) -> PathBuf {
        self.resolve(&self.certificates_dir)
    }

    pub fn audit_path(&self) -> PathBuf {
        self.resolve(&self.audit_log)
    }
}
