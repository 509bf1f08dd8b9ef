//! Whole-document JSON persistence shared by the catalog and learner stores.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::StoreError;

/// Read a JSON document, or `None` if the file does not exist yet.
pub(crate) fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io(path, e)),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| StoreError::json(path, e))
}

/// Write a JSON document with four-space indentation, replacing the file.
pub(crate) fn write_document<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| StoreError::json(path, e))?;
    std::fs::write(path, buf).map_err(|e| StoreError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn test_missing_document_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let doc: Option<BTreeMap<String, String>> =
            read_document(&temp_dir.path().join("absent.json")).unwrap();
        assert!(doc.is_none());
    }

    #[test]
    fn test_write_keeps_non_ascii_and_indent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.json");
        let mut doc = BTreeMap::new();
        doc.insert("nome".to_string(), "Introdução".to_string());

        write_document(&path, &doc).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Introdução"));
        assert!(raw.contains("\n    \"nome\""));
    }

    #[test]
    fn test_corrupt_document_is_json_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result: Result<Option<BTreeMap<String, String>>, _> = read_document(&path);
        assert!(matches!(result, Err(StoreError::Json { .. })));
    }
}
