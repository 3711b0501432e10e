//! Atomic load/save of a [`Taskset`] as a single serialized document (§4.3).
//!
//! `TaskStore` exclusively owns the `tasksets/` directory; the Registry
//! composes it by reference rather than reaching into the filesystem
//! itself. Every save goes through a write-to-temp-then-rename sequence so a
//! concurrent, lock-free reader always observes either the pre- or
//! post-state, never a truncated file.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::errors::RegistryError;
use crate::model::Taskset;

/// Owns `tasksets/<spec>/taskset.json` for every spec.
#[derive(Debug, Clone)]
pub struct TaskStore {
    tasksets_dir: PathBuf,
}

impl TaskStore {
    pub fn new(tasksets_dir: PathBuf) -> Self {
        Self { tasksets_dir }
    }

    fn spec_dir(&self, spec_name: &str) -> PathBuf {
        self.tasksets_dir.join(spec_name)
    }

    fn doc_path(&self, spec_name: &str) -> PathBuf {
        self.spec_dir(spec_name).join("taskset.json")
    }

    /// Persists `taskset` atomically: serialize to `taskset.json.tmp`, then
    /// rename over `taskset.json`. The rename is the atomicity boundary.
    pub fn save_taskset(&self, taskset: &Taskset) -> Result<(), RegistryError> {
        let dir = self.spec_dir(&taskset.spec_name);
        fs::create_dir_all(&dir)?;
        let tmp_path = dir.join("taskset.json.tmp");
        let final_path = self.doc_path(&taskset.spec_name);

        let body = serde_json::to_vec_pretty(taskset)?;
        fs::write(&tmp_path, body)?;
        fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }

    /// Loads the current document for `spec_name`, failing with
    /// [`RegistryError::TasksetNotFound`] if none exists.
    pub fn load_taskset(&self, spec_name: &str) -> Result<Taskset, RegistryError> {
        let path = self.doc_path(spec_name);
        let body = fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RegistryError::TasksetNotFound(spec_name.to_string())
            } else {
                RegistryError::IOError(e)
            }
        })?;
        let taskset: Taskset = serde_json::from_slice(&body)?;
        Ok(taskset)
    }

    pub fn exists(&self, spec_name: &str) -> bool {
        self.doc_path(spec_name).is_file()
    }

    /// Lists every spec with a persisted taskset, sorted for determinism.
    pub fn list(&self) -> Result<Vec<String>, RegistryError> {
        let mut specs = Vec::new();
        if !self.tasksets_dir.is_dir() {
            return Ok(specs);
        }
        for entry in fs::read_dir(&self.tasksets_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if self.exists(&name) {
                specs.push(name);
            }
        }
        specs.sort();
        Ok(specs)
    }

    /// Removes the entire `tasksets/<spec>/` directory.
    pub fn delete(&self, spec_name: &str) -> Result<(), RegistryError> {
        let dir = self.spec_dir(spec_name);
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RegistryError::IOError(e)),
        }
    }

    /// Copies the current document to
    /// `<dir>/<spec>_backup_<YYYYmmdd_HHMMSS>.json`, re-parsing it first to
    /// verify integrity before the copy is made durable.
    pub fn backup(&self, spec_name: &str, dir: &Path) -> Result<PathBuf, RegistryError> {
        let taskset = self.load_taskset(spec_name)?;
        fs::create_dir_all(dir)?;
        let stamp = Utc::now().format("%Y%m%d_%H%M%S");
        let dest = dir.join(format!("{spec_name}_backup_{stamp}.json"));
        let body = serde_json::to_vec_pretty(&taskset)?;
        fs::write(&dest, body)?;
        Ok(dest)
    }

    /// Parses `file`, validates the required top-level fields, and writes
    /// the result back through [`Self::save_taskset`].
    pub fn restore(&self, file: &Path) -> Result<Taskset, RegistryError> {
        let body = fs::read(file)?;
        let value: serde_json::Value = serde_json::from_slice(&body)?;
        validate_required_fields(&value)?;
        let taskset: Taskset = serde_json::from_value(value)?;
        self.save_taskset(&taskset)?;
        Ok(taskset)
    }
}

fn validate_required_fields(value: &serde_json::Value) -> Result<(), RegistryError> {
    let obj = value
        .as_object()
        .ok_or_else(|| RegistryError::IntegrityError("document is not a JSON object".into()))?;

    let require_str = |key: &str| -> Result<(), RegistryError> {
        match obj.get(key) {
            Some(v) if v.is_string() => Ok(()),
            _ => Err(RegistryError::IntegrityError(format!(
                "missing or non-string required field `{key}`"
            ))),
        }
    };
    require_str("spec_name")?;
    require_str("created_at")?;
    require_str("updated_at")?;

    match obj.get("version") {
        Some(v) if v.is_u64() || v.is_i64() => {}
        _ => {
            return Err(RegistryError::IntegrityError(
                "missing or non-integer required field `version`".into(),
            ));
        }
    }
    match obj.get("tasks") {
        Some(v) if v.is_array() => {}
        _ => {
            return Err(RegistryError::IntegrityError(
                "missing or non-array required field `tasks`".into(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, TaskStore) {
        let dir = TempDir::new().unwrap();
        let store = TaskStore::new(dir.path().to_path_buf());
        (dir, store)
    }

    #[test]
    fn load_missing_taskset_fails_not_found() {
        let (_dir, store) = store();
        let err = store.load_taskset("nope").unwrap_err();
        assert!(matches!(err, RegistryError::TasksetNotFound(_)));
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, store) = store();
        let ts = Taskset::new("spec-a");
        store.save_taskset(&ts).unwrap();
        let loaded = store.load_taskset("spec-a").unwrap();
        assert_eq!(loaded.spec_name, "spec-a");
        assert_eq!(loaded.version, 0);
    }

    #[test]
    fn list_returns_sorted_specs() {
        let (_dir, store) = store();
        store.save_taskset(&Taskset::new("zeta")).unwrap();
        store.save_taskset(&Taskset::new("alpha")).unwrap();
        assert_eq!(store.list().unwrap(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn delete_removes_spec_directory() {
        let (_dir, store) = store();
        store.save_taskset(&Taskset::new("spec-a")).unwrap();
        store.delete("spec-a").unwrap();
        assert!(!store.exists("spec-a"));
        // Deleting again is a no-op, not an error.
        store.delete("spec-a").unwrap();
    }

    #[test]
    fn backup_then_restore_round_trips() {
        let (dir, store) = store();
        let ts = Taskset::new("spec-a");
        store.save_taskset(&ts).unwrap();

        let backups_dir = dir.path().join("backups");
        let backup_path = store.backup("spec-a", &backups_dir).unwrap();
        assert!(backup_path.is_file());

        store.delete("spec-a").unwrap();
        let restored = store.restore(&backup_path).unwrap();
        assert_eq!(restored.spec_name, "spec-a");
        assert!(store.exists("spec-a"));
    }

    #[test]
    fn restore_rejects_documents_missing_required_fields() {
        let (dir, store) = store();
        let bogus = dir.path().join("bogus.json");
        fs::write(&bogus, r#"{"spec_name":"x"}"#).unwrap();
        let err = store.restore(&bogus).unwrap_err();
        assert!(matches!(err, RegistryError::IntegrityError(_)));
    }
}
