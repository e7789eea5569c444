use crate::error::{HviError, Result};
use crate::types::model::Record;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// An ordered set of records persisted as one JSON array file.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    path: PathBuf,
    records: Vec<T>,
    /// Records as last read from or written to disk.
    persisted: Vec<T>,
    dirty: bool,
}

impl<T> Collection<T>
where
    T: Record + Clone + Serialize + DeserializeOwned,
{
    pub fn load(path: PathBuf) -> Result<Self> {
        let records = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => Vec::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                HviError::InvalidInput(format!("{}: {}", path.display(), e))
            })?,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(error) => return Err(HviError::Io(error)),
        };
        Ok(Self {
            path,
            persisted: records.clone(),
            records,
            dirty: false,
        })
    }

    pub fn all(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn get(&self, id: &str) -> Result<&T> {
        self.records
            .iter()
            .find(|record| record.id() == id)
            .ok_or_else(|| HviError::not_found(T::KIND, id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.iter().any(|record| record.id() == id)
    }

    pub fn insert(&mut self, record: T) -> Result<()> {
        if self.contains(record.id()) {
            return Err(HviError::Conflict(format!(
                "{} {} already exists",
                T::KIND,
                record.id()
            )));
        }
        self.records.push(record);
        self.dirty = true;
        Ok(())
    }

    pub fn replace(&mut self, record: T) -> Result<()> {
        let slot = self
            .records
            .iter_mut()
            .find(|existing| existing.id() == record.id())
            .ok_or_else(|| HviError::not_found(T::KIND, record.id()))?;
        *slot = record;
        self.dirty = true;
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<T> {
        let position = self
            .records
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| HviError::not_found(T::KIND, id))?;
        self.dirty = true;
        Ok(self.records.remove(position))
    }

    /// Writes to a sibling temp file and renames it over the target.
    pub fn save(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(HviError::Io)?;
        }
        let json = serde_json::to_string_pretty(&self.records)?;
        let tmp = temp_path(&self.path);
        fs::write(&tmp, json).map_err(HviError::Io)?;
        fs::rename(&tmp, &self.path).map_err(HviError::Io)?;
        self.persisted = self.records.clone();
        self.dirty = false;
        Ok(())
    }

    /// Drops unsaved changes.
    pub fn revert(&mut self) {
        if self.dirty {
            self.records = self.persisted.clone();
            self.dirty = false;
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|value| value.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::model::Organization;
    use chrono::Utc;
    use tempfile::TempDir;

    fn org(id: &str) -> Organization {
        Organization {
            id: id.to_string(),
            name: format!("org {id}"),
            sector: None,
            employees: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().expect("temp dir should be created");
        let collection =
            Collection::<Organization>::load(dir.path().join("organizations.json")).expect("load");
        assert_eq!(collection.len(), 0);
    }

    #[test]
    fn save_then_load_preserves_order() {
        let dir = TempDir::new().expect("temp dir should be created");
        let path = dir.path().join("nested/organizations.json");
        let mut collection = Collection::<Organization>::load(path.clone()).expect("load");
        collection.insert(org("b")).expect("insert b");
        collection.insert(org("a")).expect("insert a");
        collection.save().expect("save");
        assert!(!dir.path().join("nested/organizations.json.tmp").exists());

        let reloaded = Collection::<Organization>::load(path).expect("reload");
        let ids = reloaded.all().iter().map(|o| o.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn insert_rejects_duplicate_ids_and_remove_reports_missing() {
        let dir = TempDir::new().expect("temp dir should be created");
        let mut collection =
            Collection::<Organization>::load(dir.path().join("o.json")).expect("load");
        collection.insert(org("a")).expect("insert");
        assert!(matches!(collection.insert(org("a")), Err(HviError::Conflict(_))));
        assert!(matches!(
            collection.remove("zz"),
            Err(HviError::NotFound { kind: "organization", .. })
        ));
    }

    #[test]
    fn revert_restores_last_saved_records() {
        let dir = TempDir::new().expect("temp dir should be created");
        let path = dir.path().join("organizations.json");
        let mut collection = Collection::<Organization>::load(path.clone()).expect("load");
        collection.insert(org("a")).expect("insert a");
        collection.save().expect("save");

        // A directory in the temp file's place makes the next write fail.
        fs::create_dir(dir.path().join("organizations.json.tmp")).expect("block temp file");
        collection.insert(org("b")).expect("insert b");
        assert!(matches!(collection.save(), Err(HviError::Io(_))));

        collection.revert();
        let ids = collection.all().iter().map(|o| o.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["a"]);
        assert!(collection.get("b").is_err());
    }

    #[test]
    fn corrupt_file_is_invalid_input() {
        let dir = TempDir::new().expect("temp dir should be created");
        let path = dir.path().join("o.json");
        fs::write(&path, "{ not json").expect("write");
        assert!(matches!(
            Collection::<Organization>::load(path),
            Err(HviError::InvalidInput(_))
        ));
    }
}
