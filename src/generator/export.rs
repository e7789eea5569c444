use crate::error::{HviError, Result};
use crate::journal::Activity;
use crate::store::Store;
use crate::types::model::{Assessment, Organization, Question, User};
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
pub struct ExportBundle<'a> {
    pub version: String,
    pub generated_at: String,
    pub workspace: String,
    pub organizations: &'a [Organization],
    pub users: &'a [User],
    pub questions: &'a [Question],
    pub assessments: &'a [Assessment],
    pub activity: &'a [Activity],
}

impl<'a> ExportBundle<'a> {
    pub fn new(workspace: &str, store: &'a Store, activity: &'a [Activity]) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Utc::now().to_rfc3339(),
            workspace: workspace.to_string(),
            organizations: store.organizations(),
            users: store.users(),
            questions: store.questions(),
            assessments: store.assessments(),
            activity,
        }
    }
}

/// Writes the bundle plus a `.sha256` sidecar; returns the bundle path.
pub fn write_export(root: &Path, bundle: &ExportBundle<'_>) -> Result<PathBuf> {
    let dir = root.join(".hvi/exports");
    fs::create_dir_all(&dir).map_err(HviError::Io)?;
    let out_path = unused_export_path(&dir);
    let json = serde_json::to_string_pretty(bundle)?;
    fs::write(&out_path, &json).map_err(HviError::Io)?;

    let digest = Sha256::digest(json.as_bytes());
    let file_name = out_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("export.json");
    fs::write(
        out_path.with_extension("json.sha256"),
        format!("{digest:x}  {file_name}\n"),
    )
    .map_err(HviError::Io)?;
    Ok(out_path)
}

/// `export-<UTC stamp with microseconds>.json`, suffixed when taken.
fn unused_export_path(dir: &Path) -> PathBuf {
    let stamp = Utc::now().format("%Y%m%dT%H%M%S%6fZ");
    let mut candidate = dir.join(format!("export-{stamp}.json"));
    let mut attempt = 1;
    while candidate.exists() {
        candidate = dir.join(format!("export-{stamp}-{attempt}.json"));
        attempt += 1;
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::seeded_store;
    use tempfile::TempDir;

    #[test]
    fn export_writes_bundle_and_checksum() {
        let dir = TempDir::new().expect("temp dir should be created");
        let store = seeded_store(&dir.path().join("data"));
        let activity = vec![Activity::new("organization.removed", "o1")];
        let bundle = ExportBundle::new("acme", &store, &activity);
        let path = write_export(dir.path(), &bundle).expect("export");

        let raw = fs::read_to_string(&path).expect("bundle readable");
        let parsed: serde_json::Value = serde_json::from_str(&raw).expect("bundle is json");
        assert_eq!(parsed["workspace"], "acme");
        assert_eq!(parsed["questions"].as_array().map(Vec::len), Some(12));
        assert_eq!(parsed["activity"][0]["event"], "organization.removed");

        let checksum = fs::read_to_string(path.with_extension("json.sha256")).expect("sidecar");
        assert_eq!(checksum.len(), 64 + 2 + path.file_name().map(|n| n.len()).unwrap_or(0) + 1);
    }

    #[test]
    fn back_to_back_exports_do_not_overwrite_each_other() {
        let dir = TempDir::new().expect("temp dir should be created");
        let store = seeded_store(&dir.path().join("data"));
        let bundle = ExportBundle::new("acme", &store, &[]);
        let first = write_export(dir.path(), &bundle).expect("first export");
        let second = write_export(dir.path(), &bundle).expect("second export");
        assert_ne!(first, second);
        assert!(first.exists() && second.exists());
    }
}
