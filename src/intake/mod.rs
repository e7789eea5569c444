use crate::error::{HviError, Result};
use crate::store::Store;
use crate::types::config::HviConfig;
use crate::types::model::Submission;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Result of importing one submission file.
#[derive(Debug)]
pub enum ImportStatus {
    Imported(String),
    Duplicate(String),
    Failed(String),
}

#[derive(Debug)]
pub struct ImportOutcome {
    pub path: PathBuf,
    pub status: ImportStatus,
}

/// `*.json` files under `root`, in path order so imports are repeatable.
pub fn list_submission_files(root: &Path) -> Vec<PathBuf> {
    let mut files = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().to_path_buf())
        .filter(|path| {
            path.extension()
                .and_then(|extension| extension.to_str())
                .map(|extension| extension.eq_ignore_ascii_case("json"))
                .unwrap_or(false)
        })
        .collect::<Vec<_>>();
    files.sort();
    files
}

pub fn read_submission(path: &Path) -> Result<Submission> {
    if !path.exists() {
        return Err(HviError::PathNotFound(path.display().to_string()));
    }
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|e| HviError::InvalidInput(format!("{}: {}", path.display(), e)))
}

/// Submits every file under `dir`. Duplicates and invalid files are reported
/// per file and do not stop the import.
pub fn import_dir(store: &mut Store, dir: &Path, config: &HviConfig) -> Result<Vec<ImportOutcome>> {
    if !dir.is_dir() {
        return Err(HviError::PathNotFound(dir.display().to_string()));
    }

    let mut outcomes = Vec::new();
    for path in list_submission_files(dir) {
        let submitted =
            read_submission(&path).and_then(|submission| store.submit(submission, config));
        let status = match submitted {
            Ok(assessment) => {
                debug!(path = %path.display(), id = %assessment.id, "imported submission");
                ImportStatus::Imported(assessment.id)
            }
            Err(HviError::DuplicateSubmission(existing)) => {
                warn!(path = %path.display(), %existing, "skipping duplicate submission");
                ImportStatus::Duplicate(existing)
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "submission rejected");
                ImportStatus::Failed(error.to_string())
            }
        };
        outcomes.push(ImportOutcome { path, status });
    }
    Ok(outcomes)
}
