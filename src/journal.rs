use crate::error::{HviError, Result};
use crate::types::config::{HviConfig, LogSampling};
use crate::types::model::Subject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_JOURNAL_FILE: &str = ".hvi/activity.jsonl";

/// One journal line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub at: DateTime<Utc>,
    pub event: String,
    /// Id of the entity the event is about.
    pub entity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Activity {
    pub fn new(event: &str, entity: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            event: event.to_string(),
            entity: entity.into(),
            subject: None,
            detail: None,
        }
    }

    pub fn with_subject(mut self, subject: &Subject) -> Self {
        self.subject = Some(subject.clone());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Append-only JSON-lines record of what changed in a workspace.
///
/// Milestones (submissions, removals, exports) are always written. Other
/// mutations are written only with `log_sampling = "all"`.
#[derive(Debug)]
pub struct ActivityJournal {
    file: PathBuf,
    sampling: LogSampling,
}

impl ActivityJournal {
    pub fn new(root: &Path, cfg: &HviConfig) -> Self {
        let journal = cfg.journal.as_ref();
        let file = journal
            .and_then(|value| value.file.as_deref())
            .map_or_else(|| root.join(DEFAULT_JOURNAL_FILE), |path| root.join(path));
        let sampling = journal
            .and_then(|value| value.log_sampling)
            .unwrap_or(LogSampling::Milestones);
        Self { file, sampling }
    }

    pub fn path(&self) -> &Path {
        &self.file
    }

    pub fn milestone(&self, activity: Activity) -> Result<()> {
        self.append(&activity)
    }

    pub fn record(&self, activity: Activity) -> Result<()> {
        if self.sampling != LogSampling::All {
            return Ok(());
        }
        self.append(&activity)
    }

    /// Every entry written so far, oldest first.
    pub fn entries(&self) -> Result<Vec<Activity>> {
        read_activity(&self.file)
    }

    fn append(&self, activity: &Activity) -> Result<()> {
        if let Some(parent) = self.file.parent() {
            fs::create_dir_all(parent).map_err(HviError::Io)?;
        }
        let mut line = serde_json::to_string(activity)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file)
            .map_err(HviError::Io)?;
        file.write_all(line.as_bytes()).map_err(HviError::Io)
    }
}

/// Parses a journal file. A missing file is an empty journal.
pub fn read_activity(path: &Path) -> Result<Vec<Activity>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(error) => return Err(HviError::Io(error)),
    };
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|error| {
                HviError::InvalidInput(format!("{}:{}: {}", path.display(), index + 1, error))
            })
        })
        .collect()
}
