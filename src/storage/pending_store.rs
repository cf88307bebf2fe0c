use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::errors::{AppError, AppResult};
use crate::models::domain::Submission;

/// Session-surviving slot for unsent submissions, one per video identifier.
/// Used only when a submission is deferred past a registration redirect;
/// retaking a quiz for the same video overwrites the slot.
pub trait PendingSubmissionStore: Send + Sync {
    fn put(&self, video_id: &str, submission: &Submission) -> AppResult<()>;
    fn get(&self, video_id: &str) -> AppResult<Option<Submission>>;
    fn remove(&self, video_id: &str) -> AppResult<()>;
}

/// Single JSON map file (video id -> submission) under the storage directory.
pub struct FilePendingStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FilePendingStore {
    pub fn new(storage_dir: &std::path::Path) -> AppResult<Self> {
        fs::create_dir_all(storage_dir)?;
        Ok(Self {
            path: storage_dir.join("pending_submissions.json"),
            lock: Mutex::new(()),
        })
    }

    fn read_all(&self) -> AppResult<HashMap<String, Submission>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_all(&self, entries: &HashMap<String, Submission>) -> AppResult<()> {
        fs::write(&self.path, serde_json::to_string(entries)?)?;
        Ok(())
    }

    fn guard(&self) -> AppResult<std::sync::MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| AppError::Storage("pending store lock poisoned".to_string()))
    }
}

impl PendingSubmissionStore for FilePendingStore {
    fn put(&self, video_id: &str, submission: &Submission) -> AppResult<()> {
        let _guard = self.guard()?;
        let mut entries = self.read_all()?;
        entries.insert(video_id.to_string(), submission.clone());
        self.write_all(&entries)
    }

    fn get(&self, video_id: &str) -> AppResult<Option<Submission>> {
        let _guard = self.guard()?;
        let entries = self.read_all()?;
        Ok(entries.get(video_id).cloned())
    }

    fn remove(&self, video_id: &str) -> AppResult<()> {
        let _guard = self.guard()?;
        let mut entries = self.read_all()?;
        if entries.remove(video_id).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}
