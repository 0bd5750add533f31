//! Durable per-task workspace: the single on-disk owner of a task's current
//! file set. Created on first build, read and overwritten on revision, never
//! deleted here (retention is an external concern).

use crate::error::{CoreError, Result};
use crate::fileset::FileSet;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Reject names that could escape the task directory via path traversal.
/// Applies to task ids, generated filenames, and attachment names alike.
pub fn validate_filename(name: &str) -> Result<()> {
    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.contains('\0')
    {
        return Err(CoreError::InvalidFileName(name.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// What a workspace write produced: the directory, the absolute paths
/// written, and when.
#[derive(Debug, Clone)]
pub struct WorkspaceRecord {
    pub task_id: String,
    pub dir: PathBuf,
    pub saved_files: Vec<PathBuf>,
    pub written_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct WorkspaceStore {
    root: PathBuf,
}

impl WorkspaceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn task_dir(&self, task_id: &str) -> Result<PathBuf> {
        validate_filename(task_id)?;
        Ok(self.root.join(task_id))
    }

    /// Idempotently create the directory for a task.
    pub fn create(&self, task_id: &str) -> Result<PathBuf> {
        let dir = self.task_dir(task_id)?;
        crate::io::ensure_dir(&dir)?;
        Ok(dir)
    }

    /// Write every entry of `files` under the task directory, overwriting
    /// files of the same name. Returns the record of what was written.
    pub fn write(&self, task_id: &str, files: &FileSet) -> Result<WorkspaceRecord> {
        let dir = self.create(task_id)?;
        let mut saved = Vec::with_capacity(files.len());
        for (name, content) in files.iter() {
            validate_filename(name)?;
            let path = dir.join(name);
            crate::io::atomic_write(&path, content.as_bytes())?;
            saved.push(path);
        }
        let dir = dir.canonicalize().unwrap_or(dir);
        let saved = saved
            .into_iter()
            .map(|p| p.canonicalize().unwrap_or(p))
            .collect();
        debug!(task = task_id, files = files.len(), "workspace written");
        Ok(WorkspaceRecord {
            task_id: task_id.to_string(),
            dir,
            saved_files: saved,
            written_at: Utc::now(),
        })
    }

    /// Enumerate the regular files directly under the task directory.
    ///
    /// Revision on an unknown task is an error, not a no-op. Files that are
    /// not UTF-8 text (e.g. copied binary attachments) are skipped with a
    /// warning — the file set contract is text only.
    pub fn read(&self, task_id: &str) -> Result<FileSet> {
        let dir = self.task_dir(task_id)?;
        if !dir.is_dir() {
            return Err(CoreError::WorkspaceNotFound(task_id.to_string()));
        }
        let mut files = FileSet::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match std::fs::read_to_string(entry.path()) {
                Ok(content) => files.insert(name, content),
                Err(err) => warn!(task = task_id, file = %name, %err, "skipping non-text file"),
            }
        }
        Ok(files)
    }

    /// Copy previously decoded attachments into the task directory by name.
    ///
    /// An attachment that was never decoded in a prior round is logged and
    /// skipped — non-fatal. Returns the names actually copied.
    pub fn copy_attachments(
        &self,
        task_id: &str,
        names: &[String],
        attachment_dir: &Path,
    ) -> Result<Vec<String>> {
        let dir = self.create(task_id)?;
        let mut copied = Vec::new();
        for name in names {
            if validate_filename(name).is_err() {
                warn!(task = task_id, attachment = %name, "invalid attachment name, skipping");
                continue;
            }
            let src = attachment_dir.join(name);
            if !src.is_file() {
                let err = CoreError::AttachmentNotFound(name.clone());
                warn!(task = task_id, %err, "skipping");
                continue;
            }
            std::fs::copy(&src, dir.join(name))?;
            copied.push(name.clone());
        }
        Ok(copied)
    }
}
