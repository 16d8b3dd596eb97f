//! JSONL submission log, one file per browser session.
//!
//! Entries are only ever appended; the running app never reads them back.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{create_dir_all, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use thiserror::Error;

use crate::session::is_valid_session_id;

/// One graded (or failed) submission.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    /// Deck position of the card that was answered
    pub index: usize,
    pub question: String,
    pub user_answer: String,
    /// Raw grader output; empty when grading failed
    pub feedback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LogEntry {
    pub fn graded(index: usize, question: &str, user_answer: &str, feedback: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            index,
            question: question.to_string(),
            user_answer: user_answer.to_string(),
            feedback: feedback.to_string(),
            error: None,
        }
    }

    pub fn failed(index: usize, question: &str, user_answer: &str, error: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            index,
            question: question.to_string(),
            user_answer: user_answer.to_string(),
            feedback: String::new(),
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum LogWriteError {
    #[error("refusing to log for malformed session id")]
    InvalidSessionId,
    #[error("failed to write {0}: {1}")]
    Io(String, #[source] std::io::Error),
    #[error("failed to encode log entry: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("log writer task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Appends submissions to `{dir}/session_{id}.jsonl`.
#[derive(Debug, Clone)]
pub struct SessionLogger {
    dir: PathBuf,
}

impl SessionLogger {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Log file for a session.
    pub fn path_for(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("session_{}.jsonl", session_id))
    }

    /// Append one entry and flush. Creates the directory and file on first use.
    pub fn append(&self, session_id: &str, entry: &LogEntry) -> Result<(), LogWriteError> {
        if !is_valid_session_id(session_id) {
            return Err(LogWriteError::InvalidSessionId);
        }

        let path = self.path_for(session_id);
        let io_err = |e| LogWriteError::Io(path.display().to_string(), e);

        create_dir_all(&self.dir).map_err(io_err)?;

        let line = serde_json::to_string(entry)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_err)?;

        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", line).map_err(io_err)?;
        writer.flush().map_err(io_err)?;
        Ok(())
    }

    /// `append` on the blocking thread pool, for use from request handlers.
    pub async fn append_async(&self, session_id: &str, entry: LogEntry) -> Result<(), LogWriteError> {
        let logger = self.clone();
        let session_id = session_id.to_string();
        tokio::task::spawn_blocking(move || logger.append(&session_id, &entry)).await?
    }
}
