//! # Wikisage Memory
//!
//! File-based session history: one JSON file per session id under a root
//! directory. Sessions are append-only; turns are added, never rewritten
//! or deleted. Session ids partition the files, keeping concurrent
//! sessions independent.

use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use wikisage_core::error::{Result, WikisageError};
use wikisage_core::traits::HistoryStore;
use wikisage_core::types::ChatTurn;

/// History store persisting each session as `<root>/<session_id>.json`.
pub struct FileHistoryStore {
    root: PathBuf,
}

impl FileHistoryStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|e| WikisageError::History(format!("failed to create {root:?}: {e}")))?;
        Ok(Self { root })
    }

    fn session_path(&self, session_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize(session_id)))
    }

    fn read_turns(&self, session_id: &str) -> Result<Vec<ChatTurn>> {
        let path = self.session_path(session_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| WikisageError::History(format!("failed to read {path:?}: {e}")))?;
        serde_json::from_str(&content)
            .map_err(|e| WikisageError::History(format!("corrupt history {path:?}: {e}")))
    }
}

/// Restrict session ids to a safe filename alphabet.
fn sanitize(session_id: &str) -> String {
    session_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait]
impl HistoryStore for FileHistoryStore {
    async fn load(&self, session_id: &str) -> Result<Vec<ChatTurn>> {
        self.read_turns(session_id)
    }

    async fn append(&self, session_id: &str, turn: ChatTurn) -> Result<()> {
        let mut turns = self.read_turns(session_id)?;
        turns.push(turn);
        let path = self.session_path(session_id);
        let content = serde_json::to_string_pretty(&turns)
            .map_err(|e| WikisageError::History(format!("failed to serialize history: {e}")))?;
        fs::write(&path, content)
            .map_err(|e| WikisageError::History(format!("failed to write {path:?}: {e}")))?;
        debug!(session_id, turns = turns.len(), "history appended");
        Ok(())
    }
}
