//! Action status board
//!
//! Tracks the status of each action target (e.g. `save-lesson:ENG/A1/lesson_3`)
//! so clients can show saving/success/error feedback. While a target is
//! `saving`, the same action is refused with 409.

use crate::error::{ApiError, ApiResult};
use chrono::{DateTime, Utc};
use lcm_common::form::{ActionStatus, StatusFlag};
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tracing::{error, warn};

#[derive(Debug, Clone)]
struct Entry {
    flag: StatusFlag,
    message: Option<String>,
    updated_at: DateTime<Utc>,
}

/// Status of one target as reported by `GET /api/status`
#[derive(Debug, Clone, Serialize)]
pub struct StatusEntry {
    pub target: String,
    pub status: ActionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct StatusBoard {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        // Entries stay consistent even if a holder panicked
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Drop entries whose status has reverted to `Idle`
    fn prune(entries: &mut HashMap<String, Entry>, now: Instant) {
        entries.retain(|_, entry| entry.flag.current_at(now) != ActionStatus::Idle);
    }

    fn set(&self, target: &str, status: ActionStatus, message: Option<String>) {
        self.lock().insert(
            target.to_string(),
            Entry {
                flag: StatusFlag::new(status),
                message,
                updated_at: Utc::now(),
            },
        );
    }

    /// Mark a target as saving; `Conflict` if it already is
    pub fn begin(&self, target: &str) -> ApiResult<ActionGuard> {
        let mut entries = self.lock();
        Self::prune(&mut entries, Instant::now());
        if let Some(entry) = entries.get(target) {
            if entry.flag.current() == ActionStatus::Saving {
                return Err(ApiError::Conflict(format!(
                    "Action already in progress: {}",
                    target
                )));
            }
        }

        entries.insert(
            target.to_string(),
            Entry {
                flag: StatusFlag::new(ActionStatus::Saving),
                message: None,
                updated_at: Utc::now(),
            },
        );

        Ok(ActionGuard {
            board: self.clone(),
            target: target.to_string(),
            finished: false,
        })
    }

    /// Current status of a target (`Idle` if never seen)
    pub fn status_of(&self, target: &str) -> ActionStatus {
        self.lock()
            .get(target)
            .map(|e| e.flag.current())
            .unwrap_or(ActionStatus::Idle)
    }

    /// All targets that are not idle, sorted by target
    pub fn snapshot(&self) -> Vec<StatusEntry> {
        let now = Instant::now();
        let mut entries = self.lock();
        Self::prune(&mut entries, now);

        let mut list: Vec<StatusEntry> = entries
            .iter()
            .map(|(target, entry)| StatusEntry {
                target: target.clone(),
                status: entry.flag.current_at(now),
                message: entry.message.clone(),
                updated_at: entry.updated_at,
            })
            .collect();
        list.sort_by(|a, b| a.target.cmp(&b.target));
        list
    }

    /// Run an action while tracking its status on `target`
    pub async fn track<T, F>(&self, target: String, action: F) -> ApiResult<T>
    where
        F: Future<Output = lcm_common::Result<T>>,
    {
        let guard = self.begin(&target)?;

        match action.await {
            Ok(value) => {
                guard.succeed();
                Ok(value)
            }
            Err(e) => {
                error!(action = %target, "Action failed: {}", e);
                guard.fail(e.to_string());
                Err(e.into())
            }
        }
    }
}

/// Open `saving` status; dropping it unfinished records an error
pub struct ActionGuard {
    board: StatusBoard,
    target: String,
    finished: bool,
}

impl ActionGuard {
    pub fn succeed(mut self) {
        self.finished = true;
        self.board.set(&self.target, ActionStatus::Success, None);
    }

    pub fn fail(mut self, message: String) {
        self.finished = true;
        self.board.set(&self.target, ActionStatus::Error, Some(message));
    }
}

impl Drop for ActionGuard {
    fn drop(&mut self) {
        if !self.finished {
            warn!(action = %self.target, "Action interrupted before completion");
            self.board.set(
                &self.target,
                ActionStatus::Error,
                Some("Action interrupted".to_string()),
            );
        }
    }
}
