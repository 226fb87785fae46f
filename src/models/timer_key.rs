use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fallback owner for timers started without a user.
pub const UNASSIGNED_USER: &str = "unassigned";

/// Separator used in the delimited wire form `{task}_{stage}_{user}`.
const KEY_SEP: char = '_';

/// Identity of one trackable unit of work: a (task, stage, user) triple.
///
/// The triple is carried end-to-end as a struct; the delimited string form
/// exists only at the boundary with collaborators that still consume it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerKey {
    pub task: String,
    pub stage: String,
    pub user: String,
}

impl TimerKey {
    /// Validating constructor. Task and stage must be non-empty;
    /// an empty user falls back to "unassigned".
    pub fn new(task: &str, stage: &str, user: &str) -> AppResult<Self> {
        let task = task.trim();
        let stage = stage.trim();
        let user = user.trim();

        if task.is_empty() {
            return Err(AppError::InvalidKey("task name is empty".to_string()));
        }
        if stage.is_empty() {
            return Err(AppError::InvalidKey("stage name is empty".to_string()));
        }

        Ok(Self {
            task: task.to_string(),
            stage: stage.to_string(),
            user: if user.is_empty() {
                UNASSIGNED_USER.to_string()
            } else {
                user.to_string()
            },
        })
    }

    /// Delimited wire form `{task}_{stage}_{user}` consumed by collaborators.
    pub fn encode(&self) -> String {
        format!(
            "{}{}{}{}{}",
            self.task, KEY_SEP, self.stage, KEY_SEP, self.user
        )
    }

    /// Parse the delimited wire form by splitting off the LAST two
    /// separators, so task names may contain '_'.
    ///
    /// Inherited fragility: a stage or user name containing '_' shifts the
    /// split and silently misassigns the components. Kept as-is for
    /// compatibility with existing keys; prefer carrying TimerKey directly.
    pub fn decode(s: &str) -> AppResult<Self> {
        let mut parts = s.rsplitn(3, KEY_SEP);
        let user = parts.next();
        let stage = parts.next();
        let task = parts.next();

        match (task, stage, user) {
            (Some(task), Some(stage), Some(user)) => TimerKey::new(task, stage, user),
            _ => Err(AppError::InvalidKey(format!(
                "expected 'task_stage_user', got '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for TimerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} / {}", self.task, self.stage, self.user)
    }
}
