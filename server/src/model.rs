//! Todo entity and the request shapes accepted by the API.
//!
//! # Design
//! `Todo` is the only persisted entity. Its `todo_id` and `created_at` are
//! assigned by the store on creation and never change; `updated_at` is
//! refreshed by every successful update. Request bodies are decoded into
//! `NewTodo` (create) and `TodoPatch` (update), which are deliberately
//! different types: create defaults missing fields, update keeps them as
//! `None` so the store can leave the stored value untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A single todo item as stored and as returned on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub todo_id: Uuid,
    pub task: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a create request.
///
/// A missing `task` decodes to the empty string and is rejected by
/// [`validate_task`], so "absent" and "blank" produce the same 400.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTodo {
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub is_completed: bool,
}

/// Body of an update request. Only the fields present in the JSON are
/// applied; `null` is treated the same as an omitted field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("task must not be empty")]
    EmptyTask,
}

/// Reject tasks that are empty after trimming surrounding whitespace.
pub fn validate_task(task: &str) -> Result<(), ValidationError> {
    if task.trim().is_empty() {
        return Err(ValidationError::EmptyTask);
    }
    Ok(())
}

impl NewTodo {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_task(&self.task)
    }
}

impl TodoPatch {
    /// An omitted `task` is fine; an explicitly blank one is not.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.task.as_deref() {
            Some(task) => validate_task(task),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Todo {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        Todo {
            todo_id: Uuid::nil(),
            task: "Learn Rust".to_string(),
            is_completed: false,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn todo_serializes_with_camel_case_keys() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["todoId"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["task"], "Learn Rust");
        assert_eq!(json["isCompleted"], false);
        assert_eq!(json["createdAt"], "2023-11-14T22:13:20Z");
        assert_eq!(json["updatedAt"], "2023-11-14T22:13:20Z");
    }

    #[test]
    fn new_todo_defaults_missing_fields() {
        let input: NewTodo = serde_json::from_str("{}").unwrap();
        assert_eq!(input.task, "");
        assert!(!input.is_completed);
    }

    #[test]
    fn new_todo_accepts_explicit_completed() {
        let input: NewTodo =
            serde_json::from_str(r#"{"task":"Done","isCompleted":true}"#).unwrap();
        assert_eq!(input.task, "Done");
        assert!(input.is_completed);
    }

    #[test]
    fn new_todo_rejects_wrong_types() {
        let result: Result<NewTodo, _> = serde_json::from_str(r#"{"task":42}"#);
        assert!(result.is_err());
    }

    #[test]
    fn patch_fields_are_optional() {
        let input: TodoPatch = serde_json::from_str("{}").unwrap();
        assert!(input.task.is_none());
        assert!(input.is_completed.is_none());

        let input: TodoPatch = serde_json::from_str(r#"{"task":null}"#).unwrap();
        assert!(input.task.is_none());
    }

    #[test]
    fn blank_tasks_are_rejected() {
        assert_eq!(validate_task(""), Err(ValidationError::EmptyTask));
        assert_eq!(validate_task("   \t\n"), Err(ValidationError::EmptyTask));
        assert!(validate_task("  padded  ").is_ok());
    }

    #[test]
    fn patch_validation_allows_omitted_task() {
        let only_flag = TodoPatch {
            task: None,
            is_completed: Some(true),
        };
        assert!(only_flag.validate().is_ok());

        let blank = TodoPatch {
            task: Some(" ".to_string()),
            is_completed: None,
        };
        assert_eq!(blank.validate(), Err(ValidationError::EmptyTask));
    }
}
