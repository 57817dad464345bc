use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ValidationError;

/// Opaque record identifier, assigned by storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(Uuid);

impl TodoId {
    pub fn generate() -> Self { Self(Uuid::new_v4()) }

    pub fn as_uuid(&self) -> Uuid { self.0 }
}

impl From<Uuid> for TodoId {
    fn from(id: Uuid) -> Self { Self(id) }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for TodoId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

impl From<models::todo::Model> for Todo {
    fn from(m: models::todo::Model) -> Self {
        Self { id: m.id.into(), title: m.title, completed: m.completed }
    }
}

/// A validated insert. The title is kept exactly as supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    title: String,
}

impl NewTodo {
    pub fn parse(title: &str) -> Result<Self, ValidationError> {
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(Self { title: title.to_string() })
    }

    pub fn title(&self) -> &str { &self.title }

    /// Materialize the record storage will hold under `id`.
    pub fn into_todo(self, id: TodoId) -> Todo {
        Todo { id, title: self.title, completed: false }
    }
}

/// Field changes applied by `update_one`.
///
/// Completion only moves forward, so the one way to build a patch that
/// changes anything is [`TodoPatch::complete`].
///
/// ```compile_fail
/// let reopen = service::todos::TodoPatch { completed: Some(false) };
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TodoPatch {
    completed: Option<bool>,
}

impl TodoPatch {
    pub fn complete() -> Self { Self { completed: Some(true) } }

    pub fn completed(&self) -> Option<bool> { self.completed }

    /// Apply to `todo`, returning whether any field changed.
    pub fn apply(&self, todo: &mut Todo) -> bool {
        let mut modified = false;
        if let Some(c) = self.completed {
            if todo.completed != c {
                todo.completed = c;
                modified = true;
            }
        }
        modified
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoFilter {
    All,
    Completed(bool),
}

impl TodoFilter {
    pub fn matches(&self, todo: &Todo) -> bool {
        match self {
            TodoFilter::All => true,
            TodoFilter::Completed(c) => todo.completed == *c,
        }
    }
}

/// What a single-record update touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: bool,
    pub modified: bool,
}

/// Successful result of marking a todo completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionOutcome {
    Completed,
    AlreadyCompleted,
}

impl CompletionOutcome {
    pub fn changed(&self) -> bool { matches!(self, CompletionOutcome::Completed) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_titles_are_rejected() {
        assert_eq!(NewTodo::parse(""), Err(ValidationError::EmptyTitle));
        assert_eq!(NewTodo::parse("  \t\n"), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn title_is_not_trimmed() {
        let t = NewTodo::parse("  Buy milk ").unwrap();
        assert_eq!(t.title(), "  Buy milk ");
    }

    #[test]
    fn patch_reports_modification_only_on_change() {
        let mut todo = NewTodo::parse("a").unwrap().into_todo(TodoId::generate());
        assert!(TodoPatch::complete().apply(&mut todo));
        assert!(todo.completed);
        assert!(!TodoPatch::complete().apply(&mut todo));
        assert!(!TodoPatch::default().apply(&mut todo));
    }

    #[test]
    fn patches_never_reopen_a_completed_todo() {
        let mut todo = NewTodo::parse("done").unwrap().into_todo(TodoId::generate());
        todo.completed = true;
        for patch in [TodoPatch::complete(), TodoPatch::default()] {
            assert_ne!(patch.completed(), Some(false));
            assert!(!patch.apply(&mut todo));
            assert!(todo.completed);
        }
    }

    #[test]
    fn id_round_trips_through_text() {
        let id = TodoId::generate();
        let parsed: TodoId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-an-id".parse::<TodoId>().is_err());
    }

    #[test]
    fn todo_serializes_flat() {
        let id = TodoId::generate();
        let v = serde_json::to_value(Todo { id, title: "x".into(), completed: true }).unwrap();
        assert_eq!(v, serde_json::json!({"id": id.to_string(), "title": "x", "completed": true}));
    }
}
