use async_trait::async_trait;

use super::domain::{NewTodo, Todo, TodoFilter, TodoId, TodoPatch, UpdateOutcome};
use crate::errors::StorageError;

/// Storage collaborator for todos.
///
/// Implementations assign ids on insert and make each single-record update or
/// delete atomic. They report raw counts; interpreting them is the store's job.
#[async_trait]
pub trait TodoCollection: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Todo>, StorageError>;
    async fn insert_one(&self, todo: NewTodo) -> Result<TodoId, StorageError>;
    async fn update_one(&self, id: TodoId, patch: TodoPatch) -> Result<UpdateOutcome, StorageError>;
    async fn delete_one(&self, id: TodoId) -> Result<u64, StorageError>;
    async fn delete_many(&self, filter: TodoFilter) -> Result<u64, StorageError>;
}
