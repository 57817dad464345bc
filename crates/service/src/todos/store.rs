use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::instrument;

use super::collection::TodoCollection;
use super::domain::{CompletionOutcome, NewTodo, Todo, TodoFilter, TodoId, TodoPatch};
use crate::errors::{StorageError, StoreError};

const ENTITY: &str = "todo";

/// CRUD access to the todo collection with existence and idempotence rules.
///
/// Holds no mutable state of its own; clones share the same collection.
/// Dropping an operation's future aborts the in-flight storage call.
pub struct ResourceStore<C: TodoCollection + ?Sized> {
    collection: Arc<C>,
    timeout: Option<Duration>,
}

pub type DynResourceStore = ResourceStore<dyn TodoCollection>;

impl<C: TodoCollection + ?Sized> Clone for ResourceStore<C> {
    fn clone(&self) -> Self {
        Self { collection: Arc::clone(&self.collection), timeout: self.timeout }
    }
}

impl<C: TodoCollection + ?Sized> ResourceStore<C> {
    pub fn new(collection: Arc<C>) -> Self { Self { collection, timeout: None } }

    /// A view of this store whose storage calls fail with a timeout after `limit`.
    pub fn with_timeout(&self, limit: Duration) -> Self {
        Self { collection: Arc::clone(&self.collection), timeout: Some(limit) }
    }

    pub fn timeout(&self) -> Option<Duration> { self.timeout }

    async fn call<T, F>(&self, op: &'static str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StorageError>>,
    {
        match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(res) => Ok(res?),
                Err(_) => Err(StorageError::timeout(op, limit).into()),
            },
            None => Ok(fut.await?),
        }
    }

    /// All todos in storage order.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        self.call("find_all", self.collection.find_all()).await
    }

    /// Insert a todo and return its id.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::storage::local::LocalTodoCollection;
    /// use service::todos::ResourceStore;
    /// let store = ResourceStore::new(Arc::new(LocalTodoCollection::in_memory()));
    /// let id = tokio_test::block_on(store.create("Buy milk")).unwrap();
    /// let all = tokio_test::block_on(store.list()).unwrap();
    /// assert_eq!(all[0].id, id);
    /// assert!(tokio_test::block_on(store.create("   ")).is_err());
    /// ```
    #[instrument(skip(self))]
    pub async fn create(&self, title: &str) -> Result<TodoId, StoreError> {
        let new = NewTodo::parse(title)?;
        self.call("insert_one", self.collection.insert_one(new)).await
    }

    /// Mark a todo completed. Completing an already completed todo succeeds.
    #[instrument(skip(self))]
    pub async fn mark_completed(&self, id: TodoId) -> Result<CompletionOutcome, StoreError> {
        let outcome = self.call("update_one", self.collection.update_one(id, TodoPatch::complete())).await?;
        match (outcome.matched, outcome.modified) {
            (false, false) => Err(StoreError::not_found(ENTITY, id)),
            (false, true) => Err(StorageError::unexpected("update_one", "modified a record it did not match").into()),
            (true, true) => Ok(CompletionOutcome::Completed),
            (true, false) => Ok(CompletionOutcome::AlreadyCompleted),
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_one(&self, id: TodoId) -> Result<(), StoreError> {
        match self.call("delete_one", self.collection.delete_one(id)).await? {
            0 => Err(StoreError::not_found(ENTITY, id)),
            1 => Ok(()),
            n => Err(StorageError::unexpected("delete_one", format!("removed {n} records for one id")).into()),
        }
    }

    /// Remove every todo, returning how many were removed.
    #[instrument(skip(self))]
    pub async fn delete_all(&self) -> Result<u64, StoreError> {
        self.call("delete_many", self.collection.delete_many(TodoFilter::All)).await
    }
}
