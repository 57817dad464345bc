use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use models::db::SharedConnection;
use models::todo::{self, Entity as TodoEntity};

use crate::errors::StorageError;
use crate::todos::{NewTodo, Todo, TodoCollection, TodoFilter, TodoId, TodoPatch, UpdateOutcome};

/// PostgreSQL-backed collection over the process-wide shared connection.
pub struct SeaOrmTodoCollection {
    conn: Arc<SharedConnection>,
}

impl SeaOrmTodoCollection {
    pub fn new(conn: Arc<SharedConnection>) -> Self { Self { conn } }

    async fn db(&self, op: &'static str) -> Result<&DatabaseConnection, StorageError> {
        self.conn.get().await.map_err(|e| StorageError::unavailable(op, e))
    }
}

#[async_trait]
impl TodoCollection for SeaOrmTodoCollection {
    async fn find_all(&self) -> Result<Vec<Todo>, StorageError> {
        let db = self.db("find_all").await?;
        let rows = TodoEntity::find()
            .order_by_asc(todo::Column::CreatedAt)
            .all(db)
            .await
            .map_err(|e| StorageError::unavailable("find_all", e))?;
        Ok(rows.into_iter().map(Todo::from).collect())
    }

    async fn insert_one(&self, new: NewTodo) -> Result<TodoId, StorageError> {
        let db = self.db("insert_one").await?;
        let am = todo::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(new.title().to_string()),
            completed: Set(false),
            created_at: Set(Utc::now().into()),
        };
        let created = am.insert(db).await.map_err(|e| StorageError::unavailable("insert_one", e))?;
        Ok(created.id.into())
    }

    async fn update_one(&self, id: TodoId, patch: TodoPatch) -> Result<UpdateOutcome, StorageError> {
        let db = self.db("update_one").await?;
        let txn = db.begin().await.map_err(|e| StorageError::unavailable("update_one", e))?;
        let found = TodoEntity::find_by_id(id.as_uuid())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| StorageError::unavailable("update_one", e))?;
        // dropping the transaction rolls it back
        let Some(existing) = found else { return Ok(UpdateOutcome { matched: false, modified: false }); };

        let mut current = Todo::from(existing.clone());
        let modified = patch.apply(&mut current);
        if modified {
            let mut am: todo::ActiveModel = existing.into();
            am.completed = Set(current.completed);
            am.update(&txn).await.map_err(|e| StorageError::unavailable("update_one", e))?;
        }
        txn.commit().await.map_err(|e| StorageError::unavailable("update_one", e))?;
        Ok(UpdateOutcome { matched: true, modified })
    }

    async fn delete_one(&self, id: TodoId) -> Result<u64, StorageError> {
        let db = self.db("delete_one").await?;
        let res = TodoEntity::delete_by_id(id.as_uuid())
            .exec(db)
            .await
            .map_err(|e| StorageError::unavailable("delete_one", e))?;
        Ok(res.rows_affected)
    }

    async fn delete_many(&self, filter: TodoFilter) -> Result<u64, StorageError> {
        let db = self.db("delete_many").await?;
        let mut stmt = TodoEntity::delete_many();
        if let TodoFilter::Completed(c) = filter {
            stmt = stmt.filter(todo::Column::Completed.eq(c));
        }
        let res = stmt.exec(db).await.map_err(|e| StorageError::unavailable("delete_many", e))?;
        Ok(res.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StoreError;
    use crate::test_support::shared_connection;
    use crate::todos::{CompletionOutcome, ResourceStore};

    #[tokio::test]
    async fn postgres_store_lifecycle() -> Result<(), anyhow::Error> {
        let Some(conn) = shared_connection() else { return Ok(()); };
        let store = ResourceStore::new(Arc::new(SeaOrmTodoCollection::new(Arc::clone(&conn))));

        let title = format!("Buy milk {}", Uuid::new_v4());
        let a = store.create(&title).await?;
        let found = store.list().await?.into_iter().find(|t| t.id == a).expect("created todo listed");
        assert_eq!(found, Todo { id: a, title: title.clone(), completed: false });

        assert_eq!(store.mark_completed(a).await?, CompletionOutcome::Completed);
        assert_eq!(store.mark_completed(a).await?, CompletionOutcome::AlreadyCompleted);
        let found = store.list().await?.into_iter().find(|t| t.id == a).expect("still listed");
        assert!(found.completed);

        store.delete_one(a).await?;
        assert!(matches!(store.delete_one(a).await, Err(StoreError::NotFound { .. })));
        assert!(matches!(store.mark_completed(a).await, Err(StoreError::NotFound { .. })));
        assert!(store.list().await?.iter().all(|t| t.id != a));

        conn.shutdown().await?;
        assert!(matches!(store.list().await, Err(StoreError::Storage(_))));
        Ok(())
    }
}
