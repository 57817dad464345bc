use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};

use crate::errors::StorageError;
use crate::todos::{NewTodo, Todo, TodoCollection, TodoFilter, TodoId, TodoPatch, UpdateOutcome};

/// In-process todo collection kept in insertion order.
///
/// With a file path every mutation is written to disk as a JSON array before
/// it becomes visible. The file is replaced by renaming a sibling temp file,
/// so a failed write leaves both the file and memory unchanged. A mutation
/// runs to completion on its own task even if the caller stops waiting, so
/// memory and disk never diverge.
pub struct LocalTodoCollection {
    docs: Arc<RwLock<Vec<Todo>>>,
    file_path: Option<Arc<PathBuf>>,
}

impl Default for LocalTodoCollection {
    fn default() -> Self { Self::in_memory() }
}

impl LocalTodoCollection {
    pub fn in_memory() -> Self {
        Self { docs: Arc::new(RwLock::new(Vec::new())), file_path: None }
    }

    /// Open a file-backed collection. Creates the file with an empty array if missing.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Self, StorageError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| StorageError::unavailable("open", e))?;
        }

        let docs: Vec<Todo> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                StorageError::unexpected("open", format!("{} is not a todo array: {e}", file_path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                write_docs(&file_path, &[]).await?;
                Vec::new()
            }
            Err(e) => return Err(StorageError::unavailable("open", e)),
        };

        Ok(Self { docs: Arc::new(RwLock::new(docs)), file_path: Some(Arc::new(file_path)) })
    }

    pub fn file_path(&self) -> Option<&Path> { self.file_path.as_deref().map(PathBuf::as_path) }

    /// Apply `f` under the write lock, persisting before the change is committed.
    async fn mutate<R, F>(&self, f: F) -> Result<R, StorageError>
    where
        F: FnOnce(&mut Vec<Todo>) -> R + Send + 'static,
        R: Send + 'static,
    {
        let Some(path) = self.file_path.clone() else {
            let mut docs = self.docs.write().await;
            return Ok(f(&mut *docs));
        };
        let docs = Arc::clone(&self.docs);
        let task = tokio::spawn(async move {
            let mut docs = docs.write_owned().await;
            let mut next = docs.clone();
            let out = f(&mut next);
            write_docs(&path, &next).await?;
            *docs = next;
            Ok::<_, StorageError>(out)
        });
        task.await.map_err(|e| StorageError::unavailable("save", e))?
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

async fn write_docs(path: &Path, docs: &[Todo]) -> Result<(), StorageError> {
    let data = serde_json::to_vec_pretty(docs).map_err(|e| StorageError::unexpected("save", e.to_string()))?;
    let tmp = temp_path(path);
    fs::write(&tmp, data).await.map_err(|e| StorageError::unavailable("save", e))?;
    fs::rename(&tmp, path).await.map_err(|e| StorageError::unavailable("save", e))
}

#[async_trait]
impl TodoCollection for LocalTodoCollection {
    async fn find_all(&self) -> Result<Vec<Todo>, StorageError> {
        Ok(self.docs.read().await.clone())
    }

    async fn insert_one(&self, todo: NewTodo) -> Result<TodoId, StorageError> {
        let id = TodoId::generate();
        self.mutate(move |docs| docs.push(todo.into_todo(id))).await?;
        Ok(id)
    }

    async fn update_one(&self, id: TodoId, patch: TodoPatch) -> Result<UpdateOutcome, StorageError> {
        // skip the disk write when nothing would change
        {
            let docs = self.docs.read().await;
            match docs.iter().find(|t| t.id == id) {
                None => return Ok(UpdateOutcome { matched: false, modified: false }),
                Some(t) if !patch.apply(&mut t.clone()) => return Ok(UpdateOutcome { matched: true, modified: false }),
                Some(_) => {}
            }
        }
        self.mutate(move |docs| match docs.iter_mut().find(|t| t.id == id) {
            Some(t) => UpdateOutcome { matched: true, modified: patch.apply(t) },
            None => UpdateOutcome { matched: false, modified: false },
        })
        .await
    }

    async fn delete_one(&self, id: TodoId) -> Result<u64, StorageError> {
        self.mutate(move |docs| match docs.iter().position(|t| t.id == id) {
            Some(idx) => {
                docs.remove(idx);
                1
            }
            None => 0,
        })
        .await
    }

    async fn delete_many(&self, filter: TodoFilter) -> Result<u64, StorageError> {
        self.mutate(move |docs| {
            let before = docs.len();
            docs.retain(|t| !filter.matches(t));
            (before - docs.len()) as u64
        })
        .await
    }
}
