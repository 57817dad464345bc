//! Todo resource: domain values, the storage collaborator contract and the
//! `ResourceStore` that enforces existence and idempotence rules on top of it.

pub mod domain;
pub mod collection;
pub mod store;

pub use domain::{CompletionOutcome, NewTodo, Todo, TodoFilter, TodoId, TodoPatch, UpdateOutcome};
pub use collection::TodoCollection;
pub use store::{DynResourceStore, ResourceStore};
