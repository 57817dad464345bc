//! Service layer for the todo resource.
//! - `todos`: domain values, the storage contract and `ResourceStore`.
//! - `storage`: collection implementations (local/JSON file, PostgreSQL).
//! - `runtime`: builds a store from configuration.

pub mod errors;
pub mod todos;
pub mod storage;
pub mod runtime;
#[cfg(test)]
pub mod test_support;
