//! Storage collaborators implementing `TodoCollection`.
//!
//! - `local`: in-process document collection, optionally persisted as JSON.
//! - `seaorm`: PostgreSQL through the shared connection.

pub mod local;
pub mod seaorm;
