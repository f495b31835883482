//! Persistence layer: libSQL-backed storage for tasks, developers and assignments.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::{AssignmentStore, NewDeveloper, NewTask, RecordSource};
