//! Error types for the assignment service.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Assignment error: {0}")]
    Assignment(#[from] AssignmentError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
///
/// These describe the store failing, never a record being absent. Absent
/// records come back as `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors from the assignment operations (not from evaluation).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssignmentError {
    #[error("Task with ID {0} not found")]
    TaskNotFound(i64),

    #[error("Developer with ID {0} not found")]
    DeveloperNotFound(i64),

    #[error("Developer {0} is not available")]
    DeveloperUnavailable(i64),

    #[error("Task {task_id} is already assigned to developer {developer_id}")]
    AlreadyAssigned { task_id: i64, developer_id: i64 },
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
