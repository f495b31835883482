//! libSQL backend for `AssignmentStore`.
//!
//! Supports local file and in-memory databases. A developer's current
//! task count is derived from the `assignments` table on every read.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};

use crate::assignment::model::{
    Availability, DEFAULT_CAPACITY, DEFAULT_PRIORITY, DeveloperRecord, TaskRecord, clamp_priority,
};
use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::{AssignmentStore, NewDeveloper, NewTask, RecordSource};

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.init_schema().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        backend.init_schema().await?;
        Ok(backend)
    }

    /// Get the connection.
    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

const TASK_COLUMNS: &str = "t.id, t.title, t.description, t.required_skills, t.priority";

const DEVELOPER_COLUMNS: &str = "d.id, d.name, d.availability, d.skills, d.capacity, \
     (SELECT COUNT(*) FROM assignments a WHERE a.developer_id = d.id)";

/// Parse a JSON skill array. NULL or blank means no list on record.
fn parse_skills(raw: Option<&str>) -> Result<Option<BTreeSet<String>>, DatabaseError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|json| {
            serde_json::from_str(json)
                .map_err(|e| DatabaseError::Serialization(format!("skills: {e}")))
        })
        .transpose()
}

fn skills_to_json(skills: &BTreeSet<String>) -> Result<String, DatabaseError> {
    serde_json::to_string(skills).map_err(|e| DatabaseError::Serialization(e.to_string()))
}

fn row_to_task(row: &libsql::Row) -> Result<TaskRecord, DatabaseError> {
    let id: i64 = row.get(0).map_err(|e| DatabaseError::Query(format!("task.id: {e}")))?;
    let title: String = row.get(1).unwrap_or_default();

    let description: Option<String> = row.get(2).ok();
    let description = description.filter(|s| !s.is_empty());

    let skills_str: Option<String> = row.get(3).ok();
    let required_skills = parse_skills(skills_str.as_deref())?.unwrap_or_default();

    let priority = row
        .get::<i64>(4)
        .ok()
        .map(clamp_priority)
        .unwrap_or(DEFAULT_PRIORITY);

    Ok(TaskRecord {
        id,
        title,
        description,
        required_skills,
        priority,
    })
}

fn row_to_developer(row: &libsql::Row) -> Result<DeveloperRecord, DatabaseError> {
    let id: i64 = row
        .get(0)
        .map_err(|e| DatabaseError::Query(format!("developer.id: {e}")))?;
    let name: String = row.get(1).unwrap_or_default();

    let availability_str: String = row.get(2).unwrap_or_else(|_| "unavailable".to_string());
    let availability = Availability::parse(&availability_str);

    let skills_str: Option<String> = row.get(3).ok();
    let skills = parse_skills(skills_str.as_deref())?;

    let capacity = row
        .get::<i64>(4)
        .ok()
        .filter(|c| *c > 0)
        .and_then(|c| u32::try_from(c).ok())
        .unwrap_or(DEFAULT_CAPACITY);

    let count: i64 = row.get(5).unwrap_or(0);
    let current_task_count = u32::try_from(count.max(0)).unwrap_or(u32::MAX);

    Ok(DeveloperRecord {
        id,
        name,
        availability,
        skills,
        current_task_count,
        capacity,
    })
}

fn is_unique_violation(e: &libsql::Error) -> bool {
    e.to_string().contains("UNIQUE constraint failed")
}

// ── Trait implementation ────────────────────────────────────────────

#[async_trait]
impl RecordSource for LibSqlBackend {
    async fn fetch_task(&self, id: i64) -> Result<Option<TaskRecord>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!("SELECT {TASK_COLUMNS} FROM tasks t WHERE t.id = ?1"),
                params![id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("fetch_task: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_task(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("fetch_task row: {e}"))),
        }
    }

    async fn fetch_developer(&self, id: i64) -> Result<Option<DeveloperRecord>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!("SELECT {DEVELOPER_COLUMNS} FROM developers d WHERE d.id = ?1"),
                params![id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("fetch_developer: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_developer(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("fetch_developer row: {e}"))),
        }
    }
}

#[async_trait]
impl AssignmentStore for LibSqlBackend {
    async fn init_schema(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    // ── Records ─────────────────────────────────────────────────────

    async fn insert_task(&self, task: &NewTask) -> Result<i64, DatabaseError> {
        let conn = self.conn();
        let skills_json = skills_to_json(&task.required_skills)?;
        let priority = task.priority.map(|p| clamp_priority(p as i64) as i64);

        conn.execute(
            "INSERT INTO tasks (title, description, required_skills, priority, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                task.title.as_str(),
                task.description.as_deref(),
                skills_json,
                priority,
                Utc::now().to_rfc3339(),
            ],
        )
        .await
        .map_err(|e| DatabaseError::Query(format!("insert_task: {e}")))?;

        let id = conn.last_insert_rowid();
        debug!(id, title = %task.title, "Task created");
        Ok(id)
    }

    async fn insert_developer(&self, developer: &NewDeveloper) -> Result<i64, DatabaseError> {
        let conn = self.conn();
        let skills_json = developer.skills.as_ref().map(skills_to_json).transpose()?;
        let capacity = developer.capacity.filter(|c| *c > 0).map(|c| c as i64);

        conn.execute(
            "INSERT INTO developers (name, availability, skills, capacity, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                developer.name.as_str(),
                developer.availability.as_str(),
                skills_json,
                capacity,
                Utc::now().to_rfc3339(),
            ],
        )
        .await
        .map_err(|e| DatabaseError::Query(format!("insert_developer: {e}")))?;

        let id = conn.last_insert_rowid();
        debug!(id, name = %developer.name, "Developer created");
        Ok(id)
    }

    async fn set_developer_availability(
        &self,
        id: i64,
        availability: Availability,
    ) -> Result<bool, DatabaseError> {
        let conn = self.conn();
        let affected = conn
            .execute(
                "UPDATE developers SET availability = ?1 WHERE id = ?2",
                params![availability.as_str(), id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("set_developer_availability: {e}")))?;
        Ok(affected > 0)
    }

    // ── Assignments ─────────────────────────────────────────────────

    async fn create_assignment(
        &self,
        task_id: i64,
        developer_id: i64,
    ) -> Result<i64, DatabaseError> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO assignments (task_id, developer_id, created_at) VALUES (?1, ?2, ?3)",
            params![task_id, developer_id, Utc::now().to_rfc3339()],
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DatabaseError::Constraint(format!("task {task_id} already has an assignee"))
            } else {
                DatabaseError::Query(format!("create_assignment: {e}"))
            }
        })?;

        let id = conn.last_insert_rowid();
        debug!(id, task_id, developer_id, "Assignment created");
        Ok(id)
    }

    async fn count_assignments(&self, developer_id: i64) -> Result<i64, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                "SELECT COUNT(*) FROM assignments WHERE developer_id = ?1",
                params![developer_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("count_assignments: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(row.get::<i64>(0).unwrap_or(0)),
            Ok(None) => Ok(0),
            Err(e) => Err(DatabaseError::Query(format!("count_assignments row: {e}"))),
        }
    }

    async fn task_assignee(&self, task_id: i64) -> Result<Option<i64>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                "SELECT developer_id FROM assignments WHERE task_id = ?1",
                params![task_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("task_assignee: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(row.get::<i64>(0).ok()),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("task_assignee row: {e}"))),
        }
    }

    async fn list_unassigned_tasks(&self) -> Result<Vec<TaskRecord>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {TASK_COLUMNS} FROM tasks t
                     WHERE NOT EXISTS (SELECT 1 FROM assignments a WHERE a.task_id = t.id)
                     ORDER BY t.id ASC"
                ),
                (),
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_unassigned_tasks: {e}")))?;

        let mut tasks = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("list_unassigned_tasks row: {e}")))?
        {
            tasks.push(row_to_task(&row)?);
        }
        Ok(tasks)
    }

    async fn list_available_developers(&self) -> Result<Vec<DeveloperRecord>, DatabaseError> {
        let conn = self.conn();
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {DEVELOPER_COLUMNS} FROM developers d
                     WHERE d.availability = ?1 ORDER BY d.id ASC"
                ),
                params![Availability::Available.as_str()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("list_available_developers: {e}")))?;

        let mut developers = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::Query(format!("list_available_developers row: {e}")))?
        {
            developers.push(row_to_developer(&row)?);
        }
        Ok(developers)
    }
}
