//! Store traits. The record-source contract the engine relies on, plus
//! the write operations the assignment service needs.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::assignment::model::{Availability, DeveloperRecord, TaskRecord};
use crate::error::DatabaseError;

/// Read-only lookup of the records an evaluation needs.
///
/// `Ok(None)` means the id does not resolve. `Err` means the store itself failed.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_task(&self, id: i64) -> Result<Option<TaskRecord>, DatabaseError>;

    async fn fetch_developer(&self, id: i64) -> Result<Option<DeveloperRecord>, DatabaseError>;
}

/// A task to be inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required_skills: BTreeSet<String>,
    /// Stored as NULL when absent; reads substitute the default.
    #[serde(default)]
    pub priority: Option<u8>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_required_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }
}

/// A developer to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDeveloper {
    pub name: String,
    pub availability: Availability,
    /// `None` stores no skills at all.
    #[serde(default)]
    pub skills: Option<BTreeSet<String>>,
    /// Stored as NULL when absent; reads substitute the default.
    #[serde(default)]
    pub capacity: Option<u32>,
}

impl NewDeveloper {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            availability: Availability::Available,
            skills: None,
            capacity: None,
        }
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = Some(skills.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }
}

/// Backend-agnostic store for tasks, developers and assignments.
#[async_trait]
pub trait AssignmentStore: RecordSource {
    /// Run all pending schema migrations.
    async fn init_schema(&self) -> Result<(), DatabaseError>;

    // ── Records ─────────────────────────────────────────────────────

    /// Insert a task. Returns its id.
    async fn insert_task(&self, task: &NewTask) -> Result<i64, DatabaseError>;

    /// Insert a developer. Returns its id.
    async fn insert_developer(&self, developer: &NewDeveloper) -> Result<i64, DatabaseError>;

    /// Change a developer's availability. Returns false if no such developer.
    async fn set_developer_availability(
        &self,
        id: i64,
        availability: Availability,
    ) -> Result<bool, DatabaseError>;

    // ── Assignments ─────────────────────────────────────────────────

    /// Record that `task_id` goes to `developer_id`. Returns the assignment id.
    async fn create_assignment(&self, task_id: i64, developer_id: i64)
    -> Result<i64, DatabaseError>;

    /// Number of tasks currently assigned to a developer.
    async fn count_assignments(&self, developer_id: i64) -> Result<i64, DatabaseError>;

    /// Developer the task is assigned to, if any.
    async fn task_assignee(&self, task_id: i64) -> Result<Option<i64>, DatabaseError>;

    /// Tasks with no assignment, lowest id first.
    async fn list_unassigned_tasks(&self) -> Result<Vec<TaskRecord>, DatabaseError>;

    /// Developers marked available, lowest id first.
    async fn list_available_developers(&self) -> Result<Vec<DeveloperRecord>, DatabaseError>;
}
