//! Assignment service. Runs the tree over stored records and records assignments.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::context::EvaluationInput;
use super::model::{Availability, TaskRecord};
use super::tree::AssignmentTree;
use super::verdict::EvaluationResult;
use crate::error::{AssignmentError, DatabaseError, Result};
use crate::store::AssignmentStore;

/// Current availability of a developer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityReport {
    pub developer_id: i64,
    pub availability: Availability,
    pub current_task_count: u32,
}

/// Confirmation of a recorded assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentReceipt {
    pub task_id: i64,
    pub developer_id: i64,
    pub message: String,
}

impl AssignmentReceipt {
    fn new(task_id: i64, developer_id: i64) -> Self {
        Self {
            task_id,
            developer_id,
            message: format!("Task {task_id} successfully assigned to developer {developer_id}"),
        }
    }
}

/// One line of a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchAssignment {
    pub task_id: i64,
    pub developer_id: i64,
    pub success: bool,
    pub message: String,
}

/// Result of `assign_batch`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Set when the batch had nothing to do.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub assignments: Vec<BatchAssignment>,
}

impl BatchOutcome {
    fn idle(message: &str) -> Self {
        Self {
            message: Some(message.to_string()),
            assignments: Vec::new(),
        }
    }
}

pub const NO_UNASSIGNED_TASKS: &str = "No unassigned tasks found.";
pub const NO_AVAILABLE_DEVELOPERS: &str = "No available developers found.";

/// Evaluates and records task assignments against a store.
pub struct AssignmentService {
    store: Arc<dyn AssignmentStore>,
    tree: AssignmentTree,
}

impl AssignmentService {
    pub fn new(store: Arc<dyn AssignmentStore>) -> Self {
        Self {
            store,
            tree: AssignmentTree::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn AssignmentStore> {
        &self.store
    }

    // ── Evaluation ──────────────────────────────────────────────────

    /// Evaluate one task/developer pair.
    ///
    /// Unresolved ids come back as the error variant of the result. A store
    /// failure is returned as `Err`.
    pub async fn evaluate(&self, task_id: i64, developer_id: i64) -> Result<EvaluationResult> {
        let task = self.store.fetch_task(task_id).await?;
        let developer = self.store.fetch_developer(developer_id).await?;

        let input = EvaluationInput::new(task_id, developer_id, task.as_ref(), developer.as_ref());
        let result = self.tree.evaluate(&input);
        log_result(&result);
        Ok(result)
    }

    /// Evaluate every candidate for one task, best first.
    ///
    /// Ordered by score, then skill match (both descending), then developer
    /// id. Candidates that failed to resolve go last.
    pub async fn rank_candidates(
        &self,
        task_id: i64,
        developer_ids: &[i64],
    ) -> Result<Vec<EvaluationResult>> {
        let task = self.store.fetch_task(task_id).await?;

        let mut results = Vec::with_capacity(developer_ids.len());
        for &developer_id in developer_ids {
            let developer = self.store.fetch_developer(developer_id).await?;
            let input =
                EvaluationInput::new(task_id, developer_id, task.as_ref(), developer.as_ref());
            let result = self.tree.evaluate(&input);
            log_result(&result);
            results.push(result);
        }

        results.sort_by(rank_order);
        debug!(task_id, candidates = results.len(), "Candidates ranked");
        Ok(results)
    }

    // ── Lookups ─────────────────────────────────────────────────────

    pub async fn task_details(&self, task_id: i64) -> Result<TaskRecord> {
        let task = self.store.fetch_task(task_id).await?;
        Ok(task.ok_or(AssignmentError::TaskNotFound(task_id))?)
    }

    pub async fn developer_availability(&self, developer_id: i64) -> Result<AvailabilityReport> {
        let developer = self
            .store
            .fetch_developer(developer_id)
            .await?
            .ok_or(AssignmentError::DeveloperNotFound(developer_id))?;

        Ok(AvailabilityReport {
            developer_id,
            availability: developer.availability,
            current_task_count: developer.current_task_count,
        })
    }

    // ── Assignment ──────────────────────────────────────────────────

    /// Record `task_id` as assigned to `developer_id`.
    pub async fn assign(&self, task_id: i64, developer_id: i64) -> Result<AssignmentReceipt> {
        if self.store.fetch_task(task_id).await?.is_none() {
            return Err(AssignmentError::TaskNotFound(task_id).into());
        }

        let developer = self
            .store
            .fetch_developer(developer_id)
            .await?
            .ok_or(AssignmentError::DeveloperNotFound(developer_id))?;

        if developer.availability != Availability::Available {
            return Err(AssignmentError::DeveloperUnavailable(developer_id).into());
        }

        if let Some(existing) = self.store.task_assignee(task_id).await? {
            return Err(AssignmentError::AlreadyAssigned {
                task_id,
                developer_id: existing,
            }
            .into());
        }

        match self.store.create_assignment(task_id, developer_id).await {
            Ok(_) => {}
            Err(DatabaseError::Constraint(_)) => {
                // Lost a race with another writer.
                let existing = self
                    .store
                    .task_assignee(task_id)
                    .await?
                    .unwrap_or(developer_id);
                return Err(AssignmentError::AlreadyAssigned {
                    task_id,
                    developer_id: existing,
                }
                .into());
            }
            Err(e) => return Err(e.into()),
        }

        info!(task_id, developer_id, "Task assigned");
        Ok(AssignmentReceipt::new(task_id, developer_id))
    }

    /// Give every unassigned task to the least-loaded available developer.
    ///
    /// Ties go to the lowest developer id. Loads are updated as the batch
    /// proceeds.
    pub async fn assign_batch(&self) -> Result<BatchOutcome> {
        let tasks = self.store.list_unassigned_tasks().await?;
        if tasks.is_empty() {
            return Ok(BatchOutcome::idle(NO_UNASSIGNED_TASKS));
        }

        let developers = self.store.list_available_developers().await?;
        if developers.is_empty() {
            return Ok(BatchOutcome::idle(NO_AVAILABLE_DEVELOPERS));
        }

        let mut load: BTreeMap<i64, u32> = developers
            .iter()
            .map(|d| (d.id, d.current_task_count))
            .collect();

        let mut outcome = BatchOutcome::default();
        for task in &tasks {
            let Some(developer_id) = least_loaded(&load) else {
                break;
            };

            let line = match self.store.create_assignment(task.id, developer_id).await {
                Ok(_) => {
                    if let Some(count) = load.get_mut(&developer_id) {
                        *count += 1;
                    }
                    BatchAssignment {
                        task_id: task.id,
                        developer_id,
                        success: true,
                        message: AssignmentReceipt::new(task.id, developer_id).message,
                    }
                }
                Err(DatabaseError::Constraint(msg)) => {
                    warn!(task_id = task.id, developer_id, "Batch assignment skipped: {msg}");
                    BatchAssignment {
                        task_id: task.id,
                        developer_id,
                        success: false,
                        message: format!("Task {} is already assigned", task.id),
                    }
                }
                Err(e) => return Err(e.into()),
            };
            outcome.assignments.push(line);
        }

        let assigned = outcome.assignments.iter().filter(|a| a.success).count();
        info!(tasks = tasks.len(), assigned, "Batch assignment complete");
        Ok(outcome)
    }
}

/// Developer with the fewest assignments, lowest id on ties.
fn least_loaded(load: &BTreeMap<i64, u32>) -> Option<i64> {
    load.iter()
        .min_by_key(|(id, count)| (**count, **id))
        .map(|(id, _)| *id)
}

fn rank_order(a: &EvaluationResult, b: &EvaluationResult) -> Ordering {
    match (a.verdict(), b.verdict()) {
        (Some(x), Some(y)) => y
            .score
            .total_cmp(&x.score)
            .then_with(|| y.skill_match.total_cmp(&x.skill_match))
            .then_with(|| x.developer_id.cmp(&y.developer_id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.developer_id().cmp(&b.developer_id()),
    }
}

fn log_result(result: &EvaluationResult) {
    match result {
        EvaluationResult::Verdict(v) => info!(
            task_id = v.task_id,
            developer_id = v.developer_id,
            recommendation = %v.recommendation,
            score = v.score,
            skill_match = v.skill_match,
            workload = v.workload,
            "Assignment evaluated"
        ),
        EvaluationResult::Error(e) => info!(
            task_id = e.task_id,
            developer_id = e.developer_id,
            error = %e.error,
            "Assignment evaluation failed"
        ),
    }
}
