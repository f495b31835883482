//! Per-evaluation scratch state.

use super::model::{Availability, DeveloperRecord, TaskRecord};

/// Which decision rule claimed the evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    HighlyRecommended,
    GoodMatch,
    Fallback,
}

impl Category {
    /// Fixed score attached to the category.
    pub const fn score(self) -> f64 {
        match self {
            Self::HighlyRecommended => 0.9,
            Self::GoodMatch => 0.7,
            Self::Fallback => 0.3,
        }
    }
}

/// Records resolved for one evaluation. `None` means the id did not resolve.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationInput<'a> {
    pub task_id: i64,
    pub developer_id: i64,
    pub task: Option<&'a TaskRecord>,
    pub developer: Option<&'a DeveloperRecord>,
}

impl<'a> EvaluationInput<'a> {
    pub fn new(
        task_id: i64,
        developer_id: i64,
        task: Option<&'a TaskRecord>,
        developer: Option<&'a DeveloperRecord>,
    ) -> Self {
        Self {
            task_id,
            developer_id,
            task,
            developer,
        }
    }

    /// Input where both records resolved.
    pub fn resolved(task: &'a TaskRecord, developer: &'a DeveloperRecord) -> Self {
        Self::new(task.id, developer.id, Some(task), Some(developer))
    }
}

/// Scratch state for exactly one evaluation.
///
/// Built fresh by every run and dropped once the verdict is assembled.
/// Fields a check never reached keep their zero value.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationContext {
    pub task_id: i64,
    pub developer_id: i64,
    pub availability: Option<Availability>,
    /// In [0, 1].
    pub skill_match: f64,
    /// Assigned / capacity. Exceeds 1.0 when over capacity.
    pub workload: f64,
    /// 1–5 once the priority check ran, 0 before.
    pub priority: u8,
    /// Set when a referenced record is missing.
    pub error: Option<String>,
    pub category: Option<Category>,
    pub score: f64,
}

impl EvaluationContext {
    pub fn new(task_id: i64, developer_id: i64) -> Self {
        Self {
            task_id,
            developer_id,
            availability: None,
            skill_match: 0.0,
            workload: 0.0,
            priority: 0,
            error: None,
            category: None,
            score: 0.0,
        }
    }

    /// Record the winning category and its score.
    pub fn classify(&mut self, category: Category) {
        self.category = Some(category);
        self.score = category.score();
    }
}
