//! Leaf checks run by the assignment sequence.
//!
//! Each check reads the pre-fetched records, writes its measurement into
//! the context, and reports pass/fail. A missing record sets
//! `context.error`; an unavailable developer fails without one.

use std::collections::BTreeSet;

use super::context::{EvaluationContext, EvaluationInput};
use super::model::{Availability, DEFAULT_CAPACITY, DeveloperRecord, TaskRecord};
use super::tree::Status;

/// The four measurement checks, in the order the sequence runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Availability,
    SkillMatch,
    Workload,
    Priority,
}

impl Check {
    pub fn name(self) -> &'static str {
        match self {
            Self::Availability => "CheckAvailability",
            Self::SkillMatch => "CheckSkillMatch",
            Self::Workload => "CheckWorkload",
            Self::Priority => "CheckPriority",
        }
    }

    pub fn run(self, input: &EvaluationInput<'_>, ctx: &mut EvaluationContext) -> Status {
        match self {
            Self::Availability => check_availability(input.developer, ctx),
            Self::SkillMatch => check_skill_match(input.task, input.developer, ctx),
            Self::Workload => check_workload(input.developer, ctx),
            Self::Priority => check_priority(input.task, ctx),
        }
    }
}

fn task_not_found(ctx: &mut EvaluationContext) -> Status {
    ctx.error = Some(format!("Task with ID {} not found", ctx.task_id));
    Status::Failure
}

fn check_availability(developer: Option<&DeveloperRecord>, ctx: &mut EvaluationContext) -> Status {
    let Some(developer) = developer else {
        ctx.error = Some(format!("Developer with ID {} not found", ctx.developer_id));
        return Status::Failure;
    };

    ctx.availability = Some(developer.availability);
    match developer.availability {
        Availability::Available => Status::Success,
        Availability::Unavailable => Status::Failure,
    }
}

fn check_skill_match(
    task: Option<&TaskRecord>,
    developer: Option<&DeveloperRecord>,
    ctx: &mut EvaluationContext,
) -> Status {
    // No skills on record: keep going so workload and priority still get assessed.
    let Some(skills) = developer.and_then(|d| d.skills.as_ref()) else {
        ctx.skill_match = 0.0;
        return Status::Success;
    };

    let Some(task) = task else {
        return task_not_found(ctx);
    };

    ctx.skill_match = skill_match_ratio(&task.required_skills, skills);
    Status::Success
}

fn check_workload(developer: Option<&DeveloperRecord>, ctx: &mut EvaluationContext) -> Status {
    let (count, capacity) = developer
        .map(|d| (d.current_task_count, d.capacity))
        .unwrap_or((0, DEFAULT_CAPACITY));
    ctx.workload = workload_ratio(count, capacity);
    Status::Success
}

fn check_priority(task: Option<&TaskRecord>, ctx: &mut EvaluationContext) -> Status {
    let Some(task) = task else {
        return task_not_found(ctx);
    };
    ctx.priority = task.priority;
    Status::Success
}

/// Fraction of `required` present in `available`. Vacuously 1.0 when nothing is required.
pub fn skill_match_ratio(required: &BTreeSet<String>, available: &BTreeSet<String>) -> f64 {
    if required.is_empty() {
        return 1.0;
    }
    let matched = required.intersection(available).count();
    matched as f64 / required.len() as f64
}

/// Assigned tasks over capacity. A zero capacity counts as full.
pub fn workload_ratio(current_task_count: u32, capacity: u32) -> f64 {
    if capacity == 0 {
        return 1.0;
    }
    current_task_count as f64 / capacity as f64
}
