//! Task assignment engine: a fixed behavior tree that decides how well a
//! developer fits a task.
//!
//! Every evaluation flows through:
//! 1. `Check::Availability`: an unavailable developer halts the run softly
//! 2. `Check::SkillMatch`, `Check::Workload`, `Check::Priority`: fill the context
//! 3. `DecisionRule` selector: HighlyRecommended, then GoodMatch, then Fallback
//! 4. `verdict::assemble()`: turns the terminal context into an `EvaluationResult`
//!
//! The tree itself is pure and synchronous. `AssignmentService` does the async
//! record fetching and records assignments.

pub mod checks;
pub mod context;
pub mod model;
pub mod routes;
pub mod rules;
pub mod service;
pub mod tree;
pub mod verdict;

pub use context::{Category, EvaluationContext, EvaluationInput};
pub use model::{Availability, DeveloperRecord, TaskRecord};
pub use routes::{AssignmentRouteState, assignment_routes};
pub use service::{
    AssignmentReceipt, AssignmentService, AvailabilityReport, BatchAssignment, BatchOutcome,
};
pub use tree::{AssignmentTree, Node, Status};
pub use verdict::{EvaluationFailure, EvaluationResult, Recommendation, Verdict};
