//! Evaluation tree: composite nodes and the interpreter that ticks them.
//!
//! The tree is built once and never mutated. Every evaluation gets its own
//! `EvaluationContext`, so one tree can serve any number of concurrent
//! evaluations.

use tracing::debug;

use super::checks::Check;
use super::context::{EvaluationContext, EvaluationInput};
use super::rules::DecisionRule;
use super::verdict::{self, EvaluationResult};

/// Outcome of ticking a node. Every node resolves within the same tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
}

/// A node in the evaluation tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Runs children in order; fails on the first failing child.
    Sequence {
        name: &'static str,
        children: Vec<Node>,
    },
    /// Runs children in order; succeeds on the first succeeding child.
    Selector {
        name: &'static str,
        children: Vec<Node>,
    },
    Check(Check),
    Rule(DecisionRule),
}

impl Node {
    pub fn name(&self) -> &'static str {
        match self {
            Node::Sequence { name, .. } | Node::Selector { name, .. } => *name,
            Node::Check(check) => check.name(),
            Node::Rule(rule) => rule.name(),
        }
    }
}

/// Tick `node` once against `input`, writing into `ctx`.
///
/// Context written by children before a short-circuit is kept.
pub fn tick(node: &Node, input: &EvaluationInput<'_>, ctx: &mut EvaluationContext) -> Status {
    match node {
        Node::Sequence { name, children } => {
            for child in children {
                if tick(child, input, ctx) == Status::Failure {
                    debug!(node = *name, halted_at = child.name(), "Sequence failed");
                    return Status::Failure;
                }
            }
            Status::Success
        }
        Node::Selector { name, children } => {
            for child in children {
                if tick(child, input, ctx) == Status::Success {
                    debug!(node = *name, selected = child.name(), "Selector succeeded");
                    return Status::Success;
                }
            }
            Status::Failure
        }
        Node::Check(check) => {
            let status = check.run(input, ctx);
            debug!(
                check = check.name(),
                ?status,
                task_id = ctx.task_id,
                developer_id = ctx.developer_id,
                "Check ran"
            );
            status
        }
        Node::Rule(rule) => rule.run(ctx),
    }
}

/// The fixed assignment tree:
/// Availability → SkillMatch → Workload → Priority → (HighlyRecommended | GoodMatch | Fallback).
#[derive(Debug, Clone)]
pub struct AssignmentTree {
    root: Node,
}

impl Default for AssignmentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl AssignmentTree {
    pub fn new() -> Self {
        let decision = Node::Selector {
            name: "AssignmentDecision",
            children: vec![
                Node::Rule(DecisionRule::HighlyRecommended),
                Node::Rule(DecisionRule::GoodMatch),
                Node::Rule(DecisionRule::Fallback),
            ],
        };

        let root = Node::Sequence {
            name: "TaskAssignmentSequence",
            children: vec![
                Node::Check(Check::Availability),
                Node::Check(Check::SkillMatch),
                Node::Check(Check::Workload),
                Node::Check(Check::Priority),
                decision,
            ],
        };

        Self { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Tick the tree once with a fresh context and return the terminal state.
    pub fn run(&self, input: &EvaluationInput<'_>) -> (Status, EvaluationContext) {
        let mut ctx = EvaluationContext::new(input.task_id, input.developer_id);
        let status = tick(&self.root, input, &mut ctx);
        (status, ctx)
    }

    /// Evaluate one task/developer pair.
    pub fn evaluate(&self, input: &EvaluationInput<'_>) -> EvaluationResult {
        let (_, ctx) = self.run(input);
        verdict::assemble(ctx)
    }
}
