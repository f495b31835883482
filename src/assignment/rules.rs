//! Decision rules tried by the selector, first match wins.
//!
//! All comparisons are strict, so a value sitting exactly on a threshold
//! falls through to the next rule.

use super::context::{Category, EvaluationContext};
use super::tree::Status;

/// Skill match needed for a highly recommended match.
pub const HIGH_SKILL_THRESHOLD: f64 = 0.8;
/// Workload must stay below this for a highly recommended match.
pub const HIGH_WORKLOAD_CEILING: f64 = 0.7;
/// Priority at or above which a task counts as urgent.
pub const URGENT_PRIORITY: u8 = 4;
/// Skill match needed for an urgent task to be highly recommended.
pub const URGENT_SKILL_THRESHOLD: f64 = 0.7;
/// Skill match needed for a good match.
pub const GOOD_SKILL_THRESHOLD: f64 = 0.6;
/// Workload must stay below this for a good match.
pub const GOOD_WORKLOAD_CEILING: f64 = 0.8;

/// The selector's children, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionRule {
    HighlyRecommended,
    GoodMatch,
    Fallback,
}

impl DecisionRule {
    pub fn name(self) -> &'static str {
        match self {
            Self::HighlyRecommended => "HighlyRecommended",
            Self::GoodMatch => "GoodMatch",
            Self::Fallback => "ConsiderOthers",
        }
    }

    pub fn category(self) -> Category {
        match self {
            Self::HighlyRecommended => Category::HighlyRecommended,
            Self::GoodMatch => Category::GoodMatch,
            Self::Fallback => Category::Fallback,
        }
    }

    /// Whether the rule's condition holds for the measured context.
    pub fn matches(self, ctx: &EvaluationContext) -> bool {
        match self {
            Self::HighlyRecommended => {
                (ctx.skill_match > HIGH_SKILL_THRESHOLD && ctx.workload < HIGH_WORKLOAD_CEILING)
                    || (ctx.priority >= URGENT_PRIORITY && ctx.skill_match > URGENT_SKILL_THRESHOLD)
            }
            Self::GoodMatch => {
                ctx.skill_match > GOOD_SKILL_THRESHOLD && ctx.workload < GOOD_WORKLOAD_CEILING
            }
            Self::Fallback => true,
        }
    }

    /// Claim the evaluation if the condition holds.
    pub fn run(self, ctx: &mut EvaluationContext) -> Status {
        if !self.matches(ctx) {
            return Status::Failure;
        }
        ctx.classify(self.category());
        Status::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(skill_match: f64, workload: f64, priority: u8) -> EvaluationContext {
        let mut ctx = EvaluationContext::new(1, 1);
        ctx.skill_match = skill_match;
        ctx.workload = workload;
        ctx.priority = priority;
        ctx
    }

    #[test]
    fn highly_recommended_by_skill_and_capacity() {
        assert!(DecisionRule::HighlyRecommended.matches(&ctx(0.9, 0.5, 1)));
        assert!(!DecisionRule::HighlyRecommended.matches(&ctx(0.9, 0.7, 1)));
    }

    #[test]
    fn highly_recommended_by_urgency() {
        assert!(DecisionRule::HighlyRecommended.matches(&ctx(0.75, 1.5, 4)));
        assert!(!DecisionRule::HighlyRecommended.matches(&ctx(0.75, 0.1, 3)));
        assert!(!DecisionRule::HighlyRecommended.matches(&ctx(0.7, 0.1, 5)));
    }

    #[test]
    fn boundary_values_fall_through() {
        let c = ctx(0.8, 0.5, 3);
        assert!(!DecisionRule::HighlyRecommended.matches(&c));
        assert!(DecisionRule::GoodMatch.matches(&c));

        assert!(!DecisionRule::GoodMatch.matches(&ctx(0.6, 0.1, 1)));
        assert!(!DecisionRule::GoodMatch.matches(&ctx(0.7, 0.8, 1)));
    }

    #[test]
    fn fallback_always_matches() {
        assert!(DecisionRule::Fallback.matches(&ctx(0.0, 3.0, 1)));
    }

    #[test]
    fn run_classifies_only_on_match() {
        let mut c = ctx(0.5, 0.2, 3);
        assert_eq!(DecisionRule::GoodMatch.run(&mut c), Status::Failure);
        assert!(c.category.is_none());
        assert_eq!(DecisionRule::Fallback.run(&mut c), Status::Success);
        assert_eq!(c.category, Some(Category::Fallback));
        assert_eq!(c.score, 0.3);
    }
}
