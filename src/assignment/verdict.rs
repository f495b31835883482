//! Turns a terminal evaluation context into the caller-facing result.

use serde::{Deserialize, Serialize};

use super::context::{Category, EvaluationContext};

/// Explanation attached to a soft disqualification.
pub const NOT_AVAILABLE_EXPLANATION: &str =
    "Developer is not currently available for new assignments.";

/// The recommendation carried by a successful evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Highly recommended match")]
    HighlyRecommended,
    #[serde(rename = "Good match")]
    GoodMatch,
    #[serde(rename = "Consider other developers")]
    ConsiderOthers,
    #[serde(rename = "Developer is not available")]
    NotAvailable,
}

impl Recommendation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HighlyRecommended => "Highly recommended match",
            Self::GoodMatch => "Good match",
            Self::ConsiderOthers => "Consider other developers",
            Self::NotAvailable => "Developer is not available",
        }
    }
}

impl From<Category> for Recommendation {
    fn from(category: Category) -> Self {
        match category {
            Category::HighlyRecommended => Self::HighlyRecommended,
            Category::GoodMatch => Self::GoodMatch,
            Category::Fallback => Self::ConsiderOthers,
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A completed evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub task_id: i64,
    pub developer_id: i64,
    pub recommendation: Recommendation,
    pub score: f64,
    pub skill_match: f64,
    pub workload: f64,
    pub explanation: String,
}

/// An evaluation that could not resolve one of its records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationFailure {
    pub error: String,
    pub task_id: i64,
    pub developer_id: i64,
}

/// Result of `evaluate(task_id, developer_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EvaluationResult {
    Verdict(Verdict),
    Error(EvaluationFailure),
}

impl EvaluationResult {
    pub fn task_id(&self) -> i64 {
        match self {
            Self::Verdict(v) => v.task_id,
            Self::Error(e) => e.task_id,
        }
    }

    pub fn developer_id(&self) -> i64 {
        match self {
            Self::Verdict(v) => v.developer_id,
            Self::Error(e) => e.developer_id,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        match self {
            Self::Verdict(v) => Some(v),
            Self::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Verdict(_) => None,
            Self::Error(e) => Some(&e.error),
        }
    }
}

/// Build the result from a context the tree has finished with.
pub fn assemble(ctx: EvaluationContext) -> EvaluationResult {
    if let Some(error) = ctx.error {
        return EvaluationResult::Error(EvaluationFailure {
            error,
            task_id: ctx.task_id,
            developer_id: ctx.developer_id,
        });
    }

    // No category without an error means the availability check halted the run.
    let (recommendation, explanation) = match ctx.category {
        Some(category) => (category.into(), explain(category, ctx.skill_match, ctx.workload)),
        None => (Recommendation::NotAvailable, NOT_AVAILABLE_EXPLANATION.to_string()),
    };

    EvaluationResult::Verdict(Verdict {
        task_id: ctx.task_id,
        developer_id: ctx.developer_id,
        recommendation,
        score: ctx.score,
        skill_match: ctx.skill_match,
        workload: ctx.workload,
        explanation,
    })
}

/// Human-readable reason for a category.
pub fn explain(category: Category, skill_match: f64, workload: f64) -> String {
    match category {
        Category::HighlyRecommended => format!(
            "Developer has excellent skill match ({}) and available capacity ({} available).",
            percent(skill_match),
            percent(1.0 - workload)
        ),
        Category::GoodMatch => format!(
            "Developer has good skill match ({}) and reasonable capacity ({} available).",
            percent(skill_match),
            percent(1.0 - workload)
        ),
        Category::Fallback => format!(
            "Developer has limited skill match ({}) or high workload ({} of capacity used).",
            percent(skill_match),
            percent(workload)
        ),
    }
}

fn percent(ratio: f64) -> String {
    format!("{:.0}%", ratio * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classified(category: Category, skill_match: f64, workload: f64) -> EvaluationContext {
        let mut ctx = EvaluationContext::new(5, 6);
        ctx.skill_match = skill_match;
        ctx.workload = workload;
        ctx.classify(category);
        ctx
    }

    #[test]
    fn error_wins_over_everything() {
        let mut ctx = classified(Category::GoodMatch, 0.7, 0.1);
        ctx.error = Some("Task with ID 5 not found".into());
        let result = assemble(ctx);
        assert!(result.is_error());
        assert_eq!(result.error(), Some("Task with ID 5 not found"));
        assert_eq!(result.task_id(), 5);
        assert_eq!(result.developer_id(), 6);
    }

    #[test]
    fn highly_recommended_explanation() {
        let result = assemble(classified(Category::HighlyRecommended, 1.0, 0.4));
        let verdict = result.verdict().unwrap();
        assert_eq!(verdict.recommendation, Recommendation::HighlyRecommended);
        assert_eq!(verdict.score, 0.9);
        assert_eq!(
            verdict.explanation,
            "Developer has excellent skill match (100%) and available capacity (60% available)."
        );
    }

    #[test]
    fn good_match_explanation() {
        let text = explain(Category::GoodMatch, 0.75, 0.5);
        assert_eq!(
            text,
            "Developer has good skill match (75%) and reasonable capacity (50% available)."
        );
    }

    #[test]
    fn fallback_explanation_uses_raw_workload() {
        let text = explain(Category::Fallback, 0.5, 0.2);
        assert_eq!(
            text,
            "Developer has limited skill match (50%) or high workload (20% of capacity used)."
        );
    }

    #[test]
    fn soft_disqualification_has_zero_fields() {
        let result = assemble(EvaluationContext::new(1, 2));
        let verdict = result.verdict().unwrap();
        assert_eq!(verdict.recommendation, Recommendation::NotAvailable);
        assert_eq!(verdict.score, 0.0);
        assert_eq!(verdict.skill_match, 0.0);
        assert_eq!(verdict.workload, 0.0);
        assert_eq!(verdict.explanation, NOT_AVAILABLE_EXPLANATION);
    }

    #[test]
    fn serializes_to_flat_shapes() {
        let ok = serde_json::to_value(assemble(classified(Category::Fallback, 0.5, 0.2))).unwrap();
        assert_eq!(ok["recommendation"], "Consider other developers");
        assert_eq!(ok["score"], 0.3);
        assert!(ok.get("error").is_none());

        let mut ctx = EvaluationContext::new(8, 9);
        ctx.error = Some("Developer with ID 9 not found".into());
        let err = serde_json::to_value(assemble(ctx)).unwrap();
        assert_eq!(err["error"], "Developer with ID 9 not found");
        assert_eq!(err["task_id"], 8);
        assert!(err.get("score").is_none());
        assert!(err.get("recommendation").is_none());
    }

    #[test]
    fn deserializes_either_shape() {
        let err: EvaluationResult =
            serde_json::from_str(r#"{"error":"x","task_id":1,"developer_id":2}"#).unwrap();
        assert!(err.is_error());

        let ok: EvaluationResult = serde_json::from_str(
            r#"{"task_id":1,"developer_id":2,"recommendation":"Good match","score":0.7,
                "skill_match":0.7,"workload":0.1,"explanation":"e"}"#,
        )
        .unwrap();
        assert_eq!(ok.verdict().unwrap().recommendation, Recommendation::GoodMatch);
    }
}
