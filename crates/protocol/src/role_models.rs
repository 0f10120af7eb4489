//! Role progress models.
//!
//! A role is one generated persona/prompt unit. The generate, review and
//! optimize stages iterate over roles, and the engine reports each role's
//! progress independently.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Category of a role within the generated system.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
    #[default]
    Core,
    Quality,
    Support,
}

/// Progress of a single role through generate/review/optimize.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "lowercase")]
pub enum RoleStatus {
    #[default]
    Pending,
    Generating,
    Reviewing,
    Optimizing,
    Completed,
    Error,
}

impl RoleStatus {
    /// Returns true for `Completed` and `Error`.
    pub fn is_terminal(self) -> bool {
        matches!(self, RoleStatus::Completed | RoleStatus::Error)
    }
}

/// A weakness reported by the reviewer.
///
/// Older engine versions report plain strings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(untagged)]
pub enum ReviewWeakness {
    Detailed {
        issue: String,
        #[serde(default)]
        severity: String,
        #[serde(default)]
        location: String,
    },
    Plain(String),
}

/// A suggestion reported by the reviewer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(untagged)]
pub enum ReviewSuggestion {
    Detailed {
        suggestion: String,
        #[serde(default)]
        priority: String,
        #[serde(default)]
        example: Option<String>,
    },
    Plain(String),
}

/// Structured review of a prompt.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct ReviewResult {
    pub score: f64,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<ReviewWeakness>,
    #[serde(default)]
    pub suggestions: Vec<ReviewSuggestion>,
    #[serde(default)]
    pub verdict: Option<String>,
}

/// Client-side progress of one role.
///
/// Owned by the pipeline store; only the reducer mutates it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct RoleProcessState {
    /// Identifier of the role, unique within a task.
    pub role_id: String,
    pub role_name: String,
    pub role_type: RoleType,
    pub status: RoleStatus,

    /// Produced prompt, empty until available.
    pub prompt: String,
    pub review: Option<ReviewResult>,

    /// Number of review/optimize iterations. Never decreases.
    pub iterations: u32,

    /// Final review score. Zero until `status` is `Completed`.
    pub final_score: f64,
}

impl RoleProcessState {
    /// A role that has not been worked on yet.
    pub fn pending(role_id: String, role_name: String, role_type: RoleType) -> Self {
        Self {
            role_id,
            role_name,
            role_type,
            status: RoleStatus::Pending,
            prompt: String::new(),
            review: None,
            iterations: 0,
            final_score: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_accepts_plain_and_detailed_findings() {
        let json = r#"{
            "score": 7.5,
            "strengths": ["clear"],
            "weaknesses": ["too long", {"issue": "vague", "severity": "high", "location": "intro"}],
            "suggestions": [{"priority": "high", "suggestion": "shorten"}]
        }"#;

        let review: ReviewResult = serde_json::from_str(json).unwrap();
        assert_eq!(review.score, 7.5);
        assert_eq!(review.weaknesses.len(), 2);
        assert!(matches!(&review.weaknesses[0], ReviewWeakness::Plain(s) if s == "too long"));
        assert!(matches!(
            &review.weaknesses[1],
            ReviewWeakness::Detailed { severity, .. } if severity == "high"
        ));
        assert!(matches!(
            &review.suggestions[0],
            ReviewSuggestion::Detailed { example: None, .. }
        ));
        assert_eq!(review.verdict, None);
    }

    #[test]
    fn test_pending_role_defaults() {
        let role = RoleProcessState::pending("r1".into(), "Planner".into(), RoleType::Core);
        assert_eq!(role.status, RoleStatus::Pending);
        assert!(role.prompt.is_empty());
        assert_eq!(role.iterations, 0);
        assert_eq!(role.final_score, 0.0);
    }
}
