//! Provider-agnostic issue model.
//!
//! Every adapter translates its backend's native response into these shapes.
//! Instances are built fresh from the live provider response on each call —
//! the core holds no cache and no issue survives the call that produced it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Issue priority, ordered from least to most urgent.
///
/// The derive order matters: `None < Low < Medium < High < Urgent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// No priority assigned.
    None,
    /// Low priority.
    Low,
    /// Medium priority.
    Medium,
    /// High priority.
    High,
    /// Urgent priority.
    Urgent,
}

/// The six workflow-state categories every provider state maps onto.
///
/// The mapping from a provider's native states to these categories is
/// adapter-owned; every native state maps to exactly one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateCategory {
    /// Not yet scheduled.
    Backlog,
    /// Scheduled but not begun.
    Unstarted,
    /// Work in progress.
    Started,
    /// Finished.
    Completed,
    /// Abandoned.
    Canceled,
    /// Awaiting review.
    Review,
}

impl Priority {
    /// Lowercase display name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl StateCategory {
    /// Lowercase display name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::Unstarted => "unstarted",
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
            Self::Review => "review",
        }
    }
}

/// A provider workflow state with its normalized category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Provider-internal state identifier.
    pub id: String,
    /// Human-readable state name (e.g. `"In Progress"`).
    pub name: String,
    /// Normalized category this state belongs to.
    pub category: StateCategory,
}

/// An issue normalized across tracker backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedIssue {
    /// Opaque provider-internal identifier, used for mutations.
    pub id: String,
    /// Human-facing key (e.g. `PROJ-42`), unique within the queried scope.
    pub identifier: String,
    /// Issue title.
    pub title: String,
    /// Issue description, when the provider supplies one.
    pub description: Option<String>,
    /// Normalized priority.
    pub priority: Priority,
    /// Current workflow state.
    pub state: WorkflowState,
    /// Label names attached to the issue. A set: no duplicates, order
    /// irrelevant.
    pub labels: BTreeSet<String>,
}

/// Scope and label criteria for a fetch-by-label query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueFilter {
    /// Team (or equivalent scoping axis) to search within.
    pub team_id: String,
    /// Exact label name to match, compared case-sensitively as stored.
    pub label_name: String,
    /// Additional project narrowing. Providers without project granularity
    /// ignore this silently.
    pub project_id: Option<String>,
}

/// Outcome of one label-swap attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapResult {
    /// Label that was removed, or `None` if the source label was absent.
    pub removed: Option<String>,
    /// Label that was added, or `None` when nothing was written.
    pub added: Option<String>,
    /// True when the target label was already present; such a swap performs
    /// no mutation at all.
    pub already_had_target: bool,
}

/// The two label names that define a promotion workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Label marking an issue as proposed for automation.
    pub candidate: String,
    /// Label marking an issue as cleared for automation.
    pub ready: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self { candidate: "automation-candidate".into(), ready: "automation-ready".into() }
    }
}
