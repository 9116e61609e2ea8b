//! Actionable-issue classification.

use crate::model::{NormalizedIssue, StateCategory};

/// Returns true when an issue is still eligible for automated work.
///
/// Completed, canceled, and in-review issues are done as far as the
/// promotion workflow is concerned.
#[must_use]
pub fn is_actionable(issue: &NormalizedIssue) -> bool {
    matches!(
        issue.state.category,
        StateCategory::Backlog | StateCategory::Unstarted | StateCategory::Started
    )
}

/// Keeps only actionable issues, preserving relative input order.
///
/// Pure and deterministic: no network access, no side effects, same input
/// yields the same output.
#[must_use]
pub fn filter_actionable_issues(issues: Vec<NormalizedIssue>) -> Vec<NormalizedIssue> {
    issues.into_iter().filter(is_actionable).collect()
}
