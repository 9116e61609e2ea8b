//! Batch promotion: move issues from the candidate label to the ready label.
//!
//! Issues are processed strictly sequentially, in input order; each swap
//! completes before the next begins, so the final summary is reproducible
//! regardless of network timing. One issue's failure never aborts the batch.

use crate::error::ProviderError;
use crate::model::{LabelConfig, NormalizedIssue, SwapResult};
use crate::service::TicketService;

/// The result of one issue's promotion attempt.
#[derive(Debug)]
pub struct PromotionOutcome {
    /// Human-facing issue key.
    pub identifier: String,
    /// Issue title, for the report.
    pub title: String,
    /// The swap result, or the error that stopped this issue (and only
    /// this issue).
    pub result: Result<SwapResult, ProviderError>,
}

/// Aggregate counts over a batch of promotion outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionSummary {
    /// Issues whose ready label was newly applied.
    pub promoted: usize,
    /// Issues that already carried the ready label (no write performed).
    pub already_ready: usize,
    /// Issues whose swap failed.
    pub failed: usize,
}

impl PromotionSummary {
    /// Tallies a batch of outcomes.
    #[must_use]
    pub fn from_outcomes(outcomes: &[PromotionOutcome]) -> Self {
        let mut summary = Self { promoted: 0, already_ready: 0, failed: 0 };
        for outcome in outcomes {
            match &outcome.result {
                Ok(swap) if swap.already_had_target => summary.already_ready += 1,
                Ok(_) => summary.promoted += 1,
                Err(_) => summary.failed += 1,
            }
        }
        summary
    }
}

/// Promotes each issue in order, swapping the candidate label for the ready
/// label.
///
/// Outcomes come back in input order, one per issue, with failures recorded
/// in place rather than aborting the batch.
pub async fn promote_issues(
    service: &TicketService,
    issues: &[NormalizedIssue],
    labels: &LabelConfig,
) -> Vec<PromotionOutcome> {
    let mut outcomes = Vec::with_capacity(issues.len());
    for issue in issues {
        let result =
            service.swap_labels(&issue.identifier, &labels.candidate, &labels.ready).await;
        outcomes.push(PromotionOutcome {
            identifier: issue.identifier.clone(),
            title: issue.title.clone(),
            result,
        });
    }
    outcomes
}

/// Promotes explicitly named issues, resolving each identifier in order.
///
/// An identifier that fails to resolve (or whose swap fails) is recorded as
/// a failed outcome in place; the rest of the batch still runs. Resolution
/// happens per issue so one bad identifier cannot abort the others.
pub async fn promote_named_issues(
    service: &TicketService,
    identifiers: &[String],
    labels: &LabelConfig,
) -> Vec<PromotionOutcome> {
    let mut outcomes = Vec::with_capacity(identifiers.len());
    for identifier in identifiers {
        let outcome = match service.fetch_issue_by_id(identifier).await {
            Ok(issue) => PromotionOutcome {
                identifier: issue.identifier.clone(),
                title: issue.title.clone(),
                result: service
                    .swap_labels(&issue.identifier, &labels.candidate, &labels.ready)
                    .await,
            },
            Err(err) => PromotionOutcome {
                identifier: identifier.clone(),
                title: String::new(),
                result: Err(err),
            },
        };
        outcomes.push(outcome);
    }
    outcomes
}

/// Formats a batch of outcomes as a human-readable report.
#[must_use]
pub fn format_outcomes(outcomes: &[PromotionOutcome]) -> String {
    if outcomes.is_empty() {
        return "No issues to promote.".to_string();
    }

    let mut lines = Vec::new();
    for outcome in outcomes {
        match &outcome.result {
            Ok(swap) if swap.already_had_target => {
                lines.push(format!("  SKIP {}: already ready", outcome.identifier));
            }
            Ok(swap) => {
                let removed = swap.removed.as_deref().unwrap_or("nothing");
                lines.push(format!(
                    "  PROMOTE {}: {} (removed {removed})",
                    outcome.identifier, outcome.title
                ));
            }
            Err(err) => {
                lines.push(format!("  FAIL {}: {err}", outcome.identifier));
            }
        }
    }
    lines.join("\n")
}
