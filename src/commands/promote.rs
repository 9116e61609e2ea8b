//! `labelflow promote` command.

use crate::commands::CommandContext;
use crate::filter::filter_actionable_issues;
use crate::model::IssueFilter;
use crate::promotion::{
    format_outcomes, promote_issues, promote_named_issues, PromotionOutcome, PromotionSummary,
};

/// Execute the `promote` command.
///
/// With explicit identifiers, promotes exactly those issues; otherwise
/// promotes every actionable candidate in the configured scope. Either way
/// the batch always runs to completion — one issue's failure (including an
/// identifier that does not resolve) is recorded in its outcome and never
/// aborts the rest.
///
/// # Errors
///
/// Returns an error string when the candidate fetch fails or when any
/// promotion in the completed batch failed.
pub async fn run(ctx: &CommandContext, identifiers: &[String], dry_run: bool) -> Result<(), String> {
    if identifiers.is_empty() {
        let filter = IssueFilter {
            team_id: ctx.scope.team_id.clone(),
            label_name: ctx.labels.candidate.clone(),
            project_id: ctx.scope.project_id.clone(),
        };
        let issues = ctx
            .service
            .fetch_issues_by_label(&filter)
            .await
            .map_err(|e| format!("Failed to fetch candidate issues: {e}"))?;
        let issues = filter_actionable_issues(issues);

        if dry_run {
            if issues.is_empty() {
                println!("Dry run — nothing to promote.");
                return Ok(());
            }
            println!("Dry run — would promote:");
            for issue in &issues {
                println!("  {} {}", issue.identifier, issue.title);
            }
            return Ok(());
        }

        let outcomes = promote_issues(&ctx.service, &issues, &ctx.labels).await;
        return report(&outcomes);
    }

    if dry_run {
        println!("Dry run — would promote:");
        for identifier in identifiers {
            println!("  {identifier}");
        }
        return Ok(());
    }

    let outcomes = promote_named_issues(&ctx.service, identifiers, &ctx.labels).await;
    report(&outcomes)
}

/// Prints the per-issue report and summary; fails when any issue failed.
fn report(outcomes: &[PromotionOutcome]) -> Result<(), String> {
    println!("{}", format_outcomes(outcomes));

    let summary = PromotionSummary::from_outcomes(outcomes);
    println!(
        "Promoted: {}, already ready: {}, failed: {}",
        summary.promoted, summary.already_ready, summary.failed
    );

    if summary.failed > 0 {
        Err(format!("{} of {} promotion(s) failed", summary.failed, outcomes.len()))
    } else {
        Ok(())
    }
}
