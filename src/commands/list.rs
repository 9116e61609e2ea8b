//! `labelflow list` command.

use crate::commands::CommandContext;
use crate::filter::filter_actionable_issues;
use crate::model::IssueFilter;

/// Execute the `list` command.
///
/// # Errors
///
/// Returns an error string when the fetch fails.
pub async fn run(ctx: &CommandContext, all: bool) -> Result<(), String> {
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

    let issues = if all { issues } else { filter_actionable_issues(issues) };
    if issues.is_empty() {
        println!("No candidate issues found.");
        return Ok(());
    }

    for issue in &issues {
        println!(
            "{:<12} {:<8} {:<14} {}",
            issue.identifier,
            issue.priority.as_str(),
            issue.state.name,
            issue.title
        );
    }
    println!("{} issue(s)", issues.len());
    Ok(())
}
