//! `labelflow show` command.

use crate::commands::CommandContext;
use crate::filter::is_actionable;

/// Execute the `show` command.
///
/// # Errors
///
/// Returns an error string when the identifier does not resolve or the
/// fetch fails.
pub async fn run(ctx: &CommandContext, identifier: &str) -> Result<(), String> {
    let issue = ctx
        .service
        .fetch_issue_by_id(identifier)
        .await
        .map_err(|e| format!("Failed to fetch issue {identifier}: {e}"))?;

    println!("{} {}", issue.identifier, issue.title);
    println!("  state:      {} ({})", issue.state.name, issue.state.category.as_str());
    println!("  priority:   {}", issue.priority.as_str());
    println!("  actionable: {}", if is_actionable(&issue) { "yes" } else { "no" });
    if issue.labels.is_empty() {
        println!("  labels:     (none)");
    } else {
        let labels: Vec<&str> = issue.labels.iter().map(String::as_str).collect();
        println!("  labels:     {}", labels.join(", "));
    }
    if let Some(description) = &issue.description {
        println!("\n{description}");
    }
    Ok(())
}
