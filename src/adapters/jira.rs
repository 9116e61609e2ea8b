//! Jira adapter for the `TicketProvider` port, over the Jira REST API v2.
//!
//! Jira is project-scoped: the project key is the team axis, so the filter's
//! `project_id` is redundant with the configured scope and ignored. Label
//! mutations are one atomic `PUT /issue/{key}` carrying add/remove
//! operations, so a swap is never half-applied.
//!
//! API v2 is used instead of v3 so `description` arrives as a plain string
//! rather than an Atlassian Document Format tree.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProviderError;
use crate::model::{
    IssueFilter, NormalizedIssue, Priority, StateCategory, WorkflowState,
};
use crate::provider::{ProviderFuture, TicketProvider};

const ISSUE_FIELDS: &str = "summary,description,priority,status,labels";

/// Live ticket provider backed by a Jira site.
pub struct JiraProvider {
    client: Client,
    base_url: String,
    email: String,
    api_token: String,
    project_key: String,
}

impl JiraProvider {
    /// Creates a provider bound to one Jira project.
    #[must_use]
    pub fn new(base_url: String, email: String, api_token: String, project_key: String) -> Self {
        Self { client: Client::new(), base_url, email, api_token, project_key }
    }

    fn api(&self, path: &str) -> String {
        format!("{}/rest/api/2/{path}", self.base_url)
    }

    /// Reads a response body, translating HTTP failures into the taxonomy.
    async fn read_body(
        response: reqwest::Response,
        context: &str,
    ) -> Result<String, ProviderError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::from_transport("Failed to read Jira response", &e))?;
        if status.is_success() {
            Ok(text)
        } else {
            Err(ProviderError::from_status(
                status,
                format!("{context} ({}): {text}", status.as_u16()),
            ))
        }
    }
}

impl TicketProvider for JiraProvider {
    fn fetch_issues_by_label<'a>(
        &'a self,
        filter: &IssueFilter,
    ) -> ProviderFuture<'a, Vec<NormalizedIssue>> {
        // project_id is ignored: Jira has no narrower axis below the
        // configured project key.
        let label = filter.label_name.clone();
        Box::pin(async move {
            let jql = format!(
                "project = \"{}\" AND labels = \"{}\" ORDER BY created ASC",
                escape_jql(&self.project_key),
                escape_jql(&label)
            );
            debug!(project = %self.project_key, %jql, "searching Jira issues");

            let response = self
                .client
                .get(self.api("search"))
                .basic_auth(&self.email, Some(&self.api_token))
                .query(&[("jql", jql.as_str()), ("fields", ISSUE_FIELDS), ("maxResults", "100")])
                .send()
                .await
                .map_err(|e| ProviderError::from_transport("Jira search failed", &e))?;

            let text = Self::read_body(response, "Jira search error").await?;
            let page: SearchPage = serde_json::from_str(&text).map_err(|e| {
                ProviderError::Validation(format!("Unexpected Jira search shape: {e}"))
            })?;
            page.issues.into_iter().map(normalize_issue).collect()
        })
    }

    fn fetch_issue_by_id<'a>(&'a self, identifier: &str) -> ProviderFuture<'a, NormalizedIssue> {
        let identifier = identifier.to_owned();
        Box::pin(async move {
            let response = self
                .client
                .get(self.api(&format!("issue/{identifier}")))
                .basic_auth(&self.email, Some(&self.api_token))
                .query(&[("fields", ISSUE_FIELDS)])
                .send()
                .await
                .map_err(|e| ProviderError::from_transport("Jira issue fetch failed", &e))?;

            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(ProviderError::NotFound(format!(
                    "issue '{identifier}' not found in Jira project {}",
                    self.project_key
                )));
            }

            let text = Self::read_body(response, "Jira issue fetch error").await?;
            let raw: JiraIssue = serde_json::from_str(&text).map_err(|e| {
                ProviderError::Validation(format!("Unexpected Jira issue shape: {e}"))
            })?;
            normalize_issue(raw)
        })
    }

    fn apply_label_swap<'a>(
        &'a self,
        issue: &NormalizedIssue,
        remove_label: &str,
        add_label: &str,
    ) -> ProviderFuture<'a, ()> {
        let key = issue.identifier.clone();
        let has_remove = issue.labels.contains(remove_label);
        let remove = remove_label.to_owned();
        let add = add_label.to_owned();
        Box::pin(async move {
            // Both operations ride in one request, applied atomically by
            // Jira, so there is no partially-swapped intermediate state.
            let mut operations = Vec::new();
            if has_remove {
                operations.push(LabelOperation::Remove { remove: remove.clone() });
            }
            operations.push(LabelOperation::Add { add: add.clone() });
            let body = UpdateRequest { update: LabelUpdate { labels: operations } };

            debug!(issue = %key, remove = %remove, add = %add, "updating Jira labels");
            let response = self
                .client
                .put(self.api(&format!("issue/{key}")))
                .basic_auth(&self.email, Some(&self.api_token))
                .json(&body)
                .send()
                .await
                .map_err(|e| ProviderError::from_transport("Jira label update failed", &e))?;

            Self::read_body(response, &format!("Jira label update error on '{key}'")).await?;
            Ok(())
        })
    }
}

/// One page of a JQL search response.
#[derive(Deserialize)]
struct SearchPage {
    issues: Vec<JiraIssue>,
}

/// A raw Jira issue.
#[derive(Deserialize)]
struct JiraIssue {
    id: String,
    key: String,
    fields: JiraFields,
}

#[derive(Deserialize)]
struct JiraFields {
    summary: String,
    description: Option<String>,
    priority: Option<JiraPriority>,
    status: JiraStatus,
    #[serde(default)]
    labels: Vec<String>,
}

#[derive(Deserialize)]
struct JiraPriority {
    name: String,
}

#[derive(Deserialize)]
struct JiraStatus {
    id: String,
    name: String,
    #[serde(rename = "statusCategory")]
    status_category: JiraStatusCategory,
}

#[derive(Deserialize)]
struct JiraStatusCategory {
    key: String,
}

/// `update.labels` payload for `PUT /issue/{key}`.
#[derive(Serialize)]
struct UpdateRequest {
    update: LabelUpdate,
}

#[derive(Serialize)]
struct LabelUpdate {
    labels: Vec<LabelOperation>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum LabelOperation {
    Add { add: String },
    Remove { remove: String },
}

/// Escapes a value for interpolation inside a double-quoted JQL string.
///
/// Backslashes and double quotes would otherwise terminate the quoted
/// value and corrupt the query.
fn escape_jql(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Maps a Jira status onto the normalized category.
///
/// Jira's three status categories (`new`, `indeterminate`, `done`) are
/// coarser than the six normalized ones, so the status name refines the
/// mapping for backlog, review, and canceled states.
fn map_state_category(category_key: &str, status_name: &str) -> Result<StateCategory, ProviderError> {
    let name = status_name.to_lowercase();
    if name == "backlog" {
        return Ok(StateCategory::Backlog);
    }
    if name.contains("review") {
        return Ok(StateCategory::Review);
    }
    if name == "canceled" || name == "cancelled" || name == "won't do" {
        return Ok(StateCategory::Canceled);
    }
    match category_key {
        "new" => Ok(StateCategory::Unstarted),
        "indeterminate" => Ok(StateCategory::Started),
        "done" => Ok(StateCategory::Completed),
        other => Err(ProviderError::Config(format!(
            "unmapped Jira status category '{other}' for status '{status_name}'"
        ))),
    }
}

/// Maps a Jira priority name onto the normalized scale.
fn map_priority(priority: Option<&str>) -> Priority {
    match priority.map(str::to_lowercase).as_deref() {
        Some("highest" | "urgent" | "blocker") => Priority::Urgent,
        Some("high" | "major") => Priority::High,
        Some("medium") => Priority::Medium,
        Some("low" | "lowest" | "minor" | "trivial") => Priority::Low,
        _ => Priority::None,
    }
}

/// Translates a raw Jira issue into the normalized model.
fn normalize_issue(raw: JiraIssue) -> Result<NormalizedIssue, ProviderError> {
    let category =
        map_state_category(&raw.fields.status.status_category.key, &raw.fields.status.name)?;
    Ok(NormalizedIssue {
        id: raw.id,
        identifier: raw.key,
        title: raw.fields.summary,
        description: raw.fields.description,
        priority: map_priority(raw.fields.priority.as_ref().map(|p| p.name.as_str())),
        state: WorkflowState {
            id: raw.fields.status.id,
            name: raw.fields.status.name,
            category,
        },
        labels: raw.fields.labels.into_iter().collect(),
    })
}
