//! GitHub Issues adapter for the `TicketProvider` port, over the REST v3 API.
//!
//! A repository is the scoping axis; GitHub has no project granularity here,
//! so `project_id` is ignored. Unlike Linear and Jira, a label swap takes two
//! sequential calls (remove, then add). There is no rollback: when the add
//! step fails after a successful remove, the error says so, and the caller
//! re-verifies with a fresh fetch before retrying.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::model::{IssueFilter, NormalizedIssue, Priority, StateCategory, WorkflowState};
use crate::provider::{ProviderFuture, TicketProvider};

const GITHUB_API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("labelflow/", env!("CARGO_PKG_VERSION"));

/// Live ticket provider backed by one GitHub repository's issues.
pub struct GithubProvider {
    client: Client,
    token: String,
    owner: String,
    repo: String,
}

impl GithubProvider {
    /// Creates a provider bound to `owner/repo`.
    #[must_use]
    pub fn new(token: String, owner: String, repo: String) -> Self {
        // The GitHub API rejects requests without a User-Agent.
        let client = Client::builder().user_agent(USER_AGENT).build().unwrap_or_else(|err| {
            warn!(%err, "failed to build HTTP client with User-Agent; GitHub may reject requests");
            Client::new()
        });
        Self { client, token, owner, repo }
    }

    fn issues_url(&self, suffix: &str) -> String {
        format!("{GITHUB_API_URL}/repos/{}/{}/issues{suffix}", self.owner, self.repo)
    }

    /// Builds the URL for one label on one issue.
    ///
    /// Label names may contain `?`, `#`, spaces, or `/`; the name is
    /// percent-encoded as a single path segment so none of those can
    /// truncate the path (an unencoded `?` would turn the request into a
    /// delete of every label on the issue).
    fn label_url(&self, number: u64, label: &str) -> Result<reqwest::Url, ProviderError> {
        let mut url = reqwest::Url::parse(&self.issues_url(&format!("/{number}/labels")))
            .map_err(|e| ProviderError::Config(format!("invalid GitHub API URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ProviderError::Config("GitHub API URL cannot carry segments".into()))?
            .push(label);
        Ok(url)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    /// Reads a response body, translating HTTP failures into the taxonomy.
    ///
    /// GitHub reports primary-rate-limit exhaustion as 403 with a rate-limit
    /// message, which must not be mistaken for a credential problem.
    async fn read_body(
        response: reqwest::Response,
        context: &str,
    ) -> Result<String, ProviderError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::from_transport("Failed to read GitHub response", &e))?;
        if status.is_success() {
            return Ok(text);
        }

        let detail = format!("{context} ({}): {text}", status.as_u16());
        if status == reqwest::StatusCode::FORBIDDEN && text.to_lowercase().contains("rate limit") {
            return Err(ProviderError::RateLimited(detail));
        }
        Err(ProviderError::from_status(status, detail))
    }
}

impl TicketProvider for GithubProvider {
    fn fetch_issues_by_label<'a>(
        &'a self,
        filter: &IssueFilter,
    ) -> ProviderFuture<'a, Vec<NormalizedIssue>> {
        // project_id is ignored: the repository is the only scoping axis.
        let label = filter.label_name.clone();
        Box::pin(async move {
            debug!(repo = %format!("{}/{}", self.owner, self.repo), %label, "listing GitHub issues");
            let response = self
                .request(self.client.get(self.issues_url("")))
                .query(&[("labels", label.as_str()), ("state", "all"), ("per_page", "100")])
                .send()
                .await
                .map_err(|e| ProviderError::from_transport("GitHub issue list failed", &e))?;

            let text = Self::read_body(response, "GitHub issue list error").await?;
            let raw: Vec<GithubIssue> = serde_json::from_str(&text).map_err(|e| {
                ProviderError::Validation(format!("Unexpected GitHub issue list shape: {e}"))
            })?;

            raw.into_iter()
                // The issues endpoint also returns pull requests; this
                // workflow only deals in issues.
                .filter(|issue| issue.pull_request.is_none())
                .map(normalize_issue)
                .collect()
        })
    }

    fn fetch_issue_by_id<'a>(&'a self, identifier: &str) -> ProviderFuture<'a, NormalizedIssue> {
        let identifier = identifier.to_owned();
        Box::pin(async move {
            let number = parse_issue_number(&identifier)?;
            let response = self
                .request(self.client.get(self.issues_url(&format!("/{number}"))))
                .send()
                .await
                .map_err(|e| ProviderError::from_transport("GitHub issue fetch failed", &e))?;

            if response.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(ProviderError::NotFound(format!(
                    "issue '{identifier}' not found in {}/{}",
                    self.owner, self.repo
                )));
            }

            let text = Self::read_body(response, "GitHub issue fetch error").await?;
            let raw: GithubIssue = serde_json::from_str(&text).map_err(|e| {
                ProviderError::Validation(format!("Unexpected GitHub issue shape: {e}"))
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
        let identifier = issue.identifier.clone();
        let has_remove = issue.labels.contains(remove_label);
        let remove = remove_label.to_owned();
        let add = add_label.to_owned();
        Box::pin(async move {
            let number = parse_issue_number(&identifier)?;

            // Step 1: remove, when the label is present.
            if has_remove {
                let url = self.label_url(number, &remove)?;
                let response = self
                    .request(self.client.delete(url))
                    .send()
                    .await
                    .map_err(|e| ProviderError::from_transport("GitHub label remove failed", &e))?;
                Self::read_body(
                    response,
                    &format!("GitHub label remove step failed for '{remove}' on #{number}"),
                )
                .await?;
            }

            // Step 2: add. A failure here after a successful remove leaves
            // the issue with neither label; the message records that so the
            // caller can re-verify and retry just this step.
            let result = async {
                let response = self
                    .request(self.client.post(self.issues_url(&format!("/{number}/labels"))))
                    .json(&serde_json::json!({ "labels": [add] }))
                    .send()
                    .await
                    .map_err(|e| ProviderError::from_transport("GitHub label add failed", &e))?;
                Self::read_body(
                    response,
                    &format!("GitHub label add step failed on #{number}"),
                )
                .await
            }
            .await;

            match result {
                Ok(_) => Ok(()),
                Err(err) if has_remove => {
                    warn!(issue = %identifier, "label add failed after remove succeeded");
                    Err(add_step_failure(&remove, err))
                }
                Err(err) => Err(err),
            }
        })
    }
}

/// Annotates an add-step error with the fact that the remove already ran.
fn add_step_failure(removed: &str, err: ProviderError) -> ProviderError {
    let annotate = |detail: String| format!("{detail} (note: '{removed}' was already removed)");
    match err {
        ProviderError::Auth(d) => ProviderError::Auth(annotate(d)),
        ProviderError::NotFound(d) => ProviderError::NotFound(annotate(d)),
        ProviderError::RateLimited(d) => ProviderError::RateLimited(annotate(d)),
        ProviderError::Network(d) => ProviderError::Network(annotate(d)),
        ProviderError::Validation(d) => ProviderError::Validation(annotate(d)),
        ProviderError::Config(d) => ProviderError::Config(annotate(d)),
    }
}

/// Accepts `#42` or `42` as the human-facing issue identifier.
fn parse_issue_number(identifier: &str) -> Result<u64, ProviderError> {
    identifier.trim_start_matches('#').parse().map_err(|_| {
        ProviderError::NotFound(format!("'{identifier}' is not a GitHub issue number"))
    })
}

/// A raw GitHub issue (or pull request) from the issues endpoint.
#[derive(Deserialize)]
struct GithubIssue {
    id: u64,
    number: u64,
    title: String,
    body: Option<String>,
    state: String,
    state_reason: Option<String>,
    #[serde(default)]
    labels: Vec<GithubLabel>,
    pull_request: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct GithubLabel {
    name: String,
}

/// Maps GitHub's open/closed state onto the normalized category.
///
/// Open issues are `unstarted` (GitHub models no in-progress state), closed
/// ones split on `state_reason`.
fn map_state_category(state: &str, state_reason: Option<&str>) -> Result<StateCategory, ProviderError> {
    match (state, state_reason) {
        ("open", _) => Ok(StateCategory::Unstarted),
        ("closed", Some("not_planned")) => Ok(StateCategory::Canceled),
        ("closed", _) => Ok(StateCategory::Completed),
        (other, _) => Err(ProviderError::Config(format!("unmapped GitHub issue state '{other}'"))),
    }
}

/// Translates a raw GitHub issue into the normalized model.
///
/// GitHub issues carry no priority field, so priority is always `None`.
fn normalize_issue(raw: GithubIssue) -> Result<NormalizedIssue, ProviderError> {
    let category = map_state_category(&raw.state, raw.state_reason.as_deref())?;
    Ok(NormalizedIssue {
        id: raw.id.to_string(),
        identifier: format!("#{}", raw.number),
        title: raw.title,
        description: raw.body,
        priority: Priority::None,
        state: WorkflowState {
            id: raw.state.clone(),
            name: raw.state_reason.unwrap_or(raw.state),
            category,
        },
        labels: raw.labels.into_iter().map(|label| label.name).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_issue() -> GithubIssue {
        serde_json::from_value(json!({
            "id": 987_654,
            "number": 42,
            "title": "Promote stale candidates",
            "body": "Details",
            "state": "open",
            "state_reason": null,
            "labels": [
                { "name": "automation-candidate" },
                { "name": "good first issue" }
            ],
            "pull_request": null
        }))
        .unwrap()
    }

    #[test]
    fn normalizes_open_issue() {
        let issue = normalize_issue(sample_issue()).unwrap();
        assert_eq!(issue.id, "987654");
        assert_eq!(issue.identifier, "#42");
        assert_eq!(issue.priority, Priority::None);
        assert_eq!(issue.state.category, StateCategory::Unstarted);
        assert!(issue.labels.contains("good first issue"));
    }

    #[test]
    fn closed_state_splits_on_reason() {
        assert_eq!(map_state_category("closed", Some("completed")).unwrap(), StateCategory::Completed);
        assert_eq!(map_state_category("closed", Some("not_planned")).unwrap(), StateCategory::Canceled);
        assert_eq!(map_state_category("closed", None).unwrap(), StateCategory::Completed);
    }

    #[test]
    fn unknown_state_is_a_config_error() {
        let err = map_state_category("hibernating", None).unwrap_err();
        assert!(matches!(err, ProviderError::Config(_)));
    }

    #[test]
    fn issue_number_accepts_hash_prefix() {
        assert_eq!(parse_issue_number("#42").unwrap(), 42);
        assert_eq!(parse_issue_number("42").unwrap(), 42);
    }

    #[test]
    fn non_numeric_identifier_is_not_found() {
        let err = parse_issue_number("PROJ-42").unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
    }

    #[test]
    fn add_step_failure_notes_completed_remove() {
        let err = add_step_failure(
            "automation-candidate",
            ProviderError::Network("GitHub label add step failed on #42".into()),
        );
        let message = err.to_string();
        assert!(message.contains("add step failed"));
        assert!(message.contains("'automation-candidate' was already removed"));
    }

    #[test]
    fn label_url_percent_encodes_awkward_label_names() {
        let provider = GithubProvider::new("t".into(), "acme".into(), "widgets".into());
        let url = provider.label_url(42, "wont-fix? maybe/later").unwrap();
        assert_eq!(url.query(), None, "the label must not spill into a query string");
        assert!(url.path().ends_with("/issues/42/labels/wont-fix%3F%20maybe%2Flater"));
    }

    #[test]
    fn label_url_keeps_plain_names_readable() {
        let provider = GithubProvider::new("t".into(), "acme".into(), "widgets".into());
        let url = provider.label_url(7, "automation-candidate").unwrap();
        assert!(url.as_str().ends_with("/issues/7/labels/automation-candidate"));
    }

    #[test]
    fn user_agent_is_a_valid_header_value() {
        // The only realistic way the client builder can reject the
        // User-Agent is an invalid header value.
        assert!(reqwest::header::HeaderValue::from_str(USER_AGENT).is_ok());
    }

    #[test]
    fn pull_requests_are_recognizable() {
        let raw: GithubIssue = serde_json::from_value(json!({
            "id": 1,
            "number": 7,
            "title": "A PR",
            "body": null,
            "state": "open",
            "state_reason": null,
            "labels": [],
            "pull_request": { "url": "https://api.github.com/..." }
        }))
        .unwrap();
        assert!(raw.pull_request.is_some());
    }
}
