//! Linear adapter for the `TicketProvider` port, over the Linear GraphQL API.
//!
//! Linear is team-scoped with optional project narrowing. Label mutations
//! are a single atomic `issueUpdate` carrying the full recomputed label-id
//! set, so a swap can never leave the issue half-updated.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProviderError;
use crate::model::{IssueFilter, NormalizedIssue, Priority, StateCategory, WorkflowState};
use crate::provider::{ProviderFuture, TicketProvider};

const LINEAR_API_URL: &str = "https://api.linear.app/graphql";

const ISSUE_FIELDS: &str =
    "id identifier title description priority state { id name type } labels { nodes { id name } }";

/// Live ticket provider backed by Linear.
pub struct LinearProvider {
    client: Client,
    api_key: String,
    team_id: String,
}

impl LinearProvider {
    /// Creates a provider bound to one Linear team.
    #[must_use]
    pub fn new(api_key: String, team_id: String) -> Self {
        Self { client: Client::new(), api_key, team_id }
    }

    /// Sends one GraphQL request and returns the `data` object.
    async fn execute(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        debug!(team_id = %self.team_id, "sending Linear GraphQL request");

        let response = self
            .client
            .post(LINEAR_API_URL)
            .header("Authorization", &self.api_key)
            .json(&GraphqlRequest { query, variables })
            .send()
            .await
            .map_err(|e| ProviderError::from_transport("Linear request failed", &e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::from_transport("Failed to read Linear response", &e))?;

        if !status.is_success() {
            return Err(ProviderError::from_status(
                status,
                format!("Linear API error ({}): {text}", status.as_u16()),
            ));
        }

        let body: GraphqlResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::Validation(format!("Failed to parse Linear response: {e}")))?;

        if let Some(first) = body.errors.as_ref().and_then(|errors| errors.first()) {
            return Err(classify_graphql_error(&first.message));
        }

        body.data.ok_or_else(|| {
            ProviderError::Validation("Linear response carried neither data nor errors".into())
        })
    }

    /// Fetches one raw issue node, keeping label ids for mutations.
    async fn fetch_node(&self, identifier: &str) -> Result<IssueNode, ProviderError> {
        let query = format!("query($id: String!) {{ issue(id: $id) {{ {ISSUE_FIELDS} }} }}");
        let data = self.execute(&query, serde_json::json!({ "id": identifier })).await?;

        let node = data.get("issue").cloned().unwrap_or(serde_json::Value::Null);
        if node.is_null() {
            return Err(ProviderError::NotFound(format!(
                "issue '{identifier}' not found in Linear team {}",
                self.team_id
            )));
        }
        serde_json::from_value(node)
            .map_err(|e| ProviderError::Validation(format!("Unexpected Linear issue shape: {e}")))
    }

    /// Looks up the team-wide id of a label by name.
    async fn label_id(&self, name: &str) -> Result<String, ProviderError> {
        let query = "query($teamId: String!) { team(id: $teamId) { labels(first: 250) { nodes { id name } } } }";
        let data = self.execute(query, serde_json::json!({ "teamId": self.team_id })).await?;

        let catalog: TeamLabels = serde_json::from_value(data)
            .map_err(|e| ProviderError::Validation(format!("Unexpected Linear label shape: {e}")))?;
        catalog
            .team
            .labels
            .nodes
            .into_iter()
            .find(|label| label.name == name)
            .map(|label| label.id)
            .ok_or_else(|| {
                ProviderError::NotFound(format!(
                    "label '{name}' not found in Linear team {}",
                    self.team_id
                ))
            })
    }
}

impl TicketProvider for LinearProvider {
    fn fetch_issues_by_label<'a>(
        &'a self,
        filter: &IssueFilter,
    ) -> ProviderFuture<'a, Vec<NormalizedIssue>> {
        let filter = filter.clone();
        Box::pin(async move {
            // Linear supports project narrowing, so project_id is honored
            // when present.
            let (query, variables) = if let Some(project_id) = &filter.project_id {
                (
                    format!(
                        "query($teamId: ID, $label: String, $projectId: ID) {{ issues(first: 100, \
                         filter: {{ team: {{ id: {{ eq: $teamId }} }}, labels: {{ name: {{ eq: \
                         $label }} }}, project: {{ id: {{ eq: $projectId }} }} }}) {{ nodes {{ \
                         {ISSUE_FIELDS} }} }} }}"
                    ),
                    serde_json::json!({
                        "teamId": filter.team_id,
                        "label": filter.label_name,
                        "projectId": project_id,
                    }),
                )
            } else {
                (
                    format!(
                        "query($teamId: ID, $label: String) {{ issues(first: 100, filter: {{ \
                         team: {{ id: {{ eq: $teamId }} }}, labels: {{ name: {{ eq: $label }} }} \
                         }}) {{ nodes {{ {ISSUE_FIELDS} }} }} }}"
                    ),
                    serde_json::json!({ "teamId": filter.team_id, "label": filter.label_name }),
                )
            };

            let data = self.execute(&query, variables).await?;
            let page: IssuePage = serde_json::from_value(data).map_err(|e| {
                ProviderError::Validation(format!("Unexpected Linear issue list shape: {e}"))
            })?;
            page.issues.nodes.into_iter().map(normalize_issue).collect()
        })
    }

    fn fetch_issue_by_id<'a>(&'a self, identifier: &str) -> ProviderFuture<'a, NormalizedIssue> {
        let identifier = identifier.to_owned();
        Box::pin(async move {
            let node = self.fetch_node(&identifier).await?;
            normalize_issue(node)
        })
    }

    fn apply_label_swap<'a>(
        &'a self,
        issue: &NormalizedIssue,
        remove_label: &str,
        add_label: &str,
    ) -> ProviderFuture<'a, ()> {
        let identifier = issue.identifier.clone();
        let remove = remove_label.to_owned();
        let add = add_label.to_owned();
        Box::pin(async move {
            // Re-read for label ids; the normalized model carries names only.
            let node = self.fetch_node(&identifier).await?;
            let add_id = self.label_id(&add).await?;
            let label_ids = updated_label_ids(&node.labels.nodes, &remove, &add_id);

            let mutation = "mutation($id: String!, $labelIds: [String!]!) { issueUpdate(id: $id, \
                            input: { labelIds: $labelIds }) { success } }";
            let data = self
                .execute(mutation, serde_json::json!({ "id": node.id, "labelIds": label_ids }))
                .await?;

            let outcome: UpdatePayload = serde_json::from_value(data).map_err(|e| {
                ProviderError::Validation(format!("Unexpected Linear update shape: {e}"))
            })?;
            if outcome.issue_update.success {
                Ok(())
            } else {
                Err(ProviderError::Validation(format!(
                    "Linear rejected the label update on '{identifier}'"
                )))
            }
        })
    }

}

/// Request body for a GraphQL call.
#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

/// Top-level GraphQL response envelope.
#[derive(Deserialize)]
struct GraphqlResponse {
    data: Option<serde_json::Value>,
    errors: Option<Vec<GraphqlError>>,
}

/// One error entry in a GraphQL response.
#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

/// A raw Linear issue node.
#[derive(Deserialize)]
struct IssueNode {
    id: String,
    identifier: String,
    title: String,
    description: Option<String>,
    priority: Option<f64>,
    state: StateNode,
    labels: LabelConnection,
}

/// A Linear workflow state node.
#[derive(Deserialize)]
struct StateNode {
    id: String,
    name: String,
    #[serde(rename = "type")]
    state_type: String,
}

/// Labels attached to an issue.
#[derive(Deserialize)]
struct LabelConnection {
    nodes: Vec<LabelNode>,
}

/// One label with its team-wide id.
#[derive(Deserialize, Clone)]
struct LabelNode {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct IssuePage {
    issues: LabelledNodes,
}

#[derive(Deserialize)]
struct LabelledNodes {
    nodes: Vec<IssueNode>,
}

#[derive(Deserialize)]
struct TeamLabels {
    team: TeamNode,
}

#[derive(Deserialize)]
struct TeamNode {
    labels: TeamLabelConnection,
}

#[derive(Deserialize)]
struct TeamLabelConnection {
    nodes: Vec<LabelNode>,
}

#[derive(Deserialize)]
struct UpdatePayload {
    #[serde(rename = "issueUpdate")]
    issue_update: UpdateResult,
}

#[derive(Deserialize)]
struct UpdateResult {
    success: bool,
}

/// Maps a Linear state `type` onto the normalized category.
///
/// Linear's `triage` is treated as backlog: triaged-but-unsorted issues are
/// still awaiting scheduling.
fn map_state_category(state_type: &str, state_name: &str) -> Result<StateCategory, ProviderError> {
    match state_type {
        "triage" | "backlog" => Ok(StateCategory::Backlog),
        "unstarted" => Ok(StateCategory::Unstarted),
        "started" => Ok(StateCategory::Started),
        "completed" => Ok(StateCategory::Completed),
        "canceled" => Ok(StateCategory::Canceled),
        "review" => Ok(StateCategory::Review),
        other => Err(ProviderError::Config(format!(
            "unmapped Linear state type '{other}' for state '{state_name}'"
        ))),
    }
}

/// Maps Linear's numeric priority (0 none, 1 urgent .. 4 low).
fn map_priority(raw: Option<f64>) -> Priority {
    #[allow(clippy::cast_possible_truncation)]
    let bucket = raw.unwrap_or(0.0).round() as i64;
    match bucket {
        1 => Priority::Urgent,
        2 => Priority::High,
        3 => Priority::Medium,
        4 => Priority::Low,
        _ => Priority::None,
    }
}

/// Translates a raw node into the normalized model.
fn normalize_issue(node: IssueNode) -> Result<NormalizedIssue, ProviderError> {
    let category = map_state_category(&node.state.state_type, &node.state.name)?;
    Ok(NormalizedIssue {
        id: node.id,
        identifier: node.identifier,
        title: node.title,
        description: node.description,
        priority: map_priority(node.priority),
        state: WorkflowState { id: node.state.id, name: node.state.name, category },
        labels: node.labels.nodes.into_iter().map(|label| label.name).collect(),
    })
}

/// Computes the post-swap label-id set for one atomic `issueUpdate`.
fn updated_label_ids(current: &[LabelNode], remove_name: &str, add_id: &str) -> Vec<String> {
    let mut ids: Vec<String> = current
        .iter()
        .filter(|label| label.name != remove_name)
        .map(|label| label.id.clone())
        .collect();
    if !ids.iter().any(|id| id == add_id) {
        ids.push(add_id.to_string());
    }
    ids
}

/// Classifies a GraphQL error message into the shared taxonomy.
fn classify_graphql_error(message: &str) -> ProviderError {
    let lowered = message.to_lowercase();
    if lowered.contains("authentication") || lowered.contains("not authorized") {
        ProviderError::Auth(format!("Linear: {message}"))
    } else if lowered.contains("not found") {
        ProviderError::NotFound(format!("Linear: {message}"))
    } else if lowered.contains("rate") && lowered.contains("limit") {
        ProviderError::RateLimited(format!("Linear: {message}"))
    } else {
        ProviderError::Validation(format!("Linear: {message}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_node() -> IssueNode {
        serde_json::from_value(json!({
            "id": "uuid-1",
            "identifier": "ENG-42",
            "title": "Fix flaky sync",
            "description": "Details",
            "priority": 2.0,
            "state": { "id": "st-1", "name": "Todo", "type": "unstarted" },
            "labels": { "nodes": [
                { "id": "lbl-1", "name": "automation-candidate" },
                { "id": "lbl-2", "name": "bug" }
            ] }
        }))
        .unwrap()
    }

    #[test]
    fn normalizes_full_issue_node() {
        let issue = normalize_issue(sample_node()).unwrap();
        assert_eq!(issue.identifier, "ENG-42");
        assert_eq!(issue.priority, Priority::High);
        assert_eq!(issue.state.category, StateCategory::Unstarted);
        assert!(issue.labels.contains("automation-candidate"));
        assert!(issue.labels.contains("bug"));
    }

    #[test]
    fn triage_maps_to_backlog() {
        assert_eq!(map_state_category("triage", "Triage").unwrap(), StateCategory::Backlog);
    }

    #[test]
    fn unknown_state_type_is_a_config_error() {
        let err = map_state_category("mystery", "Mystery").unwrap_err();
        assert!(matches!(err, ProviderError::Config(_)));
        assert!(err.to_string().contains("mystery"));
    }

    #[test]
    fn priority_scale_is_inverted_from_urgency() {
        assert_eq!(map_priority(Some(1.0)), Priority::Urgent);
        assert_eq!(map_priority(Some(4.0)), Priority::Low);
        assert_eq!(map_priority(Some(0.0)), Priority::None);
        assert_eq!(map_priority(None), Priority::None);
    }

    #[test]
    fn updated_label_ids_swaps_without_duplicates() {
        let current = vec![
            LabelNode { id: "lbl-1".into(), name: "automation-candidate".into() },
            LabelNode { id: "lbl-2".into(), name: "bug".into() },
        ];
        let ids = updated_label_ids(&current, "automation-candidate", "lbl-9");
        assert_eq!(ids, vec!["lbl-2".to_string(), "lbl-9".to_string()]);

        // Adding an id that is already present must not duplicate it.
        let ids = updated_label_ids(&current, "nothing", "lbl-2");
        assert_eq!(ids, vec!["lbl-1".to_string(), "lbl-2".to_string()]);
    }

    #[test]
    fn graphql_auth_errors_are_classified() {
        let err = classify_graphql_error("Authentication required, not authenticated");
        assert!(matches!(err, ProviderError::Auth(_)));
    }

    #[test]
    fn graphql_missing_entity_is_not_found() {
        let err = classify_graphql_error("Entity not found: Issue");
        assert!(matches!(err, ProviderError::NotFound(_)));
    }

    #[test]
    fn graphql_rate_limit_is_classified() {
        let err = classify_graphql_error("Rate limit exceeded");
        assert!(matches!(err, ProviderError::RateLimited(_)));
    }
}
