//! Provider-independent ticket service and the factory that builds it.

use crate::adapters::{GithubProvider, JiraProvider, LinearProvider, MemoryProvider};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::model::{IssueFilter, NormalizedIssue, SwapResult};
use crate::provider::TicketProvider;

/// Provider-independent façade over one ticket backend.
///
/// Owns its adapter instance outright; there is no process-wide client
/// state, so concurrent invocations of the CLI cannot interfere.
pub struct TicketService {
    provider: Box<dyn TicketProvider>,
}

impl TicketService {
    /// Wraps an already-constructed adapter.
    #[must_use]
    pub fn new(provider: Box<dyn TicketProvider>) -> Self {
        Self { provider }
    }

    /// Fetches all issues carrying the given label within the filter scope.
    ///
    /// # Errors
    ///
    /// Passes the adapter's [`ProviderError`] through unchanged.
    pub async fn fetch_issues_by_label(
        &self,
        filter: &IssueFilter,
    ) -> Result<Vec<NormalizedIssue>, ProviderError> {
        self.provider.fetch_issues_by_label(filter).await
    }

    /// Swaps one label for another on the identified issue.
    ///
    /// Idempotent: when the target label is already present the call reports
    /// `already_had_target` without writing anything.
    ///
    /// # Errors
    ///
    /// Passes the adapter's [`ProviderError`] through unchanged.
    pub async fn swap_labels(
        &self,
        identifier: &str,
        remove_label: &str,
        add_label: &str,
    ) -> Result<SwapResult, ProviderError> {
        self.provider.swap_labels(identifier, remove_label, add_label).await
    }

    /// Resolves a human-facing identifier to its normalized issue.
    ///
    /// # Errors
    ///
    /// Passes the adapter's [`ProviderError`] through unchanged, including
    /// [`ProviderError::NotFound`] for unknown identifiers.
    pub async fn fetch_issue_by_id(
        &self,
        identifier: &str,
    ) -> Result<NormalizedIssue, ProviderError> {
        self.provider.fetch_issue_by_id(identifier).await
    }
}

/// Builds the ticket service for the configured backend.
///
/// The match is exhaustive over the config's variants, so an unknown
/// provider cannot reach runtime — adding a variant without wiring an
/// adapter here is a compile error, not a deferred failure.
#[must_use]
pub fn create_ticket_service(config: ProviderConfig) -> TicketService {
    let provider: Box<dyn TicketProvider> = match config {
        ProviderConfig::Linear { api_key, team_id, .. } => {
            Box::new(LinearProvider::new(api_key, team_id))
        }
        ProviderConfig::Jira { base_url, email, api_token, project_key } => {
            Box::new(JiraProvider::new(base_url, email, api_token, project_key))
        }
        ProviderConfig::Github { token, owner, repo } => {
            Box::new(GithubProvider::new(token, owner, repo))
        }
        ProviderConfig::Memory => Box::new(MemoryProvider::new(Vec::new())),
    };
    TicketService::new(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, StateCategory, WorkflowState};

    fn issue(identifier: &str, labels: &[&str]) -> NormalizedIssue {
        NormalizedIssue {
            id: format!("uuid-{identifier}"),
            identifier: identifier.to_string(),
            title: format!("Issue {identifier}"),
            description: None,
            priority: Priority::High,
            state: WorkflowState {
                id: "st-1".into(),
                name: "Todo".into(),
                category: StateCategory::Unstarted,
            },
            labels: labels.iter().map(ToString::to_string).collect(),
        }
    }

    fn service_with(issues: Vec<NormalizedIssue>) -> TicketService {
        TicketService::new(Box::new(MemoryProvider::new(issues)))
    }

    fn filter(label: &str) -> IssueFilter {
        IssueFilter { team_id: "T1".into(), label_name: label.into(), project_id: None }
    }

    #[tokio::test]
    async fn fetch_with_no_matches_is_empty_success() {
        let service = service_with(vec![issue("S-1", &["bug"])]);
        let found = service.fetch_issues_by_label(&filter("automation-candidate")).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn swap_outcome_has_the_promotion_shape() {
        let service = service_with(vec![issue("S-1", &["automation-candidate"])]);
        let result =
            service.swap_labels("S-1", "automation-candidate", "automation-ready").await.unwrap();
        assert_eq!(result.removed, Some("automation-candidate".into()));
        assert_eq!(result.added, Some("automation-ready".into()));
        assert!(!result.already_had_target);
    }

    #[tokio::test]
    async fn adapter_errors_pass_through_unchanged() {
        let service = service_with(vec![]);
        let err = service.fetch_issue_by_id("NOPE-1").await.unwrap_err();
        assert_eq!(err, ProviderError::NotFound("issue 'NOPE-1'".into()));
    }

    #[tokio::test]
    async fn factory_builds_a_working_memory_service() {
        let service = create_ticket_service(ProviderConfig::Memory);
        let found = service.fetch_issues_by_label(&filter("anything")).await.unwrap();
        assert!(found.is_empty());
    }
}
