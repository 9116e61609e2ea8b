//! Ticket provider port: the capability contract every backend implements.
//!
//! Abstracting the tracker behind one trait lets the rest of the workflow
//! run unchanged against Linear, Jira, GitHub Issues, or the in-memory
//! backend used in tests.

use std::future::Future;
use std::pin::Pin;

use crate::error::ProviderError;
use crate::model::{IssueFilter, NormalizedIssue, SwapResult};

/// Boxed future type alias used by [`TicketProvider`] to keep the trait
/// dyn-compatible.
pub type ProviderFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send + 'a>>;

/// Fixed capability set over a ticket-tracking backend.
///
/// Implementations own all transport details (REST vs. GraphQL, pagination,
/// response validation) and must never panic across this boundary — every
/// failure surfaces as a [`ProviderError`].
pub trait TicketProvider: Send + Sync {
    /// Fetches all issues carrying the given label within the filter's scope.
    ///
    /// A label with zero matches yields `Ok(vec![])`, never an error.
    /// `filter.project_id` narrows the result only on providers with project
    /// granularity; others ignore it silently.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] when the backend call fails.
    fn fetch_issues_by_label<'a>(
        &'a self,
        filter: &IssueFilter,
    ) -> ProviderFuture<'a, Vec<NormalizedIssue>>;

    /// Resolves a human-facing identifier (e.g. `PROJ-42`) to its issue.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotFound`] when the identifier does not
    /// resolve within the configured scope.
    fn fetch_issue_by_id<'a>(&'a self, identifier: &str) -> ProviderFuture<'a, NormalizedIssue>;

    /// Performs the transport step of a label swap: remove `remove_label`
    /// if the issue has it, add `add_label`.
    ///
    /// Whether this is one atomic update or two sequential calls is
    /// backend-specific. On total success the issue ends with `add_label`
    /// present; if a two-step update partially fails, the error detail must
    /// name which sub-step failed so the caller can re-verify and retry the
    /// remainder. No automatic rollback.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] when any part of the mutation fails.
    fn apply_label_swap<'a>(
        &'a self,
        issue: &NormalizedIssue,
        remove_label: &str,
        add_label: &str,
    ) -> ProviderFuture<'a, ()>;

    /// Swaps one label for another on the issue with the given identifier.
    ///
    /// The algorithm is provider-independent; only the mutation transport
    /// ([`TicketProvider::apply_label_swap`]) differs per backend:
    ///
    /// 1. Fetch the issue fresh so the label set reflects call time.
    /// 2. If `add_label` is already present, report
    ///    `already_had_target = true` and write nothing — repeated
    ///    invocations and retries are idempotent.
    /// 3. Otherwise remove `remove_label` if present and add `add_label`
    ///    unconditionally.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] when the fetch or the mutation fails.
    fn swap_labels<'a>(
        &'a self,
        identifier: &str,
        remove_label: &str,
        add_label: &str,
    ) -> ProviderFuture<'a, SwapResult> {
        let identifier = identifier.to_owned();
        let remove = remove_label.to_owned();
        let add = add_label.to_owned();

        Box::pin(async move {
            let issue = self.fetch_issue_by_id(&identifier).await?;

            if issue.labels.contains(&add) {
                return Ok(SwapResult { removed: None, added: None, already_had_target: true });
            }

            let removed = issue.labels.contains(&remove).then(|| remove.clone());
            self.apply_label_swap(&issue, &remove, &add).await?;

            Ok(SwapResult { removed, added: Some(add), already_had_target: false })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryProvider;
    use crate::model::{Priority, StateCategory};

    fn issue(identifier: &str, labels: &[&str]) -> NormalizedIssue {
        NormalizedIssue {
            id: format!("uuid-{identifier}"),
            identifier: identifier.to_string(),
            title: format!("Issue {identifier}"),
            description: None,
            priority: Priority::Medium,
            state: crate::model::WorkflowState {
                id: "st-1".into(),
                name: "Todo".into(),
                category: StateCategory::Unstarted,
            },
            labels: labels.iter().map(ToString::to_string).collect(),
        }
    }

    #[tokio::test]
    async fn swap_moves_candidate_to_ready() {
        let provider = MemoryProvider::new(vec![issue("PROJ-1", &["candidate"])]);
        let result = provider.swap_labels("PROJ-1", "candidate", "ready").await.unwrap();
        assert_eq!(
            result,
            SwapResult {
                removed: Some("candidate".into()),
                added: Some("ready".into()),
                already_had_target: false,
            }
        );

        let after = provider.fetch_issue_by_id("PROJ-1").await.unwrap();
        assert!(after.labels.contains("ready"));
        assert!(!after.labels.contains("candidate"));
    }

    #[tokio::test]
    async fn second_swap_is_idempotent() {
        let provider = MemoryProvider::new(vec![issue("PROJ-1", &["candidate"])]);
        provider.swap_labels("PROJ-1", "candidate", "ready").await.unwrap();

        let second = provider.swap_labels("PROJ-1", "candidate", "ready").await.unwrap();
        assert_eq!(
            second,
            SwapResult { removed: None, added: None, already_had_target: true }
        );
        assert_eq!(provider.mutation_count(), 1, "idempotent swap must not write");
    }

    #[tokio::test]
    async fn swap_adds_even_when_source_label_absent() {
        let provider = MemoryProvider::new(vec![issue("PROJ-2", &["bug"])]);
        let result = provider.swap_labels("PROJ-2", "candidate", "ready").await.unwrap();
        assert_eq!(result.removed, None);
        assert_eq!(result.added, Some("ready".into()));
        assert!(!result.already_had_target);

        let after = provider.fetch_issue_by_id("PROJ-2").await.unwrap();
        assert!(after.labels.contains("ready"));
        assert!(after.labels.contains("bug"));
    }

    #[tokio::test]
    async fn swap_on_unknown_identifier_reports_not_found() {
        let provider = MemoryProvider::new(vec![]);
        let err = provider.swap_labels("NOPE-1", "candidate", "ready").await.unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
    }
}
