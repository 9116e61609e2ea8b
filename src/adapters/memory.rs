//! In-memory adapter for the `TicketProvider` port.
//!
//! Serves deterministic issue data without a network, so the whole workflow
//! stack can run in tests and offline dry runs. Supports injecting a swap
//! failure for one identifier to exercise partial-failure handling in
//! batches.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::ProviderError;
use crate::model::{IssueFilter, NormalizedIssue};
use crate::provider::{ProviderFuture, TicketProvider};

/// In-memory ticket provider backed by a plain issue list.
pub struct MemoryProvider {
    issues: Mutex<Vec<NormalizedIssue>>,
    mutations: AtomicUsize,
    fail_swap_for: Option<String>,
}

impl MemoryProvider {
    /// Creates a provider serving the given issues.
    #[must_use]
    pub fn new(issues: Vec<NormalizedIssue>) -> Self {
        Self { issues: Mutex::new(issues), mutations: AtomicUsize::new(0), fail_swap_for: None }
    }

    /// Creates a provider whose label mutations fail for one identifier.
    #[must_use]
    pub fn failing_swap_for(issues: Vec<NormalizedIssue>, identifier: &str) -> Self {
        Self {
            issues: Mutex::new(issues),
            mutations: AtomicUsize::new(0),
            fail_swap_for: Some(identifier.to_string()),
        }
    }

    /// Number of label mutations performed so far.
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<NormalizedIssue>> {
        // Mutex poisoning cannot happen here: no holder panics.
        match self.issues.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl TicketProvider for MemoryProvider {
    fn fetch_issues_by_label<'a>(
        &'a self,
        filter: &IssueFilter,
    ) -> ProviderFuture<'a, Vec<NormalizedIssue>> {
        let label = filter.label_name.clone();
        Box::pin(async move {
            let issues = self.lock();
            Ok(issues.iter().filter(|issue| issue.labels.contains(&label)).cloned().collect())
        })
    }

    fn fetch_issue_by_id<'a>(&'a self, identifier: &str) -> ProviderFuture<'a, NormalizedIssue> {
        let identifier = identifier.to_owned();
        Box::pin(async move {
            let issues = self.lock();
            issues
                .iter()
                .find(|issue| issue.identifier == identifier)
                .cloned()
                .ok_or_else(|| ProviderError::NotFound(format!("issue '{identifier}'")))
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
            if self.fail_swap_for.as_deref() == Some(identifier.as_str()) {
                return Err(ProviderError::Network(format!(
                    "injected failure updating labels on '{identifier}'"
                )));
            }

            let mut issues = self.lock();
            let stored = issues
                .iter_mut()
                .find(|candidate| candidate.identifier == identifier)
                .ok_or_else(|| ProviderError::NotFound(format!("issue '{identifier}'")))?;

            stored.labels.remove(&remove);
            stored.labels.insert(add);
            self.mutations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
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
            priority: Priority::Low,
            state: WorkflowState {
                id: "st-1".into(),
                name: "Backlog".into(),
                category: StateCategory::Backlog,
            },
            labels: labels.iter().map(ToString::to_string).collect(),
        }
    }

    fn filter(label: &str) -> IssueFilter {
        IssueFilter { team_id: "memory".into(), label_name: label.into(), project_id: None }
    }

    #[tokio::test]
    async fn fetch_by_label_matches_exactly() {
        let provider = MemoryProvider::new(vec![
            issue("M-1", &["candidate"]),
            issue("M-2", &["Candidate"]),
            issue("M-3", &["candidate", "bug"]),
        ]);
        let found = provider.fetch_issues_by_label(&filter("candidate")).await.unwrap();
        let ids: Vec<&str> = found.iter().map(|i| i.identifier.as_str()).collect();
        assert_eq!(ids, vec!["M-1", "M-3"], "label comparison is case-sensitive");
    }

    #[tokio::test]
    async fn fetch_by_label_with_no_matches_is_empty_not_error() {
        let provider = MemoryProvider::new(vec![issue("M-1", &["bug"])]);
        let found = provider.fetch_issues_by_label(&filter("candidate")).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn fetch_by_id_on_empty_scope_is_not_found() {
        let provider = MemoryProvider::new(vec![]);
        let err = provider.fetch_issue_by_id("NOPE-1").await.unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
    }

    #[tokio::test]
    async fn injected_failure_leaves_labels_untouched() {
        let provider =
            MemoryProvider::failing_swap_for(vec![issue("M-1", &["candidate"])], "M-1");
        let err = provider.swap_labels("M-1", "candidate", "ready").await.unwrap_err();
        assert!(matches!(err, ProviderError::Network(_)));

        let after = provider.fetch_issue_by_id("M-1").await.unwrap();
        assert!(after.labels.contains("candidate"));
        assert_eq!(provider.mutation_count(), 0);
    }
}
