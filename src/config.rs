//! Provider selection and workflow configuration.
//!
//! The core modules consume an already-resolved [`ProviderConfig`]; only the
//! loading glue in this module touches the filesystem and the environment.
//! Non-secret scoping lives in `labelflow.yaml`; credentials come from the
//! environment and are never written to logs or `Debug` output.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::model::LabelConfig;

/// Resolved configuration for one tracker backend.
///
/// A tagged union: the factory matches exhaustively on the variant, so an
/// unknown provider cannot reach runtime.
#[derive(Clone)]
pub enum ProviderConfig {
    /// Linear (GraphQL), scoped to one team with an optional project filter.
    Linear {
        /// Personal or OAuth API key.
        api_key: String,
        /// Team to operate within.
        team_id: String,
        /// Optional project narrowing inside the team.
        project_id: Option<String>,
    },
    /// Jira (REST v2), scoped to one project.
    Jira {
        /// Base URL of the Jira site (e.g. `https://acme.atlassian.net`).
        base_url: String,
        /// Account email for basic auth.
        email: String,
        /// API token paired with the email.
        api_token: String,
        /// Project key (e.g. `PROJ`).
        project_key: String,
    },
    /// GitHub Issues (REST v3), scoped to one repository.
    Github {
        /// Token with `repo` scope.
        token: String,
        /// Repository owner.
        owner: String,
        /// Repository name.
        repo: String,
    },
    /// In-memory backend with no remote side, for tests and offline dry runs.
    Memory,
}

// Credentials must never leak through Debug formatting.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear { team_id, project_id, .. } => f
                .debug_struct("Linear")
                .field("api_key", &"<redacted>")
                .field("team_id", team_id)
                .field("project_id", project_id)
                .finish(),
            Self::Jira { base_url, email, project_key, .. } => f
                .debug_struct("Jira")
                .field("base_url", base_url)
                .field("email", email)
                .field("api_token", &"<redacted>")
                .field("project_key", project_key)
                .finish(),
            Self::Github { owner, repo, .. } => f
                .debug_struct("Github")
                .field("token", &"<redacted>")
                .field("owner", owner)
                .field("repo", repo)
                .finish(),
            Self::Memory => f.debug_struct("Memory").finish(),
        }
    }
}

/// The team/project scope pair derived from a provider config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeIds {
    /// Scoping axis every provider has.
    pub team_id: String,
    /// Project narrowing, for providers that distinguish it from the team.
    pub project_id: Option<String>,
}

/// Derives the team/project scope from a provider config.
///
/// Providers disagree on whether "project" and "team" are the same axis:
/// Jira is project-scoped, so its team id is synthesized from the project
/// key and the same value is surfaced again as the project id; Linear keeps
/// the two distinct; GitHub's repository is its team axis. Centralizing the
/// mapping here keeps call sites from re-deriving it inconsistently.
#[must_use]
pub fn extract_team_and_project_ids(config: &ProviderConfig) -> ScopeIds {
    match config {
        ProviderConfig::Linear { team_id, project_id, .. } => {
            ScopeIds { team_id: team_id.clone(), project_id: project_id.clone() }
        }
        ProviderConfig::Jira { project_key, .. } => {
            ScopeIds { team_id: project_key.clone(), project_id: Some(project_key.clone()) }
        }
        ProviderConfig::Github { owner, repo, .. } => {
            ScopeIds { team_id: format!("{owner}/{repo}"), project_id: None }
        }
        ProviderConfig::Memory => ScopeIds { team_id: "memory".into(), project_id: None },
    }
}

/// Fully loaded settings: one provider plus the promotion label pair.
#[derive(Debug, Clone)]
pub struct Settings {
    /// The selected backend.
    pub provider: ProviderConfig,
    /// Candidate/ready label names.
    pub labels: LabelConfig,
}

/// Which backend a config file selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ProviderKind {
    Linear,
    Jira,
    Github,
    Memory,
}

/// On-disk shape of `labelflow.yaml`. Secrets are deliberately absent.
#[derive(Debug, Deserialize)]
struct FileConfig {
    provider: ProviderKind,
    #[serde(default)]
    labels: Option<LabelConfig>,
    #[serde(default)]
    linear: Option<LinearSection>,
    #[serde(default)]
    jira: Option<JiraSection>,
    #[serde(default)]
    github: Option<GithubSection>,
}

#[derive(Debug, Deserialize)]
struct LinearSection {
    team_id: String,
    #[serde(default)]
    project_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JiraSection {
    base_url: String,
    email: String,
    project_key: String,
}

#[derive(Debug, Deserialize)]
struct GithubSection {
    /// `owner/repo` slug.
    repository: String,
}

/// Loads settings from a config file, resolving secrets from the
/// environment.
///
/// # Errors
///
/// Returns an error string when the file is missing or malformed, when the
/// selected provider's section is absent, or when its secret env var is not
/// set.
pub fn load(path: &Path) -> Result<Settings, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;
    let file: FileConfig = serde_yaml::from_str(&content)
        .map_err(|e| format!("Failed to parse config file {}: {e}", path.display()))?;

    let provider = match file.provider {
        ProviderKind::Linear => {
            let section =
                file.linear.ok_or("Config selects provider 'linear' but has no linear: section")?;
            ProviderConfig::Linear {
                api_key: secret("LINEAR_API_KEY")?,
                team_id: section.team_id,
                project_id: section.project_id,
            }
        }
        ProviderKind::Jira => {
            let section =
                file.jira.ok_or("Config selects provider 'jira' but has no jira: section")?;
            ProviderConfig::Jira {
                base_url: section.base_url.trim_end_matches('/').to_string(),
                email: section.email,
                api_token: secret("JIRA_API_TOKEN")?,
                project_key: section.project_key,
            }
        }
        ProviderKind::Github => {
            let section =
                file.github.ok_or("Config selects provider 'github' but has no github: section")?;
            let (owner, repo) = split_repository(&section.repository)?;
            ProviderConfig::Github { token: secret("GITHUB_TOKEN")?, owner, repo }
        }
        ProviderKind::Memory => ProviderConfig::Memory,
    };

    Ok(Settings { provider, labels: file.labels.unwrap_or_default() })
}

/// Resolves the config file path: `LABELFLOW_CONFIG` or `./labelflow.yaml`.
#[must_use]
pub fn default_path() -> std::path::PathBuf {
    std::env::var("LABELFLOW_CONFIG")
        .map_or_else(|_| std::path::PathBuf::from("labelflow.yaml"), std::path::PathBuf::from)
}

fn secret(var: &str) -> Result<String, String> {
    std::env::var(var).map_err(|_| format!("{var} environment variable not set"))
}

fn split_repository(slug: &str) -> Result<(String, String), String> {
    match slug.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(format!("Invalid repository '{slug}': expected owner/repo")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn team_scoped_config_passes_ids_through() {
        let config = ProviderConfig::Linear {
            api_key: "k".into(),
            team_id: "T1".into(),
            project_id: None,
        };
        let scope = extract_team_and_project_ids(&config);
        assert_eq!(scope, ScopeIds { team_id: "T1".into(), project_id: None });
    }

    #[test]
    fn project_scoped_config_surfaces_project_as_both_axes() {
        let config = ProviderConfig::Jira {
            base_url: "https://acme.atlassian.net".into(),
            email: "a@b.c".into(),
            api_token: "t".into(),
            project_key: "P1".into(),
        };
        let scope = extract_team_and_project_ids(&config);
        assert_eq!(scope, ScopeIds { team_id: "P1".into(), project_id: Some("P1".into()) });
    }

    #[test]
    fn repo_scoped_config_uses_slug_as_team_axis() {
        let config = ProviderConfig::Github {
            token: "t".into(),
            owner: "acme".into(),
            repo: "widgets".into(),
        };
        let scope = extract_team_and_project_ids(&config);
        assert_eq!(scope, ScopeIds { team_id: "acme/widgets".into(), project_id: None });
    }

    #[test]
    fn linear_project_id_is_preserved_when_set() {
        let config = ProviderConfig::Linear {
            api_key: "k".into(),
            team_id: "T1".into(),
            project_id: Some("PROJ-UUID".into()),
        };
        let scope = extract_team_and_project_ids(&config);
        assert_eq!(scope.project_id, Some("PROJ-UUID".into()));
    }

    #[test]
    fn debug_output_redacts_credentials() {
        let config = ProviderConfig::Jira {
            base_url: "https://acme.atlassian.net".into(),
            email: "a@b.c".into(),
            api_token: "super-secret".into(),
            project_key: "P1".into(),
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn load_memory_provider_with_default_labels() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "provider: memory").unwrap();
        let settings = load(file.path()).unwrap();
        assert!(matches!(settings.provider, ProviderConfig::Memory));
        assert_eq!(settings.labels.candidate, "automation-candidate");
    }

    #[test]
    fn load_reads_custom_labels() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "provider: memory\nlabels:\n  candidate: propose\n  ready: go").unwrap();
        let settings = load(file.path()).unwrap();
        assert_eq!(settings.labels.candidate, "propose");
        assert_eq!(settings.labels.ready, "go");
    }

    #[test]
    fn load_rejects_missing_provider_section() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "provider: jira").unwrap();
        let err = load(file.path()).unwrap_err();
        assert!(err.contains("jira: section"));
    }

    #[test]
    fn load_rejects_missing_file() {
        let err = load(Path::new("/nonexistent/labelflow.yaml")).unwrap_err();
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn split_repository_rejects_bare_name() {
        assert!(split_repository("widgets").is_err());
        assert!(split_repository("/widgets").is_err());
        assert!(split_repository("acme/").is_err());
    }
}
