//! Command dispatch and handlers.

pub mod list;
pub mod promote;
pub mod show;

use crate::cli::Command;
use crate::config::{self, ScopeIds};
use crate::model::LabelConfig;
use crate::service::{create_ticket_service, TicketService};

/// Everything a command handler needs: the bound service plus the resolved
/// scope and label pair.
pub struct CommandContext {
    /// Service bound to the configured backend.
    pub service: TicketService,
    /// Team/project scope derived from the provider config.
    pub scope: ScopeIds,
    /// Candidate/ready label names.
    pub labels: LabelConfig,
}

impl CommandContext {
    /// Loads configuration and builds the context for one invocation.
    ///
    /// Each invocation owns its own adapter instance; nothing is shared
    /// across processes or commands.
    ///
    /// # Errors
    ///
    /// Returns an error string when the config file cannot be loaded.
    pub fn from_config() -> Result<Self, String> {
        let settings = config::load(&config::default_path())?;
        let scope = config::extract_team_and_project_ids(&settings.provider);
        let labels = settings.labels;
        let service = create_ticket_service(settings.provider);
        Ok(Self { service, scope, labels })
    }
}

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if configuration loading or the selected command
/// handler fails.
pub async fn dispatch(command: &Command) -> Result<(), String> {
    let ctx = CommandContext::from_config()?;
    match command {
        Command::List { all } => list::run(&ctx, *all).await,
        Command::Promote { identifiers, dry_run } => {
            promote::run(&ctx, identifiers, *dry_run).await
        }
        Command::Show { identifier } => show::run(&ctx, identifier).await,
    }
}
