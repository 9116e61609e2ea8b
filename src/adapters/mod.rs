//! Backend adapters implementing the [`TicketProvider`](crate::provider::TicketProvider) port.

pub mod github;
pub mod jira;
pub mod linear;
pub mod memory;

pub use github::GithubProvider;
pub use jira::JiraProvider;
pub use linear::LinearProvider;
pub use memory::MemoryProvider;
