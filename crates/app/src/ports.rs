//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod event_bus;
pub mod github;
pub mod rule_repo;

pub use event_bus::{RuleChange, RuleEventPublisher};
pub use github::{GitHubClient, IssueRef};
pub use rule_repo::RuleRepository;
