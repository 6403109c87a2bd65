//! # octoflow-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `RuleRepository`: load and save the whole rule list
//!   - `GitHubClient`: read issues/pull requests and mutate them
//!   - `RuleEventPublisher`: announce committed rule changes
//! - Define **driving/inbound ports** as use-case structs:
//!   - `RuleService`: CRUD, templates, import/export
//!   - `RuleActionService`: execute a single action against GitHub
//!   - `AutomationService`: match rules against a resource and run their actions
//! - Provide **in-process infrastructure** (rule-change bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `octoflow-domain` only (plus `tokio::sync` for channels and locks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod ports;
pub mod services;
