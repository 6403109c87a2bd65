//! # octoflow-adapter-github-octocrab
//!
//! GitHub adapter using [octocrab](https://docs.rs/octocrab).
//!
//! ## Responsibilities
//! - Implement the `GitHubClient` port defined in `octoflow-app::ports`
//! - Build issue and pull request snapshots from the REST API
//! - Run the GraphQL mutations that have no REST equivalent (draft toggling)
//! - Map octocrab errors to the domain `GitHubError`, keeping the HTTP status
//!
//! ## Dependency rule
//! Depends on `octoflow-app` (for port traits) and `octoflow-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod client;
mod error;
mod wire;

pub use client::{Config, OctocrabGitHubClient};
