//! # octoflow-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `RuleRepository` port defined in `octoflow-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Keep the rule list as one JSON document in a key/value table
//!
//! ## Dependency rule
//! Depends on `octoflow-app` (for port traits) and `octoflow-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod pool;
pub mod rule_repo;

pub use pool::{Config, Database};
pub use rule_repo::{RULES_KEY, SqliteRuleRepository};
