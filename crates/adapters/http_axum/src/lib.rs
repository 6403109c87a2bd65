//! # octoflow-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON API** for managing automation rules
//!   (`/api/rules`, `/api/templates`, import and export)
//! - Trigger rule runs against an issue or pull request
//!   (`/api/repos/{owner}/{repo}/issues/{number}/run`, …)
//! - Stream rule-list changes to connected clients over **SSE**
//! - Map application errors into HTTP status codes
//!
//! ## Dependency rule
//! Depends on `octoflow-app` (for port traits and services) and
//! `octoflow-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
