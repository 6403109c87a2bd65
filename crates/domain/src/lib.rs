//! # octoflow-domain
//!
//! Pure domain model for the octoflow rule automation engine.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Resources** (issue and pull request snapshots fetched from GitHub)
//! - Define **Automation rules** (condition tree → ordered actions)
//! - Evaluate condition trees against a resource (**matching**)
//! - Describe the outcome of running a rule (**execution** results)
//! - Ship a handful of built-in rule **templates**
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod execution;
pub mod matching;
pub mod resource;
pub mod rule;
pub mod template;
