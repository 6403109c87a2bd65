//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod action_service;
pub mod automation_service;
pub mod rule_service;

#[cfg(test)]
pub(crate) mod testing;
