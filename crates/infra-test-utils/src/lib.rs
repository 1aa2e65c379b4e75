//! Shared test utilities for the infra-defaults workspace.
//!
//! This crate is a dev-dependency only and is never published.
//!
//! # Modules
//!
//! - [`context`] - context stores for a typical deployment
//! - [`project`] - [`TestProject`](project::TestProject) scratch directories
//!   holding context files and app definitions

pub mod context;
pub mod project;
