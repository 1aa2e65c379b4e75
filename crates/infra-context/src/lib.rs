//! Synthesis-time context for infra-defaults
//!
//! This crate owns the read-only configuration that every resource wrapper
//! consults while a stack is synthesised:
//!
//! - **Context store**: an immutable hierarchical map loaded once per run
//! - **Resolver**: path lookup with a caller-chosen delimiter for the
//!   top-level split and a fixed `.` for everything below it
//! - **Merge engine**: shallow (override wins per key) and deep merges over
//!   `serde_json` objects
//! - **Loader**: layered context files plus explicit `KEY=VALUE` overrides
//!
//! # Example
//!
//! ```
//! use infra_context::ContextStore;
//! use serde_json::json;
//!
//! let store = ContextStore::from_value(json!({
//!     "CUSTOMER": "acme",
//!     "acme": { "prod": { "logLevel": "info" } }
//! })).unwrap();
//!
//! assert_eq!(store.resolve_str("acme.prod.logLevel"), Some("info"));
//! assert_eq!(store.resolve("acme.dev.logLevel"), None);
//! ```

pub mod error;
pub mod loader;
pub mod merge;
pub mod resolver;
pub mod store;

pub use error::{Error, Result};
pub use loader::{ContextLoader, ContextOverride};
pub use merge::{deep_merge, shallow_merge};
pub use resolver::resolve;
pub use store::ContextStore;
