//! Resource wrappers
//!
//! Each module exposes a `create` function that merges the caller's
//! properties over organisation defaults, adds the resource to a
//! [`Stack`](crate::Stack), and attaches whatever alarms and policies the
//! resource kind gets.

pub mod bucket;
pub mod dead_letter_queue;
pub mod function;
pub mod nodejs_function;
pub mod queue;
pub mod state_machine;
pub mod table;
