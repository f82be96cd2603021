//! Client state modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! State structs are plain data shared through Leptos context as signals.
//! Anything with rules worth testing (chat reconciliation, vote rollback,
//! list filters, form validation) lives here rather than in components.

pub mod auth;
pub mod chat;
pub mod forms;
pub mod problems;
pub mod ui;
pub mod vote;
