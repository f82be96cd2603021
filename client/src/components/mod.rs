//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components render shell chrome and shared widgets while reading/writing
//! shared state from Leptos context providers.

pub mod chat_pane;
pub mod nav_bar;
pub mod problem_card;
pub mod vote_control;
