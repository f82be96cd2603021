//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration and delegates rendering details
//! to `components`.

pub mod ask;
pub mod bug_report;
pub mod categories;
pub mod changelog;
pub mod login;
pub mod problem;
pub mod problems;
