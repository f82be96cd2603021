//! Networking modules for the REST backend and the chat push stream.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` handles REST calls, `live` provides the chat live-update sources
//! (event stream and polling fallback), and `types` defines the wire schema.

pub mod api;
pub mod live;
pub mod types;
