//! AI Hangout web client.
//!
//! ARCHITECTURE
//! ============
//! - `net`: REST client, wire types, and live chat transports.
//! - `state`: plain state machines (chat, votes, problems, auth, forms).
//! - `components` / `pages`: Leptos views wiring state to signals.
//! - `util`: browser helpers (storage, theme, formatting).
//!
//! Browser-only code sits behind the `hydrate` feature; the `ssr` build
//! renders the same views on the host.

pub mod app;
pub mod components;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    leptos::mount::hydrate_body(app::App);
}
