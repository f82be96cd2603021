//! Shared host state.
//!
//! `HostState` is injected into Axum handlers via the `State` extractor. It
//! holds the upstream HTTP client and the backend origin.

use crate::config::HostConfig;

#[derive(Clone)]
pub struct HostState {
    pub http: reqwest::Client,
    pub backend_url: String,
}

impl HostState {
    /// Build the shared client. Only connects are time-boxed; redirects are
    /// handed back to the browser untouched.
    pub fn new(config: &HostConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { http, backend_url: config.backend_url.clone() })
    }
}
