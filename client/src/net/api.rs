//! REST client for the Q&A backend.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`.
//! Server-side (SSR): every call returns `ApiError::Unavailable` since these
//! endpoints are only meaningful in the browser.
//!
//! ERROR HANDLING
//! ==============
//! Every backend response is a JSON envelope `{ success, error?, ... }`.
//! `decode_envelope` turns it into either the payload or an `ApiError`, so
//! callers can show business errors verbatim and degrade quietly on
//! transport failures. A 401 on a user-initiated request that carried a
//! token clears the session and sends the browser to `/login`; background
//! calls (heartbeat, roster) only report the error.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::{
    BugReport, Category, ChangelogEntry, ChatMessage, NewProblem, ProblemDetail, ProblemPage, RosterSnapshot, Session,
    Solution,
};
use crate::state::auth::AuthStore;
use crate::state::problems::{ProblemFilters, order_solutions};
use crate::state::vote::{VoteDirection, VoteTarget};

const NETWORK_FAILURE_MESSAGE: &str = "Network error. Please check your connection and try again.";

/// Failure of a REST call.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),
    /// The backend answered `success: false` with an error text.
    #[error("{0}")]
    Server(String),
    /// The session token was rejected.
    #[error("session expired")]
    Unauthorized,
    /// Non-success status without an error text.
    #[error("request failed with status {0}")]
    Status(u16),
    /// The body was not the JSON shape we expected.
    #[error("malformed response: {0}")]
    Decode(String),
    /// Called outside the browser.
    #[error("not available during server rendering")]
    Unavailable,
}

impl ApiError {
    /// Text suitable for showing next to the control that triggered the call.
    pub fn user_message(&self) -> String {
        match self {
            Self::Server(text) => text.clone(),
            Self::Network(_) | Self::Unavailable => NETWORK_FAILURE_MESSAGE.to_owned(),
            Self::Unauthorized => "Your session has expired. Please log in again.".to_owned(),
            Self::Status(status) => format!("Request failed ({status})."),
            Self::Decode(_) => "Unexpected response from the server.".to_owned(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Method {
    Get,
    Post,
}

/// Who asked for a request; decides how a rejected token is handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Trigger {
    /// A page load or a form the user submitted.
    User,
    /// Timer-driven upkeep the user never sees.
    Background,
}

/// Whether a response ends the session.
#[cfg(any(test, feature = "hydrate"))]
fn signs_out_on(status: u16, had_token: bool, trigger: Trigger) -> bool {
    status == 401 && had_token && trigger == Trigger::User
}

#[cfg(any(test, feature = "hydrate"))]
fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

fn chat_messages_endpoint(channel_id: &str) -> String {
    format!("/api/chat/messages/{channel_id}")
}

fn problem_endpoint(problem_id: i64) -> String {
    format!("/api/problems/{problem_id}")
}

fn solutions_endpoint(problem_id: i64) -> String {
    format!("/api/problems/{problem_id}/solutions")
}

fn vote_endpoint(target: VoteTarget) -> String {
    match target {
        VoteTarget::Problem(id) => format!("/api/problems/{id}/vote"),
        VoteTarget::Solution(id) => format!("/api/solutions/{id}/vote"),
    }
}

/// Unwrap the `{ success, error }` envelope.
pub(crate) fn decode_envelope(status: u16, body: &str) -> Result<Value, ApiError> {
    let ok_status = (200..300).contains(&status);
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) if ok_status => return Err(ApiError::Decode(e.to_string())),
        Err(_) if status == 401 => return Err(ApiError::Unauthorized),
        Err(_) => return Err(ApiError::Status(status)),
    };

    let success = value.get("success").and_then(Value::as_bool).unwrap_or(ok_status);
    if success && ok_status {
        return Ok(value);
    }
    if let Some(text) = value
        .get("error")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
    {
        return Err(ApiError::Server(text.to_owned()));
    }
    if status == 401 {
        return Err(ApiError::Unauthorized);
    }
    if ok_status {
        Err(ApiError::Server("The request was not successful.".to_owned()))
    } else {
        Err(ApiError::Status(status))
    }
}

/// Move `key` out of an envelope and deserialize it.
pub(crate) fn take_field<T: DeserializeOwned>(mut value: Value, key: &str) -> Result<T, ApiError> {
    let field = value
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| ApiError::Decode(format!("missing field `{key}`")))?;
    serde_json::from_value(field).map_err(|e| ApiError::Decode(e.to_string()))
}

fn decode_whole<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

pub(crate) fn decode_problem_page(value: Value) -> Result<ProblemPage, ApiError> {
    let total = value.get("total").and_then(Value::as_u64);
    let problems: Vec<super::types::Problem> = take_field(value, "problems")?;
    let total = total.unwrap_or(problems.len() as u64);
    Ok(ProblemPage { problems, total })
}

pub(crate) fn decode_problem_detail(mut value: Value) -> Result<ProblemDetail, ApiError> {
    let mut solutions: Vec<Solution> = match value.get_mut("solutions").map(Value::take) {
        Some(Value::Null) | None => Vec::new(),
        Some(raw) => serde_json::from_value(raw).map_err(|e| ApiError::Decode(e.to_string()))?,
    };
    let problem = take_field(value, "problem")?;
    order_solutions(&mut solutions);
    Ok(ProblemDetail { problem, solutions })
}

#[allow(clippy::cast_possible_truncation)]
pub(crate) fn decode_vote_count(value: &Value) -> Result<i64, ApiError> {
    ["votes", "likes"]
        .iter()
        .find_map(|key| value.get(*key))
        .and_then(|count| count.as_i64().or_else(|| count.as_f64().map(|f| f.round() as i64)))
        .ok_or_else(|| ApiError::Decode("missing vote count".to_owned()))
}

pub(crate) fn decode_changelog(value: Value) -> Result<Vec<ChangelogEntry>, ApiError> {
    let key = if value.get("entries").is_some() { "entries" } else { "changelog" };
    let mut entries: Vec<ChangelogEntry> = take_field(value, key)?;
    entries.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(entries)
}

pub(crate) fn decode_session(value: Value) -> Result<Session, ApiError> {
    decode_whole(value)
}

/// REST client bound to the app's auth store.
///
/// Constructed once in the root component and handed to consumers through
/// context; it holds no state of its own beyond the store handle.
#[derive(Clone, Copy)]
pub struct ApiClient {
    auth: AuthStore,
}

impl ApiClient {
    pub fn new(auth: AuthStore) -> Self {
        Self { auth }
    }

    pub fn auth(&self) -> AuthStore {
        self.auth
    }

    #[cfg(feature = "hydrate")]
    async fn call(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
        trigger: Trigger,
    ) -> Result<Value, ApiError> {
        use gloo_net::http::Request;

        let token = self.auth.token_untracked();
        let mut builder = match method {
            Method::Get => Request::get(path),
            Method::Post => Request::post(path),
        };
        if !query.is_empty() {
            builder = builder.query(query.iter().map(|(key, value)| (*key, value.as_str())));
        }
        if let Some(token) = token.as_deref() {
            builder = builder.header("Authorization", &bearer(token));
        }
        let sent = match body {
            Some(body) => {
                builder
                    .json(&body)
                    .map_err(|e| ApiError::Network(e.to_string()))?
                    .send()
                    .await
            }
            None => builder.send().await,
        };
        let resp = sent.map_err(|e| ApiError::Network(e.to_string()))?;
        let status = resp.status();
        if signs_out_on(status, token.is_some(), trigger) {
            self.handle_unauthorized();
            return Err(ApiError::Unauthorized);
        }
        if status == 401 && token.is_some() {
            leptos::logging::warn!("{path} rejected the session token");
        }
        let text = resp.text().await.map_err(|e| ApiError::Network(e.to_string()))?;
        decode_envelope(status, &text)
    }

    #[cfg(not(feature = "hydrate"))]
    async fn call(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
        trigger: Trigger,
    ) -> Result<Value, ApiError> {
        let _ = (method, path, query, body, trigger);
        Err(ApiError::Unavailable)
    }

    #[cfg(feature = "hydrate")]
    fn handle_unauthorized(&self) {
        leptos::logging::warn!("token rejected, signing out");
        self.auth.sign_out();
        if let Some(window) = web_sys::window() {
            let _ = window.location().set_href("/login");
        }
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        self.call(Method::Get, path, query, None, Trigger::User).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        self.call(Method::Post, path, &[], body, Trigger::User).await
    }

    /// `GET /api/chat/messages/:channel?limit=N`.
    pub async fn fetch_chat_messages(&self, channel_id: &str, limit: usize) -> Result<Vec<ChatMessage>, ApiError> {
        let value = self.get(&chat_messages_endpoint(channel_id), &[("limit", limit.to_string())]).await?;
        take_field(value, "messages")
    }

    /// `GET /api/chat/users/online`. A rejected token is reported, not acted on.
    pub async fn fetch_online_users(&self) -> Result<RosterSnapshot, ApiError> {
        let value = self.call(Method::Get, "/api/chat/users/online", &[], None, Trigger::Background).await?;
        decode_whole(value)
    }

    /// `POST /api/chat/message`; returns the stored message.
    pub async fn send_chat_message(&self, channel_id: &str, body: &str) -> Result<ChatMessage, ApiError> {
        let payload = serde_json::json!({ "channelId": channel_id, "message": body });
        let value = self.post("/api/chat/message", Some(payload)).await?;
        take_field(value, "message")
    }

    /// `POST /api/sessions/heartbeat`. A rejected token is reported, not acted on.
    pub async fn heartbeat(&self) -> Result<(), ApiError> {
        self.call(Method::Post, "/api/sessions/heartbeat", &[], None, Trigger::Background)
            .await
            .map(|_| ())
    }

    /// `GET /api/problems` with the filter's query parameters.
    pub async fn list_problems(&self, filters: &ProblemFilters) -> Result<ProblemPage, ApiError> {
        let value = self.get("/api/problems", &filters.query_pairs()).await?;
        decode_problem_page(value)
    }

    /// `GET /api/problems/:id`, solutions ordered for display.
    pub async fn fetch_problem(&self, problem_id: i64) -> Result<ProblemDetail, ApiError> {
        let value = self.get(&problem_endpoint(problem_id), &[]).await?;
        decode_problem_detail(value)
    }

    /// `POST /api/problems`.
    pub async fn create_problem(&self, problem: &NewProblem) -> Result<super::types::Problem, ApiError> {
        let payload = serde_json::to_value(problem).map_err(|e| ApiError::Decode(e.to_string()))?;
        let value = self.post("/api/problems", Some(payload)).await?;
        take_field(value, "problem")
    }

    /// `POST /api/problems/:id/solutions`.
    pub async fn post_solution(&self, problem_id: i64, body: &str) -> Result<Solution, ApiError> {
        let payload = serde_json::json!({ "content": body });
        let value = self.post(&solutions_endpoint(problem_id), Some(payload)).await?;
        take_field(value, "solution")
    }

    /// Vote on a problem or solution; returns the authoritative count.
    pub async fn vote(&self, target: VoteTarget, direction: VoteDirection) -> Result<i64, ApiError> {
        let payload = serde_json::json!({ "voteType": direction.as_str() });
        let value = self.post(&vote_endpoint(target), Some(payload)).await?;
        decode_vote_count(&value)
    }

    /// `GET /api/categories`.
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let value = self.get("/api/categories", &[]).await?;
        take_field(value, "categories")
    }

    /// `POST /api/bug-reports`.
    pub async fn submit_bug_report(&self, report: &BugReport) -> Result<(), ApiError> {
        let payload = serde_json::to_value(report).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.post("/api/bug-reports", Some(payload)).await.map(|_| ())
    }

    /// `GET /api/changelog`, newest release first.
    pub async fn fetch_changelog(&self) -> Result<Vec<ChangelogEntry>, ApiError> {
        let value = self.get("/api/changelog", &[]).await?;
        decode_changelog(value)
    }

    /// `POST /api/auth/login`.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        let payload = serde_json::json!({ "username": username, "password": password });
        let value = self.post("/api/auth/login", Some(payload)).await?;
        decode_session(value)
    }

    /// `POST /api/auth/register`.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<Session, ApiError> {
        let payload = serde_json::json!({ "username": username, "email": email, "password": password });
        let value = self.post("/api/auth/register", Some(payload)).await?;
        decode_session(value)
    }
}
