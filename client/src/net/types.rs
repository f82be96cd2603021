//! Wire DTOs for the REST backend and the chat push stream.
//!
//! DESIGN
//! ======
//! Field names follow the backend's JSON (snake_case, with a few camelCase
//! aliases the auth endpoints use). Numeric fields go through tolerant
//! deserializers because the backend emits integer columns as floats in
//! some responses.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::state::vote::VoteDirection;

/// A single chat message. Immutable once created by the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Server-assigned identifier, increasing in creation order.
    #[serde(deserialize_with = "deserialize_i64_from_number")]
    pub id: i64,
    /// Message text.
    #[serde(rename = "message", alias = "content")]
    pub body: String,
    /// Message kind (`"text"` unless the server says otherwise).
    #[serde(rename = "message_type", alias = "messageType", default = "default_message_kind")]
    pub kind: String,
    /// Creation timestamp as sent by the server (ISO 8601 / SQL datetime).
    #[serde(alias = "createdAt", default)]
    pub created_at: String,
    /// Author username.
    pub username: String,
    /// Author agent tag; `None` means a human author.
    #[serde(alias = "agentType", default)]
    pub agent_type: Option<String>,
    /// Author reputation at send time.
    #[serde(default, deserialize_with = "deserialize_u32_from_number")]
    pub reputation: u32,
}

fn default_message_kind() -> String {
    "text".to_owned()
}

impl ChatMessage {
    /// Ordering key. Server ids increase in creation order, and unlike
    /// `created_at` they do not depend on the timestamp format.
    pub fn sort_key(&self) -> i64 {
        self.id
    }
}

/// A user recently seen in chat. Only the username is used for identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineUser {
    pub username: String,
    #[serde(alias = "agentType", default)]
    pub agent_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_u32_from_number")]
    pub reputation: u32,
}

/// Response of `GET /api/chat/users/online`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    #[serde(default, deserialize_with = "deserialize_u32_from_number")]
    pub online_count: u32,
    #[serde(default)]
    pub recent_users: Vec<OnlineUser>,
}

/// The signed-in user as returned by the auth endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub username: String,
    #[serde(default, deserialize_with = "deserialize_u32_from_number")]
    pub reputation: u32,
    #[serde(alias = "agentType", default)]
    pub agent_type: Option<String>,
}

/// Token + user pair persisted between visits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: AuthUser,
}

/// A question posted to the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(deserialize_with = "deserialize_i64_from_number")]
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(alias = "agentType", default)]
    pub agent_type: Option<String>,
    #[serde(alias = "likes", default, deserialize_with = "deserialize_i64_from_number")]
    pub votes: i64,
    #[serde(alias = "solutionCount", default, deserialize_with = "deserialize_i64_from_number")]
    pub solution_count: i64,
    #[serde(alias = "solved", alias = "isSolved", default)]
    pub is_solved: bool,
    #[serde(alias = "createdAt", default)]
    pub created_at: String,
    /// The signed-in user's current vote, when the backend reports it.
    #[serde(alias = "userVote", default, deserialize_with = "deserialize_optional_vote")]
    pub user_vote: Option<VoteDirection>,
}

/// An answer to a problem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    #[serde(deserialize_with = "deserialize_i64_from_number")]
    pub id: i64,
    #[serde(alias = "problemId", default, deserialize_with = "deserialize_i64_from_number")]
    pub problem_id: i64,
    #[serde(rename = "content", alias = "body")]
    pub body: String,
    #[serde(default)]
    pub username: String,
    #[serde(alias = "agentType", default)]
    pub agent_type: Option<String>,
    #[serde(alias = "likes", default, deserialize_with = "deserialize_i64_from_number")]
    pub votes: i64,
    #[serde(alias = "accepted", alias = "isAccepted", default)]
    pub is_accepted: bool,
    #[serde(alias = "createdAt", default)]
    pub created_at: String,
    #[serde(alias = "userVote", default, deserialize_with = "deserialize_optional_vote")]
    pub user_vote: Option<VoteDirection>,
}

/// One page of `GET /api/problems`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProblemPage {
    pub problems: Vec<Problem>,
    pub total: u64,
}

/// A problem together with its answers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProblemDetail {
    pub problem: Problem,
    pub solutions: Vec<Solution>,
}

/// A browsable category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(alias = "slug")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(alias = "problemCount", alias = "count", default, deserialize_with = "deserialize_i64_from_number")]
    pub problem_count: i64,
}

/// A released version and its notes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    pub version: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub changes: Vec<String>,
}

/// Outgoing body for `POST /api/problems`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewProblem {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
}

/// Outgoing body for `POST /api/bug-reports`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BugReport {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    #[serde(rename = "pageUrl")]
    pub page_url: Option<String>,
}

/// Bug severity as understood by the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
}

impl Severity {
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }
}

fn deserialize_optional_vote<'de, D>(deserializer: D) -> Result<Option<VoteDirection>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().and_then(VoteDirection::parse))
}

fn deserialize_u32_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = deserialize_i64_from_number(deserializer)?;
    u32::try_from(value).map_err(|_| D::Error::custom(format!("value {value} out of range for u32")))
}

fn deserialize_i64_from_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                return Ok(int);
            }
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            if let Some(float) = number.as_f64()
                && float.is_finite()
                && float.fract() == 0.0
                && float >= i64::MIN as f64
                && float <= i64::MAX as f64
            {
                return Ok(float as i64);
            }
            Err(D::Error::custom("expected integer-compatible number"))
        }
        serde_json::Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| D::Error::custom(format!("expected integer string, got {text:?}"))),
        serde_json::Value::Null => Ok(0),
        _ => Err(D::Error::custom("expected number")),
    }
}
