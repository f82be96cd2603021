//! Optimistic vote transitions for problems and solutions.
//!
//! DESIGN
//! ======
//! A vote is applied locally before the server answers. `begin` computes the
//! optimistic state and `reconcile` either adopts the server's count or rolls
//! back to the state captured before the click. Both are pure so the
//! component only wires them to signals and the HTTP client.

#[cfg(test)]
#[path = "vote_test.rs"]
mod vote_test;

use serde::{Deserialize, Serialize};

use crate::net::api::ApiError;

/// Direction of a vote as sent in `{ "voteType": ... }`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "up" | "upvote" | "1" => Some(Self::Up),
            "down" | "downvote" | "-1" => Some(Self::Down),
            _ => None,
        }
    }

    fn weight(selection: Option<Self>) -> i64 {
        match selection {
            Some(Self::Up) => 1,
            Some(Self::Down) => -1,
            None => 0,
        }
    }
}

/// What the vote is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteTarget {
    Problem(i64),
    Solution(i64),
}

/// Displayed vote state for one problem or solution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VoteState {
    pub selection: Option<VoteDirection>,
    pub count: i64,
    pub pending: bool,
}

impl VoteState {
    pub fn new(count: i64, selection: Option<VoteDirection>) -> Self {
        Self { selection, count, pending: false }
    }
}

/// Why a vote click was refused without touching state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum VoteRejection {
    #[error("Please log in to vote.")]
    NotAuthenticated,
    #[error("A vote is already being recorded.")]
    Pending,
}

/// Selection after clicking `action`: clicking the active direction clears it.
pub fn next_selection(current: Option<VoteDirection>, action: VoteDirection) -> Option<VoteDirection> {
    if current == Some(action) { None } else { Some(action) }
}

/// Count change when moving from `from` to `to`.
pub fn vote_delta(from: Option<VoteDirection>, to: Option<VoteDirection>) -> i64 {
    VoteDirection::weight(to) - VoteDirection::weight(from)
}

/// Optimistic state for a click, or the reason the click is refused.
pub fn begin(prior: VoteState, action: VoteDirection, authenticated: bool) -> Result<VoteState, VoteRejection> {
    if !authenticated {
        return Err(VoteRejection::NotAuthenticated);
    }
    if prior.pending {
        return Err(VoteRejection::Pending);
    }
    let selection = next_selection(prior.selection, action);
    Ok(VoteState {
        selection,
        count: prior.count + vote_delta(prior.selection, selection),
        pending: true,
    })
}

/// Settle an optimistic vote with the server's answer.
///
/// On success the server count wins and the optimistic selection stays; on
/// failure both selection and count return to `prior`.
pub fn reconcile(prior: VoteState, optimistic: VoteState, outcome: &Result<i64, ApiError>) -> VoteState {
    match outcome {
        Ok(count) => VoteState { selection: optimistic.selection, count: *count, pending: false },
        Err(_) => VoteState { pending: false, ..prior },
    }
}
