//! Chat pane state and live-update reconciliation.
//!
//! DESIGN
//! ======
//! `ChatState` is a plain state machine. Every operation mutates the state
//! and returns the [`ChatCommand`]s the browser driver must execute (fetches,
//! stream and timer management). Nothing here touches the network, so the
//! ordering, dedup, fallback, and stale-response rules are all unit-tested.
//!
//! Each open/toggle/close advances an epoch. Commands carry the epoch they
//! were issued under and results are applied only while that epoch is current
//! and the pane is open. Sends are the exception: they carry a ticket that
//! survives an order toggle, so a send in flight during a toggle still
//! settles. Closing the pane voids the ticket.
//!
//! ORDERING
//! ========
//! Messages are ordered by server id, descending when
//! `newest_first` is set. Full refetches replace the list; single messages
//! (pushed or own sends) go through [`ChatState::merge_message`], which
//! inserts at the sorted position so late arrivals cannot break the order.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use std::collections::HashSet;
use std::time::Duration;

use crate::net::api::ApiError;
use crate::net::live::{LiveSignal, PushEvent};
use crate::net::types::{ChatMessage, OnlineUser, RosterSnapshot};
use crate::state::auth::AuthState;

/// The single channel the pane follows.
pub const CHAT_CHANNEL: &str = "general";
/// Messages requested per full fetch.
pub const MESSAGE_FETCH_LIMIT: usize = 50;
pub const ROSTER_REFRESH_INTERVAL: Duration = Duration::from_secs(30);
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
/// Refetch period while the push stream is down.
pub const FALLBACK_POLL_INTERVAL: Duration = Duration::from_secs(5);
/// `localStorage` key for the ordering preference.
pub const ORDER_STORAGE_KEY: &str = "aihangout_chat_newest_first";

/// Which live-update strategy is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Transport {
    /// Pane closed; nothing running.
    #[default]
    Idle,
    /// Server-push stream open (or opening).
    Streaming,
    /// Push stream failed; fixed-interval refetch in use.
    Polling,
}

/// Side effect requested by the state machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatCommand {
    /// `GET /api/chat/messages/:channel?limit=N`.
    FetchMessages { epoch: u64, limit: usize },
    /// `GET /api/chat/users/online`.
    FetchRoster { epoch: u64 },
    /// Subscribe the event-stream source.
    OpenStream { epoch: u64, client_id: String },
    /// Swap in the polling source.
    StartPolling { epoch: u64 },
    /// Close whichever live source is active.
    CloseLive,
    /// Start the roster and heartbeat intervals.
    StartTimers { epoch: u64 },
    /// Cancel the roster and heartbeat intervals.
    StopTimers,
    /// Fire-and-forget `POST /api/sessions/heartbeat`.
    Heartbeat,
    /// `POST /api/chat/message`.
    SendMessage { ticket: u64, body: String },
}

/// Why a send was refused before reaching the network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SendRejection {
    #[error("Message is empty.")]
    Empty,
    #[error("A message is already being sent.")]
    InFlight,
    #[error("Please log in to chat.")]
    NotAuthenticated,
    #[error("Your session is missing a token. Please log in again.")]
    MissingToken,
    #[error("Chat is closed.")]
    Closed,
}

/// Local view of one chat channel.
#[derive(Clone, Debug)]
pub struct ChatState {
    pub channel_id: String,
    pub messages: Vec<ChatMessage>,
    pub newest_first: bool,
    pub open: bool,
    pub sending: bool,
    pub draft: String,
    pub error: Option<String>,
    pub online_count: u32,
    pub roster: Vec<OnlineUser>,
    pub transport: Transport,
    pub client_id: Option<String>,
    epoch: u64,
    send_ticket: u64,
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ChatState {
    pub fn new(newest_first: bool) -> Self {
        Self {
            channel_id: CHAT_CHANNEL.to_owned(),
            messages: Vec::new(),
            newest_first,
            open: false,
            sending: false,
            draft: String::new(),
            error: None,
            online_count: 0,
            roster: Vec::new(),
            transport: Transport::Idle,
            client_id: None,
            epoch: 0,
            send_ticket: 0,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// True when results tagged with `epoch` may still mutate state.
    pub fn is_current(&self, epoch: u64) -> bool {
        self.open && epoch == self.epoch
    }

    /// Open the pane: fetch, subscribe, start timers, heartbeat once.
    pub fn open(&mut self, auth: &AuthState) -> Vec<ChatCommand> {
        let mut cmds = Vec::new();
        if self.open {
            cmds.extend(self.teardown());
        }
        self.messages.clear();
        self.roster.clear();
        self.online_count = 0;
        self.error = None;
        self.open = true;
        cmds.extend(self.start());
        if auth.is_authenticated() {
            cmds.push(ChatCommand::Heartbeat);
        }
        cmds
    }

    /// Close the pane: stop the live source and timers.
    pub fn close(&mut self) -> Vec<ChatCommand> {
        if !self.open {
            return Vec::new();
        }
        self.open = false;
        self.sending = false;
        self.teardown()
    }

    /// Sign-out discards everything the pane holds.
    pub fn sign_out(&mut self) -> Vec<ChatCommand> {
        let cmds = self.close();
        self.messages.clear();
        self.roster.clear();
        self.online_count = 0;
        self.draft.clear();
        self.error = None;
        cmds
    }

    /// Flip the ordering preference; refetch and resubscribe while open.
    pub fn toggle_order(&mut self) -> Vec<ChatCommand> {
        self.newest_first = !self.newest_first;
        self.messages.clear();
        if !self.open {
            return Vec::new();
        }
        let mut cmds = self.teardown();
        cmds.extend(self.start());
        cmds
    }

    fn start(&mut self) -> Vec<ChatCommand> {
        self.epoch += 1;
        self.transport = Transport::Streaming;
        let client_id = uuid::Uuid::new_v4().to_string();
        self.client_id = Some(client_id.clone());
        let epoch = self.epoch;
        vec![
            ChatCommand::FetchMessages { epoch, limit: MESSAGE_FETCH_LIMIT },
            ChatCommand::FetchRoster { epoch },
            ChatCommand::OpenStream { epoch, client_id },
            ChatCommand::StartTimers { epoch },
        ]
    }

    fn teardown(&mut self) -> Vec<ChatCommand> {
        self.epoch += 1;
        self.transport = Transport::Idle;
        self.client_id = None;
        vec![ChatCommand::CloseLive, ChatCommand::StopTimers]
    }

    /// Apply a full-fetch result. Failures leave the list untouched.
    pub fn apply_messages(&mut self, epoch: u64, result: Result<Vec<ChatMessage>, ApiError>) -> bool {
        if !self.is_current(epoch) {
            return false;
        }
        match result {
            Ok(snapshot) => {
                self.replace_with_snapshot(snapshot);
                true
            }
            Err(e) => {
                leptos::logging::warn!("chat fetch failed: {e}");
                false
            }
        }
    }

    /// Replace the list with a server snapshot.
    ///
    /// Local messages newer than every snapshot entry are kept so an own
    /// send that raced the fetch is not lost.
    pub fn replace_with_snapshot(&mut self, snapshot: Vec<ChatMessage>) {
        let snapshot_max = snapshot.iter().map(|m| m.id).max();
        let carried = self
            .messages
            .drain(..)
            .filter(|m| snapshot_max.is_none_or(|max| m.id > max))
            .collect::<Vec<_>>();

        let mut seen = HashSet::new();
        let mut next = snapshot
            .into_iter()
            .chain(carried)
            .filter(|m| seen.insert(m.id))
            .collect::<Vec<_>>();
        next.sort_by_key(ChatMessage::sort_key);
        if self.newest_first {
            next.reverse();
        }
        self.messages = next;
    }

    /// Insert one message at its sorted position. Returns `false` for a
    /// duplicate identifier.
    pub fn merge_message(&mut self, message: ChatMessage) -> bool {
        if self.messages.iter().any(|m| m.id == message.id) {
            return false;
        }
        let key = message.sort_key();
        let index = if self.newest_first {
            self.messages.partition_point(|m| m.sort_key() > key)
        } else {
            self.messages.partition_point(|m| m.sort_key() <= key)
        };
        self.messages.insert(index, message);
        true
    }

    /// Handle a signal from the active live source.
    pub fn apply_signal(&mut self, epoch: u64, signal: LiveSignal) -> Vec<ChatCommand> {
        if !self.is_current(epoch) {
            return Vec::new();
        }
        match signal {
            LiveSignal::Event(PushEvent::Connected { client_id }) => {
                leptos::logging::log!("chat stream connected (client {})", client_id.as_deref().unwrap_or("?"));
                Vec::new()
            }
            LiveSignal::Event(PushEvent::NewMessage(message)) => {
                self.merge_message(message);
                Vec::new()
            }
            LiveSignal::Event(PushEvent::Ping) => Vec::new(),
            LiveSignal::Event(PushEvent::Unknown(kind)) => {
                leptos::logging::warn!("ignoring chat event type {kind}");
                Vec::new()
            }
            LiveSignal::Failed(reason) => {
                if self.transport != Transport::Streaming {
                    return Vec::new();
                }
                leptos::logging::log!("chat stream failed ({reason}); falling back to polling");
                self.transport = Transport::Polling;
                vec![ChatCommand::CloseLive, ChatCommand::StartPolling { epoch }]
            }
            LiveSignal::Tick => self.fallback_tick(epoch),
        }
    }

    /// Polling tick: one full refetch while the stream is down.
    pub fn fallback_tick(&self, epoch: u64) -> Vec<ChatCommand> {
        if !self.is_current(epoch) || self.transport != Transport::Polling {
            return Vec::new();
        }
        vec![ChatCommand::FetchMessages { epoch, limit: MESSAGE_FETCH_LIMIT }]
    }

    pub fn roster_tick(&self, epoch: u64) -> Vec<ChatCommand> {
        if !self.is_current(epoch) {
            return Vec::new();
        }
        vec![ChatCommand::FetchRoster { epoch }]
    }

    /// Auth became available while the pane is open (restore or login).
    pub fn session_ready(&self, auth: &AuthState) -> Vec<ChatCommand> {
        if !self.open || !auth.is_authenticated() {
            return Vec::new();
        }
        vec![ChatCommand::Heartbeat]
    }

    /// Heartbeat tick; no-op for unauthenticated sessions.
    pub fn heartbeat_tick(&self, epoch: u64, auth: &AuthState) -> Vec<ChatCommand> {
        if !self.is_current(epoch) || !auth.is_authenticated() {
            return Vec::new();
        }
        vec![ChatCommand::Heartbeat]
    }

    /// Apply a roster fetch. Failure resets the count to zero.
    pub fn apply_roster(&mut self, epoch: u64, result: Result<RosterSnapshot, ApiError>) -> bool {
        if !self.is_current(epoch) {
            return false;
        }
        match result {
            Ok(snapshot) => {
                self.online_count = snapshot.online_count;
                self.roster = snapshot.recent_users;
            }
            Err(e) => {
                leptos::logging::warn!("chat roster fetch failed: {e}");
                self.online_count = 0;
                self.roster.clear();
            }
        }
        true
    }

    /// Whether the compose controls accept input.
    pub fn can_compose(&self, auth: &AuthState) -> bool {
        self.open && !self.sending && auth.is_authenticated()
    }

    pub fn set_draft(&mut self, text: String) {
        self.draft = text;
    }

    /// Validate the draft and start a send.
    ///
    /// Auth failures are also recorded in `error` so the pane can show them.
    pub fn begin_send(&mut self, auth: &AuthState) -> Result<ChatCommand, SendRejection> {
        if !self.open {
            return Err(SendRejection::Closed);
        }
        let body = self.draft.trim();
        if body.is_empty() {
            return Err(SendRejection::Empty);
        }
        if self.sending {
            return Err(SendRejection::InFlight);
        }
        let rejection = if auth.user.is_none() {
            Some(SendRejection::NotAuthenticated)
        } else if auth.token().is_none() {
            Some(SendRejection::MissingToken)
        } else {
            None
        };
        if let Some(rejection) = rejection {
            self.error = Some(rejection.to_string());
            return Err(rejection);
        }
        let body = body.to_owned();
        self.sending = true;
        self.error = None;
        self.send_ticket += 1;
        Ok(ChatCommand::SendMessage { ticket: self.send_ticket, body })
    }

    /// Settle a send. Success clears the draft and merges the stored
    /// message at the current order; failure keeps both list and draft and
    /// records the error.
    pub fn finish_send(&mut self, ticket: u64, result: Result<ChatMessage, ApiError>) -> bool {
        if !self.open || !self.sending || ticket != self.send_ticket {
            return false;
        }
        self.sending = false;
        match result {
            Ok(message) => {
                self.draft.clear();
                self.error = None;
                self.merge_message(message);
            }
            Err(e) => {
                leptos::logging::warn!("chat send failed: {e}");
                self.error = Some(e.user_message());
            }
        }
        true
    }
}
