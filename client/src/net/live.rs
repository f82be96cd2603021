//! Live-update sources for the chat pane.
//!
//! The chat pane consumes one [`LiveUpdateSource`] at a time. The primary
//! implementation holds a server-push event stream; the fallback fires a
//! fixed-interval tick that the pane turns into a full refetch. Switching
//! from one to the other is a strategy swap owned by the pane driver.
//!
//! Browser implementations are gated behind `hydrate`. Event parsing is pure
//! and shared with tests.
//!
//! ERROR HANDLING
//! ==============
//! A transport error on the stream is reported once as [`LiveSignal::Failed`]
//! and the stream is dropped. Malformed payloads are logged and skipped; they
//! never tear down the connection.

#[cfg(test)]
#[path = "live_test.rs"]
mod live_test;

use std::rc::Rc;

use serde_json::Value;

use super::types::ChatMessage;

/// A decoded push event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PushEvent {
    /// Stream handshake; echoes the client identifier when present.
    Connected { client_id: Option<String> },
    /// A message was created in the channel.
    NewMessage(ChatMessage),
    /// Keep-alive.
    Ping,
    /// Any other discriminator; tolerated and ignored.
    Unknown(String),
}

/// Why a push payload could not be decoded.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PushParseError {
    #[error("push payload is not JSON: {0}")]
    Json(String),
    #[error("push payload has no `type`")]
    MissingType,
    #[error("malformed `new_message` payload: {0}")]
    BadMessage(String),
}

/// Decode one event-stream `data:` payload.
///
/// # Errors
///
/// Returns an error for non-JSON input, a missing `type`, or a
/// `new_message` whose `data` is not a chat message.
pub fn parse_push_event(raw: &str) -> Result<PushEvent, PushParseError> {
    let mut value: Value = serde_json::from_str(raw).map_err(|e| PushParseError::Json(e.to_string()))?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(PushParseError::MissingType)?
        .to_owned();

    match kind.as_str() {
        "connected" => {
            let client_id = value
                .get("clientId")
                .or_else(|| value.get("client_id"))
                .and_then(Value::as_str)
                .map(str::to_owned);
            Ok(PushEvent::Connected { client_id })
        }
        "new_message" => {
            let data = value.get_mut("data").map(Value::take).unwrap_or(Value::Null);
            let message = serde_json::from_value(data).map_err(|e| PushParseError::BadMessage(e.to_string()))?;
            Ok(PushEvent::NewMessage(message))
        }
        "ping" => Ok(PushEvent::Ping),
        _ => Ok(PushEvent::Unknown(kind)),
    }
}

/// What a live source delivers to the pane.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LiveSignal {
    /// A decoded push event.
    Event(PushEvent),
    /// The push transport failed and has been dropped.
    Failed(String),
    /// Fallback polling interval elapsed.
    Tick,
}

/// Which strategy a source implements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    EventStream,
    Polling,
}

/// Callback receiving live signals.
pub type LiveSink = Rc<dyn Fn(LiveSignal)>;

/// Failure to start a live source.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LiveSourceError {
    #[error("could not open live source: {0}")]
    Open(String),
}

/// A live-update strategy for one channel.
pub trait LiveUpdateSource {
    fn kind(&self) -> SourceKind;

    /// Start delivering signals for `channel_id` to `sink`. Any previous
    /// subscription is closed first.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying transport cannot be opened.
    fn subscribe(&mut self, channel_id: &str, client_id: &str, sink: LiveSink) -> Result<(), LiveSourceError>;

    /// Stop delivering signals. Idempotent.
    fn close(&mut self);
}

/// Push endpoint for a channel and client identifier.
pub fn event_stream_url(channel_id: &str, client_id: &str) -> String {
    format!("/api/chat/events/{channel_id}?clientId={client_id}")
}

/// Server-push event stream backed by the browser `EventSource`.
#[cfg(feature = "hydrate")]
#[derive(Default)]
pub struct EventStreamSource {
    abort: Option<futures::future::AbortHandle>,
}

#[cfg(feature = "hydrate")]
impl LiveUpdateSource for EventStreamSource {
    fn kind(&self) -> SourceKind {
        SourceKind::EventStream
    }

    fn subscribe(&mut self, channel_id: &str, client_id: &str, sink: LiveSink) -> Result<(), LiveSourceError> {
        use futures::StreamExt;
        use futures::future::{AbortHandle, Abortable};
        use gloo_net::eventsource::futures::EventSource;

        self.close();
        let url = event_stream_url(channel_id, client_id);
        let mut source = EventSource::new(&url).map_err(|e| LiveSourceError::Open(format!("{e:?}")))?;
        let mut messages = source
            .subscribe("message")
            .map_err(|e| LiveSourceError::Open(format!("{e:?}")))?;

        let (handle, registration) = AbortHandle::new_pair();
        let task = async move {
            // Dropping the source closes the connection.
            let _source = source;
            while let Some(item) = messages.next().await {
                match item {
                    Ok((_, event)) => {
                        let Some(data) = event.data().as_string() else {
                            continue;
                        };
                        match parse_push_event(&data) {
                            Ok(event) => sink(LiveSignal::Event(event)),
                            Err(e) => leptos::logging::warn!("dropping push payload: {e}"),
                        }
                    }
                    Err(e) => {
                        sink(LiveSignal::Failed(format!("{e:?}")));
                        break;
                    }
                }
            }
        };
        leptos::task::spawn_local(async move {
            let _ = Abortable::new(task, registration).await;
        });
        self.abort = Some(handle);
        Ok(())
    }

    fn close(&mut self) {
        if let Some(handle) = self.abort.take() {
            handle.abort();
        }
    }
}

#[cfg(feature = "hydrate")]
impl Drop for EventStreamSource {
    fn drop(&mut self) {
        self.close();
    }
}

/// Fixed-interval fallback that emits [`LiveSignal::Tick`].
#[cfg(feature = "hydrate")]
pub struct PollingSource {
    period: std::time::Duration,
    interval: Option<gloo_timers::callback::Interval>,
}

#[cfg(feature = "hydrate")]
impl PollingSource {
    pub fn new(period: std::time::Duration) -> Self {
        Self { period, interval: None }
    }
}

#[cfg(feature = "hydrate")]
impl LiveUpdateSource for PollingSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Polling
    }

    fn subscribe(&mut self, _channel_id: &str, _client_id: &str, sink: LiveSink) -> Result<(), LiveSourceError> {
        self.close();
        let millis = u32::try_from(self.period.as_millis()).unwrap_or(u32::MAX);
        self.interval = Some(gloo_timers::callback::Interval::new(millis, move || sink(LiveSignal::Tick)));
        Ok(())
    }

    fn close(&mut self) {
        // Dropping the interval cancels it.
        self.interval = None;
    }
}
