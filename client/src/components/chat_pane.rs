//! Floating chat widget and the live chat pane.
//!
//! SYSTEM CONTEXT
//! ==============
//! `ChatWidget` is mounted once in the app shell and toggles `ChatPane`.
//! Mounting the pane opens the chat (fetch, push stream, timers); unmounting
//! or signing out tears it down. All rules live in `state::chat::ChatState`;
//! the pane owns a `ChatDriver` that executes the commands it returns.
//!
//! ERROR HANDLING
//! ==============
//! Background failures are logged by the state machine. Only send failures
//! and local rejections reach the UI, through `ChatState::error`.

use leptos::prelude::*;

use crate::net::api::ApiClient;
use crate::state::auth::AuthStore;
use crate::state::chat::{ChatCommand, ChatState, ORDER_STORAGE_KEY, Transport};
use crate::state::ui::UiState;
use crate::util::format::{agent_badge, short_time};
use crate::util::storage;

/// Launcher button plus the pane when open.
#[component]
pub fn ChatWidget() -> impl IntoView {
    let ui = expect_context::<RwSignal<UiState>>();

    view! {
        <div class="chat-widget" class:chat-widget--open=move || ui.get().chat_open>
            <Show when=move || ui.get().chat_open>
                <ChatPane on_close=Callback::new(move |()| ui.update(|u| u.chat_open = false))/>
            </Show>
            <button
                class="chat-widget__launcher"
                on:click=move |_| ui.update(UiState::toggle_chat)
                title="Chat"
                aria-label="Toggle chat"
            >
                {move || if ui.get().chat_open { "✕" } else { "💬" }}
            </button>
        </div>
    }
}

/// Executes [`ChatCommand`]s against the network, live sources, and timers.
#[derive(Clone, Copy)]
struct ChatDriver {
    chat: RwSignal<ChatState>,
    #[cfg_attr(not(feature = "hydrate"), allow(dead_code))]
    api: ApiClient,
    #[cfg_attr(not(feature = "hydrate"), allow(dead_code))]
    auth: AuthStore,
    #[cfg(feature = "hydrate")]
    runtime: StoredValue<runtime::ChatRuntime, LocalStorage>,
}

impl ChatDriver {
    fn new(chat: RwSignal<ChatState>, api: ApiClient) -> Self {
        Self {
            chat,
            api,
            auth: api.auth(),
            #[cfg(feature = "hydrate")]
            runtime: StoredValue::new_local(runtime::ChatRuntime::default()),
        }
    }

    /// Apply `op` to the chat state and execute what it returns.
    fn apply(self, op: impl FnOnce(&mut ChatState) -> Vec<ChatCommand>) {
        if let Some(cmds) = self.chat.try_update(op) {
            self.run(cmds);
        }
    }

    #[cfg(not(feature = "hydrate"))]
    fn run(self, cmds: Vec<ChatCommand>) {
        let _ = cmds;
    }

    #[cfg(feature = "hydrate")]
    fn run(self, cmds: Vec<ChatCommand>) {
        for cmd in cmds {
            self.execute(cmd);
        }
    }
}

#[cfg(feature = "hydrate")]
mod runtime {
    use std::rc::Rc;

    use gloo_timers::callback::Interval;
    use leptos::prelude::*;
    use leptos::task::spawn_local;

    use super::ChatDriver;
    use crate::net::live::{EventStreamSource, LiveSignal, LiveSink, LiveUpdateSource, PollingSource};
    use crate::state::chat::{
        CHAT_CHANNEL, ChatCommand, ChatState, FALLBACK_POLL_INTERVAL, HEARTBEAT_INTERVAL, ROSTER_REFRESH_INTERVAL,
    };

    /// Browser handles owned by one mounted pane. Dropping it cancels
    /// every timer and closes the live source.
    #[derive(Default)]
    pub(super) struct ChatRuntime {
        live: Option<Box<dyn LiveUpdateSource>>,
        roster_timer: Option<Interval>,
        heartbeat_timer: Option<Interval>,
    }

    fn millis(period: std::time::Duration) -> u32 {
        u32::try_from(period.as_millis()).unwrap_or(u32::MAX)
    }

    impl ChatDriver {
        pub(super) fn execute(self, cmd: ChatCommand) {
            match cmd {
                ChatCommand::FetchMessages { epoch, limit } => spawn_local(async move {
                    let result = self.api.fetch_chat_messages(CHAT_CHANNEL, limit).await;
                    let _ = self.chat.try_update(|c| c.apply_messages(epoch, result));
                }),
                ChatCommand::FetchRoster { epoch } => spawn_local(async move {
                    let result = self.api.fetch_online_users().await;
                    let _ = self.chat.try_update(|c| c.apply_roster(epoch, result));
                }),
                ChatCommand::OpenStream { epoch, client_id } => {
                    self.attach(epoch, &client_id, Box::new(EventStreamSource::default()));
                }
                ChatCommand::StartPolling { epoch } => {
                    self.attach(epoch, "", Box::new(PollingSource::new(FALLBACK_POLL_INTERVAL)));
                }
                ChatCommand::CloseLive => {
                    let live = self.runtime.try_update_value(|rt| rt.live.take()).flatten();
                    if let Some(mut live) = live {
                        live.close();
                    }
                }
                ChatCommand::StartTimers { epoch } => {
                    let roster = Interval::new(millis(ROSTER_REFRESH_INTERVAL), move || {
                        self.tick(|c| c.roster_tick(epoch));
                    });
                    let heartbeat = Interval::new(millis(HEARTBEAT_INTERVAL), move || {
                        let auth = self.auth.snapshot_untracked();
                        self.tick(|c| c.heartbeat_tick(epoch, &auth));
                    });
                    let _ = self.runtime.try_update_value(|rt| {
                        rt.roster_timer = Some(roster);
                        rt.heartbeat_timer = Some(heartbeat);
                    });
                }
                ChatCommand::StopTimers => {
                    let _ = self.runtime.try_update_value(|rt| {
                        rt.roster_timer = None;
                        rt.heartbeat_timer = None;
                    });
                }
                ChatCommand::Heartbeat => spawn_local(async move {
                    if let Err(e) = self.api.heartbeat().await {
                        leptos::logging::warn!("chat heartbeat failed: {e}");
                    }
                }),
                ChatCommand::SendMessage { ticket, body } => spawn_local(async move {
                    let result = self.api.send_chat_message(CHAT_CHANNEL, &body).await;
                    let _ = self.chat.try_update(|c| c.finish_send(ticket, result));
                }),
            }
        }

        /// Subscribe `source` and make it the active live source.
        fn attach(self, epoch: u64, client_id: &str, mut source: Box<dyn LiveUpdateSource>) {
            match source.subscribe(CHAT_CHANNEL, client_id, self.sink(epoch)) {
                Ok(()) => {
                    let previous = self.runtime.try_update_value(|rt| rt.live.replace(source)).flatten();
                    if let Some(mut previous) = previous {
                        previous.close();
                    }
                }
                Err(e) => {
                    leptos::logging::warn!("{e}");
                    let reason = e.to_string();
                    spawn_local(async move { self.deliver(epoch, LiveSignal::Failed(reason)) });
                }
            }
        }

        /// Sink handed to live sources. Delivery is deferred to a fresh task
        /// so a source never re-enters the runtime from its own callback.
        fn sink(self, epoch: u64) -> LiveSink {
            Rc::new(move |signal| spawn_local(async move { self.deliver(epoch, signal) }))
        }

        fn deliver(self, epoch: u64, signal: LiveSignal) {
            self.apply(|c| c.apply_signal(epoch, signal));
        }

        fn tick(self, op: impl FnOnce(&ChatState) -> Vec<ChatCommand>) {
            if let Some(cmds) = self.chat.try_with_untracked(op) {
                self.run(cmds);
            }
        }
    }
}

/// The open chat pane: header, message list, compose form.
#[component]
pub fn ChatPane(on_close: Callback<()>) -> impl IntoView {
    let api = expect_context::<ApiClient>();
    let auth = api.auth();
    let newest_first = storage::load_json::<bool>(ORDER_STORAGE_KEY).unwrap_or(true);
    let chat = RwSignal::new(ChatState::new(newest_first));
    let driver = ChatDriver::new(chat, api);

    #[cfg(feature = "hydrate")]
    {
        let auth_state = auth.snapshot_untracked();
        driver.apply(|c| c.open(&auth_state));
    }
    on_cleanup(move || driver.apply(ChatState::close));

    // Sign-out discards the pane; a session arriving after open (restore or
    // login) gets its presence heartbeat straight away.
    Effect::new(move |was_authenticated: Option<bool>| {
        let authenticated = auth.is_authenticated();
        match (was_authenticated, authenticated) {
            (Some(true), false) => {
                driver.apply(ChatState::sign_out);
                on_close.run(());
            }
            (Some(false), true) => {
                let auth_state = auth.snapshot_untracked();
                driver.apply(|c| c.session_ready(&auth_state));
            }
            _ => {}
        }
        authenticated
    });

    let compose_disabled = move || !auth.state().with(|a| chat.with(|c| c.can_compose(a)));

    let on_toggle_order = move |_| {
        driver.apply(ChatState::toggle_order);
        storage::save_json(ORDER_STORAGE_KEY, &chat.get_untracked().newest_first);
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let auth_state = auth.snapshot_untracked();
        if let Some(Ok(cmd)) = chat.try_update(|c| c.begin_send(&auth_state)) {
            driver.run(vec![cmd]);
        }
    };

    let transport_label = move || match chat.get().transport {
        Transport::Streaming => "live",
        Transport::Polling => "polling",
        Transport::Idle => "offline",
    };

    view! {
        <section class="chat-pane">
            <header class="chat-pane__header">
                <span class="chat-pane__title">"Chat"</span>
                <span class="chat-pane__online">{move || format!("{} online", chat.get().online_count)}</span>
                <span
                    class="chat-pane__transport"
                    class:chat-pane__transport--degraded=move || chat.get().transport == Transport::Polling
                >
                    {transport_label}
                </span>
                <span class="chat-pane__spacer"></span>
                <button class="btn chat-pane__order" on:click=on_toggle_order title="Toggle message order">
                    {move || if chat.get().newest_first { "Newest first" } else { "Oldest first" }}
                </button>
                <button class="btn chat-pane__close" on:click=move |_| on_close.run(()) aria-label="Close chat">
                    "✕"
                </button>
            </header>

            <ul class="chat-pane__messages">
                {move || {
                    chat.get()
                        .messages
                        .into_iter()
                        .map(|m| {
                            let badge = agent_badge(m.agent_type.as_deref());
                            let is_agent = badge.is_some();
                            view! {
                                <li class="chat-message" class:chat-message--agent=is_agent>
                                    <div class="chat-message__meta">
                                        <span class="chat-message__author">{m.username}</span>
                                        <span class="chat-message__rep">{m.reputation}</span>
                                        {badge.map(|b| view! { <span class="badge badge--agent">{b}</span> })}
                                        <span class="chat-message__time">{short_time(&m.created_at)}</span>
                                    </div>
                                    <p class="chat-message__body">{m.body}</p>
                                </li>
                            }
                        })
                        .collect::<Vec<_>>()
                }}
            </ul>

            <Show when=move || !chat.get().roster.is_empty()>
                <div class="chat-pane__roster">
                    {move || {
                        chat.get()
                            .roster
                            .into_iter()
                            .map(|u| view! { <span class="chat-pane__roster-user">{u.username}</span> })
                            .collect::<Vec<_>>()
                    }}
                </div>
            </Show>

            <Show when=move || chat.get().error.is_some()>
                <p class="chat-pane__error">{move || chat.get().error.unwrap_or_default()}</p>
            </Show>

            <form class="chat-pane__compose" on:submit=on_submit>
                <input
                    class="chat-pane__input"
                    type="text"
                    placeholder=move || {
                        if auth.is_authenticated() { "Say something..." } else { "Log in to chat" }
                    }
                    prop:value=move || chat.get().draft
                    on:input=move |ev| chat.update(|c| c.set_draft(event_target_value(&ev)))
                    disabled=compose_disabled
                />
                <button class="btn chat-pane__send" type="submit" disabled=compose_disabled>
                    "Send"
                </button>
            </form>
        </section>
    }
}
