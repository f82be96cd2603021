use super::*;
use crate::net::types::{AuthUser, Session};

fn msg(id: i64, second: u32) -> ChatMessage {
    ChatMessage {
        id,
        body: format!("m{id}"),
        kind: "text".to_owned(),
        created_at: format!("2025-01-01 00:00:{second:02}"),
        username: "ann".to_owned(),
        agent_type: None,
        reputation: 0,
    }
}

fn stamped(id: i64, created_at: &str) -> ChatMessage {
    ChatMessage { created_at: created_at.to_owned(), ..msg(id, 0) }
}

fn ticket(cmd: ChatCommand) -> u64 {
    match cmd {
        ChatCommand::SendMessage { ticket, .. } => ticket,
        other => panic!("expected a send, got {other:?}"),
    }
}

fn authed() -> AuthState {
    AuthState::from_session(Session {
        token: "tok".to_owned(),
        user: AuthUser { username: "ann".to_owned(), reputation: 1, agent_type: None },
    })
}

fn anon() -> AuthState {
    AuthState::signed_out()
}

fn ids(state: &ChatState) -> Vec<i64> {
    state.messages.iter().map(|m| m.id).collect()
}

fn opened(newest_first: bool) -> (ChatState, u64) {
    let mut state = ChatState::new(newest_first);
    state.open(&anon());
    let epoch = state.epoch();
    (state, epoch)
}

fn push(state: &mut ChatState, epoch: u64, message: ChatMessage) {
    state.apply_signal(epoch, LiveSignal::Event(PushEvent::NewMessage(message)));
}

fn is_sorted(state: &ChatState) -> bool {
    state.messages.windows(2).all(|pair| {
        if state.newest_first {
            pair[0].sort_key() > pair[1].sort_key()
        } else {
            pair[0].sort_key() < pair[1].sort_key()
        }
    })
}

// =============================================================
// Open / close lifecycle
// =============================================================

#[test]
fn open_fetches_subscribes_and_starts_timers() {
    let mut state = ChatState::new(true);
    let cmds = state.open(&authed());
    let epoch = state.epoch();
    let client_id = state.client_id.clone().expect("client id assigned");
    assert_eq!(client_id.len(), 36);
    assert_eq!(
        cmds,
        vec![
            ChatCommand::FetchMessages { epoch, limit: MESSAGE_FETCH_LIMIT },
            ChatCommand::FetchRoster { epoch },
            ChatCommand::OpenStream { epoch, client_id },
            ChatCommand::StartTimers { epoch },
            ChatCommand::Heartbeat,
        ]
    );
    assert!(state.open);
    assert_eq!(state.transport, Transport::Streaming);
    assert_eq!(state.channel_id, CHAT_CHANNEL);
}

#[test]
fn open_without_session_skips_heartbeat() {
    let mut state = ChatState::new(true);
    let cmds = state.open(&anon());
    assert!(!cmds.contains(&ChatCommand::Heartbeat));
}

#[test]
fn session_arriving_after_open_sends_heartbeat() {
    let mut state = ChatState::new(true);
    state.open(&anon());
    assert!(state.session_ready(&anon()).is_empty());
    assert_eq!(state.session_ready(&authed()), vec![ChatCommand::Heartbeat]);

    state.close();
    assert!(state.session_ready(&authed()).is_empty());
}

#[test]
fn each_open_uses_a_fresh_client_id() {
    let mut state = ChatState::new(true);
    state.open(&anon());
    let first = state.client_id.clone();
    state.close();
    state.open(&anon());
    assert_ne!(state.client_id, first);
}

#[test]
fn close_tears_down_and_drops_late_results() {
    let (mut state, epoch) = opened(true);
    assert_eq!(state.close(), vec![ChatCommand::CloseLive, ChatCommand::StopTimers]);
    assert_eq!(state.transport, Transport::Idle);
    assert!(state.close().is_empty());

    assert!(!state.apply_messages(epoch, Ok(vec![msg(1, 1)])));
    assert!(!state.apply_roster(epoch, Ok(RosterSnapshot { online_count: 4, recent_users: Vec::new() })));
    assert!(state.messages.is_empty());
    assert_eq!(state.online_count, 0);
}

#[test]
fn reopen_starts_from_empty_state() {
    let (mut state, epoch) = opened(true);
    state.apply_messages(epoch, Ok(vec![msg(1, 1)]));
    state.close();
    let cmds = state.open(&anon());
    assert!(state.messages.is_empty());
    assert!(matches!(cmds[0], ChatCommand::FetchMessages { .. }));
}

#[test]
fn sign_out_discards_everything() {
    let (mut state, epoch) = opened(true);
    state.apply_messages(epoch, Ok(vec![msg(1, 1)]));
    state.set_draft("half typed".to_owned());
    let cmds = state.sign_out();
    assert_eq!(cmds, vec![ChatCommand::CloseLive, ChatCommand::StopTimers]);
    assert!(state.messages.is_empty());
    assert!(state.draft.is_empty());
    assert!(!state.open);
}

// =============================================================
// Ordering and dedup
// =============================================================

#[test]
fn newest_first_scenario_merges_at_head_and_ignores_duplicates() {
    let (mut state, epoch) = opened(true);
    state.apply_messages(epoch, Ok(vec![msg(1, 1), msg(2, 2), msg(3, 3)]));
    assert_eq!(ids(&state), vec![3, 2, 1]);

    push(&mut state, epoch, msg(4, 4));
    assert_eq!(ids(&state), vec![4, 3, 2, 1]);

    push(&mut state, epoch, msg(4, 4));
    assert_eq!(ids(&state), vec![4, 3, 2, 1]);
}

#[test]
fn oldest_first_merges_at_tail() {
    let (mut state, epoch) = opened(false);
    state.apply_messages(epoch, Ok(vec![msg(3, 3), msg(1, 1), msg(2, 2)]));
    assert_eq!(ids(&state), vec![1, 2, 3]);
    push(&mut state, epoch, msg(4, 4));
    assert_eq!(ids(&state), vec![1, 2, 3, 4]);
}

#[test]
fn late_arrival_lands_at_sorted_position() {
    let (mut state, epoch) = opened(true);
    state.apply_messages(epoch, Ok(vec![msg(1, 1), msg(3, 3)]));
    push(&mut state, epoch, msg(2, 2));
    assert_eq!(ids(&state), vec![3, 2, 1]);

    let (mut state, epoch) = opened(false);
    state.apply_messages(epoch, Ok(vec![msg(1, 1), msg(3, 3)]));
    push(&mut state, epoch, msg(2, 2));
    assert_eq!(ids(&state), vec![1, 2, 3]);
}

#[test]
fn equal_timestamps_order_by_id() {
    let (mut state, epoch) = opened(false);
    push(&mut state, epoch, msg(8, 5));
    push(&mut state, epoch, msg(7, 5));
    assert_eq!(ids(&state), vec![7, 8]);
}

#[test]
fn mixed_and_missing_timestamps_order_by_id() {
    let (mut state, epoch) = opened(true);
    state.apply_messages(
        epoch,
        Ok(vec![stamped(1, "2025-01-01T10:00:00Z"), stamped(2, "2025-01-01T10:00:05Z")]),
    );
    push(&mut state, epoch, stamped(3, "2025-01-01 10:00:10"));
    push(&mut state, epoch, stamped(4, ""));
    assert_eq!(ids(&state), vec![4, 3, 2, 1]);
    assert!(is_sorted(&state));
}

#[test]
fn snapshot_with_repeated_ids_is_deduplicated() {
    let (mut state, epoch) = opened(true);
    state.apply_messages(epoch, Ok(vec![msg(1, 1), msg(2, 2), msg(1, 1)]));
    assert_eq!(ids(&state), vec![2, 1]);
}

#[test]
fn refetch_keeps_local_messages_newer_than_snapshot() {
    let (mut state, epoch) = opened(true);
    state.apply_messages(epoch, Ok(vec![msg(1, 1), msg(2, 2)]));
    push(&mut state, epoch, msg(3, 3));

    // Snapshot taken before message 3 was stored.
    state.apply_messages(epoch, Ok(vec![msg(1, 1), msg(2, 2)]));
    assert_eq!(ids(&state), vec![3, 2, 1]);

    // A later snapshot containing it does not duplicate it.
    state.apply_messages(epoch, Ok(vec![msg(2, 2), msg(3, 3)]));
    assert_eq!(ids(&state), vec![3, 2]);
}

#[test]
fn every_merge_sequence_keeps_order_and_uniqueness() {
    let arrivals: [&[i64]; 4] = [&[5, 1, 4, 2, 3, 5, 1], &[1, 2, 3, 4, 5], &[5, 4, 3, 2, 1, 3], &[2, 5, 2, 1, 4, 3]];
    for newest_first in [true, false] {
        for order in arrivals {
            let (mut state, epoch) = opened(newest_first);
            for (step, id) in order.iter().enumerate() {
                push(&mut state, epoch, msg(*id, u32::try_from(*id).expect("small id")));
                if step == 2 {
                    state.apply_messages(epoch, Ok(vec![msg(1, 1), msg(2, 2)]));
                }
                assert!(is_sorted(&state), "unsorted after {order:?} step {step}");
            }
            let mut seen = ids(&state);
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), state.messages.len());
        }
    }
}

// =============================================================
// Ordering toggle
// =============================================================

#[test]
fn toggle_while_open_refetches_at_new_order() {
    let (mut state, old_epoch) = opened(true);
    state.apply_messages(old_epoch, Ok(vec![msg(1, 1), msg(2, 2)]));

    let cmds = state.toggle_order();
    let epoch = state.epoch();
    assert!(!state.newest_first);
    assert!(state.messages.is_empty());
    assert_eq!(cmds[..2], [ChatCommand::CloseLive, ChatCommand::StopTimers]);
    assert!(cmds.contains(&ChatCommand::FetchMessages { epoch, limit: MESSAGE_FETCH_LIMIT }));
    assert!(cmds.iter().any(|c| matches!(c, ChatCommand::OpenStream { epoch: e, .. } if *e == epoch)));
    assert!(cmds.contains(&ChatCommand::StartTimers { epoch }));

    assert!(!state.apply_messages(old_epoch, Ok(vec![msg(9, 9)])));
    state.apply_messages(epoch, Ok(vec![msg(2, 2), msg(1, 1)]));
    assert_eq!(ids(&state), vec![1, 2]);
}

#[test]
fn toggle_while_closed_only_flips_preference() {
    let mut state = ChatState::new(true);
    assert!(state.toggle_order().is_empty());
    assert!(!state.newest_first);
}

// =============================================================
// Fallback polling
// =============================================================

#[test]
fn stream_failure_swaps_to_polling() {
    let (mut state, epoch) = opened(true);
    assert!(state.apply_signal(epoch, LiveSignal::Tick).is_empty());

    let cmds = state.apply_signal(epoch, LiveSignal::Failed("network".to_owned()));
    assert_eq!(cmds, vec![ChatCommand::CloseLive, ChatCommand::StartPolling { epoch }]);
    assert_eq!(state.transport, Transport::Polling);

    assert_eq!(
        state.apply_signal(epoch, LiveSignal::Tick),
        vec![ChatCommand::FetchMessages { epoch, limit: MESSAGE_FETCH_LIMIT }]
    );
    assert!(state.apply_signal(epoch, LiveSignal::Failed("again".to_owned())).is_empty());
}

#[test]
fn polling_stops_after_close() {
    let (mut state, epoch) = opened(true);
    state.apply_signal(epoch, LiveSignal::Failed("network".to_owned()));
    state.close();
    assert!(state.fallback_tick(epoch).is_empty());
}

#[test]
fn stale_epoch_signals_are_ignored() {
    let (mut state, old_epoch) = opened(true);
    state.toggle_order();
    push(&mut state, old_epoch, msg(1, 1));
    assert!(state.messages.is_empty());
    assert!(state.apply_signal(old_epoch, LiveSignal::Failed("x".to_owned())).is_empty());
    assert_eq!(state.transport, Transport::Streaming);
}

#[test]
fn informational_events_do_not_change_state() {
    let (mut state, epoch) = opened(true);
    let connected = PushEvent::Connected { client_id: Some("abc".to_owned()) };
    assert!(state.apply_signal(epoch, LiveSignal::Event(connected)).is_empty());
    assert!(state.apply_signal(epoch, LiveSignal::Event(PushEvent::Ping)).is_empty());
    assert!(state.apply_signal(epoch, LiveSignal::Event(PushEvent::Unknown("typing".to_owned()))).is_empty());
    assert!(state.messages.is_empty());
}

// =============================================================
// Roster and heartbeat
// =============================================================

#[test]
fn roster_failure_resets_count() {
    let (mut state, epoch) = opened(true);
    let users = vec![OnlineUser { username: "bot".to_owned(), agent_type: Some("gpt".to_owned()), reputation: 3 }];
    state.apply_roster(epoch, Ok(RosterSnapshot { online_count: 2, recent_users: users }));
    assert_eq!(state.online_count, 2);
    assert_eq!(state.roster.len(), 1);

    state.apply_roster(epoch, Err(ApiError::Network("offline".to_owned())));
    assert_eq!(state.online_count, 0);
    assert!(state.roster.is_empty());
}

#[test]
fn heartbeat_tick_requires_session() {
    let (state, epoch) = opened(true);
    assert!(state.heartbeat_tick(epoch, &anon()).is_empty());
    assert_eq!(state.heartbeat_tick(epoch, &authed()), vec![ChatCommand::Heartbeat]);
    assert_eq!(state.roster_tick(epoch), vec![ChatCommand::FetchRoster { epoch }]);
}

// =============================================================
// Sending
// =============================================================

#[test]
fn unauthenticated_send_is_rejected_locally() {
    let (mut state, _) = opened(true);
    state.set_draft("hello".to_owned());
    assert_eq!(state.begin_send(&anon()), Err(SendRejection::NotAuthenticated));
    assert_eq!(state.error.as_deref(), Some("Please log in to chat."));
    assert!(!state.sending);
}

#[test]
fn send_requires_token() {
    let (mut state, _) = opened(true);
    state.set_draft("hello".to_owned());
    let mut auth = authed();
    auth.token = None;
    assert_eq!(state.begin_send(&auth), Err(SendRejection::MissingToken));
}

#[test]
fn blank_and_concurrent_sends_are_rejected() {
    let (mut state, _) = opened(true);
    state.set_draft("   ".to_owned());
    assert_eq!(state.begin_send(&authed()), Err(SendRejection::Empty));

    state.set_draft("hi".to_owned());
    assert!(state.begin_send(&authed()).is_ok());
    assert_eq!(state.begin_send(&authed()), Err(SendRejection::InFlight));
}

#[test]
fn send_while_closed_is_rejected() {
    let mut state = ChatState::new(true);
    state.set_draft("hi".to_owned());
    assert_eq!(state.begin_send(&authed()), Err(SendRejection::Closed));
}

#[test]
fn successful_send_clears_draft_and_merges() {
    let (mut state, epoch) = opened(true);
    state.apply_messages(epoch, Ok(vec![msg(1, 1)]));
    state.set_draft("  hello  ".to_owned());
    let cmd = state.begin_send(&authed()).expect("send should start");
    assert!(matches!(&cmd, ChatCommand::SendMessage { body, .. } if body == "hello"));

    assert!(state.finish_send(ticket(cmd), Ok(msg(2, 2))));
    assert!(state.draft.is_empty());
    assert!(!state.sending);
    assert_eq!(ids(&state), vec![2, 1]);

    // The push echo of our own message is a duplicate.
    push(&mut state, epoch, msg(2, 2));
    assert_eq!(ids(&state), vec![2, 1]);
}

#[test]
fn failed_send_keeps_list_and_draft() {
    let (mut state, epoch) = opened(true);
    state.apply_messages(epoch, Ok(vec![msg(1, 1)]));
    state.set_draft("hello".to_owned());
    let cmd = state.begin_send(&authed()).expect("send should start");

    let before = state.messages.clone();
    state.finish_send(ticket(cmd), Err(ApiError::Server("rate limited".to_owned())));
    assert_eq!(state.messages, before);
    assert_eq!(state.error.as_deref(), Some("rate limited"));
    assert_eq!(state.draft, "hello");
    assert!(!state.sending);
}

#[test]
fn network_failure_uses_generic_message() {
    let (mut state, _) = opened(true);
    state.set_draft("hello".to_owned());
    let cmd = state.begin_send(&authed()).expect("send should start");
    state.finish_send(ticket(cmd), Err(ApiError::Network("Failed to fetch".to_owned())));
    assert_eq!(
        state.error.as_deref(),
        Some("Network error. Please check your connection and try again.")
    );
}

#[test]
fn send_result_after_close_is_dropped() {
    let (mut state, _) = opened(true);
    state.set_draft("hello".to_owned());
    let cmd = state.begin_send(&authed()).expect("send should start");
    state.close();
    assert!(!state.finish_send(ticket(cmd), Ok(msg(5, 5))));
    assert!(state.messages.is_empty());
    assert!(!state.sending);
}

#[test]
fn send_in_flight_survives_order_toggle() {
    let (mut state, _) = opened(true);
    state.set_draft("hello".to_owned());
    let cmd = state.begin_send(&authed()).expect("send should start");

    state.toggle_order();
    assert!(state.sending);
    assert!(!state.can_compose(&authed()));
    assert_eq!(state.begin_send(&authed()), Err(SendRejection::InFlight));

    assert!(state.finish_send(ticket(cmd), Ok(msg(5, 5))));
    assert!(!state.sending);
    assert!(state.draft.is_empty());
    assert_eq!(ids(&state), vec![5]);

    // The refetch at the new order still sees it once.
    let epoch = state.epoch();
    state.apply_messages(epoch, Ok(vec![msg(4, 4), msg(5, 5)]));
    assert_eq!(ids(&state), vec![4, 5]);
}

#[test]
fn send_failure_after_toggle_still_settles() {
    let (mut state, _) = opened(false);
    state.set_draft("hello".to_owned());
    let cmd = state.begin_send(&authed()).expect("send should start");
    state.toggle_order();

    assert!(state.finish_send(ticket(cmd), Err(ApiError::Server("rate limited".to_owned()))));
    assert!(!state.sending);
    assert_eq!(state.draft, "hello");
    assert_eq!(state.error.as_deref(), Some("rate limited"));
}

#[test]
fn send_from_before_reopen_does_not_settle_a_new_send() {
    let (mut state, _) = opened(true);
    state.set_draft("first".to_owned());
    let stale = state.begin_send(&authed()).expect("send should start");
    state.close();
    state.open(&authed());

    state.set_draft("second".to_owned());
    let current = state.begin_send(&authed()).expect("send should start");
    assert!(!state.finish_send(ticket(stale), Ok(msg(7, 7))));
    assert!(state.sending);
    assert_eq!(state.draft, "second");

    assert!(state.finish_send(ticket(current), Ok(msg(8, 8))));
    assert_eq!(ids(&state), vec![8]);
}

#[test]
fn compose_is_disabled_without_a_session() {
    let (state, _) = opened(true);
    assert!(!state.can_compose(&anon()));
    assert!(state.can_compose(&authed()));
    assert!(!ChatState::new(true).can_compose(&authed()));
}
