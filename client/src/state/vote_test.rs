use super::*;

// =============================================================
// Transitions
// =============================================================

#[test]
fn next_selection_toggles_active_direction_off() {
    assert_eq!(next_selection(None, VoteDirection::Up), Some(VoteDirection::Up));
    assert_eq!(next_selection(Some(VoteDirection::Up), VoteDirection::Up), None);
    assert_eq!(next_selection(Some(VoteDirection::Up), VoteDirection::Down), Some(VoteDirection::Down));
}

#[test]
fn vote_delta_covers_every_transition() {
    use VoteDirection::{Down, Up};
    assert_eq!(vote_delta(None, Some(Up)), 1);
    assert_eq!(vote_delta(None, Some(Down)), -1);
    assert_eq!(vote_delta(Some(Up), Some(Down)), -2);
    assert_eq!(vote_delta(Some(Down), Some(Up)), 2);
    assert_eq!(vote_delta(Some(Up), None), -1);
    assert_eq!(vote_delta(Some(Down), None), 1);
}

#[test]
fn begin_applies_optimistic_delta() {
    let prior = VoteState::new(10, Some(VoteDirection::Down));
    let next = begin(prior, VoteDirection::Up, true).expect("vote should start");
    assert_eq!(next.selection, Some(VoteDirection::Up));
    assert_eq!(next.count, 12);
    assert!(next.pending);
}

#[test]
fn begin_requires_authentication() {
    let prior = VoteState::new(3, None);
    assert_eq!(begin(prior, VoteDirection::Up, false), Err(VoteRejection::NotAuthenticated));
}

#[test]
fn begin_ignores_click_while_pending() {
    let prior = VoteState { selection: Some(VoteDirection::Up), count: 4, pending: true };
    assert_eq!(begin(prior, VoteDirection::Down, true), Err(VoteRejection::Pending));
}

// =============================================================
// Reconciliation
// =============================================================

#[test]
fn reconcile_adopts_server_count() {
    let prior = VoteState::new(10, None);
    let optimistic = begin(prior, VoteDirection::Up, true).expect("vote should start");
    let settled = reconcile(prior, optimistic, &Ok(15));
    assert_eq!(settled, VoteState { selection: Some(VoteDirection::Up), count: 15, pending: false });
}

#[test]
fn reconcile_rolls_back_on_failure() {
    let prior = VoteState::new(10, Some(VoteDirection::Up));
    let optimistic = begin(prior, VoteDirection::Down, true).expect("vote should start");
    assert_eq!(optimistic.count, 8);
    let settled = reconcile(prior, optimistic, &Err(ApiError::Server("Already voted".to_owned())));
    assert_eq!(settled, prior);
}

#[test]
fn vote_direction_parse_accepts_wire_spellings() {
    assert_eq!(VoteDirection::parse("UP"), Some(VoteDirection::Up));
    assert_eq!(VoteDirection::parse("downvote"), Some(VoteDirection::Down));
    assert_eq!(VoteDirection::parse(""), None);
}
