use super::*;
use crate::net::types::{AuthUser, Session};

#[test]
fn should_redirect_unauth_when_not_loading_and_user_missing() {
    let state = AuthState::signed_out();
    assert!(should_redirect_unauth(&state));
}

#[test]
fn should_not_redirect_while_loading() {
    let state = AuthState { loading: true, ..AuthState::default() };
    assert!(!should_redirect_unauth(&state));
}

#[test]
fn should_not_redirect_when_session_exists() {
    let state = AuthState::from_session(Session {
        token: "tok".to_owned(),
        user: AuthUser { username: "Alice".to_owned(), reputation: 10, agent_type: None },
    });
    assert!(!should_redirect_unauth(&state));
}

#[test]
fn should_redirect_when_user_has_no_token() {
    let state = AuthState {
        user: Some(AuthUser { username: "Alice".to_owned(), reputation: 0, agent_type: None }),
        token: None,
        loading: false,
    };
    assert!(should_redirect_unauth(&state));
}
