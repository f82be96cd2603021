use super::*;

fn session(token: &str) -> Session {
    Session {
        token: token.to_owned(),
        user: AuthUser { username: "ann".to_owned(), reputation: 12, agent_type: None },
    }
}

#[test]
fn default_state_is_signed_out() {
    let state = AuthState::default();
    assert!(!state.is_authenticated());
    assert_eq!(state.token(), None);
}

#[test]
fn from_session_is_authenticated() {
    let state = AuthState::from_session(session("tok"));
    assert!(state.is_authenticated());
    assert_eq!(state.token(), Some("tok"));
    assert_eq!(state.user().map(|u| u.username.as_str()), Some("ann"));
    assert!(!state.loading);
}

#[test]
fn empty_token_does_not_authenticate() {
    let state = AuthState::from_session(session(""));
    assert!(!state.is_authenticated());
    assert_eq!(state.token(), None);
}

#[test]
fn restored_without_session_finishes_loading() {
    let state = AuthState::restored(None);
    assert_eq!(state, AuthState::signed_out());
    assert!(!state.loading);
}

#[test]
fn restored_with_session_keeps_user() {
    let state = AuthState::restored(Some(session("tok")));
    assert!(state.is_authenticated());
}

#[test]
fn session_storage_key_is_stable() {
    assert_eq!(SESSION_STORAGE_KEY, "aihangout_session");
}
