use super::*;

#[test]
fn post_login_path_defaults_to_home() {
    assert_eq!(post_login_path(None), "/");
    assert_eq!(post_login_path(Some("")), "/");
}

#[test]
fn post_login_path_keeps_local_paths() {
    assert_eq!(post_login_path(Some("/ask")), "/ask");
    assert_eq!(post_login_path(Some("/problems/7")), "/problems/7");
}

#[test]
fn post_login_path_rejects_other_origins() {
    assert_eq!(post_login_path(Some("https://evil.example")), "/");
    assert_eq!(post_login_path(Some("//evil.example/ask")), "/");
}
