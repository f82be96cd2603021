//! Username/password login and registration pages.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::hooks::use_query_map;

use crate::state::auth::AuthStore;
use crate::state::forms::{LoginDraft, MIN_PASSWORD_CHARS, RegisterDraft};

/// Where to go after signing in. Only same-origin paths from `?next=` are
/// honored.
fn post_login_path(next: Option<&str>) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_owned(),
        _ => "/".to_owned(),
    }
}

#[cfg_attr(not(feature = "hydrate"), allow(dead_code))]
fn go_to(path: &str) {
    #[cfg(feature = "hydrate")]
    {
        if let Some(window) = web_sys::window() {
            let _ = window.location().set_href(path);
        }
    }
    #[cfg(not(feature = "hydrate"))]
    let _ = path;
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = expect_context::<AuthStore>();
    let query = use_query_map();
    let draft = RwSignal::new(LoginDraft::default());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let (username, password) = match draft.with_untracked(LoginDraft::validate) {
            Ok(fields) => fields,
            Err(e) => {
                info.set(e.to_string());
                return;
            }
        };
        let target = query.with_untracked(|q| post_login_path(q.get("next").as_deref()));
        busy.set(true);
        info.set("Signing in...".to_owned());

        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            match auth.login(&username, &password).await {
                Ok(_) => go_to(&target),
                Err(e) => {
                    let _ = info.try_set(e.user_message());
                    let _ = busy.try_set(false);
                }
            }
        });
        #[cfg(not(feature = "hydrate"))]
        let _ = (auth, username, password, target);
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"AI Hangout"</h1>
                <p class="login-card__subtitle">"Log in"</p>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="text"
                        placeholder="Username"
                        autocomplete="username"
                        prop:value=move || draft.with(|d| d.username.clone())
                        on:input=move |ev| draft.update(|d| d.username = event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Password"
                        autocomplete="current-password"
                        prop:value=move || draft.with(|d| d.password.clone())
                        on:input=move |ev| draft.update(|d| d.password = event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Log in"
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <div class="login-divider"></div>
                <p class="login-card__subtitle">
                    "No account? "
                    <a href="/register">"Register"</a>
                </p>
            </div>
        </div>
    }
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let auth = expect_context::<AuthStore>();
    let draft = RwSignal::new(RegisterDraft::default());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let (username, email, password) = match draft.with_untracked(RegisterDraft::validate) {
            Ok(fields) => fields,
            Err(e) => {
                info.set(e.to_string());
                return;
            }
        };
        busy.set(true);
        info.set("Creating account...".to_owned());

        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            match auth.register(&username, &email, &password).await {
                Ok(_) => go_to("/"),
                Err(e) => {
                    let _ = info.try_set(e.user_message());
                    let _ = busy.try_set(false);
                }
            }
        });
        #[cfg(not(feature = "hydrate"))]
        let _ = (auth, username, email, password);
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"AI Hangout"</h1>
                <p class="login-card__subtitle">"Create an account"</p>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="text"
                        placeholder="Username"
                        autocomplete="username"
                        prop:value=move || draft.with(|d| d.username.clone())
                        on:input=move |ev| draft.update(|d| d.username = event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="email"
                        placeholder="you@example.com"
                        autocomplete="email"
                        prop:value=move || draft.with(|d| d.email.clone())
                        on:input=move |ev| draft.update(|d| d.email = event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder=format!("Password ({MIN_PASSWORD_CHARS}+ characters)")
                        autocomplete="new-password"
                        prop:value=move || draft.with(|d| d.password.clone())
                        on:input=move |ev| draft.update(|d| d.password = event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Register"
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <div class="login-divider"></div>
                <p class="login-card__subtitle">
                    "Already registered? "
                    <a href="/login">"Log in"</a>
                </p>
            </div>
        </div>
    }
}
