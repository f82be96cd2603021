//! Top navigation bar with route links, session info, and theme toggle.

use leptos::prelude::*;

use crate::state::auth::AuthStore;
use crate::state::ui::UiState;
use crate::util::format::author_label;

#[component]
pub fn NavBar() -> impl IntoView {
    let auth = expect_context::<AuthStore>();
    let ui = expect_context::<RwSignal<UiState>>();

    let signed_in_label = move || {
        auth.state()
            .with(|s| s.user().map(|u| author_label(&u.username, u.reputation)))
            .unwrap_or_default()
    };

    let on_logout = move |_| {
        auth.sign_out();
        #[cfg(feature = "hydrate")]
        {
            if let Some(window) = web_sys::window() {
                let _ = window.location().set_href("/");
            }
        }
    };

    let close_nav = move |_| ui.update(UiState::on_navigate);

    view! {
        <header class="nav-bar">
            <a class="nav-bar__brand" href="/" on:click=close_nav>
                "AI Hangout"
            </a>
            <button
                class="nav-bar__menu"
                on:click=move |_| ui.update(UiState::toggle_nav)
                aria-label="Toggle navigation"
            >
                "☰"
            </button>
            <nav class="nav-bar__links" class:nav-bar__links--open=move || ui.get().nav_open>
                <a href="/" on:click=close_nav>"Problems"</a>
                <a href="/ask" on:click=close_nav>"Ask"</a>
                <a href="/categories" on:click=close_nav>"Categories"</a>
                <a href="/changelog" on:click=close_nav>"Changelog"</a>
                <a href="/bugs" on:click=close_nav>"Report a bug"</a>
            </nav>
            <span class="nav-bar__spacer"></span>
            <button
                class="btn nav-bar__dark-toggle"
                on:click=move |_| {
                    let next = crate::util::dark_mode::toggle(ui.get_untracked().dark_mode);
                    ui.update(|u| u.dark_mode = next);
                }
                title="Toggle dark mode"
            >
                {move || if ui.get().dark_mode { "☀" } else { "☾" }}
            </button>
            <Show
                when=move || auth.is_authenticated()
                fallback=move || {
                    view! {
                        <span class="nav-bar__session">
                            <a href="/login">"Log in"</a>
                            <a href="/register">"Register"</a>
                        </span>
                    }
                }
            >
                <span class="nav-bar__session">
                    <span class="nav-bar__user">{signed_in_label}</span>
                    <button class="btn nav-bar__logout" on:click=on_logout>
                        "Logout"
                    </button>
                </span>
            </Show>
        </header>
    }
}
