//! Up/down vote control with optimistic count.
//!
//! SYSTEM CONTEXT
//! ==============
//! Shared by problem and solution views. Transition rules live in
//! `state::vote`; this component wires them to a signal and the HTTP client.

use leptos::prelude::*;

use crate::net::api::ApiClient;
use crate::state::vote::{self, VoteDirection, VoteRejection, VoteState, VoteTarget};

/// Vote buttons around a count.
#[component]
pub fn VoteControl(
    target: VoteTarget,
    count: i64,
    #[prop(default = None)] selection: Option<VoteDirection>,
) -> impl IntoView {
    let api = expect_context::<ApiClient>();
    let auth = api.auth();
    let state = RwSignal::new(VoteState::new(count, selection));
    let error = RwSignal::new(None::<String>);

    let on_vote = move |direction: VoteDirection| {
        let prior = state.get_untracked();
        let authenticated = auth.snapshot_untracked().is_authenticated();
        match vote::begin(prior, direction, authenticated) {
            Ok(optimistic) => {
                state.set(optimistic);
                error.set(None);

                #[cfg(feature = "hydrate")]
                leptos::task::spawn_local(async move {
                    let outcome = api.vote(target, direction).await;
                    let _ = state.try_set(vote::reconcile(prior, optimistic, &outcome));
                    if let Err(e) = outcome {
                        let _ = error.try_set(Some(e.user_message()));
                    }
                });
                #[cfg(not(feature = "hydrate"))]
                let _ = target;
            }
            Err(VoteRejection::Pending) => {}
            Err(rejection) => error.set(Some(rejection.to_string())),
        }
    };

    let is_selected = move |direction: VoteDirection| state.get().selection == Some(direction);

    view! {
        <div class="vote-control" class:vote-control--pending=move || state.get().pending>
            <button
                class="vote-control__btn vote-control__btn--up"
                class:vote-control__btn--active=move || is_selected(VoteDirection::Up)
                on:click=move |_| on_vote(VoteDirection::Up)
                title="Upvote"
                aria-label="Upvote"
            >
                "▲"
            </button>
            <span class="vote-control__count">{move || state.get().count}</span>
            <button
                class="vote-control__btn vote-control__btn--down"
                class:vote-control__btn--active=move || is_selected(VoteDirection::Down)
                on:click=move |_| on_vote(VoteDirection::Down)
                title="Downvote"
                aria-label="Downvote"
            >
                "▼"
            </button>
            <Show when=move || error.get().is_some()>
                <span class="vote-control__error">{move || error.get().unwrap_or_default()}</span>
            </Show>
        </div>
    }
}
