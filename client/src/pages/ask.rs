//! Ask-a-question page. Requires a session.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::net::api::ApiClient;
use crate::net::types::Category;
use crate::state::forms::ProblemDraft;
use crate::util::auth::install_unauth_redirect;

#[component]
pub fn AskPage() -> impl IntoView {
    let api = expect_context::<ApiClient>();
    let navigate = use_navigate();
    install_unauth_redirect(api.auth().state(), navigate.clone());

    let draft = RwSignal::new(ProblemDraft::default());
    let categories = RwSignal::new(Vec::<Category>::new());
    let error = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);

    #[cfg(feature = "hydrate")]
    leptos::task::spawn_local(async move {
        match api.list_categories().await {
            Ok(list) => {
                let _ = categories.try_set(list);
            }
            Err(e) => leptos::logging::warn!("category fetch failed: {e}"),
        }
    });

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        let problem = match draft.with_untracked(ProblemDraft::validate) {
            Ok(problem) => problem,
            Err(e) => {
                error.set(Some(e.to_string()));
                return;
            }
        };
        error.set(None);
        busy.set(true);

        #[cfg(feature = "hydrate")]
        {
            let navigate = navigate.clone();
            leptos::task::spawn_local(async move {
                match api.create_problem(&problem).await {
                    Ok(created) => navigate(&format!("/problems/{}", created.id), Default::default()),
                    Err(e) => {
                        let _ = error.try_set(Some(e.user_message()));
                        let _ = busy.try_set(false);
                    }
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        let _ = problem;
    };

    view! {
        <div class="ask-page">
            <h1>"Ask a question"</h1>
            <form class="ask-form" on:submit=on_submit>
                <label class="form-field">
                    <span>"Title"</span>
                    <input
                        type="text"
                        prop:value=move || draft.with(|d| d.title.clone())
                        on:input=move |ev| draft.update(|d| d.title = event_target_value(&ev))
                    />
                    <small
                        class="form-field__hint"
                        class:form-field__hint--over=move || draft.with(ProblemDraft::title_chars_left) < 0
                    >
                        {move || format!("{} characters left", draft.with(ProblemDraft::title_chars_left))}
                    </small>
                </label>
                <label class="form-field">
                    <span>"Category"</span>
                    <select on:change=move |ev| draft.update(|d| d.category = event_target_value(&ev))>
                        <option value="">"None"</option>
                        {move || {
                            categories
                                .get()
                                .into_iter()
                                .map(|c| view! { <option value=c.id.clone()>{c.name}</option> })
                                .collect::<Vec<_>>()
                        }}
                    </select>
                </label>
                <label class="form-field">
                    <span>"Description"</span>
                    <textarea
                        rows="10"
                        prop:value=move || draft.with(|d| d.description.clone())
                        on:input=move |ev| draft.update(|d| d.description = event_target_value(&ev))
                    ></textarea>
                </label>
                <Show when=move || error.get().is_some()>
                    <p class="form-error">{move || error.get().unwrap_or_default()}</p>
                </Show>
                <button class="btn btn--primary" type="submit" disabled=move || busy.get()>
                    {move || if busy.get() { "Posting..." } else { "Post question" }}
                </button>
            </form>
        </div>
    }
}
