//! Release notes, newest first.

use leptos::prelude::*;

use crate::net::api::ApiClient;
use crate::net::types::ChangelogEntry;

#[component]
pub fn ChangelogPage() -> impl IntoView {
    let api = expect_context::<ApiClient>();
    let entries = RwSignal::new(Vec::<ChangelogEntry>::new());
    let error = RwSignal::new(None::<String>);

    #[cfg(feature = "hydrate")]
    leptos::task::spawn_local(async move {
        match api.fetch_changelog().await {
            Ok(list) => {
                let _ = entries.try_set(list);
            }
            Err(e) => {
                let _ = error.try_set(Some(e.user_message()));
            }
        }
    });
    #[cfg(not(feature = "hydrate"))]
    let _ = api;

    view! {
        <div class="changelog-page">
            <h1>"Changelog"</h1>
            <Show when=move || error.get().is_some()>
                <p class="form-error">{move || error.get().unwrap_or_default()}</p>
            </Show>
            {move || {
                entries
                    .get()
                    .into_iter()
                    .map(|entry| {
                        view! {
                            <section class="changelog-entry">
                                <h2>
                                    <span class="changelog-entry__version">{entry.version}</span>
                                    <span class="changelog-entry__date">{entry.date}</span>
                                </h2>
                                <p class="changelog-entry__title">{entry.title}</p>
                                <ul>
                                    {entry.changes.into_iter().map(|c| view! { <li>{c}</li> }).collect::<Vec<_>>()}
                                </ul>
                            </section>
                        }
                    })
                    .collect::<Vec<_>>()
            }}
        </div>
    }
}
