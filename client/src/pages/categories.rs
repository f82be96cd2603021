//! Category index. Each entry links to the filtered problem list.

use leptos::prelude::*;

use crate::net::api::ApiClient;
use crate::net::types::Category;
use crate::util::format::plural;

#[component]
pub fn CategoriesPage() -> impl IntoView {
    let api = expect_context::<ApiClient>();
    let categories = RwSignal::new(Vec::<Category>::new());
    let loading = RwSignal::new(true);
    let error = RwSignal::new(None::<String>);

    #[cfg(feature = "hydrate")]
    leptos::task::spawn_local(async move {
        match api.list_categories().await {
            Ok(list) => {
                let _ = categories.try_set(list);
            }
            Err(e) => {
                let _ = error.try_set(Some(e.user_message()));
            }
        }
        let _ = loading.try_set(false);
    });
    #[cfg(not(feature = "hydrate"))]
    let _ = api;

    view! {
        <div class="categories-page">
            <h1>"Categories"</h1>
            <Show when=move || loading.get()>
                <p>"Loading..."</p>
            </Show>
            <Show when=move || error.get().is_some()>
                <p class="form-error">{move || error.get().unwrap_or_default()}</p>
            </Show>
            <ul class="categories-page__list">
                {move || {
                    categories
                        .get()
                        .into_iter()
                        .map(|c| {
                            let href = format!("/?category={}", c.id);
                            view! {
                                <li class="category-item">
                                    <a href=href>{c.name}</a>
                                    <span class="category-item__count">
                                        {plural(c.problem_count, "problem", "problems")}
                                    </span>
                                    {c.description.map(|d| view! { <p class="category-item__description">{d}</p> })}
                                </li>
                            }
                        })
                        .collect::<Vec<_>>()
                }}
            </ul>
        </div>
    }
}
