//! Problem list page with filters and pagination.
//!
//! SYSTEM CONTEXT
//! ==============
//! This is the landing route. The initial filters come from the URL query so
//! category links (`/?category=rust`) land on a filtered list.

use leptos::prelude::*;
use leptos_router::hooks::use_query_map;

use crate::components::problem_card::ProblemCard;
use crate::net::api::ApiClient;
use crate::state::problems::{AuthorFilter, ProblemFilters, ProblemListState, ProblemSort, SolutionStatus};

#[component]
pub fn ProblemListPage() -> impl IntoView {
    let api = expect_context::<ApiClient>();
    let query = use_query_map();
    let initial = query.with_untracked(|q| ProblemFilters::from_query(|key| q.get(key)));
    let search_draft = RwSignal::new(initial.search.clone());
    let list = RwSignal::new(ProblemListState::new(initial));

    // Follow category links while already on this page.
    Effect::new(move || {
        let category = query.with(|q| q.get("category"));
        list.update(|s| {
            if s.filters.category != category {
                s.filters.set_category(category);
            }
        });
    });

    let filters = Memo::new(move |_| list.with(|s| s.filters.clone()));
    Effect::new(move || {
        let filters = filters.get();
        let Some(seq) = list.try_update(ProblemListState::begin_load) else {
            return;
        };
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            let result = api.list_problems(&filters).await;
            let _ = list.try_update(|s| s.finish_load(seq, result));
        });
        #[cfg(not(feature = "hydrate"))]
        let _ = (api, filters, seq);
    });

    let on_search = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let text = search_draft.get_untracked();
        list.update(|s| s.filters.set_search(text));
    };

    view! {
        <div class="problems-page">
            <header class="problems-page__header">
                <h1>
                    {move || {
                        list.with(|s| s.filters.category.clone())
                            .map_or_else(|| "All problems".to_owned(), |c| format!("Problems in {c}"))
                    }}
                </h1>
                <a class="btn btn--primary" href="/ask">
                    "Ask a question"
                </a>
            </header>

            <div class="problems-page__filters">
                <form class="problems-page__search" on:submit=on_search>
                    <input
                        type="search"
                        placeholder="Search problems"
                        prop:value=move || search_draft.get()
                        on:input=move |ev| search_draft.set(event_target_value(&ev))
                    />
                    <button class="btn" type="submit">
                        "Search"
                    </button>
                </form>
                <select on:change=move |ev| {
                    if let Some(sort) = ProblemSort::parse(&event_target_value(&ev)) {
                        list.update(|s| s.filters.set_sort(sort));
                    }
                }>
                    {ProblemSort::ALL
                        .into_iter()
                        .map(|sort| {
                            view! {
                                <option
                                    value=sort.as_str()
                                    selected=move || list.with(|s| s.filters.sort == sort)
                                >
                                    {sort.label()}
                                </option>
                            }
                        })
                        .collect::<Vec<_>>()}
                </select>
                <select on:change=move |ev| {
                    let status = SolutionStatus::parse(&event_target_value(&ev));
                    list.update(|s| s.filters.set_status(status));
                }>
                    {SolutionStatus::ALL
                        .into_iter()
                        .map(|status| {
                            view! {
                                <option
                                    value=status.as_param().unwrap_or_default()
                                    selected=move || list.with(|s| s.filters.status == status)
                                >
                                    {status.label()}
                                </option>
                            }
                        })
                        .collect::<Vec<_>>()}
                </select>
                <select on:change=move |ev| {
                    let author = AuthorFilter::parse(&event_target_value(&ev));
                    list.update(|s| s.filters.set_author(author));
                }>
                    {AuthorFilter::ALL
                        .into_iter()
                        .map(|author| {
                            view! {
                                <option
                                    value=author.as_param().unwrap_or_default()
                                    selected=move || list.with(|s| s.filters.author == author)
                                >
                                    {author.label()}
                                </option>
                            }
                        })
                        .collect::<Vec<_>>()}
                </select>
                <Show when=move || list.with(|s| s.filters.category.is_some())>
                    <button class="btn" on:click=move |_| list.update(|s| s.filters.set_category(None))>
                        "Clear category"
                    </button>
                </Show>
            </div>

            <Show when=move || list.with(|s| s.error.is_some())>
                <p class="problems-page__error">{move || list.with(|s| s.error.clone()).unwrap_or_default()}</p>
            </Show>

            <Show
                when=move || !list.with(|s| s.loading)
                fallback=move || view! { <p class="problems-page__loading">"Loading problems..."</p> }
            >
                <Show
                    when=move || list.with(|s| !s.problems.is_empty())
                    fallback=move || view! { <p class="problems-page__empty">"No problems match these filters."</p> }
                >
                    <div class="problems-page__list">
                        {move || {
                            list.with(|s| s.problems.clone())
                                .into_iter()
                                .map(|problem| view! { <ProblemCard problem=problem/> })
                                .collect::<Vec<_>>()
                        }}
                    </div>
                </Show>
            </Show>

            <nav class="pager">
                <button
                    class="btn"
                    disabled=move || !list.with(ProblemListState::has_previous)
                    on:click=move |_| list.update(ProblemListState::previous_page)
                >
                    "Previous"
                </button>
                <span class="pager__status">
                    {move || list.with(|s| format!("Page {} of {} ({} total)", s.filters.page + 1, s.page_count(), s.total))}
                </span>
                <button
                    class="btn"
                    disabled=move || !list.with(ProblemListState::has_next)
                    on:click=move |_| list.update(ProblemListState::next_page)
                >
                    "Next"
                </button>
            </nav>
        </div>
    }
}
