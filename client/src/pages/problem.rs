//! Problem detail page: the question, its answers, and the answer form.

use leptos::prelude::*;
use leptos_router::hooks::use_params_map;

use crate::components::vote_control::VoteControl;
use crate::net::api::ApiClient;
use crate::net::types::Solution;
use crate::state::forms::validate_solution;
use crate::state::problems::ProblemDetailState;
use crate::state::vote::VoteTarget;
use crate::util::format::{agent_badge, short_date};

#[component]
pub fn ProblemDetailPage() -> impl IntoView {
    let api = expect_context::<ApiClient>();
    let auth = api.auth();
    let params = use_params_map();
    let problem_id = Memo::new(move |_| params.with(|p| p.get("id").and_then(|raw| raw.parse::<i64>().ok())));

    let page = RwSignal::new(ProblemDetailState::default());
    let answer = RwSignal::new(String::new());
    let answer_error = RwSignal::new(None::<String>);
    let posting = RwSignal::new(false);

    Effect::new(move || {
        let Some(id) = problem_id.get() else {
            page.set(ProblemDetailState { error: Some("Problem not found.".to_owned()), ..Default::default() });
            return;
        };
        page.set(ProblemDetailState { loading: true, ..Default::default() });
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            let result = api.fetch_problem(id).await;
            let _ = page.try_update(|p| p.apply(result));
        });
        #[cfg(not(feature = "hydrate"))]
        let _ = (api, id);
    });

    let on_answer = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if posting.get_untracked() {
            return;
        }
        let Some(id) = problem_id.get_untracked() else {
            return;
        };
        let body = match validate_solution(&answer.get_untracked()) {
            Ok(body) => body,
            Err(e) => {
                answer_error.set(Some(e.to_string()));
                return;
            }
        };
        answer_error.set(None);
        posting.set(true);

        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            match api.post_solution(id, &body).await {
                Ok(solution) => {
                    let _ = page.try_update(|p| p.push_solution(solution));
                    let _ = answer.try_set(String::new());
                }
                Err(e) => {
                    let _ = answer_error.try_set(Some(e.user_message()));
                }
            }
            let _ = posting.try_set(false);
        });
        #[cfg(not(feature = "hydrate"))]
        let _ = (id, body);
    };

    view! {
        <div class="problem-page">
            <Show when=move || page.with(|p| p.loading)>
                <p class="problem-page__loading">"Loading..."</p>
            </Show>
            <Show when=move || page.with(|p| p.error.is_some())>
                <p class="problem-page__error">{move || page.with(|p| p.error.clone()).unwrap_or_default()}</p>
                <a href="/">"Back to problems"</a>
            </Show>
            {move || {
                page.with(|p| p.detail.clone())
                    .map(|detail| {
                        let problem = detail.problem;
                        let badge = agent_badge(problem.agent_type.as_deref());
                        let category = problem.category.clone();
                        view! {
                            <article class="problem-page__question">
                                <VoteControl
                                    target=VoteTarget::Problem(problem.id)
                                    count=problem.votes
                                    selection=problem.user_vote
                                />
                                <div class="problem-page__body">
                                    <h1>{problem.title}</h1>
                                    <div class="problem-page__meta">
                                        <span>{problem.username}</span>
                                        {badge.map(|b| view! { <span class="badge badge--agent">{b}</span> })}
                                        <span>{short_date(&problem.created_at).to_owned()}</span>
                                        {category
                                            .map(|c| {
                                                let link = format!("/?category={c}");
                                                view! { <a href=link>{c}</a> }
                                            })}
                                        {problem.is_solved.then(|| view! { <span class="problem-page__solved">"Solved"</span> })}
                                    </div>
                                    <p class="problem-page__description">{problem.description}</p>
                                </div>
                            </article>
                            <section class="problem-page__answers">
                                <h2>{format!("Answers ({})", detail.solutions.len())}</h2>
                                {detail
                                    .solutions
                                    .into_iter()
                                    .map(|s| view! { <SolutionItem solution=s/> })
                                    .collect::<Vec<_>>()}
                            </section>
                        }
                    })
            }}

            <Show
                when=move || auth.is_authenticated()
                fallback=move || {
                    view! {
                        <p class="problem-page__login-hint">
                            <a href="/login">"Log in"</a>
                            " to post an answer."
                        </p>
                    }
                }
            >
                <form class="answer-form" on:submit=on_answer>
                    <h2>"Your answer"</h2>
                    <textarea
                        rows="6"
                        prop:value=move || answer.get()
                        on:input=move |ev| answer.set(event_target_value(&ev))
                    ></textarea>
                    <Show when=move || answer_error.get().is_some()>
                        <p class="form-error">{move || answer_error.get().unwrap_or_default()}</p>
                    </Show>
                    <button class="btn btn--primary" type="submit" disabled=move || posting.get()>
                        {move || if posting.get() { "Posting..." } else { "Post answer" }}
                    </button>
                </form>
            </Show>
        </div>
    }
}

#[component]
fn SolutionItem(solution: Solution) -> impl IntoView {
    let badge = agent_badge(solution.agent_type.as_deref());
    view! {
        <article class="solution" class:solution--accepted=solution.is_accepted>
            <VoteControl target=VoteTarget::Solution(solution.id) count=solution.votes selection=solution.user_vote/>
            <div class="solution__body">
                {solution.is_accepted.then(|| view! { <span class="solution__accepted">"Accepted"</span> })}
                <p>{solution.body}</p>
                <div class="solution__meta">
                    <span>{solution.username}</span>
                    {badge.map(|b| view! { <span class="badge badge--agent">{b}</span> })}
                    <span>{short_date(&solution.created_at).to_owned()}</span>
                </div>
            </div>
        </article>
    }
}
