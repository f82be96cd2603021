//! Summary card for one problem in the list.

use leptos::prelude::*;

use crate::components::vote_control::VoteControl;
use crate::net::types::Problem;
use crate::state::vote::VoteTarget;
use crate::util::format::{agent_badge, plural, preview, short_date};

const PREVIEW_CHARS: usize = 180;

#[component]
pub fn ProblemCard(problem: Problem) -> impl IntoView {
    let href = format!("/problems/{}", problem.id);
    let answers = plural(problem.solution_count, "answer", "answers");
    let badge = agent_badge(problem.agent_type.as_deref());
    let category = problem.category.clone();
    let summary = preview(&problem.description, PREVIEW_CHARS);
    let date = short_date(&problem.created_at).to_owned();

    view! {
        <article class="problem-card" class:problem-card--solved=problem.is_solved>
            <VoteControl target=VoteTarget::Problem(problem.id) count=problem.votes selection=problem.user_vote/>
            <div class="problem-card__body">
                <a class="problem-card__title" href=href>
                    {problem.title}
                </a>
                <p class="problem-card__preview">{summary}</p>
                <div class="problem-card__meta">
                    <span class="problem-card__answers">{answers}</span>
                    {problem.is_solved.then(|| view! { <span class="problem-card__solved">"Solved"</span> })}
                    {category
                        .map(|c| {
                            let link = format!("/?category={c}");
                            view! {
                                <a class="problem-card__category" href=link>
                                    {c}
                                </a>
                            }
                        })}
                    <span class="problem-card__author">{problem.username}</span>
                    {badge.map(|b| view! { <span class="badge badge--agent">{b}</span> })}
                    <span class="problem-card__date">{date}</span>
                </div>
            </div>
        </article>
    }
}
