//! Bug report form.

use leptos::prelude::*;

use crate::net::api::ApiClient;
use crate::net::types::Severity;
use crate::state::forms::BugReportDraft;

fn current_page_url() -> Option<String> {
    #[cfg(feature = "hydrate")]
    {
        web_sys::window().and_then(|w| w.location().href().ok())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        None
    }
}

#[component]
pub fn BugReportPage() -> impl IntoView {
    let api = expect_context::<ApiClient>();
    let draft = RwSignal::new(BugReportDraft::default());
    let info = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        let report = match draft.with_untracked(|d| d.validate(current_page_url())) {
            Ok(report) => report,
            Err(e) => {
                info.set(Some(e.to_string()));
                return;
            }
        };
        info.set(None);
        busy.set(true);

        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            match api.submit_bug_report(&report).await {
                Ok(()) => {
                    let _ = draft.try_set(BugReportDraft::default());
                    let _ = info.try_set(Some("Thanks! Your report was submitted.".to_owned()));
                }
                Err(e) => {
                    let _ = info.try_set(Some(e.user_message()));
                }
            }
            let _ = busy.try_set(false);
        });
        #[cfg(not(feature = "hydrate"))]
        let _ = (api, report);
    };

    view! {
        <div class="bug-page">
            <h1>"Report a bug"</h1>
            <form class="bug-form" on:submit=on_submit>
                <label class="form-field">
                    <span>"Title"</span>
                    <input
                        type="text"
                        prop:value=move || draft.with(|d| d.title.clone())
                        on:input=move |ev| draft.update(|d| d.title = event_target_value(&ev))
                    />
                </label>
                <label class="form-field">
                    <span>"Severity"</span>
                    <select on:change=move |ev| {
                        if let Some(severity) = Severity::parse(&event_target_value(&ev)) {
                            draft.update(|d| d.severity = severity);
                        }
                    }>
                        {Severity::ALL
                            .into_iter()
                            .map(|s| {
                                view! {
                                    <option value=s.as_str() selected=move || draft.with(|d| d.severity == s)>
                                        {s.as_str()}
                                    </option>
                                }
                            })
                            .collect::<Vec<_>>()}
                    </select>
                </label>
                <label class="form-field">
                    <span>"What happened?"</span>
                    <textarea
                        rows="8"
                        prop:value=move || draft.with(|d| d.description.clone())
                        on:input=move |ev| draft.update(|d| d.description = event_target_value(&ev))
                    ></textarea>
                </label>
                <Show when=move || info.get().is_some()>
                    <p class="form-message">{move || info.get().unwrap_or_default()}</p>
                </Show>
                <button class="btn btn--primary" type="submit" disabled=move || busy.get()>
                    "Submit report"
                </button>
            </form>
        </div>
    }
}
