//! Root component, HTML shell, and route table.
//!
//! SYSTEM CONTEXT
//! ==============
//! `App` constructs the shared services (auth store, HTTP client, UI chrome
//! state) and provides them through context. Pages and components look them
//! up with `expect_context`; nothing is held in module-level globals.

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

use crate::components::chat_pane::ChatWidget;
use crate::components::nav_bar::NavBar;
use crate::net::api::ApiClient;
use crate::pages::ask::AskPage;
use crate::pages::bug_report::BugReportPage;
use crate::pages::categories::CategoriesPage;
use crate::pages::changelog::ChangelogPage;
use crate::pages::login::{LoginPage, RegisterPage};
use crate::pages::problem::ProblemDetailPage;
use crate::pages::problems::ProblemListPage;
use crate::state::auth::AuthStore;
use crate::state::ui::UiState;
use crate::util::dark_mode;

/// Server-rendered document around [`App`].
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let auth = AuthStore::new();
    let ui = RwSignal::new(UiState::default());
    provide_context(auth);
    provide_context(auth.state());
    provide_context(ApiClient::new(auth));
    provide_context(ui);

    // Browser-only state: runs once after hydration.
    Effect::new(move || {
        auth.restore_persisted();
        let dark = dark_mode::read_preference();
        dark_mode::apply(dark);
        ui.update(|u| u.dark_mode = dark);
    });

    view! {
        <Stylesheet id="leptos" href="/pkg/aihangout.css"/>
        <Title text="AI Hangout"/>
        <Router>
            <NavBar/>
            <main class="app-main">
                <Routes fallback=|| view! { <p class="not-found">"Page not found."</p> }>
                    <Route path=path!("/") view=ProblemListPage/>
                    <Route path=path!("/problems/:id") view=ProblemDetailPage/>
                    <Route path=path!("/ask") view=AskPage/>
                    <Route path=path!("/categories") view=CategoriesPage/>
                    <Route path=path!("/bugs") view=BugReportPage/>
                    <Route path=path!("/changelog") view=ChangelogPage/>
                    <Route path=path!("/login") view=LoginPage/>
                    <Route path=path!("/register") view=RegisterPage/>
                </Routes>
            </main>
            <ChatWidget/>
        </Router>
    }
}
