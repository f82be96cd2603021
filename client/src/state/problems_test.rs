use super::*;

fn problem(id: i64) -> Problem {
    serde_json::from_value(serde_json::json!({ "id": id, "title": format!("p{id}") })).expect("problem")
}

fn solution(id: i64, votes: i64, accepted: bool) -> Solution {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "content": "answer",
        "votes": votes,
        "is_accepted": accepted
    }))
    .expect("solution")
}

fn value<'a>(pairs: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
}

// =============================================================
// Filters
// =============================================================

#[test]
fn default_query_sends_limit_offset_and_sort_only() {
    let pairs = ProblemFilters::default().query_pairs();
    assert_eq!(value(&pairs, "limit"), Some("20"));
    assert_eq!(value(&pairs, "offset"), Some("0"));
    assert_eq!(value(&pairs, "sort"), Some("newest"));
    assert_eq!(value(&pairs, "category"), None);
    assert_eq!(value(&pairs, "search"), None);
    assert_eq!(value(&pairs, "status"), None);
    assert_eq!(value(&pairs, "author_type"), None);
}

#[test]
fn query_includes_every_active_filter() {
    let filters = ProblemFilters {
        category: Some("rust".to_owned()),
        search: "  lifetimes ".to_owned(),
        sort: ProblemSort::Votes,
        status: SolutionStatus::Unsolved,
        author: AuthorFilter::Agent,
        page: 2,
    };
    let pairs = filters.query_pairs();
    assert_eq!(value(&pairs, "offset"), Some("40"));
    assert_eq!(value(&pairs, "category"), Some("rust"));
    assert_eq!(value(&pairs, "search"), Some("lifetimes"));
    assert_eq!(value(&pairs, "sort"), Some("votes"));
    assert_eq!(value(&pairs, "status"), Some("unsolved"));
    assert_eq!(value(&pairs, "author_type"), Some("agent"));
}

#[test]
fn filter_setters_reset_page() {
    let mut filters = ProblemFilters { page: 3, ..ProblemFilters::default() };
    filters.set_sort(ProblemSort::Unanswered);
    assert_eq!(filters.page, 0);

    filters.page = 3;
    filters.set_category(Some(String::new()));
    assert_eq!(filters.page, 0);
    assert_eq!(filters.category, None);

    filters.page = 1;
    filters.set_author(AuthorFilter::Human);
    assert_eq!(filters.page, 0);
}

#[test]
fn from_query_reads_known_values_and_ignores_junk() {
    let filters = ProblemFilters::from_query(|key| {
        match key {
            "category" => Some("python"),
            "sort" => Some("bogus"),
            "status" => Some("solved"),
            "author_type" => Some("robot"),
            _ => None,
        }
        .map(str::to_owned)
    });
    assert_eq!(filters.category.as_deref(), Some("python"));
    assert_eq!(filters.sort, ProblemSort::Newest);
    assert_eq!(filters.status, SolutionStatus::Solved);
    assert_eq!(filters.author, AuthorFilter::Any);
}

// =============================================================
// List state
// =============================================================

#[test]
fn stale_list_response_is_dropped() {
    let mut state = ProblemListState::default();
    let first = state.begin_load();
    let second = state.begin_load();

    let applied = state.finish_load(first, Ok(ProblemPage { problems: vec![problem(1)], total: 1 }));
    assert!(!applied);
    assert!(state.loading);

    assert!(state.finish_load(second, Ok(ProblemPage { problems: vec![problem(2)], total: 1 })));
    assert_eq!(state.problems.len(), 1);
    assert_eq!(state.problems[0].id, 2);
    assert!(!state.loading);
}

#[test]
fn list_failure_surfaces_message_and_clears_items() {
    let mut state = ProblemListState::default();
    let seq = state.begin_load();
    state.finish_load(seq, Ok(ProblemPage { problems: vec![problem(1)], total: 1 }));
    let seq = state.begin_load();
    state.finish_load(seq, Err(ApiError::Server("boom".to_owned())));
    assert!(state.problems.is_empty());
    assert_eq!(state.error.as_deref(), Some("boom"));
}

#[test]
fn pagination_is_bounded_by_total() {
    let mut state = ProblemListState { total: 45, ..ProblemListState::default() };
    assert_eq!(state.page_count(), 3);
    assert!(!state.has_previous());
    state.next_page();
    state.next_page();
    assert_eq!(state.filters.page, 2);
    assert!(!state.has_next());
    state.next_page();
    assert_eq!(state.filters.page, 2);
    state.previous_page();
    assert_eq!(state.filters.page, 1);
}

#[test]
fn empty_list_still_has_one_page() {
    let state = ProblemListState::default();
    assert_eq!(state.page_count(), 1);
    assert!(!state.has_next());
}

// =============================================================
// Detail state
// =============================================================

#[test]
fn order_solutions_puts_accepted_first_then_votes() {
    let mut list = vec![solution(1, 5, false), solution(2, 1, true), solution(3, 9, false)];
    order_solutions(&mut list);
    let ids: Vec<i64> = list.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![2, 3, 1]);
}

#[test]
fn push_solution_appends_once_and_updates_count() {
    let mut state = ProblemDetailState::default();
    state.apply(Ok(ProblemDetail { problem: problem(7), solutions: vec![solution(1, 2, false)] }));
    state.push_solution(solution(2, 0, false));
    state.push_solution(solution(2, 0, false));
    let detail = state.detail.as_ref().expect("detail loaded");
    assert_eq!(detail.solutions.len(), 2);
    assert_eq!(detail.problem.solution_count, 2);
}

#[test]
fn detail_failure_clears_detail() {
    let mut state = ProblemDetailState { loading: true, ..ProblemDetailState::default() };
    state.apply(Err(ApiError::Status(404)));
    assert!(state.detail.is_none());
    assert_eq!(state.error.as_deref(), Some("Request failed (404)."));
    assert!(!state.loading);
}
