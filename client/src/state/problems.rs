//! Problem list filters, pagination, and detail-view state.
//!
//! DESIGN
//! ======
//! `ProblemFilters` is the single source for the list query. Every filter
//! setter resets pagination, and `query_pairs` is what the HTTP client sends.
//! List loads are tagged with a request sequence so a slow response for an
//! old filter never overwrites a newer one.

#[cfg(test)]
#[path = "problems_test.rs"]
mod problems_test;

use crate::net::api::ApiError;
use crate::net::types::{Problem, ProblemDetail, ProblemPage, Solution};

/// Problems per list page.
pub const PAGE_SIZE: u64 = 20;

/// List ordering understood by `GET /api/problems`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProblemSort {
    #[default]
    Newest,
    Votes,
    Unanswered,
}

impl ProblemSort {
    pub const ALL: [Self; 3] = [Self::Newest, Self::Votes, Self::Unanswered];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Votes => "votes",
            Self::Unanswered => "unanswered",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Newest => "Newest",
            Self::Votes => "Most votes",
            Self::Unanswered => "Unanswered",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }
}

/// Solved/unsolved filter; `Any` omits the parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SolutionStatus {
    #[default]
    Any,
    Solved,
    Unsolved,
}

impl SolutionStatus {
    pub const ALL: [Self; 3] = [Self::Any, Self::Solved, Self::Unsolved];

    pub fn as_param(self) -> Option<&'static str> {
        match self {
            Self::Any => None,
            Self::Solved => Some("solved"),
            Self::Unsolved => Some("unsolved"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Any => "All",
            Self::Solved => "Solved",
            Self::Unsolved => "Unsolved",
        }
    }

    pub fn parse(raw: &str) -> Self {
        Self::ALL.into_iter().find(|s| s.as_param() == Some(raw)).unwrap_or_default()
    }
}

/// Author-type filter; `Any` omits the parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthorFilter {
    #[default]
    Any,
    Human,
    Agent,
}

impl AuthorFilter {
    pub const ALL: [Self; 3] = [Self::Any, Self::Human, Self::Agent];

    pub fn as_param(self) -> Option<&'static str> {
        match self {
            Self::Any => None,
            Self::Human => Some("human"),
            Self::Agent => Some("agent"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Any => "Everyone",
            Self::Human => "Humans",
            Self::Agent => "AI agents",
        }
    }

    pub fn parse(raw: &str) -> Self {
        Self::ALL.into_iter().find(|a| a.as_param() == Some(raw)).unwrap_or_default()
    }
}

/// Current list query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProblemFilters {
    pub category: Option<String>,
    pub search: String,
    pub sort: ProblemSort,
    pub status: SolutionStatus,
    pub author: AuthorFilter,
    /// Zero-based page index.
    pub page: u64,
}

impl ProblemFilters {
    /// Build from URL query values (`category`, `search`, `sort`, `status`, `author_type`).
    pub fn from_query(get: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            category: get("category").map(|c| c.trim().to_owned()).filter(|c| !c.is_empty()),
            search: get("search").unwrap_or_default().trim().to_owned(),
            sort: get("sort").as_deref().and_then(ProblemSort::parse).unwrap_or_default(),
            status: get("status").as_deref().map(SolutionStatus::parse).unwrap_or_default(),
            author: get("author_type").as_deref().map(AuthorFilter::parse).unwrap_or_default(),
            page: 0,
        }
    }

    pub fn offset(&self) -> u64 {
        self.page * PAGE_SIZE
    }

    /// Query parameters for `GET /api/problems`; empty filters are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("limit", PAGE_SIZE.to_string()), ("offset", self.offset().to_string())];
        if let Some(category) = self.category.as_deref() {
            pairs.push(("category", category.to_owned()));
        }
        let search = self.search.trim();
        if !search.is_empty() {
            pairs.push(("search", search.to_owned()));
        }
        pairs.push(("sort", self.sort.as_str().to_owned()));
        if let Some(status) = self.status.as_param() {
            pairs.push(("status", status.to_owned()));
        }
        if let Some(author) = self.author.as_param() {
            pairs.push(("author_type", author.to_owned()));
        }
        pairs
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.category = category.filter(|c| !c.is_empty());
        self.page = 0;
    }

    pub fn set_search(&mut self, search: String) {
        self.search = search;
        self.page = 0;
    }

    pub fn set_sort(&mut self, sort: ProblemSort) {
        self.sort = sort;
        self.page = 0;
    }

    pub fn set_status(&mut self, status: SolutionStatus) {
        self.status = status;
        self.page = 0;
    }

    pub fn set_author(&mut self, author: AuthorFilter) {
        self.author = author;
        self.page = 0;
    }
}

/// State behind the problem list page.
#[derive(Clone, Debug, Default)]
pub struct ProblemListState {
    pub filters: ProblemFilters,
    pub problems: Vec<Problem>,
    pub total: u64,
    pub loading: bool,
    pub error: Option<String>,
    request_seq: u64,
}

impl ProblemListState {
    pub fn new(filters: ProblemFilters) -> Self {
        Self { filters, ..Self::default() }
    }

    /// Mark a load as started and return its sequence number.
    pub fn begin_load(&mut self) -> u64 {
        self.request_seq += 1;
        self.loading = true;
        self.error = None;
        self.request_seq
    }

    /// Apply a load result; stale sequence numbers are dropped.
    pub fn finish_load(&mut self, seq: u64, result: Result<ProblemPage, ApiError>) -> bool {
        if seq != self.request_seq {
            return false;
        }
        self.loading = false;
        match result {
            Ok(page) => {
                self.problems = page.problems;
                self.total = page.total;
            }
            Err(e) => {
                self.problems.clear();
                self.total = 0;
                self.error = Some(e.user_message());
            }
        }
        true
    }

    pub fn page_count(&self) -> u64 {
        self.total.div_ceil(PAGE_SIZE).max(1)
    }

    pub fn has_previous(&self) -> bool {
        self.filters.page > 0
    }

    pub fn has_next(&self) -> bool {
        (self.filters.page + 1) * PAGE_SIZE < self.total
    }

    pub fn next_page(&mut self) {
        if self.has_next() {
            self.filters.page += 1;
        }
    }

    pub fn previous_page(&mut self) {
        self.filters.page = self.filters.page.saturating_sub(1);
    }
}

/// State behind the problem detail page.
#[derive(Clone, Debug, Default)]
pub struct ProblemDetailState {
    pub detail: Option<ProblemDetail>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ProblemDetailState {
    pub fn apply(&mut self, result: Result<ProblemDetail, ApiError>) {
        self.loading = false;
        match result {
            Ok(detail) => {
                self.detail = Some(detail);
                self.error = None;
            }
            Err(e) => {
                self.detail = None;
                self.error = Some(e.user_message());
            }
        }
    }

    /// Append a freshly posted answer and keep display order.
    pub fn push_solution(&mut self, solution: Solution) {
        let Some(detail) = self.detail.as_mut() else {
            return;
        };
        if detail.solutions.iter().any(|s| s.id == solution.id) {
            return;
        }
        detail.solutions.push(solution);
        order_solutions(&mut detail.solutions);
        detail.problem.solution_count = i64::try_from(detail.solutions.len()).unwrap_or(i64::MAX);
    }
}

/// Accepted answers first, then by votes descending, then oldest first.
pub fn order_solutions(solutions: &mut [Solution]) {
    solutions.sort_by(|a, b| {
        b.is_accepted
            .cmp(&a.is_accepted)
            .then_with(|| b.votes.cmp(&a.votes))
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
}
