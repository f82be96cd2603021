use super::*;

#[test]
fn problem_draft_trims_and_builds_request() {
    let draft = ProblemDraft {
        title: "  Why is my borrow rejected?  ".to_owned(),
        description: "Details".to_owned(),
        category: " ".to_owned(),
    };
    let problem = draft.validate().expect("valid draft");
    assert_eq!(problem.title, "Why is my borrow rejected?");
    assert_eq!(problem.category, None);
}

#[test]
fn problem_draft_requires_title_and_description() {
    let draft = ProblemDraft { description: "x".to_owned(), ..ProblemDraft::default() };
    assert_eq!(draft.validate(), Err(DraftError::Required("Title")));

    let draft = ProblemDraft { title: "t".to_owned(), ..ProblemDraft::default() };
    assert_eq!(draft.validate(), Err(DraftError::Required("Description")));
}

#[test]
fn problem_draft_limits_title_length() {
    let draft = ProblemDraft {
        title: "a".repeat(MAX_TITLE_CHARS + 1),
        description: "d".to_owned(),
        category: String::new(),
    };
    assert_eq!(draft.validate(), Err(DraftError::TooLong { field: "Title", max: MAX_TITLE_CHARS }));
    assert_eq!(draft.title_chars_left(), -1);

    let exact = ProblemDraft { title: "é".repeat(MAX_TITLE_CHARS), ..draft };
    assert!(exact.validate().is_ok());
}

#[test]
fn solution_body_must_not_be_blank() {
    assert_eq!(validate_solution("   "), Err(DraftError::Required("Answer")));
    assert_eq!(validate_solution(" use Rc "), Ok("use Rc".to_owned()));
}

#[test]
fn bug_report_keeps_severity_and_page() {
    let draft = BugReportDraft {
        title: "Crash".to_owned(),
        description: "Chat froze".to_owned(),
        severity: Severity::High,
    };
    let report = draft.validate(Some("/problems/4".to_owned())).expect("valid report");
    assert_eq!(report.severity, Severity::High);
    assert_eq!(report.page_url.as_deref(), Some("/problems/4"));
}

#[test]
fn login_requires_both_fields() {
    let draft = LoginDraft { username: "ann".to_owned(), password: String::new() };
    assert_eq!(draft.validate(), Err(DraftError::Required("Password")));
    let draft = LoginDraft { username: " ann ".to_owned(), password: " pw ".to_owned() };
    assert_eq!(draft.validate(), Ok(("ann".to_owned(), " pw ".to_owned())));
}

#[test]
fn register_checks_email_and_password_length() {
    let mut draft = RegisterDraft {
        username: "ann".to_owned(),
        email: "ann.example.com".to_owned(),
        password: "secret1".to_owned(),
    };
    assert_eq!(draft.validate(), Err(DraftError::InvalidEmail));

    draft.email = "ann@example.com".to_owned();
    draft.password = "abc".to_owned();
    assert_eq!(draft.validate(), Err(DraftError::PasswordTooShort(MIN_PASSWORD_CHARS)));

    draft.password = "abcdef".to_owned();
    assert!(draft.validate().is_ok());
}

#[test]
fn draft_errors_render_user_text() {
    assert_eq!(DraftError::Required("Title").to_string(), "Title is required.");
    assert_eq!(
        DraftError::TooLong { field: "Title", max: 200 }.to_string(),
        "Title must be at most 200 characters."
    );
}
