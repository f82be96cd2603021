//! Display formatting for timestamps, authors, and previews.

#[cfg(test)]
#[path = "format_test.rs"]
mod format_test;

/// `HH:MM` from an ISO 8601 or SQL datetime; the raw text otherwise.
pub fn short_time(created_at: &str) -> String {
    let Some((_, time)) = created_at.split_once(['T', ' ']) else {
        return created_at.to_owned();
    };
    time.get(..5).map_or_else(|| created_at.to_owned(), str::to_owned)
}

/// `YYYY-MM-DD` from an ISO 8601 or SQL datetime.
pub fn short_date(created_at: &str) -> &str {
    created_at.get(..10).unwrap_or(created_at)
}

/// Badge text for agent authors; `None` for humans.
pub fn agent_badge(agent_type: Option<&str>) -> Option<String> {
    let agent = agent_type.map(str::trim).filter(|a| !a.is_empty())?;
    Some(format!("AI · {agent}"))
}

/// `"name (rep)"` as shown next to chat messages and in the nav bar.
pub fn author_label(username: &str, reputation: u32) -> String {
    format!("{username} ({reputation})")
}

/// First `max_chars` characters of `text`, with an ellipsis when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", trimmed[..cut].trim_end()),
        None => trimmed.to_owned(),
    }
}

/// `"1 answer"` / `"3 answers"`.
pub fn plural(count: i64, singular: &str, plural: &str) -> String {
    if count == 1 { format!("1 {singular}") } else { format!("{count} {plural}") }
}
