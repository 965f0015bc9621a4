use chrono::{Local, NaiveDate};

/// Session id for the current local calendar day.
pub fn today_session_id() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Validate an explicit `YYYY-MM-DD` date and normalize it to a session id.
pub fn session_id_for(date: &str) -> Option<String> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// Resolve a CLI date argument: `today` maps to the current local date,
/// anything else must parse as `YYYY-MM-DD`.
pub fn resolve_session_arg(arg: &str) -> Option<String> {
    if arg.eq_ignore_ascii_case("today") {
        Some(today_session_id())
    } else {
        session_id_for(arg)
    }
}
