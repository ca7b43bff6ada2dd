use chrono::{DateTime, Datelike as _, Local, NaiveDate, Utc};

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// `"{h}h {m}m"` when at least an hour, otherwise `"{m}m"`. Truncates.
pub fn format_duration(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Formats an ISO date as `M/D/YY`.
///
/// A bare `YYYY-MM-DD` keeps its calendar fields; a date-time is shifted to
/// the local zone first. Anything unparseable comes back trimmed.
pub fn format_date(iso: &str) -> String {
    let raw = iso.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return short_date(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return short_date(dt.with_timezone(&Local).date_naive());
    }
    tracing::debug!(input = raw, "unparseable date; passing through");
    raw.to_owned()
}

fn short_date(date: NaiveDate) -> String {
    format!(
        "{}/{}/{:02}",
        date.month(),
        date.day(),
        date.year().rem_euclid(100)
    )
}

/// Relative freshness label: `5m ago`, `3h ago`, `2d ago`.
pub fn format_time_since(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - then).num_minutes().max(0);
    if minutes < 60 {
        format!("{minutes}m ago")
    } else if minutes < 1440 {
        format!("{}h ago", minutes / 60)
    } else {
        format!("{}d ago", minutes / 1440)
    }
}

/// Lower-case month name for a 1-based month number.
pub fn month_name(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES.get(index).copied()
}

/// Resolves a sheet month cell (`"3"`, `"03"`, `"March"`, `"mar"`) to 1..=12.
pub fn resolve_month(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(n) = raw.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    let lower = raw.to_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|name| name.starts_with(&lower))
        .and_then(|index| u32::try_from(index + 1).ok())
}
