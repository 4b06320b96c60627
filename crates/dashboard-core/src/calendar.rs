use chrono::{DateTime, NaiveDate, NaiveDateTime, Weekday};

// ── Month names ───────────────────────────────────────────────────────────────

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// English name of month `month` (1-based).
///
/// Returns an empty string for anything outside `1..=12`.
///
/// # Examples
///
/// ```
/// use dashboard_core::calendar::month_name;
///
/// assert_eq!(month_name(1), "January");
/// assert_eq!(month_name(12), "December");
/// assert_eq!(month_name(13), "");
/// ```
pub fn month_name(month: u32) -> &'static str {
    match month {
        1..=12 => MONTH_NAMES[(month - 1) as usize],
        _ => "",
    }
}

/// Parse a month cell such as `"01"`, `"1"` or `" 12 "` into `1..=12`.
pub fn parse_month(raw: &str) -> Option<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|m| (1..=12).contains(m))
}

/// Normalise a month cell to the two-character zero-padded form.
///
/// ```
/// use dashboard_core::calendar::normalize_month;
///
/// assert_eq!(normalize_month("1").as_deref(), Some("01"));
/// assert_eq!(normalize_month("11").as_deref(), Some("11"));
/// assert_eq!(normalize_month("0"), None);
/// ```
pub fn normalize_month(raw: &str) -> Option<String> {
    parse_month(raw).map(|m| format!("{:02}", m))
}

// ── Weekdays ──────────────────────────────────────────────────────────────────

/// Weekdays in reporting order (Monday first).
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Full English weekday name, e.g. `"Monday"`.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

// ── Timestamp parsing ─────────────────────────────────────────────────────────

/// Naive layouts tried in order by [`parse_datetime`].
const DATETIME_FORMATS: [&str; 7] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Parse a `DateTime` cell into a naive wall-clock timestamp.
///
/// Accepts the `DATETIME_FORMATS` layouts, RFC 3339 strings (the offset
/// is dropped and the local wall time kept) and bare `%Y-%m-%d` dates, which
/// resolve to midnight. Returns `None` for empty or unrecognised input.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
