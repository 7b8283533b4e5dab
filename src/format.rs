//! Display formatting
//!
//! Date, time and currency formatting for dashboards. Formatting never
//! fails: empty input gives a "No date"/"No time" placeholder and input that
//! does not parse gives "Invalid Date"/"Invalid Time".

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone};

pub const NO_DATE: &str = "No date";
pub const INVALID_DATE: &str = "Invalid Date";
pub const NO_TIME: &str = "No time";
pub const INVALID_TIME: &str = "Invalid Time";

/// Parse an ISO-8601 timestamp into `tz`.
///
/// Accepts RFC 3339 (`2024-03-21T10:30:00Z`, `...+05:30`), zone-less
/// date-times (read as wall-clock time in `tz`), and bare dates (midnight).
pub fn parse_timestamp_in<Tz: TimeZone>(input: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(tz));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    tz.from_local_datetime(&naive).earliest()
}

/// Parse a timestamp in the local timezone
pub fn parse_timestamp(input: &str) -> Option<DateTime<Local>> {
    parse_timestamp_in(input, &Local)
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Long date, e.g. "March 21st, 2024"
pub fn long_date<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let day = dt.day();
    format!(
        "{} {}{}, {}",
        dt.format("%B"),
        day,
        ordinal_suffix(day),
        dt.year()
    )
}

pub fn format_date_in<Tz: TimeZone>(input: Option<&str>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match input.map(str::trim).filter(|s| !s.is_empty()) {
        None => NO_DATE.to_string(),
        Some(s) => match parse_timestamp_in(s, tz) {
            Some(dt) => long_date(&dt),
            None => {
                tracing::debug!(input = s, "Unparseable date");
                INVALID_DATE.to_string()
            }
        },
    }
}

/// Human-readable date in local time
pub fn format_date(input: Option<&str>) -> String {
    format_date_in(input, &Local)
}

pub fn format_time_in<Tz: TimeZone>(input: Option<&str>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match input.map(str::trim).filter(|s| !s.is_empty()) {
        None => NO_TIME.to_string(),
        Some(s) => match parse_timestamp_in(s, tz) {
            Some(dt) => dt.format("%I:%M %p").to_string(),
            None => {
                tracing::debug!(input = s, "Unparseable time");
                INVALID_TIME.to_string()
            }
        },
    }
}

/// 12-hour clock time in local time, e.g. "02:30 PM"
pub fn format_time(input: Option<&str>) -> String {
    format_time_in(input, &Local)
}

/// "Today", "Tomorrow", or a short date relative to `today`
pub fn relative_day_label<Tz: TimeZone>(input: &str, tz: &Tz, today: NaiveDate) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match parse_timestamp_in(input, tz) {
        Some(dt) => {
            let date = dt.date_naive();
            if date == today {
                "Today".to_string()
            } else if today.succ_opt() == Some(date) {
                "Tomorrow".to_string()
            } else {
                date.format("%b %-d, %Y").to_string()
            }
        }
        None => INVALID_DATE.to_string(),
    }
}

/// Indian rupee amount with lakh/crore grouping, e.g. "₹1,23,456.50"
pub fn format_inr(amount: f64) -> String {
    if !amount.is_finite() {
        return "₹0.00".to_string();
    }

    let paise = (amount.abs() * 100.0).round() as u64;
    let rupees = (paise / 100).to_string();
    let fraction = paise % 100;

    let grouped = if rupees.len() <= 3 {
        rupees
    } else {
        let (head, last_three) = rupees.split_at(rupees.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 0 {
            let start = end.saturating_sub(2);
            groups.push(&head[start..end]);
            end = start;
        }
        groups.reverse();
        format!("{},{}", groups.join(","), last_three)
    };

    let sign = if amount < 0.0 && paise > 0 { "-" } else { "" };
    format!("{}₹{}.{:02}", sign, grouped, fraction)
}
