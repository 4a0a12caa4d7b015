use chrono::{DateTime, Datelike, TimeZone};
use time_humanize::HumanTime;

pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// Format seconds as `m:ss`
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Long date used in screen headers, e.g. "Saturday, October 17, 2026"
pub fn format_long_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}, {} {}, {}",
        date.format("%A"),
        date.format("%B"),
        date.day(),
        date.year()
    )
}

/// Relative time in the past, e.g. "5 minutes ago"
pub fn format_ago(seconds: u64) -> String {
    HumanTime::from_seconds(-(seconds.min(i64::MAX as u64) as i64)).to_string()
}
