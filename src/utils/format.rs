use chrono::{DateTime, Duration, FixedOffset, Utc};

/// "{h}h {m}m", floored to whole minutes. Negative input reads as zero.
pub fn format_remaining(remaining: Duration) -> String {
    let minutes = remaining.num_minutes().max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Wall-clock time in `offset`, e.g. "1:05 PM".
pub fn format_time(at: DateTime<Utc>, offset: &FixedOffset) -> String {
    at.with_timezone(offset).format("%-I:%M %p").to_string()
}

/// "1 prayer" / "12 prayers".
pub fn format_streak(streak: u64) -> String {
    if streak == 1 {
        "1 prayer".to_string()
    } else {
        format!("{} prayers", streak)
    }
}

/// Render a UTC offset in minutes as "UTC+5:30" / "UTC-8".
pub fn format_offset(minutes: i32) -> String {
    let sign = if minutes < 0 { "-" } else { "+" };
    let abs = minutes.abs();
    let (h, m) = (abs / 60, abs % 60);
    if m == 0 {
        format!("UTC{}{}", sign, h)
    } else {
        format!("UTC{}{}:{:02}", sign, h, m)
    }
}
