//! Display formatting for library metadata
//!
//! Everything here degrades to the "unknown" placeholder instead of
//! failing; these functions sit on display-only paths.

use crate::descriptor::UNKNOWN;

/// Format a byte count with 1024-based units, e.g. "12.34 MB"
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    for unit in UNITS {
        if size < 1024.0 {
            return format!("{:.2} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.2} TB", size)
}

/// Format a duration in seconds as "1h 2m 3s", dropping leading zero parts
pub fn format_duration(seconds: Option<u64>) -> String {
    let Some(seconds) = seconds else {
        return UNKNOWN.to_string();
    };

    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Reformat a "YYYYMMDD" upload date as "YYYY-MM-DD"
///
/// Dates that do not match the expected shape are passed through verbatim
/// rather than dropped.
pub fn format_upload_date(date: Option<&str>) -> String {
    let Some(date) = date else {
        return UNKNOWN.to_string();
    };

    if date.len() == 8 && date.chars().all(|c| c.is_ascii_digit()) {
        format!("{}-{}-{}", &date[..4], &date[4..6], &date[6..])
    } else {
        date.to_string()
    }
}

/// Format a view/like count with thousands separators, e.g. "1,234,567"
pub fn format_count(count: Option<u64>) -> String {
    let Some(count) = count else {
        return UNKNOWN.to_string();
    };

    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
