//! `H:MM:SS` rendering and parsing for worklog durations.

use chrono::Duration;

/// Render a duration as `H:MM:SS`.
///
/// Hours are unbounded (`27:00:00` is a valid rendering). Sub-second
/// precision is dropped; the remote service counts whole seconds.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.unsigned_abs();
    format!(
        "{sign}{}:{:02}:{:02}",
        total / 3600,
        (total / 60) % 60,
        total % 60
    )
}

/// Parse an `H:MM:SS` duration.
///
/// Hours may have any number of digits; minutes and seconds are exactly two
/// digits in `00..=59`. The error is a short description of what is wrong
/// and is meant to be wrapped with line context by the caller.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.starts_with('-') {
        return Err(format!("duration must not be negative: {input:?}"));
    }

    let parts: Vec<&str> = input.split(':').collect();
    let [hours, minutes, seconds] = parts.as_slice() else {
        return Err(format!("invalid duration {input:?}, expected H:MM:SS"));
    };

    if hours.is_empty() || !hours.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid duration {input:?}, hours must be digits"));
    }
    let hours: i64 = hours
        .parse()
        .map_err(|_| format!("invalid duration {input:?}, hours out of range"))?;
    let minutes = parse_sixty(minutes).ok_or_else(|| {
        format!("invalid duration {input:?}, minutes must be 00-59")
    })?;
    let seconds = parse_sixty(seconds).ok_or_else(|| {
        format!("invalid duration {input:?}, seconds must be 00-59")
    })?;

    hours
        .checked_mul(3600)
        .and_then(|h| h.checked_add(minutes * 60 + seconds))
        .and_then(Duration::try_seconds)
        .ok_or_else(|| format!("invalid duration {input:?}, hours out of range"))
}

fn parse_sixty(field: &str) -> Option<i64> {
    if field.len() != 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse::<i64>().ok().filter(|v| *v < 60)
}
