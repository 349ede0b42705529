//! Per-day block layout.
//!
//! ```text
//! # when adding a new work log, leave the id column empty.
//!
//! # 2019-07-18 - total time: 1:30:00
//! # id | duration | issue    | description
//! 1    | 0:30:00  | GAUS-538 | work
//!      | 1:00:00  | GAUS-570 | work
//! ```

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use super::{comment_body, covered_dates, escape, parse_row, render_table, split_fields, NEW_ENTRY_HINT};
use crate::error::{Error, Result};
use crate::model::{day_total, format_duration, DateRange, Entry};

const COLUMNS: [&str; 4] = ["id", "duration", "issue", "description"];

/// A comment whose first token is `YYYY-MM-DD` starts a new day.
static DAY_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{4}-\d{2}-\d{2})(?:\s|$)").expect("day header pattern is valid")
});

pub(super) fn encode(entries: &[Entry], range: &DateRange) -> String {
    let mut out = String::from(NEW_ENTRY_HINT);
    out.push('\n');

    for date in covered_dates(entries, range) {
        let rows: Vec<Vec<String>> = entries
            .iter()
            .filter(|e| e.date() == date)
            .map(|e| {
                vec![
                    e.id().map(ToString::to_string).unwrap_or_default(),
                    format_duration(e.duration()),
                    e.issue_key().to_string(),
                    escape(e.description()),
                ]
            })
            .collect();

        out.push('\n');
        out.push_str(&format!(
            "# {date} - total time: {}\n",
            format_duration(day_total(entries, date))
        ));
        for line in render_table(&COLUMNS, &rows) {
            out.push_str(&line);
            out.push('\n');
        }
    }

    out
}

pub(super) fn decode(text: &str) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    let mut current_date: Option<NaiveDate> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(comment) = comment_body(line) {
            if let Some(date) = day_header(comment).map_err(|msg| Error::format(line_no, raw, msg))? {
                current_date = Some(date);
            }
            continue;
        }

        let Some(date) = current_date else {
            return Err(Error::format(line_no, raw, "no day header above this line"));
        };
        let Some(fields) = split_fields(line, COLUMNS.len()) else {
            return Err(Error::format(
                line_no,
                raw,
                "expected 4 fields: id | duration | issue | description",
            ));
        };

        entries.push(parse_row(
            line_no, raw, date, fields[0], fields[1], fields[2], fields[3],
        )?);
    }

    Ok(entries)
}

/// `Ok(Some(date))` for a day header, `Ok(None)` for any other comment.
fn day_header(comment: &str) -> std::result::Result<Option<NaiveDate>, String> {
    let Some(caps) = DAY_HEADER.captures(comment) else {
        return Ok(None);
    };
    let token = &caps[1];
    NaiveDate::parse_from_str(token, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("invalid date {token:?}"))
}
