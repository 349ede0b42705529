//! Per-line-date layout: one table, the date repeated on every row.
//!
//! ```text
//! # when adding a new work log, leave the id column empty.
//! # 2019-07-18 - total time: 0:30:00
//! # date       | id | duration | issue    | description
//! 2019-07-18   | 1  | 0:30:00  | GAUS-538 | work
//! ```

use chrono::NaiveDate;

use super::{comment_body, covered_dates, escape, parse_row, render_table, split_fields, NEW_ENTRY_HINT};
use crate::error::{Error, Result};
use crate::model::{day_total, format_duration, DateRange, Entry};

const COLUMNS: [&str; 5] = ["date", "id", "duration", "issue", "description"];

pub(super) fn encode(entries: &[Entry], range: &DateRange) -> String {
    let mut out = String::from(NEW_ENTRY_HINT);
    out.push('\n');

    let dates = covered_dates(entries, range);
    for date in &dates {
        out.push_str(&format!(
            "# {date} - total time: {}\n",
            format_duration(day_total(entries, *date))
        ));
    }
    out.push('\n');

    // Stable by date so same-day order survives.
    let mut sorted: Vec<&Entry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.date());

    let rows: Vec<Vec<String>> = sorted
        .iter()
        .map(|e| {
            vec![
                e.date().to_string(),
                e.id().map(ToString::to_string).unwrap_or_default(),
                format_duration(e.duration()),
                e.issue_key().to_string(),
                escape(e.description()),
            ]
        })
        .collect();

    for line in render_table(&COLUMNS, &rows) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

pub(super) fn decode(text: &str) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || comment_body(line).is_some() {
            continue;
        }

        let Some(fields) = split_fields(line, COLUMNS.len()) else {
            return Err(Error::format(
                line_no,
                raw,
                "expected 5 fields: date | id | duration | issue | description",
            ));
        };
        let date = NaiveDate::parse_from_str(fields[0], "%Y-%m-%d")
            .map_err(|_| Error::format(line_no, raw, format!("invalid date {:?}", fields[0])))?;

        entries.push(parse_row(
            line_no, raw, date, fields[1], fields[2], fields[3], fields[4],
        )?);
    }

    Ok(entries)
}
