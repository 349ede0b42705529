//! Text codec: worklogs to and from the editable text format.
//!
//! Two layouts share the same field rules:
//!
//! - [`Layout::Blocks`] (default): one block per day, introduced by a
//!   `# YYYY-MM-DD - total time: H:MM:SS` header, rows of
//!   `id | duration | issue | description`.
//! - [`Layout::Flat`]: a single table with the date as the first column.
//!
//! Lines starting with `#` (after optional whitespace) are comments and blank
//! lines are skipped. Totals are written on encode and never read back.
//! Column padding is cosmetic; every field is trimmed on decode.

mod blocks;
mod flat;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{parse_duration, DateRange, Entry, WorklogId};

/// First line of every encoded document.
pub const NEW_ENTRY_HINT: &str = "# when adding a new work log, leave the id column empty.";

/// Text layout of the edited document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Per-day blocks with a date header.
    #[default]
    Blocks,
    /// One table, date on every line.
    Flat,
}

/// Render entries as editable text.
///
/// Entries are grouped by date in chronological order; within a day the
/// input order is kept. Every day of `range` is rendered, even when empty.
#[must_use]
pub fn encode(entries: &[Entry], range: &DateRange, layout: Layout) -> String {
    match layout {
        Layout::Blocks => blocks::encode(entries, range),
        Layout::Flat => flat::encode(entries, range),
    }
}

/// Parse edited text back into entries, in document order.
///
/// # Errors
///
/// Returns [`Error::Format`] with the 1-based line number and raw text for
/// the first line that cannot be parsed. Nothing is returned for the lines
/// that did parse.
pub fn decode(text: &str, layout: Layout) -> Result<Vec<Entry>> {
    match layout {
        Layout::Blocks => blocks::decode(text),
        Layout::Flat => flat::decode(text),
    }
}

/// Every date that gets its own block/total: the whole range plus any
/// entry dates outside of it.
fn covered_dates(entries: &[Entry], range: &DateRange) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = range
        .days()
        .chain(entries.iter().map(Entry::date))
        .collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}

/// Align columns with ` | ` separators. The header row is commented out.
fn render_table(header: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let mut table: Vec<Vec<String>> = Vec::with_capacity(rows.len() + 1);
    let mut header_row: Vec<String> = header.iter().map(|h| (*h).to_string()).collect();
    header_row[0] = format!("# {}", header_row[0]);
    table.push(header_row);
    table.extend(rows.iter().cloned());

    let columns = header.len();
    let widths: Vec<usize> = (0..columns)
        .map(|i| {
            table
                .iter()
                .map(|row| row[i].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    table
        .iter()
        .map(|row| {
            let mut line = String::new();
            for (i, cell) in row.iter().enumerate() {
                if i + 1 == columns {
                    line.push_str(cell);
                } else {
                    line.push_str(&format!("{cell:<width$} | ", width = widths[i]));
                }
            }
            line.trim_end().to_string()
        })
        .collect()
}

/// Split a row into exactly `n` fields. The last field takes the rest of the
/// line, so descriptions may contain `|`.
fn split_fields(line: &str, n: usize) -> Option<Vec<&str>> {
    let fields: Vec<&str> = line.splitn(n, '|').map(str::trim).collect();
    (fields.len() == n).then_some(fields)
}

/// Comment body if the line is a comment.
fn comment_body(line: &str) -> Option<&str> {
    line.trim_start().strip_prefix('#')
}

/// Build an entry from the four worklog fields of one line.
fn parse_row(
    line_no: usize,
    raw: &str,
    date: NaiveDate,
    id: &str,
    duration: &str,
    issue_key: &str,
    description: &str,
) -> Result<Entry> {
    let id = if id.is_empty() {
        None
    } else {
        Some(WorklogId::new(id).map_err(|e| Error::format(line_no, raw, e.to_string()))?)
    };
    let duration = parse_duration(duration).map_err(|msg| Error::format(line_no, raw, msg))?;
    if issue_key.is_empty() {
        return Err(Error::format(line_no, raw, "issue key is empty"));
    }

    Entry::new(id, date, duration, issue_key, unescape(description))
        .map(|entry| entry.at_line(line_no))
        .map_err(|e| Error::format(line_no, raw, e.to_string()))
}

/// Keep descriptions on one line: `\` becomes `\\`, line breaks become `\n`/`\r`.
fn escape(description: &str) -> String {
    let mut out = String::with_capacity(description.len());
    for c in description.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape`]. Unknown escapes are kept verbatim.
fn unescape(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 7, day).unwrap()
    }

    fn entry(id: Option<&str>, day: u32, minutes: i64, issue: &str, desc: &str) -> Entry {
        Entry::new(
            id.map(|i| WorklogId::new(i).unwrap()),
            d(day),
            Duration::minutes(minutes),
            issue,
            desc,
        )
        .unwrap()
    }

    fn sample() -> Vec<Entry> {
        vec![
            entry(Some("1"), 18, 30, "GAUS-538", "work"),
            entry(Some("22"), 18, 90, "GAUS-570", "review | pairing"),
            entry(None, 19, 15, "GAUS-1", ""),
            entry(Some("3"), 20, 600, "OPS-7", "line one\nline two \\ done"),
        ]
    }

    fn assert_same(decoded: &[Entry], original: &[Entry]) {
        assert_eq!(decoded.len(), original.len());
        for (a, b) in decoded.iter().zip(original) {
            assert_eq!(a, b);
            assert_eq!(a.id(), b.id());
        }
    }

    #[test]
    fn test_round_trip_both_layouts() {
        let range = DateRange::new(d(17), d(20)).unwrap();
        for layout in [Layout::Blocks, Layout::Flat] {
            let text = encode(&sample(), &range, layout);
            let decoded = decode(&text, layout).unwrap();
            assert_same(&decoded, &sample());
        }
    }

    #[test]
    fn test_opaque_ids_round_trip_in_blocks() {
        let range = DateRange::day(d(18));
        let entries = vec![
            entry(Some("A#7"), 18, 30, "A-1", "x"),
            entry(Some("abc-9f"), 18, 15, "A-2", ""),
        ];
        let text = encode(&entries, &range, Layout::Blocks);
        assert_same(&decode(&text, Layout::Blocks).unwrap(), &entries);
    }

    #[test]
    fn test_hash_prefixed_id_in_flat_row_is_format_error() {
        let err = decode("2019-07-18 | #7 | 0:30:00 | A-1 | x\n", Layout::Flat).unwrap_err();
        assert!(matches!(err, Error::Format { line: 1, .. }));
    }

    #[test]
    fn test_encode_is_deterministic() {
        let range = DateRange::new(d(18), d(20)).unwrap();
        assert_eq!(
            encode(&sample(), &range, Layout::Blocks),
            encode(&sample(), &range, Layout::Blocks)
        );
    }

    #[test]
    fn test_escape_round_trip() {
        for s in ["plain", "a\\b", "two\nlines", "crlf\r\n", "trailing \\", "\\n literal"] {
            assert_eq!(unescape(&escape(s)), s);
        }
        assert_eq!(unescape("C:\\temp"), "C:\\temp");
    }

    #[test]
    fn test_render_table_pads_columns() {
        let rows = vec![
            vec!["1".into(), "0:30:00".into(), "GAUS-538".into(), "work".into()],
            vec![String::new(), "10:00:00".into(), "X-1".into(), String::new()],
        ];
        let lines = render_table(&["id", "duration", "issue", "description"], &rows);
        assert_eq!(lines[0], "# id | duration | issue    | description");
        assert_eq!(lines[1], "1    | 0:30:00  | GAUS-538 | work");
        assert_eq!(lines[2], "     | 10:00:00 | X-1      |");
    }

    #[test]
    fn test_split_fields_keeps_pipes_in_last_field() {
        assert_eq!(
            split_fields(" 1 | 0:30:00 | A-1 | x | y ", 4),
            Some(vec!["1", "0:30:00", "A-1", "x | y"])
        );
        assert_eq!(split_fields("1 | 0:30:00 | A-1", 4), None);
    }
}
