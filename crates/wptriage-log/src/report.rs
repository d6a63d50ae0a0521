//! CSV report output and reloading.
//!
//! The report has one header row holding [`FIELD_NAMES`] followed by one row
//! per record. Fields containing a comma, a double quote or a line break are
//! quoted, with embedded quotes doubled. Missing values are written as empty
//! fields.

use crate::analyzer::Analysis;
use crate::error::ReportError;
use crate::ir::{FIELD_NAMES, LogRecord};
use crate::sink::{AnalysisEvent, EventSink};
use chrono::{Local, NaiveDate, NaiveDateTime};
use std::borrow::Cow;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Where and under which date a report is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub output_dir: PathBuf,
    /// Date embedded in the report file name.
    pub run_date: NaiveDate,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            run_date: Local::now().date_naive(),
        }
    }
}

impl ReportOptions {
    pub fn report_path(&self, source_id: &str) -> PathBuf {
        self.output_dir
            .join(report_file_name(source_id, self.run_date))
    }
}

/// `analysis_<source_id>_<YYYYMMDD>.csv`
pub fn report_file_name(source_id: &str, date: NaiveDate) -> String {
    format!("analysis_{}_{}.csv", source_id, date.format("%Y%m%d"))
}

/// Writes the report for `analysis`, then reports the path and the summary to `sink`.
pub fn generate_report(
    analysis: &Analysis,
    options: &ReportOptions,
    sink: &mut dyn EventSink,
) -> Result<PathBuf, ReportError> {
    let path = options.report_path(&analysis.source_id);
    write_report(&analysis.records, &path)?;
    sink.record(AnalysisEvent::ReportWritten {
        path: path.clone(),
        rows: analysis.records.len(),
    });
    sink.record(AnalysisEvent::Summary(analysis.summary.clone()));
    Ok(path)
}

/// Writes `records` to `path`.
///
/// The rows go to a temporary file next to `path` which is renamed over it
/// once complete, so a failed write never leaves a truncated report behind.
pub fn write_report(records: &[LogRecord], path: &Path) -> Result<(), ReportError> {
    let write_error = |source: io::Error| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".analysis").suffix(".csv.tmp");
    // Temp files default to 0600; the report gets the mode of a plain
    // `fs::write` (0666 minus umask), or keeps the mode of the file it replaces.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(dir).map_err(write_error)?;
    if let Ok(existing) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .map_err(write_error)?;
    }
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write_csv(records, &mut writer).map_err(write_error)?;
        writer.flush().map_err(write_error)?;
    }
    tmp.persist(path).map_err(|e| ReportError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

/// Serializes the header and `records` as CSV.
pub fn write_csv<W: Write>(records: &[LogRecord], out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", FIELD_NAMES.join(","))?;
    for record in records {
        let row = record_fields(record)
            .iter()
            .map(|field| escape_field(field))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(out, "{row}")?;
    }
    Ok(())
}

fn record_fields(record: &LogRecord) -> [Cow<'_, str>; 10] {
    [
        Cow::Borrowed(record.source_id.as_str()),
        record
            .timestamp
            .map_or(Cow::Borrowed(""), |ts| {
                Cow::Owned(ts.format(TIMESTAMP_FORMAT).to_string())
            }),
        Cow::Borrowed(record.error_level.as_str()),
        Cow::Borrowed(record.component_type.as_str()),
        Cow::Borrowed(record.component_name.as_str()),
        Cow::Borrowed(record.error_message.as_str()),
        Cow::Borrowed(record.file_path.as_deref().unwrap_or("")),
        Cow::Borrowed(record.line_number.as_deref().unwrap_or("")),
        Cow::Borrowed(record.suggested_resolution.as_str()),
        Cow::Borrowed(record.priority.as_str()),
    ]
}

fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Reloads the records of a report written by [`write_report`].
pub fn load_report(path: &Path) -> Result<Vec<LogRecord>, ReportError> {
    let content = fs::read_to_string(path).map_err(|source| ReportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_report(&content)
}

/// Parses report text (header included) back into records.
pub fn parse_report(content: &str) -> Result<Vec<LogRecord>, ReportError> {
    let mut rows = split_rows(content)?.into_iter();

    match rows.next() {
        Some(header) if header == FIELD_NAMES => {}
        Some(header) => {
            return Err(ReportError::Malformed {
                row: 1,
                reason: format!("unexpected header {:?}", header.join(",")),
            });
        }
        None => {
            return Err(ReportError::Malformed {
                row: 1,
                reason: "missing header".into(),
            });
        }
    }

    rows.enumerate()
        .map(|(idx, fields)| {
            record_from_fields(fields).map_err(|reason| ReportError::Malformed {
                row: idx + 2,
                reason,
            })
        })
        .collect()
}

fn record_from_fields(fields: Vec<String>) -> Result<LogRecord, String> {
    let [
        source_id,
        timestamp,
        error_level,
        component_type,
        component_name,
        error_message,
        file_path,
        line_number,
        suggested_resolution,
        priority,
    ]: [String; 10] = fields
        .try_into()
        .map_err(|fields: Vec<String>| format!("expected 10 fields, found {}", fields.len()))?;

    let timestamp = if timestamp.is_empty() {
        None
    } else {
        Some(
            NaiveDateTime::parse_from_str(&timestamp, TIMESTAMP_PARSE_FORMAT)
                .map_err(|e| format!("bad timestamp `{timestamp}`: {e}"))?,
        )
    };

    Ok(LogRecord {
        source_id,
        timestamp,
        error_level,
        component_type: component_type.parse()?,
        component_name,
        error_message,
        file_path: non_empty(file_path),
        line_number: non_empty(line_number),
        suggested_resolution,
        priority: priority.parse()?,
    })
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// Splits CSV text into rows of unescaped fields.
fn split_rows(content: &str) -> Result<Vec<Vec<String>>, ReportError> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(ReportError::Malformed {
            row: rows.len() + 1,
            reason: "unterminated quoted field".into(),
        });
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    Ok(rows)
}
