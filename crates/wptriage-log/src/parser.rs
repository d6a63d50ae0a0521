use crate::error::ParseError;
use crate::ir::{ComponentType, LogRecord, Priority, CORE_COMPONENT, UNKNOWN_LEVEL};
use crate::sink::{AnalysisEvent, EventSink};
use chrono::{NaiveDateTime, Timelike};
use regex::Regex;

/// Substring every error line carries. Lines without it never reach the parser.
pub const ERROR_MARKER: &str = ":error]";

/// Marker preceding the human-readable part of a PHP-FPM message.
pub const MESSAGE_MARKER: &str = "PHP message: ";

const DEFAULT_RESOLUTION: &str = "Investigate and review code";

/// Ordered `(pattern, template)` pairs. The first pattern found in the
/// searched text wins; `{component}` is replaced by the component name.
const RESOLUTIONS: &[(&str, &str)] = &[
    (
        "client denied",
        "Check server configuration and access permissions",
    ),
    (
        "Undefined variable",
        "Review variable initialization in {component}",
    ),
    (
        "Undefined array key",
        "Verify array keys and data structure in {component}",
    ),
    ("Fatal error", "Critical review needed for {component}"),
];

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

lazy_static::lazy_static! {
    static ref BRACKET_TOKEN: Regex = Regex::new(r"\[(.*?)\]").unwrap();
    static ref ERROR_LEVEL: Regex = Regex::new(r"\[([^\[\]]*):error\]").unwrap();
    static ref COMPONENT_PATH: Regex =
        Regex::new(r"/wp-content/(plugins|themes)/([^/]+)/").unwrap();
    static ref LINE_REF: Regex = Regex::new(r"on line (\d+)").unwrap();
}

/// Turns single error-log lines into [`LogRecord`]s.
///
/// The parser is stateless apart from the source identifier it stamps on
/// every record, so one instance can be reused for a whole file.
#[derive(Debug, Clone)]
pub struct LineParser {
    source_id: String,
}

impl LineParser {
    /// Creates a parser tagging its records with `source_id`.
    pub fn new(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
        }
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Parses one line, reporting a fault to `sink` and returning `None`
    /// instead of failing.
    ///
    /// `line_no` is only used for the diagnostic.
    pub fn parse(
        &self,
        line: &str,
        line_no: usize,
        sink: &mut dyn EventSink,
    ) -> Option<LogRecord> {
        match self.parse_line(line) {
            Ok(record) => Some(record),
            Err(error) => {
                sink.record(AnalysisEvent::ParseFailed { line_no, error });
                None
            }
        }
    }

    /// Extracts every field of a record from `line`.
    ///
    /// Missing pieces degrade to their defaults (`None`, `"Unknown"`,
    /// `"WordPress Core"`); only a line without the error marker is rejected.
    pub fn parse_line(&self, line: &str) -> Result<LogRecord, ParseError> {
        if !line.contains(ERROR_MARKER) {
            return Err(ParseError::MissingErrorMarker);
        }

        let timestamp = BRACKET_TOKEN
            .captures(line)
            .and_then(|caps| caps.get(1))
            .and_then(|m| parse_timestamp(m.as_str()));

        let error_level = ERROR_LEVEL
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map_or_else(|| UNKNOWN_LEVEL.to_string(), |m| m.as_str().to_string());

        let (component_type, component_name, file_path) = match COMPONENT_PATH.captures(line) {
            Some(caps) => {
                let kind = if &caps[1] == "plugins" {
                    ComponentType::Plugin
                } else {
                    ComponentType::Theme
                };
                (kind, caps[2].to_string(), Some(caps[0].to_string()))
            }
            None => (ComponentType::Core, CORE_COMPONENT.to_string(), None),
        };

        let line_number = LINE_REF
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());

        let error_message = extract_message(line);
        let priority = classify_priority(&error_level, line);
        // The level token is usually a module name such as `php`, so the
        // message text is consulted when the level matches nothing.
        let suggested_resolution = match_resolution(&error_level, &component_name)
            .or_else(|| match_resolution(error_message, &component_name))
            .unwrap_or_else(|| DEFAULT_RESOLUTION.to_string());

        Ok(LogRecord {
            source_id: self.source_id.clone(),
            timestamp,
            error_message: error_message.to_string(),
            error_level,
            component_type,
            component_name,
            file_path,
            line_number,
            suggested_resolution,
            priority,
        })
    }
}

/// Returns true for lines the analyzer should hand to the parser.
pub fn is_error_line(line: &str) -> bool {
    line.contains(ERROR_MARKER)
}

/// Parses an Apache error-log timestamp such as `Mon Jan 02 15:04:05.123456 2024`.
///
/// The weekday must be a valid abbreviation but is not checked against the
/// date; logs rotated through tooling frequently carry a stale one. The
/// fraction takes one to six digits and the year exactly four. Leap seconds
/// (`:60`) are rejected.
pub fn parse_timestamp(token: &str) -> Option<NaiveDateTime> {
    let (weekday, rest) = token.split_once(' ')?;
    if !WEEKDAYS.contains(&weekday) {
        return None;
    }
    let (time, year) = rest.rsplit_once(' ')?;
    let (_, fraction) = time.rsplit_once('.')?;
    if !all_digits(year, 4..=4) || !all_digits(fraction, 1..=6) {
        return None;
    }
    NaiveDateTime::parse_from_str(rest, "%b %d %H:%M:%S%.f %Y")
        .ok()
        .filter(|ts| ts.nanosecond() < 1_000_000_000)
}

fn all_digits(s: &str, len: std::ops::RangeInclusive<usize>) -> bool {
    len.contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

/// Text after the last `PHP message: ` marker, trimmed, or the whole line.
pub fn extract_message(line: &str) -> &str {
    match line.rfind(MESSAGE_MARKER) {
        Some(idx) => line[idx + MESSAGE_MARKER.len()..].trim(),
        None => line,
    }
}

/// Severity bucket for a line.
///
/// `High` wins over `Medium`; both tests are case-sensitive substring checks.
pub fn classify_priority(error_level: &str, full_line: &str) -> Priority {
    if error_level.contains("Fatal") || full_line.contains("client denied") {
        Priority::High
    } else if error_level.contains("Warning") {
        Priority::Medium
    } else {
        Priority::Low
    }
}

/// Remediation hint for an error level, naming the blamed component.
pub fn suggest_resolution(error_level: &str, component_name: &str) -> String {
    match_resolution(error_level, component_name)
        .unwrap_or_else(|| DEFAULT_RESOLUTION.to_string())
}

/// First table entry whose pattern occurs in `text`, with the component filled in.
pub fn match_resolution(text: &str, component_name: &str) -> Option<String> {
    RESOLUTIONS
        .iter()
        .find(|(pattern, _)| text.contains(pattern))
        .map(|(_, template)| template.replace("{component}", component_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_timestamp_ignores_weekday_mismatch() {
        // 2024-01-02 was a Tuesday.
        let ts = parse_timestamp("Mon Jan 02 15:04:05.123456 2024").unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_micro_opt(15, 4, 5, 123_456)
            .unwrap();
        assert_eq!(ts, expected);
        assert_eq!(ts.nanosecond(), 123_456_000);
    }

    #[test]
    fn test_parse_timestamp_rejects_other_shapes() {
        assert_eq!(parse_timestamp("php:error"), None);
        assert_eq!(parse_timestamp("pid 123"), None);
        assert_eq!(parse_timestamp("2024-01-02 15:04:05"), None);
        assert_eq!(parse_timestamp("Xyz Jan 02 15:04:05.1 2024"), None);
        assert_eq!(parse_timestamp("Mon Foo 02 15:04:05.1 2024"), None);
        assert_eq!(parse_timestamp("Mon Jan 02 15:04:05 2024"), None);
        assert_eq!(parse_timestamp("Mon Jan 02 15:04:05.1234567 2024"), None);
        assert_eq!(parse_timestamp("Mon Jan 02 15:04:05.123456 24"), None);
        assert_eq!(parse_timestamp("Mon Jan 02 15:04:60.5 2024"), None);
        assert_eq!(parse_timestamp("Sun Dec 31 23:59:60.000000 2023"), None);
        assert!(parse_timestamp("Sun Dec 31 23:59:59.5 2023").is_some());
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_extract_message_uses_last_marker() {
        let line = "x PHP message: first PHP message:   second  ";
        assert_eq!(extract_message(line), "second");
    }

    #[test]
    fn test_extract_message_keeps_raw_line_without_marker() {
        let line = "  [core:error] something broke  ";
        assert_eq!(extract_message(line), line);
    }

    #[test]
    fn test_resolution_table_order() {
        // Both patterns present: the earlier table entry wins.
        assert_eq!(
            suggest_resolution("client denied Fatal error", "x"),
            "Check server configuration and access permissions"
        );
        assert_eq!(
            suggest_resolution("Undefined variable / Undefined array key", "x"),
            "Review variable initialization in x"
        );
    }

    #[test]
    fn test_match_resolution_without_match() {
        assert_eq!(match_resolution("php", "x"), None);
        assert_eq!(
            match_resolution("Undefined array key \"id\"", "shop").as_deref(),
            Some("Verify array keys and data structure in shop")
        );
    }

    #[test]
    fn test_priority_is_case_sensitive() {
        assert_eq!(classify_priority("fatal", "client DENIED"), Priority::Low);
        assert_eq!(classify_priority("warning", ""), Priority::Low);
    }
}
