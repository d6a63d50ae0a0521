use crate::error::{AnalyzeError, ParseError};
use crate::ir::{LogRecord, Summary};
use crate::parser::{is_error_line, LineParser};
use crate::sink::{AnalysisEvent, EventSink};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Suffix stripped from a log file stem to obtain its source id.
const ERROR_SUFFIX: &str = "-error";

/// Result of reading and parsing one log source.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub source_id: String,
    /// Records in input order.
    pub records: Vec<LogRecord>,
    pub summary: Summary,
    pub lines_read: usize,
    /// Lines that carried the error marker.
    pub error_lines: usize,
}

impl Analysis {
    /// Error lines that did not produce a record.
    pub fn skipped(&self) -> usize {
        self.error_lines - self.records.len()
    }
}

/// Derives the source id from a log file name: the stem, cut before the
/// first `-error`.
///
/// `example.com-error.log` becomes `example.com`; `site.log` stays `site`.
pub fn source_id_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_string_lossy();
    let id = stem.split(ERROR_SUFFIX).next().unwrap_or_default();
    Some(id.to_string())
}

/// Reads an error log from disk and collects its records.
#[derive(Debug, Clone)]
pub struct ErrorLogAnalyzer {
    path: PathBuf,
    parser: LineParser,
}

impl ErrorLogAnalyzer {
    /// Prepares an analyzer for `path`. The file is not opened yet.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, AnalyzeError> {
        let path = path.into();
        let source_id = source_id_from_path(&path)
            .ok_or_else(|| AnalyzeError::InvalidSourceName(path.clone()))?;
        Ok(Self {
            parser: LineParser::new(source_id),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source_id(&self) -> &str {
        self.parser.source_id()
    }

    /// Opens the log file and analyzes it.
    ///
    /// A missing or unreadable file aborts the analysis; individual lines
    /// that fail to parse are reported to `sink` and skipped.
    pub fn analyze(&self, sink: &mut dyn EventSink) -> Result<Analysis, AnalyzeError> {
        let read_error = |source: io::Error| AnalyzeError::Read {
            path: self.path.clone(),
            source,
        };
        let file = File::open(&self.path).map_err(read_error)?;
        sink.record(AnalysisEvent::Started {
            path: self.path.clone(),
            source_id: self.source_id().to_string(),
        });
        self.analyze_reader(BufReader::new(file), sink)
            .map_err(read_error)
    }

    /// Analyzes lines from any buffered reader.
    pub fn analyze_reader<R: BufRead>(
        &self,
        reader: R,
        sink: &mut dyn EventSink,
    ) -> io::Result<Analysis> {
        let mut records = Vec::new();
        let mut lines_read = 0;
        let mut error_lines = 0;

        for (idx, chunk) in reader.split(b'\n').enumerate() {
            let mut bytes = chunk?;
            let line_no = idx + 1;
            lines_read += 1;
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }

            let line = match String::from_utf8(bytes) {
                Ok(line) => line,
                Err(err) => {
                    if is_error_line(&String::from_utf8_lossy(err.as_bytes())) {
                        error_lines += 1;
                        sink.record(AnalysisEvent::ParseFailed {
                            line_no,
                            error: ParseError::InvalidUtf8 { line_no },
                        });
                    }
                    continue;
                }
            };

            if !is_error_line(&line) {
                continue;
            }
            error_lines += 1;
            if let Some(record) = self.parser.parse(&line, line_no, sink) {
                records.push(record);
            }
        }

        sink.record(AnalysisEvent::Parsed {
            lines_read,
            error_lines,
            records: records.len(),
        });

        Ok(Analysis {
            source_id: self.source_id().to_string(),
            summary: Summary::from_records(&records),
            records,
            lines_read,
            error_lines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_id_strips_error_suffix() {
        assert_eq!(
            source_id_from_path(Path::new("/var/log/example.com-error.log")).as_deref(),
            Some("example.com")
        );
        assert_eq!(
            source_id_from_path(Path::new("shop-error-2024.log")).as_deref(),
            Some("shop")
        );
        assert_eq!(
            source_id_from_path(Path::new("site.log")).as_deref(),
            Some("site")
        );
    }

    #[test]
    fn test_source_id_requires_a_file_name() {
        assert_eq!(source_id_from_path(Path::new("/")), None);
        assert!(matches!(
            ErrorLogAnalyzer::new("/"),
            Err(AnalyzeError::InvalidSourceName(_))
        ));
    }
}
