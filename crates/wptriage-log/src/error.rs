use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A fault confined to a single input line. The line is dropped and the run continues.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line does not carry an `:error]` marker")]
    MissingErrorMarker,
    #[error("line {line_no} is not valid UTF-8")]
    InvalidUtf8 { line_no: usize },
}

/// Failure of the read-and-parse stage.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("failed to read log file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("log file name {0} has no usable stem")]
    InvalidSourceName(PathBuf),
}

/// Failure while writing or reloading a CSV report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to move report into place at {path}")]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read report {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed report row {row}: {reason}")]
    Malformed { row: usize, reason: String },
}
