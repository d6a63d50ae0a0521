//! # wptriage log analyzer
//!
//! Parser, classifier and CSV reporter for WordPress error logs written by
//! Apache and PHP-FPM.
//!
//! ## Overview
//!
//! Each line carrying an `:error]` marker becomes one [`LogRecord`](ir::LogRecord):
//!
//! - **Timestamp** from the leading `[Mon Jan 02 15:04:05.123456 2024]` bracket
//! - **Error level** from the `[<token>:error]` bracket
//! - **Component** blamed from a `/wp-content/plugins/<name>/` or
//!   `/wp-content/themes/<name>/` path, falling back to WordPress core
//! - **Line number** from an `on line <N>` fragment
//! - **Priority** and a **suggested resolution** derived from the above
//!
//! Lines without the marker are ignored. A line that cannot be parsed is
//! reported to the run's [`EventSink`](sink::EventSink) and skipped.
//!
//! ## Pipeline
//!
//! ```text
//! error.log ──► ErrorLogAnalyzer ──► Analysis ──► generate_report ──► analysis_<id>_<date>.csv
//!                  │ LineParser           │ records + Summary
//!                  ▼                      ▼
//!               EventSink ◄───────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use wptriage_log::{ErrorLogAnalyzer, LogSink, ReportOptions, generate_report};
//!
//! let mut sink = LogSink;
//! let analyzer = ErrorLogAnalyzer::new("example.com-error.log")?;
//! let analysis = analyzer.analyze(&mut sink)?;
//! let path = generate_report(&analysis, &ReportOptions::default(), &mut sink)?;
//! println!("{} records written to {}", analysis.records.len(), path.display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Parsing a single line:
//!
//! ```
//! use wptriage_log::LineParser;
//! use wptriage_log::ir::{ComponentType, Priority};
//!
//! let parser = LineParser::new("example.com");
//! let record = parser
//!     .parse_line("[php:error] PHP message: boom in /srv/wp-content/themes/twenty/x.php on line 3")
//!     .unwrap();
//! assert_eq!(record.component_type, ComponentType::Theme);
//! assert_eq!(record.component_name, "twenty");
//! assert_eq!(record.line_number.as_deref(), Some("3"));
//! assert_eq!(record.priority, Priority::Low);
//! ```

/// Reading a log source into an [`Analysis`](analyzer::Analysis).
pub mod analyzer;
/// Error types.
pub mod error;
/// Record, enum and summary types.
pub mod ir;
/// Single-line parser and classifiers.
pub mod parser;
/// CSV report writing and reloading.
pub mod report;
/// Run event sinks.
pub mod sink;


pub use analyzer::{Analysis, ErrorLogAnalyzer};
pub use error::{AnalyzeError, ParseError, ReportError};
pub use ir::{LogRecord, Summary};
pub use parser::LineParser;
pub use report::{ReportOptions, generate_report, load_report};
pub use sink::{AnalysisEvent, EventSink, LogSink, MemorySink};
