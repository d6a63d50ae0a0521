use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wptriage_log::ir::Summary;
use wptriage_log::{generate_report, load_report, ErrorLogAnalyzer, LogSink, ReportOptions};

#[derive(Parser)]
#[command(name = "wptriage")]
#[command(about = "Triage WordPress error logs into a CSV report", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze an error log and write analysis_<source>_<YYYYMMDD>.csv
    Analyze {
        /// Path to the error log
        #[arg(value_name = "FILE")]
        path: PathBuf,
        /// Directory the report is written to
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output_dir: PathBuf,
        /// Date used in the report name instead of today
        #[arg(long, value_name = "YYYYMMDD", value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Also print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Parse an error log and print its records as JSON
    Parse {
        /// Path to the error log
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
    /// Recompute the summary of an existing report
    Summary {
        /// Path to an analysis_*.csv report
        #[arg(value_name = "REPORT")]
        report: PathBuf,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y%m%d").map_err(|e| format!("invalid date `{value}`: {e}"))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            path,
            output_dir,
            date,
            json,
        } => {
            let mut sink = LogSink;
            let analyzer = ErrorLogAnalyzer::new(&path)?;
            let analysis = analyzer
                .analyze(&mut sink)
                .inspect_err(|_| log::error!("Analysis failed"))
                .with_context(|| format!("analyzing {}", path.display()))?;
            if analysis.skipped() > 0 {
                log::warn!("Skipped {} unparsable error lines", analysis.skipped());
            }

            let mut options = ReportOptions {
                output_dir,
                ..ReportOptions::default()
            };
            if let Some(date) = date {
                options.run_date = date;
            }
            generate_report(&analysis, &options, &mut sink)
                .context("generating report")?;
            log::info!("Analysis completed successfully");

            if json {
                println!("{}", serde_json::to_string_pretty(&analysis.summary)?);
            }
        }
        Commands::Parse { path } => {
            let analysis = ErrorLogAnalyzer::new(&path)?
                .analyze(&mut LogSink)
                .with_context(|| format!("parsing {}", path.display()))?;
            println!("{}", serde_json::to_string_pretty(&analysis.records)?);
        }
        Commands::Summary { report, json } => {
            let records = load_report(&report)
                .with_context(|| format!("loading report {}", report.display()))?;
            let summary = Summary::from_records(&records);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
        }
    }
    Ok(())
}

fn print_summary(summary: &Summary) {
    println!("Total Errors: {}", summary.total);
    println!("Errors by Priority:");
    for (priority, count) in &summary.by_priority {
        println!("  {:<8} {}", priority, count);
    }
    println!("Errors by Component:");
    for (name, count) in summary.top_components() {
        println!("  {:<32} {}", name, count);
    }
}
