use chrono::Utc;
use clap::{Args, ValueEnum};
use esg_scoring::error::AppError;
use esg_scoring::scoring::{ScoreReport, SubfactorScores};
use serde_json::Value;
use std::io::{Read, Write};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON file holding `final_subfactor_scores` ("-" reads stdin)
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Output format for the report
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub(crate) format: ReportFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ReportFormat {
    Text,
    Json,
    Csv,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let raw = read_input(&args.input)?;
    let report = score_document(&raw)?;

    let stdout = std::io::stdout();
    render_report(&report, args.format, stdout.lock())
}

fn read_input(path: &PathBuf) -> Result<String, AppError> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        return Ok(buffer);
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Accepts either the request envelope `{ "final_subfactor_scores": {...} }`
/// or the bare category object.
pub(crate) fn score_document(raw: &str) -> Result<ScoreReport, AppError> {
    let document: Value = serde_json::from_str(raw)?;
    let scores_value = document.get("final_subfactor_scores").unwrap_or(&document);
    let scores = SubfactorScores::from_json("final_subfactor_scores", scores_value)?;
    Ok(ScoreReport::build(&scores, Utc::now()))
}

pub(crate) fn render_report<W: Write>(
    report: &ScoreReport,
    format: ReportFormat,
    mut writer: W,
) -> Result<(), AppError> {
    match format {
        ReportFormat::Text => writer.write_all(report.render_text().as_bytes())?,
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, report)?;
            writeln!(writer)?;
        }
        ReportFormat::Csv => report.write_csv(&mut writer)?,
    }
    writer.flush()?;
    Ok(())
}
