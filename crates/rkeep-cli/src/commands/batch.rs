//! Batch command - extract totals from many receipt files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use rkeep_core::models::config::RkeepConfig;
use rkeep_core::{ExtractionReport, ExtractionResult, TextRecognizer, TotalExtractor};

use super::extract::{format_report_text, OutputFormat};
use super::{is_supported, load_config, InputRecognizer};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory for per-file reports
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    report: Option<ExtractionReport>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_supported(p))
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let extractor = config.build_extractor()?;
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let result = process_single_file(&path, &extractor, &args, &config).await;
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match result {
            Ok(report) => results.push(ProcessResult {
                path,
                report: Some(report),
                error: None,
                processing_time_ms,
            }),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        report: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        }

        progress.inc(1);
    }

    progress.finish_and_clear();

    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            if let Some(report) = &result.report {
                let output_path = report_path(output_dir, &result.path, args.format);
                let content = match args.format {
                    OutputFormat::Json => serde_json::to_string_pretty(report)?,
                    OutputFormat::Text => format_report_text(report),
                };
                fs::write(&output_path, content)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let found = results
        .iter()
        .filter(|r| matches!(r.report.as_ref().map(|r| r.result), Some(ExtractionResult::Found(_))))
        .count();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} totals found, {} need manual entry, {} failed",
        style(found).green(),
        style(results.len() - found - failed.len()).yellow(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

async fn process_single_file(
    path: &Path,
    extractor: &TotalExtractor,
    args: &BatchArgs,
    config: &RkeepConfig,
) -> anyhow::Result<ExtractionReport> {
    let recognizer = InputRecognizer::for_input(path, config, args.model_dir.as_deref())?;
    let image = fs::read(path)?;
    let text = recognizer
        .recognize(&image)
        .await
        .map_err(|e| anyhow::anyhow!("Could not process image: {}", e))?;
    Ok(extractor.report(&text))
}

fn report_path(output_dir: &Path, input: &Path, format: OutputFormat) -> PathBuf {
    let name = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("receipt");
    let extension = match format {
        OutputFormat::Json => "json",
        OutputFormat::Text => "txt",
    };
    output_dir.join(format!("{}.{}", name, extension))
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "total",
        "candidates",
        "kept",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        match &result.report {
            Some(report) => {
                let (status, total) = match report.result {
                    ExtractionResult::Found(amount) => ("found", amount.to_string()),
                    ExtractionResult::NotFound => ("not_found", String::new()),
                };
                wtr.write_record([
                    filename,
                    status,
                    &total,
                    &report.candidates.len().to_string(),
                    &report.kept.len().to_string(),
                    &result.processing_time_ms.to_string(),
                    "",
                ])?;
            }
            None => {
                wtr.write_record([
                    filename,
                    "error",
                    "",
                    "",
                    "",
                    &result.processing_time_ms.to_string(),
                    result.error.as_deref().unwrap_or(""),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
