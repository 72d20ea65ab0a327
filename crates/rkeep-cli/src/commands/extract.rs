//! Extract command - report the resolved total of one receipt without prompting.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use rkeep_core::{ExtractionReport, ExtractionResult, TextRecognizer};

use super::{load_config, InputRecognizer};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Receipt image, or a .txt file holding already-recognized text
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Extracting total from: {}", args.input.display());

    let extractor = config.build_extractor()?;
    let recognizer = InputRecognizer::for_input(&args.input, &config, args.model_dir.as_deref())?;
    let image = fs::read(&args.input)?;

    let text = recognizer
        .recognize(&image)
        .await
        .map_err(|e| anyhow::anyhow!("Could not process image: {}", e))?;

    let report = extractor.report(&text);

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&report)?,
        OutputFormat::Text => format_report_text(&report),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn format_report_text(report: &ExtractionReport) -> String {
    let mut output = String::new();

    match report.result {
        ExtractionResult::Found(amount) => output.push_str(&format!("Total: {}\n", amount)),
        ExtractionResult::NotFound => output.push_str("Total: not found\n"),
    }

    output.push_str(&format!(
        "Candidates: {} ({} after tip filtering)\n",
        report.candidates.len(),
        report.kept.len()
    ));

    for candidate in &report.candidates {
        let marker = if report.kept.contains(candidate) { " " } else { "x" };
        output.push_str(&format!(
            "  [{}] {:<12} {:>10}  ({:?})\n",
            marker, candidate.keyword, candidate.amount, candidate.tier
        ));
    }

    if report.result == ExtractionResult::NotFound {
        output.push_str("\nRecognized text:\n");
        output.push_str(&report.raw_text);
        output.push('\n');
    }

    output
}
