//! Audit commands - check a single document against the requested criteria.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use docaudit_core::{acquire_text, Document, ExtractionResult, ReportSink, RuleAuditor};

use super::{format_result, load_config, CriteriaArgs, Engine, Evaluator, OutputFormat};

/// Arguments for the audit command.
#[derive(Args)]
pub struct AuditArgs {
    /// Input file (PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    #[command(flatten)]
    criteria: CriteriaArgs,

    #[command(flatten)]
    output: OutputArgs,
}

/// Arguments for the audit-text command.
#[derive(Args)]
pub struct AuditTextArgs {
    /// Text file to audit (default: stdin)
    input: Option<PathBuf>,

    #[command(flatten)]
    criteria: CriteriaArgs,

    /// Filename recorded in the output and report
    #[arg(long)]
    name: Option<String>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also append the result to this CSV report
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Result engine
    #[arg(short, long, value_enum, default_value = "rules")]
    engine: Engine,

    /// Show keyword scores and extraction warnings (rules engine)
    #[arg(long)]
    explain: bool,
}

pub async fn run(args: AuditArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;
    let criteria = args.criteria.parse()?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Auditing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Extracting text...");

    let path = args.input.clone();
    let acquire_config = config.clone();
    let acquired = tokio::task::spawn_blocking(move || acquire_text(&path, &acquire_config)).await?;
    pb.finish_and_clear();
    let document = acquired?;

    let evaluator = Evaluator::new(args.output.engine, &config)?;
    let result = evaluator.evaluate(&document, &criteria).await?;

    finish(&document, &result, &args.output, &criteria)?;
    info!("Audit finished in {:?}", start.elapsed());
    Ok(())
}

pub async fn run_text(args: AuditTextArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let criteria = args.criteria.parse()?;

    let (text, default_name) = match &args.input {
        Some(path) if path.as_os_str() != "-" => {
            let text = fs::read_to_string(path)?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            (text, name)
        }
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            (text, "<stdin>".to_string())
        }
    };

    let document = Document::new(text).with_source(args.name.unwrap_or(default_name));

    let evaluator = Evaluator::new(args.output.engine, &config)?;
    let result = evaluator.evaluate(&document, &criteria).await?;

    finish(&document, &result, &args.output, &criteria)
}

fn finish(
    document: &Document,
    result: &ExtractionResult,
    args: &OutputArgs,
    criteria: &docaudit_core::RequestedCriteria,
) -> anyhow::Result<()> {
    let filename = document.source_name();

    if args.explain {
        let report = RuleAuditor::new().audit_detailed(document, criteria);
        eprintln!(
            "{} Keyword scores: payslip {}, IT return {}",
            style("ℹ").blue(),
            report.scores.payslip,
            report.scores.it_return
        );
        if let Some(found) = &report.period_match {
            let at = found
                .position
                .map(|(start, end)| format!(" at bytes {}..{}", start, end))
                .unwrap_or_default();
            eprintln!(
                "{} Period {} from {:?}{} (confidence {:.2})",
                style("ℹ").blue(),
                found.value,
                found.source,
                at,
                found.confidence
            );
        }
        for warning in &report.warnings {
            eprintln!("{} {}", style("⚠").yellow(), warning);
        }
    }

    let output = format_result(filename, result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, format!("{}\n", output))?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if let Some(report_path) = &args.report {
        ReportSink::new(report_path).append(filename, result)?;
        eprintln!(
            "{} Appended to report {}",
            style("✓").green(),
            report_path.display()
        );
    }

    Ok(())
}
