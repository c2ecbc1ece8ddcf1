//! Batch command - audit every file in a directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use docaudit_core::{acquire_text, AuditConfig, ExtractionResult, ReportSink, RequestedCriteria};

use super::{load_config, CriteriaArgs, Engine, Evaluator};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Directory with the documents (not searched recursively)
    #[arg(required = true)]
    input_dir: PathBuf,

    #[command(flatten)]
    criteria: CriteriaArgs,

    /// CSV report to append to (default: report.path from the config)
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Number of documents processed concurrently (default: batch.jobs from the config)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Result engine
    #[arg(short, long, value_enum, default_value = "rules")]
    engine: Engine,
}

/// Shared state of one batch run.
struct BatchContext {
    config: AuditConfig,
    criteria: RequestedCriteria,
    evaluator: Evaluator,
}

/// Outcome of one file.
struct FileOutcome {
    name: String,
    result: Result<ExtractionResult, String>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;
    let criteria = args.criteria.parse()?;

    let files = list_files(&args.input_dir)?;
    if files.is_empty() {
        println!(
            "{} No files found in {}",
            style("ℹ").blue(),
            args.input_dir.display()
        );
        return Ok(());
    }

    let jobs = args.jobs.unwrap_or(config.batch.jobs).max(1);
    let report_path = args.report.clone().unwrap_or_else(|| config.report.path.clone());
    let mut sink = ReportSink::new(report_path);

    println!(
        "{} Found {} files to audit as {} for {}",
        style("ℹ").blue(),
        files.len(),
        style(criteria.document_type).cyan(),
        style(criteria.period).cyan()
    );

    let evaluator = Evaluator::new(args.engine, &config)?;
    let context = Arc::new(BatchContext {
        config,
        criteria,
        evaluator,
    });

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut outcomes = stream::iter(files)
        .map(|path| process_file(path, context.clone()))
        .buffer_unordered(jobs);

    let mut passed = 0usize;
    let mut not_passed = 0usize;
    let mut failures: Vec<(String, String)> = Vec::new();

    // This task is the only writer of the report
    while let Some(outcome) = outcomes.next().await {
        match outcome.result {
            Ok(result) => match sink.append(&outcome.name, &result) {
                Ok(()) => {
                    if result.validation.is_pass() {
                        passed += 1;
                    } else {
                        not_passed += 1;
                    }
                }
                Err(e) => {
                    warn!("{}: {}", outcome.name, e);
                    failures.push((outcome.name, e.to_string()));
                }
            },
            Err(e) => {
                warn!("Failed to audit {}: {}", outcome.name, e);
                failures.push((outcome.name, e));
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();

    let processed = passed + not_passed + failures.len();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        processed,
        start.elapsed()
    );
    println!(
        "   {} passed, {} did not pass, {} failed",
        style(passed).green(),
        style(not_passed).yellow(),
        style(failures.len()).red()
    );

    if passed + not_passed > 0 {
        println!("   Report: {}", sink.path().display());
    }

    if !failures.is_empty() {
        failures.sort();
        println!();
        println!("{}", style("Failed files:").red());
        for (name, error) in &failures {
            println!("  - {}: {}", name, error);
        }
    }

    Ok(())
}

/// Regular files directly inside `dir`, sorted by name.
fn list_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)
        .map_err(|e| anyhow::anyhow!("Cannot read directory {}: {}", dir.display(), e))?
    {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        } else {
            debug!("Skipping {}", path.display());
        }
    }

    files.sort();
    Ok(files)
}

async fn process_file(path: PathBuf, context: Arc<BatchContext>) -> FileOutcome {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let result = audit_file(path, context).await.map_err(|e| e.to_string());
    if let Ok(result) = &result {
        info!("{}: {} {}", name, result.document_type, result.validation);
    }

    FileOutcome { name, result }
}

async fn audit_file(path: PathBuf, context: Arc<BatchContext>) -> anyhow::Result<ExtractionResult> {
    let acquire_context = context.clone();
    let document =
        tokio::task::spawn_blocking(move || acquire_text(&path, &acquire_context.config)).await??;

    context.evaluator.evaluate(&document, &context.criteria).await
}
