//! CLI commands.

pub mod audit;
pub mod backend;
pub mod batch;
pub mod config;

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use tracing::debug;

use docaudit_core::{
    AuditConfig, Document, DocumentAuditor, ExtractionResult, RequestedCriteria, RuleAuditor,
    REPORT_HEADER,
};

use backend::OllamaClient;

/// Requested document type and period, shared by the audit commands.
#[derive(Args, Debug, Clone)]
pub struct CriteriaArgs {
    /// Expected document type ("Payslip" or "IT Return")
    #[arg(short = 't', long = "type")]
    document_type: String,

    /// Expected period ("March 2023", "05/2025", "2024-25", "AY 2024-25", ...)
    #[arg(short, long)]
    period: String,
}

impl CriteriaArgs {
    /// Parse and validate the criteria before any document is touched.
    pub fn parse(&self) -> anyhow::Result<RequestedCriteria> {
        let criteria = RequestedCriteria::parse(&self.document_type, &self.period)?;
        debug!(
            "Requested {} for period {}",
            criteria.document_type, criteria.period
        );
        Ok(criteria)
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output (header and one row)
    Csv,
    /// The four labeled result lines
    Text,
}

/// How results are produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Engine {
    /// Deterministic keyword and pattern rules
    Rules,
    /// Ask an Ollama server, then check its answer strictly
    Ollama,
}

/// A configured engine, ready to audit documents.
pub enum Evaluator {
    Rules(RuleAuditor),
    Ollama(OllamaClient),
}

impl Evaluator {
    pub fn new(engine: Engine, config: &AuditConfig) -> anyhow::Result<Self> {
        Ok(match engine {
            Engine::Rules => Evaluator::Rules(RuleAuditor::new()),
            Engine::Ollama => Evaluator::Ollama(OllamaClient::new(&config.backend)?),
        })
    }

    /// Audit one document.
    pub async fn evaluate(
        &self,
        document: &Document,
        criteria: &RequestedCriteria,
    ) -> anyhow::Result<ExtractionResult> {
        match self {
            Evaluator::Rules(auditor) => Ok(auditor.audit(document, criteria)),
            Evaluator::Ollama(client) => Ok(client.audit(document, criteria).await?),
        }
    }
}

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docaudit")
        .join("config.json")
}

/// Load configuration from an explicit path, the default location, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<AuditConfig> {
    if let Some(path) = config_path {
        return AuditConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path, e));
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(AuditConfig::from_file(&default_path)?)
    } else {
        Ok(AuditConfig::default())
    }
}

#[derive(Serialize)]
struct ResultRecord<'a> {
    filename: &'a str,
    #[serde(flatten)]
    result: &'a ExtractionResult,
}

/// Render a result in the requested output format.
pub fn format_result(
    filename: &str,
    result: &ExtractionResult,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&ResultRecord { filename, result })?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(REPORT_HEADER)?;

            let [document_type, month_year, validation, salary] = result.fields();
            wtr.write_record([
                filename,
                document_type.as_str(),
                month_year.as_str(),
                validation.as_str(),
                salary.as_str(),
            ])?;

            let data = String::from_utf8(wtr.into_inner()?)?;
            Ok(data.trim_end().to_string())
        }
        OutputFormat::Text => Ok(result.to_lines()),
    }
}
