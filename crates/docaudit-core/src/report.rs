//! Append-only CSV report of audit results.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::ReportError;
use crate::models::document::ExtractionResult;

/// Fixed report columns.
pub const REPORT_HEADER: [&str; 5] = [
    "Filename",
    "Document Type",
    "Month/Year",
    "Validation",
    "Estimated Monthly Salary",
];

/// CSV report that grows by one row per audited document.
///
/// Every append rewrites the report through a temporary file in the same
/// directory and renames it into place, so a failed append leaves the
/// previous report intact. Appending takes `&mut self`: one sink, one writer.
#[derive(Debug)]
pub struct ReportSink {
    path: PathBuf,
}

impl ReportSink {
    /// Create a sink for the given file. Nothing is written until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Report file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one result row, writing the header first if the report is new.
    pub fn append(&mut self, filename: &str, result: &ExtractionResult) -> Result<(), ReportError> {
        self.write_row(filename, result)
            .map_err(|reason| ReportError::SinkWriteFailure {
                path: self.path.display().to_string(),
                reason,
            })?;

        debug!("Appended {} to {}", filename, self.path.display());
        Ok(())
    }

    fn write_row(&self, filename: &str, result: &ExtractionResult) -> Result<(), String> {
        let existing = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.to_string()),
        };

        let is_new = existing.iter().all(|b| b.is_ascii_whitespace());
        if !is_new {
            check_header(&existing)?;
        }

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| e.to_string())?;

        if !is_new {
            tmp.write_all(&existing).map_err(|e| e.to_string())?;
            if !existing.ends_with(b"\n") {
                tmp.write_all(b"\n").map_err(|e| e.to_string())?;
            }
        }

        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(&mut tmp);

            if is_new {
                writer.write_record(REPORT_HEADER).map_err(|e| e.to_string())?;
            }

            let [document_type, month_year, validation, salary] = result.fields();
            writer
                .write_record([
                    filename,
                    document_type.as_str(),
                    month_year.as_str(),
                    validation.as_str(),
                    salary.as_str(),
                ])
                .map_err(|e| e.to_string())?;
            writer.flush().map_err(|e| e.to_string())?;
        }

        tmp.as_file().sync_all().map_err(|e| e.to_string())?;

        if let Ok(metadata) = fs::metadata(&self.path) {
            fs::set_permissions(tmp.path(), metadata.permissions()).map_err(|e| e.to_string())?;
        }

        tmp.persist(&self.path).map_err(|e| e.error.to_string())?;
        Ok(())
    }
}

fn check_header(existing: &[u8]) -> Result<(), String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(existing);

    let mut record = csv::StringRecord::new();
    let found = reader.read_record(&mut record).map_err(|e| e.to_string())?;

    if found && record.iter().eq(REPORT_HEADER) {
        Ok(())
    } else {
        Err(format!(
            "existing file does not start with the header {:?}",
            REPORT_HEADER.join(",")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{DocumentCategory, PeriodToken, ValidationOutcome};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    const HEADER_LINE: &str = "Filename,Document Type,Month/Year,Validation,Estimated Monthly Salary\n";

    fn passed() -> ExtractionResult {
        ExtractionResult {
            document_type: DocumentCategory::ItReturn,
            period: Some(PeriodToken::FiscalRange {
                start_year: 2024,
                end_year: 2025,
            }),
            validation: ValidationOutcome::Pass,
            estimated_monthly_salary: Some(Decimal::new(5_000_000, 2)),
        }
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        let mut sink = ReportSink::new(&path);

        sink.append("itr.pdf", &passed()).unwrap();
        sink.append(
            "notes, scanned.png",
            &ExtractionResult::type_mismatch(DocumentCategory::Invalid),
        )
        .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            format!(
                "{}{}{}",
                HEADER_LINE,
                "itr.pdf,IT Return,2024-2025,Pass,50000.00\n",
                "\"notes, scanned.png\",Invalid Document,Not Applicable,FailTypeMismatch,Not Applicable\n"
            )
        );
    }

    #[test]
    fn test_empty_file_gets_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        fs::write(&path, "").unwrap();

        ReportSink::new(&path).append("itr.pdf", &passed()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(HEADER_LINE));
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_foreign_file_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        fs::write(&path, "name,amount\nrent,1200\n").unwrap();

        let err = ReportSink::new(&path).append("itr.pdf", &passed()).unwrap_err();
        assert!(matches!(err, ReportError::SinkWriteFailure { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "name,amount\nrent,1200\n");
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("summary.csv");

        assert!(ReportSink::new(&path).append("itr.pdf", &passed()).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_appends_after_unterminated_last_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        fs::write(&path, HEADER_LINE.trim_end()).unwrap();

        ReportSink::new(&path).append("itr.pdf", &passed()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            format!("{}itr.pdf,IT Return,2024-2025,Pass,50000.00\n", HEADER_LINE)
        );
    }
}
