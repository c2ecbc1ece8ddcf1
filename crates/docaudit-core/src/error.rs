//! Error types for the docaudit-core library.

use thiserror::Error;

/// Main error type for the docaudit library.
#[derive(Error, Debug)]
pub enum AuditError {
    /// Text acquisition error.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Requested criteria could not be understood.
    #[error("invalid criteria: {0}")]
    Criteria(#[from] CriteriaError),

    /// Report sink error.
    #[error("report error: {0}")]
    Report(#[from] ReportError),

    /// Generative backend error.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while obtaining text from a file.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The file extension is not one we can read text from.
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// The file could not be turned into text.
    #[error("text extraction failed for {file}: {reason}")]
    ExtractionFailure { file: String, reason: String },
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// OCR support was not compiled in.
    #[error("OCR is not available in this build")]
    Unavailable,
}

/// Errors in the caller-supplied type and period.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CriteriaError {
    /// The requested document type is neither a payslip nor an IT return.
    #[error("unknown document type: {0:?} (expected \"Payslip\" or \"IT Return\")")]
    UnknownDocumentType(String),

    /// The requested period does not follow the grammar of the requested type.
    #[error("invalid period {period:?} for {document_type}: {hint}")]
    InvalidPeriod {
        document_type: String,
        period: String,
        hint: &'static str,
    },
}

/// Errors raised by the report sink.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The row could not be persisted; the report is left as it was.
    #[error("failed to write report {path}: {reason}")]
    SinkWriteFailure { path: String, reason: String },
}

/// Errors raised by a generative backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend answered, but not with the four-line result.
    #[error("backend protocol violation: {0}")]
    ProtocolViolation(String),

    /// The backend could not be reached or returned an HTTP error.
    #[error("backend request failed: {0}")]
    Request(String),
}

/// Result type for the docaudit library.
pub type Result<T> = std::result::Result<T, AuditError>;
