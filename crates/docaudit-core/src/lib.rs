//! Core library for financial document auditing.
//!
//! This crate provides:
//! - Text acquisition from PDFs (embedded text) and images (OCR)
//! - Document classification (payslip, IT return) from fixed keyword sets
//! - Period extraction and strict period validation against a requested period
//! - Salary extraction, gated on full validation success
//! - An append-only CSV report sink
//! - The prompt/response contract for an optional generative backend

pub mod audit;
pub mod error;
pub mod models;
pub mod ocr;
pub mod pdf;
#[cfg(feature = "native")]
pub mod report;
pub mod source;

pub use audit::{audit_text, AuditReport, DocumentAuditor, RuleAuditor};
pub use error::{AuditError, Result};
pub use models::config::AuditConfig;
pub use models::document::{
    Document, DocumentCategory, ExtractionResult, PeriodToken, RequestedCriteria, RequestedType,
    ValidationOutcome, NOT_APPLICABLE,
};
pub use ocr::{OcrLine, OcrResult};
pub use pdf::{PdfContent, PdfExtractor, PdfProcessor, PdfType};
#[cfg(feature = "native")]
pub use report::{ReportSink, REPORT_HEADER};
pub use source::{acquire_text, SourceKind};
