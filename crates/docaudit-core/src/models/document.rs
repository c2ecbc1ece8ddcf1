//! Document, request and result models for the audit pipeline.

use std::fmt;
use std::str::FromStr;

use chrono::Month;
use rust_decimal::Decimal;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::audit::rules::periods::parse_requested_period;
use crate::error::CriteriaError;

/// Placeholder rendered for fields that do not apply to a result.
pub const NOT_APPLICABLE: &str = "Not Applicable";

/// Extracted text of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Raw text as produced by PDF extraction or OCR.
    pub text: String,

    /// Where the text came from (usually the file name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Document {
    /// Create a document without a source identifier.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: None,
        }
    }

    /// Attach a source identifier.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Source identifier, or a placeholder for anonymous text.
    pub fn source_name(&self) -> &str {
        self.source.as_deref().unwrap_or("<text>")
    }
}

/// Document type a caller expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestedType {
    Payslip,
    ItReturn,
}

impl RequestedType {
    /// Display label, identical to the matching [`DocumentCategory`] label.
    pub fn label(self) -> &'static str {
        self.category().label()
    }

    /// Category a document must be classified as to satisfy this request.
    pub fn category(self) -> DocumentCategory {
        match self {
            RequestedType::Payslip => DocumentCategory::Payslip,
            RequestedType::ItReturn => DocumentCategory::ItReturn,
        }
    }
}

impl fmt::Display for RequestedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RequestedType {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "payslip" | "salaryslip" | "payslips" => Ok(RequestedType::Payslip),
            "itreturn" | "itr" | "incometaxreturn" | "taxreturn" => Ok(RequestedType::ItReturn),
            _ => Err(CriteriaError::UnknownDocumentType(s.to_string())),
        }
    }
}

/// Category assigned to a document by keyword classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentCategory {
    Payslip,
    ItReturn,
    Invalid,
}

impl DocumentCategory {
    /// Label used in results and reports.
    pub fn label(self) -> &'static str {
        match self {
            DocumentCategory::Payslip => "Payslip",
            DocumentCategory::ItReturn => "IT Return",
            DocumentCategory::Invalid => "Invalid Document",
        }
    }

    /// Whether this category satisfies the requested type.
    pub fn matches(self, requested: RequestedType) -> bool {
        self == requested.category()
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DocumentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "payslip" => Ok(DocumentCategory::Payslip),
            "it return" => Ok(DocumentCategory::ItReturn),
            "invalid document" | "invalid" => Ok(DocumentCategory::Invalid),
            other => Err(format!("unknown document type {:?}", other)),
        }
    }
}

/// A reporting period found in a document or requested by a caller.
///
/// Both variants are kept normalized: months are [`chrono::Month`] values and
/// fiscal end years always carry four digits, so derived equality is the
/// strict comparison used for validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodToken {
    /// Calendar month of a payslip.
    MonthYear { month: Month, year: i32 },
    /// Assessment or financial year range of a tax return.
    FiscalRange { start_year: i32, end_year: i32 },
}

impl fmt::Display for PeriodToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodToken::MonthYear { month, year } => write!(f, "{} {}", month.name(), year),
            PeriodToken::FiscalRange {
                start_year,
                end_year,
            } => write!(f, "{}-{}", start_year, end_year),
        }
    }
}

/// Outcome of validating a document against the requested criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationOutcome {
    Pass,
    FailTypeMismatch,
    FailPeriodNotFound,
    FailPeriodMismatch,
}

impl ValidationOutcome {
    /// Short name used in results and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationOutcome::Pass => "Pass",
            ValidationOutcome::FailTypeMismatch => "FailTypeMismatch",
            ValidationOutcome::FailPeriodNotFound => "FailPeriodNotFound",
            ValidationOutcome::FailPeriodMismatch => "FailPeriodMismatch",
        }
    }

    /// Human readable description.
    pub fn description(self) -> &'static str {
        match self {
            ValidationOutcome::Pass => "Pass",
            ValidationOutcome::FailTypeMismatch => "Fail - Document type mismatch",
            ValidationOutcome::FailPeriodNotFound => "Fail - Period not found",
            ValidationOutcome::FailPeriodMismatch => "Fail - Period mismatch",
        }
    }

    pub fn is_pass(self) -> bool {
        self == ValidationOutcome::Pass
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationOutcome {
    type Err = String;

    /// Accepts both the short names and the long descriptions.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "pass" => Ok(ValidationOutcome::Pass),
            "failtypemismatch" | "faildocumenttypemismatch" => {
                Ok(ValidationOutcome::FailTypeMismatch)
            }
            "failperiodnotfound" => Ok(ValidationOutcome::FailPeriodNotFound),
            "failperiodmismatch" => Ok(ValidationOutcome::FailPeriodMismatch),
            _ => Err(format!("unknown validation outcome {:?}", s.trim())),
        }
    }
}

/// Document type and period a caller expects, parsed once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedCriteria {
    /// Expected document type.
    pub document_type: RequestedType,
    /// Expected period, normalized with the same rules used for extraction.
    pub period: PeriodToken,
    /// Period as supplied by the caller.
    pub raw_period: String,
}

impl RequestedCriteria {
    /// Build criteria, rejecting a period that does not fit the type's grammar.
    pub fn new(document_type: RequestedType, period: &str) -> Result<Self, CriteriaError> {
        let token = parse_requested_period(document_type, period)?;
        Ok(Self {
            document_type,
            period: token,
            raw_period: period.trim().to_string(),
        })
    }

    /// Build criteria from two strings (e.g. command-line arguments).
    pub fn parse(document_type: &str, period: &str) -> Result<Self, CriteriaError> {
        Self::new(document_type.parse()?, period)
    }
}

/// The four-field result of auditing one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    /// Category the document was classified as.
    pub document_type: DocumentCategory,
    /// Period found in the document, if any was looked for and found.
    pub period: Option<PeriodToken>,
    /// Validation outcome.
    pub validation: ValidationOutcome,
    /// Monthly salary; only present when validation passed.
    pub estimated_monthly_salary: Option<Decimal>,
}

impl ExtractionResult {
    /// Result for a document whose category differs from the requested type.
    pub fn type_mismatch(document_type: DocumentCategory) -> Self {
        Self {
            document_type,
            period: None,
            validation: ValidationOutcome::FailTypeMismatch,
            estimated_monthly_salary: None,
        }
    }

    /// Rendered period, or [`NOT_APPLICABLE`].
    pub fn month_year(&self) -> String {
        self.period
            .map(|p| p.to_string())
            .unwrap_or_else(|| NOT_APPLICABLE.to_string())
    }

    /// Rendered salary, or [`NOT_APPLICABLE`].
    pub fn salary(&self) -> String {
        self.estimated_monthly_salary
            .map(|s| s.to_string())
            .unwrap_or_else(|| NOT_APPLICABLE.to_string())
    }

    /// The four fields in report column order.
    pub fn fields(&self) -> [String; 4] {
        [
            self.document_type.label().to_string(),
            self.month_year(),
            self.validation.as_str().to_string(),
            self.salary(),
        ]
    }

    /// The four labeled lines of the textual result format.
    pub fn to_lines(&self) -> String {
        let [document_type, month_year, validation, salary] = self.fields();
        format!(
            "Document Type: {}\nMonth/Year: {}\nValidation: {}\nEstimated Monthly Salary: {}",
            document_type, month_year, validation, salary
        )
    }

    /// Invariants every result must hold, returned as a list of violations.
    pub fn violations(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.estimated_monthly_salary.is_some() && !self.validation.is_pass() {
            issues.push(format!(
                "salary present although validation is {}",
                self.validation
            ));
        }

        if self.validation == ValidationOutcome::FailTypeMismatch && self.period.is_some() {
            issues.push("period present on a document type mismatch".to_string());
        }

        if self.validation == ValidationOutcome::FailPeriodNotFound && self.period.is_some() {
            issues.push("period present although none was found".to_string());
        }

        if matches!(
            self.validation,
            ValidationOutcome::Pass | ValidationOutcome::FailPeriodMismatch
        ) && self.period.is_none()
        {
            issues.push(format!("{} requires an extracted period", self.validation));
        }

        if self.validation != ValidationOutcome::FailTypeMismatch
            && self.document_type == DocumentCategory::Invalid
        {
            issues.push("an invalid document can only fail the type check".to_string());
        }

        issues
    }
}

impl Serialize for ExtractionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let [document_type, month_year, validation, salary] = self.fields();
        let mut state = serializer.serialize_struct("ExtractionResult", 4)?;
        state.serialize_field("document_type", &document_type)?;
        state.serialize_field("month_year", &month_year)?;
        state.serialize_field("validation", &validation)?;
        state.serialize_field("estimated_monthly_salary", &salary)?;
        state.end()
    }
}
