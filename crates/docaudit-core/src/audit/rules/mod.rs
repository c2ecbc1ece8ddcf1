//! Rule-based extractors for payslips and income tax returns.

pub mod amounts;
pub mod classifier;
pub mod patterns;
pub mod periods;
pub mod salary;
pub mod validation;

pub use amounts::{parse_amount, find_labeled_amount, LabeledAmount};
pub use classifier::{classify, KeywordScore, IT_RETURN_KEYWORDS, PAYSLIP_KEYWORDS};
pub use periods::{extract_period, parse_requested_period, FiscalRangeExtractor, MonthYearExtractor};
pub use salary::{extract_salary, find_salary_figure, monthly_salary, SalaryIssue};
pub use validation::{check_requested_type, validate_period};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the preferred occurrence of the field.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field, most preferred first.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// Extraction context with confidence scores.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
