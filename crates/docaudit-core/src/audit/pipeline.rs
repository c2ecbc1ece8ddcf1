//! Rule-based audit pipeline.
//!
//! `classify -> check type [exit on mismatch] -> extract period -> validate
//! period -> (on pass) extract salary`. Every path ends in exactly one
//! [`ExtractionResult`].

use std::ops::ControlFlow;

use tracing::{debug, info, warn};

use super::rules::{
    check_requested_type, extract_salary, validate_period, ExtractionMatch, FieldExtractor,
    FiscalRangeExtractor, KeywordScore, MonthYearExtractor, SalaryIssue,
};
use crate::models::document::{
    Document, ExtractionResult, PeriodToken, RequestedCriteria, RequestedType,
};

/// Result of auditing one document, with the evidence behind it.
#[derive(Debug, Clone)]
pub struct AuditReport {
    /// The four-field result.
    pub result: ExtractionResult,
    /// Keyword counts that decided the document category.
    pub scores: KeywordScore,
    /// The period match that was validated, with where it came from.
    pub period_match: Option<ExtractionMatch<PeriodToken>>,
    /// Non-fatal findings, such as a salary label without a number.
    pub warnings: Vec<String>,
}

/// Trait for document auditors.
pub trait DocumentAuditor {
    /// Audit document text against the requested criteria.
    fn audit(&self, document: &Document, criteria: &RequestedCriteria) -> ExtractionResult;
}

/// Deterministic auditor built from keyword and pattern rules.
#[derive(Debug, Clone)]
pub struct RuleAuditor {
    /// Period matches below this confidence are ignored.
    min_period_confidence: f32,
}

impl RuleAuditor {
    /// Create an auditor that accepts every recognized period.
    pub fn new() -> Self {
        Self {
            min_period_confidence: 0.0,
        }
    }

    /// Ignore period matches below the given confidence.
    ///
    /// Labeled periods score 0.95, named months 0.85 and numeric months 0.75;
    /// assessment years 0.95, financial years 0.9 and bare ranges 0.7.
    pub fn with_min_period_confidence(mut self, confidence: f32) -> Self {
        self.min_period_confidence = confidence;
        self
    }

    /// Audit a document and keep the scores and warnings.
    pub fn audit_detailed(&self, document: &Document, criteria: &RequestedCriteria) -> AuditReport {
        let source = document.source_name();
        let text = document.text.as_str();
        let mut warnings = Vec::new();

        let scores = KeywordScore::of(text);
        let category = scores.category();
        debug!(
            "{}: keyword scores payslip={} it_return={} -> {}",
            source, scores.payslip, scores.it_return, category
        );

        if let ControlFlow::Break(result) = check_requested_type(category, criteria.document_type) {
            info!(
                "{}: classified as {}, requested {} -> {}",
                source, category, criteria.document_type, result.validation
            );
            return AuditReport {
                result,
                scores,
                period_match: None,
                warnings,
            };
        }

        let period_match = self.extract_period(text, criteria.document_type);
        let period = period_match.as_ref().map(|m| m.value);
        let validation = validate_period(period.as_ref(), &criteria.period);
        debug!(
            "{}: period {:?}, requested {} -> {}",
            source,
            period_match.as_ref().map(|m| m.source.as_str()),
            criteria.period,
            validation
        );

        let estimated_monthly_salary = if validation.is_pass() {
            match extract_salary(text, criteria.document_type) {
                Ok(monthly) => Some(monthly),
                Err(issue) => {
                    if let SalaryIssue::Unparsable { .. } = issue {
                        warn!("{}: {}", source, issue);
                    }
                    warnings.push(issue.to_string());
                    None
                }
            }
        } else {
            None
        };

        let result = ExtractionResult {
            document_type: category,
            period,
            validation,
            estimated_monthly_salary,
        };

        info!(
            "{}: {} {} -> {}",
            source,
            result.document_type,
            result.month_year(),
            result.validation
        );

        AuditReport {
            result,
            scores,
            period_match,
            warnings,
        }
    }

    fn extract_period(
        &self,
        text: &str,
        document_type: RequestedType,
    ) -> Option<ExtractionMatch<PeriodToken>> {
        let candidates = match document_type {
            RequestedType::Payslip => MonthYearExtractor::new().extract_all(text),
            RequestedType::ItReturn => FiscalRangeExtractor::new().extract_all(text),
        };

        candidates
            .into_iter()
            .find(|m| m.confidence >= self.min_period_confidence)
    }
}

impl Default for RuleAuditor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentAuditor for RuleAuditor {
    fn audit(&self, document: &Document, criteria: &RequestedCriteria) -> ExtractionResult {
        self.audit_detailed(document, criteria).result
    }
}

/// Audit raw text with the default rule auditor.
pub fn audit_text(text: &str, criteria: &RequestedCriteria) -> ExtractionResult {
    RuleAuditor::new().audit(&Document::new(text), criteria)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{DocumentCategory, ValidationOutcome, NOT_APPLICABLE};
    use pretty_assertions::assert_eq;

    fn criteria(document_type: RequestedType, period: &str) -> RequestedCriteria {
        RequestedCriteria::new(document_type, period).unwrap()
    }

    fn fields(result: &ExtractionResult) -> [String; 4] {
        assert!(result.violations().is_empty(), "{:?}", result.violations());
        result.fields()
    }

    #[test]
    fn test_scenario_a_it_return_pass() {
        let text = "INDIAN INCOME TAX RETURN ACKNOWLEDGEMENT\n\
                    Income Tax Return\n\
                    AY 2024-25\n\
                    Total Income: 600000";
        let result = audit_text(text, &criteria(RequestedType::ItReturn, "2024-2025"));

        assert_eq!(
            fields(&result),
            [
                "IT Return".to_string(),
                "2024-2025".to_string(),
                "Pass".to_string(),
                "50000.00".to_string(),
            ]
        );
    }

    #[test]
    fn test_scenario_b_payslip_pass() {
        let text = "ACME Pvt Ltd\nPayslip\nPay Period: March 2023\nBasic Pay 30,000\nNet Pay: 45000";
        let result = audit_text(text, &criteria(RequestedType::Payslip, "March 2023"));

        assert_eq!(
            fields(&result),
            [
                "Payslip".to_string(),
                "March 2023".to_string(),
                "Pass".to_string(),
                "45000".to_string(),
            ]
        );
    }

    #[test]
    fn test_scenario_c_period_not_found() {
        let result = audit_text("Payslip", &criteria(RequestedType::Payslip, "May 2025"));

        assert_eq!(result.document_type, DocumentCategory::Payslip);
        assert_eq!(result.validation, ValidationOutcome::FailPeriodNotFound);
        assert_eq!(result.month_year(), NOT_APPLICABLE);
        assert_eq!(result.salary(), NOT_APPLICABLE);
        assert!(result.violations().is_empty());
    }

    #[test]
    fn test_scenario_d_no_keywords() {
        let text = "Quarterly newsletter\nTeam lunch on Friday";
        let result = audit_text(text, &criteria(RequestedType::ItReturn, "2024-25"));

        assert_eq!(
            fields(&result),
            [
                "Invalid Document".to_string(),
                NOT_APPLICABLE.to_string(),
                "FailTypeMismatch".to_string(),
                NOT_APPLICABLE.to_string(),
            ]
        );
    }

    #[test]
    fn test_type_mismatch_ignores_period_content() {
        let text = "Payslip\nPay Period: March 2023\nNet Pay: 45000\nFY 2024-25";
        let result = audit_text(text, &criteria(RequestedType::ItReturn, "2024-25"));

        assert_eq!(result, ExtractionResult::type_mismatch(DocumentCategory::Payslip));
    }

    #[test]
    fn test_fiscal_range_requires_both_endpoints() {
        let text = "Income Tax Return\nAssessment Year 2025-26\nTotal Income 9,00,000";
        let result = audit_text(text, &criteria(RequestedType::ItReturn, "2024-2025"));

        assert_eq!(result.validation, ValidationOutcome::FailPeriodMismatch);
        assert_eq!(result.month_year(), "2025-2026");
        assert_eq!(result.salary(), NOT_APPLICABLE);
        assert!(result.violations().is_empty());
    }

    #[test]
    fn test_assessment_year_on_line_below_label() {
        let text = "Income Tax Return\nAssessment Year\n2024-25\nFY 2023-24\nTotal Income 600000";
        let result = audit_text(text, &criteria(RequestedType::ItReturn, "2024-25"));

        assert_eq!(
            fields(&result),
            [
                "IT Return".to_string(),
                "2024-2025".to_string(),
                "Pass".to_string(),
                "50000.00".to_string(),
            ]
        );
    }

    #[test]
    fn test_two_digit_request_matches_four_digit_document() {
        let text = "Income Tax Return 2024-2025\nGross Total Income: Rs. 12,00,000";
        let result = audit_text(text, &criteria(RequestedType::ItReturn, "2024-25"));

        assert_eq!(result.validation, ValidationOutcome::Pass);
        assert_eq!(result.salary(), "100000.00");
    }

    #[test]
    fn test_month_year_mismatch_keeps_extracted_period() {
        let text = "Salary Slip\nMay 2024\nNet Pay 40000";
        let result = audit_text(text, &criteria(RequestedType::Payslip, "May 2025"));

        assert_eq!(result.validation, ValidationOutcome::FailPeriodMismatch);
        assert_eq!(result.month_year(), "May 2024");
        assert_eq!(result.estimated_monthly_salary, None);
    }

    #[test]
    fn test_unparsable_salary_is_a_warning() {
        let document = Document::new("Payslip\nMarch 2023\nNet Pay: withheld").with_source("a.pdf");
        let report = RuleAuditor::new()
            .audit_detailed(&document, &criteria(RequestedType::Payslip, "03/2023"));

        assert_eq!(report.result.validation, ValidationOutcome::Pass);
        assert_eq!(report.result.salary(), NOT_APPLICABLE);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("Net Pay"));
        assert!(report.result.violations().is_empty());
    }

    #[test]
    fn test_missing_salary_is_a_warning() {
        let document = Document::new("Income Tax Return\nAY 2024-25");
        let report = RuleAuditor::new()
            .audit_detailed(&document, &criteria(RequestedType::ItReturn, "2024-25"));

        assert_eq!(report.result.validation, ValidationOutcome::Pass);
        assert_eq!(report.warnings, vec!["no salary figure found for IT Return".to_string()]);
    }

    #[test]
    fn test_period_match_is_reported() {
        let text = "Payslip\nPay Period: March 2023\nNet Pay 1000";
        let report = RuleAuditor::new()
            .audit_detailed(&Document::new(text), &criteria(RequestedType::Payslip, "March 2023"));

        let found = report.period_match.expect("period match");
        assert_eq!(found.source, "March 2023");
        assert_eq!(found.confidence, 0.95);
        let (start, end) = found.position.expect("position");
        assert_eq!(&text[start..end], "March 2023");
        assert_eq!(Some(found.value), report.result.period);
    }

    #[test]
    fn test_type_mismatch_has_no_period_match() {
        let report = RuleAuditor::new().audit_detailed(
            &Document::new("Payslip\nMarch 2023"),
            &criteria(RequestedType::ItReturn, "2024-25"),
        );
        assert!(report.period_match.is_none());
    }

    #[test]
    fn test_salary_only_on_pass() {
        let text = "Payslip\nMarch 2023\nNet Pay: 45000";
        for period in ["March 2023", "April 2023"] {
            let result = audit_text(text, &criteria(RequestedType::Payslip, period));
            assert_eq!(
                result.estimated_monthly_salary.is_some(),
                result.validation.is_pass(),
                "{}",
                period
            );
        }
    }

    #[test]
    fn test_min_period_confidence() {
        let auditor = RuleAuditor::new().with_min_period_confidence(0.9);
        let requested = criteria(RequestedType::Payslip, "March 2023");

        let unlabeled = Document::new("Payslip\n03/2023\nNet Pay 1000");
        assert_eq!(
            auditor.audit(&unlabeled, &requested).validation,
            ValidationOutcome::FailPeriodNotFound
        );

        let labeled = Document::new("Payslip\nPay Period: 03/2023\nNet Pay 1000");
        assert_eq!(auditor.audit(&labeled, &requested).validation, ValidationOutcome::Pass);
    }

    #[test]
    fn test_scores_are_reported() {
        let document = Document::new("Payslip\nNet Pay 100\nTotal Income");
        let report = RuleAuditor::new()
            .audit_detailed(&document, &criteria(RequestedType::Payslip, "May 2025"));

        assert_eq!(
            report.scores,
            KeywordScore {
                payslip: 2,
                it_return: 1
            }
        );
    }
}
