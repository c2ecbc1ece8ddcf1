//! Prompt and response contract for a generative text backend.
//!
//! The backend receives the rules in prose and must answer with exactly four
//! labeled lines. Anything else is a [`BackendError::ProtocolViolation`];
//! responses are never repaired or partially accepted.

use std::str::FromStr;

use super::rules::{parse_amount, parse_requested_period, validate_period};
use super::rules::{IT_RETURN_KEYWORDS, PAYSLIP_KEYWORDS};
use crate::error::BackendError;
use crate::models::document::{
    DocumentCategory, ExtractionResult, RequestedCriteria, RequestedType, ValidationOutcome,
    NOT_APPLICABLE,
};

/// Labels of the four response lines, in order.
pub const RESPONSE_LABELS: [&str; 4] = [
    "Document Type",
    "Month/Year",
    "Validation",
    "Estimated Monthly Salary",
];

/// Build the instruction prompt for one document.
pub fn build_prompt(text: &str, criteria: &RequestedCriteria) -> String {
    let salary_rule = match criteria.document_type {
        RequestedType::ItReturn => {
            "take \"Total Income\" (or \"Gross Total Income\" when it is absent), divide it by 12 \
             and round to 2 decimal places"
        }
        RequestedType::Payslip => {
            "take \"Net Pay\" (or \"Gross Pay\" when it is absent) unchanged"
        }
    };

    let period_rule = match criteria.document_type {
        RequestedType::ItReturn => {
            "find the assessment or financial year range (for example \"AY 2024-25\" or \
             \"2024-2025\") and write it as YYYY-YYYY; both years must equal the requested range"
        }
        RequestedType::Payslip => {
            "find the month and year the payslip covers and write it as \"<Month> <YYYY>\"; \
             both month and year must equal the requested period"
        }
    };

    format!(
        "You audit financial documents. Follow these rules exactly.\n\
         \n\
         Requested document type: {requested_type}\n\
         Requested period: {requested_period}\n\
         \n\
         1. Count occurrences of these payslip phrases: {payslip}.\n\
         2. Count occurrences of these IT return phrases: {it_return}.\n\
         3. The document type is the category with the higher count: \"Payslip\" or \
         \"IT Return\". If the counts are equal (including zero) it is \"Invalid Document\".\n\
         4. If the document type differs from the requested type, write \"{na}\" for \
         Month/Year and Estimated Monthly Salary and \"FailTypeMismatch\" for Validation.\n\
         5. Otherwise {period_rule}. No period found: Month/Year is \"{na}\" and Validation \
         is \"FailPeriodNotFound\". Different period: Validation is \"FailPeriodMismatch\". \
         Same period: Validation is \"Pass\".\n\
         6. Only when Validation is \"Pass\": {salary_rule}. In every other case, and when \
         the figure is not a number, write \"{na}\".\n\
         \n\
         Answer with exactly these four lines and nothing else:\n\
         {l0}: <document type>\n\
         {l1}: <period or {na}>\n\
         {l2}: <Pass|FailTypeMismatch|FailPeriodNotFound|FailPeriodMismatch>\n\
         {l3}: <number or {na}>\n\
         \n\
         Document text:\n\
         {text}\n",
        requested_type = criteria.document_type,
        requested_period = criteria.period,
        payslip = quote_all(PAYSLIP_KEYWORDS),
        it_return = quote_all(IT_RETURN_KEYWORDS),
        na = NOT_APPLICABLE,
        period_rule = period_rule,
        salary_rule = salary_rule,
        l0 = RESPONSE_LABELS[0],
        l1 = RESPONSE_LABELS[1],
        l2 = RESPONSE_LABELS[2],
        l3 = RESPONSE_LABELS[3],
        text = text.trim(),
    )
}

fn quote_all(keywords: &[&str]) -> String {
    keywords
        .iter()
        .map(|k| format!("\"{}\"", k))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a backend answer into a result.
///
/// The answer must consist of the four labeled lines in order (blank lines
/// are ignored). Values must parse, and the result must be consistent with
/// the requested criteria: a type mismatch exactly when the category differs,
/// a period outcome that agrees with the stated period, and no salary or
/// period where none is allowed.
pub fn parse_backend_response(
    raw: &str,
    criteria: &RequestedCriteria,
) -> Result<ExtractionResult, BackendError> {
    let lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() != RESPONSE_LABELS.len() {
        return Err(violation(format!(
            "expected {} lines, got {}",
            RESPONSE_LABELS.len(),
            lines.len()
        )));
    }

    let mut values = [""; 4];
    for (i, (line, expected)) in lines.iter().zip(RESPONSE_LABELS).enumerate() {
        let (label, value) = line
            .split_once(':')
            .ok_or_else(|| violation(format!("line {} has no label: {:?}", i + 1, line)))?;

        if !label.trim().eq_ignore_ascii_case(expected) {
            return Err(violation(format!(
                "line {} should be {:?}, got {:?}",
                i + 1,
                expected,
                label.trim()
            )));
        }
        values[i] = value.trim();
    }

    let [document_type, month_year, validation, salary] = values;

    let document_type = DocumentCategory::from_str(document_type).map_err(violation)?;
    let validation = ValidationOutcome::from_str(validation).map_err(violation)?;

    let period = if is_not_applicable(month_year) {
        None
    } else {
        let token = parse_requested_period(criteria.document_type, month_year)
            .map_err(|e| violation(e.to_string()))?;
        Some(token)
    };

    let estimated_monthly_salary = if is_not_applicable(salary) {
        None
    } else {
        let amount = parse_amount(salary)
            .ok_or_else(|| violation(format!("salary {:?} is not a number", salary)))?;
        Some(amount)
    };

    let result = ExtractionResult {
        document_type,
        period,
        validation,
        estimated_monthly_salary,
    };

    if let Some(issue) = result.violations().into_iter().next() {
        return Err(violation(issue));
    }

    let type_matches = document_type.matches(criteria.document_type);
    if type_matches == (validation == ValidationOutcome::FailTypeMismatch) {
        return Err(violation(format!(
            "{} contradicts {} for requested {}",
            validation, document_type, criteria.document_type
        )));
    }

    if type_matches {
        let expected = validate_period(period.as_ref(), &criteria.period);
        if expected != validation {
            return Err(violation(format!(
                "period {} against requested {} is {}, not {}",
                result.month_year(),
                criteria.period,
                expected,
                validation
            )));
        }
    }

    Ok(result)
}

fn is_not_applicable(value: &str) -> bool {
    value.eq_ignore_ascii_case(NOT_APPLICABLE) || value.eq_ignore_ascii_case("N/A")
}

fn violation(reason: impl Into<String>) -> BackendError {
    BackendError::ProtocolViolation(reason.into())
}
