//! Salary extraction for validated documents.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;
use tracing::debug;

use super::amounts::{find_labeled_amount, LabeledAmount};
use super::patterns::{PAY_LABEL, TOTAL_INCOME_LABEL};
use crate::models::document::RequestedType;

/// A salary label in order of preference.
struct SalaryLabel {
    name: &'static str,
    pattern: &'static Regex,
    /// Required value of capture group 1, lowercased (`None` = group absent).
    qualifier: Option<&'static str>,
}

lazy_static! {
    static ref IT_RETURN_LABELS: [SalaryLabel; 2] = [
        SalaryLabel {
            name: "Total Income",
            pattern: &TOTAL_INCOME_LABEL,
            qualifier: None,
        },
        SalaryLabel {
            name: "Gross Total Income",
            pattern: &TOTAL_INCOME_LABEL,
            qualifier: Some("gross"),
        },
    ];

    static ref PAYSLIP_LABELS: [SalaryLabel; 2] = [
        SalaryLabel {
            name: "Net Pay",
            pattern: &PAY_LABEL,
            qualifier: Some("net"),
        },
        SalaryLabel {
            name: "Gross Pay",
            pattern: &PAY_LABEL,
            qualifier: Some("gross"),
        },
    ];
}

/// Find the salary figure the document states, in label preference order.
///
/// Returns the first label with a parsable value. When no label has one, the
/// first unparsable label is reported so callers can tell "present but
/// unreadable" from "absent".
pub fn find_salary_figure(text: &str, document_type: RequestedType) -> LabeledAmount {
    let labels: &[SalaryLabel] = match document_type {
        RequestedType::ItReturn => &*IT_RETURN_LABELS,
        RequestedType::Payslip => &*PAYSLIP_LABELS,
    };

    let mut unparsable = None;

    for label in labels {
        let found = find_labeled_amount(text, label.name, label.pattern, |caps| {
            let qualifier = caps.get(1).map(|m| m.as_str().trim().to_lowercase());
            qualifier.as_deref() == label.qualifier
        });

        match found {
            LabeledAmount::Value { .. } => return found,
            LabeledAmount::Unparsable { .. } => {
                unparsable.get_or_insert(found);
            }
            LabeledAmount::Missing => {}
        }
    }

    unparsable.unwrap_or(LabeledAmount::Missing)
}

/// Turn a stated figure into a monthly salary.
///
/// Tax returns state annual income: divide by 12 and round half away from
/// zero to two decimals. Payslip figures are already monthly.
pub fn monthly_salary(figure: Decimal, document_type: RequestedType) -> Decimal {
    match document_type {
        RequestedType::ItReturn => {
            let mut monthly = (figure / Decimal::from(12))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            monthly.rescale(2);
            monthly
        }
        RequestedType::Payslip => figure,
    }
}

/// Why a validated document has no salary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SalaryIssue {
    #[error("{label} value {raw:?} is not a number")]
    Unparsable { label: String, raw: String },

    #[error("no salary figure found for {0}")]
    Missing(RequestedType),
}

/// Extract the estimated monthly salary.
pub fn extract_salary(text: &str, document_type: RequestedType) -> Result<Decimal, SalaryIssue> {
    match find_salary_figure(text, document_type) {
        LabeledAmount::Value { label, amount } => {
            let monthly = monthly_salary(amount, document_type);
            debug!("Salary from {:?}: {} -> {} per month", label, amount, monthly);
            Ok(monthly)
        }
        LabeledAmount::Unparsable { label, raw } => Err(SalaryIssue::Unparsable { label, raw }),
        LabeledAmount::Missing => Err(SalaryIssue::Missing(document_type)),
    }
}
