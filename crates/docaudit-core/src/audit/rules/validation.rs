//! Requested type and period validation.

use std::ops::ControlFlow;

use crate::models::document::{
    DocumentCategory, ExtractionResult, PeriodToken, RequestedType, ValidationOutcome,
};

/// Compare the classified category with the requested type.
///
/// A mismatch breaks out of the pipeline with the final result; nothing is
/// extracted from a document of the wrong type.
pub fn check_requested_type(
    category: DocumentCategory,
    requested: RequestedType,
) -> ControlFlow<ExtractionResult> {
    if category.matches(requested) {
        ControlFlow::Continue(())
    } else {
        ControlFlow::Break(ExtractionResult::type_mismatch(category))
    }
}

/// Compare an extracted period with the requested one.
///
/// Both sides are normalized tokens, so equality is exact: month and year
/// must both match, and fiscal ranges must agree on both endpoints.
pub fn validate_period(extracted: Option<&PeriodToken>, requested: &PeriodToken) -> ValidationOutcome {
    match extracted {
        None => ValidationOutcome::FailPeriodNotFound,
        Some(token) if token == requested => ValidationOutcome::Pass,
        Some(_) => ValidationOutcome::FailPeriodMismatch,
    }
}
