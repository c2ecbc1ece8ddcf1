//! Document auditing: keyword classification, period validation and salary
//! extraction, plus the prompt/response contract for a generative backend.

pub mod backend;
mod pipeline;
pub mod rules;

pub use pipeline::{audit_text, AuditReport, DocumentAuditor, RuleAuditor};
