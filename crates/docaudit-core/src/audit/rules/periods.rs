//! Period extraction for payslips (month + year) and tax returns (fiscal ranges).

use chrono::Month;
use regex::{Captures, Regex};

use super::patterns::{
    FISCAL_ASSESSMENT_YEAR, FISCAL_BARE, FISCAL_FINANCIAL_YEAR, MONTH_YEAR_NAMED,
    MONTH_YEAR_NUMERIC, PAY_PERIOD_LABEL,
};
use super::{ExtractionMatch, FieldExtractor};
use crate::error::CriteriaError;
use crate::models::document::{PeriodToken, RequestedType};

/// Fiscal year range extractor for income tax returns.
///
/// Assessment years are preferred over financial years, which are preferred
/// over unlabeled ranges.
pub struct FiscalRangeExtractor;

impl FiscalRangeExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FiscalRangeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for FiscalRangeExtractor {
    type Output = ExtractionMatch<PeriodToken>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        let patterns: [(&Regex, f32); 3] = [
            (&*FISCAL_ASSESSMENT_YEAR, 0.95),
            (&*FISCAL_FINANCIAL_YEAR, 0.9),
            (&*FISCAL_BARE, 0.7),
        ];

        for (pattern, confidence) in patterns {
            for caps in pattern.captures_iter(text) {
                if let Some(token) = normalize_fiscal_range(&caps[1], &caps[2]) {
                    results.push(matched(token, confidence, &caps));
                }
            }
        }

        results
    }
}

/// Month and year extractor for payslips.
///
/// A period next to a label such as "Pay Period" wins over one found
/// elsewhere; month names win over numeric `MM/YYYY` forms.
pub struct MonthYearExtractor;

impl MonthYearExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MonthYearExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for MonthYearExtractor {
    type Output = ExtractionMatch<PeriodToken>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        // Labeled periods: look only at the rest of the label's line
        for label in PAY_PERIOD_LABEL.find_iter(text) {
            let rest = &text[label.end()..];
            let line = rest.split('\n').next().unwrap_or("");

            if let Some(found) = first_month_year(line) {
                let offset = label.end();
                results.push(ExtractionMatch {
                    position: found.position.map(|(s, e)| (s + offset, e + offset)),
                    confidence: 0.95,
                    ..found
                });
            }
        }

        for caps in MONTH_YEAR_NAMED.captures_iter(text) {
            if let Some(token) = named_month_year(&caps) {
                results.push(matched(token, 0.85, &caps));
            }
        }

        for caps in MONTH_YEAR_NUMERIC.captures_iter(text) {
            if let Some(token) = numeric_month_year(&caps) {
                results.push(matched(token, 0.75, &caps));
            }
        }

        results
    }
}

/// Extract the period of the requested type from document text.
pub fn extract_period(text: &str, document_type: RequestedType) -> Option<PeriodToken> {
    let found = match document_type {
        RequestedType::Payslip => MonthYearExtractor::new().extract(text),
        RequestedType::ItReturn => FiscalRangeExtractor::new().extract(text),
    };

    found.map(|m| m.value)
}

/// Parse a caller-supplied period with the grammar of the requested type.
///
/// Uses the same recognizers and normalization as extraction, so "2024-25",
/// "AY 2024-25" and "2024 to 2025" all yield the same fiscal range.
pub fn parse_requested_period(
    document_type: RequestedType,
    period: &str,
) -> Result<PeriodToken, CriteriaError> {
    extract_period(period, document_type).ok_or_else(|| CriteriaError::InvalidPeriod {
        document_type: document_type.label().to_string(),
        period: period.to_string(),
        hint: match document_type {
            RequestedType::Payslip => "expected a month and year such as \"May 2025\" or \"05/2025\"",
            RequestedType::ItReturn => {
                "expected consecutive years such as \"2024-25\", \"2024-2025\" or \"AY 2024-25\""
            }
        },
    })
}

/// Build a fiscal range from a four-digit start and a two- or four-digit end.
///
/// A two-digit end takes the century of the start year, rolling over when
/// it would precede the start ("1999-00" is 1999-2000). Only consecutive
/// years form a fiscal range.
pub fn normalize_fiscal_range(start: &str, end: &str) -> Option<PeriodToken> {
    let start_year: i32 = start.parse().ok()?;
    let end_digits: i32 = end.parse().ok()?;

    let end_year = match end.len() {
        4 => end_digits,
        2 => {
            let candidate = (start_year / 100) * 100 + end_digits;
            if candidate < start_year {
                candidate + 100
            } else {
                candidate
            }
        }
        _ => return None,
    };

    (end_year == start_year + 1).then_some(PeriodToken::FiscalRange {
        start_year,
        end_year,
    })
}

/// Map an English month name or abbreviation to a month.
pub fn month_from_name(name: &str) -> Option<Month> {
    let key: String = name.chars().take(3).flat_map(char::to_lowercase).collect();

    let number: u8 = match key.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };

    Month::try_from(number).ok()
}

fn named_month_year(caps: &Captures) -> Option<PeriodToken> {
    let month = month_from_name(&caps[1])?;
    let year: i32 = caps[2].parse().ok()?;
    Some(PeriodToken::MonthYear { month, year })
}

fn numeric_month_year(caps: &Captures) -> Option<PeriodToken> {
    let number: u8 = caps[1].parse().ok()?;
    let month = Month::try_from(number).ok()?;
    let year: i32 = caps[2].parse().ok()?;
    Some(PeriodToken::MonthYear { month, year })
}

fn first_month_year(fragment: &str) -> Option<ExtractionMatch<PeriodToken>> {
    if let Some(caps) = MONTH_YEAR_NAMED.captures(fragment) {
        if let Some(token) = named_month_year(&caps) {
            return Some(matched(token, 0.85, &caps));
        }
    }

    let caps = MONTH_YEAR_NUMERIC.captures(fragment)?;
    numeric_month_year(&caps).map(|token| matched(token, 0.75, &caps))
}

fn matched(token: PeriodToken, confidence: f32, caps: &Captures) -> ExtractionMatch<PeriodToken> {
    let (start, end) = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or_default();
    ExtractionMatch::new(token, confidence, &caps[0]).with_position(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn range(start_year: i32, end_year: i32) -> PeriodToken {
        PeriodToken::FiscalRange {
            start_year,
            end_year,
        }
    }

    fn month_year(month: Month, year: i32) -> PeriodToken {
        PeriodToken::MonthYear { month, year }
    }

    #[test]
    fn test_fiscal_range_forms() {
        let cases = [
            ("AY 2024-25", range(2024, 2025)),
            ("A.Y. 2024-2025", range(2024, 2025)),
            ("Assessment Year: 2024-25", range(2024, 2025)),
            ("FY 2023-24", range(2023, 2024)),
            ("for the period 2022-2023", range(2022, 2023)),
            ("2024 to 2025", range(2024, 2025)),
        ];

        for (text, expected) in cases {
            assert_eq!(
                extract_period(text, RequestedType::ItReturn),
                Some(expected),
                "{}",
                text
            );
        }
    }

    #[test]
    fn test_two_digit_end_year_normalization() {
        assert_eq!(normalize_fiscal_range("2024", "25"), Some(range(2024, 2025)));
        assert_eq!(normalize_fiscal_range("1999", "00"), Some(range(1999, 2000)));
        assert_eq!(normalize_fiscal_range("2024", "2025"), Some(range(2024, 2025)));
    }

    #[test]
    fn test_non_consecutive_ranges_are_rejected() {
        assert_eq!(normalize_fiscal_range("2024", "2026"), None);
        assert_eq!(normalize_fiscal_range("2024", "12"), None);
        // An ISO date is not a fiscal range
        assert_eq!(extract_period("Date: 2024-12-05", RequestedType::ItReturn), None);
    }

    #[test]
    fn test_assessment_year_preferred_over_financial_year() {
        let text = "Financial Year 2023-24\nAssessment Year 2024-25";
        assert_eq!(
            extract_period(text, RequestedType::ItReturn),
            Some(range(2024, 2025))
        );
    }

    #[test]
    fn test_month_year_forms() {
        let cases = [
            ("March 2023", month_year(Month::March, 2023)),
            ("Salary for SEP 2024", month_year(Month::September, 2024)),
            ("Aug. 2025", month_year(Month::August, 2025)),
            ("June, 2023", month_year(Month::June, 2023)),
            ("06/2023", month_year(Month::June, 2023)),
            ("Period: 11-2022", month_year(Month::November, 2022)),
        ];

        for (text, expected) in cases {
            assert_eq!(
                extract_period(text, RequestedType::Payslip),
                Some(expected),
                "{}",
                text
            );
        }
    }

    #[test]
    fn test_labeled_month_preferred() {
        let text = "Date of joining: January 2019\nPay Period: March 2023";
        assert_eq!(
            extract_period(text, RequestedType::Payslip),
            Some(month_year(Month::March, 2023))
        );
    }

    #[test]
    fn test_pay_period_range_resolves_to_first_month() {
        assert_eq!(
            extract_period("Pay Period: 26 Feb 2023 - 25 Mar 2023", RequestedType::Payslip),
            Some(month_year(Month::February, 2023))
        );
    }

    #[test]
    fn test_fiscal_label_on_line_above_range() {
        let text = "Assessment Year\n2024-25\nFY 2023-24";
        assert_eq!(
            extract_period(text, RequestedType::ItReturn),
            Some(range(2024, 2025))
        );
        assert_eq!(
            extract_period("Financial Year:\n 2023-24", RequestedType::ItReturn),
            Some(range(2023, 2024))
        );
    }

    #[test]
    fn test_month_without_year_is_not_a_period() {
        assert_eq!(extract_period("Payslip for March", RequestedType::Payslip), None);
        assert_eq!(extract_period("Net Pay 45000", RequestedType::Payslip), None);
    }

    #[test]
    fn test_parse_requested_period() {
        assert_eq!(
            parse_requested_period(RequestedType::ItReturn, "2024-25"),
            Ok(range(2024, 2025))
        );
        assert_eq!(
            parse_requested_period(RequestedType::Payslip, "05/2025"),
            Ok(month_year(Month::May, 2025))
        );
        assert!(parse_requested_period(RequestedType::Payslip, "2025").is_err());
        assert!(parse_requested_period(RequestedType::ItReturn, "2024-2026").is_err());
    }
}
