//! Keyword classification of document text.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::document::DocumentCategory;

/// Phrases that indicate a payslip.
pub const PAYSLIP_KEYWORDS: &[&str] = &[
    "payslip",
    "salary slip",
    "pay period",
    "basic pay",
    "incentive pay",
    "house rent allowance",
    "meal allowance",
    "total earnings",
    "total deductions",
    "net pay",
    "total amount",
    "take home",
    "employer signature",
    "employee signature",
];

/// Phrases that indicate an income tax return.
pub const IT_RETURN_KEYWORDS: &[&str] = &[
    "indian income tax return acknowledgement",
    "income tax return",
    "itr-1",
    "itr-2",
    "itr-3",
    "itr-4",
    "itr-5",
    "itr-6",
    "itr-7",
    "assessment year",
    "ay 20",
    "financial year",
    "fy 20",
    "filed u/s",
    "total income",
    "gross total income",
    "itr verification form",
    "verification code",
];

lazy_static! {
    static ref PAYSLIP_PATTERNS: Vec<Regex> = PAYSLIP_KEYWORDS.iter().map(|k| keyword_pattern(k)).collect();
    static ref IT_RETURN_PATTERNS: Vec<Regex> = IT_RETURN_KEYWORDS.iter().map(|k| keyword_pattern(k)).collect();
}

/// Build a case-insensitive, whitespace-tolerant pattern for a keyword.
///
/// Keywords match on word boundaries. Year prefixes such as "ay 20" stay
/// open on the right so they match "AY 2024-25".
fn keyword_pattern(keyword: &str) -> Regex {
    let body = keyword
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");

    let tail = if keyword.ends_with(" 20") { "" } else { r"\b" };

    Regex::new(&format!(r"(?i)\b{}{}", body, tail)).unwrap()
}

fn count_hits(patterns: &[Regex], text: &str) -> usize {
    patterns.iter().map(|p| p.find_iter(text).count()).sum()
}

/// Keyword occurrence counts for both document categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeywordScore {
    /// Occurrences of payslip keywords.
    pub payslip: usize,
    /// Occurrences of IT return keywords.
    pub it_return: usize,
}

impl KeywordScore {
    /// Count every keyword occurrence in the text.
    ///
    /// Nested phrases count once per keyword, so "Gross Total Income"
    /// scores for both "gross total income" and "total income".
    pub fn of(text: &str) -> Self {
        Self {
            payslip: count_hits(&PAYSLIP_PATTERNS, text),
            it_return: count_hits(&IT_RETURN_PATTERNS, text),
        }
    }

    /// Category implied by the counts. Equal counts (including zero) are invalid.
    pub fn category(&self) -> DocumentCategory {
        match self.payslip.cmp(&self.it_return) {
            std::cmp::Ordering::Greater => DocumentCategory::Payslip,
            std::cmp::Ordering::Less => DocumentCategory::ItReturn,
            std::cmp::Ordering::Equal => DocumentCategory::Invalid,
        }
    }
}

/// Classify document text by keyword counts.
pub fn classify(text: &str) -> DocumentCategory {
    KeywordScore::of(text).category()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_keywords_is_invalid() {
        assert_eq!(classify(""), DocumentCategory::Invalid);
        assert_eq!(
            classify("Grocery list: milk, eggs, bread. Meeting on Tuesday."),
            DocumentCategory::Invalid
        );
    }

    #[test]
    fn test_classify_payslip() {
        let text = "ACME Ltd\nPAYSLIP\nBasic Pay 30,000\nNet Pay: 45000";
        assert_eq!(classify(text), DocumentCategory::Payslip);
    }

    #[test]
    fn test_classify_it_return() {
        let text = "INDIAN INCOME TAX RETURN ACKNOWLEDGEMENT\nAssessment Year 2024-25\nITR-1";
        assert_eq!(classify(text), DocumentCategory::ItReturn);
    }

    #[test]
    fn test_keyword_whitespace_and_case() {
        let score = KeywordScore::of("net\n  PAY  and Salary   Slip");
        assert_eq!(score.payslip, 2);
        assert_eq!(score.it_return, 0);
    }

    #[test]
    fn test_year_prefix_keywords() {
        let score = KeywordScore::of("AY 2024-25 / FY 2023-24");
        assert_eq!(score.it_return, 2);
    }

    #[test]
    fn test_word_boundaries() {
        // "Pay 20000" must not count as "ay 20"
        let score = KeywordScore::of("Basic Pay 20000 holiday 2024");
        assert_eq!(score.it_return, 0);
        assert_eq!(score.payslip, 1);
    }

    #[test]
    fn test_nested_keywords_count_separately() {
        let score = KeywordScore::of("Gross Total Income 7,00,000");
        assert_eq!(score.it_return, 2);
    }

    #[test]
    fn test_higher_count_wins() {
        // payslip: net pay, total deductions, take home (3); it return: total income (1)
        let text = "Net Pay 40000\nTotal Deductions 2000\nTake Home 38000\nTotal Income";
        assert_eq!(classify(text), DocumentCategory::Payslip);
    }

    #[test]
    fn test_equal_counts_are_invalid() {
        let text = "Payslip\nIncome Tax Return";
        let score = KeywordScore::of(text);
        assert_eq!(score, KeywordScore { payslip: 1, it_return: 1 });
        assert_eq!(score.category(), DocumentCategory::Invalid);
    }
}
