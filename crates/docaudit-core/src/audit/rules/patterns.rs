//! Common regex patterns for financial document extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Fiscal year ranges. Group 1 is the start year, group 2 the end year in
    // either four or two digits. A labeled range may sit on the line below
    // its label.
    pub static ref FISCAL_ASSESSMENT_YEAR: Regex = Regex::new(
        r"(?i)\b(?:A\.?Y\.?|assessment\s+year)[^\S\n]*[:\-]?[^\S\n]*(?:\r?\n[^\S\n]*)?((?:19|20)\d{2})[^\S\n]*(?:[-–/]|\bto\b)[^\S\n]*(\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref FISCAL_FINANCIAL_YEAR: Regex = Regex::new(
        r"(?i)\b(?:F\.?Y\.?|financial\s+year|previous\s+year)[^\S\n]*[:\-]?[^\S\n]*(?:\r?\n[^\S\n]*)?((?:19|20)\d{2})[^\S\n]*(?:[-–/]|\bto\b)[^\S\n]*(\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref FISCAL_BARE: Regex = Regex::new(
        r"(?i)\b((?:19|20)\d{2})[^\S\n]*(?:[-–]|\bto\b)[^\S\n]*(\d{4}|\d{2})\b"
    ).unwrap();

    // Month + year. Group 1 is the month, group 2 the year.
    pub static ref MONTH_YEAR_NAMED: Regex = Regex::new(
        r"(?i)\b(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?[^\S\n]*[,\-]?[^\S\n]*((?:19|20)\d{2})\b"
    ).unwrap();

    pub static ref MONTH_YEAR_NUMERIC: Regex = Regex::new(
        r"\b(0[1-9]|1[0-2])[^\S\n]*[/\-.][^\S\n]*((?:19|20)\d{2})\b"
    ).unwrap();

    // Labels that introduce the period a payslip covers.
    pub static ref PAY_PERIOD_LABEL: Regex = Regex::new(
        r"(?i)\b(?:pay\s+period|pay\s*slip\s+for(?:\s+the\s+month\s+of)?|salary\s+(?:slip\s+)?for(?:\s+the\s+month\s+of)?|for\s+the\s+month\s+of|month\s*/\s*year|month|period)\b"
    ).unwrap();

    // Salary labels. Group 1 is the qualifier.
    pub static ref TOTAL_INCOME_LABEL: Regex = Regex::new(
        r"(?i)\b(gross[^\S\n]+)?total[^\S\n]+income\b"
    ).unwrap();

    pub static ref PAY_LABEL: Regex = Regex::new(
        r"(?i)\b(net|gross)[^\S\n]+pay\b"
    ).unwrap();

    // The value token after a label: separators (a dash only when followed by
    // whitespace, so "-45000" keeps its sign), an optional parenthesised unit
    // like "(Rs.)" and an optional currency marker. Group 1 is the token up to
    // whitespace or "(", group 2 the rest of the fragment.
    pub static ref AMOUNT_VALUE: Regex = Regex::new(
        r"(?i)^(?:[\s:=]|[\-–]\s)*(?:\([^)\n]*\)(?:[\s:=]|[\-–]\s)*)?(?:(?:rs\.?|inr|₹|\$|€|£)[^\S\n]*)?([^\s(]+)(.*)$"
    ).unwrap();

    pub static ref CURRENCY_PREFIX: Regex = Regex::new(
        r"(?i)^(?:rs\.?|inr|₹|\$|€|£|usd|eur|gbp)[^\S\n]*"
    ).unwrap();

    pub static ref CURRENCY_SUFFIX: Regex = Regex::new(
        r"(?i)[^\S\n]*(?:/-|rs\.?|inr|usd|eur|gbp)$"
    ).unwrap();
}
