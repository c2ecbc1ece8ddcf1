//! Monetary amount parsing and labeled-value lookup.

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{AMOUNT_VALUE, CURRENCY_PREFIX, CURRENCY_SUFFIX};

/// Outcome of looking up a labeled amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabeledAmount {
    /// The label was found with a number next to it.
    Value { label: String, amount: Decimal },
    /// The label was found, but the value next to it is not a number.
    Unparsable { label: String, raw: String },
    /// The label does not occur in the text.
    Missing,
}

impl LabeledAmount {
    /// The parsed amount, if any.
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            LabeledAmount::Value { amount, .. } => Some(*amount),
            _ => None,
        }
    }
}

/// Parse an amount such as "₹ 6,00,000", "Rs. 45,000.50/-" or "$1,234".
///
/// Commas are grouping separators in any position (Western or Indian
/// grouping) and `.` is the decimal point. Currency markers and whitespace
/// are ignored; anything else makes the value unparsable.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    let without_prefix = CURRENCY_PREFIX.replace(trimmed, "");
    let without_suffix = CURRENCY_SUFFIX.replace(without_prefix.as_ref(), "");

    let cleaned: String = without_suffix
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    let well_formed = cleaned.starts_with(|c: char| c.is_ascii_digit())
        && cleaned.chars().all(|c| c.is_ascii_digit() || c == '.')
        && cleaned.matches('.').count() <= 1
        && !cleaned.ends_with('.');

    if !well_formed {
        return None;
    }

    Decimal::from_str(&cleaned).ok()
}

/// Find the first parsable amount next to a label.
///
/// `label` is matched everywhere in the text; `accept` decides, from the
/// captures, whether a match is the wanted label (used to tell "Total
/// Income" from "Gross Total Income"). The value is read from the rest of
/// the label's line, or from the next non-empty line when the label stands
/// alone. A label whose every occurrence carries a non-numeric value
/// yields [`LabeledAmount::Unparsable`].
pub fn find_labeled_amount(
    text: &str,
    name: &str,
    label: &Regex,
    accept: impl Fn(&regex::Captures) -> bool,
) -> LabeledAmount {
    let mut first_unparsable = None;

    for caps in label.captures_iter(text) {
        if !accept(&caps) {
            continue;
        }

        let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
        let fragment = adjacent_value(&text[end..]);

        let amount = AMOUNT_VALUE
            .captures(fragment)
            .filter(|value| !continues_number(&value[2]))
            .and_then(|value| parse_amount(&value[1]));

        match amount {
            Some(amount) => {
                return LabeledAmount::Value {
                    label: name.to_string(),
                    amount,
                }
            }
            None => {
                first_unparsable.get_or_insert_with(|| fragment.trim().to_string());
            }
        }
    }

    match first_unparsable {
        Some(raw) => LabeledAmount::Unparsable {
            label: name.to_string(),
            raw,
        },
        None => LabeledAmount::Missing,
    }
}

/// Whether the text after a value token still looks like part of a number,
/// as in "4 5000" or "45000 .50".
fn continues_number(rest: &str) -> bool {
    let mut chars = rest.trim_start().chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('.' | ',' | '-' | '–') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

/// Text following a label on its own line, or the next non-empty line.
fn adjacent_value(rest: &str) -> &str {
    let mut lines = rest.split('\n');
    let same_line = lines.next().unwrap_or("");

    if !is_blank_separator(same_line) {
        return same_line;
    }

    lines.find(|line| !line.trim().is_empty()).unwrap_or(same_line)
}

fn is_blank_separator(fragment: &str) -> bool {
    fragment
        .chars()
        .all(|c| c.is_whitespace() || matches!(c, ':' | '=' | '-' | '–'))
}
