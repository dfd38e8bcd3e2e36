use lazy_static::lazy_static;
use regex::Regex;

use super::order_id::{OrderIdFormat, OrderIdentifier};

lazy_static! {
    /// Matchers in priority order. The first one that matches wins.
    static ref PATTERNS: [(OrderIdFormat, Regex); 3] = [
        (
            OrderIdFormat::Hyphenated,
            Regex::new(r"\b(\d{3}-\d{7}-\d{7})\b").expect("hyphenated pattern"),
        ),
        (
            OrderIdFormat::Compact,
            Regex::new(r"\b(\d{16})\b").expect("compact pattern"),
        ),
        (
            OrderIdFormat::DigitRun,
            Regex::new(r"\b(\d{10,})\b").expect("digit run pattern"),
        ),
    ];
}

/// Extract an order identifier from a merchant / billing descriptor.
///
/// Patterns are tried in strict priority order (hyphenated, 16-digit compact,
/// then any run of 10+ digits). The digit-run fallback is best effort and can
/// pick up phone numbers or other reference codes.
pub fn extract_order_id(merchant: &str) -> Option<OrderIdentifier> {
    extract_with_format(merchant).map(|(id, _)| id)
}

/// Same as [`extract_order_id`], also reporting which pattern matched
pub fn extract_with_format(merchant: &str) -> Option<(OrderIdentifier, OrderIdFormat)> {
    if merchant.is_empty() {
        return None;
    }

    PATTERNS.iter().find_map(|(format, pattern)| {
        pattern
            .captures(merchant)
            .and_then(|caps| caps.get(1))
            .map(|m| (OrderIdentifier::from_match(m.as_str()), *format))
    })
}

/// Extract an order identifier from multi-line statement text.
///
/// Lines are trimmed and blank lines skipped; the first line yielding an
/// identifier wins, so an order id printed on the line after the merchant
/// name is still found.
pub fn extract_from_statement(statement: &str) -> Option<OrderIdentifier> {
    statement
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .find_map(extract_order_id)
}
