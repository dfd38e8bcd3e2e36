use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DomainError;

lazy_static! {
    static ref HYPHENATED_EXACT: Regex =
        Regex::new(r"^\d{3}-\d{7}-\d{7}$").expect("hyphenated order id regex");
    static ref DIGITS_EXACT: Regex = Regex::new(r"^\d{10,}$").expect("digit order id regex");
}

/// Which pattern produced an order identifier, highest confidence first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderIdFormat {
    /// `DDD-DDDDDDD-DDDDDDD`
    Hyphenated,
    /// 16 contiguous digits
    Compact,
    /// Any run of 10 or more digits. May be a phone number or an unrelated reference.
    DigitRun,
}

impl OrderIdFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderIdFormat::Hyphenated => "hyphenated",
            OrderIdFormat::Compact => "compact",
            OrderIdFormat::DigitRun => "digit_run",
        }
    }
}

/// Canonical order identifier.
///
/// Values are only created by extraction or by [`OrderIdentifier::parse`], so
/// every instance matches one of the recognized formats.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderIdentifier(String);

impl OrderIdentifier {
    /// Parse a complete string as an order identifier.
    ///
    /// Unlike extraction this does not search inside free text: the whole
    /// (trimmed) input has to be one identifier.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::MissingOrderId);
        }

        if HYPHENATED_EXACT.is_match(trimmed) || DIGITS_EXACT.is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(DomainError::InvalidOrderId(trimmed.to_string()))
        }
    }

    /// Wrap a token already matched by one of the extraction patterns
    pub(crate) fn from_match(token: &str) -> Self {
        Self(token.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn format(&self) -> OrderIdFormat {
        if self.0.contains('-') {
            OrderIdFormat::Hyphenated
        } else if self.0.chars().count() == 16 {
            OrderIdFormat::Compact
        } else {
            OrderIdFormat::DigitRun
        }
    }
}

impl fmt::Display for OrderIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OrderIdentifier {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OrderIdentifier> for String {
    fn from(id: OrderIdentifier) -> Self {
        id.0
    }
}

impl AsRef<str> for OrderIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
