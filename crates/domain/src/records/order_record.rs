use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::OrderIdentifier;

pub const SOURCE_UNAVAILABLE_MESSAGE: &str = "Order source not available";
pub const NOT_FOUND_MESSAGE: &str = "Order not found";
pub const PLACEHOLDER_ITEM_NAME: &str = "Sample Item";

/// Single purchased item, owned by its order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub asin: Option<String>,
    pub link: Option<String>,
}

impl LineItem {
    pub fn new(name: impl Into<String>, price: Decimal, quantity: u32) -> Self {
        Self {
            name: name.into(),
            price,
            quantity: quantity.max(1),
            asin: None,
            link: None,
        }
    }
}

/// How a fetch attempt ended.
///
/// Only [`FetchOutcome::Fetched`] records may be cached or persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchOutcome {
    Fetched,
    /// No order source is configured; the record is a diagnostic placeholder
    SourceUnavailable,
    NotFound,
    Failed { message: String },
}

/// Result of resolving an order identifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRecord {
    pub order_id: OrderIdentifier,
    pub order_date: Option<NaiveDate>,
    pub total_amount: Decimal,
    pub status: String,
    pub items: Vec<LineItem>,
    pub outcome: FetchOutcome,
}

impl OrderRecord {
    pub fn fetched(
        order_id: OrderIdentifier,
        order_date: Option<NaiveDate>,
        total_amount: Decimal,
        status: impl Into<String>,
        items: Vec<LineItem>,
    ) -> Self {
        Self {
            order_id,
            order_date,
            total_amount,
            status: status.into(),
            items,
            outcome: FetchOutcome::Fetched,
        }
    }

    pub fn source_unavailable(order_id: OrderIdentifier) -> Self {
        Self {
            order_id,
            order_date: None,
            total_amount: Decimal::ZERO,
            status: String::new(),
            items: vec![LineItem::new(PLACEHOLDER_ITEM_NAME, Decimal::ZERO, 1)],
            outcome: FetchOutcome::SourceUnavailable,
        }
    }

    pub fn not_found(order_id: OrderIdentifier) -> Self {
        Self::unresolved(order_id, FetchOutcome::NotFound)
    }

    pub fn failed(order_id: OrderIdentifier, message: impl Into<String>) -> Self {
        Self::unresolved(
            order_id,
            FetchOutcome::Failed {
                message: message.into(),
            },
        )
    }

    fn unresolved(order_id: OrderIdentifier, outcome: FetchOutcome) -> Self {
        Self {
            order_id,
            order_date: None,
            total_amount: Decimal::ZERO,
            status: String::new(),
            items: Vec::new(),
            outcome,
        }
    }

    /// True when the record may be cached and persisted
    pub fn is_fetched(&self) -> bool {
        matches!(self.outcome, FetchOutcome::Fetched)
    }

    pub fn is_mock(&self) -> bool {
        matches!(self.outcome, FetchOutcome::SourceUnavailable)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            FetchOutcome::Fetched => None,
            FetchOutcome::SourceUnavailable => Some(SOURCE_UNAVAILABLE_MESSAGE),
            FetchOutcome::NotFound => Some(NOT_FOUND_MESSAGE),
            FetchOutcome::Failed { message } => Some(message),
        }
    }
}
