use chrono::{DateTime, NaiveDate};
use domain::{LineItem, OrderIdentifier, OrderRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use tracing::warn;

pub const UNKNOWN_STATUS: &str = "Unknown";
pub const UNKNOWN_ITEM: &str = "Unknown Item";

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%m/%d/%Y"];

/// Order as returned by the upstream source. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawOrder {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total: Option<Decimal>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub items: Vec<RawItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub asin: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl RawOrder {
    /// Normalize into a successful [`OrderRecord`], filling defaults
    pub fn into_record(self, order_id: OrderIdentifier) -> OrderRecord {
        let order_date = self.date.as_deref().and_then(|raw| {
            let parsed = parse_order_date(raw);
            if parsed.is_none() && !raw.trim().is_empty() {
                warn!("Unrecognized order date {:?} for order {}", raw, order_id);
            }
            parsed
        });

        let status = non_blank(self.status).unwrap_or_else(|| UNKNOWN_STATUS.to_string());
        let items = self.items.into_iter().map(RawItem::into_line_item).collect();

        OrderRecord::fetched(
            order_id,
            order_date,
            self.total.unwrap_or(Decimal::ZERO),
            status,
            items,
        )
    }
}

impl RawItem {
    pub fn into_line_item(self) -> LineItem {
        let quantity = self
            .quantity
            .filter(|q| *q > 0)
            .and_then(|q| u32::try_from(q).ok())
            .unwrap_or(1);

        let mut item = LineItem::new(
            non_blank(self.title).unwrap_or_else(|| UNKNOWN_ITEM.to_string()),
            self.price.unwrap_or(Decimal::ZERO),
            quantity,
        );
        item.asin = non_blank(self.asin);
        item.link = non_blank(self.link);
        item
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the date formats the source is known to emit
pub fn parse_order_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// Accepts numbers, numeric strings and strings like `"$1,234.50"`
fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;

    let parsed = match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::Number(n)) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Some(serde_json::Value::String(s)) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            Decimal::from_str(&cleaned).ok()
        }
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "expected a number or string amount, got {}",
                other
            )))
        }
    };

    Ok(parsed)
}
