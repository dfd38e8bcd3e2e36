use chrono::NaiveDate;
use domain::{LineItem, OrderIdFormat, OrderIdentifier, OrderRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Result of extracting an identifier from one merchant string
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParseResponse {
    pub success: bool,
    pub merchant: String,
    pub order_id: Option<OrderIdentifier>,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OrderIdFormat>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatementParseResponse {
    pub success: bool,
    pub order_id: Option<OrderIdentifier>,
    pub found: bool,
}

/// Wire form of an [`OrderRecord`].
///
/// `found`, `error` and `mock_data` are derived from the fetch outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDetails {
    pub order_id: OrderIdentifier,
    pub order_date: Option<NaiveDate>,
    pub total_amount: Decimal,
    pub status: String,
    pub items: Vec<LineItem>,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub mock_data: bool,
}

impl From<&OrderRecord> for OrderDetails {
    fn from(record: &OrderRecord) -> Self {
        Self {
            order_id: record.order_id.clone(),
            order_date: record.order_date,
            total_amount: record.total_amount,
            status: record.status.clone(),
            items: record.items.clone(),
            found: record.is_fetched(),
            error: record.error().map(str::to_string),
            mock_data: record.is_mock(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LookupResponse {
    pub success: bool,
    pub data: OrderDetails,
}

impl From<&OrderRecord> for LookupResponse {
    fn from(record: &OrderRecord) -> Self {
        Self {
            success: record.is_fetched(),
            data: OrderDetails::from(record),
        }
    }
}

/// One entry of a bulk response, in input order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BulkItem {
    pub merchant: String,
    pub order_id: Option<OrderIdentifier>,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_details: Option<OrderDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BulkResponse {
    pub success: bool,
    pub results: Vec<BulkItem>,
}

/// Which collaborators are configured. Produced without any I/O.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthReport {
    pub status: String,
    pub service: String,
    pub version: String,
    pub has_credentials: bool,
    pub has_cache: bool,
    pub has_database: bool,
    pub source_available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order_id() -> OrderIdentifier {
        OrderIdentifier::parse("123-4567890-1234567").unwrap()
    }

    #[test]
    fn test_failed_record_wire_form() {
        let record = OrderRecord::failed(order_id(), "upstream exploded");
        let value = serde_json::to_value(LookupResponse::from(&record)).unwrap();

        assert_eq!(value["success"], json!(false));
        assert_eq!(value["data"]["found"], json!(false));
        assert_eq!(value["data"]["error"], json!("upstream exploded"));
        assert_eq!(value["data"]["items"], json!([]));
        assert!(value["data"].get("mock_data").is_none());
    }

    #[test]
    fn test_source_unavailable_wire_form() {
        let record = OrderRecord::source_unavailable(order_id());
        let value = serde_json::to_value(OrderDetails::from(&record)).unwrap();

        assert_eq!(value["mock_data"], json!(true));
        assert_eq!(value["found"], json!(false));
        assert_eq!(value["items"][0]["name"], json!("Sample Item"));
    }

    #[test]
    fn test_fetched_record_wire_form() {
        let record = OrderRecord::fetched(
            order_id(),
            NaiveDate::from_ymd_opt(2024, 1, 15),
            Decimal::new(4999, 2),
            "Delivered",
            vec![],
        );
        let value = serde_json::to_value(LookupResponse::from(&record)).unwrap();

        assert_eq!(value["success"], json!(true));
        assert_eq!(value["data"]["found"], json!(true));
        assert_eq!(value["data"]["order_date"], json!("2024-01-15"));
        assert!(value["data"].get("error").is_none());
    }

    #[test]
    fn test_bulk_item_omits_missing_details() {
        let item = BulkItem {
            merchant: "no digits here".to_string(),
            order_id: None,
            found: false,
            order_details: None,
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value, json!({"merchant": "no digits here", "order_id": null, "found": false}));
    }
}
