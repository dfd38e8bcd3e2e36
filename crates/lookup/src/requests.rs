use serde::{Deserialize, Serialize};
use validator::Validate;

pub const MAX_BULK_MERCHANTS: u64 = 500;
pub const MAX_TEXT_LENGTH: u64 = 4096;
pub const MAX_STATEMENT_LENGTH: u64 = 65536;

/// Body of a parse request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ParseRequest {
    #[serde(default)]
    #[validate(length(max = MAX_TEXT_LENGTH, message = "Merchant text is too long"))]
    pub merchant: String,
}

/// Body of a multi-line statement parse request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct StatementRequest {
    #[serde(default)]
    #[validate(length(max = MAX_STATEMENT_LENGTH, message = "Statement text is too long"))]
    pub statement: String,
}

/// Body of a bulk request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct BulkRequest {
    #[serde(default)]
    #[validate(length(max = MAX_BULK_MERCHANTS, message = "At most 500 merchants per request"))]
    pub merchants: Vec<String>,

    #[serde(default)]
    pub fetch_details: bool,
}
