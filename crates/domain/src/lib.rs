pub mod errors;
pub mod identifiers;
pub mod records;

pub use errors::DomainError;
pub use identifiers::extraction::{extract_from_statement, extract_order_id, extract_with_format};
pub use identifiers::order_id::{OrderIdFormat, OrderIdentifier};
pub use records::order_record::{
    FetchOutcome, LineItem, OrderRecord, NOT_FOUND_MESSAGE, PLACEHOLDER_ITEM_NAME,
    SOURCE_UNAVAILABLE_MESSAGE,
};
