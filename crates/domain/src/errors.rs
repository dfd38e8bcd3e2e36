use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("Invalid order id: {0}")]
    InvalidOrderId(String),

    #[error("Order ID required")]
    MissingOrderId,
}
