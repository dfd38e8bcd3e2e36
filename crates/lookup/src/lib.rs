pub mod errors;
pub mod requests;
pub mod responses;
pub mod service;

pub use errors::LookupError;
pub use requests::{BulkRequest, ParseRequest, StatementRequest};
pub use responses::{
    BulkItem, BulkResponse, HealthReport, LookupResponse, OrderDetails, ParseResponse,
    StatementParseResponse,
};
pub use service::OrderLookupService;
