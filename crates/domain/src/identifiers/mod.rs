pub mod extraction;
pub mod order_id;
