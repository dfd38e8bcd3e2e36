pub mod bulk;
pub mod error;
pub mod health;
pub mod order;
pub mod parse;
pub mod stored;
