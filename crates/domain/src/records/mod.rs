pub mod order_record;
