pub mod error;
pub mod transaction_status;
pub mod user_transaction;
