mod budget;
mod error;
mod expense;

pub use budget::Budget;
pub use error::RecordError;
pub use expense::{parse_amount, Expense, DEFAULT_CATEGORY};
