//! Trip expenses: the model, validation, storage and the pages for adding and
//! listing them.

mod annotation_endpoint;
mod category;
mod core;
mod create_endpoint;
mod create_page;
mod expenses_page;
mod form;
mod validation;

pub use annotation_endpoint::expense_annotation_endpoint;
pub use category::Category;
pub use core::{ExpenseRecord, NewExpense, create_expense, create_expense_table, get_all_expenses};
pub use create_endpoint::create_expense_endpoint;
pub use create_page::get_new_expense_page;
pub use expenses_page::get_expenses_page;
pub use validation::{FieldError, RawExpenseInput, field_error, validate_expense};

#[cfg(test)]
pub(crate) use core::test_utils;
