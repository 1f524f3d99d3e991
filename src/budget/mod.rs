//! The trip budget and the endpoint for changing it.

mod core;
mod endpoint;

pub use core::{create_budget_table, get_budget, set_budget};
pub use endpoint::update_budget_endpoint;
