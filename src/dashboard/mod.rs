//! Dashboard module
//!
//! Provides an overview page showing the budget, spending per category, the
//! most recent expenses and a currency converter, kept up to date with
//! server-sent events.

mod cards;
mod charts;
mod events;
mod handlers;
mod tables;

pub use events::get_dashboard_events;
pub use handlers::get_dashboard_page;
