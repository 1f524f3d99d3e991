//! The API endpoints URIs.

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page listing every expense on the trip.
pub const EXPENSES_VIEW: &str = "/expenses";
/// The page for recording a new expense.
pub const NEW_EXPENSE_VIEW: &str = "/expenses/new";
/// The page where a user picks the name shown to the rest of the group.
pub const ACCOUNT_NAME_VIEW: &str = "/account/name";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to record an expense.
pub const EXPENSES_API: &str = "/api/expenses";
/// The route that renders the USD and AUD equivalents of an amount on the expense form.
pub const EXPENSE_ANNOTATION_API: &str = "/api/expenses/annotation";
/// The route to change the trip budget.
pub const BUDGET_API: &str = "/api/budget";
/// The route that recalculates the currency converter.
pub const CONVERTER_API: &str = "/api/converter";
/// The route to set the current user's display name.
pub const ACCOUNT_NAME_API: &str = "/api/account/name";
/// The server-sent event stream that pushes dashboard updates.
pub const DASHBOARD_EVENTS: &str = "/api/dashboard/events";
