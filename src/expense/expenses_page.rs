//! Defines the route handler for the page that lists every expense.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::UtcOffset;

use crate::{
    AppState, Error,
    auth::Session,
    endpoints,
    expense::{ExpenseRecord, get_all_expenses},
    html::{
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_inr, format_short_date, link,
    },
    navigation::NavBar,
    timezone::get_local_offset,
};

/// The state needed for the expenses page.
#[derive(Debug, Clone)]
pub struct ExpensesPageState {
    /// The database connection for reading expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
}

impl FromRef<AppState> for ExpensesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Renders every expense on the trip, newest first.
pub async fn get_expenses_page(
    State(state): State<ExpensesPageState>,
    session: Session,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;

    let expenses = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_all_expenses(&connection)
            .inspect_err(|error| tracing::error!("could not get expenses: {error}"))?
    };

    Ok(expenses_view(&session, &expenses, local_offset).into_response())
}

fn expenses_view(session: &Session, expenses: &[ExpenseRecord], local_offset: UtcOffset) -> Markup {
    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW)
        .with_user_initials(session.initials())
        .into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-4"
            {
                div class="flex justify-between items-center"
                {
                    h2 class="text-xl font-bold" { "Expenses" }
                    (link(endpoints::NEW_EXPENSE_VIEW, "Add expense"))
                }

                @if expenses.is_empty() {
                    p class="text-gray-500 dark:text-gray-400" { "No expenses added yet." }
                } @else {
                    div class="relative overflow-x-auto shadow-md sm:rounded-lg"
                    {
                        table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                        {
                            thead class=(TABLE_HEADER_STYLE)
                            {
                                tr
                                {
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Paid to" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                    th scope="col" class=(TABLE_CELL_STYLE) { "Owner" }
                                    th scope="col" class="px-6 py-4 text-right" { "Total" }
                                    th scope="col" class="px-6 py-4 text-right" { "Advance" }
                                    th scope="col" class="px-6 py-4 text-right" { "Due" }
                                }
                            }

                            tbody
                            {
                                @for expense in expenses {
                                    (expense_row(expense, local_offset))
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Expenses", &[], &content)
}

fn expense_row(expense: &ExpenseRecord, local_offset: UtcOffset) -> Markup {
    let category = expense
        .category()
        .map(|category| category.label().to_owned())
        .unwrap_or_else(|| expense.category.clone());

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (format_short_date(expense.date, local_offset)) }
            td class=(TABLE_CELL_STYLE)
            {
                (expense.description)

                @if let Some(contact_info) = &expense.contact_info {
                    p class="text-xs text-gray-400" { (contact_info) }
                }
            }
            td class=(TABLE_CELL_STYLE) { (expense.paid_to) }
            td class=(TABLE_CELL_STYLE) { (category) }
            td class=(TABLE_CELL_STYLE) { (expense.user_name) }
            td class="px-6 py-4 text-right" { (format_inr(expense.total_amount)) }
            td class="px-6 py-4 text-right" { (format_inr(expense.advance_paid)) }
            td class="px-6 py-4 text-right" { (format_inr(expense.remaining_balance)) }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::datetime;

    use crate::{
        auth::{Session, UserID},
        db::initialize,
        expense::{Category, create_expense, test_utils::new_expense},
        test_utils::{assert_status_ok, assert_valid_html, parse_html_document},
    };

    use super::{ExpensesPageState, get_expenses_page};

    fn session() -> Session {
        Session {
            user_id: UserID::new(1),
            username: "priya".to_owned(),
            display_name: Some("Priya".to_owned()),
            is_admin: false,
        }
    }

    fn get_state(conn: Connection) -> ExpensesPageState {
        ExpensesPageState {
            db_connection: Arc::new(Mutex::new(conn)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn lists_expenses_newest_first() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let mut older = new_expense(Category::Food, 800.0, 800.0, datetime!(2025-03-01 12:00 UTC));
        older.description = "Sadya lunch".to_owned();
        let mut newer =
            new_expense(Category::Transport, 2500.0, 500.0, datetime!(2025-03-05 08:00 UTC));
        newer.description = "Taxi to Munnar".to_owned();
        create_expense(older, &conn).unwrap();
        create_expense(newer, &conn).unwrap();

        let response = get_expenses_page(State(get_state(conn)), session())
            .await
            .unwrap();

        assert_status_ok(&response);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let rows = document
            .select(&Selector::parse("tbody tr").unwrap())
            .map(|row| row.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("Taxi to Munnar"), "got {}", rows[0]);
        assert!(rows[0].contains("₹2,000.00"), "want amount due in {}", rows[0]);
        assert!(rows[1].contains("Sadya lunch"), "got {}", rows[1]);
    }

    #[tokio::test]
    async fn shows_placeholder_without_expenses() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let response = get_expenses_page(State(get_state(conn)), session())
            .await
            .unwrap();

        let document = parse_html_document(response).await;
        let text = document.root_element().text().collect::<String>();
        assert!(text.contains("No expenses added yet."));
    }
}
