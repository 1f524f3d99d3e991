//! Defines the route handler for the page for recording a new expense.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    auth::Session,
    endpoints,
    expense::{
        RawExpenseInput,
        form::{ExpenseFormValues, expense_form_fields},
    },
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, link, loading_spinner, rupee_input_styles,
    },
    navigation::NavBar,
    timezone::get_local_offset,
};

fn name_missing_notice() -> Markup {
    html! {
        p class="w-full p-3 text-sm rounded-lg text-yellow-800 bg-yellow-50 dark:bg-gray-800 dark:text-yellow-300"
        {
            "Expenses are recorded under your name, which you have not set yet. "
            (link(endpoints::ACCOUNT_NAME_VIEW, "Set your name"))
            " before adding an expense."
        }
    }
}

fn new_expense_view(session: &Session, max_date: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_EXPENSE_VIEW)
        .with_user_initials(session.initials())
        .into_html();
    let input = RawExpenseInput::default();
    let fields = expense_form_fields(&ExpenseFormValues {
        input: &input,
        errors: &[],
        is_admin: session.is_admin,
        max_date,
    });
    let spinner = loading_spinner();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "New Expense" }

                @if session.display_name.is_none() && !session.is_admin {
                    (name_missing_notice())
                }

                form
                    id="expense-form"
                    hx-post=(endpoints::EXPENSES_API)
                    hx-target-422="#expense-form"
                    hx-target-error="#alert-container"
                    class="w-full space-y-4 md:space-y-6"
                {
                    (fields)

                    button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                    {
                        span
                            id="indicator"
                            class="inline htmx-indicator"
                        {
                            (spinner)
                        }
                        " Add Expense"
                    }
                }
            }
        }
    };

    base("New Expense", &[rupee_input_styles()], &content)
}

/// The state needed for the new expense page.
#[derive(Debug, Clone)]
pub struct NewExpensePageState {
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
}

impl FromRef<AppState> for NewExpensePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Renders the page for recording an expense.
pub async fn get_new_expense_page(
    State(state): State<NewExpensePageState>,
    session: Session,
) -> Result<Response, Error> {
    let local_timezone = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone)
    })?;

    let max_date = OffsetDateTime::now_utc().to_offset(local_timezone).date();

    Ok(new_expense_view(&session, max_date).into_response())
}

#[cfg(test)]
mod view_tests {
    use axum::extract::State;
    use scraper::Selector;
    use time::OffsetDateTime;

    use crate::{
        Error,
        auth::{Session, UserID},
        endpoints,
        test_utils::{
            assert_content_type, assert_form_input_with_value, assert_form_submit_button_with_text,
            assert_hx_endpoint, assert_status_ok, assert_valid_html, must_get_form,
            parse_html_document,
        },
    };

    use super::{NewExpensePageState, get_new_expense_page};

    fn session(display_name: Option<&str>, is_admin: bool) -> Session {
        Session {
            user_id: UserID::new(1),
            username: "priya".to_owned(),
            display_name: display_name.map(str::to_owned),
            is_admin,
        }
    }

    fn state() -> NewExpensePageState {
        NewExpensePageState {
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn new_expense_page_returns_form() {
        let response = get_new_expense_page(State(state()), session(Some("Priya"), false))
            .await
            .unwrap();

        assert_status_ok(&response);
        assert_content_type(&response, "text/html; charset=utf-8");
        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::EXPENSES_API, "hx-post");
        assert_form_input_with_value(
            &form,
            "date",
            "date",
            &OffsetDateTime::now_utc().date().to_string(),
        );
        assert_form_submit_button_with_text(&form, "Add Expense");
    }

    #[tokio::test]
    async fn prompts_for_name_when_missing() {
        let response = get_new_expense_page(State(state()), session(None, false))
            .await
            .unwrap();

        let document = parse_html_document(response).await;
        let link = document
            .select(&Selector::parse(&format!("a[href='{}']", endpoints::ACCOUNT_NAME_VIEW)).unwrap())
            .next();
        assert!(link.is_some(), "want a link to the name page");
    }

    #[tokio::test]
    async fn invalid_timezone_is_an_error() {
        let state = NewExpensePageState {
            local_timezone: "Not/AZone".to_owned(),
        };

        let result = get_new_expense_page(State(state), session(Some("Priya"), false)).await;

        assert!(matches!(result, Err(Error::InvalidTimezoneError(_))));
    }
}
