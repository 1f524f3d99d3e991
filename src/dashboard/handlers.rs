//! Dashboard HTTP handlers and view rendering.
//!
//! The page shows a summary region (budget card, category chart and recent
//! expenses) that is re-rendered from each new snapshot pushed through
//! [crate::dashboard::get_dashboard_events].

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, PreEscaped, html};
use time::UtcOffset;

use crate::{
    AppState, Error,
    account::name_banner,
    auth::Session,
    currency::{ConverterState, RatesStatus, SharedRates, converter_card},
    dashboard::{
        cards::{budget_card, budget_form},
        charts::category_chart_view,
        tables::recent_transactions_view,
    },
    endpoints,
    expense::ExpenseRecord,
    feed::{FeedError, LedgerFeed},
    html::{HeadElement, PAGE_CONTAINER_STYLE, base, rupee_input_styles},
    navigation::NavBar,
    summary::{BudgetSummary, RECENT_TRANSACTION_COUNT, category_totals, recent_transactions},
    timezone::get_local_offset,
};

/// The ID of the element that live updates are swapped into.
pub(super) const SUMMARY_ID: &str = "dashboard-summary";

/// The state needed for displaying the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
    /// The latest expenses and budget.
    pub feed: LedgerFeed,
    /// The exchange rates for the budget equivalents and the converter.
    pub rates: SharedRates,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            feed: state.feed.clone(),
            rates: state.rates.clone(),
        }
    }
}

impl DashboardState {
    pub(super) fn local_offset(&self) -> Result<UtcOffset, Error> {
        get_local_offset(&self.local_timezone).ok_or_else(|| {
            tracing::error!("Invalid timezone {}", self.local_timezone);
            Error::InvalidTimezoneError(self.local_timezone.clone())
        })
    }
}

/// The summary region for one expense snapshot and budget.
pub(super) fn summary_view(
    expenses: &[ExpenseRecord],
    total_budget: f64,
    rates: &RatesStatus,
    local_offset: UtcOffset,
) -> Markup {
    let summary = BudgetSummary::new(expenses, total_budget);
    let totals = category_totals(expenses);
    let recent = recent_transactions(expenses, RECENT_TRANSACTION_COUNT);

    html! {
        (budget_card(&summary, rates))
        (category_chart_view(&totals))
        (recent_transactions_view(&recent, local_offset))
    }
}

/// Shown in place of data that could not be loaded.
pub(super) fn feed_error_view(error: &FeedError) -> Markup {
    let message = match error {
        FeedError::PermissionDenied(_) => {
            "Permission denied. Check that the server can read the trip data."
        }
        FeedError::LoadFailed(_) => "The trip data could not be loaded. Try again later.",
        FeedError::Closed => "Live updates have stopped. Reload the page to reconnect.",
    };

    html! {
        p class="w-full p-4 text-sm rounded-lg text-red-800 bg-red-50 dark:bg-gray-800 dark:text-red-400"
        {
            (message)
        }
    }
}

fn live_update_script() -> HeadElement {
    HeadElement::ScriptSource(PreEscaped(format!(
        r##"document.addEventListener('DOMContentLoaded', function() {{
            const source = new EventSource("{events}");

            source.addEventListener("summary", function(event) {{
                htmx.swap("#{summary}", event.data, {{swapStyle: "innerHTML"}});
            }});

            source.addEventListener("feed-error", function(event) {{
                htmx.swap("#alert-container", event.data, {{swapStyle: "innerHTML"}});
            }});

            window.addEventListener("beforeunload", function() {{
                source.close();
            }});
        }});"##,
        events = endpoints::DASHBOARD_EVENTS,
        summary = SUMMARY_ID,
    )))
}

fn dashboard_view(
    session: &Session,
    summary: Markup,
    total_budget: Option<f64>,
    rates: &RatesStatus,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW)
        .with_user_initials(session.initials())
        .into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-4"
            {
                (name_banner(session))

                h2 class="text-xl font-bold" { "Hi, " (session.name()) }

                div class="grid grid-cols-1 lg:grid-cols-3 gap-4"
                {
                    div id=(SUMMARY_ID) class="lg:col-span-2 space-y-4"
                    {
                        (summary)
                    }

                    div class="space-y-4"
                    {
                        @if let Some(total_budget) = total_budget {
                            (budget_form(total_budget))
                        }

                        (converter_card(&ConverterState::initial(rates)))
                    }
                }
            }
        }
    };

    base(
        "Dashboard",
        &[
            HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
            rupee_input_styles(),
            live_update_script(),
        ],
        &content,
    )
}

/// Display a page with an overview of the trip's spending.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    session: Session,
) -> Result<Response, Error> {
    let local_offset = state.local_offset()?;
    let rates = state.rates.status();
    let total_budget = state.feed.budget();

    let expenses = state.feed.expenses();

    let summary = match (&expenses, &total_budget) {
        (Ok(expenses), Ok(total_budget)) => {
            summary_view(expenses, *total_budget, &rates, local_offset)
        }
        (Err(error), _) | (_, Err(error)) => {
            tracing::error!("could not show dashboard summary: {error}");
            feed_error_view(error)
        }
    };

    Ok(dashboard_view(&session, summary, total_budget.ok(), &rates).into_response())
}
