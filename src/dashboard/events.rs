//! Pushes a freshly rendered dashboard summary to the browser whenever the
//! expenses or the budget change.

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, stream};
use time::UtcOffset;
use tokio::sync::mpsc;

use crate::{
    Error,
    alert::Alert,
    currency::SharedRates,
    dashboard::handlers::{DashboardState, summary_view},
    feed::{ExpenseSnapshot, FeedError, Subscription},
};

/// The name of the event that carries the summary HTML.
pub(super) const SUMMARY_EVENT: &str = "summary";
/// The name of the event that carries an alert when data could not be loaded.
pub(super) const FEED_ERROR_EVENT: &str = "feed-error";

#[derive(Debug)]
enum FeedMessage {
    Expenses(ExpenseSnapshot),
    Budget(f64),
    Failed(FeedError),
}

/// Everything one open event stream needs between messages.
///
/// Dropping it, which happens when the browser disconnects, ends both
/// subscriptions.
struct SummaryStream {
    receiver: mpsc::UnboundedReceiver<FeedMessage>,
    _subscriptions: [Subscription; 2],
    expenses: Option<ExpenseSnapshot>,
    total_budget: Option<f64>,
    rates: SharedRates,
    local_offset: UtcOffset,
}

impl SummaryStream {
    /// The event to send for `message`, if any.
    fn handle(&mut self, message: FeedMessage) -> Option<Event> {
        match message {
            FeedMessage::Expenses(expenses) => self.expenses = Some(expenses),
            FeedMessage::Budget(total_budget) => self.total_budget = Some(total_budget),
            FeedMessage::Failed(error) => return Some(feed_error_event(&error)),
        }

        // Nothing can be shown until both snapshots have arrived.
        let expenses = self.expenses.as_ref()?;
        let total_budget = self.total_budget?;
        let summary = summary_view(
            expenses,
            total_budget,
            &self.rates.status(),
            self.local_offset,
        );

        Some(Event::default().event(SUMMARY_EVENT).data(summary.into_string()))
    }
}

fn feed_error_event(error: &FeedError) -> Event {
    let details = match error {
        FeedError::PermissionDenied(_) => {
            "Permission denied. Check that the server can read the trip data."
        }
        FeedError::LoadFailed(_) => "Showing the last data that loaded successfully.",
        FeedError::Closed => "Reload the page to reconnect.",
    };
    let alert = Alert::Error {
        message: "Live updates failed".to_owned(),
        details: details.to_owned(),
    };

    Event::default()
        .event(FEED_ERROR_EVENT)
        .data(alert.into_html().into_string())
}

/// A stream of server-sent events with the dashboard summary.
///
/// The first event carries the current data, later events follow every change.
pub async fn get_dashboard_events(
    State(state): State<DashboardState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, Error> {
    let local_offset = state.local_offset()?;
    let (sender, receiver) = mpsc::unbounded_channel();

    let expenses_subscription = {
        let on_update = sender.clone();
        let on_error = sender.clone();
        state.feed.subscribe_to_expenses(
            move |expenses| {
                let _ = on_update.send(FeedMessage::Expenses(expenses));
            },
            move |error| {
                let _ = on_error.send(FeedMessage::Failed(error));
            },
        )
    };

    let budget_subscription = {
        let on_update = sender.clone();
        let on_error = sender;
        state.feed.subscribe_to_budget(
            move |total_budget| {
                let _ = on_update.send(FeedMessage::Budget(total_budget));
            },
            move |error| {
                let _ = on_error.send(FeedMessage::Failed(error));
            },
        )
    };

    let summary_stream = SummaryStream {
        receiver,
        _subscriptions: [expenses_subscription, budget_subscription],
        expenses: None,
        total_budget: None,
        rates: state.rates,
        local_offset,
    };

    let events = stream::unfold(summary_stream, |mut summary_stream| async move {
        loop {
            let message = summary_stream.receiver.recv().await?;

            if matches!(message, FeedMessage::Failed(FeedError::Closed)) {
                tracing::warn!("dashboard feed closed, ending event stream");
                return None;
            }

            if let Some(event) = summary_stream.handle(message) {
                return Some((Ok(event), summary_stream));
            }
        }
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
