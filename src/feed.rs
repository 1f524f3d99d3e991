//! Live snapshots of the expense list and the trip budget.
//!
//! Writers call [LedgerFeed::refresh_expenses] or [LedgerFeed::refresh_budget]
//! after changing the database. Every subscriber then receives the complete
//! new snapshot, never a diff, and recomputes whatever it shows from scratch.

use std::sync::Arc;

use rusqlite::Connection;
use tokio::{sync::watch, task::JoinHandle};

use crate::{
    Error,
    budget::get_budget,
    expense::{ExpenseRecord, get_all_expenses},
};

/// Every stored expense, newest first.
pub type ExpenseSnapshot = Arc<Vec<ExpenseRecord>>;

/// Why a snapshot could not be delivered.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeedError {
    /// The database refused the read.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Reading the snapshot failed for some other reason.
    #[error("could not load data: {0}")]
    LoadFailed(String),

    /// The feed was dropped, no more updates will arrive.
    #[error("the feed has closed")]
    Closed,
}

impl From<Error> for FeedError {
    fn from(error: Error) -> Self {
        match error {
            Error::PermissionDenied(description) => FeedError::PermissionDenied(description),
            error => FeedError::LoadFailed(error.to_string()),
        }
    }
}

/// Publishes expense and budget snapshots to any number of subscribers.
#[derive(Debug, Clone)]
pub struct LedgerFeed {
    expenses: Arc<watch::Sender<Result<ExpenseSnapshot, FeedError>>>,
    budget: Arc<watch::Sender<Result<f64, FeedError>>>,
}

impl LedgerFeed {
    /// Create a feed seeded with the current contents of the database.
    ///
    /// A failed read is published as the initial error rather than returned.
    pub fn new(connection: &Connection) -> Self {
        let (expenses, _) = watch::channel(load_expenses(connection));
        let (budget, _) = watch::channel(load_budget(connection));

        Self {
            expenses: Arc::new(expenses),
            budget: Arc::new(budget),
        }
    }

    /// Re-read the expenses and notify subscribers.
    pub fn refresh_expenses(&self, connection: &Connection) {
        self.expenses.send_replace(load_expenses(connection));
    }

    /// Re-read the budget and notify subscribers.
    pub fn refresh_budget(&self, connection: &Connection) {
        self.budget.send_replace(load_budget(connection));
    }

    /// The latest expense snapshot.
    pub fn expenses(&self) -> Result<ExpenseSnapshot, FeedError> {
        self.expenses.borrow().clone()
    }

    /// The latest budget.
    pub fn budget(&self) -> Result<f64, FeedError> {
        self.budget.borrow().clone()
    }

    /// Call `on_update` with the current expenses and again after every change.
    ///
    /// `on_error` is called instead when a snapshot could not be read, and
    /// once with [FeedError::Closed] if the feed goes away. Must be called from
    /// within a tokio runtime.
    pub fn subscribe_to_expenses<U, E>(&self, on_update: U, on_error: E) -> Subscription
    where
        U: FnMut(ExpenseSnapshot) + Send + 'static,
        E: FnMut(FeedError) + Send + 'static,
    {
        spawn_subscription(self.expenses.subscribe(), on_update, on_error)
    }

    /// Call `on_update` with the current budget and again after every change.
    ///
    /// Errors are reported the same way as [LedgerFeed::subscribe_to_expenses].
    pub fn subscribe_to_budget<U, E>(&self, on_update: U, on_error: E) -> Subscription
    where
        U: FnMut(f64) + Send + 'static,
        E: FnMut(FeedError) + Send + 'static,
    {
        spawn_subscription(self.budget.subscribe(), on_update, on_error)
    }
}

fn load_expenses(connection: &Connection) -> Result<ExpenseSnapshot, FeedError> {
    get_all_expenses(connection)
        .map(Arc::new)
        .inspect_err(|error| tracing::error!("could not load expenses: {error}"))
        .map_err(FeedError::from)
}

fn load_budget(connection: &Connection) -> Result<f64, FeedError> {
    get_budget(connection)
        .inspect_err(|error| tracing::error!("could not load budget: {error}"))
        .map_err(FeedError::from)
}

fn spawn_subscription<T, U, E>(
    mut receiver: watch::Receiver<Result<T, FeedError>>,
    mut on_update: U,
    mut on_error: E,
) -> Subscription
where
    T: Clone + Send + Sync + 'static,
    U: FnMut(T) + Send + 'static,
    E: FnMut(FeedError) + Send + 'static,
{
    let handle = tokio::spawn(async move {
        loop {
            let snapshot = receiver.borrow_and_update().clone();
            match snapshot {
                Ok(snapshot) => on_update(snapshot),
                Err(error) => on_error(error),
            }

            if receiver.changed().await.is_err() {
                on_error(FeedError::Closed);
                break;
            }
        }
    });

    Subscription { handle }
}

/// A live subscription created by [LedgerFeed].
///
/// Callbacks stop once the subscription is unsubscribed or dropped.
#[derive(Debug)]
#[must_use = "the subscription ends as soon as it is dropped"]
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Stop receiving updates.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
