//! Aggregates expenses against the trip budget.
//!
//! Everything here is a pure function of an expense snapshot and the budget,
//! so callers recompute from the full snapshot whenever either changes.

use std::{cmp::Ordering, collections::HashMap};

use crate::expense::{Category, ExpenseRecord};

/// How many expenses the recent transactions list shows.
pub const RECENT_TRANSACTION_COUNT: usize = 5;

/// Money spent so far compared with the trip budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetSummary {
    /// The trip budget in INR.
    pub total_budget: f64,
    /// The sum of the advances paid, i.e. money that has actually left the kitty.
    pub total_spent: f64,
    /// `total_budget - total_spent`, negative once the budget is exceeded.
    pub remaining: f64,
    pub is_over_budget: bool,
    /// `total_spent` as a percentage of `total_budget`, zero when there is no budget.
    ///
    /// Not clamped, so it exceeds 100 when over budget.
    pub progress_percent: f64,
}

impl BudgetSummary {
    /// Summarise `expenses` against `total_budget`.
    pub fn new(expenses: &[ExpenseRecord], total_budget: f64) -> Self {
        let total_spent = total_spent(expenses);
        let remaining = total_budget - total_spent;
        let progress_percent = if total_budget > 0.0 {
            total_spent / total_budget * 100.0
        } else {
            0.0
        };

        Self {
            total_budget,
            total_spent,
            remaining,
            is_over_budget: remaining < 0.0,
            progress_percent,
        }
    }

    /// The progress clamped to 0..=100 for drawing a progress bar.
    pub fn progress_bar_percent(&self) -> f64 {
        self.progress_percent.clamp(0.0, 100.0)
    }
}

/// The total cost of the expenses in one category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: f64,
}

/// The sum of `advance_paid` over every expense.
///
/// Expenses with unrecognised categories still count towards the total.
pub fn total_spent(expenses: &[ExpenseRecord]) -> f64 {
    expenses.iter().map(|expense| expense.advance_paid).sum()
}

/// The sum of `total_amount` for each category, largest first.
///
/// Categories that sum to zero are left out, as are expenses whose stored
/// category is not recognised. Ties are ordered by [Category::ALL].
pub fn category_totals(expenses: &[ExpenseRecord]) -> Vec<CategoryTotal> {
    let mut totals: HashMap<Category, f64> = HashMap::new();

    for expense in expenses {
        if let Some(category) = expense.category() {
            *totals.entry(category).or_default() += expense.total_amount;
        }
    }

    let mut totals: Vec<CategoryTotal> = totals
        .into_iter()
        .filter(|(_, total)| *total != 0.0)
        .map(|(category, total)| CategoryTotal { category, total })
        .collect();

    totals.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });

    totals
}

/// The `count` most recent expenses, newest first.
pub fn recent_transactions(expenses: &[ExpenseRecord], count: usize) -> Vec<ExpenseRecord> {
    let mut recent = expenses.to_vec();
    recent.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
    recent.truncate(count);

    recent
}
