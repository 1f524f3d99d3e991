//! The list of the most recent expenses.

use maud::{Markup, html};
use time::UtcOffset;

use crate::{
    dashboard::cards::CARD_STYLE,
    endpoints,
    expense::ExpenseRecord,
    html::{LINK_STYLE, format_inr, format_short_date},
};

/// The most recent expenses, newest first.
pub(super) fn recent_transactions_view(
    expenses: &[ExpenseRecord],
    local_offset: UtcOffset,
) -> Markup {
    html! {
        section id="recent-transactions" class=(CARD_STYLE)
        {
            div class="flex justify-between items-baseline mb-3"
            {
                h3 class="text-lg font-semibold" { "Recent expenses" }
                a href=(endpoints::EXPENSES_VIEW) class=(LINK_STYLE) { "View all" }
            }

            @if expenses.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { "No expenses added yet." }
            } @else {
                ul class="divide-y divide-gray-200 dark:divide-gray-700"
                {
                    @for expense in expenses {
                        (recent_transaction_row(expense, local_offset))
                    }
                }
            }
        }
    }
}

fn recent_transaction_row(expense: &ExpenseRecord, local_offset: UtcOffset) -> Markup {
    html! {
        li class="flex justify-between gap-4 py-3"
        {
            div class="min-w-0"
            {
                p class="font-medium truncate" { (expense.description) }
                p class="text-sm text-gray-500 dark:text-gray-400" { "Paid to " (expense.paid_to) }
                p class="text-xs text-gray-400"
                {
                    "By " (expense.user_name) " · " (format_short_date(expense.date, local_offset))
                }
            }

            div class="text-right whitespace-nowrap"
            {
                p class="font-semibold" { (format_inr(expense.advance_paid)) }

                @if expense.remaining_balance > 0.0 {
                    p class="text-sm text-red-600 dark:text-red-400"
                    {
                        (format_inr(expense.remaining_balance)) " due"
                    }
                }

                p class="text-xs text-gray-400" { "Total: " (format_inr(expense.total_amount)) }
            }
        }
    }
}
