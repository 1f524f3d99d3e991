//! The budget card and the form for changing the budget.

use maud::{Markup, html};

use crate::{
    currency::{RatesStatus, annotate},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, format_aud, format_usd,
        inr_rounded_with_tooltip,
    },
    summary::BudgetSummary,
};

pub(super) const CARD_STYLE: &str = "w-full p-4 bg-white border border-gray-200 rounded-lg \
    shadow dark:bg-gray-800 dark:border-gray-700";

const OVER_BUDGET_STYLE: &str = "text-red-600 dark:text-red-400";
const UNDER_BUDGET_STYLE: &str = "text-green-600 dark:text-green-400";

/// The budget with its USD and AUD equivalents, the amount spent and the
/// amount left.
pub(super) fn budget_card(summary: &BudgetSummary, rates: &RatesStatus) -> Markup {
    let remaining_style = if summary.is_over_budget {
        OVER_BUDGET_STYLE
    } else {
        UNDER_BUDGET_STYLE
    };
    let bar_style = if summary.is_over_budget {
        "h-2.5 rounded-full bg-red-600"
    } else {
        "h-2.5 rounded-full bg-blue-600"
    };

    html! {
        section id="budget-card" class=(CARD_STYLE)
        {
            div class="flex justify-between items-baseline"
            {
                h3 class="text-lg font-semibold" { "Trip budget" }
                span class="text-2xl font-bold" { (inr_rounded_with_tooltip(summary.total_budget)) }
            }

            p id="budget-equivalents" class="text-sm text-right text-gray-500 dark:text-gray-400"
            {
                @if let Some(annotation) = annotate(summary.total_budget, rates.rates()) {
                    "≈ " (format_usd(annotation.usd)) " · " (format_aud(annotation.aud))
                } @else if let Some(placeholder) = rates.placeholder_text() {
                    span class="italic" { (placeholder) }
                }
            }

            dl class="grid grid-cols-2 gap-4 mt-4"
            {
                div
                {
                    dt class="text-sm text-gray-500 dark:text-gray-400" { "Spent" }
                    dd id="budget-spent" class="text-xl font-semibold"
                    {
                        (inr_rounded_with_tooltip(summary.total_spent))
                    }
                }

                div
                {
                    dt class="text-sm text-gray-500 dark:text-gray-400" { "Remaining" }
                    dd id="budget-remaining" class={"text-xl font-semibold " (remaining_style)}
                    {
                        (inr_rounded_with_tooltip(summary.remaining))
                    }
                }
            }

            div class="mt-4"
            {
                div class="flex justify-between text-sm mb-1"
                {
                    span { "Used" }
                    span id="budget-progress" { (format!("{:.0}%", summary.progress_percent)) }
                }

                div
                    class="w-full bg-gray-200 rounded-full h-2.5 dark:bg-gray-700"
                    role="progressbar"
                    aria-valuemin="0"
                    aria-valuemax="100"
                    aria-valuenow=(format!("{:.0}", summary.progress_bar_percent()))
                {
                    div
                        class=(bar_style)
                        style=(format!("width: {:.0}%", summary.progress_bar_percent()))
                    {}
                }
            }
        }
    }
}

/// The form for changing the trip budget.
///
/// The new value reaches the budget card through the dashboard event stream,
/// so the response only needs to show an alert.
pub(super) fn budget_form(total_budget: f64) -> Markup {
    html! {
        section class=(CARD_STYLE)
        {
            form
                hx-post=(endpoints::BUDGET_API)
                hx-target="#alert-container"
                hx-target-error="#alert-container"
                class="space-y-3"
            {
                label for="total_budget" class=(FORM_LABEL_STYLE) { "Change budget (INR)" }

                div class="input-wrapper w-full"
                {
                    input
                        name="total_budget"
                        id="total_budget"
                        type="number"
                        step="1"
                        min="1"
                        value=(format!("{total_budget:.0}"))
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update budget" }
            }
        }
    }
}
