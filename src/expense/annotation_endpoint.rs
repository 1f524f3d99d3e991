//! Shows the USD and AUD equivalents of an amount typed into the expense form.

use axum::extract::{Query, State};
use axum_extra::extract::Form;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    currency::{CurrencyState, annotate, parse_lenient},
    expense::RawExpenseInput,
};

/// The amount fields of the expense form that get an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountField {
    TotalAmount,
    AdvancePaid,
}

#[derive(Debug, Deserialize)]
pub struct AnnotationQuery {
    pub field: AmountField,
}

/// Render the annotation for the amount field named in the query.
///
/// Nothing is shown for amounts that are not positive.
pub async fn expense_annotation_endpoint(
    State(state): State<CurrencyState>,
    Query(query): Query<AnnotationQuery>,
    Form(input): Form<RawExpenseInput>,
) -> Markup {
    let raw_amount = match query.field {
        AmountField::TotalAmount => &input.total_amount,
        AmountField::AdvancePaid => &input.advance_paid,
    };
    let amount = parse_lenient(raw_amount);

    if amount <= 0.0 {
        return html! {};
    }

    let status = state.rates.status();

    html! {
        @if let Some(annotation) = annotate(amount, status.rates()) {
            "≈ " (annotation)
        } @else if let Some(placeholder) = status.placeholder_text() {
            span class="italic" { (placeholder) }
        }
    }
}
