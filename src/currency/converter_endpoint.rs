//! The currency converter card and the endpoint that recalculates it.

use axum::extract::{FromRef, State};
use axum_extra::extract::Form;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState,
    currency::{ConverterFields, ConverterState, Currency, SharedRates},
    endpoints,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
};

/// The state needed to convert between currencies.
#[derive(Debug, Clone)]
pub struct CurrencyState {
    pub rates: SharedRates,
}

impl FromRef<AppState> for CurrencyState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            rates: state.rates.clone(),
        }
    }
}

/// The converter inputs plus which one the user just changed.
#[derive(Debug, Clone, Deserialize)]
pub struct ConverterForm {
    pub edited: Currency,
    #[serde(default)]
    pub inr: String,
    #[serde(default)]
    pub usd: String,
    #[serde(default)]
    pub aud: String,
}

impl ConverterForm {
    fn edited_value(&self) -> &str {
        match self.edited {
            Currency::Inr => &self.inr,
            Currency::Usd => &self.usd,
            Currency::Aud => &self.aud,
        }
    }
}

/// Recalculate the converter after one of its inputs changed.
pub async fn post_converter(
    State(state): State<CurrencyState>,
    Form(form): Form<ConverterForm>,
) -> Markup {
    let converter = ConverterState::new(&state.rates.status(), form.edited, form.edited_value());

    converter_card(&converter)
}

/// The converter card as shown on the dashboard.
pub fn converter_card(converter: &ConverterState) -> Markup {
    html! {
        section
            id="currency-converter"
            class="w-full p-4 bg-white border border-gray-200 rounded-lg shadow
                dark:bg-gray-800 dark:border-gray-700"
        {
            h3 class="text-lg font-semibold mb-3" { "Currency converter" }

            @match converter {
                ConverterState::Loading => {
                    p class="text-sm italic text-gray-500 dark:text-gray-400"
                        hx-post=(endpoints::CONVERTER_API)
                        hx-vals=r#"{"edited": "inr", "inr": "1000"}"#
                        hx-trigger="load delay:2s"
                        hx-target="#currency-converter"
                        hx-swap="outerHTML"
                    {
                        (crate::currency::RATES_LOADING_TEXT)
                    }
                }
                ConverterState::Unavailable => {
                    p class="text-sm text-red-600 dark:text-red-400"
                    {
                        (crate::currency::RATES_UNAVAILABLE_TEXT)
                    }
                }
                ConverterState::Ready(fields) => {
                    (converter_form(fields))
                }
            }
        }
    }
}

fn converter_form(fields: &ConverterFields) -> Markup {
    let inputs = [
        (Currency::Inr, "INR (₹)", &fields.inr),
        (Currency::Usd, "USD ($)", &fields.usd),
        (Currency::Aud, "AUD (A$)", &fields.aud),
    ];

    html! {
        form class="grid grid-cols-1 sm:grid-cols-3 gap-3"
        {
            @for (currency, label, value) in inputs {
                div
                {
                    label for=(currency.as_str()) class=(FORM_LABEL_STYLE) { (label) }

                    input
                        type="text"
                        inputmode="decimal"
                        name=(currency.as_str())
                        id=(currency.as_str())
                        value=(value)
                        class=(FORM_TEXT_INPUT_STYLE)
                        hx-post=(endpoints::CONVERTER_API)
                        hx-vals=(format!(r#"{{"edited": "{}"}}"#, currency.as_str()))
                        hx-trigger="input changed delay:300ms"
                        hx-target="#currency-converter"
                        hx-swap="outerHTML";
                }
            }
        }
    }
}
