//! Exchange rates and conversion between Indian Rupees, US Dollars and
//! Australian Dollars.
//!
//! Amounts are stored in INR. USD and AUD only ever appear as conversions of
//! an INR amount, and a USD amount is converted to AUD by way of INR.

mod converter;
mod converter_endpoint;
mod provider;
mod rates;

pub use converter::{ConverterFields, ConverterState, Currency, annotate, convert, parse_lenient};
pub use converter_endpoint::{CurrencyState, converter_card, post_converter};
pub use provider::{RateSource, load_exchange_rates};
pub use rates::{
    ExchangeRates, RATES_LOADING_TEXT, RATES_UNAVAILABLE_TEXT, RECIPROCAL_DRIFT_TOLERANCE,
    RatesStatus, SharedRates,
};
