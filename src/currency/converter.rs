//! Currency conversion through the INR pivot.

use std::{fmt::Display, str::FromStr};

use serde::Deserialize;

use crate::currency::{ExchangeRates, RatesStatus};

/// The amount the converter shows when it first loads.
pub const INITIAL_INR_AMOUNT: &str = "1000";

/// The currencies the app converts between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Inr,
    Usd,
    Aud,
}

impl Currency {
    /// The name used for the currency in forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Inr => "inr",
            Currency::Usd => "usd",
            Currency::Aud => "aud",
        }
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inr" => Ok(Currency::Inr),
            "usd" => Ok(Currency::Usd),
            "aud" => Ok(Currency::Aud),
            other => Err(format!("unknown currency {other}")),
        }
    }
}

/// USD and AUD equivalents of an INR amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Annotation {
    pub usd: f64,
    pub aud: f64,
}

impl Display for Annotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "USD: ${:.2}, AUD: A${:.2}", self.usd, self.aud)
    }
}

/// Convert `amount_inr` to USD and AUD, or `None` if there are no rates.
pub fn annotate(amount_inr: f64, rates: Option<&ExchangeRates>) -> Option<Annotation> {
    rates.map(|rates| Annotation {
        usd: amount_inr * rates.inr_to_usd,
        aud: amount_inr * rates.inr_to_aud,
    })
}

/// The text of the three converter inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct ConverterFields {
    pub inr: String,
    pub usd: String,
    pub aud: String,
}

impl ConverterFields {
    /// The converter as it first appears, showing [INITIAL_INR_AMOUNT].
    pub fn initial(rates: &ExchangeRates) -> Self {
        convert(rates, Currency::Inr, INITIAL_INR_AMOUNT)
    }
}

/// What the converter widget can show.
#[derive(Debug, Clone, PartialEq)]
pub enum ConverterState {
    /// Rates have not been loaded yet.
    Loading,
    /// Rates could not be loaded, no conversion is possible.
    Unavailable,
    Ready(ConverterFields),
}

impl ConverterState {
    /// The converter for the current rate status after `edited` was set to `raw`.
    pub fn new(status: &RatesStatus, edited: Currency, raw: &str) -> Self {
        match status {
            RatesStatus::Loading => ConverterState::Loading,
            RatesStatus::Unavailable(_) => ConverterState::Unavailable,
            RatesStatus::Available(rates) => ConverterState::Ready(convert(rates, edited, raw)),
        }
    }

    /// The converter as it first appears for the current rate status.
    pub fn initial(status: &RatesStatus) -> Self {
        Self::new(status, Currency::Inr, INITIAL_INR_AMOUNT)
    }
}

/// Recompute the two fields that were not edited.
///
/// The edited field keeps `raw` exactly as typed. Input that does not start
/// with a number counts as zero. USD and AUD always convert through INR.
pub fn convert(rates: &ExchangeRates, edited: Currency, raw: &str) -> ConverterFields {
    let value = parse_lenient(raw);

    match edited {
        Currency::Inr => ConverterFields {
            inr: raw.to_owned(),
            usd: format_amount(value * rates.inr_to_usd),
            aud: format_amount(value * rates.inr_to_aud),
        },
        Currency::Usd => {
            let inr = value * rates.usd_to_inr;
            ConverterFields {
                inr: format_amount(inr),
                usd: raw.to_owned(),
                aud: format_amount(inr * rates.inr_to_aud),
            }
        }
        Currency::Aud => {
            let inr = value * rates.aud_to_inr;
            ConverterFields {
                inr: format_amount(inr),
                usd: format_amount(inr * rates.inr_to_usd),
                aud: raw.to_owned(),
            }
        }
    }
}

fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}

/// Parse the longest leading number in `raw`, e.g. "12.5abc" is 12.5.
///
/// Anything without a leading number, including the empty string, is zero.
/// So is a number too large to represent.
pub fn parse_lenient(raw: &str) -> f64 {
    let raw = raw.trim_start();

    raw[..leading_number_len(raw.as_bytes())]
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// The length of the decimal number at the start of `bytes`: an optional
/// sign, digits with an optional fraction, then an optional exponent.
fn leading_number_len(bytes: &[u8]) -> usize {
    let count_digits = |from: usize| {
        bytes[from..]
            .iter()
            .take_while(|byte| byte.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let integer_digits = count_digits(end);
    end += integer_digits;

    let mut fraction_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction_digits = count_digits(end + 1);
        if integer_digits > 0 || fraction_digits > 0 {
            end += 1 + fraction_digits;
        }
    }

    if integer_digits == 0 && fraction_digits == 0 {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exponent_digits = count_digits(end + 1 + sign);
        if exponent_digits > 0 {
            end += 1 + sign + exponent_digits;
        }
    }

    end
}
