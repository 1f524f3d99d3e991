//! Exchange rates between the Indian Rupee and the other trip currencies, and
//! the shared state that tracks whether they have been loaded.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

/// How far a rate pair may drift from being exact reciprocals before a warning
/// is logged, as a fraction.
pub const RECIPROCAL_DRIFT_TOLERANCE: f64 = 0.01;

/// The four conversion factors used by the app.
///
/// INR is the pivot currency: USD and AUD are never converted directly.
/// The pairs are not required to be exact reciprocals of each other.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRates {
    #[serde(rename = "INR_TO_USD")]
    pub inr_to_usd: f64,
    #[serde(rename = "INR_TO_AUD")]
    pub inr_to_aud: f64,
    #[serde(rename = "USD_TO_INR")]
    pub usd_to_inr: f64,
    #[serde(rename = "AUD_TO_INR")]
    pub aud_to_inr: f64,
}

impl ExchangeRates {
    /// Fixed rates used when no live provider is configured.
    pub const FIXED: ExchangeRates = ExchangeRates {
        inr_to_usd: 0.012,
        inr_to_aud: 0.018,
        usd_to_inr: 83.33,
        aud_to_inr: 55.56,
    };

    /// Build rates from the INR to USD and INR to AUD factors, deriving the
    /// reverse factors as reciprocals.
    ///
    /// Returns `None` if either factor is not a positive, finite number.
    pub fn from_inr_rates(inr_to_usd: f64, inr_to_aud: f64) -> Option<Self> {
        let is_valid = |rate: f64| rate.is_finite() && rate > 0.0;

        if !is_valid(inr_to_usd) || !is_valid(inr_to_aud) {
            return None;
        }

        Some(Self {
            inr_to_usd,
            inr_to_aud,
            usd_to_inr: 1.0 / inr_to_usd,
            aud_to_inr: 1.0 / inr_to_aud,
        })
    }

    /// The largest relative error between a rate pair and exact reciprocity,
    /// e.g. 0.004 when `inr_to_usd * usd_to_inr == 0.996`.
    pub fn reciprocal_drift(&self) -> f64 {
        let usd_drift = (self.inr_to_usd * self.usd_to_inr - 1.0).abs();
        let aud_drift = (self.inr_to_aud * self.aud_to_inr - 1.0).abs();

        usd_drift.max(aud_drift)
    }
}

/// Shown in place of converted amounts while the rates are being fetched.
pub const RATES_LOADING_TEXT: &str = "Exchange rates loading…";
/// Shown in place of converted amounts after the rates could not be fetched.
pub const RATES_UNAVAILABLE_TEXT: &str = "Exchange rates unavailable";

/// Whether exchange rates can be used right now.
#[derive(Debug, Clone, PartialEq)]
pub enum RatesStatus {
    /// The provider has not answered yet.
    Loading,
    Available(ExchangeRates),
    /// The provider failed. Holds the reason for the logs.
    Unavailable(String),
}

impl RatesStatus {
    /// The rates if they are available.
    pub fn rates(&self) -> Option<&ExchangeRates> {
        match self {
            RatesStatus::Available(rates) => Some(rates),
            _ => None,
        }
    }

    /// Why there are no rates to show, or `None` if they are available.
    pub fn placeholder_text(&self) -> Option<&'static str> {
        match self {
            RatesStatus::Loading => Some(RATES_LOADING_TEXT),
            RatesStatus::Available(_) => None,
            RatesStatus::Unavailable(_) => Some(RATES_UNAVAILABLE_TEXT),
        }
    }
}

/// Exchange rate status shared between the loader task and request handlers.
#[derive(Debug, Clone)]
pub struct SharedRates(Arc<RwLock<RatesStatus>>);

impl Default for SharedRates {
    fn default() -> Self {
        Self(Arc::new(RwLock::new(RatesStatus::Loading)))
    }
}

impl SharedRates {
    /// Shared rates that start out available, handy for tests and the fixed table.
    pub fn available(rates: ExchangeRates) -> Self {
        Self(Arc::new(RwLock::new(RatesStatus::Available(rates))))
    }

    /// A copy of the current status.
    ///
    /// A poisoned lock is reported as [RatesStatus::Unavailable].
    pub fn status(&self) -> RatesStatus {
        match self.0.read() {
            Ok(status) => status.clone(),
            Err(error) => {
                tracing::error!("could not acquire exchange rate lock: {error}");
                RatesStatus::Unavailable("exchange rate lock poisoned".to_owned())
            }
        }
    }

    /// Replace the current status.
    pub fn set(&self, status: RatesStatus) {
        match self.0.write() {
            Ok(mut current) => *current = status,
            Err(error) => tracing::error!("could not acquire exchange rate lock: {error}"),
        }
    }
}
