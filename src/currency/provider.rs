//! Sources of exchange rates.
//!
//! Rates are fetched once when the server starts. Until the fetch finishes the
//! shared status reads [RatesStatus::Loading], and a failed fetch leaves it
//! [RatesStatus::Unavailable] for the lifetime of the process.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    Error,
    currency::{ExchangeRates, RECIPROCAL_DRIFT_TOLERANCE, RatesStatus, SharedRates},
};

/// How long to wait for the rates service before giving up.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Something that can produce the current exchange rates.
#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    /// Fetch the current rates.
    ///
    /// # Errors
    /// Returns [Error::ProviderUnavailable] if the rates could not be obtained.
    async fn fetch_exchange_rates(&self) -> Result<ExchangeRates, Error>;
}

/// Where the server gets its exchange rates from.
#[derive(Debug, Clone, PartialEq)]
pub enum RateSource {
    /// Always use [ExchangeRates::FIXED].
    Fixed,
    /// Fetch live rates from an ExchangeRate-API compatible endpoint that
    /// quotes against INR, e.g. "https://open.er-api.com/v6/latest/INR".
    Live { url: String },
}

impl RateSource {
    /// Create the provider for this source.
    ///
    /// # Errors
    /// Returns [Error::ProviderUnavailable] if the HTTP client cannot be built.
    pub fn into_provider(self) -> Result<Arc<dyn ExchangeRateProvider>, Error> {
        match self {
            RateSource::Fixed => Ok(Arc::new(StaticRateProvider::default())),
            RateSource::Live { url } => Ok(Arc::new(HttpRateProvider::new(url)?)),
        }
    }
}

/// Serves a fixed rate table.
#[derive(Debug, Clone)]
pub struct StaticRateProvider {
    rates: ExchangeRates,
}

impl StaticRateProvider {
    pub fn new(rates: ExchangeRates) -> Self {
        Self { rates }
    }
}

impl Default for StaticRateProvider {
    fn default() -> Self {
        Self::new(ExchangeRates::FIXED)
    }
}

#[async_trait]
impl ExchangeRateProvider for StaticRateProvider {
    async fn fetch_exchange_rates(&self) -> Result<ExchangeRates, Error> {
        Ok(self.rates)
    }
}

/// Fetches live rates over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRateProvider {
    client: Client,
    url: String,
}

/// The parts of an ExchangeRate-API response that we use.
#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: String,
    base_code: String,
    rates: HashMap<String, f64>,
}

impl HttpRateProvider {
    /// Create a provider that fetches rates from `url`.
    ///
    /// # Errors
    /// Returns [Error::ProviderUnavailable] if the HTTP client cannot be built.
    pub fn new(url: String) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| {
                Error::ProviderUnavailable(format!("could not create HTTP client: {error}"))
            })?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl ExchangeRateProvider for HttpRateProvider {
    async fn fetch_exchange_rates(&self) -> Result<ExchangeRates, Error> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|error| Error::ProviderUnavailable(format!("request failed: {error}")))?;

        if !response.status().is_success() {
            return Err(Error::ProviderUnavailable(format!(
                "rates service returned {}",
                response.status()
            )));
        }

        let body: LatestRatesResponse = response.json().await.map_err(|error| {
            Error::ProviderUnavailable(format!("could not parse rates response: {error}"))
        })?;

        rates_from_response(body)
    }
}

fn rates_from_response(body: LatestRatesResponse) -> Result<ExchangeRates, Error> {
    if body.result != "success" {
        return Err(Error::ProviderUnavailable(format!(
            "rates service reported \"{}\"",
            body.result
        )));
    }

    if body.base_code != "INR" {
        return Err(Error::ProviderUnavailable(format!(
            "expected rates quoted against INR, got {}",
            body.base_code
        )));
    }

    let inr_to_usd = body.rates.get("USD").copied().unwrap_or_default();
    let inr_to_aud = body.rates.get("AUD").copied().unwrap_or_default();

    ExchangeRates::from_inr_rates(inr_to_usd, inr_to_aud).ok_or_else(|| {
        Error::ProviderUnavailable(format!(
            "invalid USD ({inr_to_usd}) or AUD ({inr_to_aud}) rate"
        ))
    })
}

/// Fetch rates once from `provider` and record the outcome in `shared`.
pub async fn load_exchange_rates(provider: Arc<dyn ExchangeRateProvider>, shared: SharedRates) {
    match provider.fetch_exchange_rates().await {
        Ok(rates) => {
            let drift = rates.reciprocal_drift();
            if drift > RECIPROCAL_DRIFT_TOLERANCE {
                tracing::warn!(
                    "Exchange rate pairs are {:.2}% away from reciprocal, conversions in \
                    opposite directions will not round trip",
                    drift * 100.0
                );
            }

            tracing::info!("Loaded exchange rates: {rates:?}");
            shared.set(RatesStatus::Available(rates));
        }
        Err(error) => {
            tracing::error!("Could not fetch exchange rates: {error}");
            shared.set(RatesStatus::Unavailable(error.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{Json, Router, http::StatusCode, routing::get};
    use serde_json::json;
    use tokio::net::TcpListener;

    use crate::{
        Error,
        currency::{ExchangeRates, RatesStatus, SharedRates},
    };

    use super::{
        ExchangeRateProvider, HttpRateProvider, RateSource, StaticRateProvider,
        load_exchange_rates,
    };

    struct FailingProvider;

    #[async_trait]
    impl ExchangeRateProvider for FailingProvider {
        async fn fetch_exchange_rates(&self) -> Result<ExchangeRates, Error> {
            Err(Error::ProviderUnavailable("offline".to_owned()))
        }
    }

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        format!("http://{addr}/v6/latest/INR")
    }

    #[tokio::test]
    async fn static_provider_returns_fixed_rates() {
        let rates = StaticRateProvider::default()
            .fetch_exchange_rates()
            .await
            .unwrap();

        assert_eq!(rates, ExchangeRates::FIXED);
    }

    #[tokio::test]
    async fn http_provider_derives_reverse_rates() {
        let url = serve(Router::new().route(
            "/v6/latest/INR",
            get(|| async {
                Json(json!({
                    "result": "success",
                    "base_code": "INR",
                    "rates": { "INR": 1, "USD": 0.0125, "AUD": 0.02, "EUR": 0.011 }
                }))
            }),
        ))
        .await;
        let provider = HttpRateProvider::new(url).unwrap();

        let rates = provider.fetch_exchange_rates().await.unwrap();

        assert_eq!(
            rates,
            ExchangeRates {
                inr_to_usd: 0.0125,
                inr_to_aud: 0.02,
                usd_to_inr: 80.0,
                aud_to_inr: 50.0,
            }
        );
    }

    #[tokio::test]
    async fn http_provider_fails_on_error_status() {
        let url = serve(Router::new().route(
            "/v6/latest/INR",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        ))
        .await;
        let provider = HttpRateProvider::new(url).unwrap();

        let result = provider.fetch_exchange_rates().await;

        assert!(matches!(result, Err(Error::ProviderUnavailable(_))));
    }

    #[tokio::test]
    async fn http_provider_fails_on_missing_currency() {
        let url = serve(Router::new().route(
            "/v6/latest/INR",
            get(|| async {
                Json(json!({
                    "result": "success",
                    "base_code": "INR",
                    "rates": { "USD": 0.012 }
                }))
            }),
        ))
        .await;
        let provider = HttpRateProvider::new(url).unwrap();

        let result = provider.fetch_exchange_rates().await;

        assert!(matches!(result, Err(Error::ProviderUnavailable(_))));
    }

    #[tokio::test]
    async fn load_records_available_rates() {
        let shared = SharedRates::default();

        load_exchange_rates(Arc::new(StaticRateProvider::default()), shared.clone()).await;

        assert_eq!(shared.status(), RatesStatus::Available(ExchangeRates::FIXED));
    }

    #[tokio::test]
    async fn load_records_failure_as_unavailable() {
        let shared = SharedRates::default();

        load_exchange_rates(Arc::new(FailingProvider), shared.clone()).await;

        assert!(matches!(shared.status(), RatesStatus::Unavailable(_)));
    }

    #[tokio::test]
    async fn fixed_source_builds_static_provider() {
        let provider = RateSource::Fixed.into_provider().unwrap();

        assert_eq!(
            provider.fetch_exchange_rates().await.unwrap(),
            ExchangeRates::FIXED
        );
    }
}
