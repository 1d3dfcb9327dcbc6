use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

use crate::{Config, SearchQuery, WeatherReport, provider::weatherapi::WeatherApiProvider};

pub mod weatherapi;

/// Shown for every failure that is not an upstream-reported problem.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

/// Why a single fetch attempt failed. Both variants end the attempt; nothing retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    /// The service answered with its own error object (e.g. unknown city).
    #[error("{0}")]
    Upstream(String),

    /// Transport or decoding failure. Details are logged, never shown.
    #[error("Network error. Please try again.")]
    Network,
}

impl WeatherError {
    /// Text to put in front of the user.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// One outbound request for current conditions plus the forecast window.
    async fn fetch_weather(&self, query: &SearchQuery) -> Result<WeatherReport, WeatherError>;
}

/// Build the WeatherAPI.com provider with the credential and endpoint taken from `config`.
///
/// A missing key is passed through as empty; the service rejects it with an upstream error.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key.clone().unwrap_or_else(|| {
        tracing::warn!(
            "No API key configured. Hint: run `weather configure` or set WEATHER_API_KEY."
        );
        String::new()
    });

    let provider = WeatherApiProvider::new(api_key, config.base_url.clone())?;

    Ok(Box::new(provider))
}
