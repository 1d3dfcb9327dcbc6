use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::model::{Condition, ForecastDay, SearchQuery, WeatherReport, WeatherSnapshot};

use super::{WeatherError, WeatherProvider};

/// Forecast window requested on every call.
pub const FORECAST_DAYS: u8 = 3;

/// Used when the service sends an `error` object with no readable message.
const UPSTREAM_FALLBACK_MESSAGE: &str = "Weather service reported an error.";

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String, base_url: String) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("weather-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client for WeatherAPI.com")?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn forecast_url(&self) -> String {
        format!("{}/forecast.json", self.base_url)
    }

    /// Send the request and hand back the raw body, whatever the status code.
    ///
    /// WeatherAPI reports unknown cities and bad keys as 4xx with a JSON `error`
    /// object, so the status alone does not tell a network failure apart.
    async fn fetch_body(&self, query: &SearchQuery) -> Result<String> {
        let days = FORECAST_DAYS.to_string();

        let res = self
            .http
            .get(self.forecast_url())
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", query.as_str()),
                ("days", days.as_str()),
                ("aqi", "no"),
                ("alerts", "no"),
            ])
            .send()
            .await
            .context("Failed to send request to WeatherAPI.com (forecast)")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read WeatherAPI forecast response body")?;

        debug!(%status, bytes = body.len(), "WeatherAPI forecast response received");

        Ok(body)
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn fetch_weather(&self, query: &SearchQuery) -> Result<WeatherReport, WeatherError> {
        debug!(query = %query, days = FORECAST_DAYS, "Requesting WeatherAPI forecast");

        let body = self.fetch_body(query).await.map_err(|err| {
            warn!(query = %query, error = %format_args!("{err:#}"), "WeatherAPI request failed");
            WeatherError::Network
        })?;

        let report = parse_forecast_body(&body)?;

        info!(
            query = %query,
            location = %report.snapshot.display_location(),
            days = report.forecast.len(),
            "Weather fetched"
        );

        Ok(report)
    }
}

/// Turn a forecast.json body into a report, separating upstream errors from
/// everything else that can go wrong.
pub fn parse_forecast_body(body: &str) -> Result<WeatherReport, WeatherError> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|err| {
        warn!(error = %err, body = %truncate_body(body), "WeatherAPI body is not JSON");
        WeatherError::Network
    })?;

    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        let message = error
            .get("message")
            .and_then(serde_json::Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(UPSTREAM_FALLBACK_MESSAGE);

        debug!(code = ?error.get("code"), upstream_message = message, "WeatherAPI returned an error object");
        return Err(WeatherError::Upstream(message.to_string()));
    }

    let parsed: WaForecastResponse = serde_json::from_value(value).map_err(|err| {
        warn!(error = %err, body = %truncate_body(body), "Unexpected WeatherAPI forecast JSON");
        WeatherError::Network
    })?;

    Ok(parsed.into_report())
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    #[serde(default)]
    icon: String,
}

impl From<WaCondition> for Condition {
    fn from(c: WaCondition) -> Self {
        Condition { text: c.text, icon: c.icon }
    }
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    humidity: u8,
    condition: WaCondition,
    last_updated_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    avgtemp_c: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: NaiveDate,
    day: WaDay,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    location: WaLocation,
    current: WaCurrent,
    forecast: WaForecast,
}

impl WaForecastResponse {
    fn into_report(self) -> WeatherReport {
        let snapshot = WeatherSnapshot {
            location_name: self.location.name,
            country: self.location.country,
            temperature_c: self.current.temp_c,
            humidity_pct: self.current.humidity,
            condition: self.current.condition.into(),
            observed_at: self.current.last_updated_epoch.and_then(unix_to_utc),
        };

        let forecast = self
            .forecast
            .forecastday
            .into_iter()
            .map(|d| ForecastDay {
                date: d.date,
                avg_temperature_c: d.day.avgtemp_c,
                condition: d.day.condition.into(),
            })
            .collect();

        WeatherReport { snapshot, forecast }
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "location": { "name": "Paris", "country": "France", "localtime_epoch": 1718000000 },
        "current": {
            "last_updated_epoch": 1717999200,
            "temp_c": 18.0,
            "humidity": 64,
            "condition": { "text": "Partly cloudy", "icon": "//cdn.weatherapi.com/weather/64x64/day/116.png", "code": 1003 }
        },
        "forecast": { "forecastday": [
            { "date": "2024-06-10", "day": { "avgtemp_c": 17.2, "condition": { "text": "Patchy rain nearby", "icon": "//cdn/176.png" } } },
            { "date": "2024-06-11", "day": { "avgtemp_c": 19.5, "condition": { "text": "Sunny", "icon": "//cdn/113.png" } } },
            { "date": "2024-06-12", "day": { "avgtemp_c": 21.0, "condition": { "text": "Overcast", "icon": "//cdn/122.png" } } }
        ] }
    }"#;

    #[test]
    fn parses_snapshot_and_forecast() {
        let report = parse_forecast_body(SAMPLE).expect("sample must parse");

        assert_eq!(report.snapshot.location_name, "Paris");
        assert_eq!(report.snapshot.country, "France");
        assert_eq!(report.snapshot.temperature_c, 18.0);
        assert_eq!(report.snapshot.humidity_pct, 64);
        assert_eq!(report.snapshot.condition.text, "Partly cloudy");
        assert_eq!(report.snapshot.observed_at.map(|t| t.timestamp()), Some(1_717_999_200));

        let dates: Vec<String> = report.forecast.iter().map(|d| d.date.to_string()).collect();
        assert_eq!(dates, ["2024-06-10", "2024-06-11", "2024-06-12"]);
        assert_eq!(report.forecast[1].avg_temperature_c, 19.5);
        assert_eq!(report.forecast[2].condition.text, "Overcast");
    }

    #[test]
    fn error_object_is_upstream() {
        let body = r#"{"error":{"code":1006,"message":"No matching location found."}}"#;
        assert_eq!(
            parse_forecast_body(body),
            Err(WeatherError::Upstream("No matching location found.".into()))
        );
    }

    #[test]
    fn error_object_without_message_uses_fallback() {
        let body = r#"{"error":{"code":9999}}"#;
        assert_eq!(
            parse_forecast_body(body),
            Err(WeatherError::Upstream(UPSTREAM_FALLBACK_MESSAGE.into()))
        );
    }

    #[test]
    fn non_json_body_is_network() {
        assert_eq!(parse_forecast_body("<html>502 Bad Gateway</html>"), Err(WeatherError::Network));
    }

    #[test]
    fn json_missing_fields_is_network() {
        assert_eq!(parse_forecast_body(r#"{"location":{"name":"X"}}"#), Err(WeatherError::Network));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let out = truncate_body(&long);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
