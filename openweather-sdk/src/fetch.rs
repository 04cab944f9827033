use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::fmt::Debug;

use crate::error::WeatherError;

const API_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Transport seam for weather lookups.
///
/// The client depends on this trait rather than on HTTP directly, so tests
/// and embedders can substitute their own transport.
#[async_trait]
pub trait WeatherFetcher: Send + Sync + Debug {
    /// Fetch the raw provider payload for a city.
    async fn fetch_raw(&self, city: &str, api_key: &str) -> Result<Value, WeatherError>;
}

/// Production fetcher backed by the OpenWeather current-weather endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherFetcher {
    http: Client,
}

impl OpenWeatherFetcher {
    pub fn new() -> Result<Self, WeatherError> {
        let http = Client::builder()
            .build()
            .map_err(|e| WeatherError::Construction(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl WeatherFetcher for OpenWeatherFetcher {
    async fn fetch_raw(&self, city: &str, api_key: &str) -> Result<Value, WeatherError> {
        let res = self
            .http
            .get(API_URL)
            .query(&[("q", city), ("appid", api_key)])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(WeatherError::Upstream {
                status: status.as_u16(),
                message: upstream_message(&body),
            });
        }

        Ok(res.json().await?)
    }
}

/// OpenWeather error bodies carry a human-readable `message` field.
fn upstream_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value.get("message").and_then(Value::as_str).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_extracted_from_error_body() {
        let body = r#"{"cod":"404","message":"city not found"}"#;
        assert_eq!(upstream_message(body), Some("city not found".to_string()));
    }

    #[test]
    fn upstream_message_absent_or_unparseable_is_none() {
        assert_eq!(upstream_message(r#"{"cod":"500"}"#), None);
        assert_eq!(upstream_message("not json"), None);
    }
}
