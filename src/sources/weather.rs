use anyhow::Context as _;
use chrono::Utc;
use serde::Deserialize;

use crate::config::WeatherConfig;
use crate::model::{WeatherInfo, WeatherReport};
use crate::sources::endpoint;

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    name: String,
    main: Readings,
    #[serde(default)]
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct Readings {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    icon: Option<String>,
}

impl CurrentWeather {
    fn into_info(self) -> WeatherInfo {
        let (description, icon) = self
            .weather
            .into_iter()
            .next()
            .map(|c| (c.description, c.icon))
            .unwrap_or_default();
        WeatherInfo::Report(WeatherReport {
            city: self.name,
            temp: self.main.temp.round() as i64,
            description,
            icon,
            fetched_at: Utc::now(),
        })
    }
}

/// OpenWeatherMap current-conditions lookups.
pub struct WeatherClient {
    client: reqwest::Client,
    config: WeatherConfig,
}

impl WeatherClient {
    pub fn new(client: reqwest::Client, config: WeatherConfig) -> Self {
        Self { client, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Conditions at `lat`/`lng`, or [`WeatherInfo::not_configured`] without
    /// an API key.
    pub async fn current(&self, lat: f64, lng: f64) -> anyhow::Result<WeatherInfo> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Ok(WeatherInfo::not_configured());
        };
        let mut url = endpoint(&self.config.api_base_url, "weather")?;
        url.query_pairs_mut()
            .append_pair("lat", &lat.to_string())
            .append_pair("lon", &lng.to_string())
            .append_pair("appid", api_key)
            .append_pair("units", &self.config.units);

        // The query string holds the key: errors must not echo the URL.
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("GET openweathermap current weather")?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("read openweathermap response body")?;
        if !status.is_success() {
            anyhow::bail!("openweathermap request failed ({status}): {}", body.trim());
        }

        let current: CurrentWeather =
            serde_json::from_str(&body).context("parse openweathermap response")?;
        tracing::debug!(city = %current.name, "fetched weather");
        Ok(current.into_info())
    }
}
