//! Runtime configuration: an optional YAML file for sheet URLs and API
//! endpoints, plus `HOMEPAGE_*` environment variables for secrets.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;

use crate::sheet::layout::{AnnualSchema, SchemaRegistry};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub sheets: SheetsConfig,
    pub spotify: SpotifyConfig,
    pub strava: StravaConfig,
    pub weather: WeatherConfig,
}

/// Published CSV export URLs, one per spreadsheet tab.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetsConfig {
    pub reading: Option<String>,
    pub favorites: Option<String>,
    pub taste: Option<String>,
    pub cities: Option<String>,
    /// Keyed by year, e.g. `"2024"`.
    pub annual: BTreeMap<String, AnnualSheetConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnnualSheetConfig {
    pub url: String,
    /// Overrides the built-in layout for this year.
    #[serde(default)]
    pub schema: Option<AnnualSchema>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpotifyConfig {
    pub accounts_base_url: String,
    pub api_base_url: String,
    /// Playlist whose first track is shown as the current song.
    pub current_playlist_id: String,
    pub playlist_ids: Vec<String>,
    pub playlist_track_limit: usize,
    pub podcast_show_ids: Vec<String>,
    pub podcast_episode_limit: usize,
    pub top_limit: usize,
    #[serde(skip)]
    pub credentials: Option<OAuthCredentials>,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            accounts_base_url: "https://accounts.spotify.com".to_owned(),
            api_base_url: "https://api.spotify.com/v1".to_owned(),
            current_playlist_id: "78o6nYffU84LaDXu5V3tIh".to_owned(),
            playlist_ids: Vec::new(),
            playlist_track_limit: 10,
            podcast_show_ids: Vec::new(),
            podcast_episode_limit: 5,
            top_limit: 5,
            credentials: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StravaConfig {
    pub oauth_base_url: String,
    pub api_base_url: String,
    /// Activities older than this are not shown.
    pub recent_days: i64,
    #[serde(skip)]
    pub credentials: Option<OAuthCredentials>,
}

impl Default for StravaConfig {
    fn default() -> Self {
        Self {
            oauth_base_url: "https://www.strava.com".to_owned(),
            api_base_url: "https://www.strava.com/api/v3".to_owned(),
            recent_days: 7,
            credentials: None,
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeatherConfig {
    pub api_base_url: String,
    /// OpenWeatherMap units: `imperial`, `metric` or `standard`.
    pub units: String,
    /// Used until a location has been posted.
    pub default_lat: f64,
    pub default_lng: f64,
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.openweathermap.org/data/2.5".to_owned(),
            units: "imperial".to_owned(),
            default_lat: 37.7749,
            default_lng: -122.4194,
            api_key: None,
        }
    }
}

impl std::fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("api_base_url", &self.api_base_url)
            .field("units", &self.units)
            .field("default_lat", &self.default_lat)
            .field("default_lng", &self.default_lng)
            .field("api_key_set", &self.api_key.is_some())
            .finish()
    }
}

/// Trimmed value of `name`, or `None` when unset or blank.
pub fn env_secret(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[derive(Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl OAuthCredentials {
    /// Reads `{prefix}_CLIENT_ID`, `{prefix}_CLIENT_SECRET` and
    /// `{prefix}_REFRESH_TOKEN`; `None` unless all three are non-empty.
    pub fn from_env(prefix: &str) -> Option<Self> {
        let read = |suffix: &str| env_secret(&format!("{prefix}_{suffix}"));
        Some(Self {
            client_id: read("CLIENT_ID")?,
            client_secret: read("CLIENT_SECRET")?,
            refresh_token: read("REFRESH_TOKEN")?,
        })
    }
}

impl Config {
    /// Loads the YAML file when given, then layers secrets from the
    /// environment.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("read config: {}", path.display()))?;
                Self::from_yaml(&raw).with_context(|| format!("parse config: {}", path.display()))?
            }
            None => Self::default(),
        };
        config.spotify.credentials = OAuthCredentials::from_env("HOMEPAGE_SPOTIFY");
        config.strava.credentials = OAuthCredentials::from_env("HOMEPAGE_STRAVA");
        config.weather.api_key = env_secret("HOMEPAGE_OPENWEATHER_API_KEY");

        tracing::debug!(
            spotify_connected = config.spotify.credentials.is_some(),
            strava_connected = config.strava.credentials.is_some(),
            weather_configured = config.weather.api_key.is_some(),
            annual_years = config.sheets.annual.len(),
            "loaded config"
        );
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).context("deserialize config yaml")
    }

    /// Built-in annual layouts with per-year overrides from the file.
    pub fn schema_registry(&self) -> SchemaRegistry {
        let mut registry = SchemaRegistry::default();
        for (year, sheet) in &self.sheets.annual {
            if let Some(schema) = sheet.schema {
                registry.register(year.clone(), schema);
            }
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_is_default() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config.spotify.api_base_url, "https://api.spotify.com/v1");
        assert_eq!(config.strava.recent_days, 7);
        assert!(config.sheets.reading.is_none());
        assert_eq!(config.weather.units, "imperial");
        assert_eq!(config.weather.default_lat, 37.7749);
    }

    #[test]
    fn weather_section_and_cities_sheet() {
        let config = Config::from_yaml(
            r#"
sheets:
  cities: https://example.com/cities.csv
weather:
  units: metric
  default_lat: 40.7128
  default_lng: -74.006
"#,
        )
        .unwrap();
        assert_eq!(
            config.sheets.cities.as_deref(),
            Some("https://example.com/cities.csv")
        );
        assert_eq!(config.weather.units, "metric");
        assert_eq!(config.weather.default_lng, -74.006);
        assert!(config.weather.api_key.is_none());

        let err = Config::from_yaml("weather:\n  api_key: leaked\n").unwrap_err();
        assert!(format!("{err:#}").contains("api_key"));
    }

    #[test]
    fn weather_debug_hides_the_key() {
        let config = WeatherConfig {
            api_key: Some("super-secret".to_owned()),
            ..WeatherConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"), "{debug}");
        assert!(debug.contains("api_key_set: true"), "{debug}");
    }

    #[test]
    fn parses_sheets_and_annual_overrides() {
        let config = Config::from_yaml(
            r#"
sheets:
  reading: https://example.com/reading.csv
  annual:
    "2026":
      url: https://example.com/2026.csv
      schema: title_first
    "2023":
      url: https://example.com/2023.csv
spotify:
  playlist_ids: [abc, def]
"#,
        )
        .unwrap();

        assert_eq!(
            config.sheets.reading.as_deref(),
            Some("https://example.com/reading.csv")
        );
        assert_eq!(config.spotify.playlist_ids, vec!["abc", "def"]);
        assert_eq!(config.spotify.podcast_episode_limit, 5);

        let registry = config.schema_registry();
        assert_eq!(registry.schema_for("2026"), AnnualSchema::TitleFirst);
        assert_eq!(registry.schema_for("2023"), AnnualSchema::Monthly);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_yaml("sheets:\n  readng: x\n").unwrap_err();
        assert!(format!("{err:#}").contains("readng"));
    }
}
