//! Source adapters: each one fetches a single slice of the site document.

use std::sync::Arc;

use anyhow::Context as _;
use async_trait::async_trait;
use chrono::Local;

use crate::config::Config;
use crate::model::{
    ActivitySummary, AnnualList, BookRecord, CityRecord, CurrentSong, FavoriteReads,
    MonthlyReadGroup, SpotifyStats, TasteList, WeatherInfo,
};
use crate::sheet::extract;
use crate::sheet::layout::{
    self, CITIES_MAX_COLUMNS, FAVORITES_MAX_COLUMNS, READING_MAX_COLUMNS, TASTE_MAX_COLUMNS,
};
use crate::store::DocumentStore;

pub mod sheets;
pub mod spotify;
pub mod strava;
pub mod weather;

pub use sheets::SheetClient;
pub use spotify::SpotifyClient;
pub use strava::StravaClient;
pub use weather::WeatherClient;

/// Every slice the aggregator collects. Implementations return `Ok` with a
/// sentinel when a source is not configured and `Err` when it fails.
#[async_trait]
pub trait SiteSources: Send + Sync {
    async fn current_song(&self) -> anyhow::Result<CurrentSong>;
    async fn spotify_stats(&self) -> anyhow::Result<SpotifyStats>;
    async fn current_book(&self) -> anyhow::Result<BookRecord>;
    async fn current_city(&self) -> anyhow::Result<CityRecord>;
    async fn weather(&self) -> anyhow::Result<WeatherInfo>;
    async fn activity(&self) -> anyhow::Result<Option<ActivitySummary>>;
    async fn favorite_rappers(&self) -> anyhow::Result<TasteList>;
    async fn music_playlists(&self) -> anyhow::Result<Vec<TasteList>>;
    async fn taste_music_lists(&self) -> anyhow::Result<Vec<TasteList>>;
    async fn podcast_episodes(&self) -> anyhow::Result<TasteList>;
    async fn favorite_reads(&self) -> anyhow::Result<FavoriteReads>;
    async fn annual_reading_lists(&self) -> anyhow::Result<Vec<AnnualList>>;
    async fn this_year_reads(&self) -> anyhow::Result<Vec<MonthlyReadGroup>>;
}

/// Live adapters backed by published sheets, Spotify, Strava and
/// OpenWeatherMap.
///
/// Build one per fetch cycle: access tokens are cached for the lifetime of
/// the value.
pub struct HttpSources {
    config: Config,
    sheets: SheetClient,
    spotify: SpotifyClient,
    strava: StravaClient,
    weather: WeatherClient,
    /// Where the last posted location is read from.
    store: Option<Arc<dyn DocumentStore>>,
}

impl HttpSources {
    pub fn new(config: Config, client: reqwest::Client) -> Self {
        Self {
            sheets: SheetClient::new(client.clone()),
            spotify: SpotifyClient::new(client.clone(), config.spotify.clone()),
            strava: StravaClient::new(client.clone(), config.strava.clone()),
            weather: WeatherClient::new(client, config.weather.clone()),
            config,
            store: None,
        }
    }

    /// Looks weather up at the stored location instead of the configured
    /// default.
    pub fn with_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    async fn weather_coordinates(&self) -> anyhow::Result<(f64, f64)> {
        let stored = match &self.store {
            Some(store) => store.location().await.context("load stored location")?,
            None => None,
        };
        Ok(stored
            .map(|location| (location.lat, location.lng))
            .unwrap_or((self.config.weather.default_lat, self.config.weather.default_lng)))
    }
}

#[async_trait]
impl SiteSources for HttpSources {
    async fn current_song(&self) -> anyhow::Result<CurrentSong> {
        self.spotify.current_song().await
    }

    async fn spotify_stats(&self) -> anyhow::Result<SpotifyStats> {
        self.spotify.stats().await
    }

    async fn current_book(&self) -> anyhow::Result<BookRecord> {
        let Some(url) = self.config.sheets.reading.as_deref() else {
            return Ok(BookRecord::not_configured());
        };
        let rows = self
            .sheets
            .fetch_rows(url, Some(READING_MAX_COLUMNS))
            .await
            .context("fetch reading sheet")?;
        Ok(extract::current_book(&rows, &layout::THIS_YEAR))
    }

    async fn current_city(&self) -> anyhow::Result<CityRecord> {
        let Some(url) = self.config.sheets.cities.as_deref() else {
            return Ok(CityRecord::not_configured());
        };
        let rows = self
            .sheets
            .fetch_rows(url, Some(CITIES_MAX_COLUMNS))
            .await
            .context("fetch cities sheet")?;
        Ok(extract::current_city(&rows, &layout::CITIES))
    }

    async fn weather(&self) -> anyhow::Result<WeatherInfo> {
        if !self.weather.is_configured() {
            return Ok(WeatherInfo::not_configured());
        }
        let (lat, lng) = self.weather_coordinates().await?;
        self.weather
            .current(lat, lng)
            .await
            .context("fetch current weather")
    }

    async fn activity(&self) -> anyhow::Result<Option<ActivitySummary>> {
        self.strava.latest_activity().await
    }

    async fn favorite_rappers(&self) -> anyhow::Result<TasteList> {
        let Some(url) = self.config.sheets.taste.as_deref() else {
            return Ok(TasteList::empty(extract::FAVORITE_RAPPERS_TITLE));
        };
        let rows = self
            .sheets
            .fetch_rows(url, Some(TASTE_MAX_COLUMNS))
            .await
            .context("fetch taste sheet")?;
        Ok(extract::favorite_rappers(&rows))
    }

    async fn music_playlists(&self) -> anyhow::Result<Vec<TasteList>> {
        self.spotify.playlists().await
    }

    async fn taste_music_lists(&self) -> anyhow::Result<Vec<TasteList>> {
        let Some(url) = self.config.sheets.taste.as_deref() else {
            return Ok(Vec::new());
        };
        let rows = self
            .sheets
            .fetch_rows(url, Some(TASTE_MAX_COLUMNS))
            .await
            .context("fetch taste sheet")?;
        Ok(extract::taste_music_lists(&rows))
    }

    async fn podcast_episodes(&self) -> anyhow::Result<TasteList> {
        self.spotify.podcast_episodes().await
    }

    async fn favorite_reads(&self) -> anyhow::Result<FavoriteReads> {
        let Some(url) = self.config.sheets.favorites.as_deref() else {
            return Ok(FavoriteReads::default());
        };
        let rows = self
            .sheets
            .fetch_rows(url, Some(FAVORITES_MAX_COLUMNS))
            .await
            .context("fetch favorites sheet")?;
        Ok(extract::favorite_reads(&rows))
    }

    async fn annual_reading_lists(&self) -> anyhow::Result<Vec<AnnualList>> {
        if self.config.sheets.annual.is_empty() {
            return Ok(Vec::new());
        }
        let registry = self.config.schema_registry();

        let mut fetched = Vec::with_capacity(self.config.sheets.annual.len());
        let mut last_err = None;
        for (year, sheet) in &self.config.sheets.annual {
            let schema = registry.schema_for(year);
            match self
                .sheets
                .fetch_rows(&sheet.url, Some(schema.max_columns()))
                .await
            {
                Ok(rows) => fetched.push((year.as_str(), rows)),
                Err(err) => {
                    tracing::warn!(year = %year, error = %format!("{err:#}"), "skip annual sheet");
                    last_err = Some(err.context(format!("fetch annual sheet {year}")));
                }
            }
        }

        if fetched.is_empty()
            && let Some(err) = last_err
        {
            return Err(err);
        }

        Ok(extract::annual_reading_lists(
            fetched.iter().map(|(year, rows)| (*year, rows.as_slice())),
            &registry,
        ))
    }

    async fn this_year_reads(&self) -> anyhow::Result<Vec<MonthlyReadGroup>> {
        let Some(url) = self.config.sheets.reading.as_deref() else {
            return Ok(Vec::new());
        };
        let rows = self
            .sheets
            .fetch_rows(url, Some(READING_MAX_COLUMNS))
            .await
            .context("fetch reading sheet")?;
        Ok(extract::this_year_reads(
            &rows,
            &layout::THIS_YEAR,
            Local::now().date_naive(),
        ))
    }
}

/// Joins `path` under `base`, keeping any path prefix `base` already has
/// (`https://api.spotify.com/v1` + `me/top/artists`).
pub fn endpoint(base: &str, path: &str) -> anyhow::Result<url::Url> {
    let mut base = url::Url::parse(base).with_context(|| format!("parse base url: {base}"))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(path.trim_start_matches('/'))
        .with_context(|| format!("join {path} onto {base}"))
}

/// Reads the body and fails with status and body text on non-2xx.
pub(crate) async fn read_success_body(
    response: reqwest::Response,
    what: &str,
) -> anyhow::Result<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .with_context(|| format!("read {what} response body"))?;
    if !status.is_success() {
        anyhow::bail!("{what} failed ({status}): {}", body.trim());
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_base_path() {
        assert_eq!(
            endpoint("https://api.spotify.com/v1", "me/top/artists")
                .unwrap()
                .as_str(),
            "https://api.spotify.com/v1/me/top/artists"
        );
        assert_eq!(
            endpoint("http://127.0.0.1:9000/", "/oauth/token")
                .unwrap()
                .as_str(),
            "http://127.0.0.1:9000/oauth/token"
        );
    }

    #[test]
    fn endpoint_rejects_garbage_base() {
        assert!(endpoint("not a url", "x").is_err());
    }
}
