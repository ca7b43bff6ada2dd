use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub month: String,
}

impl BookRecord {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            ..Self::default()
        }
    }

    /// Sentinel for "no row in the sheet is marked in progress".
    pub fn not_found() -> Self {
        Self::new("Nothing in progress", "")
    }

    pub fn not_configured() -> Self {
        Self::new("Book sheet not configured", "Setup needed")
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new("Error loading book", message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityRecord {
    pub city: String,
    #[serde(default)]
    pub country: String,
}

impl CityRecord {
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new("No current city", "")
    }

    pub fn not_configured() -> Self {
        Self::new("City sheet not configured", "Setup needed")
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new("Error loading city", message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReadGroup {
    pub month: String,
    pub books: Vec<BookRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnualGenre {
    Fiction,
    Nonfiction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualList {
    pub year: String,
    pub genre: AnnualGenre,
    pub items: Vec<BookRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumRef {
    pub artist: String,
    pub album: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeRef {
    pub title: String,
    pub release_date: String,
    pub duration: String,
    pub synopsis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Untagged so plain strings stay plain strings in the served JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TasteItem {
    Episode(EpisodeRef),
    Album(AlbumRef),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TasteList {
    pub title: String,
    pub items: Vec<TasteItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_url: Option<String>,
}

impl TasteList {
    pub fn empty(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
            playlist_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<String>,
    pub distance: String,
    pub duration: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_kj: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSong {
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_name: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl CurrentSong {
    pub fn placeholder(title: &str, artist: &str) -> Self {
        Self {
            title: title.to_owned(),
            artist: artist.to_owned(),
            playlist_name: None,
            fetched_at: Utc::now(),
        }
    }

    pub fn not_connected() -> Self {
        Self::placeholder("Connect Spotify", "Setup needed")
    }

    pub fn unavailable() -> Self {
        Self::placeholder("Spotify unavailable", "")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRef {
    pub title: String,
    pub artist: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotifyStats {
    pub top_artists: Vec<String>,
    pub top_tracks: Vec<TrackRef>,
    pub fetched_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SpotifyStats {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            top_artists: Vec::new(),
            top_tracks: Vec::new(),
            fetched_at: Utc::now(),
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub city: String,
    /// Rounded, in the configured units.
    pub temp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

/// Either a report or `{ "error": ... }`, which is what the site checks for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WeatherInfo {
    Report(WeatherReport),
    Unavailable { error: String },
}

impl WeatherInfo {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            error: message.into(),
        }
    }

    pub fn not_configured() -> Self {
        Self::unavailable("Weather API key missing")
    }

    pub fn failed() -> Self {
        Self::unavailable("Could not fetch weather")
    }
}

/// Last position posted to `/location`; weather is looked up there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteReads {
    pub recent: Vec<BookRecord>,
    pub five_year: Vec<BookRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    Fulfilled,
    Rejected { reason: String },
}

impl SourceStatus {
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteDataDocument {
    pub current_song: CurrentSong,
    pub current_book: BookRecord,
    #[serde(default = "CityRecord::not_configured")]
    pub current_city: CityRecord,
    pub activity_data: Option<ActivitySummary>,
    pub favorite_rappers: TasteList,
    pub music_playlists: Vec<TasteList>,
    pub taste_music_lists: Vec<TasteList>,
    pub podcast_episodes: TasteList,
    pub favorite_reads: FavoriteReads,
    pub annual_reading_lists: Vec<AnnualList>,
    pub this_year_reads: Vec<MonthlyReadGroup>,
    pub spotify_stats: SpotifyStats,
    #[serde(default = "WeatherInfo::not_configured")]
    pub weather_info: WeatherInfo,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub source_status: BTreeMap<String, SourceStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taste_items_serialize_untagged() {
        let list = TasteList {
            title: "favorite albums".to_owned(),
            items: vec![
                TasteItem::Text("mf doom".to_owned()),
                TasteItem::Album(AlbumRef {
                    artist: "pusha t".to_owned(),
                    album: "daytona".to_owned(),
                }),
            ],
            playlist_url: None,
        };

        let value = serde_json::to_value(&list).unwrap();
        assert_eq!(value["items"][0], "mf doom");
        assert_eq!(value["items"][1]["album"], "daytona");
        assert!(value.get("playlistUrl").is_none());

        let back: TasteList = serde_json::from_value(value).unwrap();
        assert_eq!(back, list);
    }

    #[test]
    fn weather_is_a_report_or_an_error_object() {
        let missing = serde_json::to_value(WeatherInfo::not_configured()).unwrap();
        assert_eq!(missing, serde_json::json!({ "error": "Weather API key missing" }));

        let report: WeatherInfo = serde_json::from_value(serde_json::json!({
            "city": "San Francisco",
            "temp": 61,
            "description": "fog",
            "fetchedAt": "2024-03-05T12:00:00Z",
        }))
        .unwrap();
        let WeatherInfo::Report(report) = report else {
            panic!("expected a report");
        };
        assert_eq!(report.temp, 61);
        assert_eq!(report.icon, None);

        let back: WeatherInfo = serde_json::from_value(missing).unwrap();
        assert_eq!(back, WeatherInfo::not_configured());
    }

    #[test]
    fn source_status_carries_marker() {
        let rejected = SourceStatus::Rejected {
            reason: "timeout".to_owned(),
        };
        let value = serde_json::to_value(&rejected).unwrap();
        assert_eq!(value["status"], "rejected");
        assert_eq!(value["reason"], "timeout");
        assert_eq!(
            serde_json::to_value(SourceStatus::Fulfilled).unwrap()["status"],
            "fulfilled"
        );
    }
}
