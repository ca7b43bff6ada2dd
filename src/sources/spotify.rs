use anyhow::Context as _;
use chrono::Utc;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;

use crate::config::SpotifyConfig;
use crate::model::{CurrentSong, EpisodeRef, SpotifyStats, TasteItem, TasteList, TrackRef};
use crate::sources::{endpoint, read_success_body};
use crate::text::{format_date, format_duration, synopsis};

pub const PODCAST_LIST_TITLE: &str = "podcast episodes";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Artist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Track {
    name: String,
    #[serde(default)]
    artists: Vec<Artist>,
}

impl Track {
    fn primary_artist(&self) -> String {
        self.artists
            .first()
            .map(|a| a.name.clone())
            .unwrap_or_default()
    }

    fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    /// Null for removed or local tracks.
    track: Option<Track>,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Default, Deserialize)]
struct ExternalUrls {
    spotify: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Playlist {
    name: String,
    #[serde(default)]
    external_urls: ExternalUrls,
    tracks: Page<PlaylistItem>,
}

#[derive(Debug, Deserialize)]
struct PlaylistName {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Episode {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    release_date: String,
    #[serde(default)]
    duration_ms: u64,
    #[serde(default)]
    external_urls: ExternalUrls,
}

/// Spotify Web API calls made with a refresh-token grant.
pub struct SpotifyClient {
    client: reqwest::Client,
    config: SpotifyConfig,
    token: OnceCell<String>,
}

impl SpotifyClient {
    pub fn new(client: reqwest::Client, config: SpotifyConfig) -> Self {
        Self {
            client,
            config,
            token: OnceCell::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.config.credentials.is_some()
    }

    async fn access_token(&self) -> anyhow::Result<&str> {
        let token = self
            .token
            .get_or_try_init(|| async {
                let credentials = self
                    .config
                    .credentials
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("spotify credentials are not configured"))?;
                let url = endpoint(&self.config.accounts_base_url, "api/token")?;
                let response = self
                    .client
                    .post(url.clone())
                    .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
                    .form(&[
                        ("grant_type", "refresh_token"),
                        ("refresh_token", credentials.refresh_token.as_str()),
                    ])
                    .send()
                    .await
                    .with_context(|| format!("POST {url}"))?;
                let body = read_success_body(response, "spotify token refresh").await?;
                let token: TokenResponse =
                    serde_json::from_str(&body).context("parse spotify token response")?;
                anyhow::Ok(token.access_token)
            })
            .await?;
        Ok(token.as_str())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let token = self.access_token().await.context("get spotify access token")?;
        let url = endpoint(&self.config.api_base_url, path)?;
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(token)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let body = read_success_body(response, "spotify api request").await?;
        serde_json::from_str(&body).with_context(|| format!("parse spotify response: {path}"))
    }

    /// First track of the configured "now playing" playlist.
    pub async fn current_song(&self) -> anyhow::Result<CurrentSong> {
        if !self.is_connected() {
            return Ok(CurrentSong::not_connected());
        }
        let playlist_id = &self.config.current_playlist_id;
        let playlist: PlaylistName = self
            .get(&format!("playlists/{playlist_id}?fields=name"))
            .await
            .context("fetch current playlist")?;
        let first: Page<PlaylistItem> = self
            .get(&format!("playlists/{playlist_id}/tracks?limit=1"))
            .await
            .context("fetch current playlist tracks")?;

        let Some(track) = first.items.into_iter().find_map(|item| item.track) else {
            return Ok(CurrentSong {
                playlist_name: Some(playlist.name),
                ..CurrentSong::placeholder("Playlist empty", "")
            });
        };
        Ok(CurrentSong {
            artist: track.primary_artist(),
            title: track.name,
            playlist_name: Some(playlist.name),
            fetched_at: Utc::now(),
        })
    }

    /// Short-term top artists and tracks for the connected account.
    pub async fn stats(&self) -> anyhow::Result<SpotifyStats> {
        if !self.is_connected() {
            return Ok(SpotifyStats::unavailable("Spotify not connected"));
        }
        let limit = self.config.top_limit;
        let artists: Page<Artist> = self
            .get(&format!("me/top/artists?time_range=short_term&limit={limit}"))
            .await
            .context("fetch top artists")?;
        let tracks: Page<Track> = self
            .get(&format!("me/top/tracks?time_range=short_term&limit={limit}"))
            .await
            .context("fetch top tracks")?;

        Ok(SpotifyStats {
            top_artists: artists
                .items
                .into_iter()
                .map(|a| a.name.to_lowercase())
                .collect(),
            top_tracks: tracks
                .items
                .into_iter()
                .map(|t| TrackRef {
                    artist: t.artist_names().to_lowercase(),
                    title: t.name.to_lowercase(),
                })
                .collect(),
            fetched_at: Utc::now(),
            error: None,
        })
    }

    /// One taste list per configured playlist, in configuration order.
    pub async fn playlists(&self) -> anyhow::Result<Vec<TasteList>> {
        if !self.is_connected() || self.config.playlist_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut lists = Vec::with_capacity(self.config.playlist_ids.len());
        for id in &self.config.playlist_ids {
            let playlist: Playlist = self
                .get(&format!("playlists/{id}"))
                .await
                .with_context(|| format!("fetch playlist {id}"))?;
            let items = playlist
                .tracks
                .items
                .into_iter()
                .filter_map(|item| item.track)
                .take(self.config.playlist_track_limit)
                .map(|t| {
                    TasteItem::Text(format!(
                        "{} by {}",
                        t.name.to_lowercase(),
                        t.artist_names().to_lowercase()
                    ))
                })
                .collect();
            lists.push(TasteList {
                title: playlist.name.to_lowercase(),
                items,
                playlist_url: playlist.external_urls.spotify,
            });
        }
        Ok(lists)
    }

    /// Latest episodes across the configured shows, newest first.
    pub async fn podcast_episodes(&self) -> anyhow::Result<TasteList> {
        if !self.is_connected() || self.config.podcast_show_ids.is_empty() {
            return Ok(TasteList::empty(PODCAST_LIST_TITLE));
        }
        let limit = self.config.podcast_episode_limit;

        let mut episodes: Vec<Episode> = Vec::new();
        for id in &self.config.podcast_show_ids {
            let page: Page<Episode> = self
                .get(&format!("shows/{id}/episodes?limit={limit}"))
                .await
                .with_context(|| format!("fetch episodes for show {id}"))?;
            episodes.extend(page.items);
        }
        // ISO dates order lexically.
        episodes.sort_by(|a, b| b.release_date.cmp(&a.release_date));
        episodes.truncate(limit);

        let items = episodes
            .into_iter()
            .map(|e| {
                TasteItem::Episode(EpisodeRef {
                    title: e.name.to_lowercase(),
                    release_date: format_date(&e.release_date),
                    duration: format_duration(e.duration_ms),
                    synopsis: synopsis(&e.description),
                    url: e.external_urls.spotify,
                })
            })
            .collect();

        Ok(TasteList {
            title: PODCAST_LIST_TITLE.to_owned(),
            items,
            playlist_url: None,
        })
    }
}
