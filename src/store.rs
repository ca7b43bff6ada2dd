use std::path::{Path, PathBuf};

use anyhow::Context as _;
use async_trait::async_trait;
use tokio::fs;

use crate::model::{Location, SiteDataDocument};

/// Holds the most recent site document and the last posted location. Each
/// put replaces the previous value.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn put_latest(&self, document: &SiteDataDocument) -> anyhow::Result<()>;
    async fn latest(&self) -> anyhow::Result<Option<SiteDataDocument>>;
    async fn put_location(&self, location: &Location) -> anyhow::Result<()>;
    async fn location(&self) -> anyhow::Result<Option<Location>>;
}

#[derive(Debug, Clone)]
pub struct LocalFsDocumentStore {
    base_dir: PathBuf,
}

impl LocalFsDocumentStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn latest_json_path(&self) -> PathBuf {
        self.base_dir.join("siteData").join("latest.json")
    }

    fn location_json_path(&self) -> PathBuf {
        self.base_dir.join("config").join("location.json")
    }
}

#[async_trait]
impl DocumentStore for LocalFsDocumentStore {
    async fn put_latest(&self, document: &SiteDataDocument) -> anyhow::Result<()> {
        let path = self.latest_json_path();
        write_json_atomic(&path, document)
            .await
            .with_context(|| format!("write: {}", path.display()))
    }

    async fn latest(&self) -> anyhow::Result<Option<SiteDataDocument>> {
        let path = self.latest_json_path();
        read_json(&path)
            .await
            .with_context(|| format!("read: {}", path.display()))
    }

    async fn put_location(&self, location: &Location) -> anyhow::Result<()> {
        let path = self.location_json_path();
        write_json_atomic(&path, location)
            .await
            .with_context(|| format!("write: {}", path.display()))
    }

    async fn location(&self) -> anyhow::Result<Option<Location>> {
        let path = self.location_json_path();
        read_json(&path)
            .await
            .with_context(|| format!("read: {}", path.display()))
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<Option<T>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    let value = serde_json::from_slice(&bytes).context("parse json")?;
    Ok(Some(value))
}

async fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("path has no parent: {}", path.display()))?;
    fs::create_dir_all(parent)
        .await
        .with_context(|| format!("create parent dir: {}", parent.display()))?;

    let tmp_path = path.with_extension(format!("tmp.{}", uuid::Uuid::new_v4().simple()));
    let data = serde_json::to_vec_pretty(value).context("serialize json")?;
    fs::write(&tmp_path, &data)
        .await
        .with_context(|| format!("write tmp: {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("rename tmp to final: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeMap;

    use chrono::{TimeZone as _, Utc};

    use super::*;
    use crate::model::{
        BookRecord, CityRecord, CurrentSong, FavoriteReads, SpotifyStats, TasteList, WeatherInfo,
    };

    pub(crate) fn sample_document() -> SiteDataDocument {
        SiteDataDocument {
            current_song: CurrentSong::not_connected(),
            current_book: BookRecord::new("Dune", "Frank Herbert"),
            current_city: CityRecord::not_configured(),
            activity_data: None,
            favorite_rappers: TasteList::empty("favorite rappers"),
            music_playlists: Vec::new(),
            taste_music_lists: Vec::new(),
            podcast_episodes: TasteList::empty("podcast episodes"),
            favorite_reads: FavoriteReads::default(),
            annual_reading_lists: Vec::new(),
            this_year_reads: Vec::new(),
            spotify_stats: SpotifyStats::unavailable("Spotify not connected"),
            weather_info: WeatherInfo::not_configured(),
            last_updated: Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap(),
            source_status: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn missing_document_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFsDocumentStore::new(dir.path());
        assert!(store.latest().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_replaces_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFsDocumentStore::new(dir.path());

        let first = sample_document();
        store.put_latest(&first).await.unwrap();

        let mut second = sample_document();
        second.current_book = BookRecord::new("Piranesi", "Susanna Clarke");
        store.put_latest(&second).await.unwrap();

        assert_eq!(store.latest().await.unwrap(), Some(second));

        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("siteData"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("latest.json")]);
    }

    #[tokio::test]
    async fn location_is_kept_apart_from_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFsDocumentStore::new(dir.path());
        assert_eq!(store.location().await.unwrap(), None);

        let location = Location {
            lat: 40.7128,
            lng: -74.006,
            updated_at: Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap(),
        };
        store.put_location(&location).await.unwrap();

        assert_eq!(store.location().await.unwrap(), Some(location));
        assert!(store.latest().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn documents_without_city_or_weather_still_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFsDocumentStore::new(dir.path());
        let mut value = serde_json::to_value(sample_document()).unwrap();
        let object = value.as_object_mut().unwrap();
        object.remove("currentCity");
        object.remove("weatherInfo");
        std::fs::create_dir_all(dir.path().join("siteData")).unwrap();
        std::fs::write(
            dir.path().join("siteData/latest.json"),
            serde_json::to_vec(&value).unwrap(),
        )
        .unwrap();

        let loaded = store.latest().await.unwrap().unwrap();
        assert_eq!(loaded.current_city, CityRecord::not_configured());
        assert_eq!(loaded.weather_info, WeatherInfo::not_configured());
    }

    #[tokio::test]
    async fn corrupt_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("siteData")).unwrap();
        std::fs::write(dir.path().join("siteData/latest.json"), b"{not json").unwrap();

        let store = LocalFsDocumentStore::new(dir.path());
        let err = store.latest().await.unwrap_err();
        assert!(format!("{err:#}").contains("parse json"));
    }
}
