//! One fetch cycle: run every source concurrently, keep whatever settles,
//! and persist the merged document.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context as _;
use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::cli::FetchArgs;
use crate::config::Config;
use crate::model::{
    BookRecord, CityRecord, CurrentSong, SiteDataDocument, SourceStatus, SpotifyStats, TasteList,
    WeatherInfo,
};
use crate::sheet::extract::FAVORITE_RAPPERS_TITLE;
use crate::sources::spotify::PODCAST_LIST_TITLE;
use crate::sources::{HttpSources, SiteSources};
use crate::store::{DocumentStore, LocalFsDocumentStore};

macro_rules! spawn_source {
    ($sources:expr, $method:ident) => {{
        let sources = Arc::clone(&$sources);
        tokio::spawn(async move { sources.$method().await })
    }};
}

/// Waits for one source and records how it settled.
async fn settle<T>(
    name: &str,
    handle: JoinHandle<anyhow::Result<T>>,
    statuses: &mut BTreeMap<String, SourceStatus>,
) -> Result<T, String> {
    let outcome = match handle.await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(format!("{err:#}")),
        Err(join_err) => Err(format!("source task failed: {join_err}")),
    };

    let status = match &outcome {
        Ok(_) => SourceStatus::Fulfilled,
        Err(reason) => {
            tracing::warn!(source = name, reason = %reason, "source rejected; using fallback");
            SourceStatus::Rejected {
                reason: reason.clone(),
            }
        }
    };
    statuses.insert(name.to_owned(), status);
    outcome
}

/// Runs every source at once and merges the results. Never fails: a
/// rejected source contributes its fallback value and a rejected marker.
pub async fn collect(sources: Arc<dyn SiteSources>) -> SiteDataDocument {
    let current_song = spawn_source!(sources, current_song);
    let spotify_stats = spawn_source!(sources, spotify_stats);
    let current_book = spawn_source!(sources, current_book);
    let current_city = spawn_source!(sources, current_city);
    let weather = spawn_source!(sources, weather);
    let activity = spawn_source!(sources, activity);
    let favorite_rappers = spawn_source!(sources, favorite_rappers);
    let music_playlists = spawn_source!(sources, music_playlists);
    let taste_music_lists = spawn_source!(sources, taste_music_lists);
    let podcast_episodes = spawn_source!(sources, podcast_episodes);
    let favorite_reads = spawn_source!(sources, favorite_reads);
    let annual_reading_lists = spawn_source!(sources, annual_reading_lists);
    let this_year_reads = spawn_source!(sources, this_year_reads);

    let mut statuses = BTreeMap::new();
    let s = &mut statuses;

    let document = SiteDataDocument {
        current_song: settle("currentSong", current_song, s)
            .await
            .unwrap_or_else(|_| CurrentSong::unavailable()),
        spotify_stats: settle("spotifyStats", spotify_stats, s)
            .await
            .unwrap_or_else(|reason| SpotifyStats::unavailable(reason)),
        current_book: settle("currentBook", current_book, s)
            .await
            .unwrap_or_else(|reason| BookRecord::error(reason)),
        current_city: settle("currentCity", current_city, s)
            .await
            .unwrap_or_else(|reason| CityRecord::error(reason)),
        activity_data: settle("activityData", activity, s)
            .await
            .unwrap_or_default(),
        favorite_rappers: settle("favoriteRappers", favorite_rappers, s)
            .await
            .unwrap_or_else(|_| TasteList::empty(FAVORITE_RAPPERS_TITLE)),
        music_playlists: settle("musicPlaylists", music_playlists, s)
            .await
            .unwrap_or_default(),
        taste_music_lists: settle("tasteMusicLists", taste_music_lists, s)
            .await
            .unwrap_or_default(),
        podcast_episodes: settle("podcastEpisodes", podcast_episodes, s)
            .await
            .unwrap_or_else(|_| TasteList::empty(PODCAST_LIST_TITLE)),
        favorite_reads: settle("favoriteReads", favorite_reads, s)
            .await
            .unwrap_or_default(),
        annual_reading_lists: settle("annualReadingLists", annual_reading_lists, s)
            .await
            .unwrap_or_default(),
        this_year_reads: settle("thisYearReads", this_year_reads, s)
            .await
            .unwrap_or_default(),
        weather_info: settle("weatherInfo", weather, s)
            .await
            .unwrap_or_else(|_| WeatherInfo::failed()),
        last_updated: Utc::now(),
        source_status: BTreeMap::new(),
    };

    SiteDataDocument {
        source_status: statuses,
        ..document
    }
}

/// Serializes fetch cycles so the scheduler and manual refreshes never
/// write the store at the same time.
pub struct Refresher {
    make_sources: Box<dyn Fn() -> Arc<dyn SiteSources> + Send + Sync>,
    store: Arc<dyn DocumentStore>,
    running: Mutex<()>,
}

impl Refresher {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        make_sources: impl Fn() -> Arc<dyn SiteSources> + Send + Sync + 'static,
    ) -> Self {
        Self {
            make_sources: Box::new(make_sources),
            store,
            running: Mutex::new(()),
        }
    }

    /// Live sources built fresh for every cycle, reading the posted
    /// location from `store`.
    pub fn from_config(
        store: Arc<dyn DocumentStore>,
        config: Config,
        client: reqwest::Client,
    ) -> Self {
        let location_store = Arc::clone(&store);
        Self::new(store, move || {
            Arc::new(
                HttpSources::new(config.clone(), client.clone())
                    .with_store(Arc::clone(&location_store)),
            ) as Arc<dyn SiteSources>
        })
    }

    pub async fn refresh(&self) -> anyhow::Result<SiteDataDocument> {
        let _guard = self.running.lock().await;
        let started = std::time::Instant::now();

        let document = collect((self.make_sources)()).await;
        self.store
            .put_latest(&document)
            .await
            .context("store site data")?;

        let rejected = document
            .source_status
            .values()
            .filter(|status| !status.is_fulfilled())
            .count();
        tracing::info!(
            sources = document.source_status.len(),
            rejected,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "site data refreshed"
        );
        Ok(document)
    }
}

/// `homepage fetch`: one cycle against the live sources.
pub async fn run(args: FetchArgs) -> anyhow::Result<()> {
    let config = Config::load(args.config.as_deref()).context("load config")?;
    let store: Arc<dyn DocumentStore> = Arc::new(LocalFsDocumentStore::new(&args.data_dir));
    let refresher = Refresher::from_config(store, config, reqwest::Client::new());

    let document = refresher.refresh().await?;
    for (source, status) in &document.source_status {
        if let SourceStatus::Rejected { reason } = status {
            eprintln!("warning: {source} failed: {reason}");
        }
    }
    println!(
        "stored site data in {} ({})",
        args.data_dir.display(),
        document.last_updated.to_rfc3339()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::Context as _;
    use async_trait::async_trait;

    use super::*;
    use crate::model::{
        ActivitySummary, AnnualList, FavoriteReads, MonthlyReadGroup, TasteItem, WeatherReport,
    };

    struct StubSources {
        outage: bool,
        panic_song: bool,
    }

    const OK: StubSources = StubSources {
        outage: false,
        panic_song: false,
    };

    #[async_trait]
    impl SiteSources for StubSources {
        async fn current_song(&self) -> anyhow::Result<CurrentSong> {
            if self.panic_song {
                panic!("boom");
            }
            Ok(CurrentSong::placeholder("Nights", "Frank Ocean"))
        }
        async fn spotify_stats(&self) -> anyhow::Result<SpotifyStats> {
            anyhow::bail!("401 Unauthorized")
        }
        async fn current_book(&self) -> anyhow::Result<BookRecord> {
            if self.outage {
                Err(anyhow::anyhow!("connection refused")).context("fetch reading sheet")
            } else {
                Ok(BookRecord::new("Dune", "Frank Herbert"))
            }
        }
        async fn current_city(&self) -> anyhow::Result<CityRecord> {
            Ok(CityRecord::new("San Francisco", "USA"))
        }
        async fn weather(&self) -> anyhow::Result<WeatherInfo> {
            if self.outage {
                anyhow::bail!("openweathermap request failed (401 Unauthorized)")
            }
            Ok(WeatherInfo::Report(WeatherReport {
                city: "San Francisco".to_owned(),
                temp: 61,
                description: Some("fog".to_owned()),
                icon: None,
                fetched_at: Utc::now(),
            }))
        }
        async fn activity(&self) -> anyhow::Result<Option<ActivitySummary>> {
            Ok(None)
        }
        async fn favorite_rappers(&self) -> anyhow::Result<TasteList> {
            Ok(TasteList {
                title: FAVORITE_RAPPERS_TITLE.to_owned(),
                items: vec![TasteItem::Text("mf doom".to_owned())],
                playlist_url: None,
            })
        }
        async fn music_playlists(&self) -> anyhow::Result<Vec<TasteList>> {
            Ok(Vec::new())
        }
        async fn taste_music_lists(&self) -> anyhow::Result<Vec<TasteList>> {
            Ok(Vec::new())
        }
        async fn podcast_episodes(&self) -> anyhow::Result<TasteList> {
            Ok(TasteList::empty(PODCAST_LIST_TITLE))
        }
        async fn favorite_reads(&self) -> anyhow::Result<FavoriteReads> {
            Ok(FavoriteReads::default())
        }
        async fn annual_reading_lists(&self) -> anyhow::Result<Vec<AnnualList>> {
            Ok(Vec::new())
        }
        async fn this_year_reads(&self) -> anyhow::Result<Vec<MonthlyReadGroup>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn failed_source_uses_fallback_and_others_survive() {
        let document = collect(Arc::new(StubSources {
            outage: true,
            panic_song: false,
        }))
        .await;

        assert_eq!(document.current_book.title, "Error loading book");
        assert!(document.current_book.author.contains("connection refused"));
        assert_eq!(document.current_song.title, "Nights");
        assert_eq!(document.favorite_rappers.items.len(), 1);

        assert!(matches!(
            document.source_status.get("currentBook"),
            Some(SourceStatus::Rejected { reason }) if reason.contains("fetch reading sheet")
        ));
        assert_eq!(
            document.source_status.get("favoriteRappers"),
            Some(&SourceStatus::Fulfilled)
        );
        assert_eq!(document.source_status.len(), 13);

        assert_eq!(document.weather_info, WeatherInfo::failed());
        assert!(matches!(
            document.source_status.get("weatherInfo"),
            Some(SourceStatus::Rejected { reason }) if reason.contains("401")
        ));
        assert_eq!(document.current_city.city, "San Francisco");
    }

    #[tokio::test]
    async fn panicking_source_is_rejected_not_propagated() {
        let document = collect(Arc::new(StubSources {
            outage: false,
            panic_song: true,
        }))
        .await;

        assert_eq!(document.current_song.title, "Spotify unavailable");
        assert!(!document.source_status["currentSong"].is_fulfilled());
        assert_eq!(document.current_book.title, "Dune");
        assert_eq!(document.spotify_stats.error.as_deref(), Some("401 Unauthorized"));
    }

    #[tokio::test]
    async fn refresh_persists_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn DocumentStore> = Arc::new(LocalFsDocumentStore::new(dir.path()));
        let refresher =
            Refresher::new(Arc::clone(&store), || Arc::new(OK) as Arc<dyn SiteSources>);

        let document = refresher.refresh().await.unwrap();
        assert!(document.source_status["weatherInfo"].is_fulfilled());
        assert!(matches!(document.weather_info, WeatherInfo::Report(ref r) if r.temp == 61));
        assert_eq!(store.latest().await.unwrap(), Some(document));
    }
}
