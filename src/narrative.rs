//! The sentence the homepage shows, rendered from a stored document.

use std::sync::Arc;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cli::{ShowArgs, WorkoutArgs};
use crate::model::{BookRecord, CurrentSong, SiteDataDocument, WeatherInfo};
use crate::store::{DocumentStore, LocalFsDocumentStore};
use crate::text::{WorkoutInput, describe_workout, format_time_since};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Narrative {
    pub song: String,
    pub book: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workout: Option<String>,
    /// `"61°, fog in san francisco"`; absent when weather is unavailable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
    pub last_updated: String,
}

impl Narrative {
    pub fn sentence(&self) -> String {
        let mut sentence = format!("listening to {}, reading {}", self.song, self.book);
        if let Some(workout) = &self.workout {
            sentence.push_str(&format!(", and most recently did a {workout}"));
        }
        sentence.push_str(&format!(". last updated {}.", self.last_updated));
        sentence
    }
}

fn by_line(title: &str, creator: &str) -> String {
    let title = title.trim().to_lowercase();
    let creator = creator.trim().to_lowercase();
    if creator.is_empty() {
        title
    } else {
        format!("{title} by {creator}")
    }
}

fn song_line(song: &CurrentSong) -> String {
    by_line(&song.title, &song.artist)
}

fn book_line(book: &BookRecord) -> String {
    by_line(&book.title, &book.author)
}

fn weather_line(weather: &WeatherInfo) -> Option<String> {
    let WeatherInfo::Report(report) = weather else {
        return None;
    };
    let city = report.city.trim().to_lowercase();
    let line = match report.description.as_deref().map(str::trim) {
        Some(description) if !description.is_empty() => {
            format!("{}°, {} in {city}", report.temp, description.to_lowercase())
        }
        _ => format!("{}° in {city}", report.temp),
    };
    Some(line)
}

/// Workout descriptions are derived here rather than stored, so heuristic
/// changes apply to documents already on disk.
pub fn render(document: &SiteDataDocument, now: DateTime<Utc>) -> Narrative {
    let workout = document.activity_data.as_ref().map(|activity| {
        let description = describe_workout(&WorkoutInput::from(activity));
        if activity.date.is_empty() {
            description
        } else {
            format!("{description} on {}", activity.date)
        }
    });

    Narrative {
        song: song_line(&document.current_song),
        book: book_line(&document.current_book),
        workout,
        weather: weather_line(&document.weather_info),
        last_updated: format_time_since(document.last_updated, now),
    }
}

/// `homepage show`: prints the stored document, or its narrative.
pub async fn show(args: ShowArgs) -> anyhow::Result<()> {
    let store: Arc<dyn DocumentStore> = Arc::new(LocalFsDocumentStore::new(&args.data_dir));
    let document = store
        .latest()
        .await
        .context("load site data")?
        .ok_or_else(|| anyhow::anyhow!("No site data found in {}", args.data_dir.display()))?;

    if args.narrative {
        println!("{}", render(&document, Utc::now()).sentence());
    } else {
        let json = serde_json::to_string_pretty(&document).context("serialize site data")?;
        println!("{json}");
    }
    Ok(())
}

/// `homepage workout`: prints the description inferred for one activity.
pub fn workout(args: WorkoutArgs) -> anyhow::Result<()> {
    let input = WorkoutInput {
        name: &args.name,
        activity_type: args.activity_type.as_deref(),
        distance: args.distance.as_deref().unwrap_or_default(),
        duration: args.duration.as_deref().unwrap_or_default(),
        output_kj: args.output_kj,
    };
    println!("{}", describe_workout(&input));
    Ok(())
}
