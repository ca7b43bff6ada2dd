//! Positional extraction of typed records from tokenized sheet rows.
//!
//! Nothing here fails: missing rows end a scan, missing cells read as `""`.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use chrono::{Datelike as _, NaiveDate};

use crate::model::{
    AlbumRef, AnnualGenre, AnnualList, BookRecord, CityRecord, FavoriteReads, MonthlyReadGroup,
    TasteItem, TasteList,
};
use crate::sheet::csv::Row;
use crate::sheet::layout::{
    self, AnnualSchema, CitiesLayout, FavoritesLayout, ReadingLayout, SchemaRegistry,
};
use crate::text::format::{month_name, resolve_month};

pub const IN_PROGRESS_STATUSES: &[&str] = &["In progress"];

pub const COMPLETED_STATUSES: &[&str] = &["Completed", "completed", "complete", "✓", "done"];

fn rows_in(rows: &[Row], range: RangeInclusive<usize>) -> impl Iterator<Item = &Row> {
    let (start, end) = range.into_inner();
    rows.iter().skip(start).take((end + 1).saturating_sub(start))
}

fn reading_record(row: &Row, layout: &ReadingLayout) -> BookRecord {
    BookRecord {
        title: row.get(layout.title).to_owned(),
        author: row.get(layout.author).to_owned(),
        rating: row.get(layout.rating).to_owned(),
        summary: String::new(),
        genre: row.get(layout.genre).to_owned(),
        month: resolve_month(row.get(layout.month))
            .and_then(month_name)
            .unwrap_or_default()
            .to_owned(),
    }
}

/// First row in `range` whose status cell is an in-progress status.
fn first_in_progress(rows: &[Row], range: RangeInclusive<usize>, status: usize) -> Option<&Row> {
    rows_in(rows, range).find(|row| IN_PROGRESS_STATUSES.contains(&row.get(status)))
}

/// First in-progress row of the reading tab, or [`BookRecord::not_found`].
pub fn current_book(rows: &[Row], layout: &ReadingLayout) -> BookRecord {
    first_in_progress(rows, layout.rows.clone(), layout.status)
        .map(|row| reading_record(row, layout))
        .unwrap_or_else(BookRecord::not_found)
}

/// First in-progress row of the places tab, or [`CityRecord::not_found`].
pub fn current_city(rows: &[Row], layout: &CitiesLayout) -> CityRecord {
    first_in_progress(rows, layout.rows.clone(), layout.status)
        .filter(|row| !row.get(layout.city).is_empty())
        .map(|row| CityRecord::new(row.get(layout.city), row.get(layout.country)))
        .unwrap_or_else(CityRecord::not_found)
}

/// Completed books grouped by month, most recent month first relative to
/// `today`, and most recently entered book first within a month.
pub fn this_year_reads(
    rows: &[Row],
    layout: &ReadingLayout,
    today: NaiveDate,
) -> Vec<MonthlyReadGroup> {
    let mut by_month: BTreeMap<u32, Vec<BookRecord>> = BTreeMap::new();

    for (index, row) in rows_in(rows, layout.rows.clone()).enumerate() {
        if !COMPLETED_STATUSES.contains(&row.get(layout.status)) {
            continue;
        }
        let Some(month) = resolve_month(row.get(layout.month)) else {
            tracing::debug!(index, month = row.get(layout.month), "completed read without month");
            continue;
        };
        let record = reading_record(row, layout);
        if record.title.is_empty() || record.month.is_empty() {
            continue;
        }
        by_month.entry(month).or_default().push(record);
    }

    let current = today.month();
    let mut groups: Vec<(u32, Vec<BookRecord>)> = by_month.into_iter().collect();
    groups.sort_by_key(|(month, _)| (current + 12 - month) % 12);

    groups
        .into_iter()
        .filter_map(|(month, mut books)| {
            books.reverse();
            Some(MonthlyReadGroup {
                month: month_name(month)?.to_owned(),
                books,
            })
        })
        .collect()
}

fn favorite_record(row: &Row, layout: &FavoritesLayout) -> BookRecord {
    BookRecord {
        title: row.get(layout.title).to_owned(),
        author: row.get(layout.author).to_owned(),
        summary: row.get(layout.summary).to_owned(),
        genre: row.get(layout.genre).to_owned(),
        ..BookRecord::default()
    }
}

/// Reads favorites until the first row with an empty title.
pub fn favorites_until_gap(rows: &[Row], layout: &FavoritesLayout) -> Vec<BookRecord> {
    rows_in(rows, layout.rows.clone())
        .take_while(|row| !row.get(layout.title).is_empty())
        .map(|row| favorite_record(row, layout))
        .collect()
}

pub fn favorite_reads(rows: &[Row]) -> FavoriteReads {
    FavoriteReads {
        recent: favorites_until_gap(rows, &layout::RECENT_FAVORITES),
        five_year: favorites_until_gap(rows, &layout::FIVE_YEAR_FAVORITES),
    }
}

pub const FAVORITE_RAPPERS_TITLE: &str = "favorite rappers";

pub fn favorite_rappers(rows: &[Row]) -> TasteList {
    let items = rows_in(rows, layout::TASTE_ROWS)
        .map(|row| row.get(layout::RAPPER_COLUMN))
        .filter(|name| !name.is_empty())
        .map(|name| TasteItem::Text(name.to_lowercase()))
        .collect();
    TasteList {
        title: FAVORITE_RAPPERS_TITLE.to_owned(),
        items,
        playlist_url: None,
    }
}

/// Album and song blocks of the taste tab.
pub fn taste_music_lists(rows: &[Row]) -> Vec<TasteList> {
    let albums = rows_in(rows, layout::TASTE_ROWS)
        .filter_map(|row| {
            let artist = row.get(layout::ALBUM_ARTIST_COLUMN);
            let album = row.get(layout::ALBUM_TITLE_COLUMN);
            (!artist.is_empty() && !album.is_empty()).then(|| {
                TasteItem::Album(AlbumRef {
                    artist: artist.to_lowercase(),
                    album: album.to_lowercase(),
                })
            })
        })
        .collect::<Vec<_>>();

    let songs = rows_in(rows, layout::TASTE_ROWS)
        .filter_map(|row| {
            let title = row.get(layout::SONG_TITLE_COLUMN);
            let artist = row.get(layout::SONG_ARTIST_COLUMN);
            match (title.is_empty(), artist.is_empty()) {
                (true, _) => None,
                (false, true) => Some(TasteItem::Text(title.to_lowercase())),
                (false, false) => Some(TasteItem::Text(format!(
                    "{} by {}",
                    title.to_lowercase(),
                    artist.to_lowercase()
                ))),
            }
        })
        .collect::<Vec<_>>();

    [("favorite albums", albums), ("favorite songs", songs)]
        .into_iter()
        .filter(|(_, items)| !items.is_empty())
        .map(|(title, items)| TasteList {
            title: title.to_owned(),
            items,
            playlist_url: None,
        })
        .collect()
}

/// Fiction and nonfiction lists for one year's tab.
pub fn annual_lists(rows: &[Row], year: &str, schema: AnnualSchema) -> Vec<AnnualList> {
    let cols = schema.columns();

    let mut records: Vec<(Option<u32>, BookRecord)> = rows_in(rows, layout::ANNUAL_ROWS)
        .filter_map(|row| {
            let month_raw = cols.month.map(|c| row.get(c)).unwrap_or("");
            let record = BookRecord {
                title: row.get(cols.title).to_owned(),
                author: row.get(cols.author).to_owned(),
                rating: row.get(cols.rating).to_owned(),
                summary: String::new(),
                genre: row.get(cols.genre).to_owned(),
                month: resolve_month(month_raw)
                    .and_then(month_name)
                    .unwrap_or_default()
                    .to_owned(),
            };
            let complete = !record.title.is_empty()
                && !record.author.is_empty()
                && !record.rating.is_empty()
                && !record.genre.is_empty();
            complete.then(|| (resolve_month(month_raw), record))
        })
        .collect();

    if cols.month.is_some() {
        // Stable: rows sharing a month keep sheet order; unknown months last.
        records.sort_by(|(a, _), (b, _)| b.cmp(a));
    }

    let mut fiction = Vec::new();
    let mut nonfiction = Vec::new();
    for (_, record) in records {
        match record.genre.trim().to_lowercase().as_str() {
            "fiction" => fiction.push(record),
            "non-fiction" => nonfiction.push(record),
            other => tracing::debug!(
                year,
                genre = other,
                title = %record.title,
                "dropping read with unlisted genre"
            ),
        }
    }

    [(AnnualGenre::Fiction, fiction), (AnnualGenre::Nonfiction, nonfiction)]
        .into_iter()
        .filter(|(_, items)| !items.is_empty())
        .map(|(genre, items)| AnnualList {
            year: year.to_owned(),
            genre,
            items,
        })
        .collect()
}

/// Annual lists for several years, newest year first.
pub fn annual_reading_lists<'a>(
    sheets: impl IntoIterator<Item = (&'a str, &'a [Row])>,
    registry: &SchemaRegistry,
) -> Vec<AnnualList> {
    let mut sheets: Vec<(&str, &[Row])> = sheets.into_iter().collect();
    sheets.sort_by(|(a, _), (b, _)| b.cmp(a));
    sheets
        .into_iter()
        .flat_map(|(year, rows)| annual_lists(rows, year, registry.schema_for(year)))
        .collect()
}
