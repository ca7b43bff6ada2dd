//! Fixed row/column positions of every spreadsheet category.
//!
//! Rows are 0-based after the header row and ranges are inclusive.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Reading tab: one row per book started this year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingLayout {
    pub rows: RangeInclusive<usize>,
    pub status: usize,
    pub title: usize,
    pub author: usize,
    pub month: usize,
    pub rating: usize,
    pub genre: usize,
}

pub const READING_MAX_COLUMNS: usize = 6;

pub const THIS_YEAR: ReadingLayout = ReadingLayout {
    rows: 0..=199,
    status: 0,
    title: 1,
    author: 2,
    month: 3,
    rating: 4,
    genre: 5,
};

/// Places tab: one row per city lived in, the current one marked in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitiesLayout {
    pub rows: RangeInclusive<usize>,
    pub status: usize,
    pub city: usize,
    pub country: usize,
}

pub const CITIES_MAX_COLUMNS: usize = 3;

pub const CITIES: CitiesLayout = CitiesLayout {
    rows: 0..=99,
    status: 0,
    city: 1,
    country: 2,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoritesLayout {
    pub rows: RangeInclusive<usize>,
    pub title: usize,
    pub author: usize,
    pub summary: usize,
    pub genre: usize,
}

pub const FAVORITES_MAX_COLUMNS: usize = 4;

pub const RECENT_FAVORITES: FavoritesLayout = FavoritesLayout {
    rows: 0..=9,
    title: 0,
    author: 1,
    summary: 2,
    genre: 3,
};

pub const FIVE_YEAR_FAVORITES: FavoritesLayout = FavoritesLayout {
    rows: 12..=36,
    title: 0,
    author: 1,
    summary: 2,
    genre: 3,
};

/// Taste tab: three side-by-side blocks sharing the same rows.
pub const TASTE_ROWS: RangeInclusive<usize> = 0..=29;
pub const TASTE_MAX_COLUMNS: usize = 7;
pub const RAPPER_COLUMN: usize = 0;
pub const ALBUM_ARTIST_COLUMN: usize = 2;
pub const ALBUM_TITLE_COLUMN: usize = 3;
pub const SONG_TITLE_COLUMN: usize = 5;
pub const SONG_ARTIST_COLUMN: usize = 6;

pub const ANNUAL_ROWS: RangeInclusive<usize> = 0..=299;

/// Column layouts observed across the yearly reading tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnualSchema {
    /// year, month, rating, title, author, genre
    FullDated,
    /// month, rating, title, author, genre
    Monthly,
    /// rating, title, author, genre
    RatingFirst,
    /// title, author, genre, rating
    TitleFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnualColumns {
    pub month: Option<usize>,
    pub rating: usize,
    pub title: usize,
    pub author: usize,
    pub genre: usize,
}

impl AnnualSchema {
    pub const fn columns(self) -> AnnualColumns {
        match self {
            Self::FullDated => AnnualColumns {
                month: Some(1),
                rating: 2,
                title: 3,
                author: 4,
                genre: 5,
            },
            Self::Monthly => AnnualColumns {
                month: Some(0),
                rating: 1,
                title: 2,
                author: 3,
                genre: 4,
            },
            Self::RatingFirst => AnnualColumns {
                month: None,
                rating: 0,
                title: 1,
                author: 2,
                genre: 3,
            },
            Self::TitleFirst => AnnualColumns {
                month: None,
                title: 0,
                author: 1,
                genre: 2,
                rating: 3,
            },
        }
    }

    pub const fn max_columns(self) -> usize {
        match self {
            Self::FullDated => 6,
            Self::Monthly => 5,
            Self::RatingFirst | Self::TitleFirst => 4,
        }
    }
}

/// Year to schema lookup with an explicit fallback for unknown years.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRegistry {
    by_year: BTreeMap<String, AnnualSchema>,
    fallback: AnnualSchema,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        let by_year = [
            ("2025", AnnualSchema::FullDated),
            ("2024", AnnualSchema::FullDated),
            ("2023", AnnualSchema::Monthly),
            ("2022", AnnualSchema::RatingFirst),
            ("2021", AnnualSchema::TitleFirst),
            ("2020", AnnualSchema::TitleFirst),
        ]
        .into_iter()
        .map(|(year, schema)| (year.to_owned(), schema))
        .collect();

        Self {
            by_year,
            fallback: AnnualSchema::FullDated,
        }
    }
}

impl SchemaRegistry {
    pub fn register(&mut self, year: impl Into<String>, schema: AnnualSchema) {
        self.by_year.insert(year.into(), schema);
    }

    pub fn schema_for(&self, year: &str) -> AnnualSchema {
        match self.by_year.get(year.trim()) {
            Some(schema) => *schema,
            None => {
                tracing::warn!(
                    year,
                    fallback = ?self.fallback,
                    "no annual schema registered for year; using fallback layout"
                );
                self.fallback
            }
        }
    }
}
