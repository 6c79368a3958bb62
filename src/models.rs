use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CatalogError;

/// Which catalog an item belongs to. Items themselves carry no kind flag.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    #[serde(rename = "book")]
    Book,
    #[serde(rename = "movie")]
    Movie,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Book => write!(f, "book"),
            MediaKind::Movie => write!(f, "movie"),
        }
    }
}

impl FromStr for MediaKind {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "book" | "books" => Ok(MediaKind::Book),
            "movie" | "movies" | "film" => Ok(MediaKind::Movie),
            other => Err(CatalogError::InvalidField {
                field: "kind",
                reason: format!("unknown media kind '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "inProgress")]
    InProgress,
    #[serde(rename = "planned")]
    Planned,
    #[serde(rename = "fails")]
    Fails,
    #[serde(rename = "allTime")]
    AllTime,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Completed,
        Category::InProgress,
        Category::Planned,
        Category::Fails,
        Category::AllTime,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::Completed => "completed",
            Category::InProgress => "inProgress",
            Category::Planned => "planned",
            Category::Fails => "fails",
            Category::AllTime => "allTime",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Category::Completed => 0,
            Category::InProgress => 1,
            Category::Planned => 2,
            Category::Fails => 3,
            Category::AllTime => 4,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CatalogError::UnknownCategory(s.to_string()))
    }
}

/// Medium an item was consumed in. Books use the first three, movies the rest.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "audio")]
    Audio,
    #[serde(rename = "ebook")]
    Ebook,
    #[serde(rename = "streaming")]
    Streaming,
    #[serde(rename = "theater")]
    Theater,
    #[serde(rename = "bluray")]
    BluRay,
    #[serde(rename = "dvd")]
    Dvd,
}

impl Format {
    pub const ALL: [Format; 7] = [
        Format::Text,
        Format::Audio,
        Format::Ebook,
        Format::Streaming,
        Format::Theater,
        Format::BluRay,
        Format::Dvd,
    ];

    /// Human label used in the export text.
    pub fn label(self) -> &'static str {
        match self {
            Format::Text => "Hardcopy",
            Format::Audio => "Audiobook",
            Format::Ebook => "E-book",
            Format::Streaming => "Streaming",
            Format::Theater => "Theater",
            Format::BluRay => "Blu-ray",
            Format::Dvd => "DVD",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Format::Text => "text",
            Format::Audio => "audio",
            Format::Ebook => "ebook",
            Format::Streaming => "streaming",
            Format::Theater => "theater",
            Format::BluRay => "bluray",
            Format::Dvd => "dvd",
        }
    }

    pub fn applies_to(self, kind: MediaKind) -> bool {
        match self {
            Format::Text | Format::Audio | Format::Ebook => kind == MediaKind::Book,
            _ => kind == MediaKind::Movie,
        }
    }

    /// Loose lookup used by the import parser and the CLI: accepts keys,
    /// export labels and common spellings ("Blu-ray", "audiobook", "theatre").
    pub fn from_token(token: &str) -> Option<Format> {
        let norm: String = token
            .chars()
            .filter(|c| !matches!(c, '-' | ' ' | '_'))
            .collect::<String>()
            .to_lowercase();
        match norm.as_str() {
            "hardcopy" | "text" | "hardcover" | "paperback" | "print" => Some(Format::Text),
            "audio" | "audiobook" => Some(Format::Audio),
            "ebook" | "kindle" => Some(Format::Ebook),
            "streaming" | "stream" => Some(Format::Streaming),
            "theater" | "theatre" | "cinema" => Some(Format::Theater),
            "bluray" => Some(Format::BluRay),
            "dvd" => Some(Format::Dvd),
            _ => None,
        }
    }
}

/// A tracked book or movie as held by a catalog bucket.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: u64,
    pub title: String,
    pub author: String,
    pub year: Option<i32>,
    pub category: Category,
    pub rating: Option<u8>,
    pub format: Option<Format>,
    pub percentage: Option<u8>,
    pub notes: Option<String>,
    pub source: Option<String>,
    pub completed_date: Option<String>,
    pub date_started: Option<String>,
    pub date_added: Option<String>,
    pub date_abandoned: Option<String>,
    #[serde(default)]
    pub is_all_time: bool,
}

impl Item {
    pub(crate) fn same_work(&self, title: &str, author: &str) -> bool {
        self.title.trim().to_lowercase() == title.trim().to_lowercase()
            && self.author.trim().to_lowercase() == author.trim().to_lowercase()
    }

    /// Year the item was finished, taken from `completed_date`.
    pub fn completion_year(&self) -> Option<i32> {
        self.completed_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse().ok())
    }

    /// Turns the stored item back into an editable draft.
    pub fn to_draft(&self) -> ItemDraft {
        ItemDraft {
            title: self.title.clone(),
            author: self.author.clone(),
            year: self.year,
            category: Some(self.category),
            rating: self.rating,
            format: self.format,
            percentage: self.percentage,
            notes: self.notes.clone(),
            source: self.source.clone(),
            completed_date: self.completed_date.clone(),
            date_started: self.date_started.clone(),
            date_added: self.date_added.clone(),
            date_abandoned: self.date_abandoned.clone(),
            is_all_time: self.is_all_time,
        }
    }
}

/// Input shape for add/update/import. Everything but title and author may be
/// left out and is defaulted by the store.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub format: Option<Format>,
    #[serde(default)]
    pub percentage: Option<u8>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub completed_date: Option<String>,
    #[serde(default)]
    pub date_started: Option<String>,
    #[serde(default)]
    pub date_added: Option<String>,
    #[serde(default)]
    pub date_abandoned: Option<String>,
    #[serde(default)]
    pub is_all_time: bool,
}

impl ItemDraft {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            ..Default::default()
        }
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn rating(mut self, rating: u8) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn all_time(mut self, is_all_time: bool) -> Self {
        self.is_all_time = is_all_time;
        self
    }
}

/// Yearly consumption targets.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Goals {
    pub book_goal: u32,
    pub movie_goal: u32,
}

impl Default for Goals {
    fn default() -> Self {
        Goals {
            book_goal: 50,
            movie_goal: 50,
        }
    }
}

impl Goals {
    pub fn for_kind(&self, kind: MediaKind) -> u32 {
        match kind {
            MediaKind::Book => self.book_goal,
            MediaKind::Movie => self.movie_goal,
        }
    }
}
