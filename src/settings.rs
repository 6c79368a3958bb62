use serde::{Deserialize, Serialize};

use crate::models::{Format, ItemDraft, MediaKind};

/// Prefill values for new items, persisted next to the library.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub default_book_format: Option<Format>,
    #[serde(default)]
    pub default_movie_format: Option<Format>,
    #[serde(default)]
    pub default_book_source: Option<String>,
    #[serde(default)]
    pub default_movie_source: Option<String>,
}

impl Settings {
    pub fn default_format(&self, kind: MediaKind) -> Option<Format> {
        let format = match kind {
            MediaKind::Book => self.default_book_format,
            MediaKind::Movie => self.default_movie_format,
        };
        // A movie format configured as the book default is ignored.
        format.filter(|f| f.applies_to(kind))
    }

    pub fn default_source(&self, kind: MediaKind) -> Option<&str> {
        match kind {
            MediaKind::Book => self.default_book_source.as_deref(),
            MediaKind::Movie => self.default_movie_source.as_deref(),
        }
        .filter(|s| !s.trim().is_empty())
    }

    /// Fills format and source the draft left empty.
    pub fn apply_defaults(&self, kind: MediaKind, mut draft: ItemDraft) -> ItemDraft {
        if draft.format.is_none() {
            draft.format = self.default_format(kind);
        }
        if draft.source.is_none() {
            draft.source = self.default_source(kind).map(str::to_string);
        }
        draft
    }
}
