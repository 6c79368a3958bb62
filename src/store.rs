//! The catalog store: both catalogs, the yearly goals and the notifier.
//!
//! All mutation goes through [`Library`]. A mutation either commits fully
//! (primary bucket move and all-time mirror together) and publishes exactly
//! one [`Change`](crate::notify::Change), or is rejected with a
//! [`CatalogError`], logged, and leaves state untouched.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{CatalogError, CatalogResult};
use crate::models::{Category, Goals, Item, ItemDraft, MediaKind};
use crate::notify::{ChangeKind, ChangeNotifier, Subscription};
use crate::parser::Candidate;
use crate::settings::Settings;

/// Persisted state of a library.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct LibraryData {
    #[serde(default)]
    pub books: Catalog,
    #[serde(default)]
    pub movies: Catalog,
    #[serde(default)]
    pub goals: Goals,
}

/// Outcome of a bulk import.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub added: Vec<(MediaKind, Item)>,
    pub skipped: Vec<(ItemDraft, CatalogError)>,
}

impl ImportReport {
    pub fn added_count(&self) -> usize {
        self.added.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

pub struct Library {
    data: LibraryData,
    notifier: ChangeNotifier,
    clock: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

impl Library {
    pub fn new() -> Self {
        Self::from_data(LibraryData::default())
    }

    pub fn from_data(data: LibraryData) -> Self {
        Library {
            data,
            notifier: ChangeNotifier::new(),
            clock: local_today,
        }
    }

    /// Replaces the source of "today" used for date defaults.
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    pub fn data(&self) -> &LibraryData {
        &self.data
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    pub fn catalog(&self, kind: MediaKind) -> &Catalog {
        match kind {
            MediaKind::Book => &self.data.books,
            MediaKind::Movie => &self.data.movies,
        }
    }

    fn catalog_mut(&mut self, kind: MediaKind) -> &mut Catalog {
        match kind {
            MediaKind::Book => &mut self.data.books,
            MediaKind::Movie => &mut self.data.movies,
        }
    }

    pub fn items(&self, kind: MediaKind, category: Category) -> &[Item] {
        self.catalog(kind).bucket(category)
    }

    pub fn get(&self, kind: MediaKind, id: u64) -> Option<&Item> {
        self.catalog(kind).get(id)
    }

    pub fn goals(&self) -> Goals {
        self.data.goals
    }

    pub fn version(&self) -> u64 {
        self.notifier.version()
    }

    pub fn subscribe(&self) -> Subscription {
        self.notifier.subscribe()
    }

    pub fn add(&mut self, kind: MediaKind, draft: ItemDraft) -> CatalogResult<Item> {
        let today = self.today();
        match self.catalog_mut(kind).insert(&draft, today) {
            Ok(item) => {
                log::debug!("Added {} {} \"{}\" to {}", kind, item.id, item.title, item.category);
                self.notifier.publish(ChangeKind::Added {
                    media: kind,
                    id: item.id,
                });
                Ok(item)
            }
            Err(e) => Err(rejected("add", kind, e)),
        }
    }

    /// Same as [`add`](Self::add) but takes the category by name.
    pub fn add_to(&mut self, kind: MediaKind, category: &str, draft: ItemDraft) -> CatalogResult<Item> {
        let category = category.parse::<Category>().map_err(|e| rejected("add", kind, e))?;
        self.add(kind, ItemDraft {
            category: Some(category),
            ..draft
        })
    }

    pub fn update(&mut self, kind: MediaKind, id: u64, draft: ItemDraft) -> CatalogResult<Item> {
        let today = self.today();
        match self.catalog_mut(kind).replace(id, &draft, today) {
            Ok(item) => {
                log::debug!("Updated {} {} in {}", kind, id, item.category);
                self.notifier.publish(ChangeKind::Updated { media: kind, id });
                Ok(item)
            }
            Err(e) => Err(rejected("update", kind, e)),
        }
    }

    pub fn delete(&mut self, kind: MediaKind, id: u64, category: Category) -> CatalogResult<Item> {
        match self.catalog_mut(kind).remove(id, category) {
            Ok(item) => {
                log::debug!("Deleted {} {} from {}", kind, id, category);
                self.notifier.publish(ChangeKind::Deleted { media: kind, id });
                Ok(item)
            }
            Err(e) => Err(rejected("delete", kind, e)),
        }
    }

    /// Moves one entry within a bucket. Equal indices commit nothing and
    /// publish nothing.
    pub fn reorder(
        &mut self,
        kind: MediaKind,
        category: Category,
        from: usize,
        to: usize,
    ) -> CatalogResult<()> {
        match self.catalog_mut(kind).move_within(category, from, to) {
            Ok(true) => {
                self.notifier.publish(ChangeKind::Reordered {
                    media: kind,
                    category,
                });
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(e) => Err(rejected("reorder", kind, e)),
        }
    }

    pub fn set_goal(&mut self, kind: MediaKind, value: u32) {
        match kind {
            MediaKind::Book => self.data.goals.book_goal = value,
            MediaKind::Movie => self.data.goals.movie_goal = value,
        }
        log::debug!("{} goal set to {}", kind, value);
        self.notifier.publish(ChangeKind::GoalChanged { media: kind, value });
    }

    /// Adds each draft with [`add`](Self::add) semantics. Rejected drafts are
    /// collected in the report instead of stopping the import.
    pub fn bulk_import(&mut self, kind: MediaKind, drafts: Vec<ItemDraft>) -> ImportReport {
        let mut report = ImportReport::default();
        for draft in drafts {
            match self.add(kind, draft.clone()) {
                Ok(item) => report.added.push((kind, item)),
                Err(e) => report.skipped.push((draft, e)),
            }
        }
        log::info!(
            "Imported {} {}(s), skipped {}",
            report.added_count(),
            kind,
            report.skipped_count()
        );
        report
    }

    /// Commits reviewed parser candidates, routing each to its catalog.
    /// Settings fill in format/source the candidate did not carry.
    pub fn import_candidates<I>(&mut self, candidates: I, settings: &Settings) -> ImportReport
    where
        I: IntoIterator<Item = Candidate>,
    {
        let mut report = ImportReport::default();
        for candidate in candidates {
            let kind = candidate.kind();
            let draft = settings.apply_defaults(kind, candidate.into_draft());
            match self.add(kind, draft.clone()) {
                Ok(item) => report.added.push((kind, item)),
                Err(e) => report.skipped.push((draft, e)),
            }
        }
        log::info!(
            "Imported {} candidate(s), skipped {}",
            report.added_count(),
            report.skipped_count()
        );
        report
    }

    /// Plain-text report of the full library.
    pub fn export_text(&self) -> String {
        crate::export::export_text(self, Local::now().naive_local())
    }
}

fn rejected(op: &str, kind: MediaKind, err: CatalogError) -> CatalogError {
    log::warn!("Rejected {} on {} catalog: {}", op, kind, err);
    err
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
