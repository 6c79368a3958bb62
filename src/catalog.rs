//! One categorized collection (books or movies).
//!
//! Buckets keep display order. Every item lives in exactly one primary
//! bucket, tracked by `index`; items flagged all-time whose primary bucket is
//! not `allTime` also have a value copy there.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Category, Item, ItemDraft};

pub const ISO_DATE: &str = "%Y-%m-%d";

/// Serialized shape of a catalog. The id index is derived and never stored.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CatalogData {
    #[serde(default)]
    pub buckets: BTreeMap<Category, Vec<Item>>,
    #[serde(default)]
    pub next_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "CatalogData", into = "CatalogData")]
pub struct Catalog {
    buckets: [Vec<Item>; 5],
    index: HashMap<u64, Category>,
    next_id: u64,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Catalog {
            buckets: Default::default(),
            index: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn bucket(&self, category: Category) -> &[Item] {
        &self.buckets[category.index()]
    }

    fn bucket_mut(&mut self, category: Category) -> &mut Vec<Item> {
        &mut self.buckets[category.index()]
    }

    /// Primary copy of the item with `id`.
    pub fn get(&self, id: u64) -> Option<&Item> {
        let category = *self.index.get(&id)?;
        self.bucket(category).iter().find(|i| i.id == id)
    }

    pub fn primary_category(&self, id: u64) -> Option<Category> {
        self.index.get(&id).copied()
    }

    /// Every item once, in bucket order, skipping all-time mirrors.
    pub fn items(&self) -> impl Iterator<Item = &Item> + '_ {
        Category::ALL
            .iter()
            .flat_map(move |c| self.bucket(*c).iter().filter(move |i| i.category == *c))
    }

    /// Number of distinct items (mirrors not counted).
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains_duplicate(
        &self,
        category: Category,
        title: &str,
        author: &str,
        except: Option<u64>,
    ) -> bool {
        self.bucket(category)
            .iter()
            .any(|i| Some(i.id) != except && i.same_work(title, author))
    }

    /// Rejects `draft` if its work already sits in the target bucket, or in
    /// `allTime` when the draft would be mirrored there.
    fn check_unique(&self, category: Category, draft: &ItemDraft, except: Option<u64>) -> CatalogResult<()> {
        let mirrored = draft.is_all_time && category != Category::AllTime;
        let clash = [Some(category), mirrored.then_some(Category::AllTime)]
            .into_iter()
            .flatten()
            .find(|c| self.contains_duplicate(*c, &draft.title, &draft.author, except));
        match clash {
            Some(category) => Err(CatalogError::Duplicate {
                title: draft.title.trim().to_string(),
                author: draft.author.trim().to_string(),
                category,
            }),
            None => Ok(()),
        }
    }

    fn issue_id(&mut self) -> u64 {
        let mut id = self.next_id.max(1);
        while self.index.contains_key(&id) {
            id += 1;
        }
        self.next_id = id + 1;
        id
    }

    /// Creates a new item from `draft` with a fresh id.
    pub fn insert(&mut self, draft: &ItemDraft, today: NaiveDate) -> CatalogResult<Item> {
        let category = draft.category.unwrap_or(Category::Planned);
        self.check_unique(category, draft, None)?;
        // Validate before an id is consumed.
        let mut item = build_item(0, draft, today)?;
        item.id = self.issue_id();

        self.bucket_mut(item.category).push(item.clone());
        self.index.insert(item.id, item.category);
        self.sync_mirror(&item);
        Ok(item)
    }

    /// Replaces the item with `id`, moving it between buckets when the
    /// category changes and reconciling the all-time mirror in the same step.
    pub fn replace(&mut self, id: u64, draft: &ItemDraft, today: NaiveDate) -> CatalogResult<Item> {
        let previous = self.primary_category(id).ok_or(CatalogError::UnknownId(id))?;
        let category = draft.category.unwrap_or(previous);
        self.check_unique(category, draft, Some(id))?;
        let mut draft = draft.clone();
        draft.category = Some(category);
        let item = build_item(id, &draft, today)?;

        let position = self.bucket(previous).iter().position(|i| i.id == id);
        for bucket in self.buckets.iter_mut() {
            bucket.retain(|i| i.id != id);
        }
        match position {
            Some(pos) if previous == category => {
                let bucket = self.bucket_mut(category);
                let pos = pos.min(bucket.len());
                bucket.insert(pos, item.clone());
            }
            _ => self.bucket_mut(category).push(item.clone()),
        }
        self.index.insert(id, category);
        self.sync_mirror(&item);
        Ok(item)
    }

    /// Removes `id` from every bucket. `category` must hold the item, either
    /// as its primary bucket or as its all-time mirror.
    pub fn remove(&mut self, id: u64, category: Category) -> CatalogResult<Item> {
        if !self.bucket(category).iter().any(|i| i.id == id) {
            return Err(CatalogError::NotFound { id, category });
        }
        let removed = self.get(id).cloned();
        for bucket in self.buckets.iter_mut() {
            bucket.retain(|i| i.id != id);
        }
        self.index.remove(&id);
        removed.ok_or(CatalogError::NotFound { id, category })
    }

    /// Moves the element at `from` to `to`, shifting the others.
    /// Returns `Ok(false)` when nothing moved.
    pub fn move_within(&mut self, category: Category, from: usize, to: usize) -> CatalogResult<bool> {
        let bucket = self.bucket_mut(category);
        let len = bucket.len();
        if from >= len || to >= len {
            return Err(CatalogError::IndexOutOfRange {
                category,
                from,
                to,
                len,
            });
        }
        if from == to {
            return Ok(false);
        }
        let item = bucket.remove(from);
        bucket.insert(to, item);
        Ok(true)
    }

    /// Inserts, replaces or drops the all-time copy of `item`.
    fn sync_mirror(&mut self, item: &Item) {
        if item.category == Category::AllTime {
            return;
        }
        let all_time = self.bucket_mut(Category::AllTime);
        let existing = all_time.iter().position(|i| i.id == item.id);
        match (item.is_all_time, existing) {
            (true, Some(pos)) => all_time[pos] = item.clone(),
            (true, None) => all_time.push(item.clone()),
            (false, Some(pos)) => {
                all_time.remove(pos);
            }
            (false, None) => {}
        }
    }
}

impl From<CatalogData> for Catalog {
    fn from(data: CatalogData) -> Self {
        let mut catalog = Catalog::new();
        let mut mirrored = HashSet::new();

        // BTreeMap order visits allTime last, after every primary is indexed.
        for (category, items) in data.buckets {
            for mut item in items {
                if category == Category::AllTime && item.category != Category::AllTime {
                    // Stored mirror: keep its position, take the primary's value.
                    let primary = catalog.get(item.id).filter(|p| p.is_all_time).cloned();
                    if let Some(primary) = primary {
                        if mirrored.insert(primary.id) {
                            catalog.bucket_mut(Category::AllTime).push(primary);
                        }
                    }
                    continue;
                }
                item.category = category;
                if catalog.index.contains_key(&item.id) {
                    log::warn!("Dropping stored item with repeated id {}", item.id);
                    continue;
                }
                normalize(&mut item);
                catalog.index.insert(item.id, category);
                catalog.bucket_mut(category).push(item);
            }
        }

        let missing: Vec<Item> = catalog
            .items()
            .filter(|i| i.is_all_time && i.category != Category::AllTime)
            .filter(|i| !mirrored.contains(&i.id))
            .cloned()
            .collect();
        catalog.bucket_mut(Category::AllTime).extend(missing);

        let max_id = catalog.index.keys().copied().max().unwrap_or(0);
        catalog.next_id = data.next_id.max(max_id + 1);
        catalog
    }
}

impl From<Catalog> for CatalogData {
    fn from(catalog: Catalog) -> Self {
        let buckets = Category::ALL
            .iter()
            .map(|c| (*c, catalog.bucket(*c).to_vec()))
            .collect();
        CatalogData {
            buckets,
            next_id: catalog.next_id,
        }
    }
}

fn today_string(today: NaiveDate) -> String {
    today.format(ISO_DATE).to_string()
}

fn validate(draft: &ItemDraft) -> CatalogResult<()> {
    if draft.title.trim().is_empty() {
        return Err(CatalogError::InvalidField {
            field: "title",
            reason: "must not be empty".to_string(),
        });
    }
    if draft.author.trim().is_empty() {
        return Err(CatalogError::InvalidField {
            field: "author",
            reason: "must not be empty".to_string(),
        });
    }
    if let Some(rating) = draft.rating {
        if rating > 5 {
            return Err(CatalogError::InvalidField {
                field: "rating",
                reason: format!("{} is outside 0-5", rating),
            });
        }
    }
    if let Some(pct) = draft.percentage {
        if pct > 100 {
            return Err(CatalogError::InvalidField {
                field: "percentage",
                reason: format!("{} is outside 0-100", pct),
            });
        }
    }
    Ok(())
}

/// Applies category-dependent defaults to a draft and produces the stored item.
fn build_item(id: u64, draft: &ItemDraft, today: NaiveDate) -> CatalogResult<Item> {
    validate(draft)?;
    let category = draft.category.unwrap_or(Category::Planned);

    let mut item = Item {
        id,
        title: draft.title.trim().to_string(),
        author: draft.author.trim().to_string(),
        year: draft.year,
        category,
        rating: draft.rating,
        format: draft.format,
        percentage: draft.percentage,
        notes: draft.notes.clone().filter(|n| !n.trim().is_empty()),
        source: draft.source.clone().filter(|s| !s.trim().is_empty()),
        completed_date: draft.completed_date.clone(),
        date_started: draft.date_started.clone(),
        date_added: draft
            .date_added
            .clone()
            .or_else(|| Some(today_string(today))),
        date_abandoned: draft.date_abandoned.clone(),
        is_all_time: draft.is_all_time,
    };

    match category {
        Category::Completed => {
            item.completed_date.get_or_insert_with(|| today_string(today));
        }
        Category::InProgress => {
            item.percentage.get_or_insert(0);
            item.date_started.get_or_insert_with(|| today_string(today));
        }
        Category::Fails => {
            item.date_abandoned.get_or_insert_with(|| today_string(today));
        }
        Category::Planned | Category::AllTime => {}
    }
    normalize(&mut item);
    Ok(item)
}

/// Invariants every stored item satisfies regardless of how it got here.
fn normalize(item: &mut Item) {
    if item.category == Category::Completed {
        item.percentage = Some(100);
    }
    if item.category == Category::AllTime {
        item.is_all_time = true;
    }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
