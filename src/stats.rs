//! Derived numbers shown in the export overview.

use std::collections::BTreeMap;

use crate::catalog::Catalog;
use crate::models::{Category, Format, MediaKind};
use crate::store::Library;

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogStats {
    pub kind: MediaKind,
    /// Distinct items, all-time mirrors not counted.
    pub total: usize,
    /// Bucket sizes indexed like [`Category::ALL`].
    pub bucket_sizes: [usize; 5],
    pub completed_this_year: usize,
    pub goal: u32,
    pub goal_percent: u32,
    pub average_rating: Option<f32>,
    pub rated: usize,
    pub formats: Vec<(Format, usize)>,
}

impl CatalogStats {
    fn compute(kind: MediaKind, catalog: &Catalog, goal: u32, year: i32) -> Self {
        let mut bucket_sizes = [0; 5];
        for (slot, category) in bucket_sizes.iter_mut().zip(Category::ALL) {
            *slot = catalog.bucket(category).len();
        }

        let completed_this_year = catalog
            .bucket(Category::Completed)
            .iter()
            .filter(|i| i.completion_year() == Some(year))
            .count();
        let goal_percent = if goal == 0 {
            0
        } else {
            (completed_this_year as u64 * 100 / goal as u64) as u32
        };

        let ratings: Vec<u8> = catalog.items().filter_map(|i| i.rating).collect();
        let average_rating = if ratings.is_empty() {
            None
        } else {
            Some(ratings.iter().map(|r| *r as f32).sum::<f32>() / ratings.len() as f32)
        };

        let formats = Format::ALL
            .iter()
            .map(|f| (*f, catalog.items().filter(|i| i.format == Some(*f)).count()))
            .filter(|(_, n)| *n > 0)
            .collect();

        CatalogStats {
            kind,
            total: catalog.len(),
            bucket_sizes,
            completed_this_year,
            goal,
            goal_percent,
            average_rating,
            rated: ratings.len(),
            formats,
        }
    }

    pub fn bucket_size(&self, category: Category) -> usize {
        self.bucket_sizes[category.index()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LibraryStats {
    pub year: i32,
    pub books: CatalogStats,
    pub movies: CatalogStats,
    /// Completion year -> (books, movies).
    pub yearly: BTreeMap<i32, (usize, usize)>,
}

impl LibraryStats {
    pub fn compute(library: &Library, year: i32) -> Self {
        let goals = library.goals();
        let books = library.catalog(MediaKind::Book);
        let movies = library.catalog(MediaKind::Movie);

        let mut yearly: BTreeMap<i32, (usize, usize)> = BTreeMap::new();
        for item in books.bucket(Category::Completed) {
            if let Some(y) = item.completion_year() {
                yearly.entry(y).or_default().0 += 1;
            }
        }
        for item in movies.bucket(Category::Completed) {
            if let Some(y) = item.completion_year() {
                yearly.entry(y).or_default().1 += 1;
            }
        }

        LibraryStats {
            year,
            books: CatalogStats::compute(MediaKind::Book, books, goals.book_goal, year),
            movies: CatalogStats::compute(MediaKind::Movie, movies, goals.movie_goal, year),
            yearly,
        }
    }
}
