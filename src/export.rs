//! Plain-text export of the whole library.
//!
//! Field order on item lines matters: the import parser reads the same
//! layout back.

use chrono::{Datelike, NaiveDateTime};
use std::fmt::Write;

use crate::models::{Category, Item, MediaKind};
use crate::stats::{CatalogStats, LibraryStats};
use crate::store::Library;

const HEAVY_RULE: &str = "══════════════════════════════════════════════════";
const LIGHT_RULE: &str = "──────────────────────────────────────────────────";

fn section_title(kind: MediaKind, category: Category) -> &'static str {
    match (kind, category) {
        (MediaKind::Book, Category::Completed) => "✅ COMPLETED BOOKS",
        (MediaKind::Movie, Category::Completed) => "✅ COMPLETED MOVIES",
        (MediaKind::Book, Category::InProgress) => "📖 CURRENTLY READING",
        (MediaKind::Movie, Category::InProgress) => "🍿 CURRENTLY WATCHING",
        (MediaKind::Book, Category::Planned) => "📋 WANT TO READ",
        (MediaKind::Movie, Category::Planned) => "📋 WANT TO WATCH",
        (_, Category::Fails) => "❌ DID NOT FINISH",
        (_, Category::AllTime) => "🏆 ALL-TIME FAVORITES",
    }
}

fn kind_banner(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Book => "📚 BOOKS",
        MediaKind::Movie => "🎬 MOVIES",
    }
}

/// One item line, optional fields appended in a fixed order.
pub fn item_line(position: usize, item: &Item) -> String {
    let mut line = format!("{}. \"{}\" by {}", position, item.title, item.author);
    if let Some(year) = item.year {
        let _ = write!(line, " ({})", year);
    }
    if let Some(format) = item.format {
        let _ = write!(line, " [{}]", format.label());
    }
    if let Some(rating) = item.rating {
        let _ = write!(line, " ⭐ {}/5 stars", rating);
    }
    if let Some(pct) = item.percentage {
        let _ = write!(line, " ({}% complete)", pct);
    }
    let dated = match item.category {
        Category::Completed => item.completed_date.as_deref().map(|d| ("Completed", d)),
        Category::InProgress => item.date_started.as_deref().map(|d| ("Started", d)),
        Category::Fails => item.date_abandoned.as_deref().map(|d| ("Abandoned", d)),
        Category::Planned => item.date_added.as_deref().map(|d| ("Added", d)),
        Category::AllTime => None,
    };
    if let Some((label, date)) = dated {
        let _ = write!(line, " - {}: {}", label, date);
    }
    if let Some(source) = &item.source {
        let _ = write!(line, " - Source: {}", source);
    }
    if item.is_all_time {
        line.push_str(" 🏆 ALL-TIME FAVORITE");
    }
    if let Some(notes) = &item.notes {
        let _ = write!(line, "\n   Notes: \"{}\"", notes);
    }
    line
}

/// Bucket contents in export order. Completed items are listed most recent
/// first; every other bucket keeps its display order.
fn export_order(library: &Library, kind: MediaKind, category: Category) -> Vec<&Item> {
    let mut items: Vec<&Item> = library.items(kind, category).iter().collect();
    if category == Category::Completed {
        items.sort_by(|a, b| b.completed_date.cmp(&a.completed_date));
    }
    items
}

fn write_overview(out: &mut String, stats: &LibraryStats) {
    let _ = writeln!(out, "📊 OVERVIEW & STATISTICS");
    let _ = writeln!(out, "{}", LIGHT_RULE);
    let _ = writeln!(
        out,
        "Total items: {} ({} books, {} movies)",
        stats.books.total + stats.movies.total,
        stats.books.total,
        stats.movies.total
    );
    for s in [&stats.books, &stats.movies] {
        let noun = match s.kind {
            MediaKind::Book => "Book",
            MediaKind::Movie => "Movie",
        };
        let _ = writeln!(
            out,
            "{} goal {}: {}/{} completed ({}%)",
            noun, stats.year, s.completed_this_year, s.goal, s.goal_percent
        );
    }
    for s in [&stats.books, &stats.movies] {
        write_bucket_counts(out, s);
    }
    for s in [&stats.books, &stats.movies] {
        let noun = match s.kind {
            MediaKind::Book => "book",
            MediaKind::Movie => "movie",
        };
        if let Some(avg) = s.average_rating {
            let _ = writeln!(out, "Average {} rating: {:.1}/5 ({} rated)", noun, avg, s.rated);
        }
        if !s.formats.is_empty() {
            let parts: Vec<String> = s
                .formats
                .iter()
                .map(|(f, n)| format!("{} {}", f.label(), n))
                .collect();
            let title = if s.kind == MediaKind::Book { "Book" } else { "Movie" };
            let _ = writeln!(out, "{} formats: {}", title, parts.join(", "));
        }
    }
}

fn write_bucket_counts(out: &mut String, s: &CatalogStats) {
    let label = match s.kind {
        MediaKind::Book => "Books",
        MediaKind::Movie => "Movies",
    };
    let _ = writeln!(
        out,
        "{}: {} completed, {} in progress, {} planned, {} did not finish, {} all-time favorites",
        label,
        s.bucket_size(Category::Completed),
        s.bucket_size(Category::InProgress),
        s.bucket_size(Category::Planned),
        s.bucket_size(Category::Fails),
        s.bucket_size(Category::AllTime),
    );
}

fn write_catalog(out: &mut String, library: &Library, kind: MediaKind) {
    let _ = writeln!(out, "{}", kind_banner(kind));
    let _ = writeln!(out, "{}", HEAVY_RULE);
    for category in Category::ALL {
        let items = export_order(library, kind, category);
        let _ = writeln!(out, "{} ({})", section_title(kind, category), items.len());
        let _ = writeln!(out, "{}", LIGHT_RULE);
        if items.is_empty() {
            let _ = writeln!(out, "(none)");
        }
        for (n, item) in items.iter().enumerate() {
            let _ = writeln!(out, "{}", item_line(n + 1, item));
        }
        out.push('\n');
    }
}

/// Full report for `library` as of `now`. Same state and time give the same text.
pub fn export_text(library: &Library, now: NaiveDateTime) -> String {
    let stats = LibraryStats::compute(library, now.year());
    let mut out = String::new();

    let _ = writeln!(out, "📚🎬 MY COMPLETE READING & WATCHING LIST");
    let _ = writeln!(out, "{}", HEAVY_RULE);
    let _ = writeln!(out, "Generated: {}", now.format("%A, %B %-d, %Y at %H:%M"));
    out.push('\n');

    write_overview(&mut out, &stats);
    out.push('\n');

    write_catalog(&mut out, library, MediaKind::Book);
    write_catalog(&mut out, library, MediaKind::Movie);

    let _ = writeln!(out, "📅 YEARLY BREAKDOWN (by completion date)");
    let _ = writeln!(out, "{}", LIGHT_RULE);
    for (year, (books, movies)) in stats.yearly.iter().rev() {
        let _ = writeln!(
            out,
            "{}: {} total ({} books, {} movies)",
            year,
            books + movies,
            books,
            movies
        );
    }
    let _ = writeln!(out, "{}", HEAVY_RULE);
    let _ = write!(out, "End of Export - Generated by FiftyList App");
    out
}
