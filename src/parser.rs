//! Heuristic import of pasted lists.
//!
//! Input is read line by line with two pieces of carried state: the current
//! category (starts at `completed`) and the current media type (starts
//! unknown). Every line is classified by an ordered rule list:
//!
//! 1. header rules ([`HEADER_RULES`]), first match wins
//! 2. `Notes:` continuation of the previous item
//! 3. export boilerplate
//! 4. item line, split by the first matching [`ExtractionPattern`]
//!
//! The parser never fails. Lines it cannot make sense of become
//! low-confidence candidates, or are dropped when no usable title remains.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::iter::Peekable;
use std::str::Lines;

use crate::models::{Category, Format, ItemDraft, MediaKind};

pub const UNKNOWN_AUTHOR: &str = "Unknown";

const BASE_CONFIDENCE: f32 = 0.5;
const AUTHOR_BONUS: f32 = 0.3;
const FIELD_BONUS: f32 = 0.1;

/// A parsed, unconfirmed item awaiting review.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// 1-based line number in the pasted text.
    pub line: usize,
    pub title: String,
    pub author: String,
    pub year: Option<i32>,
    pub rating: Option<u8>,
    pub format: Option<Format>,
    pub notes: Option<String>,
    pub source: Option<String>,
    pub percentage: Option<u8>,
    pub completed_date: Option<String>,
    pub date_started: Option<String>,
    pub date_added: Option<String>,
    pub date_abandoned: Option<String>,
    pub category: Category,
    pub is_book: bool,
    pub is_all_time: bool,
    pub confidence: f32,
}

impl Candidate {
    pub fn kind(&self) -> MediaKind {
        if self.is_book {
            MediaKind::Book
        } else {
            MediaKind::Movie
        }
    }

    pub fn into_draft(self) -> ItemDraft {
        ItemDraft {
            title: self.title,
            author: self.author,
            year: self.year,
            category: Some(self.category),
            rating: self.rating,
            format: self.format,
            percentage: self.percentage,
            notes: self.notes,
            source: self.source,
            completed_date: self.completed_date,
            date_started: self.date_started,
            date_added: self.date_added,
            date_abandoned: self.date_abandoned,
            is_all_time: self.is_all_time || self.category == Category::AllTime,
        }
    }
}

/// State carried from one line to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseState {
    pub category: Category,
    pub media: Option<MediaKind>,
}

impl Default for ParseState {
    fn default() -> Self {
        ParseState {
            category: Category::Completed,
            media: None,
        }
    }
}

// --- Header rules ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MediaHint {
    Book,
    Movie,
    /// Pick the type from words in the header, keep the current one otherwise.
    Infer,
}

pub struct HeaderRule {
    pub name: &'static str,
    category: Option<Category>,
    media: MediaHint,
    /// Every pattern must match the line.
    requires: Vec<Regex>,
}

impl HeaderRule {
    fn new(
        name: &'static str,
        category: Option<Category>,
        media: MediaHint,
        keyword_sets: &[&[&str]],
    ) -> Self {
        HeaderRule {
            name,
            category,
            media,
            requires: keyword_sets.iter().map(|set| keyword_regex(set)).collect(),
        }
    }

    pub fn matches(&self, line: &str) -> bool {
        self.requires.iter().all(|re| re.is_match(line))
    }

    fn apply(&self, line: &str, state: &mut ParseState) {
        if let Some(category) = self.category {
            state.category = category;
        }
        match self.media {
            MediaHint::Book => state.media = Some(MediaKind::Book),
            MediaHint::Movie => state.media = Some(MediaKind::Movie),
            MediaHint::Infer => {
                let book = BOOK_HINT.is_match(line);
                let movie = MOVIE_HINT.is_match(line);
                if book && !movie {
                    state.media = Some(MediaKind::Book);
                } else if movie && !book {
                    state.media = Some(MediaKind::Movie);
                }
            }
        }
    }
}

/// Case-insensitive alternation; alphanumeric edges get word boundaries so
/// "read" does not fire on "ready".
fn keyword_regex(words: &[&str]) -> Regex {
    let alternatives: Vec<String> = words
        .iter()
        .map(|word| {
            let mut pattern = regex::escape(word);
            if word.chars().next().is_some_and(char::is_alphanumeric) {
                pattern = format!(r"\b{}", pattern);
            }
            if word.chars().last().is_some_and(char::is_alphanumeric) {
                pattern.push_str(r"\b");
            }
            pattern
        })
        .collect();
    Regex::new(&format!("(?i)(?:{})", alternatives.join("|"))).expect("keyword pattern")
}

const FINISHED_WORDS: &[&str] = &["completed", "finished", "done", "✅"];
const BOOK_WORDS: &[&str] = &["book", "books", "read", "reading", "📚", "📖"];
const MOVIE_WORDS: &[&str] = &[
    "movie", "movies", "film", "films", "watch", "watched", "watching", "🎬", "🍿",
];

static BOOK_HINT: Lazy<Regex> = Lazy::new(|| keyword_regex(BOOK_WORDS));
static MOVIE_HINT: Lazy<Regex> = Lazy::new(|| keyword_regex(MOVIE_WORDS));

/// Header rules in priority order.
pub static HEADER_RULES: Lazy<Vec<HeaderRule>> = Lazy::new(|| {
    vec![
        HeaderRule::new(
            "completed-books",
            Some(Category::Completed),
            MediaHint::Book,
            &[FINISHED_WORDS, BOOK_WORDS],
        ),
        HeaderRule::new(
            "completed-movies",
            Some(Category::Completed),
            MediaHint::Movie,
            &[&["completed", "finished", "done", "watched", "seen", "✅"], MOVIE_WORDS],
        ),
        HeaderRule::new(
            "in-progress",
            Some(Category::InProgress),
            MediaHint::Infer,
            &[&["currently", "in progress", "ongoing", "reading now", "watching now", "📖", "🍿"]],
        ),
        HeaderRule::new(
            "planned",
            Some(Category::Planned),
            MediaHint::Infer,
            &[&[
                "want to", "planned", "plan to", "to read", "to watch", "to-read", "tbr",
                "watchlist", "wishlist", "up next", "📋",
            ]],
        ),
        HeaderRule::new(
            "fails",
            Some(Category::Fails),
            MediaHint::Infer,
            &[&["did not finish", "didn't finish", "dnf", "abandoned", "gave up", "unfinished", "❌"]],
        ),
        HeaderRule::new(
            "all-time",
            Some(Category::AllTime),
            MediaHint::Infer,
            &[&["all-time", "all time", "favorites", "favourites", "🏆"]],
        ),
        HeaderRule::new("books-section", None, MediaHint::Book, &[&["books", "reading list", "📚"]]),
        HeaderRule::new("movies-section", None, MediaHint::Movie, &[&["movies", "films", "🎬"]]),
    ]
});

static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d{1,3}[.)]\s+|\d{1,3}\s+|[-*•·]\s+)").expect("marker pattern"));

/// Signals that a line describes an item rather than a section title.
static ITEM_SIGNAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)["“”]|\sby\s|\s[-–—]\s|\(\d{4}\)|\d\s*/\s*5|:\s*\d"#).expect("item signal pattern")
});

fn is_header_like(line: &str) -> bool {
    line.chars().count() <= 80 && !LIST_MARKER.is_match(line) && !ITEM_SIGNAL.is_match(line)
}

static HEADER_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\(\d{4}\)\s*$").expect("header year pattern"));

/// First header rule matching `line`, if the line reads like a header.
/// Category headers may end in a year, as in "Finished books (2023)".
pub fn match_header(line: &str) -> Option<&'static HeaderRule> {
    if is_header_like(line) {
        return HEADER_RULES.iter().find(|rule| rule.matches(line));
    }
    let bare = HEADER_YEAR.replace(line, "");
    if bare.len() == line.len() || bare.trim().is_empty() || !is_header_like(&bare) {
        return None;
    }
    HEADER_RULES
        .iter()
        .find(|rule| rule.category.is_some() && rule.matches(&bare))
}

// --- Boilerplate ---

const BOILERPLATE_WORDS: &[&str] = &[
    "generated",
    "export",
    "overview",
    "statistics",
    "breakdown",
    "reading & watching list",
];

const STATS_PREFIXES: &[&str] = &[
    "total items",
    "books:",
    "movies:",
    "book goal",
    "movie goal",
    "average book rating",
    "average movie rating",
    "book formats",
    "movie formats",
];

static YEARLY_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}:\s*\d+\s+total").expect("yearly pattern"));

pub fn is_boilerplate(line: &str) -> bool {
    let lower = line.to_lowercase();
    if BOILERPLATE_WORDS.iter().any(|w| lower.contains(w)) {
        return true;
    }
    if line
        .chars()
        .any(|c| matches!(c, '═' | '─' | '━' | '│' | '┃' | '╔' | '╗' | '╚' | '╝' | '║'))
    {
        return true;
    }
    if line.chars().all(|c| matches!(c, '=' | '-' | '*' | '_' | '~' | ' ')) {
        return true;
    }
    STATS_PREFIXES.iter().any(|p| lower.starts_with(p)) || YEARLY_LINE.is_match(line)
}

// --- Extraction patterns ---

/// Title/author layouts, tried in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionPattern {
    /// `"Title" by Author`
    QuotedBy,
    /// `Title - Author`
    Dash,
    /// `Title, Author`
    Comma,
    /// `Title by Author`
    BareBy,
}

const AUTHOR_TAIL: &str = r#"(?P<author>[^(\[⭐★🏆,]+?)(?:\s*[(\[⭐★🏆,]|\s+[-–—]\s|\s*$)"#;

static QUOTED_BY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r#"^["“'‘](?P<title>.+?)["”'’]\s+(?i:by)\s+{}"#, AUTHOR_TAIL))
        .expect("quoted-by pattern")
});
/// `(2023)`, `[DVD]` and the like between a title and its separator.
const TITLE_ASIDES: &str = r"(?:\s*[(\[][^)\]]*[)\]])*";

static DASH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r#"^(?P<title>[^(\[]+?){}\s+[-–—]\s+{}"#, TITLE_ASIDES, AUTHOR_TAIL))
        .expect("dash pattern")
});
static COMMA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r#"^(?P<title>[^,(\[]+?){},\s*{}"#, TITLE_ASIDES, AUTHOR_TAIL))
        .expect("comma pattern")
});
static BARE_BY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r#"^(?P<title>.+?)\s+(?i:by)\s+{}"#, AUTHOR_TAIL)).expect("bare-by pattern")
});
/// Export fields appended after the author; never part of title or author.
static TRAILING_FIELDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+[-–—]\s+(?:completed|started|abandoned|added|source):").expect("trailing fields pattern")
});
static FALLBACK_STOP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[(\[⭐★🏆]|\s[-–—]\s|\bnotes?:").expect("fallback pattern"));

impl ExtractionPattern {
    pub const ORDER: [ExtractionPattern; 4] = [
        ExtractionPattern::QuotedBy,
        ExtractionPattern::Dash,
        ExtractionPattern::Comma,
        ExtractionPattern::BareBy,
    ];

    fn regex(self) -> &'static Regex {
        match self {
            ExtractionPattern::QuotedBy => &*QUOTED_BY,
            ExtractionPattern::Dash => &*DASH,
            ExtractionPattern::Comma => &*COMMA,
            ExtractionPattern::BareBy => &*BARE_BY,
        }
    }

    /// Title and author if this layout matches.
    pub fn apply(self, text: &str) -> Option<(String, String)> {
        let caps = self.regex().captures(text)?;
        let title = clean_title(caps.name("title")?.as_str());
        let author = caps.name("author")?.as_str().trim().to_string();
        if title.is_empty() || author.is_empty() {
            return None;
        }
        Some((title, author))
    }
}

fn clean_title(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| matches!(c, '"' | '“' | '”' | '\'' | '‘' | '’'))
        .trim()
        .to_string()
}

/// Title/author split of an item line with the pattern that produced it.
pub fn extract_title_author(text: &str) -> (String, String, Option<ExtractionPattern>) {
    let text = TRAILING_FIELDS.find(text).map_or(text, |m| &text[..m.start()]);
    for pattern in ExtractionPattern::ORDER {
        if let Some((title, author)) = pattern.apply(text) {
            return (title, author, Some(pattern));
        }
    }
    let end = FALLBACK_STOP.find(text).map_or(text.len(), |m| m.start());
    (clean_title(&text[..end]), UNKNOWN_AUTHOR.to_string(), None)
}

// --- Field extraction ---

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((\d{4})\)").expect("year pattern"));
static RATING_FRACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d(?:\.\d+)?)\s*/\s*5\b").expect("rating pattern"));
static RATING_STAR_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"⭐\u{FE0F}?\s*(\d)\b").expect("star number pattern"));
static STAR_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:⭐\u{FE0F}?){1,5}|★{1,5}").expect("star run pattern"));
static NOTES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bnotes?:\s*(?:["“](?P<quoted>[^"”]*)["”]|(?P<plain>[^-–—]+))"#)
        .expect("notes pattern")
});
static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]").expect("bracket pattern"));
static PERCENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\((\d{1,3})%(?:\s*complete)?\)").expect("percent pattern"));
static SOURCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bsource:\s*(?P<source>[^🏆]+?)(?:\s+[-–—]\s|\s*🏆|\s*$)").expect("source pattern")
});
static ALL_TIME_MARK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)🏆|all-time favou?rite").expect("all-time pattern"));

fn dated(label: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{}:\s*(\d{{4}}-\d{{2}}-\d{{2}})", label)).expect("date pattern")
}

static COMPLETED_ON: Lazy<Regex> = Lazy::new(|| dated("completed"));
static STARTED_ON: Lazy<Regex> = Lazy::new(|| dated("started"));
static ABANDONED_ON: Lazy<Regex> = Lazy::new(|| dated("abandoned"));
static ADDED_ON: Lazy<Regex> = Lazy::new(|| dated("added"));

pub fn extract_year(text: &str) -> Option<i32> {
    YEAR.captures(text)?.get(1)?.as_str().parse().ok()
}

/// `N/5`, then `⭐ N`, then a run of star glyphs.
pub fn extract_rating(text: &str) -> Option<u8> {
    if let Some(caps) = RATING_FRACTION.captures(text) {
        let value: f32 = caps[1].parse().ok()?;
        return (value <= 5.0).then(|| value.round() as u8);
    }
    if let Some(caps) = RATING_STAR_NUMBER.captures(text) {
        let value: u8 = caps[1].parse().ok()?;
        return (value <= 5).then_some(value);
    }
    STAR_RUN
        .find(text)
        .map(|m| m.as_str().chars().filter(|c| matches!(c, '⭐' | '★')).count() as u8)
}

pub fn extract_notes(text: &str) -> Option<String> {
    let caps = NOTES.captures(text)?;
    let notes = caps
        .name("quoted")
        .or_else(|| caps.name("plain"))?
        .as_str()
        .trim()
        .to_string();
    (!notes.is_empty()).then_some(notes)
}

pub fn extract_format(text: &str) -> Option<Format> {
    BRACKETED
        .captures_iter(text)
        .find_map(|caps| Format::from_token(caps[1].trim()))
}

fn extract_percentage(text: &str) -> Option<u8> {
    let value: u8 = PERCENT.captures(text)?[1].parse().ok()?;
    (value <= 100).then_some(value)
}

fn extract_source(text: &str) -> Option<String> {
    let source = SOURCE.captures(text)?.name("source")?.as_str().trim().to_string();
    (!source.is_empty()).then_some(source)
}

fn extract_date(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).map(|caps| caps[1].to_string())
}

// --- Type resolution ---

static BOOK_INDICATORS: Lazy<Regex> = Lazy::new(|| {
    keyword_regex(&[
        "book", "novel", "read", "author", "pages", "chapter", "audiobook", "kindle", "ebook",
        "e-book", "hardcopy", "hardcover", "paperback",
    ])
});
static MOVIE_INDICATORS: Lazy<Regex> = Lazy::new(|| {
    keyword_regex(&[
        "movie", "film", "director", "directed", "watched", "cinema", "theater", "theatre",
        "streaming", "netflix", "blu-ray", "bluray", "dvd", "imdb",
    ])
});
static DIRECTOR_OR_FILM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)director|film").expect("tie-break pattern"));

/// Book or movie for a line with no type header in effect.
pub fn resolve_is_book(line: &str, pattern: Option<ExtractionPattern>) -> bool {
    let mut book = BOOK_INDICATORS.find_iter(line).count();
    let mut movie = MOVIE_INDICATORS.find_iter(line).count();
    // "Title - Director" is how film lists are usually written; "by" reads as a book.
    match pattern {
        Some(ExtractionPattern::Dash) => movie += 1,
        Some(ExtractionPattern::QuotedBy) | Some(ExtractionPattern::BareBy) => book += 1,
        _ => {}
    }
    if book != movie {
        return book > movie;
    }
    !DIRECTOR_OR_FILM.is_match(line)
}

pub fn confidence(author: &str, year: bool, rating: bool, format: bool) -> f32 {
    let mut score = BASE_CONFIDENCE;
    if author != UNKNOWN_AUTHOR {
        score += AUTHOR_BONUS;
    }
    for found in [year, rating, format] {
        if found {
            score += FIELD_BONUS;
        }
    }
    score.min(1.0)
}

/// Builds a candidate from one item line under `state`.
pub fn parse_item_line(raw: &str, line: usize, state: &ParseState) -> Option<Candidate> {
    let text = LIST_MARKER.replace(raw.trim(), "");
    let text = text.trim();
    let (title, author, pattern) = extract_title_author(text);
    if title.chars().count() <= 1 {
        log::debug!("Line {}: no usable title in {:?}", line, raw);
        return None;
    }

    let year = extract_year(text);
    let rating = extract_rating(text);
    let format = extract_format(text);
    let is_book = match state.media {
        Some(kind) => kind == MediaKind::Book,
        None => resolve_is_book(text, pattern),
    };
    let percentage = match state.category {
        Category::Completed => None,
        _ => extract_percentage(text),
    };

    Some(Candidate {
        line,
        confidence: confidence(&author, year.is_some(), rating.is_some(), format.is_some()),
        title,
        author,
        year,
        rating,
        format,
        notes: extract_notes(text),
        source: extract_source(text),
        percentage,
        completed_date: extract_date(&COMPLETED_ON, text),
        date_started: extract_date(&STARTED_ON, text),
        date_added: extract_date(&ADDED_ON, text),
        date_abandoned: extract_date(&ABANDONED_ON, text),
        category: state.category,
        is_book,
        is_all_time: state.category == Category::AllTime || ALL_TIME_MARK.is_match(text),
    })
}

/// How one input line is treated.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    Header(&'static str),
    Notes(String),
    Boilerplate,
    Item,
}

static NOTES_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^notes?:").expect("notes line pattern"));

pub fn classify(line: &str) -> LineKind {
    if NOTES_LINE.is_match(line) {
        return LineKind::Notes(extract_notes(line).unwrap_or_default());
    }
    if let Some(rule) = match_header(line) {
        return LineKind::Header(rule.name);
    }
    if is_boilerplate(line) {
        return LineKind::Boilerplate;
    }
    LineKind::Item
}

/// Lazy candidate sequence over one block of text. Call [`parse`] again to
/// start over; nothing is kept between runs.
#[derive(Clone)]
pub struct Candidates<'a> {
    lines: Peekable<std::iter::Enumerate<Lines<'a>>>,
    state: ParseState,
}

pub fn parse(text: &str) -> Candidates<'_> {
    Candidates {
        lines: text.lines().enumerate().peekable(),
        state: ParseState::default(),
    }
}

/// Parses everything and keeps candidates at or above `min_confidence`.
pub fn parse_confident(text: &str, min_confidence: f32) -> Vec<Candidate> {
    parse(text).filter(|c| c.confidence >= min_confidence).collect()
}

impl Candidates<'_> {
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Attaches `Notes:` lines directly following an item.
    fn absorb_notes(&mut self, candidate: &mut Candidate) {
        while let Some((_, next)) = self.lines.peek() {
            let next = next.trim();
            if next.is_empty() {
                self.lines.next();
                continue;
            }
            if !NOTES_LINE.is_match(next) {
                break;
            }
            if let Some(notes) = extract_notes(next) {
                candidate.notes = Some(notes);
            }
            self.lines.next();
        }
    }
}

impl Iterator for Candidates<'_> {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        while let Some((index, raw)) = self.lines.next() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            match classify(line) {
                LineKind::Header(name) => {
                    if let Some(rule) = HEADER_RULES.iter().find(|r| r.name == name) {
                        rule.apply(line, &mut self.state);
                    }
                    log::debug!("Line {}: header {} -> {:?}", index + 1, name, self.state);
                }
                LineKind::Notes(_) => {
                    log::debug!("Line {}: notes without an item, skipped", index + 1);
                }
                LineKind::Boilerplate => {}
                LineKind::Item => {
                    if let Some(mut candidate) = parse_item_line(line, index + 1, &self.state) {
                        self.absorb_notes(&mut candidate);
                        return Some(candidate);
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
