//! Optional metadata lookup for the add form.
//!
//! Results are staged as [`ItemDraft`]s; nothing here touches a library.
//! Books come from Open Library, movies from OMDb (API key required).

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

use crate::error::SearchError;
use crate::models::{ItemDraft, MediaKind};
use crate::parser::UNKNOWN_AUTHOR;
use crate::settings::Settings;

const OPEN_LIBRARY_URL: &str = "https://openlibrary.org";
const OMDB_URL: &str = "https://www.omdbapi.com";
const COVERS_URL: &str = "https://covers.openlibrary.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const SEARCH_CACHE_TTL_MS: u64 = 2 * 60 * 60 * 1000;
const SEARCH_CACHE_MAX_ENTRIES: usize = 512;
const MAX_HITS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetadataHit {
    pub kind: MediaKind,
    pub title: String,
    /// Author or director when the provider reports one.
    pub author: Option<String>,
    pub year: Option<i32>,
    pub external_id: Option<String>,
    pub cover_url: Option<String>,
}

impl MetadataHit {
    /// Staged form for the add/edit flow, prefilled from settings.
    pub fn to_draft(&self, settings: &Settings) -> ItemDraft {
        let draft = ItemDraft {
            title: self.title.clone(),
            author: self
                .author
                .clone()
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            year: self.year,
            ..Default::default()
        };
        settings.apply_defaults(self.kind, draft)
    }
}

#[derive(Debug, Deserialize)]
struct OpenLibraryResponse {
    #[serde(default)]
    docs: Vec<OpenLibraryDoc>,
}

#[derive(Debug, Deserialize)]
struct OpenLibraryDoc {
    title: String,
    #[serde(default)]
    author_name: Vec<String>,
    first_publish_year: Option<i32>,
    key: Option<String>,
    cover_i: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Search", default)]
    search: Vec<OmdbSearchItem>,
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbSearchItem {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year")]
    year: String,
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Poster")]
    poster: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbDetails {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "Director")]
    director: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
    #[serde(rename = "Poster")]
    poster: Option<String>,
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
}

/// "1995", "2008–2013" -> first year.
fn leading_year(raw: &str) -> Option<i32> {
    raw.get(..4).and_then(|y| y.parse().ok())
}

/// OMDb uses "N/A" for absent fields.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != "N/A")
}

#[derive(Clone)]
struct SearchCacheEntry {
    ts_ms: u64,
    hits: Vec<MetadataHit>,
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

pub struct MetadataClient {
    client: Client,
    open_library_url: String,
    omdb_url: String,
    omdb_api_key: Option<String>,
    search_cache: RwLock<HashMap<String, SearchCacheEntry>>,
}

impl MetadataClient {
    pub fn new(omdb_api_key: Option<String>) -> Self {
        let client = Client::builder()
            .user_agent("FiftyList/1.0")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        MetadataClient {
            client,
            open_library_url: OPEN_LIBRARY_URL.to_string(),
            omdb_url: OMDB_URL.to_string(),
            omdb_api_key: omdb_api_key.filter(|k| !k.trim().is_empty()),
            search_cache: RwLock::new(HashMap::new()),
        }
    }

    /// Points both providers somewhere else (mirrors, tests).
    pub fn with_base_urls(mut self, open_library: &str, omdb: &str) -> Self {
        self.open_library_url = open_library.trim_end_matches('/').to_string();
        self.omdb_url = omdb.trim_end_matches('/').to_string();
        self
    }

    pub async fn search(&self, kind: MediaKind, query: &str) -> Result<Vec<MetadataHit>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let cache_key = format!("{}:{}", kind, query.to_lowercase());
        if let Some(entry) = self.search_cache.read().await.get(&cache_key) {
            if now_ms().saturating_sub(entry.ts_ms) < SEARCH_CACHE_TTL_MS {
                log::debug!("Search cache hit for {:?}", cache_key);
                return Ok(entry.hits.clone());
            }
        }

        let hits = match kind {
            MediaKind::Book => self.search_books(query).await?,
            MediaKind::Movie => self.search_movies(query).await?,
        };
        log::info!("{} search for {:?} returned {} hit(s)", kind, query, hits.len());

        let mut cache = self.search_cache.write().await;
        if cache.len() >= SEARCH_CACHE_MAX_ENTRIES {
            let now = now_ms();
            cache.retain(|_, e| now.saturating_sub(e.ts_ms) < SEARCH_CACHE_TTL_MS);
            if cache.len() >= SEARCH_CACHE_MAX_ENTRIES {
                cache.clear();
            }
        }
        cache.insert(
            cache_key,
            SearchCacheEntry {
                ts_ms: now_ms(),
                hits: hits.clone(),
            },
        );
        Ok(hits)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, SearchError> {
        let fut = self.client.get(url).header("Accept", "application/json").send();
        let resp = tokio::time::timeout(REQUEST_TIMEOUT, fut)
            .await
            .map_err(|_| SearchError::Timeout)??;
        let status = resp.status();
        if !status.is_success() {
            log::warn!("Metadata request failed with {}", status);
            return Err(SearchError::HttpStatus(status));
        }
        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn search_books(&self, query: &str) -> Result<Vec<MetadataHit>, SearchError> {
        let url = format!(
            "{}/search.json?q={}&limit={}",
            self.open_library_url,
            urlencoding::encode(query),
            MAX_HITS
        );
        let resp: OpenLibraryResponse = self.get_json(&url).await?;
        Ok(resp
            .docs
            .into_iter()
            .take(MAX_HITS)
            .map(|doc| MetadataHit {
                kind: MediaKind::Book,
                title: doc.title,
                author: doc.author_name.into_iter().next(),
                year: doc.first_publish_year,
                external_id: doc.key,
                cover_url: doc
                    .cover_i
                    .map(|id| format!("{}/b/id/{}-M.jpg", COVERS_URL, id)),
            })
            .collect())
    }

    fn omdb_key(&self) -> Result<&str, SearchError> {
        self.omdb_api_key.as_deref().ok_or(SearchError::MissingApiKey)
    }

    async fn search_movies(&self, query: &str) -> Result<Vec<MetadataHit>, SearchError> {
        let url = format!(
            "{}/?apikey={}&s={}&type=movie",
            self.omdb_url,
            urlencoding::encode(self.omdb_key()?),
            urlencoding::encode(query)
        );
        let resp: OmdbSearchResponse = self.get_json(&url).await?;
        if resp.response != "True" {
            let message = resp.error.unwrap_or_default();
            // OMDb reports an empty result set as an error.
            if message.eq_ignore_ascii_case("Movie not found!") {
                return Ok(Vec::new());
            }
            return Err(SearchError::Provider {
                provider: "OMDb",
                message,
            });
        }
        Ok(resp
            .search
            .into_iter()
            .take(MAX_HITS)
            .map(|item| MetadataHit {
                kind: MediaKind::Movie,
                title: item.title,
                author: None,
                year: leading_year(&item.year),
                external_id: Some(item.imdb_id),
                cover_url: present(item.poster),
            })
            .collect())
    }

    /// Full record for one IMDb id; OMDb search results carry no director.
    pub async fn movie_details(&self, imdb_id: &str) -> Result<MetadataHit, SearchError> {
        let url = format!(
            "{}/?apikey={}&i={}",
            self.omdb_url,
            urlencoding::encode(self.omdb_key()?),
            urlencoding::encode(imdb_id)
        );
        let resp: OmdbDetails = self.get_json(&url).await?;
        if resp.response != "True" {
            return Err(SearchError::Provider {
                provider: "OMDb",
                message: resp.error.unwrap_or_default(),
            });
        }
        Ok(MetadataHit {
            kind: MediaKind::Movie,
            title: resp.title,
            author: present(resp.director),
            year: resp.year.as_deref().and_then(leading_year),
            external_id: resp.imdb_id.or_else(|| Some(imdb_id.to_string())),
            cover_url: present(resp.poster),
        })
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
