//! FiftyList: reading and watching tracker.
//!
//! Two catalogs (books, movies) of five ordered buckets each, a reading
//! goal per catalog, plain-text export and a forgiving import parser.

pub mod catalog;
pub mod database;
pub mod error;
pub mod export;
pub mod models;
pub mod notify;
pub mod parser;
pub mod search;
pub mod settings;
pub mod stats;
pub mod store;


pub use catalog::Catalog;
pub use database::Database;
pub use error::{CatalogError, CatalogResult, SearchError, StorageError};
pub use models::*;
pub use notify::{Change, ChangeKind, Subscription};
pub use parser::{parse, parse_confident, Candidate};
pub use search::{MetadataClient, MetadataHit};
pub use settings::Settings;
pub use stats::LibraryStats;
pub use store::{ImportReport, Library, LibraryData};
