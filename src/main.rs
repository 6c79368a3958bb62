//! FiftyList command line front end.
//!
//! Every subcommand loads the library, performs one operation and saves.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use fiftylist_lib::export::item_line;
use fiftylist_lib::{
    parse_confident, Category, Database, Format, ItemDraft, Library, MediaKind, MetadataClient,
};
use std::fs;
use std::path::PathBuf;

const DATA_DIR_ENV: &str = "FIFTYLIST_DATA_DIR";
const OMDB_KEY_ENV: &str = "OMDB_API_KEY";

/// Track the books you read and the movies you watch
#[derive(Parser, Debug)]
#[command(name = "fiftylist")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory holding library.json and settings.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the items of a catalog, bucket by bucket
    List {
        #[arg(long)]
        movie: bool,
        /// Only this bucket (completed, inProgress, planned, fails, allTime)
        #[arg(long)]
        category: Option<String>,
    },
    /// Add an item
    Add {
        title: String,
        author: String,
        #[arg(long)]
        movie: bool,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        rating: Option<u8>,
        #[arg(long)]
        format: Option<String>,
        #[arg(long)]
        percentage: Option<u8>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        source: Option<String>,
        #[arg(long, default_value_t = false)]
        all_time: bool,
    },
    /// Delete an item by id
    Delete {
        id: u64,
        #[arg(long)]
        movie: bool,
        /// Bucket the item is deleted from (defaults to its primary bucket)
        #[arg(long)]
        category: Option<String>,
    },
    /// Show or set the yearly goal
    Goal {
        value: Option<u32>,
        #[arg(long)]
        movie: bool,
    },
    /// Import items from a pasted text list
    Import {
        file: PathBuf,
        /// Drop candidates scored below this (0.0 - 1.0)
        #[arg(long, default_value_t = 0.0)]
        min_confidence: f32,
        /// Print what would be imported without saving
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Write the plain-text export
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Look up metadata for the add form
    Search {
        query: String,
        #[arg(long)]
        movie: bool,
    },
}

/// ~/.local/share/fiftylist unless overridden.
fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("fiftylist")
        })
}

fn kind_of(movie: bool) -> MediaKind {
    if movie {
        MediaKind::Movie
    } else {
        MediaKind::Book
    }
}

fn parse_category(raw: Option<&str>) -> Result<Option<Category>> {
    raw.map(|c| c.parse::<Category>())
        .transpose()
        .context("Invalid --category")
}

fn print_catalog(library: &Library, kind: MediaKind, only: Option<Category>) {
    for category in Category::ALL {
        if only.is_some_and(|c| c != category) {
            continue;
        }
        let items = library.items(kind, category);
        println!("{} ({})", category, items.len());
        for (n, item) in items.iter().enumerate() {
            println!("  [{}] {}", item.id, item_line(n + 1, item));
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let db = Database::open(resolve_data_dir(cli.data_dir))
        .context("Failed to open data directory")?;
    log::debug!("Data directory: {}", db.dir().display());
    let mut library = db.load_library().context("Failed to load library")?;
    let settings = db.load_settings().context("Failed to load settings")?;

    match cli.command {
        Command::List { movie, category } => {
            let only = parse_category(category.as_deref())?;
            print_catalog(&library, kind_of(movie), only);
            return Ok(());
        }
        Command::Add {
            title,
            author,
            movie,
            category,
            year,
            rating,
            format,
            percentage,
            notes,
            source,
            all_time,
        } => {
            let kind = kind_of(movie);
            let format = match format.as_deref() {
                Some(raw) => match Format::from_token(raw) {
                    Some(f) => Some(f),
                    None => bail!("Unknown format: {}", raw),
                },
                None => None,
            };
            let draft = ItemDraft {
                title,
                author,
                year,
                category: parse_category(category.as_deref())?,
                rating,
                format,
                percentage,
                notes,
                source,
                is_all_time: all_time,
                ..Default::default()
            };
            let item = library.add(kind, settings.apply_defaults(kind, draft))?;
            println!("Added {} #{}: \"{}\" by {}", kind, item.id, item.title, item.author);
        }
        Command::Delete {
            id,
            movie,
            category,
        } => {
            let kind = kind_of(movie);
            let category = match parse_category(category.as_deref())? {
                Some(c) => c,
                None => library
                    .catalog(kind)
                    .primary_category(id)
                    .with_context(|| format!("No {} with id {}", kind, id))?,
            };
            let item = library.delete(kind, id, category)?;
            println!("Deleted \"{}\" from {}", item.title, category);
        }
        Command::Goal { value, movie } => {
            let kind = kind_of(movie);
            match value {
                Some(v) => {
                    library.set_goal(kind, v);
                    println!("{} goal set to {}", kind, v);
                }
                None => {
                    println!("{} goal: {}", kind, library.goals().for_kind(kind));
                    return Ok(());
                }
            }
        }
        Command::Import {
            file,
            min_confidence,
            dry_run,
        } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let candidates = parse_confident(&text, min_confidence);
            if dry_run {
                for c in &candidates {
                    println!(
                        "line {:>4}  {:<5} {:<10} {:.1}  \"{}\" by {}",
                        c.line,
                        c.kind(),
                        c.category,
                        c.confidence,
                        c.title,
                        c.author
                    );
                }
                println!("{} candidate(s), nothing saved", candidates.len());
                return Ok(());
            }
            let report = library.import_candidates(candidates, &settings);
            for (draft, err) in &report.skipped {
                println!("Skipped \"{}\": {}", draft.title, err);
            }
            println!(
                "Imported {} item(s), skipped {}",
                report.added_count(),
                report.skipped_count()
            );
        }
        Command::Export { out } => {
            let text = library.export_text();
            match out {
                Some(path) => {
                    fs::write(&path, &text)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    log::info!("Export written to {}", path.display());
                }
                None => println!("{}", text),
            }
            return Ok(());
        }
        Command::Search { query, movie } => {
            let kind = kind_of(movie);
            let client = MetadataClient::new(std::env::var(OMDB_KEY_ENV).ok());
            let hits = client.search(kind, &query).await?;
            if hits.is_empty() {
                println!("No results");
            }
            for mut hit in hits {
                if let (MediaKind::Movie, Some(imdb_id)) = (kind, hit.external_id.clone()) {
                    match client.movie_details(&imdb_id).await {
                        Ok(details) => hit.author = details.author,
                        Err(e) => log::warn!("No details for {}: {}", imdb_id, e),
                    }
                }
                let draft = hit.to_draft(&settings);
                println!(
                    "\"{}\" by {}{}",
                    draft.title,
                    draft.author,
                    draft.year.map(|y| format!(" ({})", y)).unwrap_or_default()
                );
            }
            return Ok(());
        }
    }

    db.save_library(&library).context("Failed to save library")?;
    Ok(())
}
