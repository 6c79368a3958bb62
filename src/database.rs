use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::settings::Settings;
use crate::store::{Library, LibraryData};

pub const LIBRARY_FILE: &str = "library.json";
pub const SETTINGS_FILE: &str = "settings.json";

/// JSON files backing one user's library and settings.
pub struct Database {
    dir: PathBuf,
}

impl Database {
    /// Opens (and creates if needed) the data directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
            log::info!("Created data directory: {}", dir.display());
        }
        Ok(Database { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn library_path(&self) -> PathBuf {
        self.dir.join(LIBRARY_FILE)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILE)
    }

    /// Reads the stored library. A missing file is an empty library.
    pub fn load_library(&self) -> Result<Library, StorageError> {
        let path = self.library_path();
        if !path.exists() {
            log::debug!("No library at {}, starting empty", path.display());
            return Ok(Library::new());
        }
        let content = fs::read_to_string(&path)?;
        let data: LibraryData = serde_json::from_str(&content)?;
        log::info!(
            "Loaded {} books and {} movies from {}",
            data.books.len(),
            data.movies.len(),
            path.display()
        );
        Ok(Library::from_data(data))
    }

    pub fn save_library(&self, library: &Library) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(library.data())?;
        write_atomic(&self.library_path(), &content)?;
        log::debug!("Saved library to {}", self.library_path().display());
        Ok(())
    }

    pub fn load_settings(&self) -> Result<Settings, StorageError> {
        let path = self.settings_path();
        if !path.exists() {
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(settings)?;
        write_atomic(&self.settings_path(), &content)
    }
}

/// Writes through a sibling temp file so a crash never leaves half a file.
fn write_atomic(path: &Path, content: &str) -> Result<(), StorageError> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
