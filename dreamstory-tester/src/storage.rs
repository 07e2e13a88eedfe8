//! Filesystem-backed platform pieces for headless runs: a save-slot store
//! with one JSON file per slot and a loader over the bundled situation feed.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use dreamstory_game::{BankError, DataLoader, GameStorage, SituationBank};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("situation feed: {0}")]
    Bank(#[from] BankError),
    #[error("reading config '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("parsing config '{name}': {source}")]
    Json {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Serves the bundled feed. Config documents come from `<dir>/<name>.json`
/// when a directory is set and the file exists; otherwise every field takes
/// its default.
#[derive(Debug, Clone, Default)]
pub struct BundledLoader {
    config_dir: Option<PathBuf>,
}

impl BundledLoader {
    #[must_use]
    pub const fn new() -> Self {
        Self { config_dir: None }
    }

    #[must_use]
    pub fn with_config_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: Some(dir.into()),
        }
    }

    fn config_path(&self, config_name: &str) -> Option<PathBuf> {
        self.config_dir
            .as_ref()
            .map(|dir| dir.join(format!("{config_name}.json")))
            .filter(|path| path.exists())
    }
}

impl DataLoader for BundledLoader {
    type Error = LoaderError;

    fn load_situation_bank(&self) -> Result<SituationBank, Self::Error> {
        Ok(SituationBank::load_from_static()?)
    }

    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned,
    {
        let json = match self.config_path(config_name) {
            Some(path) => fs::read_to_string(&path).map_err(|source| LoaderError::Io {
                name: config_name.to_string(),
                source,
            })?,
            None => "{}".to_string(),
        };
        serde_json::from_str(&json).map_err(|source| LoaderError::Json {
            name: config_name.to_string(),
            source,
        })
    }
}

/// One `<slot>.json` file per save slot under a root directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) the slot directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.root.join(format!("{slot}.json"))
    }
}

impl GameStorage for FileStorage {
    type Error = io::Error;

    fn save_blob(&self, slot: &str, blob: &str) -> Result<(), Self::Error> {
        // Write beside the slot and swap in, so a failed write keeps the old save.
        let target = self.slot_path(slot);
        let staging = self.root.join(format!("{slot}.json.tmp"));
        fs::write(&staging, blob)?;
        fs::rename(&staging, &target)
    }

    fn load_blob(&self, slot: &str) -> Result<Option<String>, Self::Error> {
        match fs::read_to_string(self.slot_path(slot)) {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn delete_save(&self, slot: &str) -> Result<(), Self::Error> {
        match fs::remove_file(self.slot_path(slot)) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}
