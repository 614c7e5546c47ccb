//! Durable key-value slots and the codec for the stored catch collection.

use std::{
    collections::{HashMap, HashSet},
    fs, io,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use log::{debug, error, warn};

use crate::{models::CatchRecord, store::CatchObserver};

/// Key of the slot holding the whole catch collection.
pub const CATCHES_KEY: &str = "fishingCatches";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Could not read slot {key}")]
    Read {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("Could not write slot {key}")]
    Write {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("Storage quota exceeded while writing slot {0}")]
    QuotaExceeded(String),

    #[error("Could not encode catches")]
    Encode(#[source] serde_json::Error),
}

/// A place that keeps text values under string keys across restarts.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, Error>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), Error>;
}

/// Every key lives in its own `<key>.json` file below `dir`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        match fs::read_to_string(self.path(key)) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(Error::Read {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        let write_error = |source| Error::Write {
            key: key.to_string(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(write_error)?;

        // replace the old file in one step so a crash never leaves half a collection
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(write_error)?;
        fs::rename(&tmp, &path).map_err(write_error)?;

        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

/// In-process storage. Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Arc<Mutex<HashMap<String, String>>>,
    writes: Arc<AtomicUsize>,
    full: Arc<AtomicBool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage.put(key, value);
        storage
    }

    /// Set a slot without counting it as a write.
    pub fn put(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    /// Number of successful [`Storage::set`] calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every following write fail as if the quota were used up.
    pub fn set_full(&self, full: bool) {
        self.full.store(full, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // a poisoned map is still a valid map
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
        if self.full.load(Ordering::SeqCst) {
            return Err(Error::QuotaExceeded(key.to_string()));
        }

        self.lock().insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Reads and writes the full catch collection in one slot.
#[derive(Debug, Clone)]
pub struct CatchRepository<S> {
    storage: S,
}

impl<S: Storage> CatchRepository<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn save(&mut self, catches: &[CatchRecord]) -> Result<(), Error> {
        let text = serde_json::to_string(catches).map_err(Error::Encode)?;
        self.storage.set(CATCHES_KEY, &text)
    }

    /// The stored collection, or `None` when there is nothing usable stored.
    pub fn load(&self) -> Option<Vec<CatchRecord>> {
        let text = match self.storage.get(CATCHES_KEY) {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!("No catches stored under {CATCHES_KEY}");
                return None;
            }
            Err(err) => {
                warn!("Could not read stored catches: {err}");
                return None;
            }
        };

        let catches: Vec<CatchRecord> = match serde_json::from_str(&text) {
            Ok(catches) => catches,
            Err(err) => {
                warn!("Ignoring stored catches that do not parse: {err}");
                return None;
            }
        };

        let mut ids = HashSet::new();
        if let Some(duplicate) = catches.iter().find(|c| !ids.insert(&c.id)) {
            warn!("Ignoring stored catches with duplicate id {}", duplicate.id);
            return None;
        }

        Some(catches)
    }
}

impl<S: Storage> CatchObserver for CatchRepository<S> {
    fn catches_changed(&mut self, catches: &[CatchRecord]) {
        match self.save(catches) {
            Ok(()) => debug!("Saved {} catches", catches.len()),
            Err(err) => error!("Could not save catches, keeping them in memory only: {err}"),
        }
    }
}
