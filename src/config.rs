use std::{
    env, fs, io,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::id::IdScheme;

const CONFIG_FILE: &str = "config.ron";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Could not determine a home directory")]
    NoHomeDirectory,

    #[error("Could not read config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not parse config file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("Environment variable {name} has an invalid value {value:?}: {reason}")]
    InvalidOverride {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Configuration for the journal.
///
/// Read from `config.ron` in the platform config directory. Every field may be
/// left out and can be overridden from the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the stored catches.
    pub data_dir: PathBuf,
    /// Address the web journal listens on.
    pub bind: SocketAddr,
    pub id_scheme: IdScheme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: project_dirs()
                .map(|dirs| dirs.data_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("data")),
            bind: SocketAddr::from(([127, 0, 0, 1], 3030)),
            id_scheme: IdScheme::default(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "Chronophylos", "AnglersJournal")
}

impl Config {
    /// Load from the platform config directory, then apply environment overrides.
    pub fn load() -> Result<Self, Error> {
        let dirs = project_dirs().ok_or(Error::NoHomeDirectory)?;
        let mut config = Self::from_file(&dirs.config_dir().join(CONFIG_FILE))?;
        config.apply_overrides(|name| env::var(name).ok())?;
        Ok(config)
    }

    /// A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("No config file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(Error::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Self::from_ron(&text).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    fn apply_overrides<F>(&mut self, var: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = var("ANGLERS_JOURNAL_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }

        if let Some(value) = var("ANGLERS_JOURNAL_BIND") {
            self.bind = value.parse().map_err(|err: std::net::AddrParseError| {
                Error::InvalidOverride {
                    name: "ANGLERS_JOURNAL_BIND",
                    value: value.clone(),
                    reason: err.to_string(),
                }
            })?;
        }

        if let Some(value) = var("ANGLERS_JOURNAL_ID_SCHEME") {
            self.id_scheme = value.parse().map_err(|reason| Error::InvalidOverride {
                name: "ANGLERS_JOURNAL_ID_SCHEME",
                value: value.clone(),
                reason,
            })?;
        }

        Ok(())
    }
}
