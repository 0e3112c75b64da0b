//! Where glycoplot finds its data, read from an optional TOML file
//!
//! ```toml
//! database = "carbFF3.db"
//! dihedral_table = "Dihedrals/dihedrals.txt"
//! pmf_directory = "PMF"
//! pmf_extension = "pmf"
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::SettingsError;

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// The SQLite database holding PMF datasets and saved configurations
    pub database: PathBuf,
    /// Reference dihedral definitions, one `linkage,angles,...` row per line
    pub dihedral_table: PathBuf,
    /// Where raw PMF files are ingested from
    pub pmf_directory: PathBuf,
    pub pmf_extension: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: PathBuf::from("carbFF3.db"),
            dihedral_table: PathBuf::from("Dihedrals/dihedrals.txt"),
            pmf_directory: PathBuf::from("PMF"),
            pmf_extension: "pmf".to_owned(),
        }
    }
}

impl Settings {
    pub const FILE_NAME: &str = "glycoplot.toml";

    /// # Errors
    ///
    /// Fails if the file at `path` can't be read, or isn't valid settings TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// Like [`Settings::load`], but falls back to the defaults if there's no file at `path`
    ///
    /// # Errors
    ///
    /// Fails if the file exists but can't be read, or isn't valid settings TOML.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(path, &text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no settings found at {path:?}, using the defaults");
                Ok(Self::default())
            }
            Err(source) => Err(SettingsError::Io {
                path: path.to_owned(),
                source,
            }),
        }
    }

    fn parse(path: &Path, text: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(text).map_err(|source| SettingsError::Parse {
            path: path.to_owned(),
            source,
        })?;
        debug!("loaded settings from {path:?}: {settings:?}");
        Ok(settings)
    }
}
