//! Loading of TOML configuration files.
//!
//! Every config lives in a main directory, shared by all deployments. A second,
//! optional overlay directory holds files with only the keys that differ for a
//! specific device. Loading a config merges the overlay on top of the main file.

mod error;

use std::{fs, path::Path};

use serde::{Serialize, de::DeserializeOwned};
use toml::{Table, Value};

pub use error::{ConfigKind, Error, ErrorKind, Result};

/// A configuration that is stored as a TOML file.
///
/// ## Example
/// ```no_run
/// use odal::Config;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct CameraConfig {
///     exposure: u32,
/// }
///
/// impl Config for CameraConfig {
///     const PATH: &'static str = "camera.toml";
/// }
///
/// let config = CameraConfig::load("config").unwrap();
/// ```
pub trait Config: Serialize + DeserializeOwned {
    /// File name of the config, relative to the config directories.
    const PATH: &'static str;

    /// Load the config from the main directory `main_dir`.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or does not describe a valid `Self`.
    fn load(main_dir: impl AsRef<Path>) -> Result<Self> {
        let table = read_table(main_dir.as_ref(), Self::PATH, ConfigKind::Main)?;

        table
            .try_into()
            .map_err(|e| Error::new(Self::PATH, ErrorKind::from(e)))
    }

    /// Load the config from `main_dir`, with the values of the overlay in
    /// `overlay_dir` taking precedence.
    ///
    /// Keys in the overlay that do not exist in the main config are ignored.
    ///
    /// # Errors
    ///
    /// Fails if either file cannot be read, or if the merged config does not describe
    /// a valid `Self`. Use [`Error::is_missing_overlay`] to detect a missing overlay.
    fn load_with_overlay(main_dir: impl AsRef<Path>, overlay_dir: impl AsRef<Path>) -> Result<Self> {
        let main = read_table(main_dir.as_ref(), Self::PATH, ConfigKind::Main)?;
        let overlay = read_table(overlay_dir.as_ref(), Self::PATH, ConfigKind::Overlay)?;

        merge_tables(main, overlay)
            .try_into()
            .map_err(|e| Error::new(Self::PATH, ErrorKind::from(e)))
    }

    /// Like [`Config::load_with_overlay`], but falls back to the main config when
    /// the overlay does not exist.
    ///
    /// # Errors
    ///
    /// Fails if the main config cannot be loaded, or if an existing overlay is invalid.
    fn load_with_optional_overlay(
        main_dir: impl AsRef<Path>,
        overlay_dir: impl AsRef<Path>,
    ) -> Result<Self> {
        match Self::load_with_overlay(main_dir.as_ref(), overlay_dir) {
            Err(error) if error.is_missing_overlay() => {
                if let ErrorKind::Load { path, .. } = &error.kind {
                    tracing::debug!("`{}`: failed to read overlay from `{path}`", Self::PATH);
                }

                Self::load(main_dir)
            }
            result => result,
        }
    }

    /// Store the keys in which `self` differs from `main` as an overlay in `overlay_dir`.
    ///
    /// # Errors
    ///
    /// Fails if either config cannot be serialized, or if the file cannot be written.
    fn save_as_overlay(&self, main: &Self, overlay_dir: impl AsRef<Path>) -> Result<()> {
        let to_table = |config: &Self| {
            Table::try_from(config).map_err(|e| Error::new(Self::PATH, ErrorKind::from(e)))
        };

        let diff = extract_diff(&to_table(main)?, &to_table(self)?);
        let contents =
            toml::to_string_pretty(&diff).map_err(|e| Error::new(Self::PATH, ErrorKind::from(e)))?;

        let path = overlay_dir.as_ref().join(Self::PATH);
        fs::write(&path, contents).map_err(|source| {
            Error::new(
                Self::PATH,
                ErrorKind::Load {
                    path: path.display().to_string(),
                    config_kind: ConfigKind::Overlay,
                    source,
                },
            )
        })
    }
}

fn read_table(dir: &Path, name: &'static str, config_kind: ConfigKind) -> Result<Table> {
    let path = dir.join(name);
    let path_str = path.display().to_string();

    let contents = fs::read_to_string(&path).map_err(|source| {
        Error::new(
            name,
            ErrorKind::Load {
                path: path_str.clone(),
                config_kind,
                source,
            },
        )
    })?;

    contents.parse::<Table>().map_err(|source| {
        Error::new(
            name,
            ErrorKind::Parse {
                path: path_str,
                source,
            },
        )
    })
}

/// Recursively merge `overlay` into `main`.
///
/// Values from the overlay replace those in main, nested tables are merged key by
/// key. Keys that only exist in the overlay are dropped.
#[must_use]
pub fn merge_tables(mut main: Table, overlay: Table) -> Table {
    for (key, overlay_value) in overlay {
        let Some(main_value) = main.get_mut(&key) else {
            continue;
        };

        match (main_value, overlay_value) {
            (Value::Table(main_table), Value::Table(overlay_table)) => {
                let merged = merge_tables(std::mem::take(main_table), overlay_table);
                *main_table = merged;
            }
            (main_value, overlay_value) => *main_value = overlay_value,
        }
    }

    main
}

/// Compute the smallest table that turns `main` into `changed` when merged with
/// [`merge_tables`].
///
/// Nested tables without changes are left out entirely.
#[must_use]
pub fn extract_diff(main: &Table, changed: &Table) -> Table {
    let mut diff = Table::new();

    for (key, changed_value) in changed {
        match (main.get(key), changed_value) {
            (Some(Value::Table(main_table)), Value::Table(changed_table)) => {
                let nested = extract_diff(main_table, changed_table);
                if !nested.is_empty() {
                    diff.insert(key.clone(), Value::Table(nested));
                }
            }
            (Some(main_value), changed_value) if main_value == changed_value => {}
            (_, changed_value) => {
                diff.insert(key.clone(), changed_value.clone());
            }
        }
    }

    diff
}
