//! Result and Error types for the crate.
use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

/// Result containing an error variant from this module.
pub type Result<T> = std::result::Result<T, Error>;

/// Which of the two config files an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    Main,
    Overlay,
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigKind::Main => write!(f, "main"),
            ConfigKind::Overlay => write!(f, "overlay"),
        }
    }
}

/// Configuration error, tagged with the name of the config file it concerns.
#[derive(Error, Diagnostic, Debug)]
#[error("failed to process config `{name}`")]
pub struct Error {
    /// The file name of the config, see [`Config::PATH`](crate::Config::PATH).
    pub name: &'static str,
    #[source]
    #[diagnostic_source]
    pub kind: ErrorKind,
}

impl Error {
    pub(crate) fn new(name: &'static str, kind: ErrorKind) -> Self {
        Self { name, kind }
    }

    /// Returns `true` if the overlay file could not be read.
    ///
    /// Callers usually fall back to [`Config::load`](crate::Config::load) in that case.
    #[must_use]
    pub fn is_missing_overlay(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Load {
                config_kind: ConfigKind::Overlay,
                ..
            }
        )
    }
}

#[derive(Error, Diagnostic, Debug)]
pub enum ErrorKind {
    /// The file could not be read or written.
    #[error("failed to access {config_kind} config `{path}`")]
    #[diagnostic(help("check that the config directory exists and contains the file"))]
    Load {
        path: String,
        config_kind: ConfigKind,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML.
    #[error("failed to parse `{path}`")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// The config could not be turned into TOML.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// The merged TOML does not match the config type.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),
}
