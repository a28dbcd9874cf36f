//! Result and Error types for the crate.

use miette::Diagnostic;
use thiserror::Error;

/// Result containing an error variant from this module.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Detection(#[from] detection::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Ml(#[from] ml::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] odal::Error),

    #[error(
        "Anchors are generated for a {anchor_width}x{anchor_height} input, \
        but the model expects {model_width}x{model_height}"
    )]
    #[diagnostic(help("the `[anchors]` input size must match the model input"))]
    AnchorInputSize {
        anchor_width: usize,
        anchor_height: usize,
        model_width: usize,
        model_height: usize,
    },

    #[error("Frame is {width}x{height}, but the model expects {expected_width}x{expected_height}")]
    #[diagnostic(help("resize the frame to the model input resolution before detecting"))]
    InputResolution {
        width: usize,
        height: usize,
        expected_width: usize,
        expected_height: usize,
    },
}

impl Error {
    /// Returns `true` if the detector could not be constructed from its configuration.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        match self {
            Error::Detection(error) => error.is_configuration(),
            Error::Config(_) | Error::AnchorInputSize { .. } => true,
            _ => false,
        }
    }
}
