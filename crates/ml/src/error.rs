//! See [`Error`].

use miette::Diagnostic;
use thiserror::Error;

/// Error types for this crate.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error(
        "Input buffer holds {found} bytes, but a {width}x{height} RGB image needs {expected} bytes"
    )]
    InputSize {
        width: usize,
        height: usize,
        expected: usize,
        found: usize,
    },

    #[error("`{path}` produced {found} output tensors, expected {expected}")]
    OutputCount {
        path: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Output tensor {index} does not exist")]
    MissingOutput { index: usize },

    #[error("Output tensor {index} with shape {shape:?} has an unexpected rank")]
    OutputRank {
        index: usize,
        shape: Vec<usize>,
        #[source]
        source: ndarray::ShapeError,
    },

    #[error("Inference engine failed to run the model")]
    Engine(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Type alias for [`Result<T, Error>`].
pub type Result<T> = std::result::Result<T, Error>;
