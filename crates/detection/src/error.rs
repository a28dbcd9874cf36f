//! Result and Error types for the crate.

use miette::Diagnostic;
use thiserror::Error;

/// Result containing an error variant from this module.
pub type Result<T> = std::result::Result<T, Error>;

/// Detection error variants.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Anchor grid has {strides} strides, but {num_layers} layers")]
    #[diagnostic(help("every layer needs exactly one stride"))]
    StrideCount { strides: usize, num_layers: usize },

    #[error("Anchor grid needs at least one layer")]
    NoLayers,

    #[error("Stride of layer {layer} is zero")]
    ZeroStride { layer: usize },

    #[error(
        "Anchor grid has {widths} feature map widths and {heights} feature map heights, \
        but {num_layers} layers"
    )]
    #[diagnostic(help("either leave both lists empty, or give a size for every layer"))]
    FeatureMapCount {
        widths: usize,
        heights: usize,
        num_layers: usize,
    },

    #[error("Model produced {scores} scores, but the anchor grid has {anchors} anchors")]
    #[diagnostic(help("the model and the anchor configuration do not belong together"))]
    ScoreCount { scores: usize, anchors: usize },

    #[error("Model produced {boxes} box rows, but the anchor grid has {anchors} anchors")]
    #[diagnostic(help("the model and the anchor configuration do not belong together"))]
    BoxCount { boxes: usize, anchors: usize },

    #[error("Box rows hold {found} values, expected {expected}")]
    BoxRowWidth { expected: usize, found: usize },
}

impl Error {
    /// Returns `true` if this error comes from an invalid anchor configuration.
    ///
    /// These are raised while constructing a detector, all other errors are raised per frame.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::StrideCount { .. }
                | Error::NoLayers
                | Error::ZeroStride { .. }
                | Error::FeatureMapCount { .. }
        )
    }
}
