//! This module provides the functionality necessary to feed images to machine
//! learning (ML) models and read back their raw output tensors.
//!
//! The models themselves are executed by an external inference engine, which is
//! treated as a black box behind the [`InferenceEngine`] trait.

mod engine;
mod error;
mod normalization;
pub mod util;

pub use engine::{InferenceEngine, ModelOutputs};
pub use error::{Error, Result};
pub use normalization::Normalization;

#[allow(missing_docs)]
pub mod prelude {
    pub use crate::engine::{InferenceEngine, ModelOutputs};
    pub use crate::error::Error;
    pub use crate::normalization::Normalization;

    pub use crate::util as ml_util;

    pub use crate::{MlArray, MlModel};
}

/// Conveniency type representing an n-dimensional array.
pub type MlArray<E> = ndarray::ArrayD<E>;

/// A machine learning model.
///
/// This only describes the contract of the model, the weights are loaded and
/// executed by an [`InferenceEngine`].
///
/// ## Example
/// ```
/// use ml::prelude::*;
///
/// /// A tiny digit classifier.
/// struct DigitClassifier;
///
/// impl MlModel for DigitClassifier {
///     const MODEL_PATH: &'static str = "models/digits.tflite";
///     const INPUT_WIDTH: usize = 28;
///     const INPUT_HEIGHT: usize = 28;
///     const NUM_OUTPUTS: usize = 1;
/// }
/// ```
pub trait MlModel: Send + Sync + 'static {
    /// Path to the model parameters.
    const MODEL_PATH: &'static str;

    /// Width of the input image in pixels.
    const INPUT_WIDTH: usize;

    /// Height of the input image in pixels.
    const INPUT_HEIGHT: usize;

    /// Number of output tensors produced per inference.
    const NUM_OUTPUTS: usize;

    /// Shape of the input tensor, `[batch, height, width, channels]`.
    #[must_use]
    fn input_shape() -> [usize; 4] {
        [1, Self::INPUT_HEIGHT, Self::INPUT_WIDTH, 3]
    }
}
