//! The seam between the framework and an external inference engine.

use ndarray::{ArrayView, Dimension};

use crate::{
    MlArray, MlModel,
    error::{Error, Result},
};

/// An inference engine that is able to run the model `Self::Model`.
///
/// Implementations own whatever runtime state is needed (loaded weights,
/// interpreter, accelerator handles). The framework only hands it a normalized
/// input tensor and reads back the raw output tensors, in the order the model
/// defines them.
pub trait InferenceEngine {
    /// The model this engine runs.
    type Model: MlModel;

    /// Run a single forward pass.
    ///
    /// The input has the shape returned by [`MlModel::input_shape`].
    fn infer(&mut self, input: ArrayView<'_, f32, ndarray::Ix4>) -> Result<Vec<MlArray<f32>>>;
}

/// The raw output tensors of a single inference.
#[derive(Debug, Clone)]
pub struct ModelOutputs {
    tensors: Vec<MlArray<f32>>,
}

impl ModelOutputs {
    /// Wrap the output of an engine running model `M`.
    ///
    /// # Errors
    ///
    /// Fails if the engine returned a different number of tensors than the model declares.
    pub fn new<M: MlModel>(tensors: Vec<MlArray<f32>>) -> Result<Self> {
        if tensors.len() != M::NUM_OUTPUTS {
            return Err(Error::OutputCount {
                path: M::MODEL_PATH,
                expected: M::NUM_OUTPUTS,
                found: tensors.len(),
            });
        }

        Ok(Self { tensors })
    }

    /// Number of output tensors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    /// Returns `true` if there are no output tensors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    /// View output tensor `index` with a fixed dimensionality.
    pub fn view<D: Dimension>(&self, index: usize) -> Result<ArrayView<'_, f32, D>> {
        let tensor = self
            .tensors
            .get(index)
            .ok_or(Error::MissingOutput { index })?;

        tensor
            .view()
            .into_dimensionality::<D>()
            .map_err(|source| Error::OutputRank {
                index,
                shape: tensor.shape().to_vec(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Ix2, Ix3, IxDyn};

    use super::*;

    struct TwoHeads;

    impl MlModel for TwoHeads {
        const MODEL_PATH: &'static str = "models/two_heads.tflite";
        const INPUT_WIDTH: usize = 8;
        const INPUT_HEIGHT: usize = 8;
        const NUM_OUTPUTS: usize = 2;
    }

    #[test]
    fn rejects_wrong_output_count() {
        let tensors = vec![MlArray::zeros(IxDyn(&[1, 4, 1]))];
        let err = ModelOutputs::new::<TwoHeads>(tensors).unwrap_err();

        assert!(matches!(
            err,
            Error::OutputCount {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn views_tensors_with_fixed_rank() {
        let tensors = vec![
            MlArray::zeros(IxDyn(&[1, 4, 1])),
            MlArray::zeros(IxDyn(&[1, 4, 16])),
        ];
        let outputs = ModelOutputs::new::<TwoHeads>(tensors).unwrap();

        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs.view::<Ix3>(1).unwrap().dim(), (1, 4, 16));
        assert!(matches!(
            outputs.view::<Ix2>(0),
            Err(Error::OutputRank { index: 0, .. })
        ));
        assert!(matches!(
            outputs.view::<Ix3>(2),
            Err(Error::MissingOutput { index: 2 })
        ));
    }
}
