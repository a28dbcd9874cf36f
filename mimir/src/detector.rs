use detection::{AnchorGrid, Detection, FieldOfView, ImageSize, decode, suppress, to_pixel_space};
use ml::{InferenceEngine, MlModel, ModelOutputs, Normalization};
use ndarray::{ArrayView2, Axis, ErrorKind, Ix3, ShapeError};

use crate::{
    config::FaceDetectionConfig,
    error::{Error, Result},
};

/// The front facing `BlazeFace` short range face detector.
///
/// Outputs, in order:
/// - scores, `[1, N, 1]` raw logits
/// - boxes, `[1, N, 16]` box and keypoint offsets in input pixels
pub struct BlazeFace;

impl MlModel for BlazeFace {
    const MODEL_PATH: &'static str = "models/face_detection_front.tflite";
    const INPUT_WIDTH: usize = 128;
    const INPUT_HEIGHT: usize = 128;
    const NUM_OUTPUTS: usize = 2;
}

const SCORES_OUTPUT: usize = 0;
const BOXES_OUTPUT: usize = 1;

/// A single camera frame, prepared for the detector.
///
/// The pixels must already be resized to the model input resolution, `original`
/// is the size of the image the detections should be mapped back to.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Packed RGB888 pixels, row major.
    pub pixels: &'a [u8],
    /// Width of `pixels`.
    pub width: usize,
    /// Height of `pixels`.
    pub height: usize,
    /// Size of the image the frame was taken from.
    pub original: ImageSize,
}

impl<'a> Frame<'a> {
    /// A frame that was captured at the model resolution.
    #[must_use]
    pub fn at_model_resolution(pixels: &'a [u8]) -> Self {
        Self {
            pixels,
            width: BlazeFace::INPUT_WIDTH,
            height: BlazeFace::INPUT_HEIGHT,
            original: ImageSize::new(BlazeFace::INPUT_WIDTH as u32, BlazeFace::INPUT_HEIGHT as u32),
        }
    }
}

/// Detects faces in frames using an external inference engine.
///
/// The anchor grid is generated once on construction, every call to
/// [`FaceDetector::detect`] is independent of the previous ones.
pub struct FaceDetector<E> {
    config: FaceDetectionConfig,
    anchors: AnchorGrid,
    normalization: Normalization,
    engine: E,
}

impl<E: InferenceEngine<Model = BlazeFace>> FaceDetector<E> {
    /// Create a detector that runs `engine`.
    ///
    /// # Errors
    ///
    /// Fails if the anchor configuration is invalid, or if it describes a different
    /// input size than the model takes.
    pub fn new(config: FaceDetectionConfig, engine: E) -> Result<Self> {
        let (anchor_width, anchor_height) = (config.anchors.input_width, config.anchors.input_height);
        if anchor_width != BlazeFace::INPUT_WIDTH || anchor_height != BlazeFace::INPUT_HEIGHT {
            return Err(Error::AnchorInputSize {
                anchor_width,
                anchor_height,
                model_width: BlazeFace::INPUT_WIDTH,
                model_height: BlazeFace::INPUT_HEIGHT,
            });
        }

        let anchors = AnchorGrid::generate(&config.anchors)?;

        tracing::debug!(
            anchors = anchors.len(),
            model = BlazeFace::MODEL_PATH,
            "initialized face detector"
        );

        Ok(Self {
            config,
            anchors,
            normalization: Normalization::default(),
            engine,
        })
    }

    #[must_use]
    pub fn config(&self) -> &FaceDetectionConfig {
        &self.config
    }

    #[must_use]
    pub fn anchors(&self) -> &AnchorGrid {
        &self.anchors
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Field of view to use for [`Detection::angle_relative_to_camera`].
    #[must_use]
    pub fn field_of_view(&self) -> FieldOfView {
        self.config.camera
    }

    /// Detect the faces in `frame`.
    ///
    /// The result holds at most `max_detections` faces in pixel coordinates of
    /// the original image, sorted by descending confidence.
    ///
    /// # Errors
    ///
    /// Fails if the frame is not at the model resolution, if the engine fails, or if
    /// the model output does not match the anchor grid.
    pub fn detect(&mut self, frame: Frame<'_>) -> Result<Vec<Detection>> {
        let _span = tracing::debug_span!("face_detection").entered();

        if frame.width != BlazeFace::INPUT_WIDTH || frame.height != BlazeFace::INPUT_HEIGHT {
            return Err(Error::InputResolution {
                width: frame.width,
                height: frame.height,
                expected_width: BlazeFace::INPUT_WIDTH,
                expected_height: BlazeFace::INPUT_HEIGHT,
            });
        }

        let input = self
            .normalization
            .apply(frame.pixels, frame.width, frame.height)?;
        let outputs = ModelOutputs::new::<BlazeFace>(self.engine.infer(input.view())?)?;

        let scores = first_batch(&outputs, SCORES_OUTPUT)?;
        let (rows, columns) = scores.dim();
        let scores = scores
            .into_shape_with_order(rows * columns)
            .map_err(|source| ml::Error::OutputRank {
                index: SCORES_OUTPUT,
                shape: vec![1, rows, columns],
                source,
            })?;
        let boxes = first_batch(&outputs, BOXES_OUTPUT)?;

        let candidates = decode(scores, boxes, &self.anchors, self.config.score_threshold)?;
        let kept = suppress(
            &candidates,
            self.config.iou_threshold,
            self.config.max_detections,
        );
        let detections = to_pixel_space(&kept, frame.original);

        tracing::debug!(
            candidates = candidates.len(),
            detections = detections.len(),
            "detected faces"
        );

        Ok(detections)
    }
}

/// View output `index` without its batch dimension.
fn first_batch(outputs: &ModelOutputs, index: usize) -> Result<ArrayView2<'_, f32>> {
    let tensor = outputs.view::<Ix3>(index)?;

    if tensor.len_of(Axis(0)) == 0 {
        return Err(ml::Error::OutputRank {
            index,
            shape: tensor.shape().to_vec(),
            source: ShapeError::from_kind(ErrorKind::OutOfBounds),
        }
        .into());
    }

    Ok(tensor.index_axis_move(Axis(0), 0))
}
