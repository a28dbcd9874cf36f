use detection::BOX_ROW_WIDTH;
use mimir::{
    BlazeFace, Error, FaceDetectionConfig, FaceDetector, FieldOfView, Frame, ImageSize, PixelBox,
};
use ml::{InferenceEngine, MlArray, MlModel};
use ndarray::{Array3, Array4, ArrayView, Ix4};

const ANCHORS: usize = 896;

/// Index of the first anchor of the cell at (`x`, `y`) on the 16x16 feature map.
const fn stride_8_anchor(x: usize, y: usize) -> usize {
    // two anchors per cell, the configured aspect ratio and the interpolated one
    (y * 16 + x) * 2
}

/// An engine that returns the same tensors for every frame.
struct CannedEngine {
    outputs: Vec<MlArray<f32>>,
    last_input: Option<Array4<f32>>,
}

impl CannedEngine {
    fn new(scores: Array3<f32>, boxes: Array3<f32>) -> Self {
        Self {
            outputs: vec![scores.into_dyn(), boxes.into_dyn()],
            last_input: None,
        }
    }

    /// Every anchor is confidently background.
    fn background() -> (Array3<f32>, Array3<f32>) {
        (
            Array3::from_elem((1, ANCHORS, 1), -10.0),
            Array3::zeros((1, ANCHORS, BOX_ROW_WIDTH)),
        )
    }
}

impl InferenceEngine for CannedEngine {
    type Model = BlazeFace;

    fn infer(&mut self, input: ArrayView<'_, f32, Ix4>) -> ml::Result<Vec<MlArray<f32>>> {
        self.last_input = Some(input.to_owned());
        Ok(self.outputs.clone())
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn black_frame() -> Vec<u8> {
    vec![0; BlazeFace::INPUT_WIDTH * BlazeFace::INPUT_HEIGHT * 3]
}

#[test]
fn detects_and_suppresses_faces() {
    init_tracing();

    let (mut scores, mut boxes) = CannedEngine::background();
    let center = stride_8_anchor(8, 8);

    // two predictions of the same face in the top left corner, and one in the center
    for (row, logit) in [(0, 5.0), (1, 4.0), (center, 6.0)] {
        scores[[0, row, 0]] = logit;
        boxes[[0, row, 2]] = 32.0;
        boxes[[0, row, 3]] = 32.0;
    }

    let mut detector =
        FaceDetector::new(FaceDetectionConfig::default(), CannedEngine::new(scores, boxes)).unwrap();

    let pixels = black_frame();
    let frame = Frame {
        original: ImageSize::new(256, 256),
        ..Frame::at_model_resolution(&pixels)
    };
    let faces = detector.detect(frame).unwrap();

    assert_eq!(faces.len(), 2);

    // highest confidence first, the anchor center is at 8.5 / 16 of the image
    assert!(faces[0].confidence > faces[1].confidence);
    assert_eq!(
        faces[0].bbox,
        PixelBox {
            x: 104,
            y: 104,
            width: 64,
            height: 64
        }
    );
    assert_eq!(faces[0].nose().x, 136);
    assert_eq!(faces[0].left_ear().y, 136);

    // the top left face sticks out of the image
    assert_eq!(
        faces[1].bbox,
        PixelBox {
            x: -24,
            y: -24,
            width: 64,
            height: 64
        }
    );

    // 8 pixels right of and below the image center
    let angles = faces[0].angle_relative_to_camera(ImageSize::new(256, 256), detector.field_of_view());
    assert!(angles.x_degrees > 2.0 && angles.x_degrees < 3.0);
    assert!(angles.y_degrees > 1.5 && angles.y_degrees < 2.5);
    // same offset, narrower vertical field of view
    assert!(angles.x_degrees > angles.y_degrees);
}

#[test]
fn engine_receives_normalized_input() {
    let (scores, boxes) = CannedEngine::background();
    let mut detector =
        FaceDetector::new(FaceDetectionConfig::default(), CannedEngine::new(scores, boxes)).unwrap();

    let mut pixels = black_frame();
    pixels[0] = 255;
    pixels[1] = 255;
    pixels[2] = 255;

    let faces = detector.detect(Frame::at_model_resolution(&pixels)).unwrap();
    assert!(faces.is_empty());

    let input = detector.engine().last_input.as_ref().unwrap();
    assert_eq!(input.shape(), BlazeFace::input_shape());
    assert_eq!(input[[0, 0, 0, 0]], 1.0);
    assert_eq!(input[[0, 0, 0, 2]], 1.0);
    assert_eq!(input[[0, 0, 1, 0]], -1.0);
    assert_eq!(input[[0, 127, 127, 2]], -1.0);
}

#[test]
fn output_is_bounded_by_max_detections() {
    let (mut scores, mut boxes) = CannedEngine::background();

    // a small face in every other cell of the first row, none of them overlap
    for x in (0..16).step_by(2) {
        let row = stride_8_anchor(x, 0);
        scores[[0, row, 0]] = 3.0 + x as f32 / 16.0;
        boxes[[0, row, 2]] = 4.0;
        boxes[[0, row, 3]] = 4.0;
    }

    let config = FaceDetectionConfig {
        max_detections: 3,
        ..FaceDetectionConfig::default()
    };
    let mut detector = FaceDetector::new(config, CannedEngine::new(scores, boxes)).unwrap();

    let pixels = black_frame();
    let faces = detector.detect(Frame::at_model_resolution(&pixels)).unwrap();

    assert_eq!(faces.len(), 3);
    assert!(faces.windows(2).all(|w| w[0].confidence >= w[1].confidence));
    // the rightmost face has the highest score
    assert!(faces[0].bbox.x > faces[1].bbox.x);
}

#[test]
fn rejects_frames_at_other_resolutions() {
    let (scores, boxes) = CannedEngine::background();
    let mut detector =
        FaceDetector::new(FaceDetectionConfig::default(), CannedEngine::new(scores, boxes)).unwrap();

    let pixels = vec![0; 64 * 64 * 3];
    let frame = Frame {
        pixels: &pixels,
        width: 64,
        height: 64,
        original: ImageSize::new(64, 64),
    };

    assert!(matches!(
        detector.detect(frame),
        Err(Error::InputResolution {
            width: 64,
            height: 64,
            expected_width: 128,
            expected_height: 128,
        })
    ));
}

#[test]
fn rejects_output_that_does_not_match_the_anchors() {
    let scores = Array3::zeros((1, ANCHORS - 1, 1));
    let boxes = Array3::zeros((1, ANCHORS - 1, BOX_ROW_WIDTH));
    let mut detector =
        FaceDetector::new(FaceDetectionConfig::default(), CannedEngine::new(scores, boxes)).unwrap();

    let pixels = black_frame();
    let error = detector
        .detect(Frame::at_model_resolution(&pixels))
        .unwrap_err();

    assert!(matches!(
        error,
        Error::Detection(detection::Error::ScoreCount {
            scores: 895,
            anchors: 896
        })
    ));
    assert!(!error.is_configuration());
}

#[test]
fn rejects_missing_outputs() {
    let (scores, _) = CannedEngine::background();
    let engine = CannedEngine {
        outputs: vec![scores.into_dyn()],
        last_input: None,
    };
    let mut detector = FaceDetector::new(FaceDetectionConfig::default(), engine).unwrap();

    let pixels = black_frame();

    assert!(matches!(
        detector.detect(Frame::at_model_resolution(&pixels)),
        Err(Error::Ml(ml::Error::OutputCount {
            expected: 2,
            found: 1,
            ..
        }))
    ));
}

#[test]
fn invalid_anchor_config_fails_construction() {
    let (scores, boxes) = CannedEngine::background();
    let mut config = FaceDetectionConfig::default();
    config.anchors.num_layers = 3;

    let Err(error) = FaceDetector::new(config, CannedEngine::new(scores, boxes)) else {
        panic!("detector was created from an invalid config");
    };

    assert!(error.is_configuration());
    assert!(matches!(
        error,
        Error::Detection(detection::Error::StrideCount {
            strides: 4,
            num_layers: 3
        })
    ));
}

#[test]
fn anchors_for_another_input_size_fail_construction() {
    let (scores, boxes) = CannedEngine::background();
    let mut config = FaceDetectionConfig::default();
    // still 896 anchors, but scaled for a 256x256 input
    config.anchors.input_width = 256;
    config.anchors.input_height = 256;
    config.anchors.strides = vec![16, 32, 32, 32];

    let Err(error) = FaceDetector::new(config, CannedEngine::new(scores, boxes)) else {
        panic!("detector was created for the wrong input size");
    };

    assert!(error.is_configuration());
    assert!(matches!(
        error,
        Error::AnchorInputSize {
            anchor_width: 256,
            anchor_height: 256,
            model_width: 128,
            model_height: 128,
        }
    ));
}

#[test]
fn config_overlay_is_applied() {
    use odal::Config;

    let temp_dir = tempfile::tempdir().unwrap();
    let main_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../config");
    std::fs::write(
        temp_dir.path().join(FaceDetectionConfig::PATH),
        "score_threshold = 0.5\n\n[camera]\nhfov_degrees = 90.0\n",
    )
    .unwrap();

    let config = FaceDetectionConfig::load_with_optional_overlay(main_dir, temp_dir.path()).unwrap();

    assert_eq!(config.score_threshold, 0.5);
    assert_eq!(
        config.camera,
        FieldOfView {
            hfov_degrees: 90.0,
            vfov_degrees: 55.6
        }
    );
    assert_eq!(config.anchors, FaceDetectionConfig::default().anchors);
}
