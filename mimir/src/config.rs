use detection::{AnchorGridConfig, FieldOfView};
use odal::Config;
use serde::{Deserialize, Serialize};

/// Configuration of the face detector, stored in `face_detection.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(bevy::prelude::Resource))]
#[serde(deny_unknown_fields)]
pub struct FaceDetectionConfig {
    /// Minimum probability of a candidate to be considered a face.
    pub score_threshold: f32,
    /// Candidates that overlap a better face by at least this IoU are discarded.
    pub iou_threshold: f32,
    /// Maximum number of faces returned per frame.
    pub max_detections: usize,
    /// Field of view of the camera, used for angle queries.
    pub camera: FieldOfView,
    /// Anchor layout the model was trained with.
    pub anchors: AnchorGridConfig,
}

impl Config for FaceDetectionConfig {
    const PATH: &'static str = "face_detection.toml";
}

impl Default for FaceDetectionConfig {
    fn default() -> Self {
        Self {
            score_threshold: 0.7,
            iou_threshold: 0.3,
            max_detections: 8,
            camera: FieldOfView::default(),
            anchors: AnchorGridConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_config_matches_default() {
        let main_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../config");

        let config = FaceDetectionConfig::load(main_dir).unwrap();

        assert_eq!(config, FaceDetectionConfig::default());
    }
}
