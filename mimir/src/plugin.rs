use bevy::prelude::*;
use detection::AnchorGrid;

use crate::{config::FaceDetectionConfig, error::Result};

/// Makes the face detection config and its anchor grid available as resources.
///
/// The anchor grid is generated when the plugin is created, so an invalid config
/// is reported before the app is built.
pub struct FaceDetectionPlugin {
    config: FaceDetectionConfig,
    anchors: AnchorGrid,
}

impl FaceDetectionPlugin {
    pub fn new(config: FaceDetectionConfig) -> Result<Self> {
        let anchors = AnchorGrid::generate(&config.anchors)?;

        Ok(Self { config, anchors })
    }
}

impl Plugin for FaceDetectionPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            .insert_resource(self.anchors.clone());
    }
}
