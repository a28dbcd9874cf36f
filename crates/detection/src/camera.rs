use nalgebra::{Point2, Vector2, point, vector};
use serde::{Deserialize, Serialize};

use crate::mapping::ImageSize;

/// Field of view of the camera that captured the image, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldOfView {
    pub hfov_degrees: f32,
    pub vfov_degrees: f32,
}

impl Default for FieldOfView {
    fn default() -> Self {
        Self {
            hfov_degrees: 70.8,
            vfov_degrees: 55.6,
        }
    }
}

/// Angular offset of a point from the optical axis, in degrees.
///
/// Positive `x` is to the right of the image center, positive `y` is below it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngularOffset {
    pub x_degrees: f32,
    pub y_degrees: f32,
}

/// A pinhole camera with square pixels and no lens distortion.
///
/// This is accurate enough to turn a face position into a coarse head tracking
/// direction, not for calibrated measurements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinholeCamera {
    /// The optical center of the camera in the image plane, in pixels.
    pub optical_center: Point2<f32>,
    /// The focal lengths of the camera in pixels.
    pub focal_lengths: Vector2<f32>,
}

impl PinholeCamera {
    /// Derive the camera from the image size and its field of view.
    ///
    /// The optical center is assumed to be in the middle of the image.
    #[must_use]
    pub fn from_field_of_view(image_size: ImageSize, fov: FieldOfView) -> Self {
        let optical_center = point![
            image_size.width as f32 / 2.0,
            image_size.height as f32 / 2.0
        ];

        let focal_lengths = vector![
            optical_center.x / (fov.hfov_degrees / 2.0).to_radians().tan(),
            optical_center.y / (fov.vfov_degrees / 2.0).to_radians().tan()
        ];

        Self {
            optical_center,
            focal_lengths,
        }
    }

    /// Angle between the optical axis and the ray through `pixel`, per image axis.
    #[must_use]
    pub fn pixel_to_angles(&self, pixel: Point2<f32>) -> AngularOffset {
        let offset = pixel - self.optical_center;

        AngularOffset {
            x_degrees: (offset.x / self.focal_lengths.x).atan().to_degrees(),
            y_degrees: (offset.y / self.focal_lengths.y).atan().to_degrees(),
        }
    }
}
