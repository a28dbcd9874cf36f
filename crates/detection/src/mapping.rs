//! Mapping normalized detections back to the original image.

use nalgebra::{Point2, point};
use serde::{Deserialize, Serialize};

use crate::{
    camera::{AngularOffset, FieldOfView, PinholeCamera},
    candidate::{Keypoints, RawCandidate},
};

/// Size of an image in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// An axis aligned box in pixel coordinates, top-left corner with width and height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelBox {
    /// The center of the box, in (fractional) pixels.
    #[must_use]
    pub fn center(&self) -> Point2<f32> {
        point![
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0
        ]
    }
}

/// A face detected in the original image.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// The face box in pixels.
    pub bbox: PixelBox,
    /// Probability of this being a face.
    pub confidence: f32,
    /// Facial keypoints in pixels.
    pub keypoints: Keypoints<i32>,
}

impl Detection {
    #[must_use]
    pub fn left_eye(&self) -> Point2<i32> {
        self.keypoints.left_eye()
    }

    #[must_use]
    pub fn right_eye(&self) -> Point2<i32> {
        self.keypoints.right_eye()
    }

    #[must_use]
    pub fn nose(&self) -> Point2<i32> {
        self.keypoints.nose()
    }

    #[must_use]
    pub fn mouth(&self) -> Point2<i32> {
        self.keypoints.mouth()
    }

    #[must_use]
    pub fn left_ear(&self) -> Point2<i32> {
        self.keypoints.left_ear()
    }

    #[must_use]
    pub fn right_ear(&self) -> Point2<i32> {
        self.keypoints.right_ear()
    }

    /// See [`angle_relative_to_camera`].
    #[must_use]
    pub fn angle_relative_to_camera(&self, image_size: ImageSize, fov: FieldOfView) -> AngularOffset {
        angle_relative_to_camera(self, image_size, fov)
    }
}

/// Scale a normalized coordinate to pixels, truncating towards zero.
#[inline]
fn to_pixel(value: f32, size: u32) -> i32 {
    (value * size as f32) as i32
}

/// Map normalized candidates to pixel coordinates of an image with size `image_size`.
///
/// Coordinates are truncated towards zero. Negative box sizes are clamped to zero,
/// so zero-area boxes can come out of this, but they are not removed.
#[must_use]
pub fn to_pixel_space(candidates: &[RawCandidate], image_size: ImageSize) -> Vec<Detection> {
    let ImageSize { width, height } = image_size;

    candidates
        .iter()
        .map(|candidate| {
            let (x, y, w, h) = candidate.bbox.inner;

            Detection {
                bbox: PixelBox {
                    x: to_pixel(x, width),
                    y: to_pixel(y, height),
                    width: to_pixel(w, width).max(0),
                    height: to_pixel(h, height).max(0),
                },
                confidence: candidate.score,
                keypoints: candidate
                    .keypoints
                    .map(|p| point![to_pixel(p.x, width), to_pixel(p.y, height)]),
            }
        })
        .collect()
}

/// Compute the angle between the optical axis and the center of the detected face.
///
/// `image_size` must be the size of the image the detection was mapped to.
#[must_use]
pub fn angle_relative_to_camera(
    detection: &Detection,
    image_size: ImageSize,
    fov: FieldOfView,
) -> AngularOffset {
    PinholeCamera::from_field_of_view(image_size, fov).pixel_to_angles(detection.bbox.center())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::{Bbox, Xywh};

    fn candidate(bbox: Bbox<Xywh>) -> RawCandidate {
        RawCandidate {
            bbox,
            score: 0.9,
            keypoints: Keypoints::new(std::array::from_fn(|i| {
                point![0.125 * i as f32, 0.0625 * i as f32]
            })),
        }
    }

    #[test]
    fn model_resolution_is_a_plain_rescale() {
        let candidates = [candidate(Bbox::xywh(0.25, 0.5, 0.125, 0.25))];

        let detections = to_pixel_space(&candidates, ImageSize::new(128, 128));
        let detection = &detections[0];

        assert_eq!(
            detection.bbox,
            PixelBox {
                x: 32,
                y: 64,
                width: 16,
                height: 32
            }
        );
        assert_eq!(detection.confidence, 0.9);
        assert_eq!(detection.left_eye(), point![0, 0]);
        assert_eq!(detection.nose(), point![32, 16]);
        assert_eq!(detection.right_ear(), point![80, 40]);
    }

    #[test]
    fn coordinates_are_truncated() {
        let candidates = [candidate(Bbox::xywh(0.1, -0.15, 0.3, 0.3))];

        let detections = to_pixel_space(&candidates, ImageSize::new(100, 50));
        let detection = &detections[0];

        // -7.5 becomes -7, not -8
        assert_eq!(detection.bbox.x, 10);
        assert_eq!(detection.bbox.y, -7);
        assert_eq!(detection.bbox.width, 30);
        assert_eq!(detection.bbox.height, 15);
    }

    #[test]
    fn negative_sizes_are_clamped() {
        let candidates = [candidate(Bbox::xywh(0.5, 0.5, -0.1, 0.0))];

        let detections = to_pixel_space(&candidates, ImageSize::new(64, 64));
        let detection = &detections[0];

        assert_eq!(detection.bbox.width, 0);
        assert_eq!(detection.bbox.height, 0);
    }

    #[test]
    fn centered_detection_has_zero_angle() {
        let size = ImageSize::new(128, 128);
        let detections = to_pixel_space(&[candidate(Bbox::xywh(0.25, 0.25, 0.5, 0.5))], size);
        let detection = &detections[0];

        for fov in [
            FieldOfView::default(),
            FieldOfView {
                hfov_degrees: 120.0,
                vfov_degrees: 10.0,
            },
        ] {
            let angles = detection.angle_relative_to_camera(size, fov);
            assert_eq!(angles.x_degrees, 0.0);
            assert_eq!(angles.y_degrees, 0.0);
        }
    }

    #[test]
    fn off_center_detection_points_right_and_down() {
        let size = ImageSize::new(320, 240);
        let detections = to_pixel_space(&[candidate(Bbox::xywh(0.75, 0.75, 0.125, 0.125))], size);

        let angles = angle_relative_to_camera(&detections[0], size, FieldOfView::default());

        assert!(angles.x_degrees > 0.0);
        assert!(angles.y_degrees > 0.0);
        assert!(angles.x_degrees < 35.4);
        assert!(angles.y_degrees < 27.8);
    }
}
