//! Decoded detections, before suppression.

use nalgebra::{Point2, Scalar};
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

use crate::bbox::{Bbox, Xywh};

/// A facial landmark predicted alongside every face box.
///
/// The declaration order is the order in which the model emits the keypoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Landmark {
    LeftEye,
    RightEye,
    Nose,
    Mouth,
    LeftEar,
    RightEar,
}

impl Landmark {
    /// Position of this landmark in the model output.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// The six facial keypoints of a face, indexed by [`Landmark`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoints<T: Scalar>([Point2<T>; Landmark::COUNT]);

impl<T: Scalar + Copy> Keypoints<T> {
    #[must_use]
    pub fn new(points: [Point2<T>; Landmark::COUNT]) -> Self {
        Self(points)
    }

    #[must_use]
    pub fn get(&self, landmark: Landmark) -> Point2<T> {
        self.0[landmark.index()]
    }

    #[must_use]
    pub fn left_eye(&self) -> Point2<T> {
        self.get(Landmark::LeftEye)
    }

    #[must_use]
    pub fn right_eye(&self) -> Point2<T> {
        self.get(Landmark::RightEye)
    }

    #[must_use]
    pub fn nose(&self) -> Point2<T> {
        self.get(Landmark::Nose)
    }

    #[must_use]
    pub fn mouth(&self) -> Point2<T> {
        self.get(Landmark::Mouth)
    }

    #[must_use]
    pub fn left_ear(&self) -> Point2<T> {
        self.get(Landmark::LeftEar)
    }

    #[must_use]
    pub fn right_ear(&self) -> Point2<T> {
        self.get(Landmark::RightEar)
    }

    /// Iterate over the keypoints together with their landmark, in model order.
    pub fn iter(&self) -> impl Iterator<Item = (Landmark, Point2<T>)> + '_ {
        Landmark::iter().zip(self.0.iter().copied())
    }

    /// Apply `f` to every keypoint.
    #[must_use]
    pub fn map<U: Scalar + Copy>(&self, f: impl FnMut(Point2<T>) -> Point2<U>) -> Keypoints<U> {
        Keypoints(self.0.map(f))
    }
}

/// A decoded detection before non-maximum suppression.
///
/// All coordinates are normalized to `[0, 1]` relative to the model input.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCandidate {
    /// The face box, top-left corner with width and height.
    pub bbox: Bbox<Xywh>,
    /// Probability of this being a face, after the sigmoid.
    pub score: f32,
    /// The facial keypoints.
    pub keypoints: Keypoints<f32>,
}
