//! Axis aligned boxes, tagged with the layout of their four coordinates.
//!
//! The model predicts boxes by their center, suppression compares them by their
//! corners, and consumers want the top-left corner with a size. Tagging the layout
//! in the type keeps these from being mixed up.
//!
//! ```
//! use detection::bbox::*;
//!
//! let predicted = Bbox::cxcywh(0.5, 0.5, 0.25, 0.5);
//! let top_left: Bbox<Xywh> = predicted.convert();
//!
//! assert_eq!(top_left.inner, (0.375, 0.25, 0.25, 0.5));
//! ```

use std::marker::PhantomData;

use nalgebra::{Point2, point};

/// Corner coordinates, `(x_min, y_min, x_max, y_max)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Xyxy;

/// Top-left corner with a size, `(x, y, width, height)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Xywh;

/// Center with a size, `(center_x, center_y, width, height)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cxcywh;

/// A box with coordinates in the layout `F`, one of [`Xyxy`], [`Xywh`] or [`Cxcywh`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bbox<F> {
    pub inner: (f32, f32, f32, f32),
    format: PhantomData<F>,
}

impl<F> Bbox<F> {
    const fn from_inner(inner: (f32, f32, f32, f32)) -> Self {
        Self {
            inner,
            format: PhantomData,
        }
    }
}

impl Bbox<Xyxy> {
    #[must_use]
    pub const fn xyxy(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        Self::from_inner((x_min, y_min, x_max, y_max))
    }

    #[must_use]
    pub fn min(&self) -> Point2<f32> {
        point![self.inner.0, self.inner.1]
    }

    #[must_use]
    pub fn max(&self) -> Point2<f32> {
        point![self.inner.2, self.inner.3]
    }
}

impl Bbox<Xywh> {
    #[must_use]
    pub const fn xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::from_inner((x, y, width, height))
    }

    /// Multiply the horizontal coordinates by `sx` and the vertical ones by `sy`.
    #[must_use]
    pub fn scaled(&self, sx: f32, sy: f32) -> Self {
        let (x, y, width, height) = self.inner;
        Self::xywh(x * sx, y * sy, width * sx, height * sy)
    }
}

impl Bbox<Cxcywh> {
    #[must_use]
    pub const fn cxcywh(center_x: f32, center_y: f32, width: f32, height: f32) -> Self {
        Self::from_inner((center_x, center_y, width, height))
    }
}

/// Conversion of a box into the layout `F`.
pub trait ConvertBbox<F> {
    fn convert(&self) -> Bbox<F>;
}

impl<F: Copy> ConvertBbox<F> for Bbox<F> {
    fn convert(&self) -> Bbox<F> {
        *self
    }
}

impl ConvertBbox<Xyxy> for Bbox<Xywh> {
    fn convert(&self) -> Bbox<Xyxy> {
        let (x, y, width, height) = self.inner;
        Bbox::xyxy(x, y, x + width, y + height)
    }
}

impl ConvertBbox<Xywh> for Bbox<Xyxy> {
    fn convert(&self) -> Bbox<Xywh> {
        let (x_min, y_min, x_max, y_max) = self.inner;
        Bbox::xywh(x_min, y_min, x_max - x_min, y_max - y_min)
    }
}

impl ConvertBbox<Xyxy> for Bbox<Cxcywh> {
    fn convert(&self) -> Bbox<Xyxy> {
        let (center_x, center_y, width, height) = self.inner;
        let (half_width, half_height) = (width / 2.0, height / 2.0);

        Bbox::xyxy(
            center_x - half_width,
            center_y - half_height,
            center_x + half_width,
            center_y + half_height,
        )
    }
}

// computed directly, so the size is not rounded through the corners
impl ConvertBbox<Xywh> for Bbox<Cxcywh> {
    fn convert(&self) -> Bbox<Xywh> {
        let (center_x, center_y, width, height) = self.inner;
        Bbox::xywh(center_x - width / 2.0, center_y - height / 2.0, width, height)
    }
}

/// Area of a box given by its corners, zero if it is empty.
fn corner_area(min: Point2<f32>, max: Point2<f32>) -> f32 {
    let size = max - min;

    if size.x <= 0.0 || size.y <= 0.0 {
        0.0
    } else {
        size.x * size.y
    }
}

impl<F> Bbox<F>
where
    Bbox<F>: ConvertBbox<Xyxy>,
{
    #[must_use]
    pub fn area(&self) -> f32 {
        let corners: Bbox<Xyxy> = self.convert();
        corner_area(corners.min(), corners.max())
    }

    /// Area of the overlap with `other`.
    ///
    /// Boxes that are disjoint or only share an edge have an intersection of exactly `0.0`.
    pub fn intersection(&self, other: &impl ConvertBbox<Xyxy>) -> f32 {
        let a: Bbox<Xyxy> = self.convert();
        let b: Bbox<Xyxy> = other.convert();

        corner_area(a.min().sup(&b.min()), a.max().inf(&b.max()))
    }

    /// Area covered by either `self` or `other`.
    pub fn union(&self, other: &impl ConvertBbox<Xyxy>) -> f32 {
        let other_corners: Bbox<Xyxy> = other.convert();
        self.area() + other_corners.area() - self.intersection(other)
    }

    /// Intersection over union with `other`.
    ///
    /// This is exactly `0.0` when the boxes do not overlap, which includes any
    /// pair involving an empty box.
    pub fn iou(&self, other: &impl ConvertBbox<Xyxy>) -> f32 {
        let intersection = self.intersection(other);
        if intersection == 0.0 {
            return 0.0;
        }

        intersection / self.union(other)
    }
}
