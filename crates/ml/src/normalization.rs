use ndarray::{Array, Array4};

use crate::error::{Error, Result};

/// Linear mapping of 8-bit RGB pixels into the value range a model expects.
///
/// The default maps `0..=255` onto `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    /// Value that a zero pixel maps to.
    pub min: f32,
    /// Value that a saturated pixel maps to.
    pub max: f32,
}

impl Default for Normalization {
    fn default() -> Self {
        Self::new(-1.0, 1.0)
    }
}

impl Normalization {
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Normalize a single channel value.
    #[inline]
    #[must_use]
    pub fn value(&self, pixel: u8) -> f32 {
        self.min + f32::from(pixel) / 255.0 * (self.max - self.min)
    }

    /// Normalize a packed RGB888 buffer into a `[1, height, width, 3]` tensor.
    ///
    /// # Errors
    ///
    /// Fails if the buffer does not hold exactly `width * height * 3` bytes.
    pub fn apply(&self, rgb: &[u8], width: usize, height: usize) -> Result<Array4<f32>> {
        let expected = width * height * 3;
        if rgb.len() != expected {
            return Err(Error::InputSize {
                width,
                height,
                expected,
                found: rgb.len(),
            });
        }

        let values = rgb.iter().map(|&p| self.value(p)).collect::<Vec<_>>();

        // the length is checked above, so the shape always matches
        Array::from_shape_vec((1, height, width, 3), values).map_err(|_| Error::InputSize {
            width,
            height,
            expected,
            found: rgb.len(),
        })
    }
}
