//! Post-processing for anchor based single shot detectors.
//!
//! The pipeline for a single frame looks like this:
//!
//! 1. [`AnchorGrid::generate`] builds the prior boxes once, when the detector is created.
//! 2. [`decode`] turns the raw score and regression tensors into [`RawCandidate`]s.
//! 3. [`suppress`] runs greedy non-maximum suppression over the candidates.
//! 4. [`to_pixel_space`] maps the survivors back to the original image.
//!
//! All geometry up to step 4 is normalized to `[0, 1]` relative to the model input.

pub mod anchor;
pub mod bbox;
pub mod box_coder;
pub mod camera;
pub mod candidate;
mod error;
pub mod mapping;
pub mod nms;

pub use anchor::{Anchor, AnchorGrid, AnchorGridConfig};
pub use box_coder::{BOX_ROW_WIDTH, BoxCoder, decode};
pub use camera::{AngularOffset, FieldOfView, PinholeCamera};
pub use candidate::{Keypoints, Landmark, RawCandidate};
pub use error::{Error, Result};
pub use mapping::{Detection, ImageSize, PixelBox, angle_relative_to_camera, to_pixel_space};
pub use nms::{non_max_suppression, suppress};
