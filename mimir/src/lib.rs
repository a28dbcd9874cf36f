//! Face detection on camera frames.
//!
//! A [`FaceDetector`] wraps an external [`InferenceEngine`](ml::InferenceEngine)
//! running the [`BlazeFace`] model, and turns its raw output into ranked
//! [`Detection`]s in pixel coordinates of the original image.
//!
//! ## Example
//! ```no_run
//! # fn run<E: ml::InferenceEngine<Model = mimir::BlazeFace>>(engine: E, pixels: &[u8]) -> miette::Result<()> {
//! use mimir::{FaceDetectionConfig, FaceDetector, Frame};
//! use odal::Config;
//!
//! let config = FaceDetectionConfig::load_with_optional_overlay("config", "config/overlay/robot")?;
//! let mut detector = FaceDetector::new(config, engine)?;
//!
//! for face in detector.detect(Frame::at_model_resolution(pixels))? {
//!     let angles = face.angle_relative_to_camera(
//!         mimir::ImageSize::new(128, 128),
//!         detector.field_of_view(),
//!     );
//!     println!("face at {:?}, {:.1} degrees to the right", face.bbox, angles.x_degrees);
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod detector;
mod error;
#[cfg(feature = "bevy")]
mod plugin;

pub use config::FaceDetectionConfig;
pub use detector::{BlazeFace, FaceDetector, Frame};
pub use error::{Error, Result};
#[cfg(feature = "bevy")]
pub use plugin::FaceDetectionPlugin;

pub use detection::{AngularOffset, Detection, FieldOfView, ImageSize, Landmark, PixelBox};
