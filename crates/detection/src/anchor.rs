//! Anchor (prior box) generation for single shot detectors.
//!
//! The grid follows the SSD anchor scheme used by the mediapipe face detectors:
//! a scale is interpolated per layer, layers that share a stride are merged into a
//! single feature map, and every feature map cell emits one anchor per
//! (aspect ratio, scale) pair of its group.

use std::ops::Deref;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Scale of the first anchor of the lowest layer when [`AnchorGridConfig::reduce_boxes_in_lowest_layer`]
/// is set.
const LOWEST_LAYER_SMALL_SCALE: f32 = 0.1;

/// A prior box, normalized to `[0, 1]` relative to the model input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub x_center: f32,
    pub y_center: f32,
    pub width: f32,
    pub height: f32,
}

/// Options for generating an [`AnchorGrid`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnchorGridConfig {
    /// Width of the model input in pixels.
    pub input_width: usize,
    /// Height of the model input in pixels.
    pub input_height: usize,
    /// Scale of the first layer.
    pub min_scale: f32,
    /// Scale of the last layer.
    pub max_scale: f32,
    /// Number of output feature maps to generate anchors on.
    pub num_layers: usize,
    /// Stride of each layer, must have `num_layers` entries.
    pub strides: Vec<usize>,
    /// Explicit feature map widths per layer.
    ///
    /// When empty, the width is computed as `ceil(input_width / stride)`.
    #[serde(default)]
    pub feature_map_widths: Vec<usize>,
    /// Explicit feature map heights per layer.
    ///
    /// When empty, the height is computed as `ceil(input_height / stride)`.
    #[serde(default)]
    pub feature_map_heights: Vec<usize>,
    /// Aspect ratios (width / height) emitted for every layer.
    #[serde(default = "default_aspect_ratios")]
    pub aspect_ratios: Vec<f32>,
    /// Horizontal offset of the anchor center, in cells.
    #[serde(default = "default_anchor_offset")]
    pub anchor_offset_x: f32,
    /// Vertical offset of the anchor center, in cells.
    #[serde(default = "default_anchor_offset")]
    pub anchor_offset_y: f32,
    /// Use a fixed set of three anchors on the lowest layer.
    #[serde(default)]
    pub reduce_boxes_in_lowest_layer: bool,
    /// Aspect ratio of an extra anchor whose scale is interpolated between this
    /// layer and the next one. A value of `0.0` disables the extra anchor.
    #[serde(default = "default_interpolated_scale_aspect_ratio")]
    pub interpolated_scale_aspect_ratio: f32,
    /// Give every anchor a width and height of `1.0`.
    #[serde(default)]
    pub fixed_anchor_size: bool,
}

fn default_aspect_ratios() -> Vec<f32> {
    vec![1.0]
}

fn default_anchor_offset() -> f32 {
    0.5
}

fn default_interpolated_scale_aspect_ratio() -> f32 {
    1.0
}

impl Default for AnchorGridConfig {
    /// The anchors of the front facing `BlazeFace` model, 896 anchors for a 128x128 input.
    fn default() -> Self {
        Self {
            input_width: 128,
            input_height: 128,
            min_scale: 0.148_437_5,
            max_scale: 0.75,
            num_layers: 4,
            strides: vec![8, 16, 16, 16],
            feature_map_widths: Vec::new(),
            feature_map_heights: Vec::new(),
            aspect_ratios: default_aspect_ratios(),
            anchor_offset_x: default_anchor_offset(),
            anchor_offset_y: default_anchor_offset(),
            reduce_boxes_in_lowest_layer: false,
            interpolated_scale_aspect_ratio: default_interpolated_scale_aspect_ratio(),
            fixed_anchor_size: false,
        }
    }
}

impl AnchorGridConfig {
    /// Check that the options describe a grid that can be generated.
    pub fn validate(&self) -> Result<()> {
        if self.strides.len() != self.num_layers {
            tracing::warn!(
                strides = self.strides.len(),
                num_layers = self.num_layers,
                "stride count does not match layer count"
            );
            return Err(Error::StrideCount {
                strides: self.strides.len(),
                num_layers: self.num_layers,
            });
        }

        if self.num_layers == 0 {
            return Err(Error::NoLayers);
        }

        let explicit_sizes =
            !self.feature_map_widths.is_empty() || !self.feature_map_heights.is_empty();

        if explicit_sizes
            && (self.feature_map_widths.len() != self.num_layers
                || self.feature_map_heights.len() != self.num_layers)
        {
            return Err(Error::FeatureMapCount {
                widths: self.feature_map_widths.len(),
                heights: self.feature_map_heights.len(),
                num_layers: self.num_layers,
            });
        }

        if !explicit_sizes {
            if let Some(layer) = self.strides.iter().position(|&stride| stride == 0) {
                return Err(Error::ZeroStride { layer });
            }
        }

        Ok(())
    }

    /// Scale of `layer`, linearly interpolated between `min_scale` and `max_scale`
    /// over the layer index.
    ///
    /// A grid with a single layer uses `min_scale`.
    #[must_use]
    pub fn layer_scale(&self, layer: usize) -> f32 {
        let num_strides = self.strides.len();
        if num_strides <= 1 {
            return self.min_scale;
        }

        self.min_scale
            + (self.max_scale - self.min_scale) * layer as f32 / (num_strides - 1) as f32
    }

    /// The `(aspect_ratio, scale)` pairs contributed by a single layer.
    fn layer_shapes(&self, layer: usize) -> Vec<(f32, f32)> {
        let scale = self.layer_scale(layer);

        if layer == 0 && self.reduce_boxes_in_lowest_layer {
            return vec![
                (1.0, LOWEST_LAYER_SMALL_SCALE),
                (2.0, scale),
                (0.5, scale),
            ];
        }

        let mut shapes = self
            .aspect_ratios
            .iter()
            .map(|&aspect_ratio| (aspect_ratio, scale))
            .collect::<Vec<_>>();

        if self.interpolated_scale_aspect_ratio > 0.0 {
            let scale_next = if layer == self.strides.len() - 1 {
                1.0
            } else {
                self.layer_scale(layer + 1)
            };

            shapes.push((
                self.interpolated_scale_aspect_ratio,
                (scale * scale_next).sqrt(),
            ));
        }

        shapes
    }

    /// Number of feature maps, layers sharing a stride with the previous layer are
    /// merged into its feature map.
    #[must_use]
    pub fn layer_groups(&self) -> usize {
        self.strides.iter().dedup().count()
    }

    /// Feature map size `(width, height)` of the group starting at `layer`.
    fn feature_map_size(&self, layer: usize) -> (usize, usize) {
        if self.feature_map_heights.is_empty() {
            let stride = self.strides[layer];
            (
                self.input_width.div_ceil(stride),
                self.input_height.div_ceil(stride),
            )
        } else {
            (
                self.feature_map_widths[layer],
                self.feature_map_heights[layer],
            )
        }
    }

    /// Width and height of an anchor with the given aspect ratio and scale.
    fn anchor_size(&self, aspect_ratio: f32, scale: f32) -> (f32, f32) {
        if self.fixed_anchor_size {
            return (1.0, 1.0);
        }

        let ratio_sqrt = aspect_ratio.sqrt();
        (scale * ratio_sqrt, scale / ratio_sqrt)
    }
}

/// Generate the anchors described by `config`, in the row order of the model output.
///
/// Anchors are emitted per group of layers sharing a stride, iterating over the
/// feature map rows, then the columns, then the (aspect ratio, scale) pairs of the group.
///
/// # Errors
///
/// Fails if the config is invalid, see [`AnchorGridConfig::validate`].
pub fn generate(config: &AnchorGridConfig) -> Result<Vec<Anchor>> {
    config.validate()?;

    let num_strides = config.strides.len();
    let mut anchors = Vec::new();
    let mut layer = 0;

    while layer < num_strides {
        let stride = config.strides[layer];

        // layers sharing a stride are merged into a single feature map
        let group_end = layer
            + config.strides[layer..]
                .iter()
                .take_while(|&&s| s == stride)
                .count();

        let sizes = (layer..group_end)
            .flat_map(|l| config.layer_shapes(l))
            .map(|(aspect_ratio, scale)| config.anchor_size(aspect_ratio, scale))
            .collect::<Vec<_>>();

        let (grid_width, grid_height) = config.feature_map_size(layer);

        tracing::trace!(
            layers = ?(layer..group_end),
            grid_width,
            grid_height,
            anchors_per_cell = sizes.len(),
            "adding anchor group"
        );

        anchors.reserve(grid_width * grid_height * sizes.len());
        for y in 0..grid_height {
            let y_center = (y as f32 + config.anchor_offset_y) / grid_height as f32;
            for x in 0..grid_width {
                let x_center = (x as f32 + config.anchor_offset_x) / grid_width as f32;
                anchors.extend(sizes.iter().map(|&(width, height)| Anchor {
                    x_center,
                    y_center,
                    width,
                    height,
                }));
            }
        }

        layer = group_end;
    }

    Ok(anchors)
}

/// The immutable anchor table of a detector.
///
/// Row `i` of the model output belongs to anchor `i`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "bevy", derive(bevy::prelude::Resource))]
pub struct AnchorGrid {
    anchors: Vec<Anchor>,
    input_width: usize,
    input_height: usize,
}

impl AnchorGrid {
    /// Generate the anchor grid for `config`.
    ///
    /// # Errors
    ///
    /// Fails if the config is invalid, see [`AnchorGridConfig::validate`].
    pub fn generate(config: &AnchorGridConfig) -> Result<Self> {
        let anchors = generate(config)?;

        tracing::info!(
            anchors = anchors.len(),
            layer_groups = config.layer_groups(),
            input_width = config.input_width,
            input_height = config.input_height,
            "generated anchor grid"
        );

        Ok(Self {
            anchors,
            input_width: config.input_width,
            input_height: config.input_height,
        })
    }

    /// Create a grid from precomputed anchors.
    #[must_use]
    pub fn from_anchors(anchors: Vec<Anchor>, input_width: usize, input_height: usize) -> Self {
        Self {
            anchors,
            input_width,
            input_height,
        }
    }

    /// Width of the model input the anchors are generated for.
    #[must_use]
    pub fn input_width(&self) -> usize {
        self.input_width
    }

    /// Height of the model input the anchors are generated for.
    #[must_use]
    pub fn input_height(&self) -> usize {
        self.input_height
    }
}

impl Deref for AnchorGrid {
    type Target = [Anchor];

    fn deref(&self) -> &[Anchor] {
        &self.anchors
    }
}
