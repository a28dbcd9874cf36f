use itertools::izip;
use ml::util::sigmoid;
use nalgebra::{Point2, point};
use ndarray::{ArrayView1, ArrayView2};
use strum::EnumCount;

use crate::{
    anchor::{Anchor, AnchorGrid},
    bbox::{Bbox, ConvertBbox},
    candidate::{Keypoints, Landmark, RawCandidate},
    error::{Error, Result},
};

/// Number of values in a single row of the box regression output:
/// four box offsets followed by an `(x, y)` offset for every [`Landmark`].
pub const BOX_ROW_WIDTH: usize = 4 + 2 * Landmark::COUNT;

/// Utility that decodes bounding boxes and keypoints from the regression format output by the model.
///
/// The model predicts offsets in input pixels relative to the center of the
/// anchor, box sizes are predicted directly in input pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxCoder {
    /// Width of the model input in pixels.
    pub input_width: f32,
    /// Height of the model input in pixels.
    pub input_height: f32,
}

impl BoxCoder {
    /// Create a new [`BoxCoder`] for a model with the given input size.
    #[must_use]
    pub fn new(input_width: f32, input_height: f32) -> Self {
        BoxCoder {
            input_width,
            input_height,
        }
    }

    /// Create a [`BoxCoder`] matching the input size of an anchor grid.
    #[must_use]
    pub fn for_grid(grid: &AnchorGrid) -> Self {
        Self::new(grid.input_width() as f32, grid.input_height() as f32)
    }

    /// Decode a pixel offset relative to the anchor center into a normalized point.
    #[inline]
    fn decode_point(&self, anchor: &Anchor, dx: f32, dy: f32) -> Point2<f32> {
        point![
            (dx + anchor.x_center * self.input_width) / self.input_width,
            (dy + anchor.y_center * self.input_height) / self.input_height
        ]
    }

    /// Decode a single regression row, see [`BOX_ROW_WIDTH`] for the layout.
    ///
    /// The row must hold at least [`BOX_ROW_WIDTH`] values, [`decode`] checks this
    /// before decoding any row.
    #[must_use]
    pub(crate) fn decode_row(&self, anchor: &Anchor, row: ArrayView1<f32>, score: f32) -> RawCandidate {
        let center = self.decode_point(anchor, row[0], row[1]);
        let width = row[2] / self.input_width;
        let height = row[3] / self.input_height;

        let keypoints = Keypoints::new(std::array::from_fn(|i| {
            self.decode_point(anchor, row[4 + 2 * i], row[4 + 2 * i + 1])
        }));

        RawCandidate {
            bbox: Bbox::cxcywh(center.x, center.y, width, height).convert(),
            score,
            keypoints,
        }
    }
}

/// Decode the raw model output into candidates.
///
/// `scores` holds one logit per anchor and `boxes` one regression row per anchor.
/// Rows whose probability is below `score_threshold` are dropped, the remaining
/// candidates keep the row order of the model output.
///
/// # Errors
///
/// Fails if the number of rows does not match the anchor grid, or if the box rows
/// are not [`BOX_ROW_WIDTH`] values wide.
pub fn decode(
    scores: ArrayView1<f32>,
    boxes: ArrayView2<f32>,
    grid: &AnchorGrid,
    score_threshold: f32,
) -> Result<Vec<RawCandidate>> {
    if scores.len() != grid.len() {
        return Err(Error::ScoreCount {
            scores: scores.len(),
            anchors: grid.len(),
        });
    }

    let (rows, row_width) = boxes.dim();
    if rows != grid.len() {
        return Err(Error::BoxCount {
            boxes: rows,
            anchors: grid.len(),
        });
    }

    if row_width != BOX_ROW_WIDTH {
        return Err(Error::BoxRowWidth {
            expected: BOX_ROW_WIDTH,
            found: row_width,
        });
    }

    let coder = BoxCoder::for_grid(grid);

    let candidates = izip!(scores.iter(), boxes.rows(), grid.iter())
        .filter_map(|(&logit, row, anchor)| {
            let score = sigmoid(logit);
            (score >= score_threshold).then(|| coder.decode_row(anchor, row, score))
        })
        .collect::<Vec<_>>();

    tracing::trace!(
        rows,
        candidates = candidates.len(),
        score_threshold,
        "decoded candidates"
    );

    Ok(candidates)
}
