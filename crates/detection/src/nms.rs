use itertools::Itertools;

use crate::{
    bbox::{Bbox, ConvertBbox, Xyxy},
    candidate::RawCandidate,
};

/// Greedy non-maximum suppression.
///
/// Detections are visited by descending score, ties keep their original order.
/// Every visited detection is kept, and all remaining detections that overlap it
/// with an IoU of at least `threshold` are discarded. Selection stops once
/// `max_output` detections are kept.
///
/// Returns the indices of the kept detections, highest score first.
pub fn non_max_suppression<B>(detections: &[(B, f32)], threshold: f32, max_output: usize) -> Vec<usize>
where
    B: ConvertBbox<Xyxy>,
{
    let mut remaining = (0..detections.len())
        .sorted_by(|&a, &b| detections[b].1.total_cmp(&detections[a].1))
        .collect::<Vec<_>>();

    let mut final_indices = Vec::with_capacity(max_output.min(detections.len()));

    while !remaining.is_empty() && final_indices.len() < max_output {
        let best = remaining.remove(0);
        final_indices.push(best);

        let best_box: Bbox<Xyxy> = detections[best].0.convert();
        remaining.retain(|&i| best_box.iou(&detections[i].0) < threshold);
    }

    final_indices
}

/// Run [`non_max_suppression`] over decoded candidates.
///
/// The result holds at most `max_output` candidates, sorted by descending score.
#[must_use]
pub fn suppress(
    candidates: &[RawCandidate],
    iou_threshold: f32,
    max_output: usize,
) -> Vec<RawCandidate> {
    let boxes = candidates
        .iter()
        .map(|candidate| (candidate.bbox, candidate.score))
        .collect_vec();

    let kept = non_max_suppression(&boxes, iou_threshold, max_output)
        .into_iter()
        .map(|i| candidates[i].clone())
        .collect_vec();

    tracing::trace!(
        candidates = candidates.len(),
        kept = kept.len(),
        "suppressed overlapping candidates"
    );

    kept
}
