//! Utility functions for machine learning.

/// Computes the sigmoid score of the provided logit.
///
/// Large negative logits are evaluated as `exp(x) / (1 + exp(x))`, so the
/// intermediate `exp(-x)` never overflows to infinity.
#[inline]
#[must_use]
pub fn sigmoid(logit: f32) -> f32 {
    if logit >= 0.0 {
        1.0 / (1.0 + (-logit).exp())
    } else {
        let e = logit.exp();
        e / (1.0 + e)
    }
}
