//! Sørensen-Dice overlap.

use crate::util::{MsldError, MsldResult};

/// Running overlap counts between a prediction and a ground truth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Overlap {
    /// Pixels set in both.
    pub intersection: u64,
    /// Pixels set in the prediction.
    pub predicted: u64,
    /// Pixels set in the ground truth.
    pub truth: u64,
}

impl Overlap {
    /// Records one pixel.
    #[inline]
    pub fn record(&mut self, truth: bool, predicted: bool) {
        self.intersection += u64::from(truth && predicted);
        self.predicted += u64::from(predicted);
        self.truth += u64::from(truth);
    }

    /// Adds the counts of another overlap.
    pub fn merge(&mut self, other: &Overlap) {
        self.intersection += other.intersection;
        self.predicted += other.predicted;
        self.truth += other.truth;
    }

    /// `2 |A ∩ B| / (|A| + |B|)`; two empty sets agree perfectly (1.0).
    pub fn dice(&self) -> f64 {
        let denom = self.predicted + self.truth;
        if denom == 0 {
            return 1.0;
        }
        2.0 * self.intersection as f64 / denom as f64
    }
}

/// Dice coefficient between two boolean maps of equal length.
pub fn dice(targets: &[bool], predictions: &[bool]) -> MsldResult<f64> {
    if targets.len() != predictions.len() {
        return Err(MsldError::ShapeMismatch {
            context: "dice",
            expected: (targets.len(), 1),
            got: (predictions.len(), 1),
        });
    }
    let mut overlap = Overlap::default();
    for (&t, &p) in targets.iter().zip(predictions) {
        overlap.record(t, p);
    }
    Ok(overlap.dice())
}
