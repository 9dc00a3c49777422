//! Binary confusion matrix.

use crate::util::{MsldError, MsldResult};

/// Pixel counts laid out as `[[TN, FP], [FN, TP]]`.
///
/// Rows are ground truth (negative, positive), columns are predictions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_negatives: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
    pub true_positives: u64,
}

impl ConfusionMatrix {
    /// Counts agreements between parallel truth and prediction slices.
    pub fn from_slices(truth: &[bool], predicted: &[bool]) -> MsldResult<Self> {
        if truth.len() != predicted.len() {
            return Err(MsldError::ShapeMismatch {
                context: "confusion matrix",
                expected: (truth.len(), 1),
                got: (predicted.len(), 1),
            });
        }
        let mut cm = Self::default();
        for (&t, &p) in truth.iter().zip(predicted) {
            cm.record(t, p);
        }
        Ok(cm)
    }

    /// Records one pixel.
    #[inline]
    pub fn record(&mut self, truth: bool, predicted: bool) {
        match (truth, predicted) {
            (false, false) => self.true_negatives += 1,
            (false, true) => self.false_positives += 1,
            (true, false) => self.false_negatives += 1,
            (true, true) => self.true_positives += 1,
        }
    }

    /// Adds the counts of another matrix.
    pub fn merge(&mut self, other: &ConfusionMatrix) {
        self.true_negatives += other.true_negatives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
        self.true_positives += other.true_positives;
    }

    /// Number of ground-truth positive pixels.
    pub fn positives(&self) -> u64 {
        self.false_negatives + self.true_positives
    }

    /// Number of ground-truth negative pixels.
    pub fn negatives(&self) -> u64 {
        self.true_negatives + self.false_positives
    }

    /// Total number of pixels.
    pub fn total(&self) -> u64 {
        self.positives() + self.negatives()
    }

    /// Raw counts `[[TN, FP], [FN, TP]]`.
    pub fn counts(&self) -> [[u64; 2]; 2] {
        [
            [self.true_negatives, self.false_positives],
            [self.false_negatives, self.true_positives],
        ]
    }

    /// Counts divided by the size of their ground-truth class, so that each
    /// row sums to 1: `[[TN/N, FP/N], [FN/P, TP/P]]`. A class with no pixels
    /// yields a zero row.
    pub fn normalized_per_class(&self) -> [[f64; 2]; 2] {
        let n = self.negatives();
        let p = self.positives();
        [
            [ratio(self.true_negatives, n), ratio(self.false_positives, n)],
            [ratio(self.false_negatives, p), ratio(self.true_positives, p)],
        ]
    }

    /// Counts divided by the total pixel count; all four cells sum to 1.
    pub fn normalized_total(&self) -> [[f64; 2]; 2] {
        let total = self.total();
        [
            [
                ratio(self.true_negatives, total),
                ratio(self.false_positives, total),
            ],
            [
                ratio(self.false_negatives, total),
                ratio(self.true_positives, total),
            ],
        ]
    }

    /// Fraction of correctly classified pixels, `0.0` when empty.
    pub fn accuracy(&self) -> f64 {
        ratio(self.true_negatives + self.true_positives, self.total())
    }
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

#[cfg(test)]
mod tests {
    use super::ConfusionMatrix;

    #[test]
    fn counts_and_normalizations_are_consistent() {
        let truth = [true, true, true, false, false];
        let predicted = [true, false, true, true, false];
        let cm = ConfusionMatrix::from_slices(&truth, &predicted).unwrap();
        assert_eq!(cm.counts(), [[1, 1], [1, 2]]);
        assert_eq!(cm.positives(), 3);
        assert_eq!(cm.negatives(), 2);
        assert!((cm.accuracy() - 0.6).abs() < 1e-12);

        let per_class = cm.normalized_per_class();
        assert!((per_class[0][0] + per_class[0][1] - 1.0).abs() < 1e-12);
        assert!((per_class[1][0] + per_class[1][1] - 1.0).abs() < 1e-12);
        assert!((per_class[1][1] - 2.0 / 3.0).abs() < 1e-12);

        let total: f64 = cm.normalized_total().iter().flatten().sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn missing_class_gives_zero_row() {
        let cm = ConfusionMatrix::from_slices(&[false, false], &[false, true]).unwrap();
        assert_eq!(cm.normalized_per_class()[1], [0.0, 0.0]);
        assert_eq!(cm.normalized_per_class()[0], [0.5, 0.5]);
    }
}
