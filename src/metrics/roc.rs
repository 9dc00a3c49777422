//! Receiver operating characteristic over flattened pixel scores.
//!
//! The curve follows the usual construction: scores are sorted in decreasing
//! order, every distinct score becomes a threshold, collinear intermediate
//! points are optionally dropped, and a leading `(0, 0)` point with an
//! infinite threshold is prepended so that the curve starts at the origin.

use crate::util::{MsldError, MsldResult};

/// ROI-restricted ground truth and scores flattened across a dataset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScoredPixels {
    /// Ground-truth vessel flags.
    pub labels: Vec<bool>,
    /// Detector responses, parallel to `labels`.
    pub scores: Vec<f32>,
}

impl ScoredPixels {
    /// Returns the number of pixels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if no pixel has been collected.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns the number of positive (vessel) pixels.
    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|&&l| l).count()
    }

    /// Returns the number of negative pixels.
    pub fn negatives(&self) -> usize {
        self.len() - self.positives()
    }

    /// Appends another accumulator.
    pub fn extend(&mut self, other: ScoredPixels) {
        self.labels.extend(other.labels);
        self.scores.extend(other.scores);
    }
}

/// ROC curve sorted by decreasing threshold.
#[derive(Clone, Debug, PartialEq)]
pub struct RocCurve {
    /// False-positive rate per threshold.
    pub fpr: Vec<f64>,
    /// True-positive rate per threshold.
    pub tpr: Vec<f64>,
    /// Score thresholds; a pixel is positive when `score >= threshold`.
    pub thresholds: Vec<f32>,
    /// Number of positive pixels.
    pub positives: usize,
    /// Number of negative pixels.
    pub negatives: usize,
}

impl RocCurve {
    /// Builds the curve from parallel labels and scores.
    ///
    /// Fails with `ShapeMismatch` if the lengths differ and with
    /// `DegenerateDataset` if either class is missing or a score is NaN.
    pub fn from_scores(
        labels: &[bool],
        scores: &[f32],
        drop_intermediate: bool,
    ) -> MsldResult<Self> {
        if labels.len() != scores.len() {
            return Err(MsldError::ShapeMismatch {
                context: "roc scores",
                expected: (labels.len(), 1),
                got: (scores.len(), 1),
            });
        }
        if labels.is_empty() {
            return Err(MsldError::DegenerateDataset {
                reason: "no pixels inside the region of interest",
            });
        }
        if scores.iter().any(|s| s.is_nan()) {
            return Err(MsldError::DegenerateDataset {
                reason: "scores contain NaN",
            });
        }

        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

        // Cumulative counts at the last index of every run of equal scores.
        let mut tps: Vec<u64> = Vec::new();
        let mut fps: Vec<u64> = Vec::new();
        let mut thresholds: Vec<f32> = Vec::new();
        let mut tp = 0u64;
        let mut fp = 0u64;
        for (rank, &idx) in order.iter().enumerate() {
            if labels[idx] {
                tp += 1;
            } else {
                fp += 1;
            }
            let last_of_run = order
                .get(rank + 1)
                .map_or(true, |&next| scores[next] != scores[idx]);
            if last_of_run {
                tps.push(tp);
                fps.push(fp);
                thresholds.push(scores[idx]);
            }
        }

        let positives = tp as usize;
        let negatives = fp as usize;
        if positives == 0 || negatives == 0 {
            return Err(MsldError::DegenerateDataset {
                reason: "both vessel and background pixels are required",
            });
        }

        if drop_intermediate && tps.len() > 2 {
            let keep = corner_points(&fps, &tps);
            tps = select(&tps, &keep);
            fps = select(&fps, &keep);
            thresholds = select(&thresholds, &keep);
        }

        let mut fpr = Vec::with_capacity(fps.len() + 1);
        let mut tpr = Vec::with_capacity(tps.len() + 1);
        let mut all_thresholds = Vec::with_capacity(thresholds.len() + 1);
        fpr.push(0.0);
        tpr.push(0.0);
        all_thresholds.push(f32::INFINITY);
        fpr.extend(fps.iter().map(|&f| f as f64 / negatives as f64));
        tpr.extend(tps.iter().map(|&t| t as f64 / positives as f64));
        all_thresholds.extend(thresholds);

        Ok(Self {
            fpr,
            tpr,
            thresholds: all_thresholds,
            positives,
            negatives,
        })
    }

    /// Builds the curve from an accumulator.
    pub fn from_pixels(pixels: &ScoredPixels, drop_intermediate: bool) -> MsldResult<Self> {
        Self::from_scores(&pixels.labels, &pixels.scores, drop_intermediate)
    }

    /// Returns the number of points on the curve.
    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    /// Returns true if the curve has no points.
    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// Area under the curve by trapezoidal integration over the FPR axis.
    pub fn auc(&self) -> f64 {
        self.fpr
            .windows(2)
            .zip(self.tpr.windows(2))
            .map(|(x, y)| (x[1] - x[0]) * (y[1] + y[0]) * 0.5)
            .sum()
    }

    /// Pixel accuracy obtained at every threshold of the curve.
    pub fn accuracies(&self) -> Vec<f64> {
        let p = self.positives as f64;
        let n = self.negatives as f64;
        self.tpr
            .iter()
            .zip(&self.fpr)
            .map(|(&tpr, &fpr)| (tpr * p + (1.0 - fpr) * n) / (p + n))
            .collect()
    }

    /// Index, threshold and accuracy of the most accurate point.
    ///
    /// Ties resolve to the first maximum, i.e. the highest threshold.
    pub fn best_accuracy(&self) -> Option<(usize, f32, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, acc) in self.accuracies().into_iter().enumerate() {
            if best.map_or(true, |(_, best_acc)| acc > best_acc) {
                best = Some((idx, acc));
            }
        }
        best.map(|(idx, acc)| (idx, self.thresholds[idx], acc))
    }
}

/// Indices whose point is not collinear with both neighbours. The first and
/// last points are always kept.
fn corner_points(fps: &[u64], tps: &[u64]) -> Vec<usize> {
    let last = fps.len() - 1;
    let mut keep = vec![0];
    for i in 1..last {
        let dfp = fps[i + 1] as i128 - 2 * fps[i] as i128 + fps[i - 1] as i128;
        let dtp = tps[i + 1] as i128 - 2 * tps[i] as i128 + tps[i - 1] as i128;
        if dfp != 0 || dtp != 0 {
            keep.push(i);
        }
    }
    keep.push(last);
    keep
}

fn select<T: Copy>(values: &[T], keep: &[usize]) -> Vec<T> {
    keep.iter().map(|&i| values[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::RocCurve;
    use crate::MsldError;

    #[test]
    fn small_curve_matches_hand_computation() {
        // Scores sorted: 0.8(+) 0.4(-) 0.35(+) 0.1(-)
        let labels = [false, false, true, true];
        let scores = [0.1f32, 0.4, 0.35, 0.8];
        let roc = RocCurve::from_scores(&labels, &scores, false).unwrap();
        assert_eq!(roc.thresholds, vec![f32::INFINITY, 0.8, 0.4, 0.35, 0.1]);
        assert_eq!(roc.tpr, vec![0.0, 0.5, 0.5, 1.0, 1.0]);
        assert_eq!(roc.fpr, vec![0.0, 0.0, 0.5, 0.5, 1.0]);
        assert!((roc.auc() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn dropping_intermediate_points_keeps_corners() {
        let labels = [true, true, true, false, false];
        let scores = [0.9f32, 0.8, 0.7, 0.2, 0.1];
        let full = RocCurve::from_scores(&labels, &scores, false).unwrap();
        let reduced = RocCurve::from_scores(&labels, &scores, true).unwrap();
        assert_eq!(full.len(), 6);
        assert_eq!(reduced.thresholds, vec![f32::INFINITY, 0.9, 0.7, 0.1]);
        assert_eq!(reduced.auc(), full.auc());
        assert_eq!(reduced.auc(), 1.0);
    }

    #[test]
    fn tied_scores_form_a_single_point() {
        let labels = [true, false, true, false];
        let scores = [0.5f32; 4];
        let roc = RocCurve::from_scores(&labels, &scores, false).unwrap();
        assert_eq!(roc.thresholds, vec![f32::INFINITY, 0.5]);
        assert_eq!(roc.auc(), 0.5);
    }

    #[test]
    fn best_accuracy_prefers_highest_threshold_on_ties() {
        let labels = [true, false];
        let scores = [0.5f32, 0.5];
        let roc = RocCurve::from_scores(&labels, &scores, false).unwrap();
        // Both points score 0.5 accuracy.
        let (idx, thr, acc) = roc.best_accuracy().unwrap();
        assert_eq!(idx, 0);
        assert_eq!(thr, f32::INFINITY);
        assert_eq!(acc, 0.5);
    }

    #[test]
    fn single_class_is_degenerate() {
        let err = RocCurve::from_scores(&[true, true], &[0.1, 0.2], true).unwrap_err();
        assert!(matches!(err, MsldError::DegenerateDataset { .. }));
        let err = RocCurve::from_scores(&[], &[], true).unwrap_err();
        assert!(matches!(err, MsldError::DegenerateDataset { .. }));
    }

    #[test]
    fn length_mismatch_is_reported() {
        let err = RocCurve::from_scores(&[true], &[0.1, 0.2], true).unwrap_err();
        assert!(matches!(err, MsldError::ShapeMismatch { .. }));
    }
}
