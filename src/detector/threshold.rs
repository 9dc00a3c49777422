//! Accuracy-maximizing threshold selection.

use crate::dataset::Sample;
use crate::detector::Msld;
use crate::metrics::RocCurve;
use crate::trace::{trace_event, trace_span};
use crate::util::{MsldError, MsldResult};

impl Msld {
    /// Learns the threshold with the best pixel accuracy on `dataset` and
    /// stores it on the detector.
    ///
    /// Returns `(threshold, accuracy)`. When several thresholds reach the
    /// same accuracy the highest one is kept. Fails with `DegenerateDataset`
    /// on an empty dataset, an empty region of interest or a single class.
    pub fn learn_threshold(&mut self, dataset: &[Sample]) -> MsldResult<(f32, f64)> {
        let _span = trace_span!("learn_threshold", samples = dataset.len()).entered();
        let analysis = self.roc(dataset)?;
        let (threshold, accuracy) = select_threshold(&analysis.curve)?;
        self.threshold = threshold;
        trace_event!(
            "threshold_learned",
            threshold = threshold,
            accuracy = accuracy
        );
        Ok((threshold, accuracy))
    }
}

/// Threshold and accuracy at the most accurate point of `curve`.
///
/// Accuracy at each point is `(tpr * P + (1 - fpr) * N) / (P + N)`. The curve
/// is ordered by decreasing threshold and the first maximum wins.
pub fn select_threshold(curve: &RocCurve) -> MsldResult<(f32, f64)> {
    if curve.positives == 0 || curve.negatives == 0 {
        return Err(MsldError::DegenerateDataset {
            reason: "both vessel and background pixels are required",
        });
    }
    curve
        .best_accuracy()
        .map(|(_, threshold, accuracy)| (threshold, accuracy))
        .ok_or(MsldError::DegenerateDataset {
            reason: "empty roc curve",
        })
}

#[cfg(test)]
mod tests {
    use super::select_threshold;
    use crate::metrics::RocCurve;

    #[test]
    fn separable_scores_give_perfect_accuracy() {
        let labels = [false, false, false, true, true];
        let scores = [0.1f32, 0.2, 0.3, 0.7, 0.9];
        let roc = RocCurve::from_scores(&labels, &scores, true).unwrap();
        let (threshold, accuracy) = select_threshold(&roc).unwrap();
        assert_eq!(threshold, 0.7);
        assert_eq!(accuracy, 1.0);
    }

    #[test]
    fn imbalanced_classes_can_favor_rejecting_everything() {
        // One noisy positive among many negatives: predicting all negative wins.
        let mut labels = vec![false; 9];
        labels.push(true);
        let mut scores: Vec<f32> = (0..9).map(|i| i as f32 / 10.0).collect();
        scores.push(0.05);
        let roc = RocCurve::from_scores(&labels, &scores, false).unwrap();
        let (threshold, accuracy) = select_threshold(&roc).unwrap();
        assert_eq!(threshold, f32::INFINITY);
        assert!((accuracy - 0.9).abs() < 1e-12);
    }
}
