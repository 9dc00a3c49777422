//! Dataset-level evaluation restricted to each sample's region of interest.

use crate::dataset::Sample;
use crate::detector::Msld;
use crate::image::OwnedImage;
use crate::metrics::{ConfusionMatrix, Overlap, RocCurve, ScoredPixels};
use crate::trace::{trace_event, trace_span};
use crate::util::{MsldError, MsldResult};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// ROC curve together with the pixels it was computed from.
#[derive(Clone, Debug)]
pub struct RocAnalysis {
    /// Curve ordered by decreasing threshold.
    pub curve: RocCurve,
    /// ROI-restricted labels and scores across the dataset.
    pub pixels: ScoredPixels,
}

impl RocAnalysis {
    /// Area under the curve.
    pub fn auc(&self) -> f64 {
        self.curve.auc()
    }
}

/// Accuracy and confusion matrix at the stored threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NaiveMetrics {
    /// Fraction of ROI pixels classified correctly.
    pub accuracy: f64,
    /// Confusion matrix normalized per ground-truth class (rows sum to 1).
    pub normalized: [[f64; 2]; 2],
    /// Raw counts.
    pub counts: ConfusionMatrix,
}

/// Segmentation and ROI counts of one sample.
#[derive(Clone, Debug)]
pub struct SampleEvaluation {
    /// Thresholded combined response over the whole image.
    pub segmentation: OwnedImage<bool>,
    /// Confusion counts inside the region of interest.
    pub counts: ConfusionMatrix,
    /// Overlap counts inside the region of interest.
    pub overlap: Overlap,
}

impl SampleEvaluation {
    /// Dice coefficient of this sample.
    pub fn dice(&self) -> f64 {
        self.overlap.dice()
    }
}

/// Every dataset metric, computed from one filtering pass per sample.
#[derive(Clone, Debug)]
pub struct DatasetEvaluation {
    /// ROC curve of the combined response.
    pub roc: RocAnalysis,
    /// Accuracy and confusion matrix at the stored threshold.
    pub metrics: NaiveMetrics,
    /// Dice coefficient pooled over all ROI pixels.
    pub dice: f64,
    /// Per-sample results in dataset order.
    pub samples: Vec<SampleEvaluation>,
}

impl Msld {
    /// Combined responses and labels of every ROI pixel of `dataset`,
    /// concatenated in dataset order.
    pub fn score_pixels(&self, dataset: &[Sample]) -> MsldResult<ScoredPixels> {
        let per_sample = self.map_samples(dataset, |sample| {
            let response = self.combine(sample.image())?;
            Ok(roi_scores(sample, &response))
        })?;

        let mut all = ScoredPixels::default();
        for pixels in per_sample {
            all.extend(pixels);
        }
        Ok(all)
    }

    /// ROC curve of the combined response over the ROI pixels of `dataset`.
    pub fn roc(&self, dataset: &[Sample]) -> MsldResult<RocAnalysis> {
        let _span = trace_span!("roc", samples = dataset.len()).entered();
        let pixels = self.score_pixels(dataset)?;
        let curve = RocCurve::from_pixels(&pixels, true)?;
        trace_event!(
            "roc_computed",
            pixels = pixels.len(),
            points = curve.len(),
            auc = curve.auc()
        );
        Ok(RocAnalysis { curve, pixels })
    }

    /// Area under the ROC curve over `dataset`.
    pub fn auc(&self, dataset: &[Sample]) -> MsldResult<f64> {
        Ok(self.roc(dataset)?.auc())
    }

    /// Accuracy and confusion matrix of the thresholded segmentation.
    pub fn naive_metrics(&self, dataset: &[Sample]) -> MsldResult<NaiveMetrics> {
        let _span = trace_span!("naive_metrics", samples = dataset.len()).entered();
        let per_sample = self.map_samples(dataset, |sample| {
            let predicted = self.segment(sample.image())?;
            let mut cm = ConfusionMatrix::default();
            for_each_roi_pixel(sample, &predicted, |truth, pred| cm.record(truth, pred));
            Ok(cm)
        })?;

        let mut counts = ConfusionMatrix::default();
        for cm in &per_sample {
            counts.merge(cm);
        }
        Ok(NaiveMetrics {
            accuracy: counts.accuracy(),
            normalized: counts.normalized_per_class(),
            counts,
        })
    }

    /// Dice coefficient between the thresholded segmentation and the labels,
    /// pooled over the ROI pixels of `dataset`.
    pub fn dice(&self, dataset: &[Sample]) -> MsldResult<f64> {
        let per_sample = self.map_samples(dataset, |sample| {
            let predicted = self.segment(sample.image())?;
            let mut overlap = Overlap::default();
            for_each_roi_pixel(sample, &predicted, |truth, pred| overlap.record(truth, pred));
            Ok(overlap)
        })?;

        let mut total = Overlap::default();
        for overlap in &per_sample {
            total.merge(overlap);
        }
        Ok(total.dice())
    }

    /// ROC, accuracy, confusion matrix, pooled and per-sample Dice, and the
    /// segmentations, with `combine` run once per sample.
    ///
    /// The results equal those of [`Msld::roc`], [`Msld::naive_metrics`],
    /// [`Msld::dice`] and [`Msld::segment`].
    pub fn evaluate(&self, dataset: &[Sample]) -> MsldResult<DatasetEvaluation> {
        let _span = trace_span!("evaluate", samples = dataset.len()).entered();
        let per_sample = self.map_samples(dataset, |sample| {
            let response = self.combine(sample.image())?;
            let segmentation = self.apply_threshold(&response)?;
            let mut counts = ConfusionMatrix::default();
            let mut overlap = Overlap::default();
            for_each_roi_pixel(sample, &segmentation, |truth, pred| {
                counts.record(truth, pred);
                overlap.record(truth, pred);
            });
            let evaluation = SampleEvaluation {
                segmentation,
                counts,
                overlap,
            };
            Ok((roi_scores(sample, &response), evaluation))
        })?;

        let mut pixels = ScoredPixels::default();
        let mut counts = ConfusionMatrix::default();
        let mut overlap = Overlap::default();
        let mut samples = Vec::with_capacity(per_sample.len());
        for (sample_pixels, evaluation) in per_sample {
            pixels.extend(sample_pixels);
            counts.merge(&evaluation.counts);
            overlap.merge(&evaluation.overlap);
            samples.push(evaluation);
        }

        let curve = RocCurve::from_pixels(&pixels, true)?;
        trace_event!(
            "evaluated",
            pixels = pixels.len(),
            auc = curve.auc(),
            accuracy = counts.accuracy()
        );
        Ok(DatasetEvaluation {
            roc: RocAnalysis { curve, pixels },
            metrics: NaiveMetrics {
                accuracy: counts.accuracy(),
                normalized: counts.normalized_per_class(),
                counts,
            },
            dice: overlap.dice(),
            samples,
        })
    }

    /// Applies `f` to every sample, on the rayon pool when enabled. Results
    /// keep dataset order.
    fn map_samples<T, F>(&self, dataset: &[Sample], f: F) -> MsldResult<Vec<T>>
    where
        T: Send,
        F: Fn(&Sample) -> MsldResult<T> + Sync + Send,
    {
        if dataset.is_empty() {
            return Err(MsldError::DegenerateDataset {
                reason: "empty dataset",
            });
        }

        #[cfg(feature = "rayon")]
        if self.cfg.parallel {
            return dataset.par_iter().map(f).collect();
        }

        dataset.iter().map(f).collect()
    }
}

fn roi_scores(sample: &Sample, response: &OwnedImage<f32>) -> ScoredPixels {
    let mut pixels = ScoredPixels::default();
    let mask = sample.mask().data();
    let label = sample.label().data();
    for ((&m, &l), &s) in mask.iter().zip(label).zip(response.data()) {
        if m {
            pixels.labels.push(l);
            pixels.scores.push(s);
        }
    }
    pixels
}

fn for_each_roi_pixel(
    sample: &Sample,
    predicted: &OwnedImage<bool>,
    mut f: impl FnMut(bool, bool),
) {
    let mask = sample.mask().data();
    let label = sample.label().data();
    for ((&m, &truth), &pred) in mask.iter().zip(label).zip(predicted.data()) {
        if m {
            f(truth, pred);
        }
    }
}
