//! Multi-scale line detector for retinal vessel segmentation.
//!
//! `Msld` owns an immutable configuration and mask bank plus one piece of
//! mutable state, the segmentation threshold. Filtering (`bld`, `combine`,
//! `segment`) only borrows the detector; `learn_threshold` needs `&mut self`,
//! so concurrent learning and segmentation on one instance is ruled out by
//! the borrow checker.
//!
//! All image inputs are single-channel intensity maps with vessels bright.
//! For RGB fundus photographs use [`crate::image::channel::green_inverted`]
//! or [`crate::Sample::from_rgb`] first.

use crate::bank::{validate_geometry, MaskBank};
use crate::image::{ImageView, OwnedImage};
use crate::kernel::Border;
use crate::trace::trace_span;
use crate::util::MsldResult;

mod bld;
mod combine;
mod evaluate;
mod threshold;

pub use bld::standardize;
pub use evaluate::{DatasetEvaluation, NaiveMetrics, RocAnalysis, SampleEvaluation};
pub use threshold::select_threshold;

/// Detector configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct MsldConfig {
    /// Side of the square averaging window; odd.
    pub window_size: usize,
    /// Line lengths, one mask stack each; distinct.
    pub scales: Vec<usize>,
    /// Number of line orientations over the half circle.
    pub orientations: usize,
    /// Boundary handling for every convolution.
    pub border: Border,
    /// Run scales, samples and convolution rows on the rayon pool when the
    /// `rayon` feature is enabled. Ignored otherwise.
    pub parallel: bool,
}

impl Default for MsldConfig {
    fn default() -> Self {
        Self {
            window_size: 15,
            scales: vec![3, 5, 7, 9, 11, 13, 15],
            orientations: 12,
            border: Border::Reflect,
            parallel: false,
        }
    }
}

impl MsldConfig {
    /// Creates a configuration with the default border and no parallelism.
    pub fn new(window_size: usize, scales: Vec<usize>, orientations: usize) -> Self {
        Self {
            window_size,
            scales,
            orientations,
            ..Self::default()
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> MsldResult<()> {
        validate_geometry(self.window_size, &self.scales, self.orientations)
    }
}

/// Multi-scale line detector with a learnable threshold.
#[derive(Clone, Debug)]
pub struct Msld {
    cfg: MsldConfig,
    bank: MaskBank,
    threshold: f32,
}

impl Msld {
    /// Threshold used until one is learned or set.
    pub const DEFAULT_THRESHOLD: f32 = 0.5;

    /// Builds the mask bank for `cfg`.
    pub fn new(cfg: MsldConfig) -> MsldResult<Self> {
        let _span = trace_span!(
            "msld_new",
            window_size = cfg.window_size,
            scales = cfg.scales.len(),
            orientations = cfg.orientations
        )
        .entered();
        cfg.validate()?;
        let bank = MaskBank::build(cfg.window_size, &cfg.scales, cfg.orientations)?;
        Ok(Self {
            cfg,
            bank,
            threshold: Self::DEFAULT_THRESHOLD,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &MsldConfig {
        &self.cfg
    }

    /// Returns the mask bank.
    pub fn bank(&self) -> &MaskBank {
        &self.bank
    }

    /// Returns the segmentation threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Overrides the segmentation threshold.
    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
    }

    /// Builder-style variant of [`Msld::set_threshold`].
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Binary vessel map: `true` where the combined response reaches the
    /// threshold.
    pub fn segment(&self, image: ImageView<'_, f32>) -> MsldResult<OwnedImage<bool>> {
        let response = self.combine(image)?;
        self.apply_threshold(&response)
    }

    pub(crate) fn apply_threshold(
        &self,
        response: &OwnedImage<f32>,
    ) -> MsldResult<OwnedImage<bool>> {
        let threshold = self.threshold;
        let data = response.data().iter().map(|&v| v >= threshold).collect();
        OwnedImage::new(data, response.width(), response.height())
    }
}
