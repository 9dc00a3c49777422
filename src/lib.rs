//! MSLD is a multi-scale line detector for blood vessels in retinal fundus
//! images.
//!
//! The detector convolves a single-channel intensity map with banks of
//! oriented line kernels at several lengths, standardizes each scale's
//! response and averages them with the intensity itself. A scalar threshold,
//! learned from labeled images by maximizing pixel accuracy along the ROC
//! curve, turns the response into a binary vessel map. Evaluation helpers
//! cover ROC/AUC, accuracy, confusion matrices and the Dice coefficient.
//!
//! Optional features: `rayon` (parallel scales, samples and convolution
//! rows), `simd` (vectorized row kernels), `image-io` (dataset loading) and
//! `tracing` (spans and events).

pub mod bank;
pub mod dataset;
pub mod detector;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod metrics;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use image::io;

pub use dataset::Sample;
pub use detector::{
    DatasetEvaluation, Msld, MsldConfig, NaiveMetrics, RocAnalysis, SampleEvaluation,
};
pub use image::channel::{extract_channel, green_inverted, Channel};
pub use image::{ImageView, OwnedImage};
pub use kernel::Border;
pub use metrics::{dice, ConfusionMatrix, RocCurve, ScoredPixels};
pub use util::{MsldError, MsldResult};
