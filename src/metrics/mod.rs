//! Segmentation quality measures.
//!
//! Everything here works on flat slices; restricting to the region of
//! interest and flattening across a dataset happens in the detector.

mod confusion;
mod dice;
mod roc;

pub use confusion::ConfusionMatrix;
pub use dice::{dice, Overlap};
pub use roc::{RocCurve, ScoredPixels};
