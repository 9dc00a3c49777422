//! Low-level building blocks for custom line-detection pipelines.
//!
//! These expose the mask construction, convolution and statistics steps that
//! `Msld` composes. Most users should prefer the top-level `Msld` API.

pub use crate::bank::{
    base_line_kernel, rotate_kernel, LineMaskStack, MaskBank, OrientationGrid,
};
pub use crate::detector::{select_threshold, standardize};
pub use crate::kernel::{convolve, Kernel2d};
pub use crate::metrics::Overlap;
