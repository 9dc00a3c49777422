//! Error types for msld.

use thiserror::Error;

/// Result alias for msld operations.
pub type MsldResult<T> = std::result::Result<T, MsldError>;

/// Errors that can occur when building or running the line detector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MsldError {
    /// The averaging window must be an odd, positive size.
    #[error("invalid window size {window_size}: must be odd and positive")]
    InvalidWindowSize { window_size: usize },
    /// The scale list is empty.
    #[error("scale list must not be empty")]
    EmptyScales,
    /// A line length is not usable as a kernel size.
    #[error("invalid line scale {scale}: must be at least 1")]
    InvalidScale { scale: usize },
    /// A line length appears more than once in the scale list.
    #[error("duplicate line scale {scale}")]
    DuplicateScale { scale: usize },
    /// The orientation count is zero.
    #[error("orientation count must be at least 1, got {count}")]
    InvalidOrientationCount { count: usize },
    /// A detector call referenced a scale that has no mask stack.
    #[error("no line mask stack for scale {scale}")]
    UnknownScale { scale: usize },
    /// Width or height is zero or overflows.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is shorter than the described image.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Two maps that must share a shape do not.
    #[error("shape mismatch for {context}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        context: &'static str,
        expected: (usize, usize),
        got: (usize, usize),
    },
    /// The dataset cannot support ROC or threshold estimation.
    #[error("degenerate dataset: {reason}")]
    DegenerateDataset { reason: &'static str },
    /// Standardization hit a zero variance.
    #[error("degenerate statistics: {reason}")]
    DegenerateStatistics { reason: &'static str },
    /// Image decoding or encoding failed.
    #[error("image io error: {reason}")]
    ImageIo { reason: String },
}
