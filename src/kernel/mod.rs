//! 2D convolution kernels and the convolution engine.
//!
//! Convolution is a true convolution: the kernel is flipped and its origin sits
//! at `(width / 2, height / 2)`. The input is first padded according to a
//! [`Border`] policy, then every non-zero tap adds a weighted, shifted copy of
//! the padded rows to the output. Line-detector kernels are sparse, so skipping
//! zero taps keeps the cost proportional to the line length rather than its
//! square.

use crate::image::{ImageView, OwnedImage};
use crate::util::{MsldError, MsldResult};

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(feature = "rayon")]
pub mod rayon;

/// Boundary handling applied wherever a kernel reaches past the image edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Border {
    /// Half-sample symmetric reflection: `d c b a | a b c d | d c b a`.
    #[default]
    Reflect,
    /// Edge replication: `a a a a | a b c d | d d d d`.
    Replicate,
}

impl Border {
    /// Maps a possibly out-of-range coordinate into `[0, len)`.
    pub fn map_index(self, idx: isize, len: usize) -> usize {
        let n = len as isize;
        match self {
            Border::Reflect => {
                let m = idx.rem_euclid(2 * n);
                if m < n {
                    m as usize
                } else {
                    (2 * n - 1 - m) as usize
                }
            }
            Border::Replicate => idx.clamp(0, n - 1) as usize,
        }
    }
}

/// Dense row-major 2D kernel with `f32` weights.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel2d {
    width: usize,
    height: usize,
    weights: Vec<f32>,
}

impl Kernel2d {
    /// Wraps row-major weights of exactly `width * height` elements.
    pub fn new(weights: Vec<f32>, width: usize, height: usize) -> MsldResult<Self> {
        let needed = width
            .checked_mul(height)
            .filter(|&n| n > 0)
            .ok_or(MsldError::InvalidDimensions { width, height })?;
        if weights.len() != needed {
            return Err(MsldError::BufferTooSmall {
                needed,
                got: weights.len(),
            });
        }
        Ok(Self {
            width,
            height,
            weights,
        })
    }

    /// Square averaging kernel of side `size` with every weight `1 / size²`.
    pub fn uniform(size: usize) -> MsldResult<Self> {
        let count = size
            .checked_mul(size)
            .filter(|&n| n > 0)
            .ok_or(MsldError::InvalidDimensions {
                width: size,
                height: size,
            })?;
        let w = (1.0 / count as f64) as f32;
        Self::new(vec![w; count], size, size)
    }

    /// Returns the kernel width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the kernel height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the row-major weights.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Returns the weight at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.weights.get(y * self.width + x).copied()
    }

    /// Sum of all weights, accumulated in `f64`.
    pub fn sum(&self) -> f64 {
        self.weights.iter().map(|&w| f64::from(w)).sum()
    }

    /// Rescales the kernel to unit sum.
    pub fn normalized(mut self) -> MsldResult<Self> {
        let sum = self.sum();
        if !sum.is_finite() || sum.abs() <= f64::EPSILON {
            return Err(MsldError::DegenerateStatistics {
                reason: "kernel weights sum to zero",
            });
        }
        for w in &mut self.weights {
            *w = (f64::from(*w) / sum) as f32;
        }
        Ok(self)
    }

    /// Non-zero taps as `(kx, ky, weight)` in row-major order.
    pub(crate) fn taps(&self) -> Vec<(usize, usize, f32)> {
        let mut taps = Vec::new();
        for ky in 0..self.height {
            for kx in 0..self.width {
                let w = self.weights[ky * self.width + kx];
                if w != 0.0 {
                    taps.push((kx, ky, w));
                }
            }
        }
        taps
    }
}

/// Input image padded on every side so that each kernel tap reads in bounds.
pub(crate) struct Padded {
    data: Vec<f32>,
    width: usize,
    out_width: usize,
    out_height: usize,
    kernel_width: usize,
    kernel_height: usize,
}

impl Padded {
    /// Pads `image` for kernels of size `kw x kh`.
    pub(crate) fn build(image: ImageView<'_, f32>, kw: usize, kh: usize, border: Border) -> Self {
        let (width, height) = image.dims();
        let pad_left = (kw - 1 - kw / 2) as isize;
        let pad_top = (kh - 1 - kh / 2) as isize;
        let padded_width = width + kw - 1;
        let padded_height = height + kh - 1;

        let rows: Vec<&[f32]> = image.rows().collect();
        let col_map: Vec<usize> = (0..padded_width)
            .map(|px| border.map_index(px as isize - pad_left, width))
            .collect();
        let mut data = Vec::with_capacity(padded_width * padded_height);
        for py in 0..padded_height {
            let src = rows[border.map_index(py as isize - pad_top, height)];
            data.extend(col_map.iter().map(|&sx| src[sx]));
        }

        Self {
            data,
            width: padded_width,
            out_width: width,
            out_height: height,
            kernel_width: kw,
            kernel_height: kh,
        }
    }

    /// Padded source slice feeding output row `y` for tap `(kx, ky)`.
    #[inline]
    pub(crate) fn tap_row(&self, y: usize, kx: usize, ky: usize) -> &[f32] {
        let py = y + self.kernel_height - 1 - ky;
        let start = py * self.width + (self.kernel_width - 1 - kx);
        &self.data[start..start + self.out_width]
    }

    pub(crate) fn out_width(&self) -> usize {
        self.out_width
    }

    pub(crate) fn out_height(&self) -> usize {
        self.out_height
    }

    /// Returns the kernel size `(width, height)` the padding was built for.
    pub(crate) fn kernel_dims(&self) -> (usize, usize) {
        (self.kernel_width, self.kernel_height)
    }
}

/// Accumulates `acc[i] += weight * src[i]`.
#[inline]
pub(crate) fn axpy(acc: &mut [f32], src: &[f32], weight: f32) {
    #[cfg(feature = "simd")]
    {
        simd::axpy(acc, src, weight);
    }
    #[cfg(not(feature = "simd"))]
    {
        scalar::axpy(acc, src, weight);
    }
}

/// Pointwise `acc[i] = max(acc[i], src[i])`.
#[inline]
pub(crate) fn max_assign(acc: &mut [f32], src: &[f32]) {
    #[cfg(feature = "simd")]
    {
        simd::max_assign(acc, src);
    }
    #[cfg(not(feature = "simd"))]
    {
        scalar::max_assign(acc, src);
    }
}

/// Pointwise `acc[i] -= src[i]`.
#[inline]
pub(crate) fn sub_assign(acc: &mut [f32], src: &[f32]) {
    #[cfg(feature = "simd")]
    {
        simd::sub_assign(acc, src);
    }
    #[cfg(not(feature = "simd"))]
    {
        scalar::sub_assign(acc, src);
    }
}

/// Convolves a single-channel image with `kernel`.
///
/// With `parallel` set and the `rayon` feature enabled, output rows are
/// computed on the rayon pool; the result is identical to the sequential path.
pub fn convolve(
    image: ImageView<'_, f32>,
    kernel: &Kernel2d,
    border: Border,
    parallel: bool,
) -> MsldResult<OwnedImage<f32>> {
    let padded = Padded::build(image, kernel.width(), kernel.height(), border);
    convolve_padded(&padded, kernel, parallel)
}

/// Convolves an already padded image. Kernels of one size share a padding.
pub(crate) fn convolve_padded(
    padded: &Padded,
    kernel: &Kernel2d,
    parallel: bool,
) -> MsldResult<OwnedImage<f32>> {
    let dims = (kernel.width(), kernel.height());
    if padded.kernel_dims() != dims {
        return Err(MsldError::ShapeMismatch {
            context: "padded kernel",
            expected: padded.kernel_dims(),
            got: dims,
        });
    }
    let taps = kernel.taps();

    #[cfg(feature = "rayon")]
    if parallel {
        return rayon::convolve_par(padded, &taps);
    }
    #[cfg(not(feature = "rayon"))]
    let _ = parallel;

    scalar::convolve_seq(padded, &taps)
}
