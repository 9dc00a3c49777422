//! Scalar reference implementations of the per-row kernels.

use crate::image::OwnedImage;
use crate::kernel::{self, Padded};
use crate::util::MsldResult;

/// Accumulates `acc[i] += weight * src[i]`.
#[inline]
pub fn axpy(acc: &mut [f32], src: &[f32], weight: f32) {
    for (a, &s) in acc.iter_mut().zip(src) {
        *a += weight * s;
    }
}

/// Pointwise `acc[i] = max(acc[i], src[i])`.
#[inline]
pub fn max_assign(acc: &mut [f32], src: &[f32]) {
    for (a, &s) in acc.iter_mut().zip(src) {
        if s > *a {
            *a = s;
        }
    }
}

/// Pointwise `acc[i] -= src[i]`.
#[inline]
pub fn sub_assign(acc: &mut [f32], src: &[f32]) {
    for (a, &s) in acc.iter_mut().zip(src) {
        *a -= s;
    }
}

/// Fills one output row from the padded input.
#[inline]
pub(crate) fn convolve_row(padded: &Padded, taps: &[(usize, usize, f32)], y: usize, out: &mut [f32]) {
    out.fill(0.0);
    for &(kx, ky, w) in taps {
        kernel::axpy(out, padded.tap_row(y, kx, ky), w);
    }
}

/// Sequential convolution over all output rows.
pub(crate) fn convolve_seq(
    padded: &Padded,
    taps: &[(usize, usize, f32)],
) -> MsldResult<OwnedImage<f32>> {
    let width = padded.out_width();
    let height = padded.out_height();
    let mut out = vec![0.0f32; width * height];
    for (y, row) in out.chunks_exact_mut(width).enumerate() {
        convolve_row(padded, taps, y, row);
    }
    OwnedImage::new(out, width, height)
}
