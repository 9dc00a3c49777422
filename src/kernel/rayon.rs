//! Rayon-parallel convolution (feature-gated).
//!
//! Output rows are independent, so each worker fills whole rows with the
//! same per-row routine as the sequential path.

use crate::image::OwnedImage;
use crate::kernel::scalar::convolve_row;
use crate::kernel::Padded;
use crate::util::MsldResult;
use rayon::prelude::*;

/// Row-parallel convolution over all output rows.
pub(crate) fn convolve_par(
    padded: &Padded,
    taps: &[(usize, usize, f32)],
) -> MsldResult<OwnedImage<f32>> {
    let width = padded.out_width();
    let height = padded.out_height();
    let mut out = vec![0.0f32; width * height];
    out.par_chunks_exact_mut(width)
        .enumerate()
        .for_each(|(y, row)| convolve_row(padded, taps, y, row));
    OwnedImage::new(out, width, height)
}
