//! Multi-scale combination of line responses.

use crate::detector::Msld;
use crate::image::{ImageView, OwnedImage};
use crate::kernel::axpy;
use crate::trace::trace_span;
use crate::util::MsldResult;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

impl Msld {
    /// Combined line response of `image`.
    ///
    /// `R = (sum over scales of bld(image, l) + image) / (N + 1)` with `N` the
    /// orientation count; the intensity map acts as one extra term. The output
    /// has the shape of the input. Higher values are more vessel-like.
    pub fn combine(&self, image: ImageView<'_, f32>) -> MsldResult<OwnedImage<f32>> {
        let _span = trace_span!(
            "combine",
            width = image.width(),
            height = image.height(),
            scales = self.bank.stacks().len()
        )
        .entered();

        let responses = self.scale_responses(image)?;

        let mut combined = OwnedImage::filled(image.width(), image.height(), 0.0f32)?;
        for response in &responses {
            axpy(combined.data_mut(), response.data(), 1.0);
        }
        let width = image.width();
        for (acc, row) in combined.data_mut().chunks_exact_mut(width).zip(image.rows()) {
            axpy(acc, row, 1.0);
        }

        let coeff = (1.0 / (self.cfg.orientations as f64 + 1.0)) as f32;
        for v in combined.data_mut() {
            *v *= coeff;
        }
        Ok(combined)
    }

    /// Per-scale responses in configuration order.
    fn scale_responses(&self, image: ImageView<'_, f32>) -> MsldResult<Vec<OwnedImage<f32>>> {
        #[cfg(feature = "rayon")]
        if self.cfg.parallel {
            return self
                .bank
                .stacks()
                .par_iter()
                .map(|stack| self.bld_stack(image, stack))
                .collect();
        }

        self.bank
            .stacks()
            .iter()
            .map(|stack| self.bld_stack(image, stack))
            .collect()
    }
}
