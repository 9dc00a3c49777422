//! Basic line detector: the single-scale building block.

use crate::bank::LineMaskStack;
use crate::detector::Msld;
use crate::image::{ImageView, OwnedImage};
use crate::kernel::{convolve, convolve_padded, max_assign, sub_assign, Padded};
use crate::trace::{trace_event, trace_span};
use crate::util::math::mean_std;
use crate::util::{MsldError, MsldResult};

/// Variance at or below which a map is treated as constant.
const MIN_VARIANCE: f64 = 1e-12;

impl Msld {
    /// Single-scale line response for line length `scale`.
    ///
    /// The strongest oriented line average at each pixel, minus the local
    /// window average, z-scored over the whole map. A map with zero variance
    /// yields all zeros.
    pub fn bld(&self, image: ImageView<'_, f32>, scale: usize) -> MsldResult<OwnedImage<f32>> {
        let stack = self.bank.stack(scale)?;
        self.bld_stack(image, stack)
    }

    pub(crate) fn bld_stack(
        &self,
        image: ImageView<'_, f32>,
        stack: &LineMaskStack,
    ) -> MsldResult<OwnedImage<f32>> {
        let _span = trace_span!("bld", scale = stack.scale(), orientations = stack.len()).entered();
        let border = self.cfg.border;
        let parallel = self.cfg.parallel;

        let local_avg = convolve(image, self.bank.average(), border, parallel)?;

        // Every kernel of a stack is `scale x scale`, so one padding serves all.
        let padded = Padded::build(image, stack.scale(), stack.scale(), border);
        let mut response: Option<OwnedImage<f32>> = None;
        for kernel in stack.iter() {
            let line = convolve_padded(&padded, kernel, parallel)?;
            match response.as_mut() {
                Some(best) => max_assign(best.data_mut(), line.data()),
                None => response = Some(line),
            }
        }
        let mut response = response.ok_or(MsldError::UnknownScale {
            scale: stack.scale(),
        })?;

        sub_assign(response.data_mut(), local_avg.data());

        match standardize(response.data_mut()) {
            Ok(()) => Ok(response),
            Err(MsldError::DegenerateStatistics { .. }) => {
                trace_event!("bld_zero_variance", scale = stack.scale());
                response.data_mut().fill(0.0);
                Ok(response)
            }
            Err(err) => Err(err),
        }
    }
}

/// Rescales `values` in place to zero mean and unit population standard
/// deviation.
///
/// Fails with `DegenerateStatistics`, leaving `values` untouched, when the
/// variance is zero.
pub fn standardize(values: &mut [f32]) -> MsldResult<()> {
    let (mean, std) = mean_std(values);
    if std * std <= MIN_VARIANCE {
        return Err(MsldError::DegenerateStatistics {
            reason: "zero variance response",
        });
    }
    for v in values.iter_mut() {
        *v = ((f64::from(*v) - mean) / std) as f32;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::standardize;
    use crate::detector::{Msld, MsldConfig};
    use crate::image::OwnedImage;
    use crate::util::math::mean_std;
    use crate::MsldError;

    #[test]
    fn standardize_gives_zero_mean_unit_std() {
        let mut values = vec![1.0f32, 2.0, 3.0, 4.0, 10.0];
        standardize(&mut values).unwrap();
        let (mean, std) = mean_std(&values);
        assert!(mean.abs() < 1e-6);
        assert!((std - 1.0).abs() < 1e-6);
    }

    #[test]
    fn standardize_rejects_constant_maps() {
        let mut values = vec![0.3f32; 8];
        let err = standardize(&mut values).unwrap_err();
        assert!(matches!(err, MsldError::DegenerateStatistics { .. }));
        assert_eq!(values, vec![0.3f32; 8]);
    }

    #[test]
    fn constant_image_gives_zero_response() {
        let msld = Msld::new(MsldConfig::new(5, vec![3], 4)).unwrap();
        let image = OwnedImage::filled(12, 10, 0.7f32).unwrap();
        let response = msld.bld(image.view(), 3).unwrap();
        assert_eq!(response.dims(), (12, 10));
        assert!(response.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn unknown_scale_is_rejected() {
        let msld = Msld::new(MsldConfig::new(5, vec![3], 4)).unwrap();
        let image = OwnedImage::filled(8, 8, 0.1f32).unwrap();
        assert_eq!(
            msld.bld(image.view(), 5).unwrap_err(),
            MsldError::UnknownScale { scale: 5 }
        );
    }

    #[test]
    fn response_matches_per_kernel_convolution() {
        use crate::kernel::{convolve, Border};

        let (w, h) = (17, 13);
        let data: Vec<f32> = (0..w * h).map(|i| ((i * 29) % 31) as f32 / 31.0).collect();
        let image = OwnedImage::new(data, w, h).unwrap();
        let msld = Msld::new(MsldConfig::new(9, vec![5], 6)).unwrap();
        let response = msld.bld(image.view(), 5).unwrap();

        let stack = msld.bank().stack(5).unwrap();
        let mut expected = vec![f32::NEG_INFINITY; w * h];
        for kernel in stack.iter() {
            let line = convolve(image.view(), kernel, Border::Reflect, false).unwrap();
            for (e, &v) in expected.iter_mut().zip(line.data()) {
                if v > *e {
                    *e = v;
                }
            }
        }
        let avg = convolve(image.view(), msld.bank().average(), Border::Reflect, false).unwrap();
        for (e, &a) in expected.iter_mut().zip(avg.data()) {
            *e -= a;
        }
        standardize(&mut expected).unwrap();
        assert_eq!(response.data(), expected.as_slice());
    }

    #[test]
    fn vertical_line_responds_at_its_column() {
        let (w, h) = (21, 21);
        let mut data = vec![0.2f32; w * h];
        for y in 0..h {
            data[y * w + 10] = 0.9;
        }
        let image = OwnedImage::new(data, w, h).unwrap();
        let msld = Msld::new(MsldConfig::new(11, vec![7], 8)).unwrap();
        let response = msld.bld(image.view(), 7).unwrap();
        let on_line = response.get(10, 10).unwrap();
        let off_line = response.get(3, 10).unwrap();
        assert!(on_line > 1.0, "on-line response {on_line}");
        assert!(on_line > off_line);
    }
}
