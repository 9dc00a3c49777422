//! Labeled samples for threshold learning and evaluation.

use crate::image::channel::green_inverted;
use crate::image::{ImageView, OwnedImage};
use crate::util::MsldResult;

/// One fundus image with its vessel ground truth and region of interest.
///
/// `image` is the single-channel intensity map fed to the detector, with
/// vessels bright. `label` marks vessel pixels and `mask` marks the pixels
/// that take part in evaluation. All three share one shape, checked at
/// construction.
#[derive(Clone, Debug)]
pub struct Sample {
    name: Option<String>,
    image: OwnedImage<f32>,
    label: OwnedImage<bool>,
    mask: OwnedImage<bool>,
}

impl Sample {
    /// Creates a sample from a prepared intensity map.
    pub fn new(
        image: OwnedImage<f32>,
        label: OwnedImage<bool>,
        mask: OwnedImage<bool>,
    ) -> MsldResult<Self> {
        image.view().expect_same_dims(&label.view(), "label")?;
        image.view().expect_same_dims(&mask.view(), "mask")?;
        Ok(Self {
            name: None,
            image,
            label,
            mask,
        })
    }

    /// Creates a sample from an interleaved `H x W x 3` RGB buffer in `[0, 1]`,
    /// using the inverted green channel as the intensity map.
    pub fn from_rgb(
        rgb: &[f32],
        width: usize,
        height: usize,
        label: OwnedImage<bool>,
        mask: OwnedImage<bool>,
    ) -> MsldResult<Self> {
        let image = green_inverted(rgb, width, height)?;
        Self::new(image, label, mask)
    }

    /// Attaches a display name, typically the source file name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the sample name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the intensity map.
    pub fn image(&self) -> ImageView<'_, f32> {
        self.image.view()
    }

    /// Returns the vessel ground truth.
    pub fn label(&self) -> &OwnedImage<bool> {
        &self.label
    }

    /// Returns the region-of-interest mask.
    pub fn mask(&self) -> &OwnedImage<bool> {
        &self.mask
    }

    /// Returns `(width, height)`.
    pub fn dims(&self) -> (usize, usize) {
        self.image.dims()
    }

    /// Number of pixels inside the region of interest.
    pub fn roi_len(&self) -> usize {
        self.mask.data().iter().filter(|&&m| m).count()
    }
}
