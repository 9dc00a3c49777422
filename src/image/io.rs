//! Dataset loading helpers built on the `image` crate.
//!
//! Available when the `image-io` feature is enabled. The expected layout is
//! the DRIVE one: `<root>/data/<split>`, `<root>/label/<split>` and
//! `<root>/mask/<split>`, with the three files of a sample sharing one file
//! name.

use crate::dataset::Sample;
use crate::image::OwnedImage;
use crate::util::{MsldError, MsldResult};
use std::fs;
use std::path::{Path, PathBuf};

fn io_err(err: impl std::fmt::Display) -> MsldError {
    MsldError::ImageIo {
        reason: err.to_string(),
    }
}

/// Loads an image as interleaved RGB `f32` values in `[0, 1]`.
///
/// Returns `(pixels, width, height)`.
pub fn load_rgb_f32<P: AsRef<Path>>(path: P) -> MsldResult<(Vec<f32>, usize, usize)> {
    let img = image::open(path).map_err(io_err)?.to_rgb32f();
    let width = img.width() as usize;
    let height = img.height() as usize;
    Ok((img.into_raw(), width, height))
}

/// Loads a binary mask; any non-zero luminance is `true`.
pub fn load_binary_mask<P: AsRef<Path>>(path: P) -> MsldResult<OwnedImage<bool>> {
    let img = image::open(path).map_err(io_err)?.to_luma8();
    let width = img.width() as usize;
    let height = img.height() as usize;
    let data = img.as_raw().iter().map(|&v| v != 0).collect();
    OwnedImage::new(data, width, height)
}

/// Loads an image, label and mask triad into a `Sample` named after the
/// image file.
pub fn load_sample<P: AsRef<Path>>(image: P, label: P, mask: P) -> MsldResult<Sample> {
    let (rgb, width, height) = load_rgb_f32(&image)?;
    let label = load_binary_mask(label)?;
    let mask = load_binary_mask(mask)?;
    let sample = Sample::from_rgb(&rgb, width, height, label, mask)?;
    let name = image
        .as_ref()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());
    Ok(match name {
        Some(name) => sample.with_name(name),
        None => sample,
    })
}

/// Loads every sample of `split` under `root`, sorted by file name.
pub fn load_split<P: AsRef<Path>>(root: P, split: &str) -> MsldResult<Vec<Sample>> {
    let root = root.as_ref();
    let data_dir = root.join("data").join(split);
    let label_dir = root.join("label").join(split);
    let mask_dir = root.join("mask").join(split);

    let mut names: Vec<PathBuf> = fs::read_dir(&data_dir)
        .map_err(io_err)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    names.sort();

    names
        .iter()
        .map(|path| {
            let file = path.file_name().ok_or_else(|| MsldError::ImageIo {
                reason: format!("no file name in {}", path.display()),
            })?;
            load_sample(path.clone(), label_dir.join(file), mask_dir.join(file))
        })
        .collect()
}

/// Writes a binary mask as an 8-bit grayscale image (0 or 255).
pub fn save_binary_mask<P: AsRef<Path>>(mask: &OwnedImage<bool>, path: P) -> MsldResult<()> {
    let data = mask
        .data()
        .iter()
        .map(|&v| if v { 255u8 } else { 0u8 })
        .collect();
    let img = image::GrayImage::from_raw(mask.width() as u32, mask.height() as u32, data)
        .ok_or(MsldError::InvalidDimensions {
            width: mask.width(),
            height: mask.height(),
        })?;
    img.save(path).map_err(io_err)
}
