//! Channel selection for fundus photographs.
//!
//! The detector works on a single intensity channel in which vessels are
//! bright. For RGB fundus images this is the inverted green channel, where
//! vessel contrast is highest.

use crate::image::OwnedImage;
use crate::util::{MsldError, MsldResult};

/// Color channel of an interleaved RGB buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    fn offset(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

/// Extracts one channel from an interleaved `H x W x 3` buffer with values in
/// `[0, 1]`, optionally inverting it as `1 - v`.
pub fn extract_channel(
    rgb: &[f32],
    width: usize,
    height: usize,
    channel: Channel,
    invert: bool,
) -> MsldResult<OwnedImage<f32>> {
    let pixels = width
        .checked_mul(height)
        .filter(|&n| n > 0)
        .ok_or(MsldError::InvalidDimensions { width, height })?;
    let needed = pixels * 3;
    if rgb.len() != needed {
        return Err(MsldError::BufferTooSmall {
            needed,
            got: rgb.len(),
        });
    }
    let offset = channel.offset();
    let data = rgb
        .chunks_exact(3)
        .map(|px| {
            let v = px[offset];
            if invert {
                1.0 - v
            } else {
                v
            }
        })
        .collect();
    OwnedImage::new(data, width, height)
}

/// Inverted green channel, the reference intensity map for fundus images.
pub fn green_inverted(rgb: &[f32], width: usize, height: usize) -> MsldResult<OwnedImage<f32>> {
    extract_channel(rgb, width, height, Channel::Green, true)
}
