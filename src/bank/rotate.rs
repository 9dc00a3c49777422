//! Line kernel construction and rotation.

use crate::kernel::Kernel2d;
use crate::util::math::sin_cos_deg;
use crate::util::{MsldError, MsldResult};

/// Horizontal line kernel of length `len`.
///
/// The kernel is `len x len` zeros with row `len / 2` set to `1 / len`. For an
/// even `len` there is no middle row and the lower of the two central rows is
/// used.
pub fn base_line_kernel(len: usize) -> MsldResult<Kernel2d> {
    if len == 0 {
        return Err(MsldError::InvalidScale { scale: len });
    }
    let mut weights = vec![0.0f32; len * len];
    let center = len / 2;
    let value = (1.0 / len as f64) as f32;
    weights[center * len..(center + 1) * len].fill(value);
    Kernel2d::new(weights, len, len)
}

/// Rotates a kernel counter-clockwise by `angle_deg` about its center pixel.
///
/// The center is the pixel `(width / 2, height / 2)`. Each destination pixel
/// is mapped back through the inverse rotation and sampled bilinearly; source
/// neighbours outside the kernel contribute zero. The output keeps the input
/// dimensions, and a rotation by 0 degrees returns the input unchanged.
pub fn rotate_kernel(src: &Kernel2d, angle_deg: f64) -> MsldResult<Kernel2d> {
    let width = src.width();
    let height = src.height();
    let weights = src.weights();
    let (sin_a, cos_a) = sin_cos_deg(angle_deg);
    let cx = (width / 2) as f64;
    let cy = (height / 2) as f64;

    let sample = |x: isize, y: isize| -> f64 {
        if x < 0 || y < 0 || x as usize >= width || y as usize >= height {
            return 0.0;
        }
        f64::from(weights[y as usize * width + x as usize])
    };

    let mut out = vec![0.0f32; width * height];
    for y in 0..height {
        for x in 0..width {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            let src_x = cos_a * dx - sin_a * dy + cx;
            let src_y = sin_a * dx + cos_a * dy + cy;

            let x0f = src_x.floor();
            let y0f = src_y.floor();
            let fx = src_x - x0f;
            let fy = src_y - y0f;
            let x0 = x0f as isize;
            let y0 = y0f as isize;

            let mut value = sample(x0, y0) * (1.0 - fx) * (1.0 - fy);
            if fx > 0.0 {
                value += sample(x0 + 1, y0) * fx * (1.0 - fy);
            }
            if fy > 0.0 {
                value += sample(x0, y0 + 1) * (1.0 - fx) * fy;
            }
            if fx > 0.0 && fy > 0.0 {
                value += sample(x0 + 1, y0 + 1) * fx * fy;
            }
            out[y * width + x] = value as f32;
        }
    }

    Kernel2d::new(out, width, height)
}
