//! SIMD-accelerated row kernels using the `wide` crate.
//!
//! Rows are processed 8 lanes at a time with `f32x8`; the tail falls back to
//! the scalar loop. Every lane performs the same multiply then add as the
//! scalar path, so results match it bit for bit.

use crate::kernel::scalar;
use wide::f32x8;

const LANES: usize = 8;

/// Load 8 f32 values into f32x8.
#[inline]
fn load_f32x8(slice: &[f32]) -> f32x8 {
    f32x8::from([
        slice[0], slice[1], slice[2], slice[3], slice[4], slice[5], slice[6], slice[7],
    ])
}

#[inline]
fn store_f32x8(slice: &mut [f32], v: f32x8) {
    slice[..LANES].copy_from_slice(&v.to_array());
}

/// Accumulates `acc[i] += weight * src[i]`.
pub fn axpy(acc: &mut [f32], src: &[f32], weight: f32) {
    let len = acc.len().min(src.len());
    let simd_end = len / LANES * LANES;
    let w = f32x8::splat(weight);
    for i in (0..simd_end).step_by(LANES) {
        let a = load_f32x8(&acc[i..]);
        let s = load_f32x8(&src[i..]);
        store_f32x8(&mut acc[i..], a + w * s);
    }
    scalar::axpy(&mut acc[simd_end..len], &src[simd_end..len], weight);
}

/// Pointwise `acc[i] = max(acc[i], src[i])`.
pub fn max_assign(acc: &mut [f32], src: &[f32]) {
    let len = acc.len().min(src.len());
    let simd_end = len / LANES * LANES;
    for i in (0..simd_end).step_by(LANES) {
        let a = load_f32x8(&acc[i..]);
        let s = load_f32x8(&src[i..]);
        store_f32x8(&mut acc[i..], a.max(s));
    }
    scalar::max_assign(&mut acc[simd_end..len], &src[simd_end..len]);
}

/// Pointwise `acc[i] -= src[i]`.
pub fn sub_assign(acc: &mut [f32], src: &[f32]) {
    let len = acc.len().min(src.len());
    let simd_end = len / LANES * LANES;
    for i in (0..simd_end).step_by(LANES) {
        let a = load_f32x8(&acc[i..]);
        let s = load_f32x8(&src[i..]);
        store_f32x8(&mut acc[i..], a - s);
    }
    scalar::sub_assign(&mut acc[simd_end..len], &src[simd_end..len]);
}
