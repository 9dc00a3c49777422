//! Line-detector mask bank.
//!
//! The bank is built once from the detector configuration and is immutable
//! afterwards. It holds the `W x W` averaging mask and, for each line length
//! `l`, a stack of `N` oriented line kernels of size `l x l`. Every kernel in
//! a stack is renormalized to unit sum after rotation, since bilinear
//! resampling does not preserve the total weight.

use crate::kernel::Kernel2d;
use crate::util::{MsldError, MsldResult};

mod angles;
pub mod rotate;

pub use angles::OrientationGrid;
pub use rotate::{base_line_kernel, rotate_kernel};

/// Oriented line kernels for one line length, shaped `(l, l, N)`.
#[derive(Clone, Debug)]
pub struct LineMaskStack {
    scale: usize,
    masks: Vec<Kernel2d>,
}

impl LineMaskStack {
    /// Builds the stack for line length `scale` over `grid`.
    pub fn build(scale: usize, grid: &OrientationGrid) -> MsldResult<Self> {
        let base = base_line_kernel(scale)?;
        let masks = grid
            .iter()
            .map(|angle| rotate_kernel(&base, angle)?.normalized())
            .collect::<MsldResult<Vec<_>>>()?;
        Ok(Self { scale, masks })
    }

    /// Returns the line length.
    pub fn scale(&self) -> usize {
        self.scale
    }

    /// Returns `(l, l, N)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.scale, self.scale, self.masks.len())
    }

    /// Returns the number of orientations.
    pub fn len(&self) -> usize {
        self.masks.len()
    }

    /// Returns true if the stack holds no kernels.
    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// Returns the kernel for orientation index `k`.
    pub fn slice(&self, k: usize) -> Option<&Kernel2d> {
        self.masks.get(k)
    }

    /// Iterates over the kernels in orientation order.
    pub fn iter(&self) -> impl Iterator<Item = &Kernel2d> + '_ {
        self.masks.iter()
    }
}

/// Averaging mask plus one line mask stack per configured scale.
#[derive(Clone, Debug)]
pub struct MaskBank {
    grid: OrientationGrid,
    average: Kernel2d,
    stacks: Vec<LineMaskStack>,
}

impl MaskBank {
    /// Builds the bank for window size `window_size`, line lengths `scales`
    /// and `orientations` evenly spaced angles.
    pub fn build(window_size: usize, scales: &[usize], orientations: usize) -> MsldResult<Self> {
        validate_geometry(window_size, scales, orientations)?;
        let grid = OrientationGrid::new(orientations)?;
        let average = Kernel2d::uniform(window_size)?;
        let stacks = scales
            .iter()
            .map(|&scale| LineMaskStack::build(scale, &grid))
            .collect::<MsldResult<Vec<_>>>()?;
        Ok(Self {
            grid,
            average,
            stacks,
        })
    }

    /// Returns the orientation grid shared by every stack.
    pub fn grid(&self) -> &OrientationGrid {
        &self.grid
    }

    /// Returns the `W x W` averaging mask.
    pub fn average(&self) -> &Kernel2d {
        &self.average
    }

    /// Returns all stacks in configuration order.
    pub fn stacks(&self) -> &[LineMaskStack] {
        &self.stacks
    }

    /// Returns the stack for line length `scale`.
    pub fn stack(&self, scale: usize) -> MsldResult<&LineMaskStack> {
        self.stacks
            .iter()
            .find(|stack| stack.scale() == scale)
            .ok_or(MsldError::UnknownScale { scale })
    }
}

/// Checks the window size, the scale list and the orientation count.
pub(crate) fn validate_geometry(
    window_size: usize,
    scales: &[usize],
    orientations: usize,
) -> MsldResult<()> {
    if window_size == 0 || window_size % 2 == 0 {
        return Err(MsldError::InvalidWindowSize { window_size });
    }
    if scales.is_empty() {
        return Err(MsldError::EmptyScales);
    }
    for (idx, &scale) in scales.iter().enumerate() {
        if scale == 0 {
            return Err(MsldError::InvalidScale { scale });
        }
        if scales[..idx].contains(&scale) {
            return Err(MsldError::DuplicateScale { scale });
        }
    }
    if orientations == 0 {
        return Err(MsldError::InvalidOrientationCount {
            count: orientations,
        });
    }
    Ok(())
}
