//! Edge-clamped pixel reads.

use crate::pixel::{Pixel, PixelBuffer};

/// Pixel at `(x, y)` with both coordinates clamped into the buffer.
///
/// `x` is clamped to `0..=width-1` and `y` to `0..=height-1` independently,
/// so a read past an edge returns the nearest edge pixel and a read past a
/// corner returns the corner. Never fails.
#[inline]
pub fn sample(buffer: &PixelBuffer, x: isize, y: isize) -> Pixel {
    let cx = clamp_axis(x, buffer.width());
    let cy = clamp_axis(y, buffer.height());
    // Clamped coordinates are always in range; the fallback is unreachable.
    buffer.get(cx, cy).unwrap_or_default()
}

/// Edge-replicating view over a [`PixelBuffer`].
#[derive(Clone, Copy, Debug)]
pub struct BoundedSampler<'a> {
    buffer: &'a PixelBuffer,
}

impl<'a> BoundedSampler<'a> {
    pub fn new(buffer: &'a PixelBuffer) -> Self {
        Self { buffer }
    }

    /// The underlying buffer.
    pub fn buffer(&self) -> &'a PixelBuffer {
        self.buffer
    }

    /// See [`sample`].
    #[inline]
    pub fn sample(&self, x: isize, y: isize) -> Pixel {
        sample(self.buffer, x, y)
    }
}

#[inline]
fn clamp_axis(v: isize, len: usize) -> usize {
    // len >= 1 for every PixelBuffer.
    let last = len - 1;
    match usize::try_from(v) {
        Ok(v) => v.min(last),
        Err(_) => 0,
    }
}
