//! Owned RGB pixel storage.
//!
//! [`PixelBuffer`] wraps an `imgref::ImgVec` of `rgb::Rgb<u8>` pixels stored
//! row-major with no padding. All row-major index arithmetic lives in
//! [`PixelBuffer::index_of`]; other modules go through the accessors.

use core::fmt;

use imgref::ImgVec;
use rgb::Rgb;

use crate::error::{HpdecError, Result};

/// One RGB sample, 8 bits per channel.
pub type Pixel = Rgb<u8>;

/// A width × height grid of RGB pixels in row-major order.
///
/// Dimensions are always non-zero and `pixels().len() == width * height`.
/// Buffers are created by [`decode`](crate::decode), [`copy`](crate::copy)
/// and [`blur`](crate::blur), and are exclusively owned by their holder.
#[derive(Clone)]
pub struct PixelBuffer {
    img: ImgVec<Pixel>,
}

impl PartialEq for PixelBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.same_shape(other) && self.pixels() == other.pixels()
    }
}

impl Eq for PixelBuffer {}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}

impl PixelBuffer {
    /// Wrap an existing pixel vector.
    ///
    /// Fails with [`HpdecError::Allocation`] if either dimension is zero, the
    /// pixel count overflows, or `pixels.len()` is not `width * height`.
    pub fn new(width: usize, height: usize, pixels: Vec<Pixel>) -> Result<Self> {
        let len = checked_len(width, height)?;
        if pixels.len() != len {
            return Err(HpdecError::Allocation { width, height });
        }
        Ok(Self {
            img: ImgVec::new(pixels, width, height),
        })
    }

    /// Allocate a buffer with every pixel set to `fill`.
    pub fn filled(width: usize, height: usize, fill: Pixel) -> Result<Self> {
        let len = checked_len(width, height)?;
        let mut pixels = try_alloc(len).ok_or(HpdecError::Allocation { width, height })?;
        pixels.resize(len, fill);
        Self::new(width, height, pixels)
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.img.width()
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.img.height()
    }

    /// Total number of pixels (`width * height`).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.img.buf().len()
    }

    /// Whether two buffers have identical width and height.
    pub fn same_shape(&self, other: &PixelBuffer) -> bool {
        self.width() == other.width() && self.height() == other.height()
    }

    /// Row-major index of `(x, y)`, or `None` when out of range.
    #[inline]
    pub fn index_of(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width() && y < self.height()).then(|| y * self.width() + x)
    }

    /// Pixel at `(x, y)`, or `None` when out of range.
    ///
    /// Use [`sample`](crate::sample) for edge-clamped reads.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Pixel> {
        self.index_of(x, y).map(|i| self.img.buf()[i])
    }

    /// Mutable pixel at `(x, y)`, or `None` when out of range.
    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut Pixel> {
        let i = self.index_of(x, y)?;
        self.img.buf_mut().get_mut(i)
    }

    /// All pixels in row-major order.
    #[inline]
    pub fn pixels(&self) -> &[Pixel] {
        self.img.buf()
    }

    /// All pixels in row-major order, mutably. The length cannot change.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        self.img.buf_mut()
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> {
        self.pixels().chunks_exact(self.width())
    }

    /// Deep copy with fallible allocation.
    ///
    /// The copy shares nothing with `self`. On failure `self` is untouched.
    pub fn try_clone(&self) -> Result<Self> {
        let (width, height) = (self.width(), self.height());
        let mut pixels =
            try_alloc(self.pixel_count()).ok_or(HpdecError::Allocation { width, height })?;
        pixels.extend_from_slice(self.pixels());
        Self::new(width, height, pixels)
    }
}

/// Produce an independent deep copy of `source`.
///
/// Fails with [`HpdecError::Allocation`] if the pixel storage cannot be
/// reserved; `source` is unaffected.
pub fn copy(source: &PixelBuffer) -> Result<PixelBuffer> {
    source.try_clone()
}

/// Overflow-checked `width * height`, rejecting zero dimensions.
pub(crate) fn checked_len(width: usize, height: usize) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(HpdecError::Allocation { width, height });
    }
    let len = width
        .checked_mul(height)
        .ok_or(HpdecError::Allocation { width, height })?;
    len.checked_mul(size_of::<Pixel>())
        .filter(|&bytes| bytes <= isize::MAX as usize)
        .ok_or(HpdecError::Allocation { width, height })?;
    Ok(len)
}

/// Empty vector with room for exactly `len` pixels, or `None` if the
/// allocator refuses.
pub(crate) fn try_alloc(len: usize) -> Option<Vec<Pixel>> {
    let mut pixels = Vec::new();
    pixels.try_reserve_exact(len).ok()?;
    Some(pixels)
}
