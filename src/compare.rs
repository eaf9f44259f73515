//! Pixel-exact comparison of two images.

use crate::error::{HpdecError, Result};
use crate::pixel::PixelBuffer;

/// Per-pixel comparison counts.
///
/// `identical + different` always equals the pixel count of the compared
/// images.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelDiff {
    /// Pixels whose three channels all match.
    pub identical: usize,
    /// Pixels with at least one differing channel.
    pub different: usize,
}

impl PixelDiff {
    /// Total number of compared pixels.
    pub fn total(&self) -> usize {
        self.identical + self.different
    }

    /// Whether every pixel matched.
    pub fn is_identical(&self) -> bool {
        self.different == 0
    }
}

impl core::fmt::Display for PixelDiff {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} identical, {} different",
            self.identical, self.different
        )
    }
}

/// Count identical and different pixels between `a` and `b`.
///
/// Fails with [`HpdecError::ShapeMismatch`] before looking at any pixel if
/// the widths or heights differ.
pub fn compare(a: &PixelBuffer, b: &PixelBuffer) -> Result<PixelDiff> {
    if !a.same_shape(b) {
        return Err(HpdecError::ShapeMismatch {
            left_width: a.width(),
            left_height: a.height(),
            right_width: b.width(),
            right_height: b.height(),
        });
    }

    let identical = a
        .pixels()
        .iter()
        .zip(b.pixels())
        .filter(|(pa, pb)| pa == pb)
        .count();
    Ok(PixelDiff {
        identical,
        different: a.pixel_count() - identical,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{Pixel, copy};
    use rgb::Rgb;

    fn px(r: u8, g: u8, b: u8) -> Pixel {
        Rgb::new(r, g, b)
    }

    fn sample_image() -> PixelBuffer {
        let pixels = (0..12u8).map(|i| px(i, i + 1, i + 2)).collect();
        PixelBuffer::new(4, 3, pixels).unwrap()
    }

    #[test]
    fn image_vs_duplicate_is_identical() {
        let a = sample_image();
        let b = copy(&a).unwrap();
        let diff = compare(&a, &b).unwrap();
        assert_eq!(
            diff,
            PixelDiff {
                identical: 12,
                different: 0
            }
        );
        assert!(diff.is_identical());
    }

    #[test]
    fn any_channel_difference_counts() {
        let a = sample_image();
        let mut b = copy(&a).unwrap();
        b.pixels_mut()[0].r ^= 1;
        b.pixels_mut()[5].g ^= 1;
        b.pixels_mut()[11].b ^= 1;

        let diff = compare(&a, &b).unwrap();
        assert_eq!(diff.identical, 9);
        assert_eq!(diff.different, 3);
        assert_eq!(diff.total(), a.pixel_count());
        assert!(!diff.is_identical());
    }

    #[test]
    fn totals_always_match_pixel_count() {
        let a = sample_image();
        let b = PixelBuffer::filled(4, 3, px(3, 4, 5)).unwrap();
        let diff = compare(&a, &b).unwrap();
        // Only pixel 3 is (3, 4, 5).
        assert_eq!(diff.identical, 1);
        assert_eq!(diff.total(), 12);
    }

    #[test]
    fn shape_mismatch() {
        let a = sample_image();
        let wide = PixelBuffer::filled(12, 1, px(0, 0, 0)).unwrap();
        let tall = PixelBuffer::filled(4, 4, px(0, 0, 0)).unwrap();

        match compare(&a, &wide) {
            Err(HpdecError::ShapeMismatch {
                left_width,
                left_height,
                right_width,
                right_height,
            }) => {
                assert_eq!((left_width, left_height), (4, 3));
                assert_eq!((right_width, right_height), (12, 1));
            }
            other => panic!("expected shape mismatch, got {other:?}"),
        }
        assert!(matches!(
            compare(&a, &tall),
            Err(HpdecError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn display() {
        let diff = PixelDiff {
            identical: 7,
            different: 2,
        };
        assert_eq!(diff.to_string(), "7 identical, 2 different");
    }
}
