//! 3×3 box blur with edge replication.
//!
//! Every output pixel is the truncated integer mean of the nine pixels in
//! the 3×3 window around it. Window positions outside the image read the
//! nearest edge pixel through [`sample`](crate::sample), so corners weigh
//! their own value four times.
//!
//! The filter is pure: observers attached through [`blur_observed`] see a
//! subset of `(before, after)` pairs but cannot change the result.

use core::num::NonZeroUsize;

use log::debug;
use rgb::Rgb;

use crate::error::{HpdecError, Result};
use crate::pixel::{Pixel, PixelBuffer, checked_len, try_alloc};
use crate::sampler::BoundedSampler;

/// Number of samples in the window.
const WINDOW: u32 = 9;

/// Grid spacing used by [`LogObserver::default`].
pub const DIAGNOSTIC_STEP: usize = 10;

/// One transformed pixel reported to a [`BlurObserver`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlurSample {
    pub x: usize,
    pub y: usize,
    /// Source pixel.
    pub before: Pixel,
    /// Blurred pixel written to the output.
    pub after: Pixel,
}

/// Receives diagnostic samples while [`blur_observed`] runs.
pub trait BlurObserver {
    /// Whether `(x, y)` should be reported. Called once per pixel.
    fn wants(&self, x: usize, y: usize) -> bool;

    /// Called for each pixel accepted by [`wants`](BlurObserver::wants),
    /// in row-major order.
    fn observe(&mut self, sample: BlurSample);
}

/// Observes nothing.
impl BlurObserver for () {
    fn wants(&self, _x: usize, _y: usize) -> bool {
        false
    }

    fn observe(&mut self, _sample: BlurSample) {}
}

/// Logs pixels on a regular grid at `debug` level.
///
/// A pixel is reported when both `x` and `y` are multiples of the step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogObserver {
    step: NonZeroUsize,
}

impl LogObserver {
    pub fn new(step: NonZeroUsize) -> Self {
        Self { step }
    }

    pub fn step(&self) -> NonZeroUsize {
        self.step
    }
}

impl Default for LogObserver {
    fn default() -> Self {
        Self {
            step: NonZeroUsize::new(DIAGNOSTIC_STEP).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl BlurObserver for LogObserver {
    fn wants(&self, x: usize, y: usize) -> bool {
        x % self.step == 0 && y % self.step == 0
    }

    fn observe(&mut self, s: BlurSample) {
        debug!(
            "pixel[{}, {}]: before {} {} {} -> after {} {} {}",
            s.x, s.y, s.before.r, s.before.g, s.before.b, s.after.r, s.after.g, s.after.b
        );
    }
}

/// The 3×3 box blur as a reusable filter value.
///
/// Equivalent to calling [`blur`] / [`blur_observed`] directly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlurFilter;

impl BlurFilter {
    pub fn new() -> Self {
        Self
    }

    /// Blur `source` into a new buffer. See [`blur`].
    pub fn apply(&self, source: &PixelBuffer) -> Result<PixelBuffer> {
        blur(source)
    }

    /// Blur `source`, reporting selected pixels to `observer`.
    pub fn apply_observed<O>(&self, source: &PixelBuffer, observer: &mut O) -> Result<PixelBuffer>
    where
        O: BlurObserver + ?Sized,
    {
        blur_observed(source, observer)
    }
}

/// Blur `source` into a new buffer of the same dimensions.
///
/// Fails with [`HpdecError::Allocation`] only if the destination cannot be
/// allocated.
pub fn blur(source: &PixelBuffer) -> Result<PixelBuffer> {
    blur_observed(source, &mut ())
}

/// [`blur`], reporting selected pixels to `observer`.
pub fn blur_observed<O>(source: &PixelBuffer, observer: &mut O) -> Result<PixelBuffer>
where
    O: BlurObserver + ?Sized,
{
    let (width, height) = (source.width(), source.height());
    let len = checked_len(width, height)?;
    let mut out = try_alloc(len).ok_or(HpdecError::Allocation { width, height })?;
    debug!("blurring {width}x{height} image");

    let sampler = BoundedSampler::new(source);
    for y in 0..height {
        for x in 0..width {
            // Dimensions fit in isize: checked_len bounds the byte size.
            let (sx, sy) = (x as isize, y as isize);
            let after = box_mean(&sampler, sx, sy);
            out.push(after);
            if observer.wants(x, y) {
                observer.observe(BlurSample {
                    x,
                    y,
                    before: sampler.sample(sx, sy),
                    after,
                });
            }
        }
    }

    PixelBuffer::new(width, height, out)
}

fn box_mean(sampler: &BoundedSampler<'_>, x: isize, y: isize) -> Pixel {
    let (mut r, mut g, mut b) = (0u32, 0u32, 0u32);
    for dy in -1..=1 {
        for dx in -1..=1 {
            let p = sampler.sample(x + dx, y + dy);
            r += u32::from(p.r);
            g += u32::from(p.g);
            b += u32::from(p.b);
        }
    }
    Rgb::new(mean(r), mean(g), mean(b))
}

/// Truncating mean of a window sum, clamped to the channel range.
#[inline]
fn mean(sum: u32) -> u8 {
    u8::try_from(sum / WINDOW).unwrap_or(u8::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(r: u8, g: u8, b: u8) -> Pixel {
        Rgb::new(r, g, b)
    }

    /// The 2×2 image from the format documentation.
    fn two_by_two() -> PixelBuffer {
        PixelBuffer::new(
            2,
            2,
            vec![
                px(0, 0, 0),
                px(255, 255, 255),
                px(10, 20, 30),
                px(40, 50, 60),
            ],
        )
        .unwrap()
    }

    #[derive(Default)]
    struct Recorder {
        every: usize,
        seen: Vec<BlurSample>,
    }

    impl BlurObserver for Recorder {
        fn wants(&self, x: usize, y: usize) -> bool {
            (y * 1000 + x) % self.every.max(1) == 0
        }

        fn observe(&mut self, sample: BlurSample) {
            self.seen.push(sample);
        }
    }

    #[test]
    fn corner_uses_replicated_edges() {
        let out = blur(&two_by_two()).unwrap();
        // Top-left window: p00 ×4, p10 ×2, p01 ×2, p11 ×1.
        // r = (0 + 510 + 20 + 40) / 9 = 63
        // g = (0 + 510 + 40 + 50) / 9 = 66
        // b = (0 + 510 + 60 + 60) / 9 = 70
        assert_eq!(out.get(0, 0), Some(px(63, 66, 70)));
        // Bottom-right window: p11 ×4, p01 ×2, p10 ×2, p00 ×1.
        // r = (160 + 20 + 510 + 0) / 9 = 76
        assert_eq!(out.get(1, 1).map(|p| p.r), Some(76));
    }

    #[test]
    fn preserves_dimensions() {
        for (w, h) in [(1, 1), (1, 7), (7, 1), (5, 3)] {
            let src = PixelBuffer::filled(w, h, px(1, 2, 3)).unwrap();
            let out = blur(&src).unwrap();
            assert_eq!((out.width(), out.height()), (w, h));
        }
    }

    #[test]
    fn uniform_image_is_unchanged() {
        let src = PixelBuffer::filled(6, 4, px(200, 17, 255)).unwrap();
        assert_eq!(blur(&src).unwrap(), src);
    }

    #[test]
    fn white_image_stays_white() {
        let src = PixelBuffer::filled(3, 3, px(255, 255, 255)).unwrap();
        let out = blur(&src).unwrap();
        assert!(out.pixels().iter().all(|&p| p == px(255, 255, 255)));
    }

    #[test]
    fn single_bright_pixel_spreads() {
        let mut src = PixelBuffer::filled(3, 3, px(0, 0, 0)).unwrap();
        *src.get_mut(1, 1).unwrap() = px(90, 180, 9);
        let out = blur(&src).unwrap();
        // Every window contains the centre exactly once.
        assert!(out.pixels().iter().all(|&p| p == px(10, 20, 1)));
    }

    #[test]
    fn deterministic() {
        let src = two_by_two();
        assert_eq!(blur(&src).unwrap(), blur(&src).unwrap());
        assert_eq!(BlurFilter::new().apply(&src).unwrap(), blur(&src).unwrap());
    }

    #[test]
    fn source_is_not_modified() {
        let src = two_by_two();
        let before = src.clone();
        let _ = blur(&src).unwrap();
        assert_eq!(src, before);
    }

    #[test]
    fn observer_sees_requested_pixels_only() {
        let src = PixelBuffer::filled(4, 2, px(5, 5, 5)).unwrap();
        let mut rec = Recorder {
            every: 2,
            ..Default::default()
        };
        let out = blur_observed(&src, &mut rec).unwrap();

        let coords: Vec<(usize, usize)> = rec.seen.iter().map(|s| (s.x, s.y)).collect();
        assert_eq!(coords, [(0, 0), (2, 0), (0, 1), (2, 1)]);
        for s in &rec.seen {
            assert_eq!(s.before, px(5, 5, 5));
            assert_eq!(Some(s.after), out.get(s.x, s.y));
        }
    }

    #[test]
    fn observer_does_not_change_output() {
        let src = two_by_two();
        let mut rec = Recorder {
            every: 1,
            ..Default::default()
        };
        assert_eq!(blur_observed(&src, &mut rec).unwrap(), blur(&src).unwrap());
        assert_eq!(rec.seen.len(), 4);
    }

    #[test]
    fn log_observer_grid() {
        let obs = LogObserver::default();
        assert_eq!(obs.step().get(), DIAGNOSTIC_STEP);
        assert!(obs.wants(0, 0));
        assert!(obs.wants(10, 20));
        assert!(!obs.wants(10, 5));
        assert!(!obs.wants(3, 0));

        let every = LogObserver::new(NonZeroUsize::MIN);
        assert!(every.wants(3, 7));
    }

    #[test]
    fn log_observer_runs_through_blur() {
        let src = PixelBuffer::filled(12, 12, px(9, 9, 9)).unwrap();
        let out = blur_observed(&src, &mut LogObserver::default()).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn mean_truncates_and_clamps() {
        assert_eq!(mean(17), 1);
        assert_eq!(mean(9 * 255), 255);
        assert_eq!(mean(u32::MAX), 255);
    }
}
