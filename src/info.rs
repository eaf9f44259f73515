//! Header-level image metadata.

/// Dimensions read from an HPDEC header.
///
/// Produced by [`probe_header`](crate::probe_header) without touching pixel
/// data. `width * height` is known not to overflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct ImageInfo {
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
}

impl ImageInfo {
    pub(crate) fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Number of pixel records the body must contain.
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

impl core::fmt::Display for ImageInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_count_and_display() {
        let info = ImageInfo::new(640, 480);
        assert_eq!(info.pixel_count(), 307_200);
        assert_eq!(info.to_string(), "640x480");
    }
}
