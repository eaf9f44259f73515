//! Resource limits for decode operations.
//!
//! [`ResourceLimits`] defines caps on resource usage. [`LimitExceeded`]
//! is returned when a check fails. The decoder runs these checks right
//! after parsing the header, before any pixel storage is reserved.

use crate::pixel::Pixel;

/// Resource limits for decoding.
///
/// All fields are optional; `None` means no limit for that resource.
/// The pixel count is always overflow-checked regardless of limits.
///
/// # Example
///
/// ```
/// use hpdec::ResourceLimits;
///
/// let limits = ResourceLimits::none()
///     .with_max_pixels(16_000_000)
///     .with_max_memory(64 * 1024 * 1024);
/// assert!(limits.check_dimensions(4000, 4000).is_ok());
/// assert!(limits.check_dimensions(4001, 4000).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct ResourceLimits {
    /// Maximum total pixels (width × height).
    pub max_pixels: Option<u64>,
    /// Maximum memory for the decoded pixel storage, in bytes.
    pub max_memory_bytes: Option<u64>,
    /// Maximum image width in pixels.
    pub max_width: Option<usize>,
    /// Maximum image height in pixels.
    pub max_height: Option<usize>,
    /// Maximum input file size in bytes (checked by [`load`](crate::load)).
    pub max_file_size: Option<u64>,
}

impl ResourceLimits {
    /// No limits (all fields `None`).
    pub fn none() -> Self {
        Self::default()
    }

    /// Set maximum total pixels.
    pub fn with_max_pixels(mut self, max: u64) -> Self {
        self.max_pixels = Some(max);
        self
    }

    /// Set maximum memory allocation in bytes.
    pub fn with_max_memory(mut self, bytes: u64) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }

    /// Set maximum image width in pixels.
    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }

    /// Set maximum image height in pixels.
    pub fn with_max_height(mut self, height: usize) -> Self {
        self.max_height = Some(height);
        self
    }

    /// Set maximum input file size in bytes.
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = Some(bytes);
        self
    }

    /// Whether any limits are set.
    pub fn has_any(&self) -> bool {
        self.max_pixels.is_some()
            || self.max_memory_bytes.is_some()
            || self.max_width.is_some()
            || self.max_height.is_some()
            || self.max_file_size.is_some()
    }

    /// Check image dimensions against `max_width`, `max_height`, `max_pixels`
    /// and, using the in-memory pixel size, `max_memory_bytes`.
    pub fn check_dimensions(&self, width: usize, height: usize) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_width
            && width > max
        {
            return Err(LimitExceeded::Width { actual: width, max });
        }
        if let Some(max) = self.max_height
            && height > max
        {
            return Err(LimitExceeded::Height {
                actual: height,
                max,
            });
        }
        // usize * usize always fits in u128.
        let pixels = width as u128 * height as u128;
        if let Some(max) = self.max_pixels
            && pixels > u128::from(max)
        {
            return Err(LimitExceeded::Pixels {
                actual: saturate(pixels),
                max,
            });
        }
        if let Some(max) = self.max_memory_bytes {
            let bytes = pixels * core::mem::size_of::<Pixel>() as u128;
            if bytes > u128::from(max) {
                return Err(LimitExceeded::Memory {
                    actual: saturate(bytes),
                    max,
                });
            }
        }
        Ok(())
    }

    /// Check input file size against `max_file_size`.
    pub fn check_file_size(&self, bytes: u64) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_file_size
            && bytes > max
        {
            return Err(LimitExceeded::FileSize { actual: bytes, max });
        }
        Ok(())
    }
}

fn saturate(value: u128) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// A resource limit was exceeded.
///
/// Returned by [`ResourceLimits::check_dimensions()`] and
/// [`ResourceLimits::check_file_size()`]. Each variant carries the actual
/// value and the limit that was exceeded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LimitExceeded {
    /// Image width exceeded `max_width`.
    Width {
        /// Actual width.
        actual: usize,
        /// Maximum allowed.
        max: usize,
    },
    /// Image height exceeded `max_height`.
    Height {
        /// Actual height.
        actual: usize,
        /// Maximum allowed.
        max: usize,
    },
    /// Pixel count exceeded `max_pixels`.
    Pixels {
        /// Actual pixel count (saturated at `u64::MAX`).
        actual: u64,
        /// Maximum allowed.
        max: u64,
    },
    /// Pixel storage exceeded `max_memory_bytes`.
    Memory {
        /// Required memory in bytes (saturated at `u64::MAX`).
        actual: u64,
        /// Maximum allowed.
        max: u64,
    },
    /// Input file size exceeded `max_file_size`.
    FileSize {
        /// Actual file size in bytes.
        actual: u64,
        /// Maximum allowed.
        max: u64,
    },
}

impl core::fmt::Display for LimitExceeded {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Width { actual, max } => write!(f, "width {actual} exceeds limit {max}"),
            Self::Height { actual, max } => write!(f, "height {actual} exceeds limit {max}"),
            Self::Pixels { actual, max } => {
                write!(f, "pixel count {actual} exceeds limit {max}")
            }
            Self::Memory { actual, max } => {
                write!(f, "memory {actual} bytes exceeds limit {max}")
            }
            Self::FileSize { actual, max } => {
                write!(f, "file size {actual} bytes exceeds limit {max}")
            }
        }
    }
}

impl core::error::Error for LimitExceeded {}
