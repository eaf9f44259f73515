//! Error types for HPDEC decoding, encoding and pixel operations.
//!
//! Every fallible operation in this crate returns [`HpdecError`]. Each
//! variant corresponds to exactly one failure kind; detail enums carry the
//! specific cause so callers can report it without string matching.

use std::io;

use crate::limits::LimitExceeded;

/// Convenience alias used throughout the crate.
pub type Result<T, E = HpdecError> = core::result::Result<T, E>;

/// Errors produced by the codec and the pixel operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HpdecError {
    /// The stream does not start with the `HPDEC` tag.
    #[error("unsupported image format: expected tag `HPDEC`, found {}", describe_found(.found))]
    Format {
        /// The token read in place of the tag (`None` on an empty stream).
        found: Option<String>,
    },

    /// The header dimensions are missing, malformed or unusable.
    #[error("invalid image metadata: {0}")]
    Metadata(#[from] InvalidMetadata),

    /// Fewer complete pixel records than the header declared.
    #[error("unexpected end of pixel data: decoded {decoded} of {expected} pixels ({cause})")]
    TruncatedData {
        /// Complete records decoded before the failure.
        decoded: usize,
        /// Records declared by the header (`width * height`).
        expected: usize,
        /// Why decoding stopped.
        cause: Truncation,
    },

    /// A pixel buffer could not be allocated.
    #[error("memory allocation failed for {width}x{height} pixel buffer")]
    Allocation {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// Two buffers passed to a comparison have different dimensions.
    #[error("images must have the same dimensions: {left_width}x{left_height} vs {right_width}x{right_height}")]
    ShapeMismatch {
        left_width: usize,
        left_height: usize,
        right_width: usize,
        right_height: usize,
    },

    /// Writing encoded output failed. Partial output may remain.
    #[error("error writing image data: {0}")]
    Write(#[source] io::Error),

    /// Reading the input stream failed.
    #[error("error reading image data: {0}")]
    Read(#[source] io::Error),
}

fn describe_found(found: &Option<String>) -> String {
    match found {
        Some(token) => format!("{token:?}"),
        None => "end of stream".to_owned(),
    }
}

/// Why the header dimensions were rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum InvalidMetadata {
    /// The stream ended before both dimensions were read.
    #[error("missing {0} dimension")]
    Missing(Dimension),

    /// A dimension token is not a non-negative integer.
    #[error("malformed {dimension} dimension {token:?}")]
    Malformed { dimension: Dimension, token: String },

    /// A dimension is zero.
    #[error("zero-sized image {width}x{height}")]
    Zero { width: usize, height: usize },

    /// `width * height` does not fit the address space.
    #[error("dimensions {width}x{height} overflow the pixel count")]
    Overflow { width: usize, height: usize },

    /// The dimensions exceed the decoder's [`ResourceLimits`](crate::ResourceLimits).
    #[error(transparent)]
    Limit(#[from] LimitExceeded),

    /// The pixel storage for the declared dimensions could not be reserved.
    #[error("cannot allocate {width}x{height} pixels")]
    Unallocatable { width: usize, height: usize },
}

/// Which header field an [`InvalidMetadata`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Height,
    Width,
}

impl core::fmt::Display for Dimension {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Dimension::Height => "height",
            Dimension::Width => "width",
        })
    }
}

/// Cause of a [`HpdecError::TruncatedData`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Truncation {
    /// The stream ended inside or before a pixel record.
    #[error("stream ended")]
    EndOfStream,

    /// A channel token is not an integer in `0..=255`.
    #[error("invalid channel value {token:?}")]
    InvalidChannel { token: String },
}
