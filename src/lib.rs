//! Decoder, encoder and filters for the HPDEC text raster format.
//!
//! HPDEC stores an RGB image as whitespace-separated decimal text: the tag
//! `HPDEC`, the height and width, then one `r g b` triple per pixel in
//! row-major order.
//!
//! - [`PixelBuffer`]: owned, row-major RGB image
//! - [`decode`] / [`encode`] / [`load`] / [`save`]: the codec, with
//!   [`HpdecDecoder`] for [`ResourceLimits`]
//! - [`sample`] / [`BoundedSampler`]: edge-clamped pixel reads
//! - [`blur`]: 3×3 box blur with edge replication
//! - [`compare`] / [`copy`]: pixel-exact comparison and duplication
//! - [`run`]: the load, perturb, compare, blur and save pipeline
//!
//! ```
//! let img = hpdec::decode_bytes(b"HPDEC\n2 2\n0 0 0\n255 255 255\n10 20 30\n40 50 60\n")?;
//! let blurred = hpdec::blur(&img)?;
//! assert_eq!(blurred.get(0, 0), Some(hpdec::rgb::Rgb::new(63, 66, 70)));
//!
//! let diff = hpdec::compare(&img, &hpdec::copy(&img)?)?;
//! assert!(diff.is_identical());
//! # Ok::<(), hpdec::HpdecError>(())
//! ```

#![forbid(unsafe_code)]

mod blur;
mod codec;
mod compare;
mod error;
pub mod format;
mod info;
mod limits;
mod pipeline;
mod pixel;
mod sampler;

pub use blur::{
    BlurFilter, BlurObserver, BlurSample, DIAGNOSTIC_STEP, LogObserver, blur, blur_observed,
};
pub use codec::{
    HpdecDecoder, HpdecEncoder, decode, decode_bytes, encode, encode_to_vec, load, probe_header,
    save,
};
pub use compare::{PixelDiff, compare};
pub use error::{Dimension, HpdecError, InvalidMetadata, Result, Truncation};
pub use info::ImageInfo;
pub use limits::{LimitExceeded, ResourceLimits};
pub use pipeline::{
    DEFAULT_MODIFIED_PATH, DEFAULT_PERTURB_COUNT, DEFAULT_PERTURB_DELTA, PipelineConfig,
    ProcessReport, perturb_red, run,
};
pub use pixel::{Pixel, PixelBuffer, copy};
pub use sampler::{BoundedSampler, sample};

// Re-export so callers can build pixels without an extra dependency.
pub use rgb;
