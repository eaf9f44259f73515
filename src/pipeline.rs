//! Load, compare, blur and save: the end-to-end processing run.
//!
//! [`run`] drives the whole flow from a [`PipelineConfig`]:
//!
//! 1. decode the reference and input images,
//! 2. duplicate the input and perturb the duplicate's red channel,
//! 3. save the duplicate and compare it against the reference,
//! 4. blur the input and save the result.
//!
//! A size mismatch between the reference and the input does not stop the
//! blur, and a failure while saving the blurred image does not discard the
//! comparison. Both are carried in the [`ProcessReport`].

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::blur::{LogObserver, blur_observed};
use crate::codec::{HpdecDecoder, HpdecEncoder};
use crate::compare::{PixelDiff, compare};
use crate::error::{HpdecError, Result};
use crate::format;
use crate::limits::ResourceLimits;
use crate::pixel::{PixelBuffer, copy};

/// Default location of the perturbed duplicate.
pub const DEFAULT_MODIFIED_PATH: &str = "HPDEC/bars_modified.hpdec";

/// Default number of pixels touched by [`perturb_red`].
pub const DEFAULT_PERTURB_COUNT: usize = 5;

/// Default red-channel offset applied by [`perturb_red`].
pub const DEFAULT_PERTURB_DELTA: u8 = 50;

/// Add `delta` to the red channel of the first `count` pixels, modulo 255.
///
/// Pixels are visited in row-major order. If the buffer holds fewer than
/// `count` pixels, all of them are changed. Returns the number changed.
///
/// ```
/// use hpdec::{PixelBuffer, perturb_red, rgb::Rgb};
///
/// let mut img = PixelBuffer::filled(3, 1, Rgb::new(250, 0, 0)).unwrap();
/// assert_eq!(perturb_red(&mut img, 2, 10), 2);
/// assert_eq!(img.pixels()[0].r, 5);
/// assert_eq!(img.pixels()[2].r, 250);
/// ```
pub fn perturb_red(buffer: &mut PixelBuffer, count: usize, delta: u8) -> usize {
    let mut changed = 0;
    for p in buffer.pixels_mut().iter_mut().take(count) {
        // Sum < 510 and the result < 255, so the narrowing is lossless.
        p.r = ((u16::from(p.r) + u16::from(delta)) % 255) as u8;
        changed += 1;
    }
    changed
}

/// Inputs and knobs for [`run`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Image compared against the perturbed duplicate.
    pub reference: PathBuf,
    /// Image that is duplicated, perturbed and blurred.
    pub input: PathBuf,
    /// Destination of the blurred image.
    pub output: PathBuf,
    /// Destination of the perturbed duplicate.
    pub modified: PathBuf,
    pub perturb_count: usize,
    pub perturb_delta: u8,
    /// Limits applied when decoding both inputs.
    pub limits: ResourceLimits,
}

impl PipelineConfig {
    /// Config with default perturbation, no limits, and the duplicate
    /// saved to [`DEFAULT_MODIFIED_PATH`].
    pub fn new(
        reference: impl Into<PathBuf>,
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            reference: reference.into(),
            input: input.into(),
            output: output.into(),
            modified: PathBuf::from(DEFAULT_MODIFIED_PATH),
            perturb_count: DEFAULT_PERTURB_COUNT,
            perturb_delta: DEFAULT_PERTURB_DELTA,
            limits: ResourceLimits::none(),
        }
    }

    pub fn with_modified(mut self, path: impl Into<PathBuf>) -> Self {
        self.modified = path.into();
        self
    }

    pub fn with_perturbation(mut self, count: usize, delta: u8) -> Self {
        self.perturb_count = count;
        self.perturb_delta = delta;
        self
    }

    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Outcome of a [`run`] that got past loading and saving the perturbed copy.
#[derive(Debug)]
#[non_exhaustive]
pub struct ProcessReport {
    /// Reference vs. perturbed duplicate, or why they could not be compared.
    pub diff: Result<PixelDiff>,
    /// Set if the blurred image could not be saved.
    pub output_error: Option<HpdecError>,
}

impl ProcessReport {
    /// Whether the comparison and the final save both succeeded.
    pub fn is_complete(&self) -> bool {
        self.diff.is_ok() && self.output_error.is_none()
    }
}

/// Run the full pipeline described in the module docs.
///
/// Decode, duplicate, perturbed-save and blur errors abort the run and are
/// returned directly. A failed comparison or a failed save of the blurred
/// output is recorded in the report and the remaining steps still run.
pub fn run(config: &PipelineConfig) -> Result<ProcessReport> {
    let decoder = HpdecDecoder::new().with_limits(config.limits);
    let encoder = HpdecEncoder::new();

    let reference = load_logged(&decoder, &config.reference, "reference")?;
    let input = load_logged(&decoder, &config.input, "input")?;

    let mut modified = copy(&input)?;
    let changed = perturb_red(&mut modified, config.perturb_count, config.perturb_delta);
    debug!("perturbed red channel of {changed} pixels");

    warn_extension(&config.modified);
    ensure_parent(&config.modified)?;
    encoder.save(&modified, &config.modified)?;
    info!("saved perturbed copy to {}", config.modified.display());

    let diff = compare(&reference, &modified);
    match &diff {
        Ok(d) => {
            info!("identical pixels: {}", d.identical);
            info!("different pixels: {}", d.different);
        }
        Err(e) => warn!("comparison skipped: {e}"),
    }

    let blurred = blur_observed(&input, &mut LogObserver::default())?;

    warn_extension(&config.output);
    let output_error = match encoder.save(&blurred, &config.output) {
        Ok(()) => {
            info!("saved blurred image to {}", config.output.display());
            None
        }
        Err(e) => {
            warn!("failed to save {}: {e}", config.output.display());
            Some(e)
        }
    };

    Ok(ProcessReport { diff, output_error })
}

fn load_logged(decoder: &HpdecDecoder, path: &Path, role: &str) -> Result<PixelBuffer> {
    warn_extension(path);
    let img = decoder.load(path)?;
    info!(
        "loaded {role} {} ({}x{})",
        path.display(),
        img.width(),
        img.height()
    );
    Ok(img)
}

fn warn_extension(path: &Path) {
    if !format::has_extension(path) {
        warn!(
            "{} does not use the .{} extension",
            path.display(),
            format::EXTENSION
        );
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(HpdecError::Write)?;
    }
    Ok(())
}
