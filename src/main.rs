use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use hpdec::{DEFAULT_MODIFIED_PATH, PipelineConfig, ResourceLimits};

#[derive(Parser)]
#[command(
    name = "hpdec-process",
    about = "Compare, perturb and blur HPDEC images"
)]
struct Args {
    /// Image compared against the perturbed copy of INPUT
    reference: PathBuf,

    /// Image to perturb and blur
    input: PathBuf,

    /// Destination of the blurred image
    output: PathBuf,

    /// Destination of the perturbed copy
    #[arg(long, default_value = DEFAULT_MODIFIED_PATH)]
    modified: PathBuf,

    /// Reject images with more pixels than this
    #[arg(long)]
    max_pixels: Option<u64>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = Args::parse();
    let mut limits = ResourceLimits::none();
    if let Some(max) = args.max_pixels {
        limits = limits.with_max_pixels(max);
    }
    let config = PipelineConfig::new(args.reference, args.input, args.output)
        .with_modified(args.modified)
        .with_limits(limits);

    match hpdec::run(&config) {
        Ok(report) => {
            match &report.diff {
                Ok(diff) => {
                    println!("Identical pixels: {}", diff.identical);
                    println!("Different pixels: {}", diff.different);
                }
                Err(e) => log::error!("{e}"),
            }
            if let Some(e) = &report.output_error {
                log::error!("{e}");
            }
            if report.is_complete() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
