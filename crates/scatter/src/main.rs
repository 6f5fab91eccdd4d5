//! scatter: Plot a paired-pixel intensity scatter diagram of two images.
//!
//! For every pixel position the intensity in `infile1` selects the column
//! and the intensity in `infile2` selects the row of a 256×256 output
//! image. Grayscale inputs yield a grayscale diagram; anything else is
//! plotted per RGB channel into the matching output channel.
//!
//! # Usage
//!
//! ```text
//! scatter [-s scale] [-m] infile1 infile2 outfile
//! scatter [-h|-help]
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use scatter_pipeline::diagnostics::{Clock, ScatterDiagnostics};
use scatter_pipeline::{DownsampleFilter, InputImage, ScatterConfig, ScatterError};

/// Plot a paired-pixel intensity scatter diagram of two images.
///
/// Both images are first shrunk to fit within `scale` pixels per side and
/// must then have identical dimensions.
#[derive(Parser)]
#[command(name = "scatter", version)]
struct Cli {
    /// First input image; its intensities select the column.
    infile1: PathBuf,

    /// Second input image; its intensities select the row.
    infile2: PathBuf,

    /// Output image; the format follows the extension.
    outfile: PathBuf,

    /// Maximum side length of the inputs after downsampling.
    #[arg(short, long, default_value_t = ScatterConfig::DEFAULT_SCALE, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    scale: u32,

    /// Flip the diagram vertically so intensity 0 of the second image is at the bottom.
    #[arg(short, long)]
    mirror: bool,

    /// Downsample filter (disabled, nearest, triangle, catmull-rom, gaussian, lanczos3).
    #[arg(long, value_enum, default_value_t = CLI_DEFAULT_FILTER)]
    filter: Filter,

    /// Increase log verbosity (repeatable). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print per-stage diagnostics to stderr.
    #[arg(long)]
    diagnostics: bool,

    /// Print diagnostics as JSON to stdout instead of the text report.
    #[arg(long)]
    json: bool,
}

/// Downsample resampling filter selection.
#[derive(Clone, Copy, ValueEnum)]
enum Filter {
    /// Disabled: plot every pixel regardless of image size.
    Disabled,
    /// Nearest-neighbor (fastest, keeps original intensities).
    Nearest,
    /// Bilinear interpolation.
    Triangle,
    /// Bicubic Catmull-Rom.
    CatmullRom,
    /// Gaussian.
    Gaussian,
    /// Lanczos with 3 lobes.
    Lanczos3,
}

impl From<Filter> for DownsampleFilter {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::Disabled => Self::Disabled,
            Filter::Nearest => Self::Nearest,
            Filter::Triangle => Self::Triangle,
            Filter::CatmullRom => Self::CatmullRom,
            Filter::Gaussian => Self::Gaussian,
            Filter::Lanczos3 => Self::Lanczos3,
        }
    }
}

const fn filter_from_pipeline(f: DownsampleFilter) -> Filter {
    match f {
        DownsampleFilter::Disabled => Filter::Disabled,
        DownsampleFilter::Nearest => Filter::Nearest,
        DownsampleFilter::Triangle => Filter::Triangle,
        DownsampleFilter::CatmullRom => Filter::CatmullRom,
        DownsampleFilter::Gaussian => Filter::Gaussian,
        DownsampleFilter::Lanczos3 => Filter::Lanczos3,
    }
}

const CLI_DEFAULT_FILTER: Filter = filter_from_pipeline(ScatterConfig::DEFAULT_DOWNSAMPLE_FILTER);

impl Cli {
    fn config(&self) -> ScatterConfig {
        ScatterConfig {
            scale: self.scale,
            mirror: self.mirror,
            downsample_filter: self.filter.into(),
        }
    }

    const fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Accept the single-dash `-help` spelling alongside `-h` and `--help`.
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| {
            if arg == "-help" {
                OsString::from("--help")
            } else {
                arg
            }
        })
        .collect()
}

/// Render a pipeline error, naming the file for input-specific failures.
fn describe(err: &ScatterError, cli: &Cli) -> String {
    match err {
        ScatterError::Input { input, source } => {
            let path = match input {
                InputImage::First => &cli.infile1,
                InputImage::Second => &cli.infile2,
            };
            format!("{}: {source}", path.display())
        }
        other => other.to_string(),
    }
}

fn emit_diagnostics(cli: &Cli, diagnostics: &ScatterDiagnostics) -> Result<(), String> {
    if cli.json {
        let json = serde_json::to_string_pretty(diagnostics)
            .map_err(|e| format!("error serializing diagnostics: {e}"))?;
        println!("{json}");
    } else if cli.diagnostics {
        eprintln!("{}", diagnostics.report());
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<(), String> {
    let config = cli.config();
    let first = scatter_io::read_input(&cli.infile1).map_err(|e| e.to_string())?;
    let second = scatter_io::read_input(&cli.infile2).map_err(|e| e.to_string())?;

    let (result, diagnostics) =
        scatter_pipeline::diagnostics::process_with_diagnostics(&first, &second, &config, &StdClock)
            .map_err(|e| describe(&e, cli))?;

    log::info!(
        "writing {} diagram to {}",
        result.color_mode,
        cli.outfile.display()
    );
    scatter_io::write_output(&cli.outfile, result.image).map_err(|e| e.to_string())?;

    emit_diagnostics(cli, &diagnostics)
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse_from(normalize_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
            // A failed write to the terminal still leaves the exit code.
            let _ = err.print();
            return code;
        }
    };

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("scatter: {msg}");
            ExitCode::FAILURE
        }
    }
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}
