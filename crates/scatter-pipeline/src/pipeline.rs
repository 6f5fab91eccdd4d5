//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::process`] which runs the whole transform in one call,
//! [`Pipeline`] lets the caller drive execution one step at a time:
//!
//! ```rust
//! # use scatter_pipeline::{Pipeline, ScatterConfig, ScatterError};
//! # fn run(a: &[u8], b: &[u8]) -> Result<(), ScatterError> {
//! let config = ScatterConfig::default();
//! let result = Pipeline::new(a, b, config)
//!     .decode()?
//!     .downsample()?
//!     .extract()
//!     .plot()?
//!     .combine()?;
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline state
//! (or `Result` for fallible stages). All validation happens before
//! [`Extracted::plot`], so a failing run never plots anything.

use image::DynamicImage;

use crate::channel::{self, ChannelSamples};
use crate::decode;
use crate::plot::{self, ScatterCanvas};
use crate::types::{
    Channel, ColorMode, Dimensions, InputImage, ScatterConfig, ScatterError, ScatterResult,
};

/// Entry point for the staged pipeline.
pub struct Pipeline;

impl Pipeline {
    /// Start a pipeline over two encoded images.
    pub const fn new<'a>(first: &'a [u8], second: &'a [u8], config: ScatterConfig) -> Pending<'a> {
        Pending {
            config,
            first,
            second,
        }
    }

    /// Start a pipeline over two already-decoded images.
    ///
    /// # Errors
    ///
    /// Returns [`ScatterError::InvalidConfig`] if `config` is invalid.
    pub fn from_images(
        first: DynamicImage,
        second: DynamicImage,
        config: ScatterConfig,
    ) -> Result<Decoded, ScatterError> {
        config.validate()?;
        Ok(Decoded::new(config, first, second))
    }
}

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
#[must_use = "pipeline stages are consumed by advancing; call .decode() to continue"]
pub struct Pending<'a> {
    config: ScatterConfig,
    first: &'a [u8],
    second: &'a [u8],
}

impl Pending<'_> {
    /// Total number of encoded input bytes.
    #[must_use]
    pub const fn input_bytes(&self) -> usize {
        self.first.len() + self.second.len()
    }

    /// Validate the configuration and decode both inputs.
    ///
    /// # Errors
    ///
    /// Returns [`ScatterError::InvalidConfig`] for an invalid config, or
    /// [`ScatterError::Input`] wrapping the decode failure of whichever
    /// input could not be read.
    pub fn decode(self) -> Result<Decoded, ScatterError> {
        self.config.validate()?;
        let first = decode::decode(self.first).map_err(|e| e.for_input(InputImage::First))?;
        let second = decode::decode(self.second).map_err(|e| e.for_input(InputImage::Second))?;
        Ok(Decoded::new(self.config, first, second))
    }
}

// ───────────────────────── Stage 1: Decoded ──────────────────────────

/// Pipeline state after decoding both inputs.
#[must_use = "pipeline stages are consumed by advancing; call .downsample() to continue"]
pub struct Decoded {
    config: ScatterConfig,
    first: DynamicImage,
    second: DynamicImage,
    color_mode: ColorMode,
}

impl Decoded {
    fn new(config: ScatterConfig, first: DynamicImage, second: DynamicImage) -> Self {
        let color_mode = ColorMode::for_inputs(
            decode::is_single_channel(&first),
            decode::is_single_channel(&second),
        );
        log::debug!(
            "decoded inputs: {} ({:?}) and {} ({:?}), plotting as {color_mode}",
            decode::dimensions(&first),
            first.color(),
            decode::dimensions(&second),
            second.color(),
        );
        Self {
            config,
            first,
            second,
            color_mode,
        }
    }

    /// Source dimensions of both inputs, before downsampling.
    #[must_use]
    pub fn source_dimensions(&self) -> (Dimensions, Dimensions) {
        (
            decode::dimensions(&self.first),
            decode::dimensions(&self.second),
        )
    }

    /// Color mode selected from the inputs' color types.
    #[must_use]
    pub const fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// Downsample both inputs to the configured bound and require
    /// matching working dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`ScatterError::DimensionMismatch`] if the downsampled
    /// images differ in width or height.
    pub fn downsample(self) -> Result<Downsampled, ScatterError> {
        let scale = self.config.scale;
        let filter = self.config.downsample_filter;
        let (first, first_applied) = crate::downsample::downsample(&self.first, scale, filter);
        let (second, second_applied) = crate::downsample::downsample(&self.second, scale, filter);
        let dimensions = decode::check_dimensions(&first, &second)?;
        log::debug!("working dimensions {dimensions} (bound {scale}, filter {filter})");
        Ok(Downsampled {
            config: self.config,
            first,
            second,
            color_mode: self.color_mode,
            dimensions,
            applied: first_applied || second_applied,
        })
    }
}

// ───────────────────────── Stage 2: Downsampled ──────────────────────

/// Pipeline state after both inputs fit within the scale bound.
#[must_use = "pipeline stages are consumed by advancing; call .extract() to continue"]
pub struct Downsampled {
    config: ScatterConfig,
    first: DynamicImage,
    second: DynamicImage,
    color_mode: ColorMode,
    dimensions: Dimensions,
    applied: bool,
}

impl Downsampled {
    /// Working dimensions shared by both inputs.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Whether either input was actually shrunk.
    #[must_use]
    pub const fn applied(&self) -> bool {
        self.applied
    }

    /// Extract the paired sample sequences of every plotted channel.
    pub fn extract(self) -> Extracted {
        let channels = self.color_mode.channels();
        let first = channel::extract_all(&self.first, channels);
        let second = channel::extract_all(&self.second, channels);
        let pairs = channels
            .iter()
            .copied()
            .zip(first.into_iter().zip(second))
            .collect();
        Extracted {
            config: self.config,
            color_mode: self.color_mode,
            dimensions: self.dimensions,
            pairs,
        }
    }
}

// ───────────────────────── Stage 3: Extracted ────────────────────────

/// Pipeline state holding the paired sample sequences.
#[must_use = "pipeline stages are consumed by advancing; call .plot() to continue"]
pub struct Extracted {
    config: ScatterConfig,
    color_mode: ColorMode,
    dimensions: Dimensions,
    pairs: Vec<(Channel, (ChannelSamples, ChannelSamples))>,
}

impl Extracted {
    /// Color mode selected from the inputs' color types.
    #[must_use]
    pub const fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// Channels about to be plotted, in output order.
    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.pairs.iter().map(|(channel, _)| *channel)
    }

    /// Sample pairs per channel.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.pairs.first().map_or(0, |(_, (a, _))| a.len())
    }

    /// Plot every channel.
    ///
    /// # Errors
    ///
    /// Returns [`ScatterError::LengthMismatch`] if a channel's sequences
    /// differ in length.
    pub fn plot(self) -> Result<Plotted, ScatterError> {
        let (channels, pairs): (Vec<Channel>, Vec<_>) = self.pairs.into_iter().unzip();
        let canvases = plot::plot_channels(&pairs)?;
        for (channel, canvas) in channels.iter().zip(&canvases) {
            log::debug!("{channel}: {} distinct points", canvas.point_count());
        }
        Ok(Plotted {
            config: self.config,
            color_mode: self.color_mode,
            dimensions: self.dimensions,
            canvases: channels.into_iter().zip(canvases).collect(),
        })
    }
}

// ───────────────────────── Stage 4: Plotted ──────────────────────────

/// Pipeline state holding one canvas per channel.
#[must_use = "pipeline stages are consumed by advancing; call .combine() to continue"]
pub struct Plotted {
    config: ScatterConfig,
    color_mode: ColorMode,
    dimensions: Dimensions,
    canvases: Vec<(Channel, ScatterCanvas)>,
}

impl Plotted {
    /// Per-channel canvases, in output order.
    #[must_use]
    pub fn canvases(&self) -> &[(Channel, ScatterCanvas)] {
        &self.canvases
    }

    /// Merge the canvases into the output diagram, mirroring if
    /// configured.
    ///
    /// # Errors
    ///
    /// Returns [`ScatterError::ChannelCount`] if the canvas count is
    /// neither 1 nor 3.
    pub fn combine(self) -> Result<ScatterResult, ScatterError> {
        let planes = self.canvases.iter().map(|(_, c)| c.clone()).collect();
        let image = crate::combine::combine(planes, self.config.mirror)?;
        Ok(ScatterResult {
            image,
            color_mode: self.color_mode,
            dimensions: self.dimensions,
            canvases: self.canvases,
        })
    }
}
