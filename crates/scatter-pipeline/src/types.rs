//! Shared types for the scatter diagram pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::combine::ScatterImage;
use crate::downsample::DownsampleFilter;
use crate::plot::ScatterCanvas;

/// Re-export `GrayImage` so downstream crates can reference canvas
/// rasters without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbImage` for the three-channel composite output.
pub use image::RgbImage;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create new dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of pixels (`width * height`).
    #[must_use]
    pub const fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A single intensity plane of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Luminance of a single-channel image.
    Gray,
    /// Red plane of an RGB image.
    Red,
    /// Green plane of an RGB image.
    Green,
    /// Blue plane of an RGB image.
    Blue,
}

impl Channel {
    /// Index of this channel within an RGB pixel, or `None` for gray.
    #[must_use]
    pub const fn rgb_index(self) -> Option<usize> {
        match self {
            Self::Gray => None,
            Self::Red => Some(0),
            Self::Green => Some(1),
            Self::Blue => Some(2),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gray => f.write_str("Gray"),
            Self::Red => f.write_str("Red"),
            Self::Green => f.write_str("Green"),
            Self::Blue => f.write_str("Blue"),
        }
    }
}

/// Whether a pair of inputs is plotted as one gray plane or three
/// color planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
    /// Both inputs are single-channel: one canvas, gray output.
    Gray,
    /// At least one input carries color: three canvases, RGB output.
    Rgb,
}

impl ColorMode {
    const GRAY_CHANNELS: [Channel; 1] = [Channel::Gray];
    const RGB_CHANNELS: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Pick the mode for two inputs given whether each is single-channel.
    #[must_use]
    pub const fn for_inputs(first_single_channel: bool, second_single_channel: bool) -> Self {
        if first_single_channel && second_single_channel {
            Self::Gray
        } else {
            Self::Rgb
        }
    }

    /// Channels to plot, in output order.
    #[must_use]
    pub const fn channels(self) -> &'static [Channel] {
        match self {
            Self::Gray => &Self::GRAY_CHANNELS,
            Self::Rgb => &Self::RGB_CHANNELS,
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gray => f.write_str("Gray"),
            Self::Rgb => f.write_str("RGB"),
        }
    }
}

/// Configuration for a scatter diagram run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterConfig {
    /// Maximum width and height, in pixels, each input is downsampled to
    /// before its samples are extracted. Images already within the bound
    /// are never enlarged.
    ///
    /// Must be at least 1.
    pub scale: u32,

    /// Flip the output vertically so the (0, 0) intensity pair sits at the
    /// bottom-left corner.
    pub mirror: bool,

    /// Resampling filter used when downsampling.
    pub downsample_filter: DownsampleFilter,
}

impl ScatterConfig {
    /// Default downsampling bound.
    pub const DEFAULT_SCALE: u32 = 50;

    /// Default resampling filter.
    pub const DEFAULT_DOWNSAMPLE_FILTER: DownsampleFilter = DownsampleFilter::Triangle;

    /// Check the configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ScatterError::InvalidConfig`] if `scale` is zero.
    pub fn validate(&self) -> Result<(), ScatterError> {
        if self.scale == 0 {
            return Err(ScatterError::InvalidConfig(
                "scale must be a positive integer".to_owned(),
            ));
        }
        Ok(())
    }
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            scale: Self::DEFAULT_SCALE,
            mirror: false,
            downsample_filter: Self::DEFAULT_DOWNSAMPLE_FILTER,
        }
    }
}

/// Result of running the full scatter pipeline.
#[derive(Debug, Clone)]
pub struct ScatterResult {
    /// The finished (and possibly mirrored) diagram.
    pub image: ScatterImage,

    /// Whether the inputs were plotted as one gray plane or three color
    /// planes.
    pub color_mode: ColorMode,

    /// Working dimensions shared by both inputs after downsampling.
    pub dimensions: Dimensions,

    /// Unmirrored canvas of every plotted channel, in output order.
    pub canvases: Vec<(Channel, ScatterCanvas)>,
}

impl ScatterResult {
    /// Number of sample pairs plotted per channel.
    #[must_use]
    pub const fn sample_count(&self) -> u64 {
        self.dimensions.pixel_count()
    }

    /// Distinct points on each channel's canvas.
    #[must_use]
    pub fn point_counts(&self) -> Vec<(Channel, usize)> {
        self.canvases
            .iter()
            .map(|(channel, canvas)| (*channel, canvas.point_count()))
            .collect()
    }
}

/// Which of the two compared images an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputImage {
    /// Image A, plotted along the horizontal axis.
    First,
    /// Image B, plotted along the vertical axis.
    Second,
}

impl fmt::Display for InputImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("first"),
            Self::Second => f.write_str("second"),
        }
    }
}

/// Errors that can occur while building a scatter diagram.
///
/// Uses custom `Serialize`/`Deserialize` because `image::ImageError`
/// does not implement serde traits. The `ImageDecode` variant is
/// serialized as its `Display` string.
#[derive(Debug, thiserror::Error)]
pub enum ScatterError {
    /// Failed to decode an input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// A decode failure attributed to one of the two inputs.
    #[error("{input} input: {source}")]
    Input {
        /// The input that failed.
        input: InputImage,
        /// The underlying failure.
        source: Box<Self>,
    },

    /// The two inputs differ in width or height after downsampling.
    #[error("input images differ in size after scaling: {first} vs {second}")]
    DimensionMismatch {
        /// Working dimensions of the first image.
        first: Dimensions,
        /// Working dimensions of the second image.
        second: Dimensions,
    },

    /// Paired sample sequences have different lengths.
    #[error("sample sequences differ in length: {first} vs {second}")]
    LengthMismatch {
        /// Length of the first sequence.
        first: usize,
        /// Length of the second sequence.
        second: usize,
    },

    /// The combiner was given neither one nor three canvases.
    #[error("expected 1 or 3 channel canvases, got {0}")]
    ChannelCount(usize),

    /// Configuration is invalid.
    #[error("invalid scatter configuration: {0}")]
    InvalidConfig(String),
}

impl ScatterError {
    /// Attribute this error to one of the inputs.
    #[must_use]
    pub fn for_input(self, input: InputImage) -> Self {
        Self::Input {
            input,
            source: Box::new(self),
        }
    }
}

/// Serde-compatible proxy for `ScatterError`.
///
/// A deserialized `ImageDecode` is reconstructed as `InvalidConfig`
/// carrying the original message, since `image::ImageError` cannot be
/// rebuilt from a string.
#[derive(Serialize, Deserialize)]
enum ScatterErrorProxy {
    ImageDecode(String),
    EmptyInput,
    Input {
        input: InputImage,
        source: Box<ScatterErrorProxy>,
    },
    DimensionMismatch {
        first: Dimensions,
        second: Dimensions,
    },
    LengthMismatch {
        first: usize,
        second: usize,
    },
    ChannelCount(usize),
    InvalidConfig(String),
}

impl From<&ScatterError> for ScatterErrorProxy {
    fn from(err: &ScatterError) -> Self {
        match err {
            ScatterError::ImageDecode(e) => Self::ImageDecode(e.to_string()),
            ScatterError::EmptyInput => Self::EmptyInput,
            ScatterError::Input { input, source } => Self::Input {
                input: *input,
                source: Box::new(Self::from(source.as_ref())),
            },
            ScatterError::DimensionMismatch { first, second } => Self::DimensionMismatch {
                first: *first,
                second: *second,
            },
            ScatterError::LengthMismatch { first, second } => Self::LengthMismatch {
                first: *first,
                second: *second,
            },
            ScatterError::ChannelCount(n) => Self::ChannelCount(*n),
            ScatterError::InvalidConfig(s) => Self::InvalidConfig(s.clone()),
        }
    }
}

impl From<ScatterErrorProxy> for ScatterError {
    fn from(proxy: ScatterErrorProxy) -> Self {
        match proxy {
            ScatterErrorProxy::ImageDecode(msg) => {
                Self::InvalidConfig(format!("image decode error: {msg}"))
            }
            ScatterErrorProxy::EmptyInput => Self::EmptyInput,
            ScatterErrorProxy::Input { input, source } => Self::Input {
                input,
                source: Box::new(Self::from(*source)),
            },
            ScatterErrorProxy::DimensionMismatch { first, second } => {
                Self::DimensionMismatch { first, second }
            }
            ScatterErrorProxy::LengthMismatch { first, second } => {
                Self::LengthMismatch { first, second }
            }
            ScatterErrorProxy::ChannelCount(n) => Self::ChannelCount(n),
            ScatterErrorProxy::InvalidConfig(s) => Self::InvalidConfig(s),
        }
    }
}

impl Serialize for ScatterError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ScatterErrorProxy::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ScatterError {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        ScatterErrorProxy::deserialize(deserializer).map(Self::from)
    }
}
