//! Per-channel sample extraction.
//!
//! Flattens one intensity plane of a decoded image into a row-major
//! sequence of 8-bit samples: row index outer, column index inner.
//! Deeper images are reduced to 8 bits and alpha is ignored.

use image::DynamicImage;

use crate::decode::is_single_channel;
use crate::types::Channel;

/// Row-major 8-bit intensities of one channel of one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSamples(Vec<u8>);

impl ChannelSamples {
    /// Wrap an existing sample vector.
    #[must_use]
    pub const fn new(samples: Vec<u8>) -> Self {
        Self(samples)
    }

    /// Number of samples (`width * height` of the source image).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the source image had no pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the samples as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the sequence and returns the underlying vector.
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for ChannelSamples {
    fn from(samples: Vec<u8>) -> Self {
        Self(samples)
    }
}

/// Extract the samples of `channel` from `image`.
///
/// A single-channel image yields its gray plane for every selector, so
/// a grayscale input paired with a color input contributes the same
/// intensities to all three color canvases. Requesting [`Channel::Gray`]
/// from a color image yields its luminance.
#[must_use]
pub fn extract(image: &DynamicImage, channel: Channel) -> ChannelSamples {
    if is_single_channel(image) {
        return ChannelSamples(image.to_luma8().into_raw());
    }

    match channel.rgb_index() {
        None => ChannelSamples(image.to_luma8().into_raw()),
        Some(index) => {
            let rgb = image.to_rgb8();
            ChannelSamples(rgb.pixels().map(|p| p.0[index]).collect())
        }
    }
}

/// Extract every channel in `channels`, in order.
///
/// Converts the image to RGB once and splits it, rather than converting
/// once per channel.
#[must_use]
pub fn extract_all(image: &DynamicImage, channels: &[Channel]) -> Vec<ChannelSamples> {
    if is_single_channel(image) || channels.iter().all(|c| c.rgb_index().is_none()) {
        return channels.iter().map(|&c| extract(image, c)).collect();
    }

    let rgb = image.to_rgb8();
    let luma = channels
        .contains(&Channel::Gray)
        .then(|| image.to_luma8().into_raw());

    channels
        .iter()
        .map(|&channel| match channel.rgb_index() {
            Some(index) => ChannelSamples(rgb.pixels().map(|p| p.0[index]).collect()),
            None => ChannelSamples(luma.clone().unwrap_or_default()),
        })
        .collect()
}
