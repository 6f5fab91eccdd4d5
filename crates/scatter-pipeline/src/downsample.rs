//! Image downsampling to the scatter sampling bound.
//!
//! Shrinks each input so it fits inside a `scale × scale` box while
//! keeping its aspect ratio. Uniform downscaling keeps the sample
//! distribution representative while bounding the number of points
//! fed to the plotter.
//!
//! Images already within the bound are returned unchanged; they are
//! never enlarged.

use std::fmt;

use image::DynamicImage;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// How an oversized input is shrunk to the sampling bound.
///
/// Smoothing filters blend neighboring intensities, so they can plot
/// pairs that never occur in the source; `Nearest` only ever picks
/// existing pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownsampleFilter {
    /// Keep the full-resolution image and plot every pixel.
    Disabled,
    /// Pick the closest source pixel.
    Nearest,
    /// Bilinear.
    #[default]
    Triangle,
    /// Bicubic, Catmull-Rom spline.
    CatmullRom,
    /// Gaussian-weighted.
    Gaussian,
    /// Three-lobe Lanczos.
    Lanczos3,
}

impl DownsampleFilter {
    /// Command-line spelling of the filter.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Nearest => "nearest",
            Self::Triangle => "triangle",
            Self::CatmullRom => "catmull-rom",
            Self::Gaussian => "gaussian",
            Self::Lanczos3 => "lanczos3",
        }
    }

    const fn resampler(self) -> Option<FilterType> {
        Some(match self {
            Self::Disabled => return None,
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Gaussian => FilterType::Gaussian,
            Self::Lanczos3 => FilterType::Lanczos3,
        })
    }
}

impl fmt::Display for DownsampleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fit `image` inside a `max_dimension` square.
///
/// The flag is `true` only when a resampled copy was produced.
#[must_use]
pub fn downsample(
    image: &DynamicImage,
    max_dimension: u32,
    filter: DownsampleFilter,
) -> (DynamicImage, bool) {
    match filter.resampler() {
        Some(resampler) if image.width().max(image.height()) > max_dimension => {
            (image.resize(max_dimension, max_dimension, resampler), true)
        }
        _ => (image.clone(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_image(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(image::RgbImage::from_pixel(w, h, image::Rgb([128, 64, 32])))
    }

    #[test]
    fn names_match_command_line_spelling() {
        let all = [
            DownsampleFilter::Disabled,
            DownsampleFilter::Nearest,
            DownsampleFilter::Triangle,
            DownsampleFilter::CatmullRom,
            DownsampleFilter::Gaussian,
            DownsampleFilter::Lanczos3,
        ];
        let names: Vec<&str> = all.iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            ["disabled", "nearest", "triangle", "catmull-rom", "gaussian", "lanczos3"]
        );
        assert_eq!(DownsampleFilter::CatmullRom.to_string(), "catmull-rom");
    }

    #[test]
    fn default_filter_is_triangle() {
        assert_eq!(DownsampleFilter::default(), DownsampleFilter::Triangle);
    }

    #[test]
    fn no_downsample_when_already_small() {
        let (result, applied) = downsample(&test_image(40, 30), 50, DownsampleFilter::Triangle);
        assert!(!applied);
        assert_eq!((result.width(), result.height()), (40, 30));
    }

    #[test]
    fn no_downsample_when_exact_match() {
        let (result, applied) = downsample(&test_image(50, 20), 50, DownsampleFilter::Triangle);
        assert!(!applied);
        assert_eq!((result.width(), result.height()), (50, 20));
    }

    #[test]
    fn downsample_landscape() {
        let (result, applied) = downsample(&test_image(200, 100), 50, DownsampleFilter::Triangle);
        assert!(applied);
        assert_eq!((result.width(), result.height()), (50, 25));
    }

    #[test]
    fn downsample_portrait() {
        let (result, applied) = downsample(&test_image(100, 200), 50, DownsampleFilter::Nearest);
        assert!(applied);
        assert_eq!((result.width(), result.height()), (25, 50));
    }

    #[test]
    fn downsample_square() {
        let (result, applied) = downsample(&test_image(1000, 1000), 50, DownsampleFilter::Triangle);
        assert!(applied);
        assert_eq!((result.width(), result.height()), (50, 50));
    }

    #[test]
    fn uniform_image_keeps_its_value() {
        let (result, _) = downsample(&test_image(300, 300), 50, DownsampleFilter::Triangle);
        let rgb = result.to_rgb8();
        assert!(rgb.pixels().all(|p| p.0 == [128, 64, 32]));
    }

    #[test]
    fn disabled_filter_skips_even_large_image() {
        let (result, applied) = downsample(&test_image(400, 300), 50, DownsampleFilter::Disabled);
        assert!(!applied);
        assert_eq!((result.width(), result.height()), (400, 300));
    }
}
