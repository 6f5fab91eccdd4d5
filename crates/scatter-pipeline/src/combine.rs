//! Channel recombination and mirroring.
//!
//! A single canvas passes through as a gray image; three canvases
//! become the red, green and blue planes of one RGB image. The optional
//! vertical flip moves the (0, 0) intensity pair to the bottom-left.

use image::{DynamicImage, Rgb, imageops};

use crate::plot::{CANVAS_SIZE, ScatterCanvas};
use crate::types::{GrayImage, RgbImage, ScatterError};

/// Final scatter diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScatterImage {
    /// Single-channel diagram for a pair of grayscale inputs.
    Gray(GrayImage),
    /// Red, green and blue canvases composited into one image.
    Rgb(RgbImage),
}

impl ScatterImage {
    /// Width and height of the diagram.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Gray(img) => img.dimensions(),
            Self::Rgb(img) => img.dimensions(),
        }
    }

    /// Number of channels in the diagram (1 or 3).
    #[must_use]
    pub const fn channel_count(&self) -> usize {
        match self {
            Self::Gray(_) => 1,
            Self::Rgb(_) => 3,
        }
    }

    /// Flip the diagram top-to-bottom in place.
    pub fn flip_vertical(&mut self) {
        match self {
            Self::Gray(img) => imageops::flip_vertical_in_place(img),
            Self::Rgb(img) => imageops::flip_vertical_in_place(img),
        }
    }

    /// Convert into a [`DynamicImage`] for encoding.
    #[must_use]
    pub fn into_dynamic(self) -> DynamicImage {
        match self {
            Self::Gray(img) => DynamicImage::ImageLuma8(img),
            Self::Rgb(img) => DynamicImage::ImageRgb8(img),
        }
    }
}

/// Merge per-channel canvases into the output diagram.
///
/// `canvases` holds one gray canvas, or red, green and blue canvases in
/// that order. When `mirror` is set the result is flipped vertically.
///
/// # Errors
///
/// Returns [`ScatterError::ChannelCount`] for any other number of
/// canvases.
pub fn combine(canvases: Vec<ScatterCanvas>, mirror: bool) -> Result<ScatterImage, ScatterError> {
    let mut output = match <[ScatterCanvas; 1]>::try_from(canvases) {
        Ok([gray]) => ScatterImage::Gray(gray.into_gray()),
        Err(canvases) => match <[ScatterCanvas; 3]>::try_from(canvases) {
            Ok([red, green, blue]) => ScatterImage::Rgb(compose_rgb(&red, &green, &blue)),
            Err(canvases) => return Err(ScatterError::ChannelCount(canvases.len())),
        },
    };

    if mirror {
        output.flip_vertical();
    }
    Ok(output)
}

fn compose_rgb(red: &ScatterCanvas, green: &ScatterCanvas, blue: &ScatterCanvas) -> RgbImage {
    let (r, g, b) = (red.as_gray(), green.as_gray(), blue.as_gray());
    RgbImage::from_fn(CANVAS_SIZE, CANVAS_SIZE, |x, y| {
        Rgb([
            r.get_pixel(x, y).0[0],
            g.get_pixel(x, y).0[0],
            b.get_pixel(x, y).0[0],
        ])
    })
}
