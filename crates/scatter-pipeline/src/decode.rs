//! Image decoding and colorspace detection.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP, GIF, TIFF, PNM) and
//! produces a [`DynamicImage`]. Whether the decoded image is
//! single-channel decides if a pair of inputs is plotted as one gray
//! canvas or three color canvases.

use image::DynamicImage;

use crate::types::{Dimensions, ScatterError};

/// Decode raw image bytes.
///
/// # Errors
///
/// Returns [`ScatterError::EmptyInput`] if `bytes` is empty.
/// Returns [`ScatterError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ScatterError> {
    if bytes.is_empty() {
        return Err(ScatterError::EmptyInput);
    }

    Ok(image::load_from_memory(bytes)?)
}

/// Whether a decoded image has a single intensity plane.
///
/// Luma images with or without alpha count as single-channel. Any
/// color type carrying color planes does not, even if every pixel
/// happens to be neutral.
#[must_use]
pub fn is_single_channel(image: &DynamicImage) -> bool {
    !image.color().has_color()
}

/// Dimensions of a decoded image.
#[must_use]
pub fn dimensions(image: &DynamicImage) -> Dimensions {
    Dimensions::new(image.width(), image.height())
}

/// Require two images to share both width and height.
///
/// Width and height are compared independently: a difference in
/// either one is a mismatch.
///
/// # Errors
///
/// Returns [`ScatterError::DimensionMismatch`] when the sizes differ.
pub fn check_dimensions(
    first: &DynamicImage,
    second: &DynamicImage,
) -> Result<Dimensions, ScatterError> {
    let first = dimensions(first);
    let second = dimensions(second);
    if first.width != second.width || first.height != second.height {
        return Err(ScatterError::DimensionMismatch { first, second });
    }
    Ok(first)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn encode_png(img: &DynamicImage) -> Vec<u8> {
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn gray(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(image::GrayImage::new(w, h))
    }

    #[test]
    fn empty_input_returns_error() {
        assert!(matches!(decode(&[]), Err(ScatterError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_returns_image_decode_error() {
        let result = decode(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(ScatterError::ImageDecode(_))));
    }

    #[test]
    fn gray_png_decodes_as_single_channel() {
        let bytes = encode_png(&gray(3, 2));
        let img = decode(&bytes).unwrap();
        assert!(is_single_channel(&img));
        assert_eq!(dimensions(&img), Dimensions::new(3, 2));
    }

    #[test]
    fn rgb_png_is_not_single_channel() {
        let rgb = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            2,
            2,
            image::Rgb([10, 10, 10]),
        ));
        let img = decode(&encode_png(&rgb)).unwrap();
        assert!(!is_single_channel(&img));
    }

    #[test]
    fn gray_with_alpha_is_single_channel() {
        let la = DynamicImage::ImageLumaA8(image::GrayAlphaImage::new(2, 2));
        assert!(is_single_channel(&la));
    }

    #[test]
    fn matching_dimensions_pass() {
        let d = check_dimensions(&gray(10, 10), &gray(10, 10)).unwrap();
        assert_eq!(d, Dimensions::new(10, 10));
    }

    #[test]
    fn height_only_mismatch_is_rejected() {
        let result = check_dimensions(&gray(10, 10), &gray(10, 12));
        assert!(matches!(
            result,
            Err(ScatterError::DimensionMismatch { first, second })
                if first == Dimensions::new(10, 10) && second == Dimensions::new(10, 12)
        ));
    }

    #[test]
    fn width_only_mismatch_is_rejected() {
        let result = check_dimensions(&gray(12, 10), &gray(10, 10));
        assert!(matches!(result, Err(ScatterError::DimensionMismatch { .. })));
    }
}
