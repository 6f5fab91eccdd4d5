//! scatter-pipeline: Paired-pixel intensity scatter diagrams (sans-IO).
//!
//! Compares two equally sized images by plotting, for every pixel
//! position, the intensity in the first image against the intensity in
//! the second on a 256×256 canvas:
//! decode -> downsample -> extract channels -> plot -> combine.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns structured data. Filesystem access lives in
//! `scatter-io`.

pub mod channel;
pub mod combine;
pub mod decode;
pub mod diagnostics;
pub mod downsample;
pub mod pipeline;
pub mod plot;
pub mod types;

pub use channel::ChannelSamples;
pub use combine::ScatterImage;
pub use downsample::DownsampleFilter;
pub use pipeline::Pipeline;
pub use plot::{CANVAS_SIZE, ScatterCanvas};
pub use types::{
    Channel, ColorMode, Dimensions, GrayImage, InputImage, RgbImage, ScatterConfig, ScatterError,
    ScatterResult,
};

/// Build the scatter diagram of two encoded images.
///
/// Takes raw image bytes (PNG, JPEG, BMP, WebP, GIF, TIFF, PNM) for
/// image A and image B and produces a [`ScatterResult`] whose image has a
/// white point at (A intensity, B intensity) for every sampled pixel.
///
/// # Pipeline steps
///
/// 1. Decode both images; pick gray or RGB plotting from their color types
/// 2. Downsample each to fit within `config.scale` pixels per side
/// 3. Require identical working width and height
/// 4. Extract row-major samples per channel
/// 5. Plot each channel onto its own 256×256 canvas
/// 6. Combine canvases into one gray or RGB image, mirrored if configured
///
/// # Errors
///
/// Returns [`ScatterError::InvalidConfig`] if `config.scale` is zero.
/// Returns [`ScatterError::Input`] if either image is empty or cannot be
/// decoded.
/// Returns [`ScatterError::DimensionMismatch`] if the downsampled images
/// differ in width or height.
pub fn process(
    first: &[u8],
    second: &[u8],
    config: &ScatterConfig,
) -> Result<ScatterResult, ScatterError> {
    let result = Pipeline::new(first, second, config.clone())
        .decode()?
        .downsample()?
        .extract()
        .plot()?
        .combine()?;

    log::info!(
        "plotted {} sample pairs from {} inputs ({} mode)",
        result.sample_count(),
        result.dimensions,
        result.color_mode,
    );
    Ok(result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::DynamicImage;

    use super::*;

    fn encode(img: &DynamicImage) -> Vec<u8> {
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn gray_png(w: u32, h: u32, f: impl Fn(u32, u32) -> u8) -> Vec<u8> {
        encode(&DynamicImage::ImageLuma8(image::GrayImage::from_fn(
            w,
            h,
            |x, y| image::Luma([f(x, y)]),
        )))
    }

    fn white_cells(img: &GrayImage) -> Vec<(u32, u32)> {
        img.enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] == 255)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn process_empty_input() {
        let a = gray_png(2, 2, |_, _| 0);
        let result = process(&[], &a, &ScatterConfig::default());
        assert!(matches!(
            result,
            Err(ScatterError::Input {
                input: InputImage::First,
                ref source,
            }) if matches!(**source, ScatterError::EmptyInput)
        ));
    }

    #[test]
    fn process_corrupt_input() {
        let a = gray_png(2, 2, |_, _| 0);
        let result = process(&a, &[0xFF, 0x00], &ScatterConfig::default());
        assert!(matches!(
            result,
            Err(ScatterError::Input {
                input: InputImage::Second,
                ref source,
            }) if matches!(**source, ScatterError::ImageDecode(_))
        ));
    }

    #[test]
    fn identical_gray_images_plot_the_diagonal() {
        let values = [0u8, 255, 128];
        let png = gray_png(3, 1, |x, _| values[x as usize]);
        let result = process(&png, &png, &ScatterConfig::default()).unwrap();
        assert_eq!(result.color_mode, ColorMode::Gray);
        let ScatterImage::Gray(img) = &result.image else {
            unreachable!("gray inputs must produce a gray diagram");
        };
        assert_eq!(white_cells(img), vec![(0, 0), (128, 128), (255, 255)]);
    }

    #[test]
    fn large_constant_images_collapse_to_one_point() {
        let png = gray_png(1000, 1000, |_, _| 200);
        let result = process(&png, &png, &ScatterConfig::default()).unwrap();
        assert_eq!(result.dimensions, Dimensions::new(50, 50));
        assert_eq!(result.sample_count(), 2500);
        let ScatterImage::Gray(img) = &result.image else {
            unreachable!("gray inputs must produce a gray diagram");
        };
        assert_eq!(white_cells(img), vec![(200, 200)]);
    }

    #[test]
    fn height_mismatch_is_rejected() {
        let a = gray_png(10, 10, |_, _| 0);
        let b = gray_png(10, 12, |_, _| 0);
        let result = process(&a, &b, &ScatterConfig::default());
        assert!(matches!(
            result,
            Err(ScatterError::DimensionMismatch { first, second })
                if first == Dimensions::new(10, 10) && second == Dimensions::new(10, 12)
        ));
    }

    #[test]
    fn zero_scale_is_rejected() {
        let a = gray_png(2, 2, |_, _| 0);
        let config = ScatterConfig {
            scale: 0,
            ..ScatterConfig::default()
        };
        assert!(matches!(
            process(&a, &a, &config),
            Err(ScatterError::InvalidConfig(_))
        ));
    }

    #[test]
    fn color_inputs_produce_rgb_diagram() {
        let a = encode(&DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            4,
            4,
            image::Rgb([10, 20, 30]),
        )));
        let b = encode(&DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            4,
            4,
            image::Rgb([40, 50, 60]),
        )));
        let result = process(&a, &b, &ScatterConfig::default()).unwrap();
        assert_eq!(result.color_mode, ColorMode::Rgb);
        let ScatterImage::Rgb(img) = &result.image else {
            unreachable!("color inputs must produce an RGB diagram");
        };
        assert_eq!(img.get_pixel(10, 40).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(20, 50).0, [0, 255, 0]);
        assert_eq!(img.get_pixel(30, 60).0, [0, 0, 255]);
        assert_eq!(
            result.point_counts(),
            vec![(Channel::Red, 1), (Channel::Green, 1), (Channel::Blue, 1)]
        );
    }

    #[test]
    fn mirror_flips_the_output_only() {
        let a = gray_png(1, 1, |_, _| 5);
        let b = gray_png(1, 1, |_, _| 10);
        let config = ScatterConfig {
            mirror: true,
            ..ScatterConfig::default()
        };
        let result = process(&a, &b, &config).unwrap();
        let ScatterImage::Gray(img) = &result.image else {
            unreachable!("gray inputs must produce a gray diagram");
        };
        assert_eq!(white_cells(img), vec![(5, 245)]);
        assert!(result.canvases[0].1.is_set(5, 10));
    }

    #[test]
    fn small_images_are_not_enlarged() {
        let png = gray_png(7, 3, |x, y| u8::try_from(x * 10 + y).unwrap_or(0));
        let result = process(&png, &png, &ScatterConfig::default()).unwrap();
        assert_eq!(result.dimensions, Dimensions::new(7, 3));
        assert_eq!(result.canvases[0].1.point_count(), 21);
    }
}
