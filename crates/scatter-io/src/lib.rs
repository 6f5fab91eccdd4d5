//! scatter-io: Filesystem I/O for scatter.
//!
//! Reads encoded input images from disk and writes the finished diagram
//! atomically: the image is encoded into a temporary file next to the
//! destination and renamed over it only once encoding has succeeded.
//! The temporary file is removed on every failure path, so no partial
//! output is ever left behind.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use scatter_pipeline::ScatterImage;

/// Errors that can occur while reading inputs or writing the output.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// An input file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// The input path.
        path: PathBuf,
        /// The underlying I/O failure.
        source: std::io::Error,
    },

    /// The output extension does not name a supported image format.
    #[error("cannot infer an image format from {}", path.display())]
    UnsupportedFormat {
        /// The output path.
        path: PathBuf,
    },

    /// The temporary output file could not be created.
    #[error("cannot create temporary file for {}: {source}", path.display())]
    Write {
        /// The output path.
        path: PathBuf,
        /// The underlying I/O failure.
        source: std::io::Error,
    },

    /// Encoding the diagram failed.
    #[error("cannot encode {}: {source}", path.display())]
    Encode {
        /// The output path.
        path: PathBuf,
        /// The underlying encoder failure.
        source: image::ImageError,
    },

    /// The encoded temporary file could not be moved into place.
    #[error("cannot move output into place at {}: {source}", path.display())]
    Persist {
        /// The output path.
        path: PathBuf,
        /// The underlying I/O failure.
        source: std::io::Error,
    },
}

/// Read an encoded input image.
///
/// # Errors
///
/// Returns [`IoError::Read`] if the file cannot be opened or read.
pub fn read_input(path: &Path) -> Result<Vec<u8>, IoError> {
    let bytes = std::fs::read(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("read {} ({} bytes)", path.display(), bytes.len());
    Ok(bytes)
}

/// Output format implied by the extension of `path`.
///
/// # Errors
///
/// Returns [`IoError::UnsupportedFormat`] if the extension is missing or
/// unknown, or the `image` crate was built without an encoder for it.
pub fn output_format(path: &Path) -> Result<ImageFormat, IoError> {
    ImageFormat::from_path(path)
        .ok()
        .filter(|format| format.writing_enabled())
        .ok_or_else(|| IoError::UnsupportedFormat {
            path: path.to_path_buf(),
        })
}

/// Encoders that cannot store a single-channel image.
const RGB_ONLY_FORMATS: &[ImageFormat] = &[ImageFormat::Gif];

/// Prepare `image` for the encoder of `format`.
///
/// A gray diagram is replicated into all three RGB channels when the
/// format has no single-channel encoding.
fn encodable(image: ScatterImage, format: ImageFormat) -> DynamicImage {
    match image {
        ScatterImage::Gray(gray) if RGB_ONLY_FORMATS.contains(&format) => {
            log::debug!("replicating gray diagram to RGB for {format:?}");
            DynamicImage::ImageLuma8(gray).to_rgb8().into()
        }
        other => other.into_dynamic(),
    }
}

/// Write `image` to `path`, inferring the format from the extension.
///
/// The image is encoded into a temporary file in the destination's
/// directory and atomically renamed to `path`.
///
/// # Errors
///
/// Returns [`IoError::UnsupportedFormat`] before touching the filesystem
/// if the format cannot be inferred, [`IoError::Write`] or
/// [`IoError::Encode`] if the temporary file cannot be created or
/// filled, and [`IoError::Persist`] if the final rename fails.
pub fn write_output(path: &Path, image: ScatterImage) -> Result<(), IoError> {
    let format = output_format(path)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp = tempfile::Builder::new()
        .prefix(".scatter-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|source| IoError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        encodable(image, format)
            .write_to(&mut writer, format)
            .map_err(|source| IoError::Encode {
                path: path.to_path_buf(),
                source,
            })?;
        std::io::Write::flush(&mut writer).map_err(|source| IoError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }

    temp.persist(path).map_err(|err| IoError::Persist {
        path: path.to_path_buf(),
        source: err.error,
    })?;
    log::debug!("wrote {} as {format:?}", path.display());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use scatter_pipeline::{GrayImage, RgbImage};

    use super::*;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn read_input_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.png");
        let err = read_input(&missing).unwrap_err();
        assert!(matches!(err, IoError::Read { ref path, .. } if path == &missing));
        assert!(err.to_string().contains("missing.png"));
    }

    #[test]
    fn read_input_returns_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();
        assert_eq!(read_input(&path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn output_format_from_extension() {
        assert_eq!(output_format(Path::new("a.png")).unwrap(), ImageFormat::Png);
        assert_eq!(output_format(Path::new("a.JPG")).unwrap(), ImageFormat::Jpeg);
        assert!(matches!(
            output_format(Path::new("noext")),
            Err(IoError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            output_format(Path::new("a.xyz")),
            Err(IoError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn write_gray_png_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let mut img = GrayImage::new(256, 256);
        img.put_pixel(3, 7, image::Luma([255]));
        write_output(&path, ScatterImage::Gray(img.clone())).unwrap();

        let back = image::open(&path).unwrap();
        assert!(matches!(back, image::DynamicImage::ImageLuma8(_)));
        assert_eq!(back.to_luma8(), img);
        assert_eq!(entries(dir.path()), vec!["out.png".to_owned()]);
    }

    #[test]
    fn write_gray_gif_replicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.gif");
        let mut img = GrayImage::new(256, 256);
        img.put_pixel(3, 7, image::Luma([255]));
        write_output(&path, ScatterImage::Gray(img)).unwrap();

        let back = image::open(&path).unwrap().to_rgb8();
        assert_eq!(back.dimensions(), (256, 256));
        assert_eq!(back.get_pixel(3, 7).0, [255, 255, 255]);
        assert_eq!(back.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(entries(dir.path()), vec!["out.gif".to_owned()]);
    }

    #[test]
    fn gray_stays_single_channel_where_supported() {
        let gray = ScatterImage::Gray(GrayImage::new(256, 256));
        for format in [ImageFormat::Png, ImageFormat::Bmp, ImageFormat::Tiff] {
            let out = encodable(gray.clone(), format);
            assert!(matches!(out, DynamicImage::ImageLuma8(_)), "{format:?}");
        }
        let gif = encodable(gray, ImageFormat::Gif);
        assert!(matches!(gif, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn write_rgb_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        std::fs::write(&path, b"stale").unwrap();

        let img = RgbImage::from_pixel(256, 256, image::Rgb([255, 0, 255]));
        write_output(&path, ScatterImage::Rgb(img)).unwrap();

        let back = image::open(&path).unwrap().to_rgb8();
        assert_eq!(back.get_pixel(0, 0).0, [255, 0, 255]);
    }

    #[test]
    fn unsupported_format_leaves_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.unknown");
        let result = write_output(&path, ScatterImage::Gray(GrayImage::new(256, 256)));
        assert!(matches!(result, Err(IoError::UnsupportedFormat { .. })));
        assert!(entries(dir.path()).is_empty());
    }

    #[test]
    fn missing_directory_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("out.png");
        let result = write_output(&path, ScatterImage::Gray(GrayImage::new(256, 256)));
        assert!(matches!(result, Err(IoError::Write { .. })));
    }
}
