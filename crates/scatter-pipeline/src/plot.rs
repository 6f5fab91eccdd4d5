//! Paired-intensity scatter plotting.
//!
//! Each sample pair `(a, b)` from two images marks the cell at column
//! `a`, row `b` of a 256×256 canvas. Marking is a set, not an
//! increment: a cell is either white (some pair landed on it) or black,
//! so the result depends only on the set of pairs and not on the order
//! in which they are visited.
//!
//! Long sequences are split into chunks that are plotted on the rayon
//! pool into private occupancy masks and merged with logical OR.
//! Separate channels are plotted concurrently as well.

use image::Luma;
use rayon::prelude::*;

use crate::channel::ChannelSamples;
use crate::types::{GrayImage, ScatterError};

/// Width and height of a scatter canvas: one cell per 8-bit intensity.
pub const CANVAS_SIZE: u32 = 256;

/// Value written to plotted cells.
pub const POINT_VALUE: u8 = 255;

const CELL_COUNT: usize = (CANVAS_SIZE * CANVAS_SIZE) as usize;

/// Sequences shorter than this are plotted on the calling thread.
const PARALLEL_THRESHOLD: usize = 1 << 16;

/// Number of sample pairs handled by one parallel task.
const CHUNK_LEN: usize = 1 << 14;

/// 256×256 presence map of intensity pairs.
///
/// Column index is the first image's intensity, row index is the second
/// image's intensity. The origin (0, 0) is the top-left corner until
/// the output is mirrored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScatterCanvas(GrayImage);

impl ScatterCanvas {
    /// An all-black canvas.
    #[must_use]
    pub fn new() -> Self {
        Self(GrayImage::new(CANVAS_SIZE, CANVAS_SIZE))
    }

    /// Mark the cell for the intensity pair `(x, y)`.
    pub fn set(&mut self, x: u8, y: u8) {
        self.0
            .put_pixel(u32::from(x), u32::from(y), Luma([POINT_VALUE]));
    }

    /// Whether the intensity pair `(x, y)` has been plotted.
    #[must_use]
    pub fn is_set(&self, x: u8, y: u8) -> bool {
        self.0.get_pixel(u32::from(x), u32::from(y)).0[0] == POINT_VALUE
    }

    /// Number of distinct intensity pairs on the canvas.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.0.as_raw().iter().filter(|&&v| v == POINT_VALUE).count()
    }

    /// Borrow the canvas raster.
    #[must_use]
    pub const fn as_gray(&self) -> &GrayImage {
        &self.0
    }

    /// Consume the canvas and return its raster.
    #[must_use]
    pub fn into_gray(self) -> GrayImage {
        self.0
    }

    fn from_mask(mask: &[bool]) -> Self {
        let raw = mask
            .iter()
            .map(|&hit| if hit { POINT_VALUE } else { 0 })
            .collect();
        // The mask always holds exactly `CELL_COUNT` entries.
        GrayImage::from_raw(CANVAS_SIZE, CANVAS_SIZE, raw).map_or_else(Self::new, Self)
    }
}

impl Default for ScatterCanvas {
    fn default() -> Self {
        Self::new()
    }
}

/// Plot the sample pairs of one channel.
///
/// `first[k]` becomes the column and `second[k]` the row of the k-th
/// point. An empty pair of sequences yields an all-black canvas.
///
/// # Errors
///
/// Returns [`ScatterError::LengthMismatch`] if the sequences differ in
/// length.
pub fn plot(
    first: &ChannelSamples,
    second: &ChannelSamples,
) -> Result<ScatterCanvas, ScatterError> {
    let (a, b) = (first.as_slice(), second.as_slice());
    if a.len() != b.len() {
        return Err(ScatterError::LengthMismatch {
            first: a.len(),
            second: b.len(),
        });
    }

    if a.len() < PARALLEL_THRESHOLD {
        return Ok(plot_sequential(a, b));
    }

    let mask = a
        .par_chunks(CHUNK_LEN)
        .zip(b.par_chunks(CHUNK_LEN))
        .fold(
            || vec![false; CELL_COUNT],
            |mut mask, (xs, ys)| {
                mark(&mut mask, xs, ys);
                mask
            },
        )
        .reduce(
            || vec![false; CELL_COUNT],
            |mut left, right| {
                for (l, r) in left.iter_mut().zip(right) {
                    *l |= r;
                }
                left
            },
        );

    Ok(ScatterCanvas::from_mask(&mask))
}

/// Plot several channels concurrently, preserving their order.
///
/// # Errors
///
/// Returns the first [`ScatterError::LengthMismatch`] encountered.
pub fn plot_channels(
    pairs: &[(ChannelSamples, ChannelSamples)],
) -> Result<Vec<ScatterCanvas>, ScatterError> {
    pairs.par_iter().map(|(a, b)| plot(a, b)).collect()
}

fn plot_sequential(xs: &[u8], ys: &[u8]) -> ScatterCanvas {
    let mut canvas = ScatterCanvas::new();
    for (&x, &y) in xs.iter().zip(ys) {
        canvas.set(x, y);
    }
    canvas
}

fn mark(mask: &mut [bool], xs: &[u8], ys: &[u8]) {
    for (&x, &y) in xs.iter().zip(ys) {
        mask[usize::from(y) * CANVAS_SIZE as usize + usize::from(x)] = true;
    }
}
