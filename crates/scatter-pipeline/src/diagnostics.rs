//! Pipeline diagnostics: timing and counts for each stage.
//!
//! [`process_with_diagnostics`] runs the same stages as
//! [`process`](crate::process) and records how long each one took along
//! with the sizes it worked on. Time is read through the [`Clock`]
//! trait so this crate stays free of platform timers.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::downsample::DownsampleFilter;
use crate::pipeline::Pipeline;
use crate::types::{Channel, ColorMode, Dimensions, ScatterConfig, ScatterError, ScatterResult};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Source of timestamps for stage timing.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// Current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Diagnostics collected from a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScatterDiagnostics {
    /// Stage 0: decoding both inputs.
    pub decode: StageDiagnostics,
    /// Stage 1: downsampling and dimension check.
    pub downsample: StageDiagnostics,
    /// Stage 2: channel sample extraction.
    pub extract: StageDiagnostics,
    /// Stage 3: scatter plotting.
    pub plot: StageDiagnostics,
    /// Stage 4: channel recombination and optional mirror.
    pub combine: StageDiagnostics,
    /// Total wall-clock duration of the run (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: ScatterSummary,
}

/// Diagnostics for a single stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Decoding metrics.
    Decode {
        /// Total encoded size of both inputs.
        input_bytes: usize,
        /// Decoded size of the first input.
        first: Dimensions,
        /// Decoded size of the second input.
        second: Dimensions,
    },
    /// Downsampling metrics.
    Downsample {
        /// Configured bound.
        scale: u32,
        /// Resampling filter.
        filter: DownsampleFilter,
        /// Whether either input was shrunk.
        applied: bool,
        /// Shared working dimensions.
        working: Dimensions,
    },
    /// Sample extraction metrics.
    Extract {
        /// Gray or RGB plotting.
        color_mode: ColorMode,
        /// Number of channels extracted per input.
        channel_count: usize,
        /// Samples per channel.
        samples_per_channel: usize,
    },
    /// Plotting metrics.
    Plot {
        /// Distinct points per channel canvas.
        points: Vec<(Channel, usize)>,
    },
    /// Recombination metrics.
    Combine {
        /// Number of channels in the output.
        channel_count: usize,
        /// Whether the output was flipped vertically.
        mirrored: bool,
    },
}

/// High-level summary counts for the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScatterSummary {
    /// Gray or RGB plotting.
    pub color_mode: ColorMode,
    /// Working dimensions shared by both inputs.
    pub working: Dimensions,
    /// Sample pairs plotted per channel.
    pub sample_count: u64,
    /// Distinct points per channel canvas.
    pub points: Vec<(Channel, usize)>,
}

/// Run the pipeline and collect per-stage diagnostics.
///
/// # Errors
///
/// Returns the same errors as [`process`](crate::process).
pub fn process_with_diagnostics<C: Clock>(
    first: &[u8],
    second: &[u8],
    config: &ScatterConfig,
    clock: &C,
) -> Result<(ScatterResult, ScatterDiagnostics), ScatterError> {
    let run_start = clock.now();

    let start = clock.now();
    let pending = Pipeline::new(first, second, config.clone());
    let input_bytes = pending.input_bytes();
    let decoded = pending.decode()?;
    let (first_dims, second_dims) = decoded.source_dimensions();
    let decode = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Decode {
            input_bytes,
            first: first_dims,
            second: second_dims,
        },
    };

    let start = clock.now();
    let downsampled = decoded.downsample()?;
    let downsample = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Downsample {
            scale: config.scale,
            filter: config.downsample_filter,
            applied: downsampled.applied(),
            working: downsampled.dimensions(),
        },
    };

    let start = clock.now();
    let extracted = downsampled.extract();
    let color_mode = extracted.color_mode();
    let extract = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Extract {
            color_mode,
            channel_count: extracted.channels().count(),
            samples_per_channel: extracted.sample_count(),
        },
    };

    let start = clock.now();
    let plotted = extracted.plot()?;
    let points: Vec<(Channel, usize)> = plotted
        .canvases()
        .iter()
        .map(|(channel, canvas)| (*channel, canvas.point_count()))
        .collect();
    let plot = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Plot {
            points: points.clone(),
        },
    };

    let start = clock.now();
    let result = plotted.combine()?;
    let combine = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Combine {
            channel_count: result.image.channel_count(),
            mirrored: config.mirror,
        },
    };

    let summary = ScatterSummary {
        color_mode: result.color_mode,
        working: result.dimensions,
        sample_count: result.sample_count(),
        points,
    };

    let diagnostics = ScatterDiagnostics {
        decode,
        downsample,
        extract,
        plot,
        combine,
        total_duration: clock.elapsed(&run_start),
        summary,
    };
    Ok((result, diagnostics))
}

impl ScatterDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Scatter Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Working size: {} ({} samples per channel, {} mode)",
            self.summary.working, self.summary.sample_count, self.summary.color_mode,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<16} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(72));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Decode", &self.decode),
            ("Downsample", &self.downsample),
            ("Extract", &self.extract),
            ("Plot", &self.plot),
            ("Combine", &self.combine),
        ];
        for (name, diag) in stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<16} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!("Points: {}", format_points(&self.summary.points)));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

fn format_points(points: &[(Channel, usize)]) -> String {
    points
        .iter()
        .map(|(channel, n)| format!("{channel}={n}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            first,
            second,
        } => format!("{input_bytes} bytes -> {first} and {second}"),
        StageMetrics::Downsample {
            scale,
            filter,
            applied,
            working,
        } => {
            let action = if *applied { "shrunk" } else { "unchanged" };
            format!("bound={scale} filter={filter} {action} -> {working}")
        }
        StageMetrics::Extract {
            color_mode,
            channel_count,
            samples_per_channel,
        } => format!("{color_mode}: {channel_count} channel(s) x {samples_per_channel} samples"),
        StageMetrics::Plot { points } => format_points(points),
        StageMetrics::Combine {
            channel_count,
            mirrored,
        } => {
            let flip = if *mirrored { ", mirrored" } else { "" };
            format!("{channel_count} channel(s){flip}")
        }
    }
}
