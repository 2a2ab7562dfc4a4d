// crates/darkcut-cli/src/run.rs
//
// One run: open → scan → pick strategy → export every segment.
//
// Only failures before export are fatal (input cannot be opened, decode
// breaks mid-scan). Per-segment failures are logged by the exporter and
// reported in the summary; they do not fail the run.

use anyhow::{Context, Result};

use darkcut_core::{scan, ExportSummary, FrameSource, ReacquireStrategy, SegmentExporter};
use darkcut_media::{supports_size, FfmpegOpener, FfmpegSinks, FfmpegSource, GrayMeter};

use crate::config::Config;

pub fn run(cfg: &Config) -> Result<ExportSummary> {
    let mut source = FfmpegSource::open(&cfg.input)
        .with_context(|| format!("Failed to open video file: {}", cfg.input.display()))?;

    let props = source.properties();
    log::info!(
        "[scan] {} — {}x{} @ {:.3} fps, {} frames, threshold {}",
        cfg.input.display(),
        props.width, props.height, props.fps.as_f64(),
        props.total_frames.map_or_else(|| "unknown".to_string(), |n| n.to_string()),
        cfg.threshold,
    );

    // Decided once, before any segment is exported.
    let strategy = ReacquireStrategy::resolve(cfg.strategy, source.seek_capability());

    let report = scan(&mut source, &mut GrayMeter::new(), cfg.threshold, |pct| {
        if pct % 10 == 0 {
            log::info!("[scan] {pct}%");
        } else {
            log::debug!("[scan] {pct}%");
        }
    })
    .with_context(|| format!("scan of {} failed", cfg.input.display()))?;
    drop(source);

    log::info!(
        "[scan] {} frames, {} dark, {} segment(s)",
        report.frames_scanned, report.dark_frames, report.segments.len(),
    );

    let opener = FfmpegOpener;
    let sinks = FfmpegSinks::default();
    let exporter = SegmentExporter::new(
        &opener,
        &sinks,
        &cfg.input,
        &cfg.output_prefix,
        &cfg.extension,
        props,
        strategy,
    );
    if !report.segments.is_empty() {
        log::info!("[export] re-acquiring frames with {}", exporter.strategy());
        if !supports_size(props.width, props.height) {
            log::warn!(
                "[export] {}x{} has an odd dimension; H.264 YUV420P output needs even \
                 width and height, so every segment will be skipped",
                props.width, props.height,
            );
        }
    }
    let summary = exporter.export_all(&report.segments);

    log::info!(
        "Video processing complete: {} of {} segment(s) exported",
        summary.exported(), summary.outcomes.len(),
    );
    Ok(summary)
}
