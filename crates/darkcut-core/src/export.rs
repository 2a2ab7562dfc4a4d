// crates/darkcut-core/src/export.rs
//
// SegmentExporter: re-acquire each segment's frames and write them out.
//
// Decoding is sequential, so the frames classified during the scan are gone
// by the time export starts. Each segment is re-materialized with one of two
// strategies, chosen once per run and never mixed:
//
//   ReopenAndSkip — open the input again, decode-and-discard `start` frames,
//                   then copy `length` frames. Always lands on the right
//                   frame; costs O(start) decodes per segment.
//   Seek          — one export-time source, seek to `start` per segment.
//                   Cheap, but only as exact as the source's seek. A failed
//                   seek fails that segment; it does not fall back to reopen.
//
// Per segment: position source → create sink → copy frames → finish sink.
// Any failure is logged with the ordinal and path and the exporter moves on
// to the next segment.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::error::{MediaError, SegmentError};
use crate::segment::Segment;
use crate::source::{
    FrameSink, FrameSource, SeekCapability, SinkFactory, SourceOpener, VideoProperties,
};

// ── Strategy ──────────────────────────────────────────────────────────────────

/// What the operator asked for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StrategyPreference {
    /// Seek only when the source reports exact seeking.
    #[default]
    Auto,
    Reopen,
    Seek,
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown strategy '{0}' (expected auto, reopen or seek)")]
pub struct UnknownStrategy(pub String);

impl FromStr for StrategyPreference {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto"   => Ok(Self::Auto),
            "reopen" => Ok(Self::Reopen),
            "seek"   => Ok(Self::Seek),
            _        => Err(UnknownStrategy(s.to_string())),
        }
    }
}

/// What the exporter actually does for every segment of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReacquireStrategy {
    ReopenAndSkip,
    Seek,
}

impl ReacquireStrategy {
    pub fn resolve(pref: StrategyPreference, capability: SeekCapability) -> Self {
        match (pref, capability) {
            (StrategyPreference::Reopen, _) => Self::ReopenAndSkip,
            (StrategyPreference::Seek, SeekCapability::Exact) => Self::Seek,
            (StrategyPreference::Seek, SeekCapability::Sequential) => {
                log::warn!(
                    "[export] seek strategy forced on a source without exact seeking; \
                     exported ranges may drift from the scanned frame indices"
                );
                Self::Seek
            }
            (StrategyPreference::Auto, SeekCapability::Exact) => Self::Seek,
            (StrategyPreference::Auto, SeekCapability::Sequential) => Self::ReopenAndSkip,
        }
    }
}

impl fmt::Display for ReacquireStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReopenAndSkip => f.write_str("reopen-and-skip"),
            Self::Seek          => f.write_str("seek"),
        }
    }
}

// ── Results ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct SegmentOutcome {
    pub segment: Segment,
    pub path:    PathBuf,
    /// Frames written on success.
    pub result:  Result<u64, SegmentError>,
}

#[derive(Debug, Default)]
pub struct ExportSummary {
    pub outcomes: Vec<SegmentOutcome>,
}

impl ExportSummary {
    pub fn exported(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.exported()
    }
}

// ── Exporter ──────────────────────────────────────────────────────────────────

pub struct SegmentExporter<'a, O, K> {
    opener:    &'a O,
    sinks:     &'a K,
    input:     PathBuf,
    prefix:    PathBuf,
    extension: String,
    props:     VideoProperties,
    strategy:  ReacquireStrategy,
}

impl<'a, O, K> SegmentExporter<'a, O, K>
where
    O: SourceOpener,
    K: SinkFactory<<O::Source as FrameSource>::Frame>,
{
    pub fn new(
        opener:    &'a O,
        sinks:     &'a K,
        input:     &Path,
        prefix:    &Path,
        extension: &str,
        props:     VideoProperties,
        strategy:  ReacquireStrategy,
    ) -> Self {
        Self {
            opener,
            sinks,
            input:     input.to_path_buf(),
            prefix:    prefix.to_path_buf(),
            extension: extension.to_string(),
            props,
            strategy,
        }
    }

    pub fn strategy(&self) -> ReacquireStrategy { self.strategy }

    /// Export every segment in order. Never stops early.
    pub fn export_all(&self, segments: &[Segment]) -> ExportSummary {
        let mut summary = ExportSummary::default();
        // Seek strategy: one source reused across segments.
        let mut seek_source: Option<O::Source> = None;

        for seg in segments {
            let path = seg.output_path(&self.prefix, &self.extension);
            let result = self.export_one(seg, &path, &mut seek_source);
            match &result {
                Ok(frames) => log::info!(
                    "[export] segment {} exported to: {} ({frames} frames)",
                    seg.ordinal(), path.display(),
                ),
                Err(e) => log::error!(
                    "[export] segment {} ({}) skipped: {e}",
                    seg.ordinal(), path.display(),
                ),
            }
            summary.outcomes.push(SegmentOutcome { segment: *seg, path, result });
        }
        summary
    }

    fn export_one(
        &self,
        seg:         &Segment,
        path:        &Path,
        seek_source: &mut Option<O::Source>,
    ) -> Result<u64, SegmentError> {
        match self.strategy {
            ReacquireStrategy::ReopenAndSkip => {
                let mut src = self.opener.open(&self.input).map_err(SegmentError::Reacquire)?;
                skip_frames(&mut src, seg.start()).map_err(SegmentError::Reacquire)?;
                self.write_segment(&mut src, seg, path)
            }
            ReacquireStrategy::Seek => {
                let src = match seek_source.take() {
                    Some(s) => s,
                    None    => self.opener.open(&self.input).map_err(SegmentError::Reacquire)?,
                };
                let src = seek_source.insert(src);
                src.seek(seg.start()).map_err(SegmentError::Reacquire)?;
                self.write_segment(src, seg, path)
            }
        }
    }

    fn write_segment(
        &self,
        src:  &mut O::Source,
        seg:  &Segment,
        path: &Path,
    ) -> Result<u64, SegmentError> {
        let mut sink = self.sinks.create(path, &self.props).map_err(SegmentError::Create)?;

        let mut written = 0u64;
        while written < seg.length() {
            let Some(frame) = src.decode_next().map_err(SegmentError::Reacquire)? else { break };
            sink.write_frame(&frame).map_err(SegmentError::Write)?;
            written += 1;
        }
        sink.finish().map_err(SegmentError::Finish)?;

        if written < seg.length() {
            return Err(SegmentError::Short { written, expected: seg.length() });
        }
        Ok(written)
    }
}

/// Decode and drop `count` frames.
fn skip_frames<S: FrameSource>(src: &mut S, count: u64) -> Result<(), MediaError> {
    for i in 0..count {
        if src.decode_next()?.is_none() {
            return Err(MediaError::Decode(format!(
                "stream ended at frame {i} while skipping to frame {count}"
            )));
        }
    }
    Ok(())
}
