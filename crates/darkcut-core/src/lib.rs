// crates/darkcut-core/src/lib.rs
//
// Dark-segment detection and export, independent of any media library.
//
//   classify  — mean luma and the inclusive threshold test
//   detector  — the Idle/InSegment state machine and the scan pass
//   export    — re-acquisition strategies and per-segment export
//   source    — collaborator traits the media layer implements
//
// No ffmpeg dependency: darkcut-media implements the source traits.

pub mod classify;
pub mod detector;
pub mod error;
pub mod export;
pub mod progress;
pub mod segment;
pub mod source;

#[cfg(test)]
mod mock;

pub use classify::{classify, mean_luma, Threshold, ThresholdError};
pub use detector::{detect, scan, ScanReport, SegmentDetector};
pub use error::{MediaError, SegmentError};
pub use export::{
    ExportSummary, ReacquireStrategy, SegmentExporter, SegmentOutcome, StrategyPreference,
    UnknownStrategy,
};
pub use progress::ProgressTracker;
pub use segment::Segment;
pub use source::{
    FrameRate, FrameSink, FrameSource, LumaMeter, SeekCapability, SinkFactory, SourceOpener,
    VideoProperties,
};
