// crates/darkcut-core/src/detector.rs
//
// SegmentDetector: turns the per-frame dark/bright stream into segments.
//
// State machine:
//   Idle      + dark   → open segment {start = index, length = 1, ordinal = n++} → InSegment
//   InSegment + dark   → extend open segment
//   InSegment + bright → seal                                                    → Idle
//   Idle      + bright → no-op
//   end of stream      → an open segment is sealed as-is
//
// The open segment is always the last element of `segments`; sealing is
// just leaving InSegment, after which nothing touches that element again.
//
// `scan()` is the forward pass that feeds the detector from a FrameSource.

use crate::classify::{classify, Threshold};
use crate::error::MediaError;
use crate::progress::ProgressTracker;
use crate::segment::Segment;
use crate::source::{FrameSource, LumaMeter};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Idle,
    InSegment,
}

#[derive(Debug)]
pub struct SegmentDetector {
    state:        State,
    segments:     Vec<Segment>,
    next_ordinal: u32,
    frame_index:  u64,
}

impl Default for SegmentDetector {
    fn default() -> Self { Self::new() }
}

impl SegmentDetector {
    pub fn new() -> Self {
        Self {
            state:        State::Idle,
            segments:     Vec::new(),
            next_ordinal: 1,
            frame_index:  0,
        }
    }

    /// Feed the classification of the next frame.
    pub fn push(&mut self, dark: bool) {
        match (self.state, dark) {
            (State::Idle, true) => {
                let seg = Segment::open(self.frame_index, self.next_ordinal);
                self.next_ordinal += 1;
                log::debug!("[scan] segment {} opened at frame {}", seg.ordinal(), seg.start());
                self.segments.push(seg);
                self.state = State::InSegment;
            }
            (State::InSegment, true) => {
                if let Some(open) = self.segments.last_mut() {
                    open.extend();
                }
            }
            (State::InSegment, false) => {
                if let Some(sealed) = self.segments.last() {
                    log::debug!(
                        "[scan] segment {} sealed: frames {}..{}",
                        sealed.ordinal(), sealed.start(), sealed.end(),
                    );
                }
                self.state = State::Idle;
            }
            (State::Idle, false) => {}
        }
        self.frame_index += 1;
    }

    pub fn frames_seen(&self) -> u64 { self.frame_index }

    pub fn in_segment(&self) -> bool { self.state == State::InSegment }

    /// Segments so far, including the open one (if any) as the last element.
    pub fn segments(&self) -> &[Segment] { &self.segments }

    /// End of stream: seal whatever is open and hand back the list.
    pub fn finish(self) -> Vec<Segment> {
        self.segments
    }
}

/// Run the detector over a complete classification sequence.
pub fn detect<I>(classifications: I) -> Vec<Segment>
where
    I: IntoIterator<Item = bool>,
{
    let mut detector = SegmentDetector::new();
    for dark in classifications {
        detector.push(dark);
    }
    detector.finish()
}

/// Result of the forward pass.
#[derive(Debug)]
pub struct ScanReport {
    pub segments:       Vec<Segment>,
    pub frames_scanned: u64,
    pub dark_frames:    u64,
}

/// Decode every frame of `source`, classify it, and build the segment list.
///
/// `on_progress` receives whole percentages as they change; it is never
/// called when the source does not know its frame count.
pub fn scan<S, M, P>(
    source:          &mut S,
    meter:           &mut M,
    threshold:       Threshold,
    mut on_progress: P,
) -> Result<ScanReport, MediaError>
where
    S: FrameSource,
    M: LumaMeter<S::Frame>,
    P: FnMut(u8),
{
    let mut detector = SegmentDetector::new();
    let mut progress = ProgressTracker::new(source.properties().total_frames);
    let mut dark_frames = 0u64;

    while let Some(frame) = source.decode_next()? {
        let luma = meter.mean_luma(&frame)?;
        let dark = classify(luma, threshold);
        if dark {
            dark_frames += 1;
        }
        detector.push(dark);
        if let Some(pct) = progress.update(detector.frames_seen()) {
            on_progress(pct);
        }
    }

    let frames_scanned = detector.frames_seen();
    Ok(ScanReport { segments: detector.finish(), frames_scanned, dark_frames })
}
