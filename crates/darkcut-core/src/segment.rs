// crates/darkcut-core/src/segment.rs
//
// A Segment is one maximal run of consecutive dark frames.
//
// Fields are private: once the detector seals a segment nothing can change
// it, and the ordinal assigned at detection time is the same value used to
// name the exported file.

use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    start:   u64,
    length:  u64,
    ordinal: u32,
}

impl Segment {
    /// A freshly opened one-frame segment. Only the detector creates these.
    pub(crate) fn open(start: u64, ordinal: u32) -> Self {
        Self { start, length: 1, ordinal }
    }

    pub(crate) fn extend(&mut self) {
        self.length += 1;
    }

    /// Index of the first dark frame.
    pub fn start(&self) -> u64 { self.start }

    /// Number of frames, always >= 1.
    pub fn length(&self) -> u64 { self.length }

    /// 1-based rank in detection order.
    pub fn ordinal(&self) -> u32 { self.ordinal }

    /// One past the last frame index.
    pub fn end(&self) -> u64 { self.start + self.length }

    pub fn contains(&self, index: u64) -> bool {
        index >= self.start && index < self.end()
    }

    /// `{prefix}_segment{ordinal}.{ext}`
    ///
    /// The prefix is used verbatim, so `out/clip` yields `out/clip_segment1.mp4`.
    pub fn output_path(&self, prefix: &Path, ext: &str) -> PathBuf {
        let mut name = prefix.as_os_str().to_owned();
        name.push(format!("_segment{}.{}", self.ordinal, ext));
        PathBuf::from(name)
    }
}
