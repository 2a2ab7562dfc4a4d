// crates/darkcut-core/src/source.rs
//
// Collaborator traits for the media I/O layer.
//
// The core never touches a codec. It decodes through a FrameSource, measures
// through a LumaMeter, and writes through a FrameSink. darkcut-media provides
// the FFmpeg implementations; the tests in this crate use in-memory ones.
//
// Closing is Drop: a source or sink going out of scope releases its handle,
// including on early-return paths.

use std::path::Path;

use crate::error::MediaError;

/// Rational frames-per-second, e.g. 30000/1001.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRate {
    pub num: u32,
    pub den: u32,
}

impl FrameRate {
    pub fn new(num: u32, den: u32) -> Self { Self { num, den } }

    pub fn as_f64(&self) -> f64 {
        if self.den == 0 { 0.0 } else { self.num as f64 / self.den as f64 }
    }

    pub fn is_valid(&self) -> bool { self.num > 0 && self.den > 0 }
}

/// Captured once when the source is opened and reused for every output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoProperties {
    pub fps:          FrameRate,
    pub width:        u32,
    pub height:       u32,
    /// `None` when the container records neither a frame count nor a duration.
    pub total_frames: Option<u64>,
}

/// Whether `seek` lands on the exact requested frame index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeekCapability {
    Exact,
    /// Seeking may be unsupported or may drift; only sequential decode is
    /// trustworthy.
    Sequential,
}

pub trait FrameSource {
    type Frame;

    fn properties(&self) -> VideoProperties;

    /// Next frame in stream order, or `None` at end of stream.
    fn decode_next(&mut self) -> Result<Option<Self::Frame>, MediaError>;

    fn seek_capability(&self) -> SeekCapability {
        SeekCapability::Sequential
    }

    /// Position the source so the next `decode_next` yields frame `index`.
    fn seek(&mut self, index: u64) -> Result<(), MediaError> {
        Err(MediaError::Seek { index, reason: "source does not support seeking".into() })
    }
}

pub trait SourceOpener {
    type Source: FrameSource;

    fn open(&self, path: &Path) -> Result<Self::Source, MediaError>;
}

pub trait LumaMeter<F> {
    /// Mean luminance of `frame` on the 0..=255 scale.
    fn mean_luma(&mut self, frame: &F) -> Result<f64, MediaError>;
}

pub trait FrameSink<F> {
    fn write_frame(&mut self, frame: &F) -> Result<(), MediaError>;

    /// Flush and finalize the container.
    fn finish(self) -> Result<(), MediaError>;
}

pub trait SinkFactory<F> {
    type Sink: FrameSink<F>;

    fn create(&self, path: &Path, props: &VideoProperties) -> Result<Self::Sink, MediaError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rate_ntsc() {
        let r = FrameRate::new(30000, 1001);
        assert!((r.as_f64() - 29.97).abs() < 0.001);
        assert!(r.is_valid());
    }

    #[test]
    fn frame_rate_zero_den() {
        let r = FrameRate::new(25, 0);
        assert_eq!(r.as_f64(), 0.0);
        assert!(!r.is_valid());
    }
}
