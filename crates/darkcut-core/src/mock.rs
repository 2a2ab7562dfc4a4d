// crates/darkcut-core/src/mock.rs
//
// In-memory collaborators for unit tests. A "frame" is its index plus a
// uniform luma value, so tests can check exactly which frames were exported.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::MediaError;
use crate::source::{
    FrameRate, FrameSink, FrameSource, LumaMeter, SeekCapability, SinkFactory, SourceOpener,
    VideoProperties,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MockFrame {
    pub index: u64,
    pub luma:  u8,
}

pub fn props(total: u64) -> VideoProperties {
    VideoProperties {
        fps:          FrameRate::new(25, 1),
        width:        4,
        height:       4,
        total_frames: Some(total),
    }
}

pub struct MockSource {
    lumas:      Rc<Vec<u8>>,
    pos:        u64,
    capability: SeekCapability,
    fail_seek:  bool,
    seeks:      Rc<RefCell<Vec<u64>>>,
}

impl MockSource {
    pub fn new(lumas: &[u8]) -> Self {
        Self {
            lumas:      Rc::new(lumas.to_vec()),
            pos:        0,
            capability: SeekCapability::Sequential,
            fail_seek:  false,
            seeks:      Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl FrameSource for MockSource {
    type Frame = MockFrame;

    fn properties(&self) -> VideoProperties {
        props(self.lumas.len() as u64)
    }

    fn decode_next(&mut self) -> Result<Option<MockFrame>, MediaError> {
        let Some(&luma) = self.lumas.get(self.pos as usize) else { return Ok(None) };
        let frame = MockFrame { index: self.pos, luma };
        self.pos += 1;
        Ok(Some(frame))
    }

    fn seek_capability(&self) -> SeekCapability { self.capability }

    fn seek(&mut self, index: u64) -> Result<(), MediaError> {
        self.seeks.borrow_mut().push(index);
        if self.fail_seek {
            return Err(MediaError::Seek { index, reason: "mock".into() });
        }
        self.pos = index;
        Ok(())
    }
}

/// Hands out fresh sources over the same frames and counts opens.
pub struct MockOpener {
    pub lumas:      Vec<u8>,
    pub capability: SeekCapability,
    pub fail_seek:  bool,
    pub fail_open:  bool,
    pub opens:      RefCell<u32>,
    pub seeks:      Rc<RefCell<Vec<u64>>>,
}

impl MockOpener {
    pub fn new(lumas: &[u8]) -> Self {
        Self {
            lumas:      lumas.to_vec(),
            capability: SeekCapability::Sequential,
            fail_seek:  false,
            fail_open:  false,
            opens:      RefCell::new(0),
            seeks:      Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl SourceOpener for MockOpener {
    type Source = MockSource;

    fn open(&self, path: &Path) -> Result<MockSource, MediaError> {
        if self.fail_open {
            return Err(MediaError::Open { path: path.to_path_buf(), reason: "mock".into() });
        }
        *self.opens.borrow_mut() += 1;
        let mut src = MockSource::new(&self.lumas);
        src.capability = self.capability;
        src.fail_seek  = self.fail_seek;
        src.seeks      = Rc::clone(&self.seeks);
        Ok(src)
    }
}

pub struct MockMeter;

impl LumaMeter<MockFrame> for MockMeter {
    fn mean_luma(&mut self, frame: &MockFrame) -> Result<f64, MediaError> {
        Ok(frame.luma as f64)
    }
}

type Written = Rc<RefCell<HashMap<PathBuf, Vec<MockFrame>>>>;

/// Records finished outputs by path. Paths in `refuse` fail at create time.
#[derive(Default)]
pub struct MockSinks {
    pub refuse:   HashSet<PathBuf>,
    pub finished: Written,
}

pub struct MockSink {
    path:     PathBuf,
    frames:   Vec<MockFrame>,
    finished: Written,
}

impl FrameSink<MockFrame> for MockSink {
    fn write_frame(&mut self, frame: &MockFrame) -> Result<(), MediaError> {
        self.frames.push(*frame);
        Ok(())
    }

    fn finish(self) -> Result<(), MediaError> {
        self.finished.borrow_mut().insert(self.path, self.frames);
        Ok(())
    }
}

impl SinkFactory<MockFrame> for MockSinks {
    type Sink = MockSink;

    fn create(&self, path: &Path, _props: &VideoProperties) -> Result<MockSink, MediaError> {
        if self.refuse.contains(path) {
            return Err(MediaError::CreateWriter {
                path:   path.to_path_buf(),
                reason: "permission denied".into(),
            });
        }
        Ok(MockSink {
            path:     path.to_path_buf(),
            frames:   Vec::new(),
            finished: Rc::clone(&self.finished),
        })
    }
}
