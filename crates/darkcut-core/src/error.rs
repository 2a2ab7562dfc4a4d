// crates/darkcut-core/src/error.rs
//
// Error taxonomy shared by the scan and export stages.
//
//   MediaError   — a collaborator call (open / decode / seek / encode) failed.
//                  Fatal when it happens during the scan, per-segment during
//                  export.
//   SegmentError — why one segment could not be exported. Never aborts the
//                  run; the exporter logs it and moves to the next segment.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to open '{path}': {reason}")]
    Open { path: PathBuf, reason: String },
    #[error("no video stream in '{0}'")]
    NoVideoStream(PathBuf),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("seek to frame {index} failed: {reason}")]
    Seek { index: u64, reason: String },
    #[error("failed to create output '{path}': {reason}")]
    CreateWriter { path: PathBuf, reason: String },
    #[error("encode failed: {0}")]
    Encode(String),
}

#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("could not re-acquire frames: {0}")]
    Reacquire(#[source] MediaError),
    #[error("could not create output: {0}")]
    Create(#[source] MediaError),
    #[error("write failed: {0}")]
    Write(#[source] MediaError),
    #[error("finalize failed: {0}")]
    Finish(#[source] MediaError),
    #[error("source ended after {written} of {expected} frames")]
    Short { written: u64, expected: u64 },
}
