// crates/darkcut-media/src/lib.rs
//
// FFmpeg implementations of the darkcut-core collaborator traits.
//
//   source — FfmpegSource / FfmpegOpener  (sequential decode + seek)
//   luma   — GrayMeter                    (mean luminance via GRAY8)
//   writer — FfmpegWriter / FfmpegSinks   (one H.264 file per segment)
//   probe  — stream properties read at open
//
// Call `ffmpeg_the_third::init()` once before using anything here.

mod helpers;
pub mod luma;
mod probe;
pub mod source;
pub mod writer;

pub use luma::GrayMeter;
pub use source::{FfmpegOpener, FfmpegSource};
pub use writer::{supports_size, FfmpegSinks, FfmpegWriter, WriterOptions};

// Re-export so callers can name frames without depending on ffmpeg directly.
pub use ffmpeg_the_third::util::frame::video::Video as VideoFrame;
