// crates/darkcut-media/src/luma.rs
//
// GrayMeter: mean luminance of a decoded frame via swscale → GRAY8.

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::Pixel;
use ffmpeg::software::scaling::{context::Context as SwsContext, flag::Flags};
use ffmpeg::util::frame::video::Video as VideoFrame;

use darkcut_core::{mean_luma, LumaMeter, MediaError};

struct GrayScaler {
    key: (Pixel, u32, u32),
    ctx: SwsContext,
}

/// Reuses one scaler while the input format and size stay the same.
#[derive(Default)]
pub struct GrayMeter {
    scaler: Option<GrayScaler>,
}

impl GrayMeter {
    pub fn new() -> Self { Self::default() }
}

impl LumaMeter<VideoFrame> for GrayMeter {
    fn mean_luma(&mut self, frame: &VideoFrame) -> Result<f64, MediaError> {
        let (w, h) = (frame.width(), frame.height());
        let key = (frame.format(), w, h);

        let scaler = match self.scaler.take() {
            Some(s) if s.key == key => self.scaler.insert(s),
            _ => {
                let ctx = SwsContext::get(key.0, w, h, Pixel::GRAY8, w, h, Flags::BILINEAR)
                    .map_err(|e| MediaError::Decode(format!("gray scaler: {e}")))?;
                self.scaler.insert(GrayScaler { key, ctx })
            }
        };

        let mut gray = VideoFrame::empty();
        scaler.ctx.run(frame, &mut gray)
            .map_err(|e| MediaError::Decode(format!("convert to gray: {e}")))?;

        Ok(mean_luma(gray.data(0), w as usize, h as usize, gray.stride(0)))
    }
}
