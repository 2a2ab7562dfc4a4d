// crates/darkcut-media/src/writer.rs
//
// Single-stream video writer for one exported segment.
//
// Stream layout in the output container:
//   Stream 0 — video only (H.264 YUV420P, CRF 18, preset fast by default).
//   No audio track is written.
//
// PTS strategy:
//   A monotonically increasing frame counter in a 1/fps time base, starting
//   at zero for every file. Source timestamps are not carried over.
//
// Lifecycle:
//   create() opens the output file and writes the header. finish() flushes
//   the encoder and writes the trailer. A writer dropped without finish()
//   (early return on error) still closes the file handle via Output's Drop.

use std::path::{Path, PathBuf};

use ffmpeg_the_third as ffmpeg;
use ffmpeg::codec::{self, Id as CodecId};
use ffmpeg::encoder;
use ffmpeg::format::{output as open_output, Pixel};
use ffmpeg::software::scaling::{Context as ScaleCtx, Flags as ScaleFlags};
use ffmpeg::util::frame::video::Video as VideoFrame;
use ffmpeg::util::rational::Rational;
use ffmpeg::Packet;

use darkcut_core::{FrameSink, MediaError, SinkFactory, VideoProperties};

// ── Options ───────────────────────────────────────────────────────────────────

/// Encoder settings. The binary always uses the default (H.264); the codec
/// is only swapped by test harnesses that cannot rely on libx264.
#[derive(Clone, Debug)]
pub struct WriterOptions {
    pub codec:  CodecId,
    /// Constant rate factor; `None` leaves the encoder's bit-rate default.
    pub crf:    Option<u8>,
    pub preset: Option<&'static str>,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self { codec: CodecId::H264, crf: Some(18), preset: Some("fast") }
    }
}

/// YUV420P subsamples chroma 2×2, so libx264 refuses odd dimensions.
pub fn supports_size(width: u32, height: u32) -> bool {
    width > 0 && height > 0 && width % 2 == 0 && height % 2 == 0
}

// ── Writer ────────────────────────────────────────────────────────────────────

struct YuvScaler {
    key: (Pixel, u32, u32),
    ctx: ScaleCtx,
}

pub struct FfmpegWriter {
    path:     PathBuf,
    octx:     ffmpeg::format::context::Output,
    encoder:  ffmpeg::encoder::Video,
    width:    u32,
    height:   u32,
    frame_tb: Rational,
    ost_tb:   Rational,
    scaler:   Option<YuvScaler>,
    next_pts: i64,
}

impl FfmpegWriter {
    pub fn create(
        path:    &Path,
        props:   &VideoProperties,
        options: &WriterOptions,
    ) -> Result<Self, MediaError> {
        let create_err = |reason: String| MediaError::CreateWriter {
            path: path.to_path_buf(),
            reason,
        };

        if !props.fps.is_valid() {
            return Err(create_err("source frame rate unknown".into()));
        }
        if !supports_size(props.width, props.height) {
            return Err(create_err(format!(
                "{}x{} cannot be encoded as YUV420P (width and height must be even)",
                props.width, props.height,
            )));
        }

        let mut octx = open_output(path).map_err(|e| create_err(e.to_string()))?;

        let frame_tb = Rational::new(props.fps.den as i32, props.fps.num as i32);

        let codec = encoder::find(options.codec)
            .ok_or_else(|| create_err(format!("{:?} encoder not available", options.codec)))?;

        let mut ost = octx.add_stream(codec)
            .map_err(|e| create_err(format!("add video stream: {e}")))?;
        ost.set_time_base(frame_tb);

        let enc_ctx = codec::context::Context::new_with_codec(codec);
        let mut enc = enc_ctx.encoder().video()
            .map_err(|e| create_err(format!("create video encoder context: {e}")))?;

        enc.set_width(props.width);
        enc.set_height(props.height);
        enc.set_format(Pixel::YUV420P);
        enc.set_time_base(frame_tb);
        enc.set_frame_rate(Some(Rational::new(props.fps.num as i32, props.fps.den as i32)));

        let mut opts = ffmpeg::Dictionary::new();
        if let Some(crf) = options.crf {
            enc.set_bit_rate(0); // CRF controls quality
            opts.set("crf", &crf.to_string());
        }
        if let Some(preset) = options.preset {
            opts.set("preset", preset);
        }

        let encoder = enc.open_as_with(codec, opts)
            .map_err(|e| create_err(format!("open {:?} encoder: {e}", options.codec)))?;

        // encoder::Video does not implement AsPtr<AVCodecParameters>, so the
        // stream's codecpar is filled through FFI.
        unsafe {
            let ret = ffmpeg::ffi::avcodec_parameters_from_context(
                (**(*octx.as_mut_ptr()).streams.add(0)).codecpar,
                encoder.as_ptr() as *mut ffmpeg::ffi::AVCodecContext,
            );
            if ret < 0 {
                return Err(create_err(format!("avcodec_parameters_from_context failed: {ret}")));
            }
        }

        octx.write_header()
            .map_err(|e| create_err(format!("write header: {e}")))?;

        // The muxer may replace the stream time base while writing the header.
        let ost_tb = octx.stream(0)
            .ok_or_else(|| create_err("output stream missing after header".into()))?
            .time_base();

        log::debug!("[media] writer open {}x{} → {}", props.width, props.height, path.display());

        Ok(Self {
            path: path.to_path_buf(),
            octx,
            encoder,
            width: props.width,
            height: props.height,
            frame_tb,
            ost_tb,
            scaler: None,
            next_pts: 0,
        })
    }

    /// Receive every packet the encoder has ready and mux it.
    fn drain_packets(&mut self) -> Result<(), MediaError> {
        let mut pkt = Packet::empty();
        while self.encoder.receive_packet(&mut pkt).is_ok() {
            pkt.set_stream(0);
            pkt.rescale_ts(self.frame_tb, self.ost_tb);
            pkt.write_interleaved(&mut self.octx)
                .map_err(|e| MediaError::Encode(format!("write packet: {e}")))?;
        }
        Ok(())
    }
}

impl FrameSink<VideoFrame> for FfmpegWriter {
    fn write_frame(&mut self, frame: &VideoFrame) -> Result<(), MediaError> {
        // Scale from the decoded frame's own size: libavcodec already crops
        // to display dimensions, so this never picks up padding rows.
        let key = (frame.format(), frame.width(), frame.height());
        let (dst_w, dst_h) = (self.width, self.height);

        let scaler = match self.scaler.take() {
            Some(s) if s.key == key => self.scaler.insert(s),
            _ => {
                let ctx = ScaleCtx::get(
                    key.0,          key.1, key.2,
                    Pixel::YUV420P, dst_w, dst_h,
                    ScaleFlags::BILINEAR,
                ).map_err(|e| MediaError::Encode(format!("create swscale context: {e}")))?;
                self.scaler.insert(YuvScaler { key, ctx })
            }
        };

        let mut yuv = VideoFrame::empty();
        scaler.ctx.run(frame, &mut yuv)
            .map_err(|e| MediaError::Encode(format!("scale video frame: {e}")))?;
        yuv.set_pts(Some(self.next_pts));

        self.encoder.send_frame(&yuv)
            .map_err(|e| MediaError::Encode(format!("send video frame to encoder: {e}")))?;
        self.drain_packets()?;
        self.next_pts += 1;
        Ok(())
    }

    fn finish(mut self) -> Result<(), MediaError> {
        self.encoder.send_eof()
            .map_err(|e| MediaError::Encode(format!("send EOF to video encoder: {e}")))?;
        self.drain_packets()?;
        self.octx.write_trailer()
            .map_err(|e| MediaError::Encode(format!("write trailer: {e}")))?;
        log::debug!("[media] {} frames → {}", self.next_pts, self.path.display());
        Ok(())
    }
}

/// Creates one FfmpegWriter per segment.
#[derive(Clone, Debug, Default)]
pub struct FfmpegSinks {
    options: WriterOptions,
}

impl FfmpegSinks {
    pub fn new(options: WriterOptions) -> Self { Self { options } }
}

impl SinkFactory<VideoFrame> for FfmpegSinks {
    type Sink = FfmpegWriter;

    fn create(&self, path: &Path, props: &VideoProperties) -> Result<FfmpegWriter, MediaError> {
        FfmpegWriter::create(path, props, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_sizes_only() {
        assert!(supports_size(1920, 1080));
        assert!(supports_size(64, 48));
        assert!(!supports_size(1919, 1080));
        assert!(!supports_size(640, 361));
        assert!(!supports_size(0, 480));
    }
}
