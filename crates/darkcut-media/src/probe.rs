// crates/darkcut-media/src/probe.rs
//
// Stream probing: frame rate, display size, and frame count of the best
// video stream. Read once when a source is opened.

use std::path::Path;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::media::Type;
use ffmpeg::util::rational::Rational;

use darkcut_core::{FrameRate, MediaError, VideoProperties};

/// Everything the source needs from the container before decoding starts.
pub(crate) struct StreamInfo {
    pub index:     usize,
    pub time_base: Rational,
    pub start_pts: i64,
    pub codec_id:  ffmpeg::codec::Id,
    pub props:     VideoProperties,
}

pub(crate) fn stream_info(
    ictx: &ffmpeg::format::context::Input,
    path: &Path,
) -> Result<StreamInfo, MediaError> {
    let stream = ictx.streams().best(Type::Video)
        .ok_or_else(|| MediaError::NoVideoStream(path.to_path_buf()))?;

    let time_base = stream.time_base();
    let start_pts = match stream.start_time() {
        t if t == ffmpeg::ffi::AV_NOPTS_VALUE => 0,
        t => t,
    };

    // avg_frame_rate is what players show; r_frame_rate is the fallback for
    // containers that leave it unset.
    let fps = [stream.avg_frame_rate(), stream.rate()]
        .into_iter()
        .find(|r| r.numerator() > 0 && r.denominator() > 0)
        .map(|r| FrameRate::new(r.numerator() as u32, r.denominator() as u32))
        .unwrap_or(FrameRate::new(0, 1));

    let params = stream.parameters();
    let (width, height) = (params.width() as u32, params.height() as u32);
    let codec_id = params.id();

    let total_frames = if stream.frames() > 0 {
        Some(stream.frames() as u64)
    } else {
        // Fall back to duration × fps: stream duration first, then container.
        let secs = if stream.duration() > 0 {
            stream.duration() as f64 * f64::from(time_base)
        } else {
            ictx.duration() as f64 / ffmpeg::ffi::AV_TIME_BASE as f64
        };
        (secs > 0.0 && fps.is_valid()).then(|| (secs * fps.as_f64()).round() as u64)
    };

    Ok(StreamInfo {
        index: stream.index(),
        time_base,
        start_pts,
        codec_id,
        props: VideoProperties { fps, width, height, total_frames },
    })
}
