// crates/darkcut-media/src/helpers/seek.rs
//
// Frame-index seeking on top of avformat's timestamp seek.
//
// The core addresses frames by 0-based index; avformat seeks by timestamp
// and lands on a keyframe. The conversion assumes a constant frame rate and
// the caller discards pre-roll frames whose PTS is before the target. On
// variable-frame-rate input, or input with missing timestamps, the landing
// frame can differ from the index the scan assigned. That is why the
// exporter only picks seeking on its own for intra-only codecs.

use ffmpeg_the_third as ffmpeg;
use ffmpeg::util::rational::Rational;

use darkcut_core::FrameRate;

/// Duration of one frame in stream time-base units.
pub fn frame_duration_pts(fps: FrameRate, time_base: Rational) -> f64 {
    let tb = f64::from(time_base);
    if tb <= 0.0 || !fps.is_valid() {
        return 0.0;
    }
    1.0 / (fps.as_f64() * tb)
}

/// PTS of frame `index`, counting from the stream's first timestamp.
pub fn index_to_pts(index: u64, start_pts: i64, fps: FrameRate, time_base: Rational) -> i64 {
    start_pts + (index as f64 * frame_duration_pts(fps, time_base)).round() as i64
}

/// Seek `ictx` backward to the keyframe at or before `target_pts`.
///
/// `target_pts` is in the stream time base; avformat's stream-less seek wants
/// AV_TIME_BASE units. Logs a warning on failure; whether that fails the
/// caller is the caller's decision.
pub fn seek_to_pts(
    ictx:       &mut ffmpeg::format::context::Input,
    target_pts: i64,
    time_base:  Rational,
    label:      &str,   // caller description for log messages e.g. "segment 3"
) -> Result<(), ffmpeg::Error> {
    let target_secs = target_pts as f64 * f64::from(time_base);
    let seek_ts = (target_secs * ffmpeg::ffi::AV_TIME_BASE as f64) as i64;
    ictx.seek(seek_ts, ..=seek_ts).map_err(|e| {
        log::warn!("[seek] failed in {label} at {target_secs:.3}s: {e}");
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mp4_style_time_base() {
        // 25 fps in a 1/12800 time base: 512 ticks per frame.
        let tb = Rational::new(1, 12800);
        let fps = FrameRate::new(25, 1);
        assert_eq!(frame_duration_pts(fps, tb), 512.0);
        assert_eq!(index_to_pts(0, 0, fps, tb), 0);
        assert_eq!(index_to_pts(10, 0, fps, tb), 5120);
    }

    #[test]
    fn ntsc_in_mpegts_clock() {
        let tb = Rational::new(1, 90000);
        let fps = FrameRate::new(30000, 1001);
        assert!((frame_duration_pts(fps, tb) - 3003.0).abs() < 1e-6);
        // Non-zero start time is carried through.
        assert_eq!(index_to_pts(2, 126000, fps, tb), 126000 + 6006);
    }

    #[test]
    fn unknown_rate_has_zero_duration() {
        assert_eq!(frame_duration_pts(FrameRate::new(0, 1), Rational::new(1, 1000)), 0.0);
    }
}
