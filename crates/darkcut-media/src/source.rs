// crates/darkcut-media/src/source.rs
//
// FfmpegSource: stateful sequential decoder over the best video stream.
//
// decode_next() drains the decoder before reading more packets, so packets
// that yield several frames (or none, with B-frame reordering) keep frame
// order intact. At end of input the decoder is sent EOF and drained, so the
// trailing reordered frames are counted too.
//
// Seeking converts the frame index to a PTS, seeks backward to a keyframe,
// and skips pre-roll frames by PTS (see helpers/seek.rs for the limits).

use std::path::{Path, PathBuf};

use ffmpeg_the_third as ffmpeg;
use ffmpeg::codec::Id as CodecId;
use ffmpeg::format::input;
use ffmpeg::util::frame::video::Video as VideoFrame;
use ffmpeg::util::rational::Rational;

use darkcut_core::{FrameSource, MediaError, SeekCapability, SourceOpener, VideoProperties};

use crate::helpers::seek::{frame_duration_pts, index_to_pts, seek_to_pts};
use crate::probe::stream_info;

/// Codecs where every frame is a keyframe, so a timestamp seek cannot land
/// on the wrong side of a GOP.
const INTRA_ONLY: &[CodecId] = &[
    CodecId::RAWVIDEO,
    CodecId::MJPEG,
    CodecId::PNG,
    CodecId::PRORES,
    CodecId::DNXHD,
];

pub struct FfmpegSource {
    path:            PathBuf,
    ictx:            ffmpeg::format::context::Input,
    decoder:         ffmpeg::decoder::video::Video,
    video_idx:       usize,
    time_base:       Rational,
    start_pts:       i64,
    codec_id:        CodecId,
    props:           VideoProperties,
    /// Index the next returned frame will have.
    next_index:      u64,
    /// After a seek: drop decoded frames with a PTS below this.
    skip_before_pts: Option<i64>,
    eof_sent:        bool,
}

impl FfmpegSource {
    pub fn open(path: &Path) -> Result<Self, MediaError> {
        let ictx = input(path).map_err(|e| MediaError::Open {
            path:   path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let info = stream_info(&ictx, path)?;

        let decoder = {
            let stream = ictx.stream(info.index)
                .ok_or_else(|| MediaError::NoVideoStream(path.to_path_buf()))?;
            let dec_ctx = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
                .map_err(|e| MediaError::Open {
                    path:   path.to_path_buf(),
                    reason: format!("video decoder context: {e}"),
                })?;
            dec_ctx.decoder().video().map_err(|e| MediaError::Open {
                path:   path.to_path_buf(),
                reason: format!("open video decoder: {e}"),
            })?
        };

        // Containers occasionally omit the size; the decoder always knows it.
        let mut props = info.props;
        if props.width == 0 || props.height == 0 {
            props.width  = decoder.width();
            props.height = decoder.height();
        }
        log::debug!(
            "[media] {}x{} @ {}/{} fps, {} frames, codec {:?} ← {}",
            props.width, props.height, props.fps.num, props.fps.den,
            props.total_frames.map_or_else(|| "?".to_string(), |n| n.to_string()),
            info.codec_id,
            path.display(),
        );

        Ok(Self {
            path: path.to_path_buf(),
            ictx,
            decoder,
            video_idx: info.index,
            time_base: info.time_base,
            start_pts: info.start_pts,
            codec_id: info.codec_id,
            props,
            next_index: 0,
            skip_before_pts: None,
            eof_sent: false,
        })
    }

    /// Read packets until one video packet has been sent to the decoder, or
    /// the decoder has been told about end of input.
    fn feed(&mut self) -> Result<(), MediaError> {
        loop {
            match self.ictx.packets().next() {
                Some(Ok((stream, packet))) => {
                    if stream.index() != self.video_idx { continue; }
                    // A corrupt packet costs at most one frame; keep going.
                    if let Err(e) = self.decoder.send_packet(&packet) {
                        log::warn!("[media] dropped undecodable packet in {}: {e}", self.path.display());
                        continue;
                    }
                    return Ok(());
                }
                Some(Err(e)) => {
                    return Err(MediaError::Decode(format!(
                        "read packet from '{}': {e}", self.path.display()
                    )));
                }
                None => {
                    self.decoder.send_eof()
                        .map_err(|e| MediaError::Decode(format!("flush decoder: {e}")))?;
                    self.eof_sent = true;
                    return Ok(());
                }
            }
        }
    }
}

impl FrameSource for FfmpegSource {
    type Frame = VideoFrame;

    fn properties(&self) -> VideoProperties { self.props }

    fn decode_next(&mut self) -> Result<Option<VideoFrame>, MediaError> {
        loop {
            let mut decoded = VideoFrame::empty();
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                if let Some(min_pts) = self.skip_before_pts {
                    // Pre-roll from the keyframe before the seek target.
                    if decoded.pts().is_some_and(|pts| pts < min_pts) { continue; }
                    self.skip_before_pts = None;
                }
                self.next_index += 1;
                return Ok(Some(decoded));
            }
            if self.eof_sent {
                return Ok(None);
            }
            self.feed()?;
        }
    }

    fn seek_capability(&self) -> SeekCapability {
        if self.props.fps.is_valid() && INTRA_ONLY.contains(&self.codec_id) {
            SeekCapability::Exact
        } else {
            SeekCapability::Sequential
        }
    }

    fn seek(&mut self, index: u64) -> Result<(), MediaError> {
        // Already positioned by sequential decode: nothing to do.
        if index == self.next_index && self.skip_before_pts.is_none() {
            return Ok(());
        }
        if !self.props.fps.is_valid() {
            return Err(MediaError::Seek { index, reason: "frame rate unknown".into() });
        }

        let target_pts = index_to_pts(index, self.start_pts, self.props.fps, self.time_base);
        let label = format!("frame {index} of {}", self.path.display());
        seek_to_pts(&mut self.ictx, target_pts, self.time_base, &label)
            .map_err(|e| MediaError::Seek { index, reason: e.to_string() })?;

        self.decoder.flush();
        self.eof_sent = false;
        // Half a frame of slack absorbs timestamp rounding in the container.
        let half_frame = (frame_duration_pts(self.props.fps, self.time_base) / 2.0) as i64;
        self.skip_before_pts = Some(target_pts - half_frame);
        self.next_index = index;
        Ok(())
    }
}

/// Opens a fresh FfmpegSource per call.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegOpener;

impl SourceOpener for FfmpegOpener {
    type Source = FfmpegSource;

    fn open(&self, path: &Path) -> Result<FfmpegSource, MediaError> {
        FfmpegSource::open(path)
    }
}
