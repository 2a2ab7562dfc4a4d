// crates/darkcut-media/tests/pipeline.rs
//
// End-to-end: synthesise a short clip of solid dark/bright frames, scan it,
// export the dark runs, and decode the outputs back.
//
// Clips are written with MPEG-4 Part 2, which is always built into
// libavcodec, so the tests do not depend on libx264 being present.

use std::path::{Path, PathBuf};

use ffmpeg_the_third as ffmpeg;
use ffmpeg::codec::Id as CodecId;
use ffmpeg::format::Pixel;

use darkcut_core::{
    scan, FrameRate, FrameSink, FrameSource, LumaMeter, ReacquireStrategy, SegmentError,
    SegmentExporter, SinkFactory, Threshold, VideoProperties,
};
use darkcut_media::{FfmpegOpener, FfmpegSinks, FfmpegSource, GrayMeter, VideoFrame, WriterOptions};

const W: u32 = 64;
const H: u32 = 48;
/// Limited-range luma; GRAY8 conversion maps these to roughly 0 and 255.
const DARK_Y: u8 = 16;
const LIT_Y: u8 = 235;

fn sinks() -> FfmpegSinks {
    FfmpegSinks::new(WriterOptions { codec: CodecId::MPEG4, crf: None, preset: None })
}

fn solid_frame(y: u8) -> VideoFrame {
    let mut frame = VideoFrame::new(Pixel::YUV420P, W, H);
    frame.data_mut(0).fill(y);
    frame.data_mut(1).fill(128);
    frame.data_mut(2).fill(128);
    frame
}

/// `#` = bright frame, anything else = dark frame.
fn write_clip(path: &Path, pattern: &str) {
    let levels: Vec<u8> = pattern.chars().map(|c| if c == '#' { LIT_Y } else { DARK_Y }).collect();
    write_levels(path, &levels);
}

/// One solid frame per luma value.
fn write_levels(path: &Path, levels: &[u8]) {
    ffmpeg::init().unwrap();
    let props = VideoProperties {
        fps:          FrameRate::new(25, 1),
        width:        W,
        height:       H,
        total_frames: None,
    };
    let mut writer = sinks().create(path, &props).unwrap();
    for &y in levels {
        writer.write_frame(&solid_frame(y)).unwrap();
    }
    writer.finish().unwrap();
}

/// Mean luma of every frame in `path`.
fn lumas(path: &Path) -> Vec<f64> {
    let mut src = FfmpegSource::open(path).unwrap();
    let mut meter = GrayMeter::new();
    let mut out = Vec::new();
    while let Some(frame) = src.decode_next().unwrap() {
        out.push(meter.mean_luma(&frame).unwrap());
    }
    out
}

fn threshold() -> Threshold {
    Threshold::new(40.0).unwrap()
}

fn scan_file(path: &Path) -> Vec<(u64, u64, u32)> {
    let mut src = FfmpegSource::open(path).unwrap();
    let report = scan(&mut src, &mut GrayMeter::new(), threshold(), |_| {}).unwrap();
    report.segments.iter().map(|s| (s.start(), s.length(), s.ordinal())).collect()
}

fn export(input: &Path, prefix: &Path, strategy: ReacquireStrategy) -> darkcut_core::ExportSummary {
    let mut src = FfmpegSource::open(input).unwrap();
    let props = src.properties();
    let report = scan(&mut src, &mut GrayMeter::new(), threshold(), |_| {}).unwrap();
    drop(src);

    let opener = FfmpegOpener;
    let sinks = sinks();
    let exporter = SegmentExporter::new(&opener, &sinks, input, prefix, "mp4", props, strategy);
    exporter.export_all(&report.segments)
}

fn out_path(prefix: &Path, ordinal: u32) -> PathBuf {
    PathBuf::from(format!("{}_segment{ordinal}.mp4", prefix.display()))
}

#[test]
fn synthetic_clip_round_trips_through_source() {
    let dir = tempfile::tempdir().unwrap();
    let clip = dir.path().join("clip.mp4");
    write_clip(&clip, "##..#");

    let l = lumas(&clip);
    assert_eq!(l.len(), 5);
    assert!(l[0] > 200.0 && l[4] > 200.0, "{l:?}");
    assert!(l[2] < 20.0 && l[3] < 20.0, "{l:?}");

    let props = FfmpegSource::open(&clip).unwrap().properties();
    assert_eq!((props.width, props.height), (W, H));
    assert!((props.fps.as_f64() - 25.0).abs() < 0.01);
}

#[test]
fn scan_finds_dark_runs() {
    let dir = tempfile::tempdir().unwrap();
    let clip = dir.path().join("clip.mp4");
    write_clip(&clip, "##...##..#");
    assert_eq!(scan_file(&clip), vec![(2, 3, 1), (7, 2, 2)]);
}

#[test]
fn all_bright_clip_has_no_segments() {
    let dir = tempfile::tempdir().unwrap();
    let clip = dir.path().join("bright.mp4");
    write_clip(&clip, "########");
    assert!(scan_file(&clip).is_empty());

    let summary = export(&clip, &dir.path().join("out"), ReacquireStrategy::ReopenAndSkip);
    assert!(summary.outcomes.is_empty());
    assert!(!out_path(&dir.path().join("out"), 1).exists());
}

#[test]
fn reopen_export_writes_exact_lengths() {
    let dir = tempfile::tempdir().unwrap();
    let clip = dir.path().join("clip.mp4");
    write_clip(&clip, "#...##.......#..");
    let prefix = dir.path().join("cut");

    let summary = export(&clip, &prefix, ReacquireStrategy::ReopenAndSkip);
    assert_eq!(summary.exported(), 3);

    for (ordinal, expected) in [(1, 3), (2, 7), (3, 2)] {
        let l = lumas(&out_path(&prefix, ordinal));
        assert_eq!(l.len(), expected, "segment {ordinal}");
        assert!(l.iter().all(|&v| v < 40.0), "segment {ordinal} holds a bright frame: {l:?}");
    }
}

#[test]
fn seek_export_matches_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let clip = dir.path().join("clip.mp4");
    // Each dark frame gets its own level so a shifted or pre-rolled frame
    // shows up as a mismatch, not just as a wrong count.
    write_levels(&clip, &[LIT_Y, LIT_Y, 22, 28, 34, LIT_Y, LIT_Y, 40, 16, LIT_Y]);

    let seek = export(&clip, &dir.path().join("seek"), ReacquireStrategy::Seek);
    let reopen = export(&clip, &dir.path().join("reopen"), ReacquireStrategy::ReopenAndSkip);
    assert_eq!(seek.exported(), 2);
    assert_eq!(reopen.exported(), 2);

    for (ordinal, expected) in [(1, 3), (2, 2)] {
        let by_seek = lumas(&out_path(&dir.path().join("seek"), ordinal));
        let by_reopen = lumas(&out_path(&dir.path().join("reopen"), ordinal));
        assert_eq!(by_seek.len(), expected, "segment {ordinal}");
        assert!(by_seek.iter().all(|&v| v < 40.0), "segment {ordinal} holds a bright frame: {by_seek:?}");
        for (i, (a, b)) in by_seek.iter().zip(&by_reopen).enumerate() {
            assert!((a - b).abs() < 3.0, "segment {ordinal} frame {i}: seek {a} vs reopen {b}");
        }
    }
}

#[test]
fn odd_size_is_refused_before_the_file_is_created() {
    ffmpeg::init().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("odd.mp4");
    let props = VideoProperties {
        fps:          FrameRate::new(25, 1),
        width:        W + 1,
        height:       H,
        total_frames: None,
    };
    let err = sinks().create(&path, &props).err().unwrap();
    assert!(matches!(err, darkcut_core::MediaError::CreateWriter { .. }), "{err}");
    assert!(!path.exists());
}

#[test]
fn unwritable_target_skips_one_segment() {
    let dir = tempfile::tempdir().unwrap();
    let clip = dir.path().join("clip.mp4");
    write_clip(&clip, ".#.#.");
    let prefix = dir.path().join("part");

    // A directory squatting on segment 2's file name cannot be opened for writing.
    std::fs::create_dir(out_path(&prefix, 2)).unwrap();

    let summary = export(&clip, &prefix, ReacquireStrategy::ReopenAndSkip);
    assert_eq!(summary.outcomes.len(), 3);
    assert_eq!(summary.exported(), 2);
    assert!(matches!(summary.outcomes[1].result, Err(SegmentError::Create(_))));
    assert_eq!(lumas(&out_path(&prefix, 1)).len(), 1);
    assert_eq!(lumas(&out_path(&prefix, 3)).len(), 1);
}
