use super::*;
use crate::foundation::core::{Canvas, Fps};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig::new(Canvas { width, height }, Fps::whole(30).unwrap())
}

#[test]
fn file_names_are_one_based_and_padded() {
    let p = FramePattern::default();
    assert_eq!(p.file_name(FrameIndex(0)), "frame-000001.png");
    assert_eq!(p.file_name(FrameIndex(1)), "frame-000002.png");
    assert_eq!(p.file_name(FrameIndex(2)), "frame-000003.png");
    assert_eq!(p.file_name(FrameIndex(999_999)), "frame-1000000.png");
    assert_eq!(p.ffmpeg_pattern(), "frame-%06d.png");
}

#[test]
fn pattern_matches_prefix_and_extension_only() {
    let p = FramePattern::default();
    assert!(p.matches("frame-000001.png"));
    assert!(p.matches("frame-12.png"));
    assert!(!p.matches("frame-000001.jpg"));
    assert!(!p.matches("background.png"));
    assert!(!p.matches("frame.png"));
    assert!(!p.matches("notes.txt"));
}

#[test]
fn clear_stale_frames_leaves_other_files() {
    let dir = scratch_dir("unit_clear_stale_frames");
    for name in ["frame-000001.png", "frame-000999.png", "keep.png", "frame-000001.txt"] {
        std::fs::write(dir.join(name), b"x").unwrap();
    }
    std::fs::create_dir_all(dir.join("frame-dir.png")).unwrap();

    let removed = clear_stale_frames(&dir, &FramePattern::default()).unwrap();
    assert_eq!(removed, 2);
    assert!(!dir.join("frame-000001.png").exists());
    assert!(!dir.join("frame-000999.png").exists());
    assert!(dir.join("keep.png").exists());
    assert!(dir.join("frame-000001.txt").exists());
    assert!(dir.join("frame-dir.png").is_dir());
}

#[test]
fn clear_stale_frames_on_missing_dir_is_noop() {
    let dir = PathBuf::from("target").join("unit_clear_missing_dir_never_created");
    let _ = std::fs::remove_dir_all(&dir);
    assert_eq!(clear_stale_frames(&dir, &FramePattern::default()).unwrap(), 0);
}

#[test]
fn png_sink_writes_straight_alpha_files() {
    let dir = scratch_dir("unit_png_sink");
    let mut sink = PngSequenceSink::new(dir.join("frames"));
    sink.begin(cfg(2, 1)).unwrap();
    assert!(dir.join("frames").is_dir());

    let frame = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![128, 0, 0, 128, 0, 0, 255, 255],
        premultiplied: true,
    };
    sink.push_frame(FrameIndex(0), &frame).unwrap();
    sink.push_frame(FrameIndex(1), &frame).unwrap();
    sink.end().unwrap();
    assert_eq!(sink.written(), 2);

    let first = dir.join("frames").join("frame-000001.png");
    assert_eq!(sink.frame_path(FrameIndex(0)), first);
    let img = image::open(&first).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (2, 1));
    assert_eq!(img.as_raw(), &vec![255, 0, 0, 128, 0, 0, 255, 255]);
    assert!(dir.join("frames").join("frame-000002.png").exists());
}

#[test]
fn png_sink_overwrites_existing_frames() {
    let dir = scratch_dir("unit_png_sink_overwrite");
    std::fs::write(dir.join("frame-000001.png"), b"stale").unwrap();

    let mut sink = PngSequenceSink::new(&dir);
    sink.begin(cfg(1, 1)).unwrap();
    let frame = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![1, 2, 3, 255],
        premultiplied: false,
    };
    sink.push_frame(FrameIndex(0), &frame).unwrap();
    sink.end().unwrap();

    let img = image::open(dir.join("frame-000001.png")).unwrap().to_rgba8();
    assert_eq!(img.as_raw(), &vec![1, 2, 3, 255]);
}

#[test]
fn png_sink_enforces_order_and_size() {
    let dir = scratch_dir("unit_png_sink_order");
    let mut sink = PngSequenceSink::new(&dir);
    let frame = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![0; 4],
        premultiplied: true,
    };
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());

    sink.begin(cfg(1, 1)).unwrap();
    sink.push_frame(FrameIndex(1), &frame).unwrap();
    assert!(sink.push_frame(FrameIndex(1), &frame).is_err());
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());

    let wide = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![0; 8],
        premultiplied: true,
    };
    assert!(sink.push_frame(FrameIndex(2), &wide).is_err());
    sink.end().unwrap();
    assert!(sink.end().is_err());
}

#[test]
fn write_png_rejects_short_buffers() {
    let dir = scratch_dir("unit_write_png");
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 4],
        premultiplied: true,
    };
    assert!(write_png(&dir.join("bad.png"), &frame).is_err());
}
