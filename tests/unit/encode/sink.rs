use super::*;

fn cfg() -> SinkConfig {
    SinkConfig::new(
        Canvas {
            width: 2,
            height: 1,
        },
        Fps::whole(30).unwrap(),
    )
}

fn frame(width: u32, height: u32) -> FrameRGBA {
    FrameRGBA {
        width,
        height,
        data: vec![0; (width * height * 4) as usize],
        premultiplied: true,
    }
}

#[test]
fn in_memory_sink_captures_frames_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &frame(2, 1)).unwrap();
    sink.push_frame(FrameIndex(1), &frame(2, 1)).unwrap();
    sink.end().unwrap();

    assert_eq!(sink.config(), Some(cfg()));
    assert!(sink.ended());
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![0, 1]);
}

#[test]
fn in_memory_sink_rejects_repeats_and_wrong_sizes() {
    let mut sink = InMemorySink::new();
    assert!(sink.push_frame(FrameIndex(0), &frame(2, 1)).is_err());

    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(3), &frame(2, 1)).unwrap();
    assert!(sink.push_frame(FrameIndex(3), &frame(2, 1)).is_err());
    assert!(sink.push_frame(FrameIndex(2), &frame(2, 1)).is_err());
    assert!(sink.push_frame(FrameIndex(4), &frame(1, 2)).is_err());
}

#[test]
fn begin_resets_captured_frames() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &frame(2, 1)).unwrap();
    sink.end().unwrap();
    sink.begin(cfg()).unwrap();
    assert!(sink.frames().is_empty());
    assert!(!sink.ended());
}

#[test]
fn check_frame_validates_byte_length() {
    let mut bad = frame(2, 1);
    bad.data.pop();
    assert!(cfg().check_frame(&bad).is_err());
    assert!(cfg().check_frame(&frame(2, 1)).is_ok());
}
