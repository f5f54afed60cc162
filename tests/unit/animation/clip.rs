use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

fn counting_clip(start: u64, duration: u64) -> (Clip, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();
    let clip = Clip::new(start, duration, move |p| {
        seen.fetch_add(1, Ordering::SeqCst);
        PropertyUpdate::new(NodeId(0), Property::Opacity, p)
    })
    .unwrap();
    (clip, calls)
}

#[test]
fn effect_never_runs_outside_window() {
    let (clip, calls) = counting_clip(10, 5);
    for f in (0..=10).chain(16..100) {
        assert!(clip.update_at(FrameIndex(f)).is_none(), "frame {f}");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    for f in 11..=15 {
        assert!(clip.update_at(FrameIndex(f)).is_some(), "frame {f}");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 5);
}

#[test]
fn start_frame_is_excluded_and_end_frame_reaches_one() {
    let clip = Clip::linear(NodeId(0), Property::X, 0.0, 1.0, 30, 30).unwrap();
    assert_eq!(clip.progress_at(FrameIndex(30)), None);
    assert_eq!(clip.progress_at(FrameIndex(31)), Some(1.0 / 30.0));
    assert_eq!(clip.progress_at(FrameIndex(60)), Some(1.0));
    assert_eq!(clip.progress_at(FrameIndex(61)), None);
    assert_eq!(clip.end_frame(), 60);
}

#[test]
fn clip_starting_at_zero_skips_frame_zero() {
    let clip = Clip::linear(NodeId(0), Property::X, 0.0, 1.0, 0, 4).unwrap();
    assert_eq!(clip.progress_at(FrameIndex(0)), None);
    assert_eq!(clip.progress_at(FrameIndex(1)), Some(0.25));
}

#[test]
fn zero_duration_is_rejected() {
    assert!(Clip::linear(NodeId(0), Property::X, 0.0, 1.0, 0, 0).is_err());
}

#[test]
fn linear_interpolates_between_endpoints() {
    let clip = Clip::linear(NodeId(3), Property::X, -100.0, 0.0, 0, 4).unwrap();
    let u = clip.update_at(FrameIndex(2)).unwrap();
    assert_eq!(u.target, NodeId(3));
    assert_eq!(u.property, Property::X);
    assert_eq!(u.value, -50.0);
    assert_eq!(clip.update_at(FrameIndex(4)).unwrap().value, 0.0);
}

#[test]
fn debug_omits_effect() {
    let clip = Clip::linear(NodeId(0), Property::Y, 0.0, 1.0, 2, 3).unwrap();
    let s = format!("{clip:?}");
    assert!(s.contains("start_frame: 2"));
    assert!(s.contains("duration: 3"));
}
