use super::*;
use crate::foundation::core::FrameIndex;
use crate::scene::model::NodeId;

fn assets(with_logo: bool) -> IntroAssets {
    IntroAssets {
        regular: FontData {
            bytes: Arc::new(vec![1]),
        },
        bold: Some(FontData {
            bytes: Arc::new(vec![2]),
        }),
        logo: with_logo.then(|| {
            Arc::new(PreparedImage {
                width: 300,
                height: 150,
                rgba8_premul: Arc::new(vec![0; 300 * 150 * 4]),
            })
        }),
    }
}

fn run_to(intro: &Intro, frame: u64) -> crate::scene::model::SceneState {
    let mut state = intro.scene.initial_state();
    for f in 0..=frame {
        intro.timeline.drive(FrameIndex(f), &mut state).unwrap();
    }
    state
}

#[test]
fn defaults_match_reference_intro() {
    let cfg = IntroConfig::default();
    assert_eq!(cfg.canvas(), Canvas { width: 1920, height: 1080 });
    assert_eq!(cfg.frame_rate().unwrap(), Fps { num: 30, den: 1 });
    assert_eq!(cfg.headline.text, "Hello");
    assert_eq!(cfg.brand.color.to_hex(), "#129a74");
    assert!(cfg.validate().is_ok());
}

#[test]
fn partial_json_overrides_defaults() {
    let cfg = IntroConfig::from_json(br#"{"width": 640, "height": 360, "fps": 25}"#).unwrap();
    assert_eq!(cfg.width, 640);
    assert_eq!(cfg.fps, 25);
    assert_eq!(cfg.subline.text, "from");
}

#[test]
fn json_errors_are_serde_errors() {
    let err = IntroConfig::from_json(br#"{"colour": 1}"#).unwrap_err();
    assert!(matches!(err, FramecastError::Serde(_)));
    let err = IntroConfig::from_json(br#"{"fps": 0}"#).unwrap_err();
    assert!(matches!(err, FramecastError::Validation(_)));
}

#[test]
fn builds_three_text_nodes_and_optional_logo() {
    let intro = build_intro(&IntroConfig::default(), &assets(false)).unwrap();
    assert_eq!(intro.scene.nodes().len(), 3);
    assert_eq!(intro.timeline.len(), 1);
    assert_eq!(intro.timeline.clip_count(), 3);

    let intro = build_intro(&IntroConfig::default(), &assets(true)).unwrap();
    assert_eq!(intro.scene.nodes().len(), 4);
    assert_eq!(intro.timeline.len(), 2);
    assert_eq!(intro.timeline.clip_count(), 4);
    assert_eq!(intro.timeline.last_active_frame(), Some(120));
}

#[test]
fn bold_lines_use_bold_font() {
    let intro = build_intro(&IntroConfig::default(), &assets(false)).unwrap();
    let font_of = |id: u32| match &intro.scene.node(NodeId(id)).unwrap().content {
        NodeContent::Text(t) => t.font.bytes[0],
        NodeContent::Image(_) => panic!("expected text"),
    };
    assert_eq!(font_of(0), 2);
    assert_eq!(font_of(1), 1);
    assert_eq!(font_of(2), 2);
}

#[test]
fn text_slides_and_fades_on_schedule() {
    let intro = build_intro(&IntroConfig::default(), &assets(true)).unwrap();

    let s = run_to(&intro, 0);
    assert_eq!(s.get(NodeId(0)).unwrap().x, -1920.0);
    assert_eq!(s.get(NodeId(1)).unwrap().x, 1920.0);

    let s = run_to(&intro, 30);
    assert_eq!(s.get(NodeId(0)).unwrap().x, -960.0);
    assert_eq!(s.get(NodeId(1)).unwrap().x, 1920.0);

    let s = run_to(&intro, 60);
    assert_eq!(s.get(NodeId(0)).unwrap().x, 0.0);
    assert_eq!(s.get(NodeId(1)).unwrap().x, 960.0);
    assert_eq!(s.get(NodeId(2)).unwrap().opacity, 0.0);

    let s = run_to(&intro, 90);
    assert_eq!(s.get(NodeId(2)).unwrap().opacity, 0.5);
    assert_eq!(s.get(NodeId(3)).unwrap().opacity, 0.0);

    let s = run_to(&intro, 150);
    assert_eq!(s.get(NodeId(1)).unwrap().x, 0.0);
    assert_eq!(s.get(NodeId(2)).unwrap().opacity, 1.0);
    assert_eq!(s.get(NodeId(3)).unwrap().opacity, 1.0);
}

#[test]
fn logo_sits_in_bottom_right_corner() {
    let intro = build_intro(&IntroConfig::default(), &assets(true)).unwrap();
    let logo = intro.scene.node(NodeId(3)).unwrap();
    let NodeContent::Image(img) = &logo.content else {
        panic!("expected image");
    };
    assert_eq!((img.width, img.height), (200.0, 100.0));
    assert_eq!(logo.initial.x, 1920.0 - 200.0 - 75.0);
    assert_eq!(logo.initial.y, 1080.0 - 100.0 - 50.0);
}

#[test]
fn half_second_offsets_round_down_at_odd_rates() {
    assert_eq!(secs_to_frames(25, 25), 62);
    assert_eq!(secs_to_frames(25, 10), 25);

    let cfg = IntroConfig {
        fps: 25,
        ..IntroConfig::default()
    };
    let intro = build_intro(&cfg, &assets(false)).unwrap();
    let brand = |frame| run_to(&intro, frame).get(NodeId(2)).unwrap().opacity;
    assert_eq!(brand(62), 0.0);
    assert!(brand(63) > 0.0);
    assert!(brand(86) < 1.0);
    assert_eq!(brand(87), 1.0);
}

#[test]
fn hex_colors_parse_from_json() {
    let cfg = IntroConfig::from_json(
        br##"{ "brand": { "text": "Acme", "size_px": 40, "color": "#ff8000", "y": 20 } }"##,
    )
    .unwrap();
    assert_eq!(cfg.brand.text, "Acme");
    assert_eq!(cfg.brand.color.to_hex(), "#ff8000");
    assert!(!cfg.brand.bold);
    assert_eq!(cfg.headline.text, "Hello");
}
