use super::*;

fn job() -> AssembleJob {
    AssembleJob {
        fps: Fps::whole(30).unwrap(),
        canvas: Canvas {
            width: 1920,
            height: 1080,
        },
        frame_dir: PathBuf::from("out/frames"),
        pattern: FramePattern::default(),
        background: PathBuf::from("bg.mp4"),
        output: PathBuf::from("out/final.mp4"),
        overwrite: true,
    }
}

fn strings(args: &[OsString]) -> Vec<String> {
    args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
}

#[test]
fn args_follow_assembly_contract() {
    let args = strings(&assemble_args(&job()));
    let frames = PathBuf::from("out/frames")
        .join("frame-%06d.png")
        .to_string_lossy()
        .into_owned();
    let expected = vec![
        "-y",
        "-loglevel",
        "error",
        "-i",
        "bg.mp4",
        "-framerate",
        "30/1",
        "-i",
        frames.as_str(),
        "-filter_complex",
        "[0:v]scale=1920:1080:force_original_aspect_ratio=increase,crop=1920:1080,setsar=1[v0];[v0][1:v]overlay=0:0",
        "-map",
        "0:a?",
        "-c:v",
        "libx264",
        "-pix_fmt",
        "yuv420p",
        "-c:a",
        "aac",
        "-shortest",
        "out/final.mp4",
    ];
    assert_eq!(args, expected);
}

#[test]
fn args_respect_overwrite_and_rational_rate() {
    let mut j = job();
    j.overwrite = false;
    j.fps = Fps::new(30000, 1001).unwrap();
    let args = strings(&assemble_args(&j));
    assert_eq!(args[0], "-n");
    let rate = args.iter().position(|a| a == "-framerate").unwrap();
    assert_eq!(args[rate + 1], "30000/1001");
}

#[test]
fn validate_requires_even_dimensions() {
    let mut j = job();
    assert!(j.validate().is_ok());
    j.canvas.width = 1921;
    assert!(j.validate().is_err());
    j.canvas = Canvas {
        width: 0,
        height: 2,
    };
    assert!(j.validate().is_err());
}

#[test]
fn missing_program_is_an_assembly_error() {
    let dir = PathBuf::from("target").join("unit_assemble_missing_program");
    let mut j = job();
    j.output = dir.join("final.mp4");
    let _ = std::fs::remove_file(&j.output);

    let err = FfmpegAssembler::with_program("framecast-no-such-encoder")
        .assemble(&j)
        .unwrap_err();
    assert!(matches!(err, FramecastError::Assembly(_)), "{err}");
    assert!(dir.is_dir());
}

#[test]
fn refuses_to_clobber_without_overwrite() {
    let dir = PathBuf::from("target").join("unit_assemble_no_clobber");
    std::fs::create_dir_all(&dir).unwrap();
    let mut j = job();
    j.output = dir.join("final.mp4");
    j.overwrite = false;
    std::fs::write(&j.output, b"existing").unwrap();

    let err = FfmpegAssembler::default().assemble(&j).unwrap_err();
    assert!(matches!(err, FramecastError::Validation(_)), "{err}");
    assert_eq!(std::fs::read(&j.output).unwrap(), b"existing");
}
