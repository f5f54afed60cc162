use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "framecast", version)]
struct Cli {
    /// Log debug output (stale-frame removal, shaping, ffmpeg arguments).
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the overlay over a background video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render a single overlay frame as a PNG.
    Frame(FrameArgs),
}

#[derive(Args, Debug)]
struct SceneArgs {
    /// Font for regular text lines.
    #[arg(long)]
    font: PathBuf,

    /// Font for bold text lines; defaults to `--font`.
    #[arg(long)]
    bold_font: Option<PathBuf>,

    /// Logo image (PNG, JPEG, or SVG). Without it the logo layer is skipped.
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Intro parameters as JSON. Missing fields take the built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured frame rate.
    #[arg(long)]
    fps: Option<u32>,

    /// Override the configured output width.
    #[arg(long)]
    width: Option<u32>,

    /// Override the configured output height.
    #[arg(long)]
    height: Option<u32>,

    /// Backend to use.
    #[arg(long, value_enum, default_value_t = BackendChoice::Cpu)]
    backend: BackendChoice,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Background video the overlay is composited onto.
    #[arg(long)]
    background: PathBuf,

    /// Output video path.
    #[arg(long)]
    out: PathBuf,

    /// Directory receiving the numbered PNG frames.
    #[arg(long, default_value = "frames")]
    frames_dir: PathBuf,

    /// Fail instead of overwriting an existing output video.
    #[arg(long)]
    keep_existing: bool,

    #[command(flatten)]
    scene: SceneArgs,
}

#[derive(Args, Debug)]
struct FrameArgs {
    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    scene: SceneArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    Cpu,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn load_config(args: &SceneArgs) -> anyhow::Result<framecast::IntroConfig> {
    let mut cfg = match &args.config {
        Some(path) => framecast::IntroConfig::from_path(path)?,
        None => framecast::IntroConfig::default(),
    };
    if let Some(fps) = args.fps {
        cfg.fps = fps;
    }
    if let Some(width) = args.width {
        cfg.width = width;
    }
    if let Some(height) = args.height {
        cfg.height = height;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn load_assets(
    args: &SceneArgs,
    cfg: &framecast::IntroConfig,
) -> anyhow::Result<framecast::IntroAssets> {
    use framecast::assets::decode::{load_font, load_logo};

    let regular = load_font(&args.font)?;
    let bold = args.bold_font.as_deref().map(load_font).transpose()?;
    let logo = match &args.logo {
        Some(path) => Some(Arc::new(load_logo(path, cfg.logo.height_px)?)),
        None => None,
    };
    Ok(framecast::IntroAssets {
        regular,
        bold,
        logo,
    })
}

fn build(args: &SceneArgs) -> anyhow::Result<framecast::Intro> {
    let cfg = load_config(args)?;
    let assets = load_assets(args, &cfg)?;
    Ok(framecast::build_intro(&cfg, &assets)?)
}

fn make_backend(choice: BackendChoice) -> anyhow::Result<Box<dyn framecast::RenderBackend>> {
    let kind = match choice {
        BackendChoice::Cpu => framecast::BackendKind::Cpu,
    };
    Ok(framecast::create_backend(
        kind,
        &framecast::RenderSettings::default(),
    )?)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let intro = build(&args.scene)?;
    let backend = make_backend(args.scene.backend)?;

    let mut opts = framecast::RunOpts::new(&args.frames_dir, &args.background, &args.out);
    opts.overwrite = !args.keep_existing;

    let mut run = framecast::OverlayRun::from_intro(intro, opts);
    let report = run
        .run(
            &framecast::FfprobeDuration::default(),
            backend,
            &framecast::FfmpegAssembler::default(),
        )
        .with_context(|| format!("render '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({} frames in {} ms, {:.1} fps)",
        args.out.display(),
        report.frames,
        report.elapsed.as_millis(),
        report.frames_per_second()
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let intro = build(&args.scene)?;
    let mut backend = make_backend(args.scene.backend)?;

    let mut state = intro.scene.initial_state();
    for f in 0..=args.frame {
        intro.timeline.drive(framecast::FrameIndex(f), &mut state)?;
    }
    let frame = backend.render(&intro.scene, &state)?;

    framecast::encode::ffmpeg::ensure_parent_dir(&args.out)?;
    framecast::write_png(&args.out, &frame)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
