use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "stipple", version)]
struct Cli {
    /// Log at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run an engine offscreen and write frames as PNGs.
    Frames(FramesArgs),
    /// Open an interactive window (requires the `window` feature).
    Window(WindowArgs),
}

#[derive(Args, Debug)]
struct EngineArgs {
    /// Source image (PNG, JPEG, ...).
    #[arg(long)]
    image: PathBuf,

    /// Surface width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Surface height in pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Engine options as JSON. Flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    preset: Option<PresetChoice>,

    /// Grid stride in pixels.
    #[arg(long)]
    density: Option<u32>,

    /// Paint every particle with this color, e.g. `#ff8800` or `rgba(255,136,0,1)`.
    #[arg(long)]
    color: Option<stipple::Rgba8>,

    /// Recolor particles randomly every frame.
    #[arg(long)]
    chaotic: bool,

    /// Use the spatial grid to find line pairs.
    #[arg(long)]
    grid: bool,

    /// Step physics on the rayon pool.
    #[arg(long)]
    parallel: bool,

    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct FramesArgs {
    #[command(flatten)]
    engine: EngineArgs,

    /// Number of frames to run.
    #[arg(long, default_value_t = 60)]
    frames: u64,

    /// Write every n-th frame.
    #[arg(long, default_value_t = 1)]
    every: u64,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Circle the pointer around the center instead of leaving it away.
    #[arg(long)]
    orbit: bool,

    /// Flatten frames onto this color; frames keep transparency otherwise.
    #[arg(long)]
    background: Option<stipple::Rgba8>,
}

#[derive(Args, Debug)]
#[cfg_attr(not(feature = "window"), allow(dead_code))]
struct WindowArgs {
    #[command(flatten)]
    engine: EngineArgs,

    #[arg(long, default_value = "#000000")]
    background: stipple::Rgba8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PresetChoice {
    Responsive,
    Fixed,
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
        Command::Frames(args) => cmd_frames(args),
        Command::Window(args) => cmd_window(args),
    }
}

fn engine_options(args: &EngineArgs) -> anyhow::Result<stipple::EngineOptions> {
    let mut opts = match &args.config {
        Some(path) => read_options_json(path)?,
        None => stipple::EngineOptions::default(),
    };
    if let Some(p) = args.preset {
        opts.preset = match p {
            PresetChoice::Responsive => stipple::Preset::Responsive,
            PresetChoice::Fixed => stipple::Preset::Fixed,
        };
    }
    if args.density.is_some() {
        opts.density = args.density;
    }
    if args.color.is_some() {
        opts.override_color = args.color;
    }
    if args.chaotic {
        opts.color_mode = stipple::ColorMode::Chaotic;
    }
    if args.grid {
        opts.line_strategy = stipple::LineStrategy::SpatialGrid;
    }
    if args.parallel {
        opts.parallel = true;
    }
    if let Some(seed) = args.seed {
        opts.seed = seed;
    }
    Ok(opts)
}

fn read_options_json(path: &Path) -> anyhow::Result<stipple::EngineOptions> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    let opts = stipple::EngineOptions::from_json_str(&text)
        .with_context(|| format!("parse config '{}'", path.display()))?;
    Ok(opts)
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.every > 0, "--every must be at least 1");
    let opts = engine_options(&args.engine)?;
    let size = stipple::SurfaceSize::new(args.engine.width, args.engine.height);

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("create output dir '{}'", args.out.display()))?;

    let surface = stipple::CpuSurface::new(size)?;
    let mut engine = stipple::Engine::new(
        surface,
        stipple::HeadlessScheduler::new(),
        stipple::ImageSource::from_path(&args.engine.image),
        opts,
    )?;

    let script = if args.orbit {
        stipple::PointerScript::Orbit {
            radius: 0.25,
            period: 120,
        }
    } else {
        stipple::PointerScript::Idle
    };

    let mut written = 0u64;
    let report = stipple::run_headless(&mut engine, args.frames, script, |i, surface, outcome| {
        if i % args.every != 0 || !matches!(outcome, stipple::TickOutcome::Rendered(_)) {
            return Ok(());
        }
        let frame = match args.background {
            Some(bg) => surface.frame().flatten_onto(bg),
            None => surface.frame().to_straight(),
        };
        let path = args.out.join(format!("frame_{i:05}.png"));
        image::save_buffer_with_format(
            &path,
            &frame.data,
            frame.width,
            frame.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        written += 1;
        Ok(())
    })?;
    engine.cancel();

    eprintln!(
        "ran {} frames ({} particles), wrote {} PNGs to {}",
        report.ticks,
        report.particles,
        written,
        args.out.display()
    );
    Ok(())
}

#[cfg(feature = "window")]
fn cmd_window(args: WindowArgs) -> anyhow::Result<()> {
    let opts = engine_options(&args.engine)?;
    let size = stipple::SurfaceSize::new(args.engine.width, args.engine.height);
    stipple::run_window(
        "stipple",
        size,
        stipple::ImageSource::from_path(&args.engine.image),
        opts,
        args.background,
    )?;
    Ok(())
}

#[cfg(not(feature = "window"))]
fn cmd_window(_args: WindowArgs) -> anyhow::Result<()> {
    anyhow::bail!("stipple was built without the `window` feature")
}
