use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use flyaround::{Converter, FailurePolicy, FlyaroundError, ProgramSpec, RunConfig, Vector3};

#[derive(Parser, Debug)]
#[command(name = "flyaround", version)]
struct Cli {
    /// Log engine and converter command lines.
    #[arg(long, short, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors.
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every frame of the fly-around (requires the render engine and converter).
    Render(RunArgs),
    /// Print the camera pose of every frame as JSON lines, without rendering.
    Path(RunArgs),
    /// Print the effective run configuration as JSON.
    ShowConfig(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Run configuration JSON. Missing fields fall back to the final-scene preset.
    #[arg(long, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Built-in run configuration.
    #[arg(long, value_enum, default_value_t = PresetChoice::FinalScene)]
    preset: PresetChoice,

    /// Render engine binary.
    #[arg(long)]
    engine: Option<String>,

    /// Scene selector passed to the engine.
    #[arg(long)]
    world: Option<String>,

    #[arg(long)]
    seed: Option<u64>,

    /// Aspect ratio as W:H.
    #[arg(long)]
    aspect_ratio: Option<String>,

    #[arg(long)]
    image_width: Option<u32>,

    #[arg(long)]
    samples_per_pixel: Option<u32>,

    /// Directory for frame files.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Look-at point as x,y,z.
    #[arg(long, allow_hyphen_values = true)]
    origin: Option<Vector3>,

    /// Absolute camera start position as x,y,z.
    #[arg(long, allow_hyphen_values = true, conflicts_with = "offset")]
    start: Option<Vector3>,

    /// Camera start offset from the origin as x,y,z.
    #[arg(long, allow_hyphen_values = true)]
    offset: Option<Vector3>,

    /// Polar-angle increment per frame, in degrees (may be negative).
    #[arg(long, allow_hyphen_values = true)]
    step_degrees: Option<f64>,

    /// Number of frames.
    #[arg(long)]
    frames: Option<u64>,

    #[arg(long, value_enum)]
    failure_policy: Option<PolicyChoice>,

    /// Kill a frame's render after this many seconds.
    #[arg(long)]
    timeout_secs: Option<f64>,

    /// External converter binary, called as `<converter> <raw> <image>`.
    #[arg(long, conflicts_with = "builtin_converter")]
    converter: Option<String>,

    /// Convert PPM to PNG in-process instead of calling an external converter.
    #[arg(long)]
    builtin_converter: bool,

    /// Write the run report as JSON to this path.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PresetChoice {
    FinalScene,
    RandomScene,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyChoice {
    Abort,
    Continue,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Path(args) => cmd_path(args),
        Command::ShowConfig(args) => cmd_show_config(args),
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else if quiet {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(args: &RunArgs) -> anyhow::Result<RunConfig> {
    let mut cfg = match &args.config {
        Some(path) => RunConfig::from_path(path)?,
        None => match args.preset {
            PresetChoice::FinalScene => flyaround::Preset::FinalScene.config(),
            PresetChoice::RandomScene => flyaround::Preset::RandomScene.config(),
        },
    };

    let render = &mut cfg.render;
    if let Some(engine) = &args.engine {
        render.engine = ProgramSpec::new(engine.clone());
    }
    if let Some(world) = &args.world {
        render.world = world.clone();
    }
    if let Some(seed) = args.seed {
        render.seed = seed;
    }
    if let Some(ratio) = &args.aspect_ratio {
        render.aspect_ratio = ratio.clone();
    }
    if let Some(width) = args.image_width {
        render.image_width = width;
    }
    if let Some(spp) = args.samples_per_pixel {
        render.samples_per_pixel = spp;
    }
    if let Some(dir) = &args.output_dir {
        render.output_dir = dir.clone();
    }
    if let Some(secs) = args.timeout_secs {
        render.timeout_secs = Some(secs);
    }
    if let Some(program) = &args.converter {
        render.converter = Converter::External(ProgramSpec::new(program.clone()));
    }
    if args.builtin_converter {
        render.converter = Converter::Builtin;
    }

    let orbit = &mut cfg.orbit;
    if let Some(origin) = args.origin {
        // Keep the absolute start position when only the origin moves.
        let start = orbit.origin + orbit.start_offset;
        orbit.origin = origin;
        orbit.start_offset = start - origin;
    }
    if let Some(start) = args.start {
        orbit.start_offset = start - orbit.origin;
    }
    if let Some(offset) = args.offset {
        orbit.start_offset = offset;
    }
    if let Some(step) = args.step_degrees {
        orbit.angular_step_degrees = step;
    }
    if let Some(frames) = args.frames {
        orbit.frame_count = frames;
    }

    if let Some(policy) = args.failure_policy {
        cfg.failure_policy = match policy {
            PolicyChoice::Abort => FailurePolicy::Abort,
            PolicyChoice::Continue => FailurePolicy::Continue,
        };
    }
    Ok(cfg)
}

fn cmd_render(args: RunArgs) -> anyhow::Result<()> {
    let cfg = resolve_config(&args)?;
    cfg.validate()?;

    let report = match cfg.run() {
        Ok(report) => report,
        Err(FlyaroundError::Aborted { report, source }) => {
            if let Some(path) = &args.report {
                write_report(path, &report)?;
            }
            eprintln!(
                "aborted after {} of {} frames ({} written)",
                report.frames_attempted, report.frames_planned, report.frames_succeeded
            );
            return Err(anyhow::Error::new(*source).context("fly-around aborted"));
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(path) = &args.report {
        write_report(path, &report)?;
    }
    eprintln!(
        "wrote {} of {} frames to {}",
        report.frames_succeeded,
        report.frames_planned,
        cfg.render.output_dir.display()
    );
    if !report.failures.is_empty() {
        for failure in &report.failures {
            eprintln!("  frame {}: {}", failure.index, failure.message);
        }
        anyhow::bail!("{} frame(s) failed", report.frames_failed());
    }
    Ok(())
}

fn cmd_path(args: RunArgs) -> anyhow::Result<()> {
    let cfg = resolve_config(&args)?;
    cfg.orbit.validate()?;

    use std::io::Write as _;
    let mut out = std::io::stdout().lock();
    for task in flyaround::OrbitPath::new(cfg.orbit) {
        let line = serde_json::to_string(&task).context("serialize frame pose")?;
        writeln!(out, "{line}").context("write frame pose")?;
    }
    Ok(())
}

fn cmd_show_config(args: RunArgs) -> anyhow::Result<()> {
    let cfg = resolve_config(&args)?;
    println!("{}", cfg.to_json_pretty()?);
    Ok(())
}

fn write_report(path: &std::path::Path, report: &flyaround::RunReport) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create report dir '{}'", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(report).context("serialize run report")?;
    std::fs::write(path, text).with_context(|| format!("write report '{}'", path.display()))?;
    Ok(())
}
