use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "starfield", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render the whole sequence as numbered PNGs or a video (video requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Print the effective configuration as JSON.
    DumpConfig(ConfigArgs),
}

#[derive(Parser, Debug)]
struct ConfigArgs {
    /// Configuration JSON; missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the star-field seed.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Frame index (0-based).
    #[arg(long, default_value_t = 0)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Output directory (png) or video file (video).
    #[arg(long)]
    out: PathBuf,

    /// Output kind.
    #[arg(long, value_enum, default_value_t = OutputFormat::Png)]
    format: OutputFormat,

    /// Override the number of frames to render.
    #[arg(long)]
    frames: Option<u64>,

    /// Fail instead of overwriting outputs that already exist.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Frames per parallel batch (parallel mode only).
    #[arg(long, default_value_t = 16)]
    chunk_size: usize,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// One `outNNNN.png` per frame.
    Png,
    /// A single video encoded by `ffmpeg` with the configured codec.
    Video,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::DumpConfig(args) => cmd_dump_config(args),
    }
}

fn load_config(args: &ConfigArgs) -> anyhow::Result<starfield::StarfieldConfig> {
    let mut cfg = match &args.config {
        Some(path) => starfield::StarfieldConfig::from_path(path)?,
        None => starfield::StarfieldConfig::default(),
    };
    if let Some(seed) = args.seed {
        cfg.seed = seed;
    }
    Ok(cfg)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config)?;
    let sim = starfield::Simulation::new(cfg)?;
    let frame = sim.render_frame(starfield::FrameIndex(args.frame));

    starfield::encode::ensure_parent_dir(&args.out)?;
    starfield::write_png(&args.out, &frame)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(&args.config)?;
    if let Some(frames) = args.frames {
        cfg.frame_count = frames;
    }
    let codec = cfg.codec.clone();
    let sim = starfield::Simulation::new(cfg)?;

    let opts = starfield::RenderOpts {
        parallel: args.parallel,
        chunk_size: args.chunk_size,
        threads: args.threads,
    };

    let mut sink = make_sink(args.format, &args.out, !args.no_overwrite, codec);
    let stats = sim.render_range(sim.full_range(), &opts, sink.as_mut())?;

    eprintln!(
        "wrote {} frames to {}",
        stats.frames_rendered,
        args.out.display()
    );
    Ok(())
}

fn make_sink(
    format: OutputFormat,
    out: &Path,
    overwrite: bool,
    codec: String,
) -> Box<dyn starfield::FrameSink> {
    match format {
        OutputFormat::Png => Box::new(starfield::PngSequenceSink::new(
            starfield::PngSequenceOpts {
                overwrite,
                ..starfield::PngSequenceOpts::new(out)
            },
        )),
        OutputFormat::Video => Box::new(starfield::FfmpegSink::new(
            starfield::FfmpegSinkOpts {
                overwrite,
                ..starfield::FfmpegSinkOpts::new(out).with_codec(codec)
            },
        )),
    }
}

fn cmd_dump_config(args: ConfigArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args)?;
    cfg.validate()?;
    println!("{}", cfg.to_json_pretty()?);
    Ok(())
}
