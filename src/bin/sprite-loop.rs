use std::{
    io::Write as _,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use sprite_loop::{
    AnimationMode, BackgroundChoice, CancelToken, Catalog, EngineConfig, ExportRequest,
    FramePipeline, GifSession, LiveAnimator, Resolution, ResolvedId, Rgba8, SessionOptions, Speed,
    TieredSources, output_file_name, refresh_clock,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sprite-loop", version, about)]
struct Cli {
    /// Engine config JSON (defaults are used for anything it omits).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export the animation loop as a GIF.
    Export(ExportArgs),
    /// Render a single frame at a given phase as a PNG.
    Frame(FrameArgs),
    /// Run the live preview over a simulated display clock and dump drawn frames as PNGs.
    Preview(PreviewArgs),
    /// Resolve an id or inscription number and print what the catalog knows about it.
    Resolve(ResolveArgs),
}

#[derive(Args, Debug)]
struct Target {
    /// Id or inscription number (digits only).
    #[arg(long)]
    id: String,

    #[arg(long, default_value = "normal")]
    mode: AnimationMode,

    /// Square output side in pixels (100..=1200).
    #[arg(long, default_value = "600", value_parser = parse_resolution)]
    resolution: Resolution,

    /// `none`, `auto` or a hex colour such as `#1e90ff`.
    #[arg(long, default_value = "none")]
    background: BackgroundChoice,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    target: Target,

    /// Playback multiplier (0.1..=5.0).
    #[arg(long, default_value = "1.0", value_parser = parse_speed)]
    speed: Speed,

    /// Directory the GIF is written into.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    target: Target,

    /// Loop phase in [0, 1).
    #[arg(long, default_value_t = 0.0)]
    phase: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    target: Target,

    #[arg(long, default_value = "1.0", value_parser = parse_speed)]
    speed: Speed,

    /// Simulated wall-clock length.
    #[arg(long, default_value_t = 2.0)]
    seconds: f64,

    /// Simulated display refresh rate.
    #[arg(long, default_value_t = 60.0)]
    refresh_hz: f64,

    /// Directory drawn frames are written into; nothing is written when omitted.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ResolveArgs {
    /// Id or inscription number (digits only).
    #[arg(long)]
    id: String,
}

fn parse_resolution(s: &str) -> Result<Resolution, String> {
    let px: u32 = s.trim().parse().map_err(|e| format!("{e}"))?;
    Resolution::new(px).map_err(|e| e.to_string())
}

fn parse_speed(s: &str) -> Result<Speed, String> {
    let v: f64 = s.trim().parse().map_err(|e| format!("{e}"))?;
    Speed::new(v).map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::Export(args) => cmd_export(&cfg, args),
        Command::Frame(args) => cmd_frame(&cfg, args),
        Command::Preview(args) => cmd_preview(&cfg, args),
        Command::Resolve(args) => cmd_resolve(&cfg, args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(p) => Ok(EngineConfig::from_path(p)?),
        None => Ok(EngineConfig::default()),
    }
}

fn load_catalog(cfg: &EngineConfig) -> anyhow::Result<Catalog> {
    Ok(Catalog::load_first(
        &cfg.catalogs,
        cfg.offline_id_min,
        cfg.offline_id_max,
    )?)
}

/// Everything a render needs once the user's target has been resolved.
struct Prepared {
    id: u32,
    tier: String,
    upper: Vec<u8>,
    lower: Vec<u8>,
    background: Rgba8,
}

fn prepare(cfg: &EngineConfig, target: &Target) -> anyhow::Result<Prepared> {
    let catalog = load_catalog(cfg)?;
    let ResolvedId { id, via } = catalog.resolve_id(&target.id)?;
    tracing::info!(id, ?via, "target resolved");

    let background = target.background.resolve(&catalog, id)?;
    let sources = TieredSources::from_configs(&cfg.tiers)?;
    let fetched = sources.fetch_pair(target.mode, id)?;
    Ok(Prepared {
        id,
        tier: fetched.tier,
        upper: fetched.upper,
        lower: fetched.lower,
        background,
    })
}

fn cmd_export(cfg: &EngineConfig, args: ExportArgs) -> anyhow::Result<()> {
    let prepared = prepare(cfg, &args.target)?;
    let px = args.target.resolution.px();

    let mut pipeline = FramePipeline::new(cfg.clone(), args.target.resolution)?;
    let mut session = GifSession::with_speed(
        SessionOptions {
            loop_forever: cfg.loop_forever,
            ..SessionOptions::square(px, prepared.background)
        },
        cfg.gif_speed,
    )?;
    let req = ExportRequest {
        background: prepared.background,
        speed: args.speed,
    };

    let mut stderr = std::io::stderr();
    let mut report = |fraction: f64| {
        let _ = write!(stderr, "\rencoding {:>3}%", (fraction * 100.0).round() as u32);
        let _ = stderr.flush();
    };

    let (bytes, stats) = pipeline.run_encoded(
        &prepared.upper,
        &prepared.lower,
        &req,
        &mut session,
        &mut report,
        &CancelToken::new(),
    )?;
    eprintln!();

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    let name = output_file_name(
        &cfg.subject,
        prepared.id,
        args.target.mode,
        args.speed,
        "gif",
    );
    let out = args.out_dir.join(name);
    std::fs::write(&out, &bytes).with_context(|| format!("write gif '{}'", out.display()))?;

    eprintln!(
        "wrote {} ({} frames, {} ms/frame, {} bytes, source: {})",
        out.display(),
        stats.frames_submitted,
        stats.frame_delay_ms,
        stats.bytes,
        prepared.tier
    );
    Ok(())
}

fn cmd_frame(cfg: &EngineConfig, args: FrameArgs) -> anyhow::Result<()> {
    if !(0.0..1.0).contains(&args.phase) {
        anyhow::bail!("phase must be within [0, 1), got {}", args.phase);
    }
    let prepared = prepare(cfg, &args.target)?;
    let layers = sprite_loop::decode_pair(&prepared.upper, &prepared.lower)?;

    let mut pipeline = FramePipeline::new(cfg.clone(), args.target.resolution)?;
    let frame = pipeline.render_still(&layers, args.phase, prepared.background)?;
    write_png(&args.out, frame.into_image()?)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_preview(cfg: &EngineConfig, args: PreviewArgs) -> anyhow::Result<()> {
    let prepared = prepare(cfg, &args.target)?;
    let layers = sprite_loop::decode_pair(&prepared.upper, &prepared.lower)?;

    let mut animator = LiveAnimator::new(
        cfg.clone(),
        layers,
        args.target.resolution,
        prepared.background,
        args.speed,
    )?;

    let ticks = (args.seconds.max(0.0) * args.refresh_hz.max(1.0)).ceil() as usize;
    let out_dir = args.out_dir.clone();
    let mut written = 0usize;
    let drawn = animator.run(
        refresh_clock(args.refresh_hz).take(ticks),
        &CancelToken::new(),
        |phase, surface| {
            tracing::debug!(phase, "preview frame");
            if let Some(dir) = &out_dir {
                let path = dir.join(format!("frame_{written:04}.png"));
                let image = surface.read_back()?.into_image()?;
                write_png(&path, image)?;
                written += 1;
            }
            Ok(())
        },
    )?;

    eprintln!(
        "preview drew {drawn} frames in {:.1}s at {:.0} Hz",
        args.seconds, args.refresh_hz
    );
    Ok(())
}

fn cmd_resolve(cfg: &EngineConfig, args: ResolveArgs) -> anyhow::Result<()> {
    let catalog = load_catalog(cfg)?;
    let ResolvedId { id, via } = catalog.resolve_id(&args.id)?;

    println!("id: {id}");
    println!("resolved via: {via:?}");
    if let Some(record) = catalog.record(id) {
        println!("inscription: {}", record.inscription);
        println!("body: {}", record.attributes.body);
    }
    match catalog.auto_background(id) {
        Some(c) => println!("auto background: {}", c.to_hex()),
        None => println!("auto background: unavailable"),
    }
    Ok(())
}

fn write_png(path: &Path, image: image::RgbaImage) -> sprite_loop::SpriteResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}
