use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "celcomp", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the extraction plan of a scene as JSON.
    Plan(PlanArgs),
    /// Render, composite and renumber a scene from pre-exported layer frames.
    Extract(ExtractArgs),
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Input scene JSON.
    #[arg(long)]
    scene: PathBuf,

    /// Prefix placed before `pos_{position}.` in layer filenames.
    #[arg(long)]
    prefix: Option<String>,

    /// Layer file extension.
    #[arg(long)]
    ext: Option<String>,

    /// Plan hidden layers too.
    #[arg(long, default_value_t = false)]
    include_hidden: bool,

    /// Write the plan here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ExtractArgs {
    /// Input scene JSON.
    #[arg(long)]
    scene: PathBuf,

    /// Folder holding `<layer_id>/<frame:04>.png` exports.
    #[arg(long)]
    sources: PathBuf,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Renumber the output sequence to start here.
    #[arg(long, allow_negative_numbers = true)]
    frame_start: Option<i64>,

    /// Only produce this frame (repeatable).
    #[arg(long = "export-frame")]
    export_frames: Vec<i64>,

    /// Composite every layer at full opacity.
    #[arg(long, default_value_t = false)]
    ignore_opacity: bool,

    /// Solid background colour as `RRGGBB`; needs a scene canvas.
    #[arg(long, value_parser = parse_rgb)]
    background: Option<[u8; 3]>,

    /// Write `thumbnail.jpg` from the first output frame.
    #[arg(long, default_value_t = false)]
    thumbnail: bool,

    /// Keep per-layer files after compositing.
    #[arg(long, default_value_t = false)]
    keep_intermediates: bool,

    /// Render hidden layers too.
    #[arg(long, default_value_t = false)]
    include_hidden: bool,

    /// Render layers in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,
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
        Command::Plan(args) => cmd_plan(args),
        Command::Extract(args) => cmd_extract(args),
    }
}

fn load_scene(path: &std::path::Path) -> anyhow::Result<celcomp::Scene> {
    let scene = celcomp::Scene::from_path(path)
        .with_context(|| format!("load scene '{}'", path.display()))?;
    scene.validate()?;
    Ok(scene)
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let scene = load_scene(&args.scene)?;
    let opts = celcomp::PlanOpts {
        prefix: args.prefix,
        ext: args.ext,
        skip_invisible: !args.include_hidden,
    };
    let plan = celcomp::plan_extraction(&scene.layers, scene.render_range()?, &opts);
    let json = plan.to_json_pretty()?;

    match args.out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(&out, json)
                .with_context(|| format!("write plan '{}'", out.display()))?;
            eprintln!("wrote {}", out.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_extract(args: ExtractArgs) -> anyhow::Result<()> {
    let scene = load_scene(&args.scene)?;
    let source = celcomp::DirectorySource::new(&args.sources);

    let export_frames = if args.export_frames.is_empty() {
        None
    } else {
        Some(args.export_frames.iter().copied().collect::<BTreeSet<_>>())
    };
    let opts = celcomp::ExtractOpts {
        output_frame_start: args.frame_start,
        export_frames,
        ignore_layer_opacity: args.ignore_opacity,
        background: args.background,
        thumbnail: args.thumbnail,
        keep_intermediates: args.keep_intermediates,
        include_hidden: args.include_hidden,
        threading: celcomp::RenderThreading {
            parallel: args.parallel,
            threads: args.threads,
        },
        ..celcomp::ExtractOpts::new(&args.out)
    };

    let out = match celcomp::extract_sequence(&scene, &source, &opts) {
        Ok(out) => out,
        Err(celcomp::CelError::EmptyPlan) => {
            eprintln!("nothing to render: no visible layer has exposures in the mark range");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    eprintln!(
        "wrote {} frames to {}",
        out.files.len(),
        args.out.display()
    );
    Ok(())
}

fn parse_rgb(s: &str) -> Result<[u8; 3], String> {
    let hex = s.trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("expected RRGGBB, got '{s}'"));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("bad colour '{s}': {e}"))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}
