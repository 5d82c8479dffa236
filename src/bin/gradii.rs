use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "gradii", version, about = "Render layered wallpapers to PNG")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a settings file to `gradii-{w}x{h}.png`.
    Render(RenderArgs),
    /// Write the default settings as JSON.
    Init(InitArgs),
    /// Shuffle shape positions and untouched style properties.
    Shuffle(ShuffleArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input settings JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Use the fallback path of hosts without canvas filters (downsampled blur, data URL export).
    #[arg(long, default_value_t = false)]
    safari: bool,

    /// Override the settings seed.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct InitArgs {
    /// Output settings JSON.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ShuffleArgs {
    /// Input settings JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output settings JSON.
    #[arg(long)]
    out: PathBuf,

    /// Seed for the shuffle.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Init(args) => cmd_init(args),
        Command::Shuffle(args) => cmd_shuffle(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let wallpaper = gradii::Wallpaper::from_path(&args.in_path)?;
    let mut def = wallpaper.into_def();
    if args.seed.is_some() {
        def.seed = args.seed;
    }
    let base_dir = args
        .in_path
        .parent()
        .unwrap_or_else(|| std::path::Path::new("."));

    let caps = if args.safari {
        gradii::RenderCaps::fallback()
    } else {
        gradii::RenderCaps::default()
    };
    let opts = gradii::SessionOpts {
        caps,
        ..gradii::SessionOpts::default()
    };
    let now = Instant::now();
    let mut sess = gradii::EditorSession::new(def, opts)?;
    match gradii::find_fallback_font().map(|p| gradii::FontFace::from_path(&p)) {
        Some(Ok(font)) => sess.set_default_font(font, now),
        Some(Err(e)) => tracing::warn!(error = %e, "default font unreadable"),
        None => tracing::warn!("no default font found, unregistered families are skipped"),
    }
    if let Err(e) = sess.load_referenced_assets(Some(base_dir), now) {
        tracing::warn!(error = %e, "asset load failed, rendering with fallbacks");
        eprintln!("warning: {e}");
    }

    let mut sink = gradii::FileSink::new(&args.out);
    let artifact = sess.export(&mut sink)?;
    let path = args.out.join(&artifact.filename);
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_init(args: InitArgs) -> anyhow::Result<()> {
    let json = gradii::Wallpaper::from_def(gradii::WallpaperDef::default()).to_json_pretty()?;
    write_text(&args.out, &json)
}

fn cmd_shuffle(args: ShuffleArgs) -> anyhow::Result<()> {
    let mut def = gradii::Wallpaper::from_path(&args.in_path)?.into_def();
    if args.seed.is_some() {
        def.seed = args.seed;
    }
    let mut sess = gradii::EditorSession::new(def, gradii::SessionOpts::default())?;
    sess.generate_new_palette(Instant::now());
    let json = gradii::Wallpaper::from_def(sess.settings().clone()).to_json_pretty()?;
    write_text(&args.out, &json)
}

fn write_text(path: &std::path::Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, text).with_context(|| format!("write '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}
