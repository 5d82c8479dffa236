use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use serde_json::json;
use sha2::Digest as _;

#[derive(Clone, Debug)]
struct BenchArgs {
    width: u32,
    height: u32,
    preview_width: u32,
    preview_height: u32,
    warmup: u32,
    repeats: u32,
    safari: bool,
    seed: u64,
    grain: f64,
    vignette: f64,
    blur: f64,
    out_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, Default)]
struct RunMetrics {
    full_render: Duration,
    composite_only: Duration,
    grain: Duration,
    vignette: Duration,
    encode_png: Duration,
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    let args = parse_args()?;
    let caps = if args.safari {
        gradii::RenderCaps::fallback()
    } else {
        gradii::RenderCaps::default()
    };

    eprintln!(
        "bench: {repeats} run(s) ({profile} build), preview {pw}x{ph}, export {w}x{h}, caps={caps:?}",
        repeats = args.repeats,
        profile = if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        },
        pw = args.preview_width,
        ph = args.preview_height,
        w = args.width,
        h = args.height,
    );

    let mut sizes = Vec::new();
    for (label, w, h) in [
        ("preview", args.preview_width, args.preview_height),
        ("export", args.width, args.height),
    ] {
        sizes.push(bench_size(&args, caps, label, gradii::Canvas::new(w, h)?)?);
    }

    let report = json!({
        "repeats": args.repeats,
        "safari": args.safari,
        "seed": args.seed,
        "sizes": sizes,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn bench_size(
    args: &BenchArgs,
    caps: gradii::RenderCaps,
    label: &str,
    canvas: gradii::Canvas,
) -> anyhow::Result<serde_json::Value> {
    let def = bench_settings(args, canvas);
    let mut sess = gradii::EditorSession::new(
        def,
        gradii::SessionOpts {
            caps,
            ..gradii::SessionOpts::default()
        },
    )?;

    for _ in 0..args.warmup {
        let _ = run_once(&mut sess, args)?;
    }
    let mut runs = Vec::<RunMetrics>::with_capacity(args.repeats as usize);
    let mut last_png = Vec::new();
    for _ in 0..args.repeats {
        let (m, png) = run_once(&mut sess, args)?;
        runs.push(m);
        last_png = png;
    }

    if let Some(dir) = &args.out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create out dir '{}'", dir.display()))?;
        let path = dir.join(gradii::export_filename(canvas.width, canvas.height));
        std::fs::write(&path, &last_png)
            .with_context(|| format!("write png '{}'", path.display()))?;
        eprintln!("wrote {}", path.display());
    }

    Ok(json!({
        "label": label,
        "width": canvas.width,
        "height": canvas.height,
        "png_sha256": sha256_hex(&last_png),
        "png_bytes": last_png.len(),
        "stages_ms": report_percentiles(&runs),
    }))
}

fn bench_settings(args: &BenchArgs, canvas: gradii::Canvas) -> gradii::WallpaperDef {
    let mut def = gradii::WallpaperDef {
        canvas,
        seed: Some(args.seed),
        overlay: gradii::Overlay::None,
        ..gradii::WallpaperDef::default()
    };
    def.filters.blur = args.blur;
    def.effects.grain = args.grain;
    def.effects.vignette = args.vignette;
    def
}

fn run_once(
    sess: &mut gradii::EditorSession,
    args: &BenchArgs,
) -> anyhow::Result<(RunMetrics, Vec<u8>)> {
    let mut m = RunMetrics::default();
    let now = Instant::now();

    // Toggling the fill color forces the background layer to be redrawn.
    let mut next = sess.settings().clone();
    next.background.color = if next.background.color == gradii::Color::rgb8(0x0d, 0x13, 0x19) {
        gradii::Color::rgb8(0x0e, 0x13, 0x19)
    } else {
        gradii::Color::rgb8(0x0d, 0x13, 0x19)
    };
    sess.update(next, now)?;
    let t0 = Instant::now();
    sess.render_now()?;
    m.full_render = t0.elapsed();

    let mut next = sess.settings().clone();
    next.filters.brightness = if next.filters.brightness == 100.0 {
        101.0
    } else {
        100.0
    };
    sess.update(next, now)?;
    let t0 = Instant::now();
    sess.render_now()?;
    m.composite_only = t0.elapsed();

    let frame = sess.visible().clone();
    let mut buf = frame.data.clone();
    let t0 = Instant::now();
    gradii::apply_grain(
        &mut buf,
        frame.width,
        frame.height,
        args.grain.max(1.0),
        Some(args.seed),
        true,
    )?;
    m.grain = t0.elapsed();

    let mut cache = gradii::VignetteCache::new();
    let t0 = Instant::now();
    gradii::apply_vignette(
        &mut buf,
        frame.width,
        frame.height,
        args.vignette.max(1.0),
        &mut cache,
    )?;
    m.vignette = t0.elapsed();

    let t0 = Instant::now();
    let png = gradii::encode_png(&frame)?;
    m.encode_png = t0.elapsed();

    Ok((m, png))
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

fn parse_args() -> anyhow::Result<BenchArgs> {
    let mut args = std::env::args().skip(1);

    let mut out = BenchArgs {
        width: 1920,
        height: 1080,
        preview_width: 768,
        preview_height: 432,
        warmup: 1,
        repeats: 10,
        safari: false,
        seed: 7,
        grain: 25.0,
        vignette: 40.0,
        blur: 500.0,
        out_dir: None,
    };

    while let Some(a) = args.next() {
        match a.as_str() {
            "--width" => out.width = parse_num(args.next(), "--width")?,
            "--height" => out.height = parse_num(args.next(), "--height")?,
            "--preview-width" => out.preview_width = parse_num(args.next(), "--preview-width")?,
            "--preview-height" => {
                out.preview_height = parse_num(args.next(), "--preview-height")?
            }
            "--warmup" => out.warmup = parse_num(args.next(), "--warmup")?,
            "--repeats" => out.repeats = parse_num(args.next(), "--repeats")?,
            "--seed" => out.seed = parse_num(args.next(), "--seed")?,
            "--grain" => out.grain = parse_num(args.next(), "--grain")?,
            "--vignette" => out.vignette = parse_num(args.next(), "--vignette")?,
            "--blur" => out.blur = parse_num(args.next(), "--blur")?,
            "--safari" => out.safari = true,
            "--out-dir" => {
                out.out_dir = Some(PathBuf::from(args.next().ok_or_else(|| {
                    anyhow::anyhow!("missing value for --out-dir (expected a path)")
                })?))
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => anyhow::bail!("unknown arg '{a}' (try --help)"),
        }
    }
    if out.repeats == 0 {
        anyhow::bail!("--repeats must be >= 1");
    }
    Ok(out)
}

fn print_help() {
    eprintln!(
        r#"gradii-bench

Re-renders one wallpaper at preview and export size and reports p50/p90/p99 per stage as JSON.

Usage:
  cargo run -q --release
  cargo run -q --release -- --width 2560 --height 1440 --repeats 20
  cargo run -q --release -- --safari

Args:
  --width N            export width (default 1920)
  --height N           export height (default 1080)
  --preview-width N    (default 768)
  --preview-height N   (default 432)
  --warmup N       (default 1)
  --repeats N      (default 10)
  --seed N         (default 7)
  --blur V         (default 500)
  --grain V        (default 25)
  --vignette V     (default 40)
  --safari         fallback blur path and data URL export
  --out-dir PATH   also write the last PNG of each size there
"#
    );
}

fn parse_num<T>(v: Option<String>, flag: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let v = v.ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))?;
    v.parse::<T>()
        .with_context(|| format!("parse {flag} value '{v}'"))
}

fn report_percentiles(runs: &[RunMetrics]) -> serde_json::Value {
    type Getter = fn(&RunMetrics) -> Duration;
    type Field = (&'static str, Getter);

    fn collect(runs: &[RunMetrics], f: Getter) -> Vec<Duration> {
        let mut v = runs.iter().map(f).collect::<Vec<_>>();
        v.sort_by_key(|d| d.as_nanos());
        v
    }

    fn p(v: &[Duration], p: f64) -> f64 {
        if v.is_empty() {
            return 0.0;
        }
        let n = v.len();
        let rank = (p * (n as f64)).ceil().clamp(1.0, n as f64) as usize;
        v[rank - 1].as_secs_f64() * 1000.0
    }

    let fields: &[Field] = &[
        ("full_render", |m| m.full_render),
        ("composite_only", |m| m.composite_only),
        ("grain", |m| m.grain),
        ("vignette", |m| m.vignette),
        ("encode_png", |m| m.encode_png),
    ];

    let mut out = serde_json::Map::new();
    for (name, getter) in fields {
        let v = collect(runs, *getter);
        out.insert(
            (*name).to_owned(),
            json!({ "p50": p(&v, 0.50), "p90": p(&v, 0.90), "p99": p(&v, 0.99) }),
        );
    }
    serde_json::Value::Object(out)
}
