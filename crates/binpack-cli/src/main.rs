use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::Context;
use binpack_core::config::{
    GuillotineChoice, GuillotineSplit, MaxRectsHeuristic, PackerConfig, ShelfHeuristic,
    SkylineHeuristic,
};
use binpack_core::model::{Placement, RectSize};
use binpack_core::packer::{
    BinPacker, GuillotinePacker, MaxRectsPacker, ShelfNextFitPacker, ShelfPacker, SkylinePacker,
};
use clap::{ArgAction, Parser, Subcommand};
use serde::Deserialize;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "binpack",
    about = "Pack rectangle lists into a fixed-size bin",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack an item list into one bin and report placements
    Pack(PackArgs),
    /// Run a strategy portfolio over the same items and print a comparison
    Compare(CompareArgs),
    /// Generate a random item list for experiments
    Gen(GenArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// Item list: one WxH pair per line, or a JSON array of {w, h}
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// YAML config file path (fields present in it override CLI options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Write placements as JSON to this file
    #[arg(short, long, help_heading = "Input/Output")]
    out: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Input/Output")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Input/Output")]
    print_config_format: String,

    // Layout
    /// Bin width
    #[arg(long, default_value_t = 1024, help_heading = "Layout")]
    width: u32,
    /// Bin height
    #[arg(long, default_value_t = 1024, help_heading = "Layout")]
    height: u32,
    /// Allow rotation (90deg)
    #[arg(long, default_value_t = true, action=ArgAction::Set, help_heading = "Layout")]
    allow_rotation: bool,

    // Algorithms/Heuristics
    /// Algorithm: skyline | maxrects | guillotine | shelf | shelf-next-fit
    #[arg(long, value_parser = ["skyline", "maxrects", "guillotine", "shelf", "shelf-next-fit"], default_value = "skyline", help_heading = "Algorithms")]
    algorithm: String,
    /// Score every pending item each round instead of taking them in order
    #[arg(long, default_value_t = false, help_heading = "Algorithms")]
    batch: bool,
    /// MaxRects heuristic: baf|bssf|blsf|bl|cp
    #[arg(long, default_value = "baf", help_heading = "Heuristics")]
    heuristic: String,
    /// Skyline heuristic: bl|mw
    #[arg(long, default_value = "bl", help_heading = "Heuristics")]
    skyline: String,
    /// Shelf heuristic: nf|ff|baf|waf|bhf|bwf|wwf
    #[arg(long, default_value = "ff", help_heading = "Heuristics")]
    shelf: String,
    /// Guillotine choice: baf|bssf|blsf|waf|wssf|wlsf
    #[arg(long, default_value = "baf", help_heading = "Heuristics")]
    g_choice: String,
    /// Guillotine split: slas|llas|minas|maxas|sas|las
    #[arg(long, default_value = "slas", help_heading = "Heuristics")]
    g_split: String,
    /// Merge the guillotine free list after each insert
    #[arg(long, default_value_t = false, help_heading = "Heuristics")]
    g_merge: bool,
    /// Use waste map for skyline/shelf
    #[arg(long, default_value_t = false, help_heading = "Heuristics")]
    use_waste_map: bool,
}

#[derive(Parser, Debug, Clone)]
struct CompareArgs {
    /// Item list: one WxH pair per line, or a JSON array of {w, h}
    input: PathBuf,
    /// Bin width
    #[arg(long, default_value_t = 1024)]
    width: u32,
    /// Bin height
    #[arg(long, default_value_t = 1024)]
    height: u32,
    /// Allow rotation (90deg)
    #[arg(long, default_value_t = true, action=ArgAction::Set)]
    allow_rotation: bool,
    /// Score every pending item each round instead of taking them in order
    #[arg(long, default_value_t = false)]
    batch: bool,
}

#[derive(Parser, Debug, Clone)]
struct GenArgs {
    /// Output file (one WxH pair per line)
    out: PathBuf,
    /// Number of items
    #[arg(long, default_value_t = 200)]
    count: usize,
    /// Item profile: basic | thin | pow2 | mixed
    #[arg(long, value_parser = ["basic", "thin", "pow2", "mixed"], default_value = "basic")]
    profile: String,
    /// Smallest side for the basic profile
    #[arg(long, default_value_t = 8)]
    min_size: u32,
    /// Largest side for the basic profile
    #[arg(long, default_value_t = 128)]
    max_size: u32,
    /// RNG seed
    #[arg(long, default_value_t = 0xDEADBEEF)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args),
        Commands::Compare(args) => run_compare(args),
        Commands::Gen(args) => run_gen(args),
    }
}

fn run_pack(args: &PackArgs) -> anyhow::Result<()> {
    let (cfg, algorithm) = resolve_config(args)?;

    if args.print_config {
        match args.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    cfg.validate()?;
    let items = load_items(&args.input)?;
    info!(count = items.len(), "loaded items");

    let mut packer = build_packer(&algorithm, &cfg)?;
    let start = Instant::now();
    let placements = if args.batch {
        packer.insert_batch(items.clone())
    } else {
        let mut out = Vec::with_capacity(items.len());
        for it in &items {
            if let Some(p) = packer.insert(it.w, it.h) {
                out.push(p);
            }
        }
        out
    };
    let dur = start.elapsed();

    let occupancy = packer.occupancy();
    info!(
        algorithm = %algorithm,
        placed = placements.len(),
        total = items.len(),
        occupancy = format!("{:.2}%", occupancy * 100.0),
        "pack finished"
    );
    println!(
        "algorithm={} placed={}/{} occupancy={:.2}% time={}",
        algorithm,
        placements.len(),
        items.len(),
        occupancy * 100.0,
        fmt_dur(dur)
    );

    if let Some(out_path) = &args.out {
        write_placements(out_path, &cfg, &algorithm, &items, &placements, occupancy)?;
        info!(?out_path, "placements written");
    }
    Ok(())
}

fn run_compare(args: &CompareArgs) -> anyhow::Result<()> {
    let items = load_items(&args.input)?;
    info!(count = items.len(), "loaded items");

    let base = PackerConfig::builder()
        .with_dimensions(args.width, args.height)
        .allow_rotation(args.allow_rotation);
    base.clone().build().validate()?;

    let candidates: Vec<(&str, &str, PackerConfig)> = vec![
        ("guillotine", "guillotine/baf+slas", base.clone().build()),
        (
            "guillotine",
            "guillotine/bssf+minas",
            base.clone()
                .g_choice(GuillotineChoice::BestShortSideFit)
                .g_split(GuillotineSplit::SplitMinimizeArea)
                .build(),
        ),
        ("maxrects", "maxrects/baf", base.clone().build()),
        (
            "maxrects",
            "maxrects/bssf",
            base.clone()
                .mr_heuristic(MaxRectsHeuristic::BestShortSideFit)
                .build(),
        ),
        (
            "maxrects",
            "maxrects/cp",
            base.clone()
                .mr_heuristic(MaxRectsHeuristic::ContactPoint)
                .build(),
        ),
        ("skyline", "skyline/bl", base.clone().build()),
        (
            "skyline",
            "skyline/mw",
            base.clone()
                .skyline_heuristic(SkylineHeuristic::MinWaste)
                .build(),
        ),
        (
            "skyline",
            "skyline/mw+waste",
            base.clone()
                .skyline_heuristic(SkylineHeuristic::MinWaste)
                .use_waste_map(true)
                .build(),
        ),
        ("shelf", "shelf/ff", base.clone().build()),
        (
            "shelf",
            "shelf/bhf",
            base.clone()
                .shelf_heuristic(ShelfHeuristic::BestHeightFit)
                .build(),
        ),
        (
            "shelf",
            "shelf/ff+waste",
            base.clone().use_waste_map(true).build(),
        ),
        ("shelf-next-fit", "shelf-next-fit", base.clone().build()),
    ];

    println!(
        "{:<24} {:>9} {:>10} {:>9}",
        "strategy", "placed", "occupancy", "time"
    );
    for (algorithm, label, cfg) in candidates {
        let mut packer = build_packer(algorithm, &cfg)?;
        let start = Instant::now();
        let placed = if args.batch {
            packer.insert_batch(items.clone()).len()
        } else {
            let mut n = 0usize;
            for it in &items {
                if packer.insert(it.w, it.h).is_some() {
                    n += 1;
                }
            }
            n
        };
        let dur = start.elapsed();
        println!(
            "{:<24} {:>9} {:>9.2}% {:>9}",
            label,
            format!("{}/{}", placed, items.len()),
            packer.occupancy() * 100.0,
            fmt_dur(dur)
        );
    }
    Ok(())
}

fn run_gen(args: &GenArgs) -> anyhow::Result<()> {
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    if args.min_size == 0 || args.min_size > args.max_size {
        anyhow::bail!("bad size range: {}..={}", args.min_size, args.max_size);
    }
    let mut rng = rand::rngs::StdRng::seed_from_u64(args.seed);
    let mut out = String::new();
    out.push_str(&format!(
        "# profile={} count={} seed={:#x}\n",
        args.profile, args.count, args.seed
    ));
    for _ in 0..args.count {
        let (w, h) = match args.profile.as_str() {
            "thin" => thin_bar(&mut rng),
            "pow2" => {
                let sizes = [16u32, 32, 64, 128, 256];
                (
                    *sizes.choose(&mut rng).unwrap_or(&64),
                    *sizes.choose(&mut rng).unwrap_or(&64),
                )
            }
            "mixed" => {
                if rng.gen_bool(0.2) {
                    thin_bar(&mut rng)
                } else {
                    (
                        rng.gen_range(args.min_size..=args.max_size),
                        rng.gen_range(args.min_size..=args.max_size),
                    )
                }
            }
            _ => (
                rng.gen_range(args.min_size..=args.max_size),
                rng.gen_range(args.min_size..=args.max_size),
            ),
        };
        out.push_str(&format!("{}x{}\n", w, h));
    }
    fs::write(&args.out, out).with_context(|| format!("write {}", args.out.display()))?;
    let out_path = &args.out;
    info!(?out_path, count = args.count, profile = %args.profile, "item list written");
    println!("generated {} items under {}", args.count, args.out.display());
    Ok(())
}

fn thin_bar(rng: &mut impl rand::Rng) -> (u32, u32) {
    if rng.gen_bool(0.5) {
        (rng.gen_range(64..=256), rng.gen_range(4..=12))
    } else {
        (rng.gen_range(4..=12), rng.gen_range(64..=256))
    }
}

fn resolve_config(args: &PackArgs) -> anyhow::Result<(PackerConfig, String)> {
    let base = PackerConfig {
        width: args.width,
        height: args.height,
        allow_rotation: args.allow_rotation,
        use_waste_map: args.use_waste_map,
        g_choice: parse_named("guillotine choice", &args.g_choice)?,
        g_split: parse_named("guillotine split", &args.g_split)?,
        g_merge: args.g_merge,
        mr_heuristic: parse_named("heuristic", &args.heuristic)?,
        skyline_heuristic: parse_named("skyline heuristic", &args.skyline)?,
        shelf_heuristic: parse_named("shelf heuristic", &args.shelf)?,
    };
    // Fields present in the config file win over the CLI flags.
    if let Some(path) = &args.config {
        let file =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)?;
        let algorithm = y
            .algorithm
            .clone()
            .unwrap_or_else(|| args.algorithm.clone());
        Ok((y.into_packer_config(base), algorithm))
    } else {
        Ok((base, args.algorithm.clone()))
    }
}

fn parse_named<T: FromStr>(what: &str, s: &str) -> anyhow::Result<T> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown {}: {}", what, s))
}

fn build_packer(algorithm: &str, cfg: &PackerConfig) -> anyhow::Result<Box<dyn BinPacker>> {
    Ok(match algorithm.to_ascii_lowercase().as_str() {
        "skyline" => Box::new(SkylinePacker::new(cfg.clone())),
        "maxrects" => Box::new(MaxRectsPacker::new(cfg.clone())),
        "guillotine" => Box::new(GuillotinePacker::new(cfg.clone())),
        "shelf" => Box::new(ShelfPacker::new(cfg.clone())),
        "shelf-next-fit" | "shelfnextfit" | "snf" => {
            Box::new(ShelfNextFitPacker::new(cfg.clone()))
        }
        other => anyhow::bail!("unknown algorithm: {}", other),
    })
}

fn load_items(path: &Path) -> anyhow::Result<Vec<RectSize>> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let items: Vec<RectSize> = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))?
    } else {
        let mut list = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match parse_item(line) {
                Some(it) => list.push(it),
                None => error!(line = idx + 1, text = line, "skip malformed item"),
            }
        }
        list
    };
    if items.is_empty() {
        anyhow::bail!("no items in {}", path.display());
    }
    Ok(items)
}

fn parse_item(line: &str) -> Option<RectSize> {
    let (w, h) = line.split_once(['x', 'X'])?;
    let w = w.trim().parse().ok()?;
    let h = h.trim().parse().ok()?;
    if w == 0 || h == 0 {
        return None;
    }
    Some(RectSize::new(w, h))
}

fn write_placements(
    path: &Path,
    cfg: &PackerConfig,
    algorithm: &str,
    items: &[RectSize],
    placements: &[Placement],
    occupancy: f64,
) -> anyhow::Result<()> {
    let value = serde_json::json!({
        "algorithm": algorithm,
        "bin": { "width": cfg.width, "height": cfg.height },
        "requested": items.len(),
        "placed": placements.len(),
        "occupancy": occupancy,
        "placements": placements,
    });
    fs::write(path, serde_json::to_string_pretty(&value)?)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}us", d.as_micros())
    }
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    algorithm: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    allow_rotation: Option<bool>,
    use_waste_map: Option<bool>,
    g_choice: Option<String>,
    g_split: Option<String>,
    g_merge: Option<bool>,
    heuristic: Option<String>,
    skyline: Option<String>,
    shelf: Option<String>,
}

impl YamlConfig {
    fn into_packer_config(self, mut cfg: PackerConfig) -> PackerConfig {
        if let Some(v) = self.width {
            cfg.width = v;
        }
        if let Some(v) = self.height {
            cfg.height = v;
        }
        if let Some(v) = self.allow_rotation {
            cfg.allow_rotation = v;
        }
        if let Some(v) = self.use_waste_map {
            cfg.use_waste_map = v;
        }
        if let Some(v) = self.g_merge {
            cfg.g_merge = v;
        }
        if let Some(v) = self.g_choice {
            cfg.g_choice = v.parse().unwrap_or(cfg.g_choice);
        }
        if let Some(v) = self.g_split {
            cfg.g_split = v.parse().unwrap_or(cfg.g_split);
        }
        if let Some(v) = self.heuristic {
            cfg.mr_heuristic = v.parse().unwrap_or(cfg.mr_heuristic);
        }
        if let Some(v) = self.skyline {
            cfg.skyline_heuristic = v.parse().unwrap_or(cfg.skyline_heuristic);
        }
        if let Some(v) = self.shelf {
            cfg.shelf_heuristic = v.parse().unwrap_or(cfg.shelf_heuristic);
        }
        cfg
    }
}
