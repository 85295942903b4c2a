use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser};
use serde::Deserialize;
use sprite_gen_core::{Matte, SortOrder, SpriteConfig, plan, run, to_json, to_stylesheet};
use tracing::{info, warn};

const NAMING_HELP: &str = "\
Naming files:
  The suffix of a sliced image's file name decides how it is composited:
    -x  horizontally repeating (repeat-x)
    -y  vertically repeating (repeat-y)
    -n  not repeating (no-repeat)
  Optional padding, in either order, after the suffix:
    -pl<pixels>  padding left of the image
    -pr<pixels>  padding right of the image
  Examples:
    border1-bottomleftcorner-n.png
    border1-bottommiddle-x.png
    border1-middleleft-y-pr300.png";

#[derive(Parser, Debug)]
#[command(
    name = "sprite-gen",
    about = "Combine sliced images into CSS sprite sheets and a stylesheet",
    version,
    disable_help_flag = true,
    after_help = NAMING_HELP
)]
struct Cli {
    // Input/Output
    /// Directory holding the sliced images; outputs are written there too [default: current directory]
    #[arg(long, help_heading = "Input/Output")]
    path: Option<PathBuf>,
    /// Base name of the output files (<prefix>.png, <prefix>-x.png, <prefix>-y.png, <prefix>.css) [default: sprites]
    #[arg(long, help_heading = "Input/Output")]
    prefix: Option<String>,
    /// YAML config file; explicit flags take precedence over its values
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,

    // Rendering
    /// Background matte: "transparent" or "R,G,B" (missing components default to 255) [default: transparent]
    #[arg(long, help_heading = "Rendering")]
    matte: Option<String>,
    /// Order of fragments within a composite: name_asc | none (directory order, not reproducible)
    #[arg(long, help_heading = "Rendering")]
    sort_order: Option<String>,
    /// Render the composites in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Rendering")]
    parallel: bool,

    // Export
    /// Also write the layout metadata (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_json: Option<PathBuf>,
    /// Print the merged configuration (after YAML/flags) as JSON and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Dry run: compute layout and stylesheet but do not write files
    #[arg(long, default_value_t = false, conflicts_with = "export_json", help_heading = "Export")]
    dry_run: bool,

    // Logging/UX
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(short, long, default_value_t = false, help_heading = "Logging/UX")]
    quiet: bool,
    /// Print help
    #[arg(short = 'h', long, short_alias = '?', action = ArgAction::Help, help_heading = "Logging/UX")]
    help: Option<bool>,
}

/// Optional overlay read from `--config`.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct YamlConfig {
    path: Option<PathBuf>,
    prefix: Option<String>,
    matte: Option<String>,
    sort_order: Option<String>,
    max_canvas_pixels: Option<u64>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn into_sprite_config(self, mut cfg: SpriteConfig) -> anyhow::Result<SpriteConfig> {
        if let Some(v) = self.path {
            cfg.path = v;
        }
        if let Some(v) = self.prefix {
            cfg.prefix = v;
        }
        if let Some(v) = self.matte {
            cfg.matte = v.parse()?;
        }
        if let Some(v) = self.sort_order {
            cfg.sort_order = parse_sort_order(&v)?;
        }
        if let Some(v) = self.max_canvas_pixels {
            cfg.max_canvas_pixels = v;
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        Ok(cfg)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    let cfg = build_config(&cli)?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&cfg)?);
        return Ok(());
    }
    if cfg.parallel && !cfg!(feature = "parallel") {
        warn!("--parallel has no effect: built without the `parallel` feature");
    }

    if cli.dry_run {
        let sheet = plan(&cfg)?;
        let css = to_stylesheet(&sheet);
        info!(bytes = css.len(), "stylesheet (dry run, not written)");
        info!("{}", sheet.stats().summary());
        return Ok(());
    }

    let report = run(cfg)?;
    for (class, reason) in &report.failed {
        warn!(%class, %reason, "composite missing; its stylesheet rules point at a file that was not written");
    }
    if let Some(json_path) = &cli.export_json {
        write_json(json_path, &to_json(&report.sheet))?;
    }
    println!("Done.");
    Ok(())
}

/// Defaults, then the YAML file, then explicit flags.
fn build_config(cli: &Cli) -> anyhow::Result<SpriteConfig> {
    let mut cfg = SpriteConfig {
        path: std::env::current_dir().context("resolve current directory")?,
        ..Default::default()
    };
    if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        cfg = y.into_sprite_config(cfg)?;
    }
    if let Some(v) = &cli.path {
        cfg.path = v.clone();
    }
    if let Some(v) = &cli.prefix {
        cfg.prefix = v.clone();
    }
    if let Some(v) = &cli.matte {
        cfg.matte = v.parse::<Matte>()?;
    }
    if let Some(v) = &cli.sort_order {
        cfg.sort_order = parse_sort_order(v)?;
    }
    if cli.parallel {
        cfg.parallel = true;
    }
    Ok(cfg)
}

fn parse_sort_order(s: &str) -> anyhow::Result<SortOrder> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown sort order: {} (expected name_asc | none)", s))
}

fn write_json(path: &Path, value: &serde_json::Value) -> anyhow::Result<()> {
    fs::write(path, serde_json::to_string_pretty(value)?)
        .with_context(|| format!("write {}", path.display()))?;
    info!(?path, "layout metadata exported");
    Ok(())
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
