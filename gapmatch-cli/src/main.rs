use clap::Parser;
use gapmatch::io::{load_rgb_image, load_rgba_image, save_rgb_image};
use gapmatch::{
    render_overlay, GapLocator, LocateConfig, LocateReport, OverlayStyle, RoughConfig,
    SearchConfig, SsimParams,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "GapMatch CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RoughConfigJson {
    window: usize,
    min_height: u32,
    max_spread: u32,
    blur_sigma: f32,
}

impl Default for RoughConfigJson {
    fn default() -> Self {
        let cfg = RoughConfig::default();
        Self {
            window: cfg.window,
            min_height: cfg.min_height,
            max_spread: cfg.max_spread,
            blur_sigma: cfg.blur_sigma,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SearchConfigJson {
    accept_score: f32,
    radius_steps: Vec<u32>,
    parallel: bool,
}

impl Default for SearchConfigJson {
    fn default() -> Self {
        let cfg = SearchConfig::default();
        Self {
            accept_score: cfg.accept_score,
            radius_steps: cfg.radius_steps,
            parallel: cfg.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SsimConfigJson {
    win_size: usize,
    k1: f64,
    k2: f64,
}

impl Default for SsimConfigJson {
    fn default() -> Self {
        let params = SsimParams::default();
        Self {
            win_size: params.win_size,
            k1: params.k1,
            k2: params.k2,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct LocateConfigJson {
    alpha_threshold: u8,
    rough: RoughConfigJson,
    search: SearchConfigJson,
    ssim: SsimConfigJson,
}

impl Default for LocateConfigJson {
    fn default() -> Self {
        Self {
            alpha_threshold: LocateConfig::default().alpha_threshold,
            rough: RoughConfigJson::default(),
            search: SearchConfigJson::default(),
            ssim: SsimConfigJson::default(),
        }
    }
}

impl From<LocateConfigJson> for LocateConfig {
    fn from(value: LocateConfigJson) -> Self {
        let ssim = SsimParams {
            win_size: value.ssim.win_size,
            k1: value.ssim.k1,
            k2: value.ssim.k2,
            ..SsimParams::default()
        };
        LocateConfig {
            alpha_threshold: value.alpha_threshold,
            rough: RoughConfig {
                window: value.rough.window,
                min_height: value.rough.min_height,
                max_spread: value.rough.max_spread,
                blur_sigma: value.rough.blur_sigma,
                ssim,
            },
            search: SearchConfig {
                accept_score: value.search.accept_score,
                radius_steps: value.search.radius_steps,
                ssim,
                parallel: value.search.parallel,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    full_bg_path: String,
    gap_bg_path: String,
    piece_path: String,
    output_path: Option<String>,
    overlay_path: Option<String>,
    locate: LocateConfigJson,
}

#[derive(Debug, Serialize)]
struct BoxRecord {
    left: u32,
    up: u32,
    right: u32,
    down: u32,
}

#[derive(Debug, Serialize)]
struct RoughRecord {
    left: Option<u32>,
    up: Option<u32>,
    right: Option<u32>,
    down: Option<u32>,
}

#[derive(Debug, Serialize)]
struct Output {
    x: i64,
    y: Option<i64>,
    score: Option<f32>,
    radius: Option<u32>,
    rough: RoughRecord,
    search_box: BoxRecord,
    trim: (u32, u32),
    evaluated: usize,
}

impl From<&LocateReport> for Output {
    fn from(report: &LocateReport) -> Self {
        let b = report.search_box;
        Self {
            x: report.offset_x(),
            y: report.location.map(|loc| loc.y),
            score: report.location.map(|loc| loc.score),
            radius: report.location.map(|loc| loc.radius),
            rough: RoughRecord {
                left: report.rough.left,
                up: report.rough.up,
                right: report.rough.right,
                down: report.rough.down,
            },
            search_box: BoxRecord {
                left: b.left,
                up: b.up,
                right: b.right,
                down: b.down,
            },
            trim: report.trim,
            evaluated: report.evaluated,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("gapmatch=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.full_bg_path.is_empty()
        || config.gap_bg_path.is_empty()
        || config.piece_path.is_empty()
    {
        return Err("full_bg_path, gap_bg_path and piece_path must be set in the config".into());
    }

    let full_bg = load_rgb_image(&config.full_bg_path)?;
    let gap_bg = load_rgb_image(&config.gap_bg_path)?;
    let piece = load_rgba_image(&config.piece_path)?;

    let locate_cfg = LocateConfig::from(config.locate);
    let style = OverlayStyle {
        alpha_threshold: locate_cfg.alpha_threshold,
        ..OverlayStyle::default()
    };
    let locator = GapLocator::new().with_config(locate_cfg);
    let report = locator.locate(&full_bg, &gap_bg, &piece)?;

    if let Some(path) = &config.overlay_path {
        let canvas = render_overlay(&full_bg, &piece, &report, &style);
        save_rgb_image(&canvas, path)?;
    }

    let json = serde_json::to_string_pretty(&Output::from(&report))?;
    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
