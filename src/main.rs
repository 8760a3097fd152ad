// src/main.rs
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use tessera_core::{bottom, parse_layout_json, CompactionAxis, GridConfig, GridMetrics, LayoutItem};
use tessera_runtime::{GridSession, Intent, ManualClock};

#[derive(Parser)]
#[command(name = "tessera")]
#[command(about = "Replays grid layout intents against a layout and prints the result")]
struct Args {
    /// Path to the layout JSON (an array of items)
    #[arg(long)]
    layout: PathBuf,

    /// Path to a JSON array of intents and {"wait_ms": n} steps
    #[arg(long)]
    script: Option<PathBuf>,

    /// Path to a grid config JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Column count, overrides the config
    #[arg(long)]
    cols: Option<i32>,

    /// Compaction axis, overrides the config
    #[arg(long, value_enum)]
    axis: Option<AxisArg>,

    /// Container width in pixels; adds pixel rects to the output
    #[arg(long)]
    width: Option<f32>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AxisArg {
    Vertical,
    Horizontal,
    #[value(name = "none")]
    Disabled,
}

impl From<AxisArg> for CompactionAxis {
    fn from(axis: AxisArg) -> Self {
        match axis {
            AxisArg::Vertical => CompactionAxis::Vertical,
            AxisArg::Horizontal => CompactionAxis::Horizontal,
            AxisArg::Disabled => CompactionAxis::None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Step {
    Wait { wait_ms: u64 },
    Intent(Intent),
}

#[derive(Serialize)]
struct PixelBox {
    key: String,
    left: f32,
    top: f32,
    width: f32,
    height: f32,
}

#[derive(Serialize)]
struct Output<'a> {
    layout: &'a [LayoutItem],
    changes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    container_height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pixels: Option<Vec<PixelBox>>,
}

fn load_config(args: &Args) -> Result<GridConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
            GridConfig::from_json(&json).with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => GridConfig::default(),
    };
    if let Some(cols) = args.cols {
        config.column_count = cols;
    }
    if let Some(axis) = args.axis {
        config.compaction_axis = axis.into();
    }
    config.validate().context("Invalid grid configuration")?;
    Ok(config)
}

fn load_script(path: &Path) -> Result<Vec<Step>> {
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read script {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid script {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")?;

    if !args.layout.exists() {
        anyhow::bail!("Layout file not found: {}", args.layout.display());
    }

    let config = load_config(&args)?;
    let json = fs::read_to_string(&args.layout)
        .with_context(|| format!("Failed to read layout {}", args.layout.display()))?;
    let layout = parse_layout_json(&json).context("Invalid layout")?;
    info!("Loaded {} items from {}", layout.len(), args.layout.display());

    let clock = ManualClock::new();
    let mut session =
        GridSession::with_clock(config.clone(), layout, clock.clone()).context("Failed to start grid session")?;

    let steps = match &args.script {
        Some(path) => load_script(path)?,
        None => Vec::new(),
    };

    let mut changes = 0;
    for (index, step) in steps.into_iter().enumerate() {
        match step {
            Step::Wait { wait_ms } => {
                clock.advance_ms(wait_ms);
                if session.tick() {
                    debug!("Step {}: grouping target is now droppable", index);
                }
            }
            Step::Intent(intent) => {
                let outcome = session
                    .dispatch(intent)
                    .with_context(|| format!("Script step {} failed", index))?;
                if outcome.changed {
                    changes += 1;
                }
            }
        }
        for event in session.take_events() {
            debug!("Step {}: {:?}", index, event);
        }
    }
    info!("Replayed script with {} layout changes", changes);

    let metrics = args.width.map(|width| GridMetrics::new(&config, width));
    let pixels = metrics.as_ref().map(|metrics| {
        session
            .layout()
            .iter()
            .map(|item| {
                let rect = metrics.item_rect(item);
                PixelBox {
                    key: item.key.clone(),
                    left: rect.position.x,
                    top: rect.position.y,
                    width: rect.size.x,
                    height: rect.size.y,
                }
            })
            .collect()
    });

    let output = Output {
        layout: session.layout(),
        changes,
        container_height: metrics.as_ref().map(|metrics| metrics.container_height(bottom(session.layout()))),
        pixels,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
