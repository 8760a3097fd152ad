// src/bin/tessera-check.rs
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use tessera_core::{parse_layout_json, LayoutItem};
use tessera_layout::overlapping_pairs;

#[derive(Parser)]
#[command(name = "tessera-check")]
#[command(about = "Validates a grid layout file and reports overlaps and out-of-bounds items")]
struct Args {
    /// Path to the layout JSON (an array of items)
    file: PathBuf,

    /// Column count of the grid
    #[arg(long, default_value = "12")]
    cols: i32,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

/// Bounds and overlap problems in one layout level, recursing into groups.
fn problems(layout: &[LayoutItem], cols: i32, scope: &str) -> Vec<String> {
    let mut found = Vec::new();
    for item in layout {
        if item.x < 0 || item.y < 0 || item.x + item.w > cols {
            found.push(format!(
                "{}: {} at [{},{}] {}x{} is outside {} columns",
                scope, item.key, item.x, item.y, item.w, item.h, cols
            ));
        }
        if item.is_group {
            found.extend(problems(&item.children, item.w, &format!("group {}", item.key)));
        }
    }
    for (a, b) in overlapping_pairs(layout, false) {
        found.push(format!("{}: {} overlaps {}", scope, a, b));
    }
    found
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
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")?;

    if args.cols < 1 {
        anyhow::bail!("Column count must be at least 1, got {}", args.cols);
    }

    let json = fs::read_to_string(&args.file).with_context(|| format!("Failed to read {}", args.file.display()))?;
    let layout = parse_layout_json(&json).with_context(|| format!("Malformed layout in {}", args.file.display()))?;

    let found = problems(&layout, args.cols, "layout");
    for problem in &found {
        warn!("{}", problem);
    }
    if !found.is_empty() {
        anyhow::bail!("{} problem(s) found in {}", found.len(), args.file.display());
    }

    info!("{}: {} items, no problems", args.file.display(), layout.len());
    Ok(())
}
