//! activity-graph: render and query stacked CPU activity graphs from the
//! command line.
//!
//! Run with:  `RUST_LOG=debug activity-graph render capture.json`

mod capture;
mod render;

use std::path::{Path, PathBuf};

use activity_config::{ConfigWatcher, GraphConfig};
use activity_graph::{compute_activity_graph_fills, RenderedComponentSettings};
use activity_theme::Palette;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::capture::Capture;

#[derive(Parser)]
#[command(name = "activity-graph")]
#[command(about = "Render and query stacked CPU activity graphs", version)]
struct Cli {
    /// Config file (defaults to $XDG_CONFIG_HOME/activity-graph/graph.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the stacked fills of a capture
    Render {
        capture: PathBuf,
    },

    /// Find the sample under a CSS pixel position
    Lookup {
        capture: PathBuf,
        #[arg(long)]
        x: f64,
        #[arg(long)]
        y: f64,
    },

    /// Render, then render again whenever the config file changes
    Watch {
        capture: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(activity_config::default_path);

    match cli.command {
        Command::Render { capture } => {
            let config = activity_config::load(&config_path)?;
            print!("{}", render_capture(&capture, &config)?);
        }
        Command::Lookup { capture, x, y } => {
            let config = activity_config::load(&config_path)?;
            println!("{}", lookup_capture(&capture, &config, x, y)?);
        }
        Command::Watch { capture } => {
            let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
            runtime.block_on(watch(capture, config_path))?;
        }
    }
    Ok(())
}

fn render_capture(capture: &Path, config: &GraphConfig) -> Result<String> {
    let palette = Palette::from_config(&config.categories);
    let settings = Capture::load(capture)
        .with_context(|| format!("loading capture '{}'", capture.display()))?
        .into_settings(&config.canvas, &palette)?;

    let result = compute_activity_graph_fills(&settings);
    Ok(render::render_text(&result, &palette))
}

fn lookup_capture(capture: &Path, config: &GraphConfig, css_x: f64, css_y: f64) -> Result<String> {
    let palette = Palette::from_config(&config.categories);
    let settings = Capture::load(capture)
        .with_context(|| format!("loading capture '{}'", capture.display()))?
        .into_settings(&config.canvas, &palette)?;

    let result = compute_activity_graph_fills(&settings);
    let time = time_at_css_x(&settings, css_x);
    let hover = result.querier(&settings).lookup(css_x, css_y, time);

    Ok(render::describe_hover(hover.as_ref(), &settings, &palette))
}

/// Time under the device pixel column that `lookup` resolves `css_x` to.
fn time_at_css_x(settings: &RenderedComponentSettings, css_x: f64) -> f64 {
    let device_x = (css_x * settings.canvas.device_pixel_ratio).round();
    settings.range_start + device_x / settings.x_pixels_per_ms
}

async fn watch(capture: PathBuf, config_path: PathBuf) -> Result<()> {
    let mut config = activity_config::load(&config_path)?;
    print!("{}", render_capture(&capture, &config)?);

    let (watcher, mut changes) = ConfigWatcher::spawn(&config_path);
    tracing::info!(
        "Re-rendering '{}' on changes to {}",
        capture.display(),
        watcher.path().display()
    );
    while changes.recv().await.is_some() {
        match activity_config::load(&config_path) {
            Ok(reloaded) => config = reloaded,
            Err(e) => {
                tracing::warn!("Keeping previous config: {e}");
                continue;
            }
        }
        match render_capture(&capture, &config) {
            Ok(text) => print!("\n{text}"),
            Err(e) => tracing::error!("Render failed: {e:#}"),
        }
    }
    Ok(())
}
