//! # Command Line Interface
//!
//! CLI for rendering proxy bootstrap configuration from policy documents.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::api::ProxyMetrics;
use crate::bootstrap::render_bootstrap_config;
use crate::config::Config;
use crate::observability::init_logging;

#[derive(Parser)]
#[command(name = "bootplane")]
#[command(about = "Bootstrap configuration renderer for managed proxies")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the bootstrap document for a proxy
    Bootstrap {
        /// Metrics policy file (YAML, or JSON by extension); omit to render
        /// the infrastructure defaults
        #[arg(short, long)]
        metrics: Option<PathBuf>,

        /// Write the document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Run CLI commands
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env()?;
    init_logging(&config.log)?;

    match cli.command {
        Commands::Bootstrap { metrics, output } => {
            handle_bootstrap(metrics.as_deref(), output.as_deref())
        }
    }
}

fn handle_bootstrap(metrics_path: Option<&Path>, output: Option<&Path>) -> anyhow::Result<()> {
    let metrics = match metrics_path {
        Some(path) => Some(load_proxy_metrics(path)?),
        None => None,
    };

    let rendered = render_bootstrap_config(metrics.as_ref())?;

    match output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = rendered.len(), "Wrote bootstrap configuration");
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

/// Load and shape-validate a metrics policy document.
fn load_proxy_metrics(path: &Path) -> anyhow::Result<ProxyMetrics> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let metrics: ProxyMetrics = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&raw)
            .with_context(|| format!("Invalid metrics policy JSON in {}", path.display()))?,
        _ => serde_yaml::from_str(&raw)
            .with_context(|| format!("Invalid metrics policy YAML in {}", path.display()))?,
    };

    metrics.validate_model()?;
    Ok(metrics)
}
