mod config;
mod sources;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use overlay::artwork::Scene;
use overlay::engine::OverlayCore;
use overlay::render::render_scene;
use serde_json::json;

use crate::sources::Source;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid YAML config: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Config(#[from] overlay::config::ConfigError),
    #[error("record decode failed: {0}")]
    Records(#[from] overlay::records::RecordError),
}

#[derive(Parser, Debug)]
#[command(name = "siteplan", about = "Fit stand polygons onto site-plan artwork")]
struct Cli {
    /// YAML configuration file; defaults apply when absent.
    #[arg(long, env = "SITEPLAN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Emit the SVG polygon layer fitted onto the artwork.
    Render(RenderArgs),
    /// Print the computed alignment and artwork tier as JSON.
    Transform(TransformArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Scene description (JSON).
    #[arg(long)]
    scene: PathBuf,

    /// Polygon document: a file path or an http(s) URL.
    #[arg(long, env = "SITEPLAN_POLYGONS")]
    polygons: String,

    /// Status sheet (CSV): a file path or an http(s) URL.
    #[arg(long, env = "SITEPLAN_STATUS")]
    status: String,

    /// Write here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct TransformArgs {
    #[arg(long)]
    scene: PathBuf,

    #[arg(long, env = "SITEPLAN_POLYGONS")]
    polygons: String,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    if let Err(e) = dotenv {
        tracing::debug!(error = %e, "no .env loaded");
    }

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref()).await?;
    let client = reqwest::Client::new();

    match cli.command {
        Command::Render(args) => {
            let svg = render(&client, cfg, &args).await?;
            match &args.out {
                Some(path) => {
                    tokio::fs::write(path, svg).await.map_err(|source| CliError::Write { path: path.clone(), source })?;
                    tracing::info!(path = %path.display(), "overlay written");
                }
                None => print!("{svg}"),
            }
        }
        Command::Transform(args) => {
            let report = transform(&client, cfg, &args).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

async fn read_scene(path: &Path) -> Result<Scene, CliError> {
    let text = tokio::fs::read_to_string(path).await.map_err(|source| CliError::Io { path: path.to_path_buf(), source })?;
    Ok(serde_json::from_str(&text)?)
}

/// Load both record sources and the scene, then emit the fitted layer.
async fn render(
    client: &reqwest::Client,
    cfg: overlay::config::OverlayConfig,
    args: &RenderArgs,
) -> Result<String, CliError> {
    let scene = read_scene(&args.scene).await?;
    let (polygons, statuses) = sources::load_records(
        client,
        &Source::parse(&args.polygons),
        &Source::parse(&args.status),
        &cfg.columns,
    )
    .await;

    let mut core = OverlayCore::new(cfg);
    core.load(&scene, &scene, &polygons, &statuses);
    Ok(render_scene(&core))
}

/// Alignment report: artwork tier and box, plus the transform or `"unmappable"`.
async fn transform(
    client: &reqwest::Client,
    cfg: overlay::config::OverlayConfig,
    args: &TransformArgs,
) -> Result<serde_json::Value, CliError> {
    let scene = read_scene(&args.scene).await?;
    let polygons = sources::load_polygons(client, &Source::parse(&args.polygons)).await;

    let mut core = OverlayCore::new(cfg);
    core.load(&scene, &scene, &polygons, &overlay::records::StatusMap::new());

    let alignment = match core.alignment().transform() {
        Some(t) => serde_json::to_value(t)?,
        None => json!("unmappable"),
    };
    Ok(json!({
        "artwork": core.artwork(),
        "alignment": alignment,
        "polygons": core.shapes().len(),
    }))
}
