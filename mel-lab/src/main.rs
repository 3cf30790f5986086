//! mel-lab - Movie Evaluation Lab terminal client
//!
//! Resolves a title or id against the Remote API, prints the candidate list
//! or the subject card, and waits for the enrichment analyses to settle.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mel_common::config::{self, ApiUrlResolver, TomlConfig};
use mel_lab::api::HttpRemoteApi;
use mel_lab::models::{SubjectId, SubjectKind};
use mel_lab::view::terminal;
use mel_lab::{BuildInfo, Orchestrator, RetryPolicy};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for mel-lab
#[derive(Parser, Debug)]
#[command(name = "mel-lab")]
#[command(about = "Movie Evaluation Lab terminal client")]
#[command(version)]
struct Args {
    /// Remote API base URL (overrides MEL_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Config file (default: <config dir>/mel/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search by title
    Search {
        title: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show a subject by id with its popularity and composition analyses
    Show {
        #[arg(long)]
        id: u64,
        #[arg(long, default_value = "movie", value_parser = parse_kind)]
        kind: SubjectKind,
    },
    /// Decrypt the full synopsis of a subject
    Synopsis {
        #[arg(long)]
        id: u64,
        #[arg(long, default_value = "movie", value_parser = parse_kind)]
        kind: SubjectKind,
        /// Season title (required for series)
        #[arg(long)]
        season: Option<String>,
    },
    /// Write the effective configuration to the config file
    InitConfig,
}

fn parse_kind(value: &str) -> Result<SubjectKind, String> {
    SubjectKind::parse(value)
        .ok_or_else(|| format!("unknown kind '{}' (expected movie or tv)", value))
}

fn load_config(path: Option<&PathBuf>) -> Result<(Option<PathBuf>, TomlConfig)> {
    let path = path.cloned().or_else(config::default_config_path);
    let toml_config = match &path {
        Some(p) => config::load_toml_config(p).context("Failed to load configuration")?,
        None => TomlConfig::default(),
    };
    Ok((path, toml_config))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (config_path, toml_config) = load_config(args.config.as_ref())?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| toml_config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        version = BuildInfo::VERSION,
        git = BuildInfo::GIT_HASH,
        built = BuildInfo::BUILD_TIMESTAMP,
        profile = BuildInfo::BUILD_PROFILE,
        "Starting mel-lab"
    );

    let api_url = ApiUrlResolver::new(args.api_url.clone())
        .resolve(&toml_config)
        .context("Failed to resolve API base URL")?;

    if let Command::InitConfig = args.command {
        let path = config_path.context("No config directory available on this platform")?;
        let mut effective = toml_config;
        effective.api_base_url = Some(api_url);
        config::write_toml_config(&effective, &path)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    info!(api_url = %api_url, "Using Remote API");
    let api = HttpRemoteApi::new(api_url).context("Failed to create HTTP client")?;
    let orchestrator = Orchestrator::new(Arc::new(api), RetryPolicy::from(&toml_config.enrichment));

    match args.command {
        Command::Search { title, page } => {
            orchestrator.set_query(&title).await;
            let handle = orchestrator.resolve(&title, page).await?;
            handle.await.context("Resolve task failed")?;
        }
        Command::Show { id, kind } => {
            let handle = orchestrator.select_subject(SubjectId(id), kind).await?;
            handle.await.context("Resolve task failed")?;
        }
        Command::Synopsis { id, kind, season } => {
            let handle = orchestrator.select_subject(SubjectId(id), kind).await?;
            handle.await.context("Resolve task failed")?;

            if orchestrator.snapshot().await.subject().is_some() {
                orchestrator.select_season(season).await?;
                orchestrator.request_synopsis().await?;
                orchestrator.confirm_synopsis().await?;
            }
        }
        Command::InitConfig => {}
    }

    tokio::select! {
        _ = orchestrator.wait_idle() => {}
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, printing partial results");
        }
    }

    print!("{}", terminal::render_state(&orchestrator.snapshot().await));
    Ok(())
}
