//! Cardiorisk CLI: terminal and web front-end for the heart disease classifier.
//!
//! Runs the interactive form when no subcommand is given.

mod commands;
mod form;

use cardiorisk_core::config::{CardioConfig, ConfigOverrides, load_config};
use cardiorisk_core::model::resolve_model_path;
use cardiorisk_core::{Locale, ModelProvider};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Cardiorisk: heart disease risk prediction from 13 clinical measurements
#[derive(Parser, Debug)]
#[command(name = "cardiorisk", version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Model artifact path
    #[arg(short, long, global = true)]
    model: Option<PathBuf>,

    /// Interface language: en, id
    #[arg(short, long, global = true)]
    locale: Option<String>,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Workspace directory
    #[arg(short, long, default_value = ".", global = true)]
    workspace: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Score one patient from flags
    Predict(commands::PredictArgs),
    /// Print the feature contract
    Schema {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect the model artifact
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Serve the web form
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to bind
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ModelAction {
    /// Load the artifact and report the result
    Check,
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
}

/// Everything a command needs, resolved once at start-up.
#[derive(Debug)]
pub(crate) struct Context {
    pub config: CardioConfig,
    pub provider: Arc<ModelProvider>,
    pub color: bool,
}

impl Context {
    pub fn locale(&self) -> Locale {
        self.config.ui.locale
    }
}

fn log_filter(verbose: u8, quiet: bool) -> &'static str {
    match verbose {
        0 if quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

impl Cli {
    fn overrides(&self) -> anyhow::Result<ConfigOverrides> {
        let locale = self.locale.as_deref().map(str::parse::<Locale>).transpose()?;
        let (host, port) = match &self.command {
            Some(Commands::Serve { host, port }) => (host.clone(), *port),
            _ => (None, None),
        };
        Ok(ConfigOverrides {
            model_path: self.model.clone(),
            locale,
            color: self.no_color.then_some(false),
            host,
            port,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Human-readable layer for stderr
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(log_filter(cli.verbose, cli.quiet)));

    // JSON file layer for structured logging
    let log_dir = directories::ProjectDirs::from("dev", "cardiorisk", "cardiorisk")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "cardiorisk.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let overrides = cli.overrides()?;
    let config = load_config(Some(&workspace), cli.config.as_deref(), &overrides)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    let model_path = resolve_model_path(&workspace, &config.model.path);
    tracing::debug!(path = %model_path.display(), "Resolved model path");
    let color = config.ui.color && std::io::stdout().is_terminal();
    let ctx = Context {
        provider: Arc::new(ModelProvider::from_path(model_path)),
        config,
        color,
    };

    match cli.command {
        None => form::run(&ctx),
        Some(Commands::Predict(args)) => commands::predict(&ctx, &args),
        Some(Commands::Schema { json }) => commands::schema(&ctx, json),
        Some(Commands::Model {
            action: ModelAction::Check,
        }) => commands::model_check(&ctx),
        Some(Commands::Config {
            action: ConfigAction::Show,
        }) => commands::config_show(&ctx),
        Some(Commands::Serve { .. }) => commands::serve(&ctx).await,
    }
}
