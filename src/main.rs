use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use payment_terms_advisor::advisor::{SuggestionService, ValidationPolicy};
use payment_terms_advisor::config;
use payment_terms_advisor::llm::build_provider;
use payment_terms_advisor::server::{self, run_server, RequestsLoggingLevel, ServerConfig};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// LLM backend: "ollama" or "openai".
    #[clap(long, default_value = "ollama")]
    pub llm_provider: String,

    /// Base URL of the LLM API. Defaults depend on the provider.
    #[clap(long)]
    pub llm_base_url: Option<String>,

    /// Model name. Defaults depend on the provider.
    #[clap(long)]
    pub llm_model: Option<String>,

    /// Minimum number of characters for each request field, after trimming.
    #[clap(long, default_value_t = ValidationPolicy::DEFAULT_MIN_LENGTH)]
    pub min_length: usize,

    /// Upper bound in seconds for a single suggestion call to the model.
    #[clap(long, default_value_t = 120)]
    pub call_timeout_sec: u64,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            frontend_dir_path: args.frontend_dir_path.clone(),
            llm_provider: args.llm_provider.clone(),
            llm_base_url: args.llm_base_url.clone(),
            llm_model: args.llm_model.clone(),
            min_length: args.min_length,
            call_timeout_sec: args.call_timeout_sec,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration resolved:");
    info!("  port: {}", app_config.port);
    info!("  metrics_port: {}", app_config.metrics_port);
    info!(
        "  llm: {} ({}) at {}",
        app_config.llm.provider, app_config.llm.model, app_config.llm.base_url
    );
    info!(
        "  suggestions: min_length={} call_timeout={}s enforce_trigger_references={}",
        app_config.suggestions.min_length,
        app_config.suggestions.call_timeout_secs,
        app_config.suggestions.enforce_trigger_references
    );

    let provider = build_provider(&app_config.llm)?;
    let service = Arc::new(SuggestionService::new(
        provider,
        app_config.suggestion_config(),
    ));

    // Initialize metrics system
    info!("Initializing metrics...");
    server::metrics::init_metrics();

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level.clone(),
        port: app_config.port,
        metrics_port: app_config.metrics_port,
        frontend_dir_path: app_config.frontend_dir_path.clone(),
    };

    run_server(server_config, service).await
}
