use anyhow::{Context, Result};
use chatbot_bridge::config::StartupFallback;
use chatbot_bridge::services::{adapter, diagnostics, env_file};
use chatbot_bridge::{web, AppError, AppState, Bridge, Config};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "chatbot-bridge", version, about = "Bridge between a chat widget and a query backend")]
struct Cli {
    /// Path to the .env style configuration file
    #[arg(long, env = "CHATBOT_ENV_FILE", default_value = ".env", global = true)]
    env_file: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API and the chat page (default)
    Serve {
        /// Port to listen on; overrides PORT from the env file
        #[arg(long)]
        port: Option<u16>,
    },
    /// Read a JSON payload on stdin and print the raw response on stdout
    Embed,
    /// Generate APP_KEY in the env file if it is missing
    KeyGenerate,
    /// Print the diagnostics report
    Diagnose,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so `embed` keeps stdout for the payload
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chatbot_bridge=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => serve(&cli.env_file, port).await,
        Command::Embed => embed(&cli.env_file).await,
        Command::KeyGenerate => key_generate(&cli.env_file),
        Command::Diagnose => diagnose(&cli.env_file),
    }
}

fn load_config(env_file: &Path, port: Option<u16>) -> chatbot_bridge::AppResult<Config> {
    let mut config = Config::load(env_file, std::env::vars())?;
    if let Some(port) = port {
        config.port = port;
    }
    Ok(config)
}

async fn serve(env_file: &Path, port: Option<u16>) -> Result<()> {
    tracing::info!("🚀 Starting chatbot bridge");

    let state = load_config(env_file, port).and_then(|config| {
        AppState::new(config).map_err(|e| AppError::startup(format!("{:#}", e)))
    });

    match state {
        Ok(state) => web::start_server(state).await,
        Err(e) => {
            let mut fallback = StartupFallback::resolve(env_file, std::env::vars());
            if let Some(port) = port {
                fallback.port = port;
            }
            web::server::start_failure_server(&fallback.bind_address(), e, fallback.debug).await
        }
    }
}

async fn embed(env_file: &Path) -> Result<()> {
    let config = load_config(env_file, None)?;
    let bridge = Bridge::new(AppState::new(config)?);

    let mut raw = String::new();
    std::io::stdin().read_to_string(&mut raw).context("reading payload from stdin")?;
    let payload = match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(serde_json::Value::Object(map)) => adapter::fields_from_json(map),
        Ok(_) | Err(_) if raw.trim().is_empty() => Default::default(),
        Ok(_) => anyhow::bail!("payload must be a JSON object"),
        Err(e) => return Err(e).context("parsing payload"),
    };

    println!("{}", bridge.handle_embedded(payload).await);
    Ok(())
}

fn key_generate(env_file: &Path) -> Result<()> {
    if env_file::ensure_app_key(env_file)? {
        println!("Application key set in {}", env_file.display());
    } else {
        println!("Application key already present in {}", env_file.display());
    }
    Ok(())
}

fn diagnose(env_file: &Path) -> Result<()> {
    let config = load_config(env_file, None)?;
    let report = diagnostics::run(&config);
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.passed {
        std::process::exit(1);
    }
    Ok(())
}
