// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing_subscriber::EnvFilter;

use crate::application::fallback::fallback_from_value;
use crate::application::insights_panel::{InsightsMode, InsightsPanel};
use crate::application::insights_service::InsightsService;
use crate::domain::snapshot::DashboardSnapshot;
use crate::infrastructure::config::{load_settings, Settings};
use crate::infrastructure::gemini_client::GeminiClient;
use crate::infrastructure::insights_client::InsightsClient;
use crate::presentation::app_state::AppState;
use crate::presentation::function_adapter::{handle_invocation, InvocationEvent};
use crate::presentation::handlers::router;

#[derive(Debug, Parser)]
#[command(name = "dashboard-insights")]
#[command(about = "AI insights endpoint for the analytics dashboard, with offline fallback")]
struct App {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Handle one function invocation: event JSON on stdin, response JSON on stdout
    Invoke,
    /// Request insights from a running endpoint, falling back to offline insights
    Insights {
        /// Full URL of the generate-insights endpoint
        #[arg(long, default_value = "http://localhost:3001/api/generate-insights")]
        endpoint: String,
        /// Path to a dashboard snapshot JSON file
        #[arg(long)]
        snapshot: PathBuf,
    },
    /// Print offline insights for a snapshot without any network call
    Fallback {
        /// Path to a dashboard snapshot JSON file
        #[arg(long)]
        snapshot: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `invoke` and `insights` keep stdout clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let app = App::parse();

    match app.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(load_settings()?).await,
        Commands::Invoke => invoke(load_settings()?).await,
        Commands::Insights { endpoint, snapshot } => insights(&endpoint, &snapshot).await,
        Commands::Fallback { snapshot } => {
            let data = read_snapshot(&snapshot).await?;
            println!("{}", fallback_from_value(&data)?);
            Ok(())
        }
    }
}

fn build_service(settings: &Settings) -> anyhow::Result<InsightsService> {
    let gemini = GeminiClient::new(&settings.gemini).context("Failed to build Gemini HTTP client")?;
    if settings.gemini.api_key().is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; insight requests will report a configuration error");
    }
    Ok(InsightsService::new(Arc::new(gemini), settings.gemini.timeout()))
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    let state = Arc::new(
        AppState::new(build_service(&settings)?).with_max_body_bytes(settings.server.max_body_bytes),
    );
    let router = router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!("Starting dashboard-insights service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}

async fn invoke(settings: Settings) -> anyhow::Result<()> {
    let service = build_service(&settings)?;

    let mut input = String::new();
    tokio::io::stdin().read_to_string(&mut input).await?;
    let event: InvocationEvent =
        serde_json::from_str(&input).context("Invalid invocation event")?;

    let response = handle_invocation(&service, event).await;
    let mut stdout = tokio::io::stdout();
    stdout.write_all(serde_json::to_string(&response)?.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}

async fn insights(endpoint: &str, snapshot: &Path) -> anyhow::Result<()> {
    let snapshot = DashboardSnapshot::from_value(read_snapshot(snapshot).await?)?;
    let panel = InsightsPanel::new(Arc::new(InsightsClient::new(endpoint)));

    let result = panel.load(&snapshot).await;
    if let InsightsMode::Offline(notice) = result.mode {
        eprintln!("{}", notice.message());
    }
    println!("{}", result.html);
    Ok(())
}

async fn read_snapshot(path: &Path) -> anyhow::Result<serde_json::Value> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}
