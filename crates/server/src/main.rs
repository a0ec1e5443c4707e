use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use panelcraft_core::domain::{ArtStyle, GenerationRequest, GridSize, Tone};
use panelcraft_core::orchestrator::ChannelSink;
use panelcraft_core::{Credentials, GenerationSettings};
use panelcraft_server::state::Requirement;
use panelcraft_server::{router, AppState};

#[derive(Parser)]
#[command(name = "panelcraft")]
#[command(about = "Comic and meme generation server", long_about = None)]
struct Args {
    /// JSON settings file (models, sampling, image options)
    #[arg(long, global = true, env = "PANELCRAFT_CONFIG", default_value = "panelcraft.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Clone)]
enum CliCommand {
    /// Start the HTTP server (default)
    Serve {
        /// Interface to bind
        #[arg(long, env = "HOST", default_value = "127.0.0.1")]
        host: String,
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value = "3000")]
        port: u16,
    },
    /// Generate one comic from the terminal, printing each progress event
    Comic {
        /// What the comic is about
        prompt: String,
        /// Grid layout as <rows>x<cols>
        #[arg(long, default_value = "2x2")]
        grid: String,
        /// Art style key
        #[arg(long, default_value = "cartoon")]
        style: String,
        /// Tone key
        #[arg(long, default_value = "funny")]
        tone: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "panelcraft_server=debug,panelcraft_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let settings = load_settings(&args.config).await?;
    let state = AppState::from_credentials(&Credentials::from_env(), settings);

    match args.command {
        Some(CliCommand::Comic {
            prompt,
            grid,
            style,
            tone,
        }) => run_comic(state, &prompt, &grid, &style, &tone).await,
        Some(CliCommand::Serve { host, port }) => serve(state, &host, port).await,
        None => serve(state, "127.0.0.1", 3000).await,
    }
}

async fn load_settings(path: &Path) -> anyhow::Result<GenerationSettings> {
    let settings = GenerationSettings::load(path).await?;
    tracing::info!(path = %path.display(), text_model = %settings.text_model, "loaded settings");
    Ok(settings)
}

async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", host, port))?;

    let app = router(state);

    tracing::info!(%addr, "Panelcraft server listening");
    tracing::info!("  POST /api/generate-comic");
    tracing::info!("  POST /api/generate-comic-stream");
    tracing::info!("  POST /api/generate-meme");
    tracing::info!("  GET  /api/health, /api/openapi.json");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Run the streaming pipeline without a server and print the event stream.
async fn run_comic(
    state: AppState,
    prompt: &str,
    grid: &str,
    style: &str,
    tone: &str,
) -> anyhow::Result<()> {
    let request = GenerationRequest::new(
        prompt,
        GridSize::parse(grid)?,
        ArtStyle::from_key(style),
        Tone::from_key(tone),
    )?;
    let orchestrator = state.orchestrator(Requirement::OpenAiAndReplicate)?;

    let (sink, mut rx) = ChannelSink::new(32);
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            print!("{}", event.to_frame());
        }
    });

    let result = orchestrator.run_streaming(&request, &sink).await;
    drop(sink);
    printer.await?;

    let comic = result?;
    println!("Comic complete: {} panels ({})", comic.panels.len(), comic.grid_layout);
    Ok(())
}
