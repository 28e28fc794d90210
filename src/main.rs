//! quizsim entrypoint: HTTP server, one-shot scoring, or a stdin/stdout loop.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use quizsim::config::Config;
use quizsim::gateway::{HandlerState, create_router_with_state};
use quizsim::scoring::SimilarityScorer;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser, Debug)]
#[command(name = "quizsim", version)]
#[command(about = "Semantic similarity scoring for quiz answers", long_about = None)]
struct Cli {
    /// Hugging Face repo id or local model directory [env: QUIZSIM_MODEL]
    #[arg(long, global = true)]
    model: Option<String>,

    /// Hub revision (branch, tag or commit) [env: QUIZSIM_MODEL_REVISION]
    #[arg(long, global = true)]
    revision: Option<String>,

    /// Download cache for hub models [env: QUIZSIM_CACHE_DIR]
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Max tokens per input [env: QUIZSIM_MAX_SEQ_LEN]
    #[arg(long, global = true)]
    max_seq_len: Option<usize>,

    /// Use the deterministic stub embedder (no model download) [env: QUIZSIM_STUB]
    #[arg(long, global = true)]
    stub: bool,

    /// Probe /healthz on the configured port and exit 0 if healthy, 1 otherwise
    #[arg(long)]
    health_check: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Serve the HTTP API (default when no command is given)
    Serve {
        /// Port to listen on [env: QUIZSIM_PORT]
        #[arg(long)]
        port: Option<u16>,

        /// Address to bind [env: QUIZSIM_BIND_ADDR]
        #[arg(long)]
        bind: Option<IpAddr>,
    },

    /// Score one answer against one reference answer and print the similarity
    Score {
        /// Submitted answer
        #[arg(allow_hyphen_values = true)]
        answer: String,

        /// Reference correct answer
        #[arg(allow_hyphen_values = true)]
        correct_answer: String,
    },

    /// Score JSON requests read from stdin, one per line
    Stdio,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.health_check {
        std::process::exit(run_health_check().await);
    }

    let command = cli.command.clone().unwrap_or(Command::Serve {
        port: None,
        bind: None,
    });

    init_tracing(match command {
        Command::Serve { .. } => "info",
        Command::Score { .. } | Command::Stdio => "warn",
    });

    let config = build_config(&cli, &command)?;
    config.validate()?;

    match command {
        Command::Serve { .. } => serve(config).await,
        Command::Score {
            answer,
            correct_answer,
        } => score_once(config, answer, correct_answer).await,
        Command::Stdio => run_stdio(config).await,
    }
}

/// Logs go to stderr: stdout carries scores in `score` and `stdio` modes.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Environment first, then command-line overrides.
fn build_config(cli: &Cli, command: &Command) -> anyhow::Result<Config> {
    let mut config = Config::from_env()?;

    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(revision) = &cli.revision {
        config.revision = revision.clone();
    }
    if let Some(cache_dir) = &cli.cache_dir {
        config.cache_dir = Some(cache_dir.clone());
    }
    if let Some(max_seq_len) = cli.max_seq_len {
        config.max_seq_len = max_seq_len;
    }
    config.stub |= cli.stub;

    if let Command::Serve { port, bind } = command {
        if let Some(port) = port {
            config.port = *port;
        }
        if let Some(bind) = bind {
            config.bind_addr = *bind;
        }
    }

    Ok(config)
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        model = %config.model,
        stub = config.stub,
        "quizsim starting"
    );

    let scorer = Arc::new(SimilarityScorer::from_config(&config).await?);
    let app = create_router_with_state(HandlerState::new(scorer));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("quizsim shutdown complete");
    Ok(())
}

async fn score_once(config: Config, answer: String, correct_answer: String) -> anyhow::Result<()> {
    let scorer = SimilarityScorer::from_config(&config).await?;
    let similarity =
        tokio::task::spawn_blocking(move || scorer.score(&answer, &correct_answer)).await??;

    // Debug formatting keeps the decimal point (`1.0`, not `1`).
    println!("{similarity:?}");
    Ok(())
}

async fn run_stdio(config: Config) -> anyhow::Result<()> {
    let scorer = SimilarityScorer::from_config(&config).await?;

    tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        quizsim::stdio::run_loop(&scorer, stdin.lock(), stdout.lock())
    })
    .await??;

    Ok(())
}

/// Runs on the `main` runtime; returns the process exit code.
async fn run_health_check() -> i32 {
    let port = Config::from_env()
        .map(|c| c.port)
        .unwrap_or(quizsim::constants::DEFAULT_PORT);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let Ok(client) = reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    else {
        return 1;
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
