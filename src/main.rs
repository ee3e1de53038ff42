use clap::Parser;
use std::sync::Arc;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use bizcheckr::{
    AppState, build_app,
    config::Args,
    providers::OpenAiProvider,
    rate_limit::InMemoryRateLimitStore,
    sweeper::Sweeper,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // parse cli arguments
    let args = Args::parse();
    args.validate()?;

    if args.api_key.is_none() {
        warn!("BIZCHECKR_API_KEY is not set, every validation request will fail");
    }
    if args.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY is not set, completion calls will fail");
    }

    let limiter_config = args.limiter_config();
    let completion_config = args.completion_config();
    let limiter = Arc::new(InMemoryRateLimitStore::new(limiter_config));
    let provider = Arc::new(OpenAiProvider::new(completion_config.clone())?);

    let state = AppState::new(args.api_key.clone(), limiter.clone(), provider);
    let sweeper = Sweeper::start(limiter, args.sweep_interval());

    let app = build_app(state);
    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        addr = %addr,
        model = %completion_config.model,
        upstream = %completion_config.base_url,
        timeout_secs = completion_config.timeout.as_secs(),
        retries = completion_config.max_retries,
        rate_limit = limiter_config.max_requests,
        rate_window_secs = limiter_config.window.as_secs(),
        "BizCheckr listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.stop().await;
    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
