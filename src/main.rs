//! OCR Server
//!
//! Accepts image and PDF uploads over HTTP and returns the recognized text
//! lines with confidence scores and bounding boxes.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ocr_server::config::Config;
use ocr_server::engine::{GatedEngine, OcrEngine, TesseractEngine};
use ocr_server::routes;
use ocr_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env first so RUST_LOG can come from it
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "ocr_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().context("Invalid configuration")?;

    tracing::info!("Starting OCR Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "OCR language: {} (GPU requested: {}, orientation detection: {})",
        config.ocr.lang,
        config.ocr.use_gpu,
        config.ocr.angle_cls
    );
    tracing::info!("Scratch directory: {}", config.scratch.dir.display());

    // Initialize the engine once; every request shares it
    let tesseract = TesseractEngine::new(&config.ocr);
    let version = tesseract
        .probe()
        .context("OCR engine failed its startup check")?;
    tracing::info!("Engine ready: {} (languages: {})", version, tesseract.languages());

    let engine: Arc<dyn OcrEngine> = Arc::new(GatedEngine::new(
        Arc::new(tesseract),
        config.ocr.max_concurrency,
    ));
    tracing::info!("Engine concurrency limit: {}", config.ocr.max_concurrency);

    // Create application state
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid SERVER_HOST/SERVER_PORT")?;
    let app_state = AppState::new(config, engine).context("Failed to initialize state")?;

    // Build router
    let app = routes::build_router(app_state);

    // Start server with graceful shutdown
    tracing::info!("OCR Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
